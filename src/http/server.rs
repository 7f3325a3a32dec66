//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router that feeds every request to the edge pipeline
//! - Wire up middleware (request ID, tracing, timeout, body limit)
//! - Serve plain HTTP, and HTTPS when a certificate is configured
//! - Hand deferred tasks to the background worker after each response
//! - Apply configuration reloads and sweep expired cache entries
//!
//! # Design Decisions
//! - One router per listener; the listener's scheme travels as an extension
//! - Request bodies are buffered before the pipeline runs
//! - Pipeline errors become generic 400/502 responses, never details

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Extension, Router,
};
use axum_server::tls_rustls::RustlsConfig;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::cache::{CacheStore, MemoryCache};
use crate::config::{EdgeConfig, TlsConfig, ValidationError};
use crate::edge::{EdgeError, EdgeHandler};
use crate::http::request::{IncomingRequest, ListenerScheme, RequestIdExt};
use crate::lifecycle::deferred::{self, DeferredQueue};
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::origin::{HttpOrigin, Origin, OriginError};

/// Startup failures of the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ValidationError),

    #[error("failed to create origin client: {0}")]
    Origin(#[from] OriginError),

    #[error("invalid listen address {0:?}")]
    Address(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Application state injected into handlers.
pub struct AppState<C, O> {
    pub handler: Arc<EdgeHandler<C, O>>,
    pub deferred: DeferredQueue,
    pub trust_forwarded_proto: bool,
    pub max_body_size: usize,
}

impl<C, O> Clone for AppState<C, O> {
    fn clone(&self) -> Self {
        Self {
            handler: self.handler.clone(),
            deferred: self.deferred.clone(),
            trust_forwarded_proto: self.trust_forwarded_proto,
            max_body_size: self.max_body_size,
        }
    }
}

/// Build the Axum router for one listener, with all middleware layers.
///
/// The body limit wraps the timeout: `Timeout` needs a `Default` response
/// body, which the limit layer's body is not.
pub fn build_router<C: CacheStore, O: Origin>(
    state: AppState<C, O>,
    scheme: ListenerScheme,
    request_timeout: Duration,
) -> Router {
    let max_body_size = state.max_body_size;
    Router::new()
        .route("/", any(edge_entry::<C, O>))
        .route("/{*path}", any(edge_entry::<C, O>))
        .with_state(state)
        .layer(Extension(scheme))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    tracing::info_span!(
                        "request",
                        request_id = %request.request_id(),
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                }))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(RequestBodyLimitLayer::new(max_body_size))
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    request_timeout,
                )),
        )
}

/// Runs one request through the edge pipeline.
async fn edge_entry<C: CacheStore, O: Origin>(
    State(state): State<AppState<C, O>>,
    Extension(scheme): Extension<ListenerScheme>,
    request: Request<Body>,
) -> Response {
    let start = Instant::now();
    let request_id = request.request_id().to_string();

    let (parts, body) = request.into_parts();
    let body = match axum::body::to_bytes(body, state.max_body_size).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Failed to read request body");
            return (StatusCode::PAYLOAD_TOO_LARGE, "Payload too large").into_response();
        }
    };

    let incoming =
        match IncomingRequest::from_parts(&parts, body, scheme, state.trust_forwarded_proto) {
            Ok(incoming) => incoming,
            Err(e) => {
                tracing::warn!(request_id = %request_id, error = %e, "Rejecting request");
                metrics::record_request("rejected", e.status().as_u16(), start);
                return e.into_response();
            }
        };

    match state.handler.handle(incoming).await {
        Ok(outcome) => {
            let status = outcome.response.status;
            tracing::debug!(
                request_id = %request_id,
                stage = outcome.stage.as_str(),
                status = %status,
                "Request handled"
            );
            metrics::record_request(outcome.stage.as_str(), status.as_u16(), start);
            state.deferred.submit(outcome.deferred);
            outcome.response.into_response()
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Edge pipeline failed");
            if matches!(e, EdgeError::Origin(_)) {
                metrics::record_origin_error();
            }
            metrics::record_request("error", e.status().as_u16(), start);
            e.into_response()
        }
    }
}

/// HTTP server for the edge.
pub struct HttpServer {
    config: EdgeConfig,
    handler: Arc<EdgeHandler<MemoryCache, HttpOrigin>>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: EdgeConfig) -> Result<Self, ServerError> {
        let origin = HttpOrigin::new(&config.origin)?;
        let cache = MemoryCache::new(config.cache.max_entries);
        let handler = Arc::new(EdgeHandler::from_config(&config, cache, origin)?);
        Ok(Self { config, handler })
    }

    pub fn handler(&self) -> &Arc<EdgeHandler<MemoryCache, HttpOrigin>> {
        &self.handler
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &EdgeConfig {
        &self.config
    }

    /// Run the server until `shutdown` fires, then drain deferred work.
    pub async fn run(
        self,
        listener: TcpListener,
        config_updates: mpsc::UnboundedReceiver<EdgeConfig>,
        shutdown: Shutdown,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let (queue, deferred_rx) = DeferredQueue::new();
        let worker = deferred::spawn_worker(self.handler.clone(), deferred_rx);

        tokio::spawn(apply_reloads(
            self.handler.clone(),
            config_updates,
            shutdown.clone(),
        ));
        if self.config.cache.enabled {
            tokio::spawn(purge_expired(
                self.handler.clone(),
                Duration::from_secs(self.config.cache.purge_interval_secs),
                shutdown.clone(),
            ));
        }

        let state = AppState {
            handler: self.handler.clone(),
            deferred: queue,
            trust_forwarded_proto: self.config.listener.trust_forwarded_proto,
            max_body_size: self.config.security.max_body_size,
        };
        let request_timeout = Duration::from_secs(self.config.timeouts.request_secs);

        let tls_server = match &self.config.listener.tls {
            Some(tls) => {
                let router = build_router(state.clone(), ListenerScheme::Https, request_timeout);
                Some(spawn_tls(tls, router, shutdown.clone()).await?)
            }
            None => None,
        };

        let app = build_router(state, ListenerScheme::Http, request_timeout);
        axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(shutdown.signalled())
            .await?;
        tracing::info!("HTTP server stopped");

        if let Some(tls_server) = tls_server {
            match shutdown.drain("https listener", tls_server).await {
                Some(Ok(Err(e))) => tracing::error!(error = %e, "HTTPS server failed"),
                Some(Err(e)) => tracing::error!(error = %e, "HTTPS server task panicked"),
                Some(Ok(Ok(()))) | None => {}
            }
        }

        match shutdown.drain("deferred tasks", worker).await {
            Some(Ok(completed)) => tracing::info!(completed, "Deferred tasks drained"),
            Some(Err(e)) => tracing::error!(error = %e, "Deferred task worker panicked"),
            None => {}
        }
        Ok(())
    }
}

async fn spawn_tls(
    tls: &TlsConfig,
    router: Router,
    shutdown: Shutdown,
) -> Result<tokio::task::JoinHandle<std::io::Result<()>>, ServerError> {
    let addr: SocketAddr = tls
        .bind_address
        .parse()
        .map_err(|_| ServerError::Address(tls.bind_address.clone()))?;
    let rustls = RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path).await?;

    let handle = axum_server::Handle::new();
    let stop_handle = handle.clone();
    let drain = shutdown.drain_deadline();
    let stopped = shutdown.signalled();
    tokio::spawn(async move {
        stopped.await;
        stop_handle.graceful_shutdown(Some(drain));
    });

    tracing::info!(address = %addr, "HTTPS server starting");
    Ok(tokio::spawn(
        axum_server::bind_rustls(addr, rustls)
            .handle(handle)
            .serve(router.into_make_service()),
    ))
}

async fn apply_reloads<C: CacheStore, O: Origin>(
    handler: Arc<EdgeHandler<C, O>>,
    mut updates: mpsc::UnboundedReceiver<EdgeConfig>,
    shutdown: Shutdown,
) {
    let mut stop = shutdown.subscribe();
    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Some(config) => match handler.reload(&config) {
                    Ok(()) => tracing::info!("Edge policy reloaded"),
                    Err(e) => tracing::error!(error = %e, "Rejected reloaded policy, keeping current"),
                },
                None => break,
            },
            _ = stop.recv() => break,
        }
    }
}

async fn purge_expired(
    handler: Arc<EdgeHandler<MemoryCache, HttpOrigin>>,
    every: Duration,
    shutdown: Shutdown,
) {
    let mut stop = shutdown.subscribe();
    let mut ticker = tokio::time::interval(every);
    ticker.tick().await;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let removed = handler.cache().purge_expired();
                tracing::debug!(removed, remaining = handler.cache().len(), "Purged expired cache entries");
            }
            _ = stop.recv() => break,
        }
    }
}
