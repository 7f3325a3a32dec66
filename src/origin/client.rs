//! HTTP origin client.

use axum::body::Body;
use axum::http::header::{HeaderName, HeaderValue, ACCEPT_ENCODING, HOST};
use axum::http::uri::{Authority, Scheme};
use axum::http::{Request, Uri};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use url::Url;

use crate::config::OriginConfig;
use crate::http::request::{IncomingRequest, X_REQUEST_ID};
use crate::http::response::{strip_hop_by_hop, EdgeResponse};
use crate::origin::{Origin, OriginError};
use crate::policy::TransformDirectives;

/// Header carrying the transform directives to the origin.
pub const X_EDGE_TRANSFORM: HeaderName = HeaderName::from_static("x-edge-transform");

const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");
const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");

/// Fetches from a single fixed origin over HTTP/1.1.
#[derive(Clone)]
pub struct HttpOrigin {
    client: Client<HttpConnector, Body>,
    scheme: Scheme,
    authority: Authority,
    host_header: Option<HeaderValue>,
    max_body_bytes: usize,
}

impl HttpOrigin {
    pub fn new(config: &OriginConfig) -> Result<Self, OriginError> {
        let url = Url::parse(&config.url).map_err(|e| OriginError::InvalidUrl(e.to_string()))?;
        if url.scheme() != "http" {
            return Err(OriginError::InvalidUrl(format!(
                "unsupported scheme {:?}",
                url.scheme()
            )));
        }
        let host = url
            .host_str()
            .ok_or_else(|| OriginError::InvalidUrl("missing host".to_string()))?;
        let authority = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        let authority = Authority::try_from(authority.as_str())
            .map_err(|e| OriginError::InvalidUrl(e.to_string()))?;

        let host_header = config
            .host_header
            .as_deref()
            .map(HeaderValue::from_str)
            .transpose()
            .map_err(|e| OriginError::InvalidUrl(e.to_string()))?;

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        Ok(Self {
            client,
            scheme: Scheme::HTTP,
            authority,
            host_header,
            max_body_bytes: config.max_body_bytes,
        })
    }

    /// Rewrite the client request for the origin.
    fn build_request(
        &self,
        request: &IncomingRequest,
        directives: &TransformDirectives,
    ) -> Result<Request<Body>, OriginError> {
        let path_and_query = match request.url.query() {
            Some(query) => format!("{}?{}", request.url.path(), query),
            None => request.url.path().to_string(),
        };
        let uri = Uri::builder()
            .scheme(self.scheme.clone())
            .authority(self.authority.clone())
            .path_and_query(path_and_query)
            .build()?;

        let mut headers = request.headers.clone();
        strip_hop_by_hop(&mut headers);
        // Stored bodies must be identity-encoded.
        headers.remove(ACCEPT_ENCODING);
        if let Some(host) = &self.host_header {
            headers.insert(HOST, host.clone());
        }
        if let Ok(proto) = HeaderValue::from_str(request.url.scheme()) {
            headers.insert(X_FORWARDED_PROTO, proto);
        }
        if let Some(host) = request.headers.get(HOST) {
            headers.insert(X_FORWARDED_HOST, host.clone());
        }
        let transform = HeaderValue::from_str(&directives.to_header_value())
            .map_err(axum::http::Error::from)?;
        headers.insert(X_EDGE_TRANSFORM, transform);

        let mut forwarded = Request::builder()
            .method(request.method.clone())
            .uri(uri)
            .body(Body::from(request.body.clone()))?;
        *forwarded.headers_mut() = headers;
        Ok(forwarded)
    }
}

impl Origin for HttpOrigin {
    async fn fetch(
        &self,
        request: &IncomingRequest,
        directives: &TransformDirectives,
    ) -> Result<EdgeResponse, OriginError> {
        let forwarded = self.build_request(request, directives)?;
        let request_id = request
            .headers
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown");

        tracing::debug!(
            request_id = %request_id,
            uri = %forwarded.uri(),
            cache_everything = directives.cache_everything,
            "Fetching from origin"
        );

        let response = self.client.request(forwarded).await?;
        let (parts, body) = response.into_parts();
        let body = axum::body::to_bytes(Body::new(body), self.max_body_bytes).await?;

        let mut response = EdgeResponse {
            status: parts.status,
            headers: parts.headers,
            body,
        };
        response.strip_hop_by_hop();
        Ok(response)
    }
}
