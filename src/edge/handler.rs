//! The edge request pipeline.
//!
//! # Stages (fixed order, each may short-circuit)
//! ```text
//! 1. scheme       http → 301 to https
//! 2. gone         decommissioned path → 410
//! 3. pagination   ?p=<n>, n > 1 → 301 to /<path>/page/<n>/
//! 4. cache        hit → stored response, verbatim
//! 5. origin       fetch with transform directives
//! 6. headers      Cache-Control tier + security headers
//! 7. populate     deferred cache put of the served response
//! ```

use std::sync::Arc;

use arc_swap::ArcSwap;
use axum::http::header::CACHE_CONTROL;
use axum::http::{HeaderValue, Method};
use url::Url;

use crate::cache::{CacheKey, CacheStore};
use crate::config::{EdgeConfig, ValidationError};
use crate::edge::error::EdgeError;
use crate::edge::normalize::NormalizedUrl;
use crate::edge::task::DeferredTask;
use crate::http::request::IncomingRequest;
use crate::http::response::EdgeResponse;
use crate::origin::Origin;
use crate::policy::PolicyTable;
use crate::security::SecurityHeaders;

/// The stage that produced a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    SchemeRedirect,
    Gone,
    PaginationRedirect,
    CacheHit,
    Origin,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SchemeRedirect => "scheme_redirect",
            Self::Gone => "gone",
            Self::PaginationRedirect => "pagination_redirect",
            Self::CacheHit => "cache_hit",
            Self::Origin => "origin",
        }
    }
}

/// The result of handling one request.
#[derive(Debug)]
pub struct HandlerOutcome {
    pub stage: Stage,
    pub response: EdgeResponse,
    /// Work to run after the response has been handed back.
    pub deferred: Vec<DeferredTask>,
}

impl HandlerOutcome {
    fn respond(stage: Stage, response: EdgeResponse) -> Self {
        Self {
            stage,
            response,
            deferred: Vec::new(),
        }
    }
}

/// Apply pagination canonicalization to a URL, as stage 3 does.
///
/// Two URLs that normalize to the same value share a cache key.
pub fn canonical_url(policy: &PolicyTable, url: &Url) -> NormalizedUrl {
    let mut normalized = NormalizedUrl::new(url.clone());
    normalized.canonicalize_pagination(policy.pagination_param());
    normalized
}

/// Handles every inbound request: redirects, removals, cache, origin.
pub struct EdgeHandler<C, O> {
    policy: ArcSwap<PolicyTable>,
    security_headers: ArcSwap<SecurityHeaders>,
    cache: C,
    cache_enabled: bool,
    origin: O,
}

impl<C: CacheStore, O: Origin> EdgeHandler<C, O> {
    pub fn new(
        policy: PolicyTable,
        security_headers: SecurityHeaders,
        cache: C,
        cache_enabled: bool,
        origin: O,
    ) -> Self {
        Self {
            policy: ArcSwap::from_pointee(policy),
            security_headers: ArcSwap::from_pointee(security_headers),
            cache,
            cache_enabled,
            origin,
        }
    }

    /// Build the policy and header tables from configuration.
    pub fn from_config(config: &EdgeConfig, cache: C, origin: O) -> Result<Self, ValidationError> {
        Ok(Self::new(
            PolicyTable::from_config(&config.policy)?,
            SecurityHeaders::from_config(&config.security.response_headers)?,
            cache,
            config.cache.enabled,
            origin,
        ))
    }

    /// Swap in the policy and security headers of a reloaded configuration.
    ///
    /// Requests already in flight finish with the tables they started with.
    pub fn reload(&self, config: &EdgeConfig) -> Result<(), ValidationError> {
        let policy = PolicyTable::from_config(&config.policy)?;
        let headers = SecurityHeaders::from_config(&config.security.response_headers)?;
        self.policy.store(Arc::new(policy));
        self.security_headers.store(Arc::new(headers));
        Ok(())
    }

    /// The policy table currently in effect.
    pub fn policy(&self) -> Arc<PolicyTable> {
        self.policy.load_full()
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn origin(&self) -> &O {
        &self.origin
    }

    /// Produce exactly one response for `request`, with at most one origin fetch.
    pub async fn handle(&self, request: IncomingRequest) -> Result<HandlerOutcome, EdgeError> {
        let policy = self.policy.load_full();
        let mut url = NormalizedUrl::new(request.url.clone());

        if url.is_insecure() {
            url.upgrade_scheme();
            return Ok(HandlerOutcome::respond(Stage::SchemeRedirect, redirect_to(&url)?));
        }

        if policy.is_decommissioned(url.path()) {
            let response =
                EdgeResponse::gone(policy.gone_body(), policy.gone_cache_control().clone());
            return Ok(HandlerOutcome::respond(Stage::Gone, response));
        }

        if url.canonicalize_pagination(policy.pagination_param()) {
            return Ok(HandlerOutcome::respond(Stage::PaginationRedirect, redirect_to(&url)?));
        }

        let key = CacheKey::new(&request.method, url.as_url());
        let cacheable = self.cache_enabled && request.method == Method::GET;
        if cacheable {
            if let Some(hit) = self.cache.get(&key) {
                return Ok(HandlerOutcome::respond(Stage::CacheHit, hit));
            }
        }

        let directives = policy.transform_directives(url.path());
        let mut response = self.origin.fetch(&request, &directives).await?;

        response
            .headers
            .insert(CACHE_CONTROL, policy.cache_control(url.path()).clone());
        self.security_headers.load().apply(&mut response.headers);

        let deferred = if cacheable {
            vec![DeferredTask::CachePut {
                key,
                response: response.clone(),
            }]
        } else {
            Vec::new()
        };

        Ok(HandlerOutcome {
            stage: Stage::Origin,
            response,
            deferred,
        })
    }
}

fn redirect_to(url: &NormalizedUrl) -> Result<EdgeResponse, EdgeError> {
    let location = HeaderValue::from_str(url.as_url().as_str())
        .map_err(|e| EdgeError::MalformedUrl(e.to_string()))?;
    Ok(EdgeResponse::moved_permanently(location))
}
