//! Origin subsystem.
//!
//! # Data Flow
//! ```text
//! Cache miss (pipeline stage 5):
//!     IncomingRequest + TransformDirectives
//!     → client.rs (rewrite URI to origin, attach directives)
//!     → origin server
//!     → buffered EdgeResponse (hop-by-hop headers stripped)
//! ```
//!
//! # Design Decisions
//! - At most one fetch per request: no retries, no fallback to stale cache
//! - No timeout here; the server-level request timeout bounds the fetch
//! - The trait is the seam tests use to substitute a fake origin

pub mod client;

use std::future::Future;

use crate::http::request::IncomingRequest;
use crate::http::response::EdgeResponse;
use crate::policy::TransformDirectives;

pub use client::HttpOrigin;

/// Origin fetch failures.
#[derive(Debug, thiserror::Error)]
pub enum OriginError {
    #[error("invalid origin URL: {0}")]
    InvalidUrl(String),

    #[error("failed to build origin request: {0}")]
    InvalidRequest(#[from] axum::http::Error),

    #[error("origin request failed: {0}")]
    Request(#[from] hyper_util::client::legacy::Error),

    #[error("failed to read origin response body: {0}")]
    Body(#[from] axum::Error),
}

/// The server content is fetched from on cache miss.
pub trait Origin: Send + Sync + 'static {
    /// Forward `request` with `directives` and buffer the response.
    fn fetch(
        &self,
        request: &IncomingRequest,
        directives: &TransformDirectives,
    ) -> impl Future<Output = Result<EdgeResponse, OriginError>> + Send;
}
