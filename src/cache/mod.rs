//! Shared edge cache subsystem.
//!
//! # Data Flow
//! ```text
//! Lookup (pipeline stage 4):
//!     NormalizedUrl + method → key.rs (CacheKey)
//!     → CacheStore::get → hit: stored response served verbatim
//!
//! Population (pipeline stage 7, deferred):
//!     header-injected response → control.rs (TTL from Cache-Control)
//!     → CacheStore::put (last write wins)
//! ```
//!
//! # Design Decisions
//! - The store is an explicit trait so tests can substitute a fake
//! - Entries self-expire from the Cache-Control they were written with
//! - No invalidation API; no single-flight on concurrent misses

pub mod control;
pub mod key;
pub mod memory;

pub use control::CacheControl;
pub use key::CacheKey;
pub use memory::MemoryCache;

use crate::http::response::EdgeResponse;

/// Storage for responses keyed by normalized URL.
///
/// Implementations must be safe to share between concurrent requests; each
/// operation is atomic per key.
pub trait CacheStore: Send + Sync + 'static {
    /// Fetch a fresh response stored under `key`.
    fn get(&self, key: &CacheKey) -> Option<EdgeResponse>;

    /// Store `response` under `key`, replacing any previous entry.
    fn put(&self, key: CacheKey, response: EdgeResponse);
}

impl<C: CacheStore> CacheStore for std::sync::Arc<C> {
    fn get(&self, key: &CacheKey) -> Option<EdgeResponse> {
        (**self).get(key)
    }

    fn put(&self, key: CacheKey, response: EdgeResponse) {
        (**self).put(key, response)
    }
}
