//! In-memory shared cache.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::header::{CACHE_CONTROL, SET_COOKIE, VARY};
use axum::http::StatusCode;
use dashmap::DashMap;

use crate::cache::control::CacheControl;
use crate::cache::key::CacheKey;
use crate::cache::CacheStore;
use crate::http::response::EdgeResponse;
use crate::observability::metrics;

#[derive(Debug, Clone)]
struct Entry {
    response: EdgeResponse,
    expires_at: Instant,
}

/// A bounded, concurrent response cache.
///
/// Cloning is cheap and every clone shares the same entries.
#[derive(Debug, Clone)]
pub struct MemoryCache {
    inner: Arc<DashMap<CacheKey, Entry>>,
    max_entries: usize,
}

impl MemoryCache {
    /// Create an empty cache holding at most `max_entries` responses.
    pub fn new(max_entries: usize) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            max_entries,
        }
    }

    /// Number of stored entries, expired ones included until swept.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.inner.len();
        self.inner.retain(|_, entry| entry.expires_at > now);
        let removed = before.saturating_sub(self.inner.len());
        metrics::record_cache_size(self.inner.len());
        removed
    }

    fn insert(&self, key: CacheKey, response: EdgeResponse, ttl: Duration) {
        if self.inner.len() >= self.max_entries
            && !self.inner.contains_key(&key)
            && self.purge_expired() == 0
        {
            tracing::debug!(key = %key, max_entries = self.max_entries, "Cache full, entry not stored");
            return;
        }

        self.inner.insert(
            key,
            Entry {
                response,
                expires_at: Instant::now() + ttl,
            },
        );
        metrics::record_cache_size(self.inner.len());
    }
}

/// Whether a response may be replayed to other clients.
///
/// Partial content, `Set-Cookie` and any `Vary` other than `Accept-Encoding`
/// are refused. The origin client strips `Accept-Encoding`, so every stored
/// body is the identity encoding.
fn is_shareable(response: &EdgeResponse) -> bool {
    if response.status == StatusCode::PARTIAL_CONTENT || response.headers.contains_key(SET_COOKIE) {
        return false;
    }
    response.headers.get_all(VARY).iter().all(|value| match value.to_str() {
        Ok(names) => names
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .all(|name| name.eq_ignore_ascii_case("accept-encoding")),
        Err(_) => false,
    })
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &CacheKey) -> Option<EdgeResponse> {
        let now = Instant::now();
        let entry = self.inner.get(key)?;
        if entry.expires_at > now {
            return Some(entry.response.clone());
        }
        drop(entry);
        self.inner.remove_if(key, |_, entry| entry.expires_at <= now);
        None
    }

    fn put(&self, key: CacheKey, response: EdgeResponse) {
        if !is_shareable(&response) {
            tracing::trace!(key = %key, status = %response.status, "Response is per-client, skipping store");
            return;
        }

        let ttl = response
            .headers
            .get(CACHE_CONTROL)
            .and_then(|v| v.to_str().ok())
            .map(CacheControl::parse)
            .and_then(|cc| cc.shared_ttl());

        match ttl {
            Some(ttl) => self.insert(key, response, ttl),
            None => tracing::trace!(key = %key, "Response not cacheable, skipping store"),
        }
    }
}
