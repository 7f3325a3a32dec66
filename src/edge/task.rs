//! Work deferred until after the response is sent.

use crate::cache::{CacheKey, CacheStore};
use crate::http::response::EdgeResponse;

/// A unit of work the host adapter runs after handing the response back.
#[derive(Debug, Clone)]
pub enum DeferredTask {
    /// Store a served response in the shared cache.
    CachePut {
        key: CacheKey,
        response: EdgeResponse,
    },
}

impl DeferredTask {
    /// Execute the task. Failures are never reported to the client.
    pub fn run(self, cache: &impl CacheStore) {
        match self {
            Self::CachePut { key, response } => {
                tracing::trace!(key = %key, status = %response.status, "Populating cache");
                cache.put(key, response);
            }
        }
    }
}
