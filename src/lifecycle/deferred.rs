//! Background execution of deferred pipeline tasks.
//!
//! # Responsibilities
//! - Accept tasks from request handlers without blocking them
//! - Run tasks on a single background worker, in submission order
//! - Finish queued tasks when the server shuts down
//!
//! # Design Decisions
//! - Unbounded queue: submitting never waits on the worker
//! - The worker stops once every submitter has been dropped

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::cache::CacheStore;
use crate::edge::{DeferredTask, EdgeHandler};
use crate::origin::Origin;

/// Handle used by request handlers to schedule deferred work.
#[derive(Debug, Clone)]
pub struct DeferredQueue {
    tx: mpsc::UnboundedSender<DeferredTask>,
}

impl DeferredQueue {
    /// Create a queue and the receiver its worker drains.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<DeferredTask>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Schedule tasks to run after the current response.
    pub fn submit(&self, tasks: Vec<DeferredTask>) {
        for task in tasks {
            if self.tx.send(task).is_err() {
                tracing::warn!("Deferred task worker stopped, dropping task");
            }
        }
    }
}

/// Spawn the worker that runs queued tasks against the handler's cache.
pub fn spawn_worker<C: CacheStore, O: Origin>(
    handler: Arc<EdgeHandler<C, O>>,
    mut rx: mpsc::UnboundedReceiver<DeferredTask>,
) -> JoinHandle<usize> {
    tokio::spawn(async move {
        let mut completed = 0;
        while let Some(task) = rx.recv().await {
            task.run(handler.cache());
            completed += 1;
        }
        tracing::debug!(completed, "Deferred task worker finished");
        completed
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, Method, StatusCode};
    use url::Url;

    use crate::cache::{CacheKey, MemoryCache};
    use crate::config::EdgeConfig;
    use crate::http::response::EdgeResponse;
    use crate::origin::HttpOrigin;

    #[tokio::test]
    async fn worker_drains_queue_after_senders_drop() {
        let config = EdgeConfig::default();
        let origin = HttpOrigin::new(&config.origin).unwrap();
        let handler =
            Arc::new(EdgeHandler::from_config(&config, MemoryCache::new(10), origin).unwrap());

        let (queue, rx) = DeferredQueue::new();
        let worker = spawn_worker(handler.clone(), rx);

        let url = Url::parse("https://apexenterprises.net/about").unwrap();
        let key = CacheKey::new(&Method::GET, &url);
        let mut response = EdgeResponse::new(StatusCode::OK, "about");
        response
            .headers
            .insert("cache-control", HeaderValue::from_static("max-age=60"));

        queue.submit(vec![DeferredTask::CachePut {
            key: key.clone(),
            response,
        }]);
        drop(queue);

        assert_eq!(worker.await.unwrap(), 1);
        assert!(handler.cache().get(&key).is_some());
    }
}
