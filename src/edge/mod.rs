//! Edge request pipeline subsystem.
//!
//! # Data Flow
//! ```text
//! IncomingRequest (from the host adapter)
//!     → handler.rs (seven stages, fixed order)
//!     → normalize.rs (NormalizedUrl mutated by scheme/pagination stages)
//!     → HandlerOutcome { response, deferred tasks }
//!     → host adapter sends response, then runs task.rs work
//! ```
//!
//! # Design Decisions
//! - The handler is a pure function of (request, cache state, origin)
//! - Stages never reorder: an http request with `?p=3` takes two redirects
//! - The served response and the cached copy are the same value
//! - Failures propagate; there is no retry or stale fallback

pub mod error;
pub mod handler;
pub mod task;
pub mod normalize;

pub use error::EdgeError;
pub use handler::{canonical_url, EdgeHandler, HandlerOutcome, Stage};
pub use task::DeferredTask;
pub use normalize::NormalizedUrl;
