//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Logging/metrics → Watcher → Bind → Serve
//!
//! Per request (deferred.rs):
//!     Response sent → deferred tasks queued → background worker runs them
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain connections and tasks (bounded by the drain deadline) → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then observability, then listeners
//! - Ordered shutdown: stop accept, drain, close
//! - Draining deferred tasks has a deadline

pub mod deferred;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use deferred::DeferredQueue;
pub use shutdown::Shutdown;
pub use startup::StartupError;
