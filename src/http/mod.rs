//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, middleware, listener scheme)
//!     → request.rs (request ID, absolute URL → IncomingRequest)
//!     → edge pipeline (redirects, gone, cache, origin)
//!     → response.rs (EdgeResponse → client)
//!     → deferred tasks handed to the background worker
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{IncomingRequest, ListenerScheme, RequestIdExt, X_REQUEST_ID};
pub use response::EdgeResponse;
pub use server::{build_router, AppState, HttpServer, ServerError};
