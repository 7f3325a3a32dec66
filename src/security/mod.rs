//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Origin response (pipeline stage 6):
//!     → headers.rs (HSTS, nosniff, frame denial, XSS, referrer policy)
//!     → cached and served
//! ```
//!
//! # Design Decisions
//! - Headers apply to every origin response, error pages included
//! - Edge-generated redirects and 410s carry no security headers
//! - Request body size is bounded by the server's limit layer

pub mod headers;

pub use headers::SecurityHeaders;
