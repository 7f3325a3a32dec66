//! Edge request handler for the apexenterprises.net staffing site.

pub mod cache;
pub mod config;
pub mod edge;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod origin;
pub mod policy;
pub mod security;

pub use config::schema::EdgeConfig;
pub use edge::EdgeHandler;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
