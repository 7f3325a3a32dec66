//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → EdgeConfig (validated, immutable)
//!     → policy table + security headers built from it
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → sent to the server, which swaps the policy atomically
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Listener, origin and cache sizing are only read at startup

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    CacheConfig, CacheTierConfig, EdgeConfig, HeaderEntry, ListenerConfig, LogFormat,
    ObservabilityConfig, OriginConfig, PolicyConfig, SecurityConfig, TimeoutConfig, TlsConfig,
};
pub use validation::ValidationError;
pub use watcher::ConfigWatcher;
