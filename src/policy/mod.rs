//! Path policy subsystem.
//!
//! # Data Flow
//! ```text
//! PolicyConfig (from TOML)
//!     → table.rs (compile into PolicyTable)
//!     → matcher.rs (path predicates)
//!     → shared via ArcSwap, swapped on reload
//!
//! Per request:
//!     path → is_decommissioned / pagination_param
//!          → transform_directives (origin fetch options)
//!          → cache_control (response tier)
//! ```
//!
//! # Design Decisions
//! - Rules are data, evaluated in table order; first match wins
//! - No regex: substring and prefix checks only
//! - Every evaluation is a pure function of the path

pub mod matcher;
pub mod table;
pub mod transform;

pub use matcher::PathMatcher;
pub use table::{CacheTierRule, PolicyTable};
pub use transform::{ImageOptimization, TransformDirectives};
