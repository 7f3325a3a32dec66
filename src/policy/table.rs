//! Compiled policy tables.
//!
//! # Responsibilities
//! - Compile `PolicyConfig` into matchers and header values once
//! - Answer the per-request policy questions of the pipeline
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Header values validated at compile time, never on the hot path
//! - Cache tiers are ordered; the first matching rule wins

use axum::http::HeaderValue;

use crate::config::{PolicyConfig, ValidationError};
use crate::policy::matcher::PathMatcher;
use crate::policy::transform::TransformDirectives;

/// A cache tier: paths matching `matcher` receive `cache_control`.
#[derive(Debug, Clone)]
pub struct CacheTierRule {
    /// Tier identifier for logging/metrics.
    pub name: String,
    pub matcher: PathMatcher,
    pub cache_control: HeaderValue,
}

/// The compiled set of path policies applied by the edge.
#[derive(Debug, Clone)]
pub struct PolicyTable {
    decommissioned: Vec<PathMatcher>,
    static_assets: Vec<PathMatcher>,
    cache_tiers: Vec<CacheTierRule>,
    default_cache_control: HeaderValue,
    pagination_param: String,
    gone_body: String,
    gone_cache_control: HeaderValue,
}

impl PolicyTable {
    /// Compile the policy configuration.
    pub fn from_config(config: &PolicyConfig) -> Result<Self, ValidationError> {
        let cache_tiers = config
            .cache_tiers
            .iter()
            .enumerate()
            .map(|(i, tier)| {
                let matcher = match (&tier.path_prefix, &tier.path_contains) {
                    (Some(prefix), None) => PathMatcher::Prefix(prefix.clone()),
                    (None, Some(needle)) => PathMatcher::Contains(needle.clone()),
                    _ => return Err(ValidationError::AmbiguousTier(i)),
                };
                Ok(CacheTierRule {
                    name: tier.name.clone(),
                    matcher,
                    cache_control: cache_control_value(&tier.cache_control)?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            decommissioned: config
                .decommissioned
                .iter()
                .map(|needle| PathMatcher::Contains(needle.clone()))
                .collect(),
            static_assets: vec![
                PathMatcher::Prefix(config.static_prefix.clone()),
                PathMatcher::Extension(config.static_extensions.clone()),
            ],
            cache_tiers,
            default_cache_control: cache_control_value(&config.default_cache_control)?,
            pagination_param: config.pagination_param.clone(),
            gone_body: config.gone_body.clone(),
            gone_cache_control: cache_control_value(&config.gone_cache_control)?,
        })
    }

    /// True if the path designates permanently removed content.
    pub fn is_decommissioned(&self, path: &str) -> bool {
        self.decommissioned.iter().any(|m| m.matches(path))
    }

    /// True if the path is a static asset (prefix or extension).
    pub fn is_static_asset(&self, path: &str) -> bool {
        self.static_assets.iter().any(|m| m.matches(path))
    }

    /// Directives for the origin fetch of this path.
    pub fn transform_directives(&self, path: &str) -> TransformDirectives {
        TransformDirectives::optimized(self.is_static_asset(path))
    }

    /// The tier rule matching this path, if any.
    pub fn cache_tier(&self, path: &str) -> Option<&CacheTierRule> {
        self.cache_tiers.iter().find(|tier| tier.matcher.matches(path))
    }

    /// Cache-Control value for responses served for this path.
    pub fn cache_control(&self, path: &str) -> &HeaderValue {
        self.cache_tier(path)
            .map(|tier| &tier.cache_control)
            .unwrap_or(&self.default_cache_control)
    }

    /// Name of the query parameter carrying the page number.
    pub fn pagination_param(&self) -> &str {
        &self.pagination_param
    }

    pub fn gone_body(&self) -> &str {
        &self.gone_body
    }

    pub fn gone_cache_control(&self) -> &HeaderValue {
        &self.gone_cache_control
    }
}

fn cache_control_value(value: &str) -> Result<HeaderValue, ValidationError> {
    HeaderValue::from_str(value).map_err(|_| ValidationError::InvalidHeader {
        name: "Cache-Control".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheTierConfig;

    fn table() -> PolicyTable {
        PolicyTable::from_config(&PolicyConfig::default()).unwrap()
    }

    #[test]
    fn decommissioned_substrings() {
        let table = table();
        for path in ["/blog/coupons", "/blog/deals/x", "/blog/offers", "/coupons/2024", "/deals"] {
            assert!(table.is_decommissioned(path), "{path}");
        }
        assert!(!table.is_decommissioned("/blog"));
        assert!(!table.is_decommissioned("/offers"));
    }

    #[test]
    fn static_recognition_uses_prefix_or_extension() {
        let table = table();
        assert!(table.is_static_asset("/static/logo"));
        assert!(table.is_static_asset("/bundle.js"));
        assert!(table.is_static_asset("/img/team.avif"));
        assert!(table.is_static_asset("/fonts/inter.woff2"));
        assert!(!table.is_static_asset("/about"));
        assert!(!table.is_static_asset("/img/logo.svg"));
    }

    #[test]
    fn cache_control_tiers() {
        let table = table();
        assert_eq!(
            table.cache_control("/static/app.css"),
            "public, max-age=31536000, immutable"
        );
        assert_eq!(
            table.cache_control("/cities/mumbai"),
            "public, max-age=86400, s-maxage=86400"
        );
        assert_eq!(
            table.cache_control("/about"),
            "public, max-age=3600, s-maxage=86400"
        );
        // Extension alone does not make a path immutable.
        assert_eq!(table.cache_control("/app.js"), "public, max-age=3600, s-maxage=86400");
    }

    #[test]
    fn transform_directives_follow_static_recognition() {
        let table = table();
        assert!(table.transform_directives("/static/app.css").cache_everything);
        assert!(table.transform_directives("/hero.png").cache_everything);
        assert!(!table.transform_directives("/cities/pune").cache_everything);
    }

    #[test]
    fn first_matching_tier_wins() {
        let mut config = PolicyConfig::default();
        config.cache_tiers.insert(
            0,
            CacheTierConfig {
                name: "city-maps".into(),
                path_prefix: None,
                path_contains: Some("/map".into()),
                cache_control: "no-store".into(),
            },
        );
        let table = PolicyTable::from_config(&config).unwrap();

        assert_eq!(table.cache_tier("/cities/delhi/map").unwrap().name, "city-maps");
        assert_eq!(table.cache_tier("/cities/delhi").unwrap().name, "cities");
        assert!(table.cache_tier("/careers").is_none());
    }
}
