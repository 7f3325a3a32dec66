//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check policy tables are path-shaped and non-empty
//! - Check configured headers are valid HTTP
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: EdgeConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::{HeaderName, HeaderValue};
use url::Url;

use crate::config::schema::EdgeConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("origin.url: {0}")]
    InvalidOrigin(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("{field}: entry {value:?} must be a non-empty path starting with '/'")]
    InvalidPath { field: &'static str, value: String },

    #[error("{field}: entry {value:?} must be non-empty")]
    Empty { field: &'static str, value: String },

    #[error("policy.cache_tiers[{0}]: set exactly one of path_prefix or path_contains")]
    AmbiguousTier(usize),

    #[error("invalid header {name:?}")]
    InvalidHeader { name: String },
}

/// Validate a parsed configuration.
pub fn validate_config(config: &EdgeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if let Some(tls) = &config.listener.tls {
        check_address(&mut errors, "listener.tls.bind_address", &tls.bind_address);
    }
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    match Url::parse(&config.origin.url) {
        Ok(url) if url.scheme() != "http" => {
            errors.push(ValidationError::InvalidOrigin(format!(
                "unsupported scheme {:?}",
                url.scheme()
            )));
        }
        Ok(url) if url.host_str().is_none() => {
            errors.push(ValidationError::InvalidOrigin("missing host".to_string()));
        }
        Ok(_) => {}
        Err(e) => errors.push(ValidationError::InvalidOrigin(e.to_string())),
    }
    if let Some(host) = &config.origin.host_header {
        if HeaderValue::from_str(host).is_err() {
            errors.push(ValidationError::InvalidHeader { name: "Host".to_string() });
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }
    if config.origin.max_body_bytes == 0 {
        errors.push(ValidationError::Zero("origin.max_body_bytes"));
    }
    if config.cache.enabled && config.cache.max_entries == 0 {
        errors.push(ValidationError::Zero("cache.max_entries"));
    }
    if config.cache.enabled && config.cache.purge_interval_secs == 0 {
        errors.push(ValidationError::Zero("cache.purge_interval_secs"));
    }

    let policy = &config.policy;
    for entry in &policy.decommissioned {
        check_path(&mut errors, "policy.decommissioned", entry);
    }
    check_path(&mut errors, "policy.static_prefix", &policy.static_prefix);
    for ext in &policy.static_extensions {
        if ext.is_empty() {
            errors.push(ValidationError::Empty {
                field: "policy.static_extensions",
                value: ext.clone(),
            });
        }
    }
    if policy.pagination_param.is_empty() {
        errors.push(ValidationError::Empty {
            field: "policy.pagination_param",
            value: String::new(),
        });
    }

    for (i, tier) in policy.cache_tiers.iter().enumerate() {
        match (&tier.path_prefix, &tier.path_contains) {
            (Some(prefix), None) => check_path(&mut errors, "policy.cache_tiers.path_prefix", prefix),
            (None, Some(needle)) if !needle.is_empty() => {}
            (None, Some(needle)) => errors.push(ValidationError::Empty {
                field: "policy.cache_tiers.path_contains",
                value: needle.clone(),
            }),
            _ => errors.push(ValidationError::AmbiguousTier(i)),
        }
        check_header_value(&mut errors, "Cache-Control", &tier.cache_control);
    }
    check_header_value(&mut errors, "Cache-Control", &policy.default_cache_control);
    check_header_value(&mut errors, "Cache-Control", &policy.gone_cache_control);

    for header in &config.security.response_headers {
        if HeaderName::from_bytes(header.name.as_bytes()).is_err() {
            errors.push(ValidationError::InvalidHeader { name: header.name.clone() });
        } else {
            check_header_value(&mut errors, &header.name, &header.value);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

fn check_path(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if !value.starts_with('/') {
        errors.push(ValidationError::InvalidPath {
            field,
            value: value.to_string(),
        });
    }
}

fn check_header_value(errors: &mut Vec<ValidationError>, name: &str, value: &str) {
    if HeaderValue::from_str(value).is_err() {
        errors.push(ValidationError::InvalidHeader { name: name.to_string() });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{CacheTierConfig, HeaderEntry};

    #[test]
    fn default_config_is_valid() {
        assert_eq!(validate_config(&EdgeConfig::default()), Ok(()));
    }

    #[test]
    fn collects_every_error() {
        let mut config = EdgeConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.origin.url = "ftp://origin".into();
        config.timeouts.request_secs = 0;
        config.policy.decommissioned.push("coupons".into());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::Zero("timeouts.request_secs")));
        assert!(errors.contains(&ValidationError::InvalidPath {
            field: "policy.decommissioned",
            value: "coupons".into(),
        }));
    }

    #[test]
    fn tier_needs_exactly_one_matcher() {
        let mut config = EdgeConfig::default();
        config.policy.cache_tiers.push(CacheTierConfig {
            name: "broken".into(),
            path_prefix: Some("/a/".into()),
            path_contains: Some(".svg".into()),
            cache_control: "no-store".into(),
        });

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::AmbiguousTier(2)]);
    }

    #[test]
    fn rejects_bad_header_names() {
        let mut config = EdgeConfig::default();
        config.security.response_headers.push(HeaderEntry {
            name: "Bad Header".into(),
            value: "x".into(),
        });

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::InvalidHeader { name: "Bad Header".into() }]
        );
    }
}
