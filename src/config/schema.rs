//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the edge.
//! All types derive Serde traits for deserialization from config files, and
//! every section has defaults so an empty file describes the production site.

use serde::{Deserialize, Serialize};

/// Root configuration for the edge service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct EdgeConfig {
    /// Listener configuration (bind address, TLS, scheme trust).
    pub listener: ListenerConfig,

    /// Origin server the edge falls back to on cache miss.
    pub origin: OriginConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Shared edge cache settings.
    pub cache: CacheConfig,

    /// Path policy tables.
    pub policy: PolicyConfig,

    /// Response security headers and request limits.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Plain HTTP bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Honour `X-Forwarded-Proto: https` on the plain listener.
    ///
    /// Only enable this when a TLS terminator sits in front of the edge,
    /// otherwise any client can skip the HTTPS redirect.
    pub trust_forwarded_proto: bool,

    /// Optional TLS listener.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            trust_forwarded_proto: false,
            tls: None,
        }
    }
}

/// TLS listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// TLS bind address (e.g., "0.0.0.0:8443").
    pub bind_address: String,

    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Origin server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OriginConfig {
    /// Base URL of the origin (scheme + authority), e.g. "http://127.0.0.1:3000".
    pub url: String,

    /// Host header sent to the origin. `None` forwards the client's Host.
    pub host_header: Option<String>,

    /// Maximum origin response body buffered by the edge.
    pub max_body_bytes: usize,
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:3000".to_string(),
            host_header: None,
            max_body_bytes: 16 * 1024 * 1024,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,

    /// Grace period for draining deferred tasks on shutdown, in seconds.
    pub drain_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            drain_secs: 5,
        }
    }
}

/// Shared edge cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Enable cache lookup and population.
    pub enabled: bool,

    /// Maximum number of entries held in memory.
    pub max_entries: usize,

    /// How often expired entries are swept, in seconds.
    pub purge_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: 50_000,
            purge_interval_secs: 300,
        }
    }
}

/// Path policy tables.
///
/// Defaults reproduce the production site's rules exactly.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Path substrings designating permanently removed content.
    pub decommissioned: Vec<String>,

    /// Path prefix holding static assets.
    pub static_prefix: String,

    /// Extensions that mark a path as a static asset (substring match).
    pub static_extensions: Vec<String>,

    /// Ordered cache tier rules, first match wins.
    pub cache_tiers: Vec<CacheTierConfig>,

    /// Cache-Control for paths no tier matches.
    pub default_cache_control: String,

    /// Query parameter carrying the page number.
    pub pagination_param: String,

    /// Body of the 410 Gone response.
    pub gone_body: String,

    /// Cache-Control of the 410 Gone response.
    pub gone_cache_control: String,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            decommissioned: ["/blog/coupons", "/blog/deals", "/blog/offers", "/coupons", "/deals"]
                .into_iter()
                .map(String::from)
                .collect(),
            static_prefix: "/static/".to_string(),
            static_extensions: [".css", ".js", ".woff", ".png", ".jpg", ".webp", ".avif"]
                .into_iter()
                .map(String::from)
                .collect(),
            cache_tiers: vec![
                CacheTierConfig {
                    name: "static".to_string(),
                    path_prefix: Some("/static/".to_string()),
                    path_contains: None,
                    cache_control: "public, max-age=31536000, immutable".to_string(),
                },
                CacheTierConfig {
                    name: "cities".to_string(),
                    path_prefix: Some("/cities/".to_string()),
                    path_contains: None,
                    cache_control: "public, max-age=86400, s-maxage=86400".to_string(),
                },
            ],
            default_cache_control: "public, max-age=3600, s-maxage=86400".to_string(),
            pagination_param: "p".to_string(),
            gone_body: "This content has been permanently removed.".to_string(),
            gone_cache_control: "public, max-age=86400".to_string(),
        }
    }
}

/// A single cache tier rule.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheTierConfig {
    /// Tier identifier for logging/metrics.
    pub name: String,

    /// Path prefix to match.
    pub path_prefix: Option<String>,

    /// Path substring to match.
    pub path_contains: Option<String>,

    /// Cache-Control value applied to matching responses.
    pub cache_control: String,
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Headers set on every origin-served response, in order.
    pub response_headers: Vec<HeaderEntry>,

    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        let headers = [
            ("Strict-Transport-Security", "max-age=63072000; includeSubDomains; preload"),
            ("X-Content-Type-Options", "nosniff"),
            ("X-Frame-Options", "DENY"),
            ("X-XSS-Protection", "1; mode=block"),
            ("Referrer-Policy", "strict-origin-when-cross-origin"),
        ];
        Self {
            response_headers: headers
                .into_iter()
                .map(|(name, value)| HeaderEntry {
                    name: name.to_string(),
                    value: value.to_string(),
                })
                .collect(),
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// A header name/value pair.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HeaderEntry {
    pub name: String,
    pub value: String,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config: EdgeConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.policy.pagination_param, "p");
        assert_eq!(config.policy.decommissioned.len(), 5);
        assert_eq!(config.security.response_headers.len(), 5);
        assert!(config.listener.tls.is_none());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: EdgeConfig = toml::from_str(
            r#"
            [origin]
            url = "http://10.0.0.5:9000"

            [policy]
            decommissioned = ["/promo"]

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.origin.url, "http://10.0.0.5:9000");
        assert_eq!(config.origin.max_body_bytes, 16 * 1024 * 1024);
        assert_eq!(config.policy.decommissioned, vec!["/promo".to_string()]);
        assert_eq!(config.policy.static_prefix, "/static/");
        assert_eq!(config.observability.log_format, LogFormat::Json);
    }
}
