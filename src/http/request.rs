//! Request handling.
//!
//! # Responsibilities
//! - Request ID header name and accessors
//! - Determine the scheme a request arrived over
//! - Rebuild the absolute URL the pipeline works on (`IncomingRequest`)
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Scheme comes from the listener, never from the client, unless
//!   forwarded-proto trust is explicitly enabled
//! - The original request is preserved; pipeline stages work on a copy of the URL

use axum::body::Bytes;
use axum::http::header::{HeaderMap, HeaderName, HOST};
use axum::http::request::Parts;
use axum::http::uri::Authority;
use axum::http::{Method, Request};
use url::Url;

use crate::edge::EdgeError;

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");

/// Access to the request ID assigned by the request-id layer.
pub trait RequestIdExt {
    /// The request ID, or `"unknown"` if none was assigned.
    fn request_id(&self) -> &str;
}

impl RequestIdExt for HeaderMap {
    fn request_id(&self) -> &str {
        self.get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
    }
}

impl<B> RequestIdExt for Request<B> {
    fn request_id(&self) -> &str {
        self.headers().request_id()
    }
}

/// The scheme of the listener a request was accepted on.
///
/// Inserted as a request extension by each listener's router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerScheme {
    Http,
    Https,
}

impl ListenerScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

/// One inbound request as seen by the edge pipeline.
#[derive(Debug, Clone)]
pub struct IncomingRequest {
    pub method: Method,
    /// Absolute URL including scheme and host.
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl IncomingRequest {
    /// Rebuild the absolute request URL from request parts.
    pub fn from_parts(
        parts: &Parts,
        body: Bytes,
        listener: ListenerScheme,
        trust_forwarded_proto: bool,
    ) -> Result<Self, EdgeError> {
        let scheme = match listener {
            ListenerScheme::Http if trust_forwarded_proto && forwarded_https(&parts.headers) => "https",
            other => other.as_str(),
        };

        let authority = match parts.headers.get(HOST) {
            Some(value) => Authority::try_from(value.as_bytes())
                .map_err(|e| EdgeError::MalformedUrl(format!("invalid Host header: {e}")))?,
            None => parts
                .uri
                .authority()
                .cloned()
                .ok_or_else(|| EdgeError::MalformedUrl("missing Host header".to_string()))?,
        };
        // Authority parsing already rejects any path, query or fragment.
        if authority.as_str().contains('@') {
            return Err(EdgeError::MalformedUrl(
                "userinfo is not allowed in Host".to_string(),
            ));
        }

        let mut url = Url::parse(&format!("{scheme}://{authority}/"))
            .map_err(|e| EdgeError::MalformedUrl(e.to_string()))?;
        url.set_path(parts.uri.path());
        url.set_query(parts.uri.query());

        Ok(Self {
            method: parts.method.clone(),
            url,
            headers: parts.headers.clone(),
            body,
        })
    }
}

fn forwarded_https(headers: &HeaderMap) -> bool {
    headers
        .get(X_FORWARDED_PROTO)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|proto| proto.trim().eq_ignore_ascii_case("https"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(uri: &str, headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn rebuilds_url_from_host_header() {
        let parts = parts("/blog?p=3", &[("host", "apexenterprises.net")]);
        let request =
            IncomingRequest::from_parts(&parts, Bytes::new(), ListenerScheme::Http, false).unwrap();
        assert_eq!(request.url.as_str(), "http://apexenterprises.net/blog?p=3");
    }

    #[test]
    fn tls_listener_is_https() {
        let parts = parts("/about", &[("host", "apexenterprises.net")]);
        let request =
            IncomingRequest::from_parts(&parts, Bytes::new(), ListenerScheme::Https, false).unwrap();
        assert_eq!(request.url.scheme(), "https");
    }

    #[test]
    fn forwarded_proto_only_when_trusted() {
        let parts = parts(
            "/about",
            &[("host", "apexenterprises.net"), ("x-forwarded-proto", "https")],
        );
        let untrusted =
            IncomingRequest::from_parts(&parts, Bytes::new(), ListenerScheme::Http, false).unwrap();
        let trusted =
            IncomingRequest::from_parts(&parts, Bytes::new(), ListenerScheme::Http, true).unwrap();
        assert_eq!(untrusted.url.scheme(), "http");
        assert_eq!(trusted.url.scheme(), "https");
    }

    #[test]
    fn missing_host_is_malformed() {
        let parts = parts("/about", &[]);
        let err = IncomingRequest::from_parts(&parts, Bytes::new(), ListenerScheme::Http, false)
            .unwrap_err();
        assert!(matches!(err, EdgeError::MalformedUrl(_)));
    }

    #[test]
    fn host_cannot_rewrite_path_query_or_userinfo() {
        for host in [
            "apexenterprises.net/cities",
            "apexenterprises.net?x=",
            "apexenterprises.net#frag",
            "evil@apexenterprises.net",
            "",
        ] {
            let parts = parts("/about", &[("host", host)]);
            let err = IncomingRequest::from_parts(&parts, Bytes::new(), ListenerScheme::Https, false)
                .unwrap_err();
            assert!(matches!(err, EdgeError::MalformedUrl(_)), "{host:?}");
        }
    }

    #[test]
    fn path_and_query_come_from_request_target() {
        let parts = parts("/cities/pune?p=2&ref=nav", &[("host", "apexenterprises.net:8443")]);
        let request =
            IncomingRequest::from_parts(&parts, Bytes::new(), ListenerScheme::Https, false).unwrap();
        assert_eq!(request.url.host_str(), Some("apexenterprises.net"));
        assert_eq!(request.url.port(), Some(8443));
        assert_eq!(request.url.path(), "/cities/pune");
        assert_eq!(request.url.query(), Some("p=2&ref=nav"));
    }

    #[test]
    fn request_id_defaults_to_unknown() {
        let request = Request::builder().body(()).unwrap();
        assert_eq!(request.request_id(), "unknown");

        let request = Request::builder().header("x-request-id", "abc").body(()).unwrap();
        assert_eq!(request.request_id(), "abc");
    }
}
