//! Response handling and transformation.
//!
//! # Responsibilities
//! - Hold buffered responses the edge serves and caches (`EdgeResponse`)
//! - Build the edge's own responses (redirects, 410 Gone)
//! - Strip hop-by-hop headers from origin responses
//! - Convert into the axum response sent to the client
//!
//! # Design Decisions
//! - Bodies are buffered so the served and cached copies are byte-identical
//! - Cloning is cheap: `Bytes` bodies are reference counted

use axum::body::{Body, Bytes};
use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Headers that describe a single connection and must not be forwarded or cached.
const HOP_BY_HOP: [HeaderName; 7] = [
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// A fully buffered HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl EdgeResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// A permanent redirect with no body.
    pub fn moved_permanently(location: HeaderValue) -> Self {
        let mut response = Self::new(StatusCode::MOVED_PERMANENTLY, Bytes::new());
        response.headers.insert(header::LOCATION, location);
        response
    }

    /// A plain-text 410 for permanently removed content.
    pub fn gone(body: &str, cache_control: HeaderValue) -> Self {
        let mut response = Self::new(StatusCode::GONE, body.to_owned());
        response.headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain"),
        );
        response.headers.insert(header::CACHE_CONTROL, cache_control);
        response
    }

    /// Remove connection-scoped headers, including those named by `Connection`.
    pub fn strip_hop_by_hop(&mut self) {
        strip_hop_by_hop(&mut self.headers);
    }
}

/// Remove connection-scoped headers, including those named by `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let named: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in named.iter().chain(HOP_BY_HOP.iter()) {
        headers.remove(name);
    }
    headers.remove("keep-alive");
}

impl IntoResponse for EdgeResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gone_is_plain_text_and_cacheable() {
        let response = EdgeResponse::gone(
            "This content has been permanently removed.",
            HeaderValue::from_static("public, max-age=86400"),
        );
        assert_eq!(response.status, StatusCode::GONE);
        assert_eq!(response.headers[header::CONTENT_TYPE], "text/plain");
        assert_eq!(response.headers[header::CACHE_CONTROL], "public, max-age=86400");
        assert_eq!(response.body, "This content has been permanently removed.");
    }

    #[test]
    fn strips_hop_by_hop_headers() {
        let mut response = EdgeResponse::new(StatusCode::OK, "ok");
        response.headers.insert(header::CONNECTION, HeaderValue::from_static("close, x-trace"));
        response.headers.insert("x-trace", HeaderValue::from_static("1"));
        response.headers.insert("keep-alive", HeaderValue::from_static("timeout=5"));
        response.headers.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        response.headers.insert(header::ETAG, HeaderValue::from_static("\"v1\""));

        response.strip_hop_by_hop();

        assert_eq!(response.headers.len(), 1);
        assert_eq!(response.headers[header::ETAG], "\"v1\"");
    }

    #[test]
    fn converts_into_axum_response() {
        let response = EdgeResponse::moved_permanently(HeaderValue::from_static("https://a.test/"))
            .into_response();
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(response.headers()[header::LOCATION], "https://a.test/");
    }
}
