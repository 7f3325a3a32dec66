//! Cache key composition.

use std::fmt;

use axum::http::Method;
use url::Url;

/// The identity a response is stored and looked up under.
///
/// Built from the normalized URL, so `/blog?p=2` and `/blog/page/2/` share a
/// key once pagination has been canonicalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Build the key for `method` on a normalized URL. Fragments are ignored.
    pub fn new(method: &Method, url: &Url) -> Self {
        let mut url = url.clone();
        url.set_fragment(None);
        Self(format!("{} {}", method, url))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_ignores_fragment() {
        let a = Url::parse("https://apexenterprises.net/about#team").unwrap();
        let b = Url::parse("https://apexenterprises.net/about").unwrap();
        assert_eq!(CacheKey::new(&Method::GET, &a), CacheKey::new(&Method::GET, &b));
    }

    #[test]
    fn key_distinguishes_method_and_query() {
        let url = Url::parse("https://apexenterprises.net/jobs?city=pune").unwrap();
        let other = Url::parse("https://apexenterprises.net/jobs?city=goa").unwrap();

        assert_ne!(CacheKey::new(&Method::GET, &url), CacheKey::new(&Method::HEAD, &url));
        assert_ne!(CacheKey::new(&Method::GET, &url), CacheKey::new(&Method::GET, &other));
        assert_eq!(
            CacheKey::new(&Method::GET, &url).as_str(),
            "GET https://apexenterprises.net/jobs?city=pune"
        );
    }
}
