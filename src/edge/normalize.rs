//! URL normalization stages.

use url::Url;

/// The request URL as rewritten by the pipeline stages.
///
/// Starts as a copy of the incoming URL; each stage mutates it in place
/// before it becomes a redirect target or a cache key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedUrl(Url);

impl NormalizedUrl {
    pub fn new(url: Url) -> Self {
        Self(url)
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }

    pub fn path(&self) -> &str {
        self.0.path()
    }

    /// True if the request arrived over plain HTTP.
    pub fn is_insecure(&self) -> bool {
        self.0.scheme() == "http"
    }

    /// Substitute `https` for the scheme, keeping everything else.
    pub fn upgrade_scheme(&mut self) {
        // http → https is always a permitted transition for special schemes.
        let _ = self.0.set_scheme("https");
    }

    /// Rewrite `?<param>=<n>` with `n > 1` into the path form `/<path>/page/<n>/`.
    ///
    /// Returns `true` if the URL changed. Only the first occurrence of the
    /// parameter decides the page; every occurrence is removed. Other query
    /// pairs are kept in order.
    pub fn canonicalize_pagination(&mut self, param: &str) -> bool {
        let page = self
            .0
            .query_pairs()
            .find(|(name, _)| name == param)
            .and_then(|(_, value)| value.parse::<u64>().ok())
            .filter(|page| *page > 1);

        let Some(page) = page else {
            return false;
        };

        let path = format!("{}/page/{}/", self.0.path().trim_end_matches('/'), page);
        self.0.set_path(&path);

        let kept: Vec<(String, String)> = self
            .0
            .query_pairs()
            .filter(|(name, _)| name != param)
            .map(|(name, value)| (name.into_owned(), value.into_owned()))
            .collect();

        if kept.is_empty() {
            self.0.set_query(None);
        } else {
            self.0.query_pairs_mut().clear().extend_pairs(kept);
        }
        true
    }
}
