//! Cache-Control header parsing.

use std::time::Duration;

/// The subset of Cache-Control directives the edge cache acts on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheControl {
    pub public: bool,
    pub private: bool,
    pub no_store: bool,
    pub no_cache: bool,
    pub immutable: bool,
    pub max_age: Option<u64>,
    pub s_maxage: Option<u64>,
}

impl CacheControl {
    /// Parse a Cache-Control header value. Unknown directives are ignored.
    pub fn parse(value: &str) -> Self {
        let mut cc = Self::default();

        for directive in value.split(',') {
            let directive = directive.trim().to_ascii_lowercase();
            let (name, arg) = match directive.split_once('=') {
                Some((name, arg)) => (name.trim(), Some(arg.trim().trim_matches('"'))),
                None => (directive.as_str(), None),
            };

            match name {
                "public" => cc.public = true,
                "private" => cc.private = true,
                "no-store" => cc.no_store = true,
                "no-cache" => cc.no_cache = true,
                "immutable" => cc.immutable = true,
                "max-age" => cc.max_age = arg.and_then(|a| a.parse().ok()),
                "s-maxage" => cc.s_maxage = arg.and_then(|a| a.parse().ok()),
                _ => {}
            }
        }

        cc
    }

    /// Lifetime in a shared cache: `s-maxage`, falling back to `max-age`.
    ///
    /// `None` means a shared cache must not store the response.
    pub fn shared_ttl(&self) -> Option<Duration> {
        if self.no_store || self.private {
            return None;
        }
        self.s_maxage
            .or(self.max_age)
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s_maxage_wins_over_max_age() {
        let cc = CacheControl::parse("public, max-age=3600, s-maxage=86400");
        assert!(cc.public);
        assert_eq!(cc.max_age, Some(3600));
        assert_eq!(cc.shared_ttl(), Some(Duration::from_secs(86400)));
    }

    #[test]
    fn falls_back_to_max_age() {
        let cc = CacheControl::parse("public, max-age=31536000, immutable");
        assert!(cc.immutable);
        assert_eq!(cc.shared_ttl(), Some(Duration::from_secs(31_536_000)));
    }

    #[test]
    fn uncacheable_directives() {
        assert_eq!(CacheControl::parse("no-store").shared_ttl(), None);
        assert_eq!(CacheControl::parse("private, max-age=60").shared_ttl(), None);
        assert_eq!(CacheControl::parse("max-age=0").shared_ttl(), None);
        assert_eq!(CacheControl::parse("").shared_ttl(), None);
    }

    #[test]
    fn tolerates_case_spacing_and_quotes() {
        let cc = CacheControl::parse(" Public ,S-MAXAGE=\"120\" , max-age=abc");
        assert!(cc.public);
        assert_eq!(cc.s_maxage, Some(120));
        assert_eq!(cc.max_age, None);
    }
}
