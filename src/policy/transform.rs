//! Origin fetch transform directives.

use serde::Serialize;

/// Image optimization level requested from the origin pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageOptimization {
    Off,
    Lossless,
}

impl ImageOptimization {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Lossless => "lossless",
        }
    }
}

/// Options attached to the origin fetch on cache miss.
///
/// Recomputed per request from the normalized path, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformDirectives {
    pub image: ImageOptimization,
    pub minify_html: bool,
    pub minify_css: bool,
    pub minify_js: bool,
    /// Cache regardless of content type.
    pub cache_everything: bool,
}

impl TransformDirectives {
    /// The directive set used for every origin fetch.
    pub fn optimized(cache_everything: bool) -> Self {
        Self {
            image: ImageOptimization::Lossless,
            minify_html: true,
            minify_css: true,
            minify_js: true,
            cache_everything,
        }
    }

    /// Render as a single header value, e.g.
    /// `polish=lossless; minify=html,css,js; cache-everything=true`.
    pub fn to_header_value(&self) -> String {
        let minify: Vec<&str> = [
            (self.minify_html, "html"),
            (self.minify_css, "css"),
            (self.minify_js, "js"),
        ]
        .into_iter()
        .filter_map(|(on, name)| on.then_some(name))
        .collect();

        let minify = if minify.is_empty() {
            "none".to_string()
        } else {
            minify.join(",")
        };

        format!(
            "polish={}; minify={}; cache-everything={}",
            self.image.as_str(),
            minify,
            self.cache_everything
        )
    }
}
