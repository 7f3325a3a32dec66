//! Pipeline errors.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::origin::OriginError;

/// Failures that abort the pipeline.
///
/// There is no recovery inside the pipeline: the host adapter turns these
/// into a generic failure response.
#[derive(Debug, thiserror::Error)]
pub enum EdgeError {
    /// The request URL could not be reconstructed or parsed.
    #[error("malformed request URL: {0}")]
    MalformedUrl(String),

    /// The origin fetch failed.
    #[error(transparent)]
    Origin(#[from] OriginError),
}

impl EdgeError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MalformedUrl(_) => StatusCode::BAD_REQUEST,
            Self::Origin(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for EdgeError {
    fn into_response(self) -> Response {
        let body = match &self {
            Self::MalformedUrl(_) => "Bad request",
            Self::Origin(_) => "Upstream request failed",
        };
        (self.status(), body).into_response()
    }
}
