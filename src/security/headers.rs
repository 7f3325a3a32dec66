//! Security response headers.

use axum::http::{HeaderMap, HeaderName, HeaderValue};

use crate::config::{HeaderEntry, ValidationError};

/// The fixed header set injected into every origin-served response.
#[derive(Debug, Clone, Default)]
pub struct SecurityHeaders {
    headers: Vec<(HeaderName, HeaderValue)>,
}

impl SecurityHeaders {
    /// Compile configured header entries.
    pub fn from_config(entries: &[HeaderEntry]) -> Result<Self, ValidationError> {
        let headers = entries
            .iter()
            .map(|entry| {
                let invalid = || ValidationError::InvalidHeader {
                    name: entry.name.clone(),
                };
                let name = HeaderName::from_bytes(entry.name.as_bytes()).map_err(|_| invalid())?;
                let value = HeaderValue::from_str(&entry.value).map_err(|_| invalid())?;
                Ok((name, value))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { headers })
    }

    /// Set every header, replacing values the origin may have sent.
    pub fn apply(&self, target: &mut HeaderMap) {
        for (name, value) in &self.headers {
            target.insert(name.clone(), value.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}
