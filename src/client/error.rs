//! Transport error taxonomy.
//!
//! Network-level failures (connect, timeout) are kept distinct from
//! backend-reported errors so polling loops can tell a blip from a verdict.

use serde::Deserialize;

/// Errors from the REST transport and the services built on it.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Authentication required")]
    Unauthorized,
    #[error("Network error: {0}")]
    Connection(String),
    #[error("Request timed out")]
    Timeout,
    #[error("HTTP transport error: {0}")]
    Http(String),
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("Response parsing failed: {0}")]
    Decode(String),
    #[error("Invalid upload: {0}")]
    InvalidUpload(String),
}

/// Error body shape produced by the backend: `{ "message": "..." }`.
#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl ApiError {
    /// Build an [`ApiError::Api`] from a non-2xx response, extracting the
    /// backend's `message` field when the body carries its JSON error shape.
    pub(crate) fn api(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .map(|b| b.message)
            .unwrap_or_else(|_| {
                let trimmed = body.trim();
                if trimmed.is_empty() {
                    format!("HTTP {status}")
                } else {
                    trimmed.to_string()
                }
            });
        ApiError::Api { status, message }
    }

    /// Whether a retry on the normal cadence is reasonable. Connection
    /// failures, timeouts and 5xx responses qualify; 4xx and decode
    /// failures do not.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Connection(_) | ApiError::Timeout | ApiError::Http(_) => true,
            ApiError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            ApiError::Connection(err.to_string())
        } else if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Http(err.to_string())
        }
    }
}
