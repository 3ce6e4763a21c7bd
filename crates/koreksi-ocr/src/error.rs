//! OCR error types.

use thiserror::Error;

/// Errors that can occur when talking to an OCR backend.
#[derive(Debug, Error)]
pub enum OcrError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// The API key was rejected.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request succeeded but the image itself could not be processed.
    #[error("image rejected (code {code}): {message}")]
    ImageRejected { code: i64, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),
}
