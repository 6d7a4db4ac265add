//! Error types for the Splunk client.
//!
//! Responsibilities:
//! - Define the single error enum returned by every client operation.
//! - Classify errors for callers: transient (retry at the next poll), auth, or fatal.
//!
//! Does NOT handle:
//! - HTTP status mapping for the front-end (see the server crate).
//!
//! Invariants:
//! - Error messages never contain credentials or session keys.

use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur during Splunk client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Login was rejected or no usable credential was configured.
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    /// The shared credential was rejected by the server after startup.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// API error response from Splunk.
    #[error("API error ({status}) at {url}: {message}{}", .request_id.as_ref().map(|id| format!(" [Request ID: {id}]")).unwrap_or_default())]
    ApiError {
        status: u16,
        url: String,
        message: String,
        request_id: Option<String>,
    },

    /// The search text was rejected by the search parser.
    #[error("Search syntax error: {0}")]
    QuerySyntax(String),

    /// An event range was requested with `start > end`.
    #[error("Invalid event range [{start}, {end})")]
    InvalidRange { start: usize, end: usize },

    /// Invalid response format from Splunk.
    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    /// Maximum retries exceeded on rate-limited or unavailable responses.
    #[error("Maximum retries exceeded ({0} attempts)")]
    MaxRetriesExceeded(usize),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Resource not found (for example an expired search job).
    #[error("Resource not found: {0}")]
    NotFound(String),
}

impl ClientError {
    /// Check if this error is transient: the remote is temporarily unavailable
    /// and the same call may succeed on the next poll.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::HttpError(e) => !e.is_builder() && !e.is_decode(),
            Self::MaxRetriesExceeded(_) => true,
            Self::ApiError { status, .. } => Self::is_retryable_status(*status) || *status >= 500,
            _ => false,
        }
    }

    /// Check if an HTTP status code is retried at the request layer.
    ///
    /// Retryable status codes:
    /// - 429: Too Many Requests (rate limiting)
    /// - 502: Bad Gateway
    /// - 503: Service Unavailable
    /// - 504: Gateway Timeout
    pub fn is_retryable_status(status: u16) -> bool {
        matches!(status, 429 | 502 | 503 | 504)
    }

    /// Check if this error indicates an invalid credential or session.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::AuthFailed(_) | Self::Unauthorized(_))
    }
}
