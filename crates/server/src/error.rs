//! Request-scoped errors for the HTTP front-end.
//!
//! Responsibilities:
//! - Name every way a search submission can be rejected before streaming starts.
//! - Map each error to the HTTP status returned to the browser.
//!
//! Does NOT handle:
//! - Errors after streaming has started. Those end the stream with a notice
//!   (see [`crate::stream::StopReason`]).
//!
//! Invariants:
//! - An error affects only the request that raised it.

use hyper::StatusCode;
use splunkblaze_client::ClientError;
use thiserror::Error;

/// Errors raised while handling one HTTP request.
#[derive(Error, Debug)]
pub enum ServerError {
    /// A required form field was absent or blank.
    #[error("Missing required parameter '{0}'")]
    MissingParameter(&'static str),

    /// The request body could not be read or exceeded the size limit.
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// The submission did not carry a valid form token.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The server could not build a response.
    #[error("Internal error: {0}")]
    Internal(String),

    /// No route for this path.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The path exists but not for this method.
    #[error("Method {method} not allowed for {path}")]
    MethodNotAllowed { method: String, path: String },

    /// Creating the remote job failed.
    #[error(transparent)]
    Dispatch(#[from] ClientError),
}

impl ServerError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingParameter(_) | Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::Dispatch(ClientError::QuerySyntax(_)) => StatusCode::BAD_REQUEST,
            Self::Dispatch(e) if e.is_auth_error() => StatusCode::BAD_GATEWAY,
            Self::Dispatch(e) if e.is_transient() => StatusCode::SERVICE_UNAVAILABLE,
            Self::Dispatch(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Message shown to the browser.
    ///
    /// Auth failures are reported generically; the detail goes to the log only.
    pub fn public_message(&self) -> String {
        match self {
            Self::Dispatch(e) if e.is_auth_error() => {
                "The search service rejected this front-end's credentials.".to_string()
            }
            Self::Dispatch(e) if e.is_transient() => {
                "The search service is temporarily unavailable. Try again shortly.".to_string()
            }
            Self::Internal(_) => "Something went wrong while handling this request.".to_string(),
            other => other.to_string(),
        }
    }
}
