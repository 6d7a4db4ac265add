//! Authentication strategies and the process-wide credential.
//!
//! Responsibilities:
//! - Hold the credential obtained once at startup.
//! - Render the `Authorization` header for every API call.
//!
//! Does NOT handle:
//! - The login exchange (see [`crate::endpoints::login`]).
//! - Session refresh. A rejected credential surfaces as
//!   [`crate::ClientError::Unauthorized`] and is never renewed.
//!
//! Invariants:
//! - Secret values are wrapped in `SecretString` and never appear in `Debug` output.

use secrecy::{ExposeSecret, SecretString};

pub use splunkblaze_config::AuthStrategy;

/// Credential attached to every request.
#[derive(Debug, Clone)]
pub enum Credential {
    /// Session key returned by `/services/auth/login`.
    SessionKey(SecretString),
    /// Pre-issued API token.
    ApiToken(SecretString),
}

impl Credential {
    /// Value for the `Authorization` header.
    ///
    /// Session keys use the `Splunk` scheme, API tokens the `Bearer` scheme.
    pub fn authorization_header(&self) -> String {
        match self {
            Self::SessionKey(key) => format!("Splunk {}", key.expose_secret()),
            Self::ApiToken(token) => format!("Bearer {}", token.expose_secret()),
        }
    }

    /// Whether this credential came from a static API token.
    pub fn is_api_token(&self) -> bool {
        matches!(self, Self::ApiToken(_))
    }
}
