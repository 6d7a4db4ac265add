//! Authentication types for the shared remote session.
//!
//! Responsibilities:
//! - Define the credential used to obtain the single process-wide session.
//!
//! Does NOT handle:
//! - The login exchange itself (see the client crate).
//!
//! Invariants:
//! - Secret values are wrapped in `SecretString` and never printed by `Debug`.

use secrecy::SecretString;

/// Strategy for authenticating with Splunk.
#[derive(Debug, Clone)]
pub enum AuthStrategy {
    /// Username and password, exchanged once at startup for a session key.
    SessionToken {
        username: String,
        password: SecretString,
    },
    /// Pre-issued API token, used as a bearer token without a login call.
    ApiToken { token: SecretString },
}

/// Authentication configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// The authentication strategy to use.
    pub strategy: AuthStrategy,
}
