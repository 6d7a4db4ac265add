//! Connection configuration and the top-level [`Config`].
//!
//! Responsibilities:
//! - Define remote connection settings (URL, TLS verification, timeouts, retries).
//! - Define the main `Config` structure combining every section.
//! - Provide convenience constructors for common config patterns.
//!
//! Does NOT handle:
//! - Configuration loading from env/files (see `loader` module).
//! - Actual network connections (see client crate).
//!
//! Invariants:
//! - `Config::default()` targets `https://localhost:8089` with development credentials.

use crate::constants::{
    DEFAULT_MAX_RETRIES, DEFAULT_PASSWORD, DEFAULT_RETRY_BACKOFF_MS, DEFAULT_SPLUNK_PORT,
    DEFAULT_TIMEOUT_SECS, DEFAULT_USERNAME,
};
use crate::types::auth::{AuthConfig, AuthStrategy};
use crate::types::stream::{FetchConfig, ServerConfig, StreamConfig};
use secrecy::SecretString;
use std::time::Duration;

/// Connection configuration for the Splunk management endpoint.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Base URL of the Splunk server (e.g., https://localhost:8089)
    pub base_url: String,
    /// Whether to skip TLS verification (for self-signed certificates)
    pub skip_verify: bool,
    /// Per-request timeout
    pub timeout: Duration,
    /// Maximum number of retries for rate-limited or unavailable responses
    pub max_retries: usize,
    /// Base delay of the exponential retry backoff
    pub retry_backoff: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            base_url: format!("https://localhost:{}", DEFAULT_SPLUNK_PORT),
            skip_verify: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_backoff: Duration::from_millis(DEFAULT_RETRY_BACKOFF_MS),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone)]
pub struct Config {
    /// Remote connection settings
    pub connection: ConnectionConfig,
    /// Credential for the shared session
    pub auth: AuthConfig,
    /// Web listener settings
    pub server: ServerConfig,
    /// Poll loop settings
    pub stream: StreamConfig,
    /// Result formatting options pinned on every dispatched job
    pub fetch: FetchConfig,
}

impl Default for Config {
    /// Creates a default configuration with development-only credentials.
    ///
    /// # Security Warning
    ///
    /// The default configuration uses Splunk's default credentials (admin/changeme)
    /// targeting localhost:8089. These are only appropriate for local development.
    fn default() -> Self {
        Self::with_session_token(
            format!("https://localhost:{}", DEFAULT_SPLUNK_PORT),
            DEFAULT_USERNAME.to_string(),
            SecretString::new(DEFAULT_PASSWORD.to_string().into()),
        )
    }
}

impl Config {
    /// Checks if this configuration is using the default development credentials.
    pub fn is_using_default_credentials(&self) -> bool {
        use secrecy::ExposeSecret;

        matches!(
            &self.auth.strategy,
            AuthStrategy::SessionToken { username, password }
                if username == DEFAULT_USERNAME
                    && password.expose_secret() == DEFAULT_PASSWORD
        )
    }

    /// Create a new config with the specified base URL and API token.
    pub fn with_api_token(base_url: String, token: SecretString) -> Self {
        Self::with_strategy(base_url, AuthStrategy::ApiToken { token })
    }

    /// Create a new config with the specified base URL and username/password.
    pub fn with_session_token(base_url: String, username: String, password: SecretString) -> Self {
        Self::with_strategy(base_url, AuthStrategy::SessionToken { username, password })
    }

    fn with_strategy(base_url: String, strategy: AuthStrategy) -> Self {
        Self {
            connection: ConnectionConfig {
                base_url,
                ..ConnectionConfig::default()
            },
            auth: AuthConfig { strategy },
            server: ServerConfig::default(),
            stream: StreamConfig::default(),
            fetch: FetchConfig::default(),
        }
    }
}
