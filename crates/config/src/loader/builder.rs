//! Configuration loader builder implementation.
//!
//! Responsibilities:
//! - Provide a builder-pattern `ConfigLoader` for layered configuration merging.
//! - Support loading from `.env`, environment variables, and direct builder methods.
//! - Validate and build the final `Config`.
//!
//! Does NOT handle:
//! - Direct environment variable parsing logic (delegated to env.rs).
//!
//! Invariants / Assumptions:
//! - Builder methods take precedence over environment variables.
//! - `load_dotenv()` must be called explicitly to enable `.env` file loading.
//! - The `DOTENV_DISABLED` variable is checked before `dotenvy::dotenv()` is called.
//! - An API token takes precedence over username/password.

use secrecy::SecretString;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use super::env::apply_env;
use super::error::ConfigError;
use crate::constants::{
    DEFAULT_PASSWORD, DEFAULT_USERNAME, MAX_BATCH_SIZE, MAX_MAX_RETRIES, MAX_TIMEOUT_SECS,
};
use crate::types::{
    AuthConfig, AuthStrategy, Config, ConnectionConfig, FetchConfig, ServerConfig, StreamConfig,
};

/// Configuration loader that builds config from builder overrides and the environment.
#[derive(Default)]
pub struct ConfigLoader {
    pub(super) base_url: Option<String>,
    pub(super) username: Option<String>,
    pub(super) password: Option<SecretString>,
    pub(super) api_token: Option<SecretString>,
    pub(super) skip_verify: Option<bool>,
    pub(super) timeout: Option<Duration>,
    pub(super) max_retries: Option<usize>,
    pub(super) bind_addr: Option<IpAddr>,
    pub(super) port: Option<u16>,
    pub(super) metrics_bind: Option<SocketAddr>,
    pub(super) cookie_secret: Option<SecretString>,
    pub(super) max_wait_secs: Option<i64>,
    pub(super) poll_interval: Option<Duration>,
    pub(super) batch_size: Option<usize>,
    pub(super) max_lines: Option<usize>,
}

impl ConfigLoader {
    /// Create a new configuration loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if dotenv loading is disabled via environment variable.
    fn dotenv_disabled() -> bool {
        matches!(
            std::env::var("DOTENV_DISABLED").ok().as_deref(),
            Some("true") | Some("1")
        )
    }

    /// Load environment variables from .env file if present.
    ///
    /// If `DOTENV_DISABLED` is set to "true" or "1", the .env file is not loaded.
    /// Missing `.env` files are silently ignored.
    ///
    /// SAFETY: Error messages never include raw .env line contents to prevent secret leakage.
    pub fn load_dotenv(self) -> Result<Self, ConfigError> {
        if Self::dotenv_disabled() {
            return Ok(self);
        }

        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if Self::is_not_found(&e) => Ok(self),
            Err(dotenvy::Error::LineParse(_, idx)) => {
                Err(ConfigError::DotenvParse { error_index: idx })
            }
            Err(dotenvy::Error::Io(io_err)) => Err(ConfigError::DotenvIo {
                kind: io_err.kind(),
            }),
            Err(_) => Err(ConfigError::DotenvUnknown),
        }
    }

    /// Check if a dotenv error indicates the file was not found.
    fn is_not_found(err: &dotenvy::Error) -> bool {
        matches!(
            err,
            dotenvy::Error::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound
        )
    }

    /// Fill every setting not already provided from environment variables.
    pub fn from_env(mut self) -> Result<Self, ConfigError> {
        apply_env(&mut self)?;
        Ok(self)
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Set the username.
    pub fn with_username(mut self, username: String) -> Self {
        self.username = Some(username);
        self
    }

    /// Set the password.
    pub fn with_password(mut self, password: String) -> Self {
        self.password = Some(SecretString::new(password.into()));
        self
    }

    /// Set the API token.
    pub fn with_api_token(mut self, token: String) -> Self {
        self.api_token = Some(SecretString::new(token.into()));
        self
    }

    /// Set whether to skip TLS verification.
    pub fn with_skip_verify(mut self, skip: bool) -> Self {
        self.skip_verify = Some(skip);
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the maximum number of retries.
    pub fn with_max_retries(mut self, retries: usize) -> Self {
        self.max_retries = Some(retries);
        self
    }

    /// Set the listener bind address.
    pub fn with_bind_addr(mut self, addr: IpAddr) -> Self {
        self.bind_addr = Some(addr);
        self
    }

    /// Set the listener port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Enable the Prometheus exporter on the given address.
    pub fn with_metrics_bind(mut self, addr: SocketAddr) -> Self {
        self.metrics_bind = Some(addr);
        self
    }

    /// Set the key used to sign form tokens.
    pub fn with_cookie_secret(mut self, secret: String) -> Self {
        self.cookie_secret = Some(SecretString::new(secret.into()));
        self
    }

    /// Set the wait budget in seconds. Negative disables it.
    pub fn with_max_wait_secs(mut self, secs: i64) -> Self {
        self.max_wait_secs = Some(secs);
        self
    }

    /// Set the idle poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    /// Set the number of events written per flush.
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = Some(size);
        self
    }

    /// Set the per-event line cap passed to the remote platform.
    pub fn with_max_lines(mut self, lines: usize) -> Self {
        self.max_lines = Some(lines);
        self
    }

    /// Build the final configuration.
    pub fn build(self) -> Result<Config, ConfigError> {
        let defaults = Config::default();

        let base_url = match self.base_url.as_deref() {
            Some(raw) => validate_and_normalize_base_url(raw)?,
            None => defaults.connection.base_url.clone(),
        };

        let strategy = if let Some(token) = self.api_token {
            AuthStrategy::ApiToken { token }
        } else {
            AuthStrategy::SessionToken {
                username: self
                    .username
                    .unwrap_or_else(|| DEFAULT_USERNAME.to_string()),
                password: self
                    .password
                    .unwrap_or_else(|| SecretString::new(DEFAULT_PASSWORD.to_string().into())),
            }
        };

        let connection = ConnectionConfig {
            base_url,
            skip_verify: self.skip_verify.unwrap_or(defaults.connection.skip_verify),
            timeout: self.timeout.unwrap_or(defaults.connection.timeout),
            max_retries: self.max_retries.unwrap_or(defaults.connection.max_retries),
            retry_backoff: defaults.connection.retry_backoff,
        };
        Self::validate_connection(&connection)?;

        let server = ServerConfig {
            bind_addr: self.bind_addr.unwrap_or(defaults.server.bind_addr),
            port: self.port.unwrap_or(defaults.server.port),
            metrics_bind: self.metrics_bind,
            cookie_secret: self.cookie_secret,
        };

        let stream = StreamConfig {
            max_wait_secs: self.max_wait_secs.unwrap_or(defaults.stream.max_wait_secs),
            poll_interval: self.poll_interval.unwrap_or(defaults.stream.poll_interval),
            batch_size: self.batch_size.unwrap_or(defaults.stream.batch_size),
        };
        Self::validate_stream(&stream)?;

        let fetch = FetchConfig {
            max_lines: self.max_lines.unwrap_or(defaults.fetch.max_lines),
            ..defaults.fetch
        };
        if fetch.max_lines == 0 {
            return Err(ConfigError::InvalidStreamSetting {
                message: "max_lines must be greater than 0".to_string(),
            });
        }

        Ok(Config {
            connection,
            auth: AuthConfig { strategy },
            server,
            stream,
            fetch,
        })
    }

    /// Validates timeout and retry settings.
    fn validate_connection(connection: &ConnectionConfig) -> Result<(), ConfigError> {
        let timeout_secs = connection.timeout.as_secs();

        if timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout {
                message: "timeout must be greater than 0 seconds".to_string(),
            });
        }

        if timeout_secs > MAX_TIMEOUT_SECS {
            return Err(ConfigError::InvalidTimeout {
                message: format!(
                    "timeout exceeds maximum allowed value of {} seconds",
                    MAX_TIMEOUT_SECS
                ),
            });
        }

        if connection.max_retries > MAX_MAX_RETRIES {
            return Err(ConfigError::InvalidMaxRetries {
                message: format!(
                    "must be between 0 and {} (got {})",
                    MAX_MAX_RETRIES, connection.max_retries
                ),
            });
        }

        Ok(())
    }

    /// Validates poll loop settings.
    fn validate_stream(stream: &StreamConfig) -> Result<(), ConfigError> {
        if stream.poll_interval.is_zero() {
            return Err(ConfigError::InvalidStreamSetting {
                message: "poll interval must be greater than 0 milliseconds".to_string(),
            });
        }

        if stream.batch_size == 0 || stream.batch_size > MAX_BATCH_SIZE {
            return Err(ConfigError::InvalidStreamSetting {
                message: format!(
                    "batch size must be between 1 and {} (got {})",
                    MAX_BATCH_SIZE, stream.batch_size
                ),
            });
        }

        Ok(())
    }
}

/// Validate that a base URL is an absolute http(s) URL with a host, and strip
/// trailing slashes.
fn validate_and_normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(ConfigError::MissingBaseUrl);
    }

    let parsed = url::Url::parse(trimmed).map_err(|e| ConfigError::InvalidValue {
        var: "base_url".into(),
        message: format!(
            "must be an absolute http(s) URL with a host (e.g. https://localhost:8089): {e}"
        ),
    })?;

    let scheme = parsed.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(ConfigError::InvalidValue {
            var: "base_url".into(),
            message: format!(
                "scheme must be http or https (e.g. https://localhost:8089), got: {scheme}"
            ),
        });
    }

    if parsed.host_str().is_none() {
        return Err(ConfigError::InvalidValue {
            var: "base_url".into(),
            message: "host is required (e.g. https://localhost:8089)".into(),
        });
    }

    Ok(parsed.as_str().trim_end_matches('/').to_string())
}
