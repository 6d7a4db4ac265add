//! Client builder for constructing [`SplunkClient`] instances.
//!
//! This module is responsible for:
//! - Providing a fluent builder API for client configuration
//! - Validating required configuration (base_url, auth_strategy)
//! - Normalizing the base URL (removing trailing slashes)
//! - Configuring the underlying HTTP client (timeouts, TLS verification)
//! - Obtaining the process-wide credential exactly once
//!
//! # What this module does NOT handle:
//! - Actual API calls (handled by [`SplunkClient`] methods)
//!
//! # Invariants
//! - `base_url` and `auth_strategy` are required fields
//! - The base URL is always normalized to have no trailing slashes
//! - `skip_verify` only affects HTTPS connections; HTTP connections log a warning

use std::time::Duration;

use secrecy::ExposeSecret;
use splunkblaze_config::{
    AuthStrategy, Config,
    constants::{DEFAULT_MAX_REDIRECTS, DEFAULT_TIMEOUT_SECS},
};
use tracing::{info, warn};

use crate::auth::Credential;
use crate::client::SplunkClient;
use crate::endpoints::{self, RetryPolicy};
use crate::error::{ClientError, Result};
use crate::metrics::MetricsCollector;

/// Builder for creating a new [`SplunkClient`].
pub struct SplunkClientBuilder {
    base_url: Option<String>,
    auth_strategy: Option<AuthStrategy>,
    skip_verify: bool,
    timeout: Duration,
    retry: RetryPolicy,
    metrics: Option<MetricsCollector>,
}

impl Default for SplunkClientBuilder {
    fn default() -> Self {
        Self {
            base_url: None,
            auth_strategy: None,
            skip_verify: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retry: RetryPolicy::default(),
            metrics: None,
        }
    }
}

impl SplunkClientBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL of the Splunk management port, e.g. `https://localhost:8089`.
    pub fn base_url(mut self, url: String) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Set the authentication strategy.
    pub fn auth_strategy(mut self, strategy: AuthStrategy) -> Self {
        self.auth_strategy = Some(strategy);
        self
    }

    /// Set whether to skip TLS certificate verification.
    ///
    /// # Security Warning
    /// Only use this in development or testing environments.
    pub fn skip_verify(mut self, skip: bool) -> Self {
        self.skip_verify = skip;
        self
    }

    /// Set the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry policy for rate-limited and unavailable responses.
    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set the metrics collector for API call performance tracking.
    pub fn metrics(mut self, metrics: MetricsCollector) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Create a client builder from configuration.
    pub fn from_config(mut self, config: &Config) -> Self {
        self.base_url = Some(config.connection.base_url.clone());
        self.auth_strategy = Some(config.auth.strategy.clone());
        self.skip_verify = config.connection.skip_verify;
        self.timeout = config.connection.timeout;
        self.retry = RetryPolicy::from(&config.connection);
        self
    }

    /// Normalize a base URL by removing trailing slashes.
    fn normalize_base_url(url: String) -> String {
        url.trim_end_matches('/').to_string()
    }

    fn build_http(&self, base_url: &str) -> Result<reqwest::Client> {
        let mut http_builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .redirect(reqwest::redirect::Policy::limited(DEFAULT_MAX_REDIRECTS));

        if self.skip_verify {
            if base_url.starts_with("https://") {
                http_builder = http_builder.danger_accept_invalid_certs(true);
            } else {
                warn!(
                    "skip_verify=true has no effect on HTTP URLs. TLS verification only applies to HTTPS connections."
                );
            }
        }

        Ok(http_builder.build()?)
    }

    /// Build the client and obtain its credential.
    ///
    /// For [`AuthStrategy::SessionToken`] this performs the login call; for
    /// [`AuthStrategy::ApiToken`] no request is made.
    ///
    /// # Errors
    ///
    /// - [`ClientError::InvalidUrl`] if `base_url` was not provided.
    /// - [`ClientError::AuthFailed`] if `auth_strategy` was not provided or the login was rejected.
    /// - A transport error if the remote cannot be reached during login.
    pub async fn connect(self) -> Result<SplunkClient> {
        let base_url = self
            .base_url
            .clone()
            .ok_or_else(|| ClientError::InvalidUrl("base_url is required".to_string()))?;
        let base_url = Self::normalize_base_url(base_url);

        let auth_strategy = self
            .auth_strategy
            .clone()
            .ok_or_else(|| ClientError::AuthFailed("auth_strategy is required".to_string()))?;

        let http = self.build_http(&base_url)?;

        let credential = match auth_strategy {
            AuthStrategy::ApiToken { token } => Credential::ApiToken(token),
            AuthStrategy::SessionToken { username, password } => {
                let key = endpoints::login(
                    &http,
                    &base_url,
                    &username,
                    password.expose_secret(),
                    self.retry,
                    self.metrics.as_ref(),
                )
                .await?;
                info!(username = %username, "Obtained Splunk session");
                Credential::SessionKey(key)
            }
        };

        Ok(SplunkClient {
            http,
            base_url,
            credential,
            retry: self.retry,
            metrics: self.metrics,
        })
    }
}
