//! Main Splunk REST API client.
//!
//! # Submodules
//! - [`builder`]: Client construction, configuration and the one-time login
//! - `jobs`: Search job methods and the [`crate::JobApi`] implementation
//!
//! # What this module does NOT handle:
//! - Direct HTTP request implementation (delegated to [`crate::endpoints`])
//! - Session refresh. The credential is fixed at construction.
//!
//! # Invariants
//! - A constructed [`SplunkClient`] always holds a usable credential.
//! - The client is immutable; cloning shares the underlying connection pool.

pub mod builder;
mod jobs;

use crate::auth::Credential;
use crate::endpoints::RetryPolicy;
use crate::metrics::MetricsCollector;

/// Splunk REST API client.
///
/// Created with [`SplunkClient::builder()`] and
/// [`builder::SplunkClientBuilder::connect`], which performs the login (for
/// username/password auth) exactly once.
///
/// ```rust,ignore
/// use splunkblaze_client::{AuthStrategy, SplunkClient};
/// use secrecy::SecretString;
///
/// let client = SplunkClient::builder()
///     .base_url("https://localhost:8089".to_string())
///     .auth_strategy(AuthStrategy::ApiToken {
///         token: SecretString::new("my-token".to_string().into()),
///     })
///     .connect()
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct SplunkClient {
    pub(crate) http: reqwest::Client,
    pub(crate) base_url: String,
    pub(crate) credential: Credential,
    pub(crate) retry: RetryPolicy,
    pub(crate) metrics: Option<MetricsCollector>,
}

impl SplunkClient {
    /// Create a new client builder.
    pub fn builder() -> builder::SplunkClientBuilder {
        builder::SplunkClientBuilder::new()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check if the client is using API token authentication.
    pub fn is_api_token_auth(&self) -> bool {
        self.credential.is_api_token()
    }

    /// Retry policy applied to every call.
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }
}
