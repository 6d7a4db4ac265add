//! Authentication endpoint.

use reqwest::Client;
use secrecy::SecretString;
use tracing::debug;

use crate::endpoints::{RetryPolicy, send_request_with_retry, top_level_or_entry_str};
use crate::error::{ClientError, Result};
use crate::metrics::MetricsCollector;

/// Login to Splunk with username and password, returning the session key.
///
/// A rejected login surfaces as [`ClientError::AuthFailed`].
pub async fn login(
    client: &Client,
    base_url: &str,
    username: &str,
    password: &str,
    retry: RetryPolicy,
    metrics: Option<&MetricsCollector>,
) -> Result<SecretString> {
    debug!("Logging in to Splunk as {}", username);

    let url = format!("{}/services/auth/login", base_url);
    let builder = client
        .post(&url)
        .form(&[
            ("username", username),
            ("password", password),
            ("output_mode", "json"),
        ]);
    let response =
        send_request_with_retry(builder, retry, "/services/auth/login", "POST", metrics)
            .await
            .map_err(|e| match e {
                ClientError::Unauthorized(msg) => ClientError::AuthFailed(msg),
                ClientError::ApiError {
                    status: 400,
                    message,
                    ..
                } => ClientError::AuthFailed(message),
                other => other,
            })?;

    let resp: serde_json::Value = response.json().await?;

    top_level_or_entry_str(&resp, "sessionKey")
        .map(|s| SecretString::new(s.to_string().into()))
        .ok_or_else(|| ClientError::InvalidResponse("Missing sessionKey in response".to_string()))
}
