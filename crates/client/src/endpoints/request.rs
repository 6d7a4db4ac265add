//! Retry helper for HTTP requests with exponential backoff.
//!
//! Responsibilities:
//! - Send one request, retrying on 429/502/503/504 with exponential backoff.
//! - Turn non-success responses into [`ClientError`] values, parsing Splunk's
//!   `{"messages": [...]}` bodies for a readable message.
//! - Record per-attempt metrics when a collector is supplied.
//!
//! Does NOT handle:
//! - Re-authentication. 401/403 surface as [`ClientError::Unauthorized`].
//! - Endpoint-specific status mapping (e.g. 400 on job creation).

use std::time::{Duration, Instant};

use reqwest::{RequestBuilder, Response};
use splunkblaze_config::ConnectionConfig;
use splunkblaze_config::constants::{DEFAULT_MAX_RETRIES, DEFAULT_RETRY_BACKOFF_MS};
use tracing::debug;

use crate::error::{ClientError, Result};
use crate::metrics::MetricsCollector;
use crate::models::SplunkMessages;

/// How many times, and how far apart, a retryable request is re-sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: usize,
    /// Delay before the first retry; doubled for each further retry.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            backoff: Duration::from_millis(DEFAULT_RETRY_BACKOFF_MS),
        }
    }
}

impl From<&ConnectionConfig> for RetryPolicy {
    fn from(config: &ConnectionConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff: config.retry_backoff,
        }
    }
}

impl RetryPolicy {
    /// A policy that sends each request once.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff: Duration::ZERO,
        }
    }

    /// Delay before retry number `attempt` (0-based): `backoff * 2^attempt`.
    pub fn delay_for(&self, attempt: usize) -> Duration {
        let factor = 2u32.saturating_pow(attempt.min(16) as u32);
        self.backoff.saturating_mul(factor)
    }
}

/// Sends an HTTP request, retrying rate-limited and unavailable responses.
///
/// # Errors
///
/// - [`ClientError::MaxRetriesExceeded`] when every attempt returned a retryable status.
/// - [`ClientError::Unauthorized`] on 401/403.
/// - [`ClientError::NotFound`] on 404.
/// - [`ClientError::ApiError`] for any other non-success status.
/// - [`ClientError::HttpError`] for transport failures.
pub async fn send_request_with_retry(
    builder: RequestBuilder,
    retry: RetryPolicy,
    endpoint: &str,
    method: &str,
    metrics: Option<&MetricsCollector>,
) -> Result<Response> {
    let max_retries = retry.max_retries;

    for attempt in 0..=max_retries {
        let attempt_builder = match builder.try_clone() {
            Some(cloned) => cloned,
            None => {
                debug!("Request builder cannot be cloned, single attempt only");
                return send_once(builder, endpoint, method, metrics).await;
            }
        };

        if attempt > 0
            && let Some(m) = metrics
        {
            m.record_retry(endpoint, method, attempt);
        }

        match send_once(attempt_builder, endpoint, method, metrics).await {
            Err(ClientError::ApiError { status, .. }) if ClientError::is_retryable_status(status) => {
                if attempt < max_retries {
                    let delay = retry.delay_for(attempt);
                    debug!(
                        attempt = attempt + 1,
                        max_retries = max_retries + 1,
                        status,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "Retryable response, backing off"
                    );
                    tokio::time::sleep(delay).await;
                } else {
                    debug!(attempts = attempt + 1, "Max retries exhausted");
                    let err = ClientError::MaxRetriesExceeded(max_retries + 1);
                    if let Some(m) = metrics {
                        m.record_client_error(endpoint, method, &err);
                    }
                    return Err(err);
                }
            }
            Ok(response) => {
                if attempt > 0 {
                    debug!(attempt = attempt + 1, "Request succeeded after retry");
                }
                return Ok(response);
            }
            Err(e) => {
                if let Some(m) = metrics {
                    m.record_client_error(endpoint, method, &e);
                }
                return Err(e);
            }
        }
    }

    Err(ClientError::MaxRetriesExceeded(max_retries + 1))
}

async fn send_once(
    builder: RequestBuilder,
    endpoint: &str,
    method: &str,
    metrics: Option<&MetricsCollector>,
) -> Result<Response> {
    if let Some(m) = metrics {
        m.record_request(endpoint, method);
    }
    let started = Instant::now();
    let result = builder.send().await;
    if let Some(m) = metrics {
        let status = result.as_ref().ok().map(|r| r.status().as_u16());
        m.record_request_duration(endpoint, method, started.elapsed(), status);
    }

    let response = result?;
    if response.status().is_success() {
        return Ok(response);
    }
    Err(error_from_response(response).await)
}

async fn error_from_response(response: Response) -> ClientError {
    let status = response.status().as_u16();
    let url = response.url().path().to_string();
    let request_id = response
        .headers()
        .get("X-Splunk-Request-Id")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string());
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Could not read error response body".to_string());

    let message = match serde_json::from_str::<SplunkMessages>(&body) {
        Ok(m) if !m.messages.is_empty() => m.joined(),
        _ => body,
    };

    match status {
        401 | 403 => ClientError::Unauthorized(message),
        404 => ClientError::NotFound(url),
        _ => ClientError::ApiError {
            status,
            url,
            message,
            request_id,
        },
    }
}
