//! Metrics collection for API call performance.
//!
//! This module provides metrics collection for Splunk API calls, including:
//! - Request latency histograms
//! - Request counters (total, retries, errors)
//! - Error categorization
//!
//! # What this module does NOT handle:
//! - Metrics exposition (see [`crate::metrics_exporter`])
//! - Stream outcome metrics (recorded by the server crate)
//!
//! # Invariants
//! - All metrics use consistent label names: `endpoint`, `method`, `status`, `error_category`
//! - Metric recording is infallible and never disrupts API calls
//! - Zero-cost when no metrics recorder is installed

use crate::error::ClientError;
use std::time::Duration;

/// Metric name for request duration histogram.
pub const METRIC_REQUEST_DURATION: &str = "splunk_api_request_duration_seconds";

/// Metric name for total request counter.
pub const METRIC_REQUESTS_TOTAL: &str = "splunk_api_requests_total";

/// Metric name for retry counter.
pub const METRIC_RETRIES_TOTAL: &str = "splunk_api_retries_total";

/// Metric name for error counter.
pub const METRIC_ERRORS_TOTAL: &str = "splunk_api_errors_total";

/// Metric name for deserialization failure counter.
pub const METRIC_DESERIALIZATION_FAILURES: &str = "splunk_api_deserialization_failures_total";

/// Error categories for metrics labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Transport-level errors (connection refused, DNS, etc.)
    Transport,
    /// Request timeout
    Timeout,
    /// Rejected credential
    Auth,
    /// HTTP 4xx client errors
    Http4xx,
    /// HTTP 5xx server errors
    Http5xx,
    /// Retries exhausted on rate-limited or unavailable responses
    RetriesExhausted,
    /// Unparseable response body
    Parse,
    /// Unknown/unclassified errors
    Unknown,
}

impl ErrorCategory {
    /// Returns the string label for this error category.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Transport => "transport",
            ErrorCategory::Timeout => "timeout",
            ErrorCategory::Auth => "auth",
            ErrorCategory::Http4xx => "http_4xx",
            ErrorCategory::Http5xx => "http_5xx",
            ErrorCategory::RetriesExhausted => "retries_exhausted",
            ErrorCategory::Parse => "parse",
            ErrorCategory::Unknown => "unknown",
        }
    }
}

impl From<&ClientError> for ErrorCategory {
    /// Categorize a ClientError for metrics purposes.
    fn from(error: &ClientError) -> Self {
        match error {
            ClientError::HttpError(e) if e.is_timeout() => ErrorCategory::Timeout,
            ClientError::HttpError(e) if e.is_connect() || e.is_request() => {
                ErrorCategory::Transport
            }
            ClientError::HttpError(e) if e.is_decode() => ErrorCategory::Parse,
            ClientError::AuthFailed(_) | ClientError::Unauthorized(_) => ErrorCategory::Auth,
            ClientError::ApiError { status, .. } if (500..600).contains(status) => {
                ErrorCategory::Http5xx
            }
            ClientError::ApiError { .. }
            | ClientError::NotFound(_)
            | ClientError::QuerySyntax(_) => ErrorCategory::Http4xx,
            ClientError::MaxRetriesExceeded(_) => ErrorCategory::RetriesExhausted,
            ClientError::InvalidResponse(_) => ErrorCategory::Parse,
            _ => ErrorCategory::Unknown,
        }
    }
}

/// Metrics collector for Splunk API calls.
///
/// A lightweight wrapper around the `metrics` crate macros with consistent labels.
#[derive(Debug, Clone, Default)]
pub struct MetricsCollector {
    /// Whether metrics collection is enabled.
    enabled: bool,
}

impl MetricsCollector {
    /// Create an enabled metrics collector.
    pub fn new() -> Self {
        Self { enabled: true }
    }

    /// Create a disabled metrics collector.
    pub fn disabled() -> Self {
        Self { enabled: false }
    }

    /// Check if metrics collection is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Record the duration of an API request.
    ///
    /// `status` is `None` when the request failed before a response arrived.
    pub fn record_request_duration(
        &self,
        endpoint: &str,
        method: &str,
        duration: Duration,
        status: Option<u16>,
    ) {
        if !self.enabled {
            return;
        }

        let status_label = status.map_or("error".to_string(), |s| s.to_string());

        metrics::histogram!(METRIC_REQUEST_DURATION,
            "endpoint" => endpoint.to_string(),
            "method" => method.to_string(),
            "status" => status_label,
        )
        .record(duration.as_secs_f64());
    }

    /// Record a request attempt, including retries.
    pub fn record_request(&self, endpoint: &str, method: &str) {
        if !self.enabled {
            return;
        }

        metrics::counter!(METRIC_REQUESTS_TOTAL,
            "endpoint" => endpoint.to_string(),
            "method" => method.to_string(),
        )
        .increment(1);
    }

    /// Record a retry attempt (1-based, not counting the initial request).
    pub fn record_retry(&self, endpoint: &str, method: &str, attempt: usize) {
        if !self.enabled {
            return;
        }

        metrics::counter!(METRIC_RETRIES_TOTAL,
            "endpoint" => endpoint.to_string(),
            "method" => method.to_string(),
            "attempt" => attempt.to_string(),
        )
        .increment(1);
    }

    /// Record an error.
    pub fn record_error(&self, endpoint: &str, method: &str, category: ErrorCategory) {
        if !self.enabled {
            return;
        }

        metrics::counter!(METRIC_ERRORS_TOTAL,
            "endpoint" => endpoint.to_string(),
            "method" => method.to_string(),
            "error_category" => category.as_str(),
        )
        .increment(1);
    }

    /// Record an error from a ClientError.
    pub fn record_client_error(&self, endpoint: &str, method: &str, error: &ClientError) {
        self.record_error(endpoint, method, ErrorCategory::from(error));
    }

    /// Record a deserialization failure.
    pub fn record_deserialization_failure(&self, endpoint: &str, model_type: &'static str) {
        if !self.enabled {
            return;
        }
        metrics::counter!(METRIC_DESERIALIZATION_FAILURES,
            "endpoint" => endpoint.to_string(),
            "model_type" => model_type,
        )
        .increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category_labels() {
        assert_eq!(ErrorCategory::Transport.as_str(), "transport");
        assert_eq!(ErrorCategory::Http5xx.as_str(), "http_5xx");
        assert_eq!(ErrorCategory::RetriesExhausted.as_str(), "retries_exhausted");
    }

    #[test]
    fn test_error_categorization() {
        let server = ClientError::ApiError {
            status: 500,
            url: "/services/search/jobs".to_string(),
            message: "boom".to_string(),
            request_id: None,
        };
        assert_eq!(ErrorCategory::from(&server), ErrorCategory::Http5xx);

        let client = ClientError::ApiError {
            status: 422,
            url: "/services/search/jobs".to_string(),
            message: "bad".to_string(),
            request_id: None,
        };
        assert_eq!(ErrorCategory::from(&client), ErrorCategory::Http4xx);

        assert_eq!(
            ErrorCategory::from(&ClientError::Unauthorized("x".to_string())),
            ErrorCategory::Auth
        );
        assert_eq!(
            ErrorCategory::from(&ClientError::MaxRetriesExceeded(4)),
            ErrorCategory::RetriesExhausted
        );
        assert_eq!(
            ErrorCategory::from(&ClientError::InvalidRange { start: 2, end: 1 }),
            ErrorCategory::Unknown
        );
    }

    #[test]
    fn test_disabled_collector_records_nothing() {
        let collector = MetricsCollector::disabled();
        assert!(!collector.is_enabled());
        // No recorder installed; these must simply not panic.
        collector.record_request("/services/search/jobs", "POST");
        collector.record_error("/services/search/jobs", "POST", ErrorCategory::Unknown);
    }

    #[test]
    fn test_enabled_collector_without_recorder() {
        let collector = MetricsCollector::new();
        assert!(collector.is_enabled());
        collector.record_request_duration(
            "/services/search/jobs/{sid}",
            "GET",
            Duration::from_millis(12),
            Some(200),
        );
        collector.record_retry("/services/search/jobs/{sid}", "GET", 1);
    }
}
