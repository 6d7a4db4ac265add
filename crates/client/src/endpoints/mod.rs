//! REST API endpoint implementations.
//!
//! Each function performs one Splunk REST call. They take the HTTP client,
//! base URL and credential explicitly so they can be exercised directly
//! against a mock server; [`crate::SplunkClient`] wraps them.

mod auth;
mod jobs;
mod request;
pub mod url_encoding;

pub use auth::login;
pub use jobs::{
    JobAction, control_job, create_job, get_events, get_job_status, normalize_query,
};
pub use request::{RetryPolicy, send_request_with_retry};
pub use url_encoding::encode_path_segment;

use crate::error::{ClientError, Result};

/// Extract `entry[0].content` from a Splunk Atom-style JSON document.
pub(crate) fn extract_entry_content(value: &serde_json::Value) -> Result<&serde_json::Value> {
    value
        .get("entry")
        .and_then(|e| e.get(0))
        .and_then(|e| e.get("content"))
        .ok_or_else(|| ClientError::InvalidResponse("Missing entry[0].content".to_string()))
}

/// Look up `key` at the top level, falling back to `entry[0].content.key`.
///
/// Splunk returns either shape depending on version and endpoint.
pub(crate) fn top_level_or_entry_str<'a>(
    value: &'a serde_json::Value,
    key: &str,
) -> Option<&'a str> {
    value.get(key).and_then(|v| v.as_str()).or_else(|| {
        extract_entry_content(value)
            .ok()?
            .get(key)
            .and_then(|v| v.as_str())
    })
}
