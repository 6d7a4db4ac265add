//! Search job endpoints.
//!
//! # What this module handles:
//! - Creating search jobs
//! - Getting job status
//! - Fetching a range of events
//! - Job control (pause, cancel)
//!
//! # What this module does NOT handle:
//! - Deciding when to poll or flush (see the server's poll loop)
//!
//! # Invariants
//! - Sids are percent-encoded before being placed in a path.
//! - Query text is only logged through [`crate::redact_query`].

use std::fmt;

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::auth::Credential;
use crate::endpoints::{
    RetryPolicy, encode_path_segment, extract_entry_content, send_request_with_retry,
    top_level_or_entry_str,
};
use crate::error::{ClientError, Result};
use crate::metrics::MetricsCollector;
use crate::models::{DispatchOptions, Event, FetchOptions, JobStatus};
use crate::redact_query;

/// Prefix `query` with `search ` unless it already starts with a generating
/// `search` command or a pipe.
pub fn normalize_query(query: &str) -> String {
    let trimmed = query.trim();
    let has_command = trimmed.starts_with('|')
        || trimmed
            .split_whitespace()
            .next()
            .is_some_and(|first| first.eq_ignore_ascii_case("search"));
    if has_command {
        trimmed.to_string()
    } else {
        format!("search {}", trimmed)
    }
}

/// Create a new search job and return its sid.
///
/// The query is sent as given; callers normalize it first.
pub async fn create_job(
    client: &Client,
    base_url: &str,
    credential: &Credential,
    query: &str,
    options: &DispatchOptions,
    retry: RetryPolicy,
    metrics: Option<&MetricsCollector>,
) -> Result<String> {
    debug!("Creating search job: {}", redact_query(query));

    let url = format!("{}/services/search/jobs", base_url);

    let mut form_data: Vec<(&str, String)> = vec![
        ("search", query.to_string()),
        ("output_mode", "json".to_string()),
        ("exec_mode", "normal".to_string()),
    ];
    // Empty time bounds cause 400 errors from Splunk
    if let Some(earliest) = options.earliest_time.as_deref()
        && !earliest.trim().is_empty()
    {
        form_data.push(("earliest_time", earliest.to_string()));
    }
    if let Some(latest) = options.latest_time.as_deref()
        && !latest.trim().is_empty()
    {
        form_data.push(("latest_time", latest.to_string()));
    }

    let builder = client
        .post(&url)
        .header("Authorization", credential.authorization_header())
        .form(&form_data);
    let response =
        send_request_with_retry(builder, retry, "/services/search/jobs", "POST", metrics)
            .await
            .map_err(|e| match e {
                ClientError::ApiError {
                    status: 400,
                    message,
                    ..
                } => ClientError::QuerySyntax(message),
                other => other,
            })?;

    let resp: serde_json::Value = response.json().await?;

    top_level_or_entry_str(&resp, "sid")
        .map(|s| s.to_string())
        .ok_or_else(|| ClientError::InvalidResponse("Missing sid in response".to_string()))
}

/// Get the status of a search job.
pub async fn get_job_status(
    client: &Client,
    base_url: &str,
    credential: &Credential,
    sid: &str,
    retry: RetryPolicy,
    metrics: Option<&MetricsCollector>,
) -> Result<JobStatus> {
    let url = format!(
        "{}/services/search/jobs/{}",
        base_url,
        encode_path_segment(sid)
    );

    let builder = client
        .get(&url)
        .header("Authorization", credential.authorization_header())
        .query(&[("output_mode", "json")]);
    let response = send_request_with_retry(
        builder,
        retry,
        "/services/search/jobs/{sid}",
        "GET",
        metrics,
    )
    .await?;

    let resp: serde_json::Value = response.json().await?;

    let content = extract_entry_content(&resp)?;
    let mut status: JobStatus = serde_json::from_value(content.clone())
        .map_err(|e| ClientError::InvalidResponse(format!("Failed to parse job status: {}", e)))?;
    if status.sid.is_empty() {
        status.sid = sid.to_string();
    }
    Ok(status)
}

#[derive(Debug, Deserialize)]
struct EventsResponse {
    #[serde(default)]
    results: Vec<Event>,
}

/// Fetch `count` events starting at `offset`.
#[allow(clippy::too_many_arguments)]
pub async fn get_events(
    client: &Client,
    base_url: &str,
    credential: &Credential,
    sid: &str,
    offset: usize,
    count: usize,
    fetch: &FetchOptions,
    retry: RetryPolicy,
    metrics: Option<&MetricsCollector>,
) -> Result<Vec<Event>> {
    debug!(sid, offset, count, "Fetching events");

    let url = format!(
        "{}/services/search/jobs/{}/events",
        base_url,
        encode_path_segment(sid)
    );

    let query_params: Vec<(&str, String)> = vec![
        ("output_mode", "json".to_string()),
        ("offset", offset.to_string()),
        ("count", count.to_string()),
        ("segmentation", fetch.segmentation.clone()),
        ("max_lines", fetch.max_lines.to_string()),
    ];

    let builder = client
        .get(&url)
        .header("Authorization", credential.authorization_header())
        .query(&query_params);
    let response = send_request_with_retry(
        builder,
        retry,
        "/services/search/jobs/{sid}/events",
        "GET",
        metrics,
    )
    .await?;

    let body = response.text().await?;
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    let resp: EventsResponse = serde_json::from_str(&body).map_err(|e| {
        if let Some(m) = metrics {
            m.record_deserialization_failure("/services/search/jobs/{sid}/events", "Event");
        }
        ClientError::InvalidResponse(format!("Failed to parse events: {}", e))
    })?;
    Ok(resp.results)
}

/// Job control actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobAction {
    Pause,
    Cancel,
}

impl fmt::Display for JobAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pause => write!(f, "pause"),
            Self::Cancel => write!(f, "cancel"),
        }
    }
}

/// Send a control action to a search job.
pub async fn control_job(
    client: &Client,
    base_url: &str,
    credential: &Credential,
    sid: &str,
    action: JobAction,
    retry: RetryPolicy,
    metrics: Option<&MetricsCollector>,
) -> Result<()> {
    debug!(sid, %action, "Sending job control action");

    let url = format!(
        "{}/services/search/jobs/{}/control",
        base_url,
        encode_path_segment(sid)
    );

    let builder = client
        .post(&url)
        .header("Authorization", credential.authorization_header())
        .form(&[("action", action.to_string()), ("output_mode", "json".to_string())]);
    send_request_with_retry(
        builder,
        retry,
        "/services/search/jobs/{sid}/control",
        "POST",
        metrics,
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_query_adds_search() {
        assert_eq!(normalize_query("index=main error"), "search index=main error");
        assert_eq!(normalize_query("  error  "), "search error");
    }

    #[test]
    fn test_normalize_query_keeps_generating_commands() {
        assert_eq!(normalize_query("search index=main"), "search index=main");
        assert_eq!(normalize_query("SEARCH foo"), "SEARCH foo");
        assert_eq!(normalize_query("| makeresults"), "| makeresults");
    }

    #[test]
    fn test_normalize_query_word_boundary() {
        assert_eq!(normalize_query("searchfoo"), "search searchfoo");
    }

    #[test]
    fn test_job_action_display() {
        assert_eq!(JobAction::Pause.to_string(), "pause");
        assert_eq!(JobAction::Cancel.to_string(), "cancel");
    }
}
