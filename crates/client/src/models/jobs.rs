//! Search job models.
//!
//! Responsibilities:
//! - The [`SearchJob`] handle returned by dispatch, with its pinned fetch options.
//! - The [`JobStatus`] snapshot parsed from `/services/search/jobs/{sid}`.
//! - [`Event`] and [`EventBatch`] parsed from `/services/search/jobs/{sid}/events`.
//!
//! Does NOT handle:
//! - HTTP calls (see [`crate::endpoints`]).
//!
//! Invariants:
//! - An [`EventBatch`] covers exactly `[start, start + events.len())`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use splunkblaze_config::FetchConfig;
use splunkblaze_config::constants::{DEFAULT_MAX_LINES, DEFAULT_SEGMENTATION};

use crate::models::{MessageType, SplunkMessage};

/// Result options applied to every events fetch for a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    /// Segmentation mode passed through to Splunk.
    pub segmentation: String,
    /// Maximum lines per event passed through to Splunk.
    pub max_lines: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            segmentation: DEFAULT_SEGMENTATION.to_string(),
            max_lines: DEFAULT_MAX_LINES,
        }
    }
}

impl From<&FetchConfig> for FetchOptions {
    fn from(config: &FetchConfig) -> Self {
        Self {
            segmentation: config.segmentation.clone(),
            max_lines: config.max_lines,
        }
    }
}

/// Options for creating a search job.
#[derive(Debug, Clone, Default)]
pub struct DispatchOptions {
    /// Earliest time bound (e.g. `-24h`). Blank values are not sent.
    pub earliest_time: Option<String>,
    /// Latest time bound (e.g. `now`). Blank values are not sent.
    pub latest_time: Option<String>,
    /// Result options pinned on the returned [`SearchJob`].
    pub fetch: FetchOptions,
}

/// Handle to a dispatched remote search job.
#[derive(Debug, Clone)]
pub struct SearchJob {
    /// Opaque job identifier.
    pub sid: String,
    /// Normalized query text as submitted.
    pub query: String,
    /// When the job was created.
    pub dispatched_at: DateTime<Utc>,
    /// Result options used for every fetch.
    pub fetch: FetchOptions,
}

impl SearchJob {
    /// Create a handle for an already dispatched job.
    pub fn new(sid: impl Into<String>, query: impl Into<String>, fetch: FetchOptions) -> Self {
        Self {
            sid: sid.into(),
            query: query.into(),
            dispatched_at: Utc::now(),
            fetch,
        }
    }
}

/// Snapshot of a search job's progress.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobStatus {
    #[serde(default)]
    pub sid: String,
    #[serde(
        rename = "isDone",
        default,
        deserialize_with = "crate::serde_helpers::bool_from_any"
    )]
    pub is_done: bool,
    #[serde(
        rename = "isFailed",
        default,
        deserialize_with = "crate::serde_helpers::bool_from_any"
    )]
    pub is_failed: bool,
    #[serde(
        rename = "eventCount",
        default,
        deserialize_with = "crate::serde_helpers::usize_from_string_or_number"
    )]
    pub event_count: usize,
    #[serde(
        rename = "doneProgress",
        default,
        deserialize_with = "crate::serde_helpers::f64_from_string_or_number"
    )]
    pub done_progress: f64,
    #[serde(rename = "dispatchState", default)]
    pub dispatch_state: String,
    #[serde(
        rename = "runDuration",
        default,
        deserialize_with = "crate::serde_helpers::f64_from_string_or_number"
    )]
    pub run_duration: f64,
    #[serde(
        default,
        deserialize_with = "crate::serde_helpers::messages_from_list_or_map"
    )]
    pub messages: Vec<SplunkMessage>,
}

impl JobStatus {
    /// The job finished and reported failure.
    pub fn is_remote_failure(&self) -> bool {
        self.is_done && (self.is_failed || self.dispatch_state.eq_ignore_ascii_case("FAILED"))
    }

    /// Error texts attached to the job.
    pub fn error_messages(&self) -> Vec<&str> {
        self.messages
            .iter()
            .filter(|m| m.message_type.is_error())
            .map(|m| m.text.as_str())
            .collect()
    }

    /// Warning texts attached to the job.
    pub fn warnings(&self) -> Vec<&str> {
        self.messages
            .iter()
            .filter(|m| m.message_type == MessageType::Warn)
            .map(|m| m.text.as_str())
            .collect()
    }
}

/// A single search event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Raw event text.
    #[serde(rename = "_raw", default)]
    pub raw: String,
    /// Event timestamp as reported by Splunk.
    #[serde(rename = "_time", default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    /// All remaining fields.
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl Event {
    /// Event with only raw text.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            time: None,
            fields: serde_json::Map::new(),
        }
    }

    /// Look up a field as a string, if present.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(|v| v.as_str())
    }
}

/// Contiguous, ordered slice of a job's events.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventBatch {
    /// Offset of the first event.
    pub start: usize,
    pub events: Vec<Event>,
}

impl EventBatch {
    pub fn new(start: usize, events: Vec<Event>) -> Self {
        Self { start, events }
    }

    /// An empty batch at `start`.
    pub fn empty(start: usize) -> Self {
        Self::new(start, Vec::new())
    }

    /// Offset one past the last event.
    pub fn end(&self) -> usize {
        self.start + self.events.len()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_status_parses_splunk_content() {
        let content = serde_json::json!({
            "sid": "1700000000.42",
            "isDone": false,
            "isFailed": false,
            "eventCount": "15",
            "doneProgress": 0.25,
            "dispatchState": "RUNNING",
            "runDuration": "1.5",
            "messages": []
        });
        let status: JobStatus = serde_json::from_value(content).unwrap();
        assert_eq!(status.sid, "1700000000.42");
        assert_eq!(status.event_count, 15);
        assert_eq!(status.done_progress, 0.25);
        assert_eq!(status.run_duration, 1.5);
        assert!(!status.is_remote_failure());
    }

    #[test]
    fn test_job_status_failure_messages() {
        let content = serde_json::json!({
            "sid": "x",
            "isDone": true,
            "isFailed": true,
            "eventCount": 0,
            "dispatchState": "FAILED",
            "messages": [
                { "type": "FATAL", "text": "Unknown search command 'foo'." },
                { "type": "WARN", "text": "slow" }
            ]
        });
        let status: JobStatus = serde_json::from_value(content).unwrap();
        assert!(status.is_remote_failure());
        assert_eq!(status.error_messages(), vec!["Unknown search command 'foo'."]);
        assert_eq!(status.warnings(), vec!["slow"]);
    }

    #[test]
    fn test_job_status_missing_fields_default() {
        let status: JobStatus = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(!status.is_done);
        assert_eq!(status.event_count, 0);
        assert!(status.messages.is_empty());
    }

    #[test]
    fn test_event_keeps_extra_fields() {
        let event: Event = serde_json::from_value(serde_json::json!({
            "_raw": "GET /index.html 200",
            "_time": "2024-01-15T10:30:00.000+00:00",
            "host": "web-01",
            "sourcetype": "access_combined"
        }))
        .unwrap();
        assert_eq!(event.raw, "GET /index.html 200");
        assert_eq!(event.time.as_deref(), Some("2024-01-15T10:30:00.000+00:00"));
        assert_eq!(event.field("host"), Some("web-01"));
        assert!(!event.fields.contains_key("_raw"));
    }

    #[test]
    fn test_event_batch_end() {
        let batch = EventBatch::new(10, vec![Event::from_raw("a"), Event::from_raw("b")]);
        assert_eq!(batch.end(), 12);
        assert_eq!(batch.len(), 2);
        assert!(EventBatch::empty(5).is_empty());
        assert_eq!(EventBatch::empty(5).end(), 5);
    }

    #[test]
    fn test_fetch_options_default() {
        let opts = FetchOptions::default();
        assert_eq!(opts.segmentation, "full");
        assert_eq!(opts.max_lines, 500);
    }
}
