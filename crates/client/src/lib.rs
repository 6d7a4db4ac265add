//! Splunk search job client.
//!
//! This crate is the leaf of the streaming search front-end: a typed client for
//! the Splunk REST search job API (login, dispatch, status, events, job
//! control) and the [`JobApi`] trait that the poll loop is written against.
//!
//! The credential is obtained once when the client connects and is never
//! mutated afterwards, so a single [`SplunkClient`] is shared by every
//! concurrent request without locking.

mod api;
pub mod auth;
pub mod client;
pub mod endpoints;
pub mod error;
pub mod metrics;
pub mod metrics_exporter;
pub mod models;
mod redact;
mod serde_helpers;

pub use api::JobApi;
pub use auth::{AuthStrategy, Credential};
pub use client::SplunkClient;
pub use client::builder::SplunkClientBuilder;
pub use endpoints::RetryPolicy;
pub use error::{ClientError, Result};
pub use metrics::{ErrorCategory, MetricsCollector};
pub use metrics_exporter::{METRIC_STREAM_DURATION, MetricsExporter, MetricsExporterError};
pub use models::{
    DispatchOptions, Event, EventBatch, FetchOptions, JobStatus, MessageType, SearchJob,
    SplunkMessage, SplunkMessages,
};
pub use redact::redact_query;
