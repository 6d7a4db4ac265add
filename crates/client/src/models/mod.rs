//! Data models for Splunk API responses.
//!
//! Submodules:
//! - [`common`]: message types shared by job status and error bodies.
//! - [`jobs`]: search job handle, status, events and request options.

mod common;
mod jobs;

pub use common::{MessageType, SplunkMessage, SplunkMessages};
pub use jobs::{DispatchOptions, Event, EventBatch, FetchOptions, JobStatus, SearchJob};
