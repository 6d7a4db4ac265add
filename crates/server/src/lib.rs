//! Streaming search front-end.
//!
//! Responsibilities:
//! - Accept search submissions over HTTP and dispatch them as remote jobs.
//! - Poll each job without blocking other requests and stream rendered
//!   events back over a single chunked response.
//! - Terminate every response exactly once, whatever the outcome.
//!
//! Does NOT handle:
//! - Talking to Splunk directly (see `splunkblaze-client`).
//! - Configuration loading (see `splunkblaze-config`).
//!
//! Invariants:
//! - One poll loop and one response streamer per request, owned by that request's task.
//! - The shared [`splunkblaze_client::JobApi`] is never mutated after startup.

pub mod error;
pub mod http;
pub mod stream;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use error::ServerError;
pub use http::{AppState, serve};
pub use stream::{
    FinalView, Finalization, HtmlRenderer, PollLoop, PollReport, PollSettings, PollState, Render,
    ResponseStreamer, StopReason, StreamError, stream_job,
};
