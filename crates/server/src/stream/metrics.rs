//! Stream outcome metrics.
//!
//! # Invariants
//! - Every finished stream is counted once, labelled by its stop reason.
//! - The active-stream gauge is decremented on drop, so it stays balanced
//!   even when a stream task is aborted.

use std::time::Duration;

use splunkblaze_client::METRIC_STREAM_DURATION;

use super::poll::StopReason;
use super::streamer::Finalization;

/// Finished streams, labelled by `outcome` and `finalization`.
pub const METRIC_STREAMS_TOTAL: &str = "splunkblaze_streams_total";

/// Events written to clients across all streams.
pub const METRIC_EVENTS_FLUSHED: &str = "splunkblaze_events_flushed_total";

/// Streams currently polling.
pub const METRIC_STREAMS_ACTIVE: &str = "splunkblaze_streams_active";

/// Search submissions rejected before streaming, labelled by HTTP status.
pub const METRIC_REJECTED_TOTAL: &str = "splunkblaze_searches_rejected_total";

impl Finalization {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Finalization::FullTerminalRender => "full_render",
            Finalization::SimpleClose => "simple_close",
        }
    }
}

/// Holds one slot of the active-stream gauge.
pub struct ActiveStream(());

impl ActiveStream {
    pub fn enter() -> Self {
        metrics::gauge!(METRIC_STREAMS_ACTIVE).increment(1.0);
        Self(())
    }
}

impl Drop for ActiveStream {
    fn drop(&mut self) {
        metrics::gauge!(METRIC_STREAMS_ACTIVE).decrement(1.0);
    }
}

pub fn record_stream(
    reason: &StopReason,
    finalization: Finalization,
    events_flushed: usize,
    duration: Duration,
) {
    metrics::counter!(METRIC_STREAMS_TOTAL,
        "outcome" => reason.label(),
        "finalization" => finalization.as_str(),
    )
    .increment(1);
    metrics::counter!(METRIC_EVENTS_FLUSHED).increment(u64::try_from(events_flushed).unwrap_or(u64::MAX));
    metrics::histogram!(METRIC_STREAM_DURATION, "outcome" => reason.label())
        .record(duration.as_secs_f64());
}

pub fn record_rejected(status: u16) {
    metrics::counter!(METRIC_REJECTED_TOTAL, "status" => status.to_string()).increment(1);
}
