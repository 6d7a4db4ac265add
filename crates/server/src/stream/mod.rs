//! Job polling and incremental response streaming.
//!
//! Responsibilities:
//! - Run one [`PollLoop`] per search request.
//! - Close every response exactly once, choosing between a full page and a
//!   simple close from what was already streamed.
//!
//! Does NOT handle:
//! - HTTP routing or request parsing (see [`crate::http`]).
//!
//! Invariants:
//! - [`stream_job`] finalizes the response on every exit path, including a
//!   disconnected client.
//! - The job is never cancelled here; only an over-budget stream pauses it.

pub mod metrics;
mod poll;
mod render;
mod streamer;

use std::sync::Arc;
use std::time::Instant;

use splunkblaze_client::{EventBatch, JobApi, SearchJob, redact_query};
use tracing::{info, warn};

pub use poll::{PollLoop, PollReport, PollSettings, PollState, StopReason};
pub use render::{HtmlRenderer, Render, escape_html};
pub use streamer::{FinalView, Finalization, ResponseStreamer, StreamError};

/// Poll `job` to a stop reason, streaming through `streamer`, then close the response.
pub async fn stream_job(
    api: Arc<dyn JobApi>,
    settings: PollSettings,
    job: SearchJob,
    mut streamer: ResponseStreamer,
) -> PollReport {
    let _active = metrics::ActiveStream::enter();
    let started = Instant::now();
    let max_wait = settings.max_wait;
    let batch_size = settings.batch_size.max(1);

    let report = PollLoop::new(Arc::clone(&api), settings)
        .run(&job, &mut streamer)
        .await;
    let finalization = report.finalization();

    let events = match (&finalization, &report.reason) {
        (Finalization::FullTerminalRender, reason) if *reason != StopReason::ClientGone => {
            terminal_events(api.as_ref(), &job, &report, batch_size).await
        }
        _ => EventBatch::empty(report.state.last_flushed),
    };

    let view = FinalView {
        job,
        reason: report.reason.clone(),
        status: report.last_status.clone(),
        events,
        events_flushed: report.state.last_flushed,
        max_wait,
    };
    // A disconnected client cannot receive the close; the report still stands.
    let _ = streamer.finalize(finalization, &view).await;

    let elapsed = started.elapsed();
    metrics::record_stream(
        &report.reason,
        finalization,
        report.state.last_flushed,
        elapsed,
    );
    info!(
        sid = %view.job.sid,
        query = %redact_query(&view.job.query),
        outcome = report.reason.label(),
        finalization = finalization.as_str(),
        events_flushed = report.state.last_flushed,
        elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        "Search stream finished"
    );
    report
}

/// Events for a full page: everything the last status reported, fetched in
/// `batch_size` chunks so no single request exceeds the remote row limit.
///
/// A failed or short chunk ends the fetch; the page shows the contiguous prefix.
async fn terminal_events(
    api: &dyn JobApi,
    job: &SearchJob,
    report: &PollReport,
    batch_size: usize,
) -> EventBatch {
    let count = report
        .last_status
        .as_ref()
        .map_or(0, |status| status.event_count);

    let mut events = Vec::new();
    let mut start = 0;
    while start < count {
        let end = (start + batch_size).min(count);
        match api.fetch_events(job, start, end).await {
            Ok(batch) => {
                let short = batch.events.len() < end - start;
                events.extend(batch.events);
                if short {
                    warn!(sid = %job.sid, start, end, "Short event batch for full page");
                    break;
                }
            }
            Err(e) => {
                warn!(sid = %job.sid, start, end, error = %e, "Failed to fetch events for full page");
                break;
            }
        }
        start = end;
    }
    EventBatch::new(0, events)
}
