//! Poll loop for one search job.
//!
//! Responsibilities:
//! - Poll job status on the tokio timer until the job finishes, the wait
//!   budget runs out, or the client goes away.
//! - Decide when to write the header and which event range to flush next.
//!
//! Does NOT handle:
//! - Closing the response (see [`super::stream_job`]).
//! - Rendering (see [`super::render`]).
//!
//! Invariants:
//! - `last_flushed` never decreases and never passes the last observed
//!   `event_count`.
//! - Fetched ranges are contiguous from offset 0 and at most `batch_size` long.
//! - The header goes out once, on the first status with `event_count > 0`.
//! - Elapsed time is accounted in whole poll intervals, not wall clock.
//! - The budget is checked after every flush, whether or not the job is done.

use std::sync::Arc;
use std::time::Duration;

use splunkblaze_client::{JobApi, JobStatus, SearchJob};
use splunkblaze_config::StreamConfig;
use splunkblaze_config::constants::{
    DEFAULT_BATCH_SIZE, DEFAULT_MAX_WAIT_SECS, DEFAULT_POLL_INTERVAL_MS,
};
use tracing::{debug, warn};

use super::streamer::{Finalization, ResponseStreamer, StreamError};

/// Poll loop tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSettings {
    /// Total budget; `None` means only completion ends the loop.
    pub max_wait: Option<Duration>,
    pub poll_interval: Duration,
    /// Most events written per flush. Always at least 1.
    pub batch_size: usize,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            max_wait: u64::try_from(DEFAULT_MAX_WAIT_SECS)
                .ok()
                .map(Duration::from_secs),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl From<&StreamConfig> for PollSettings {
    fn from(config: &StreamConfig) -> Self {
        Self {
            max_wait: config.max_wait(),
            poll_interval: config.poll_interval,
            batch_size: config.batch_size.max(1),
        }
    }
}

/// Per-request loop state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollState {
    /// Events written so far; the next flush starts here.
    pub last_flushed: usize,
    pub elapsed: Duration,
    pub header_sent: bool,
}

/// Why the loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The job finished and every available event was written.
    Completed,
    /// The budget ran out while no new events were arriving.
    TimedOut,
    /// The budget ran out mid-stream. A running job was asked to pause.
    PartialOnStop,
    /// The job failed remotely or a non-transient error occurred.
    Failed(String),
    /// The client stopped reading the response.
    ClientGone,
}

impl StopReason {
    /// Stable label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::TimedOut => "timed_out",
            Self::PartialOnStop => "partial",
            Self::Failed(_) => "failed",
            Self::ClientGone => "client_gone",
        }
    }
}

impl From<StreamError> for StopReason {
    fn from(err: StreamError) -> Self {
        match err {
            StreamError::ClientGone => Self::ClientGone,
            other => Self::Failed(other.to_string()),
        }
    }
}

/// Outcome of one loop run.
#[derive(Debug, Clone)]
pub struct PollReport {
    pub reason: StopReason,
    pub state: PollState,
    /// Last successful status, if any poll succeeded.
    pub last_status: Option<JobStatus>,
}

impl PollReport {
    /// A response with no header gets a complete page; otherwise it is closed.
    pub fn finalization(&self) -> Finalization {
        if self.state.header_sent {
            Finalization::SimpleClose
        } else {
            Finalization::FullTerminalRender
        }
    }
}

/// Drives one job from dispatch to a stop reason.
pub struct PollLoop {
    api: Arc<dyn JobApi>,
    settings: PollSettings,
}

impl PollLoop {
    pub fn new(api: Arc<dyn JobApi>, settings: PollSettings) -> Self {
        Self { api, settings }
    }

    /// Run the loop, writing header and batches through `streamer`.
    ///
    /// Never returns an error: every exit path yields a [`StopReason`] and the
    /// caller finalizes the response from the report.
    pub async fn run(&self, job: &SearchJob, streamer: &mut ResponseStreamer) -> PollReport {
        let mut state = PollState::default();
        let mut last_status: Option<JobStatus> = None;

        let reason = loop {
            let status = match self.api.status(job).await {
                Ok(status) => status,
                Err(e) if e.is_transient() => {
                    debug!(sid = %job.sid, error = %e, "Transient status error, treating as idle tick");
                    match self.idle_tick(&mut state).await {
                        Some(reason) => break reason,
                        None => continue,
                    }
                }
                Err(e) => break StopReason::Failed(e.to_string()),
            };
            last_status = Some(status.clone());

            if status.is_remote_failure() {
                let messages = status.error_messages();
                let message = if messages.is_empty() {
                    format!("search job ended in state {}", status.dispatch_state)
                } else {
                    messages.join("; ")
                };
                break StopReason::Failed(message);
            }

            let count = status.event_count;
            if status.is_done && (!state.header_sent || count <= state.last_flushed) {
                break StopReason::Completed;
            }

            if count <= state.last_flushed {
                match self.idle_tick(&mut state).await {
                    Some(reason) => break reason,
                    None => continue,
                }
            }

            if !state.header_sent {
                if let Err(e) = streamer.write_header(job, &status).await {
                    break e.into();
                }
                state.header_sent = true;
            }

            let start = state.last_flushed;
            let end = if count - start > self.settings.batch_size {
                start + self.settings.batch_size
            } else {
                count
            };

            match self.api.fetch_events(job, start, end).await {
                Ok(batch) => {
                    if let Err(e) = streamer.write_events(&batch).await {
                        break e.into();
                    }
                    state.last_flushed = end;
                    debug!(sid = %job.sid, start, end, event_count = count, "Flushed events");
                }
                Err(e) if e.is_transient() => {
                    debug!(sid = %job.sid, error = %e, "Transient fetch error, treating as idle tick");
                    match self.idle_tick(&mut state).await {
                        Some(reason) => break reason,
                        None => continue,
                    }
                }
                Err(e) => break StopReason::Failed(e.to_string()),
            }

            state.elapsed += self.settings.poll_interval;
            tokio::task::yield_now().await;

            if self.over_budget(&state) {
                if status.is_done && state.last_flushed >= count {
                    break StopReason::Completed;
                }
                if !status.is_done {
                    self.pause_detached(job);
                }
                break StopReason::PartialOnStop;
            }
        };

        PollReport {
            reason,
            state,
            last_status,
        }
    }

    fn over_budget(&self, state: &PollState) -> bool {
        self.settings
            .max_wait
            .is_some_and(|max_wait| state.elapsed > max_wait)
    }

    /// Wait one interval, or report a timeout when the budget is spent.
    async fn idle_tick(&self, state: &mut PollState) -> Option<StopReason> {
        if self.over_budget(state) {
            return Some(StopReason::TimedOut);
        }
        tokio::time::sleep(self.settings.poll_interval).await;
        state.elapsed += self.settings.poll_interval;
        None
    }

    /// Best-effort pause; the response does not wait for it.
    fn pause_detached(&self, job: &SearchJob) {
        let api = Arc::clone(&self.api);
        let job = job.clone();
        tokio::spawn(async move {
            if let Err(e) = api.pause(&job).await {
                warn!(sid = %job.sid, error = %e, "Failed to pause search job");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::render::HtmlRenderer;
    use crate::testing::{Call, ScriptedJobApi, StatusStep, count_script};
    use bytes::Bytes;
    use proptest::prelude::*;
    use splunkblaze_client::FetchOptions;
    use tokio::sync::mpsc;

    fn settings(max_wait_secs: i64, batch_size: usize) -> PollSettings {
        PollSettings {
            max_wait: u64::try_from(max_wait_secs).ok().map(Duration::from_secs),
            poll_interval: Duration::from_millis(50),
            batch_size,
        }
    }

    fn job() -> SearchJob {
        SearchJob::new("scripted-1", "search *", FetchOptions::default())
    }

    fn streamer() -> (ResponseStreamer, mpsc::Receiver<Bytes>) {
        ResponseStreamer::channel(Arc::new(HtmlRenderer::new()), 4096)
    }

    async fn run(api: &Arc<ScriptedJobApi>, settings: PollSettings) -> (PollReport, String) {
        let (mut s, mut rx) = streamer();
        let poll = PollLoop::new(api.clone(), settings);
        let report = poll.run(&job(), &mut s).await;
        drop(s);
        let mut body = String::new();
        while let Some(chunk) = rx.recv().await {
            body.push_str(std::str::from_utf8(&chunk).unwrap());
        }
        (report, body)
    }

    #[tokio::test(start_paused = true)]
    async fn test_growing_counts_flush_in_capped_batches() {
        let api = Arc::new(ScriptedJobApi::new(vec![
            StatusStep::Running(0),
            StatusStep::Running(0),
            StatusStep::Running(5),
            StatusStep::Running(5),
            StatusStep::Running(15),
            StatusStep::Running(15),
            StatusStep::Running(30),
            StatusStep::Done(30),
        ]));

        let (report, body) = run(&api, settings(10, 10)).await;

        assert_eq!(report.reason, StopReason::Completed);
        assert_eq!(report.state.last_flushed, 30);
        assert!(report.state.header_sent);
        assert_eq!(report.finalization(), Finalization::SimpleClose);
        assert_eq!(api.fetch_ranges(), vec![(0, 5), (5, 15), (15, 25), (25, 30)]);
        assert_eq!(body.matches("Search results").count(), 1);
        assert!(body.find("event 0").unwrap() < body.find("event 29").unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_timeout_without_events_is_full_render() {
        let api = Arc::new(ScriptedJobApi::new(vec![StatusStep::Running(0)]));

        let (report, body) = run(&api, settings(1, 10)).await;

        assert_eq!(report.reason, StopReason::TimedOut);
        assert!(!report.state.header_sent);
        assert_eq!(report.finalization(), Finalization::FullTerminalRender);
        assert!(report.state.elapsed > Duration::from_secs(1));
        assert!(body.is_empty());
        assert!(api.fetch_ranges().is_empty());
        assert_eq!(api.pause_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_budget_waits_for_completion() {
        let mut steps = vec![StatusStep::Running(0); 1000];
        steps.push(StatusStep::Done(0));
        let api = Arc::new(ScriptedJobApi::new(steps));

        let (report, _) = run(&api, settings(-1, 10)).await;

        assert_eq!(report.reason, StopReason::Completed);
        assert!(report.state.elapsed >= Duration::from_secs(50));
        assert_eq!(report.finalization(), Finalization::FullTerminalRender);
    }

    #[tokio::test(start_paused = true)]
    async fn test_budget_exceeded_mid_stream_pauses_job() {
        // Always 100 events ahead, never done.
        let steps = (1..=100).map(|i| StatusStep::Running(i * 100)).collect();
        let api = Arc::new(ScriptedJobApi::new(steps));

        let (report, body) = run(&api, settings(0, 10)).await;
        tokio::time::sleep(Duration::from_millis(1)).await;

        assert_eq!(report.reason, StopReason::PartialOnStop);
        assert_eq!(report.state.last_flushed, 10);
        assert_eq!(report.finalization(), Finalization::SimpleClose);
        assert_eq!(api.pause_count(), 1);
        assert!(body.contains("event 9"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_done_job_backlog_stops_at_budget() {
        let api = Arc::new(ScriptedJobApi::new(vec![
            StatusStep::Running(5),
            StatusStep::Done(2_000),
        ]));

        let (report, body) = run(&api, settings(1, 10)).await;

        // 21 flushes of 50ms each push elapsed past the 1s budget.
        assert_eq!(report.reason, StopReason::PartialOnStop);
        assert_eq!(report.state.elapsed, Duration::from_millis(1050));
        assert_eq!(api.fetch_ranges().len(), 21);
        assert_eq!(report.state.last_flushed, 205);
        assert_eq!(report.finalization(), Finalization::SimpleClose);
        assert_eq!(api.pause_count(), 0);
        assert!(body.contains("event 204"));
        assert!(!body.contains("event 205"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_done_job_drained_on_last_budgeted_flush_is_completed() {
        let api = Arc::new(ScriptedJobApi::new(vec![
            StatusStep::Running(5),
            StatusStep::Done(15),
        ]));
        let settings = PollSettings {
            max_wait: Some(Duration::from_millis(50)),
            ..settings(10, 10)
        };

        let (report, _) = run(&api, settings).await;

        assert_eq!(report.reason, StopReason::Completed);
        assert_eq!(api.fetch_ranges(), vec![(0, 5), (5, 15)]);
        assert_eq!(api.pause_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_errors_are_idle_ticks() {
        let api = Arc::new(ScriptedJobApi::new(vec![
            StatusStep::Transient,
            StatusStep::Running(3),
            StatusStep::Transient,
            StatusStep::Done(3),
        ]));
        api.fail_next_fetches(1);

        let (report, body) = run(&api, settings(10, 10)).await;

        assert_eq!(report.reason, StopReason::Completed);
        assert_eq!(report.state.last_flushed, 3);
        assert!(body.contains("event 2"));
        // One failed attempt, then the retry of the same range.
        assert_eq!(api.fetch_ranges(), vec![(0, 3), (0, 3)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remote_failure_stops_with_messages() {
        let api = Arc::new(ScriptedJobApi::new(vec![
            StatusStep::Running(0),
            StatusStep::Failed("Unknown search command 'frobnicate'.".to_string()),
        ]));

        let (report, _) = run(&api, settings(10, 10)).await;

        match &report.reason {
            StopReason::Failed(msg) => assert!(msg.contains("frobnicate")),
            other => panic!("expected Failed, got {other:?}"),
        }
        assert_eq!(report.finalization(), Finalization::FullTerminalRender);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_transient_status_error_fails() {
        let api = Arc::new(ScriptedJobApi::new(vec![StatusStep::Fatal]));

        let (report, _) = run(&api, settings(10, 10)).await;

        assert!(matches!(report.reason, StopReason::Failed(_)));
        assert!(report.last_status.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_instant_completion_skips_streaming() {
        let api = Arc::new(ScriptedJobApi::new(vec![StatusStep::Done(7)]));

        let (report, body) = run(&api, settings(10, 10)).await;

        assert_eq!(report.reason, StopReason::Completed);
        assert!(!report.state.header_sent);
        assert_eq!(report.finalization(), Finalization::FullTerminalRender);
        assert!(body.is_empty());
        assert!(api.fetch_ranges().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_client_gone_stops_without_pause() {
        let api = Arc::new(ScriptedJobApi::new(vec![StatusStep::Running(4)]));
        let (mut s, rx) = streamer();
        drop(rx);

        let report = PollLoop::new(api.clone(), settings(10, 10))
            .run(&job(), &mut s)
            .await;

        assert_eq!(report.reason, StopReason::ClientGone);
        assert!(!report.state.header_sent);
        assert_eq!(api.pause_count(), 0);
        assert_eq!(api.cancel_count(), 0);
    }

    #[test]
    fn test_settings_from_config() {
        let config = StreamConfig {
            max_wait_secs: -1,
            poll_interval: Duration::from_millis(20),
            batch_size: 0,
        };
        let settings = PollSettings::from(&config);
        assert_eq!(settings.max_wait, None);
        assert_eq!(settings.batch_size, 1);
        assert_eq!(PollSettings::default().max_wait, Some(Duration::from_secs(10)));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_flushes_are_contiguous_and_bounded(
            script in count_script(12),
            batch_size in 1usize..8,
            max_wait_secs in prop_oneof![Just(-1i64), 0i64..2],
        ) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .start_paused(true)
                .build()
                .unwrap();

            let api = Arc::new(ScriptedJobApi::new(script));
            let (report, body) = rt.block_on(run(&api, settings(max_wait_secs, batch_size)));

            let mut next = 0;
            let mut observed = 0;
            for call in api.calls() {
                match call {
                    Call::Status(Some(count)) => observed = count,
                    Call::Fetch { start, end } => {
                        prop_assert_eq!(start, next);
                        prop_assert!(end > start);
                        prop_assert!(end - start <= batch_size);
                        prop_assert!(end <= observed);
                        next = end;
                    }
                    _ => {}
                }
            }
            prop_assert_eq!(report.state.last_flushed, next);
            prop_assert!(body.matches("Search results").count() <= 1);
            if report.state.header_sent {
                prop_assert!(report.last_status.is_some());
            } else {
                prop_assert_eq!(next, 0);
            }
        }
    }
}
