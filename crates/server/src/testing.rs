//! Test doubles for the poll loop and HTTP edge.
//!
//! Responsibilities:
//! - Provide [`ScriptedJobApi`], a [`JobApi`] that replays a status script.
//! - Provide proptest strategies for status scripts.
//!
//! Compiled for unit tests and behind the `test-utils` feature for
//! integration tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use proptest::prelude::*;
use splunkblaze_client::{
    ClientError, DispatchOptions, Event, EventBatch, JobApi, JobStatus, MessageType, SearchJob,
    SplunkMessage,
};

/// One scripted answer to `status`.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusStep {
    Running(usize),
    Done(usize),
    /// Done with `isFailed` and a fatal message.
    Failed(String),
    /// A retryable error (retries exhausted).
    Transient,
    /// A non-retryable error (job expired).
    Fatal,
}

/// A call received by [`ScriptedJobApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Dispatch(String),
    /// Status call with the event count returned, `None` on error.
    Status(Option<usize>),
    Fetch { start: usize, end: usize },
    Pause,
    Cancel,
}

/// Replays scripted statuses. Once the script runs out the last step repeats.
#[derive(Debug, Default)]
pub struct ScriptedJobApi {
    steps: Mutex<VecDeque<StatusStep>>,
    last: Mutex<Option<StatusStep>>,
    calls: Mutex<Vec<Call>>,
    dispatch_error: Mutex<Option<ClientError>>,
    failing_fetches: Mutex<usize>,
    fetches_until_failure: Mutex<Option<usize>>,
}

impl ScriptedJobApi {
    pub fn new(steps: Vec<StatusStep>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            ..Default::default()
        }
    }

    /// Make the next `dispatch` fail with `err`.
    pub fn fail_dispatch_with(&self, err: ClientError) {
        *self.dispatch_error.lock().unwrap() = Some(err);
    }

    /// Make the next `n` event fetches fail with a transient error.
    pub fn fail_next_fetches(&self, n: usize) {
        *self.failing_fetches.lock().unwrap() = n;
    }

    /// Let `n` more fetches succeed, then fail the one after with a transient error.
    pub fn fail_fetch_after(&self, n: usize) {
        *self.fetches_until_failure.lock().unwrap() = Some(n);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fetch_ranges(&self) -> Vec<(usize, usize)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Fetch { start, end } => Some((start, end)),
                _ => None,
            })
            .collect()
    }

    pub fn dispatch_count(&self) -> usize {
        self.count(|c| matches!(c, Call::Dispatch(_)))
    }

    pub fn pause_count(&self) -> usize {
        self.count(|c| matches!(c, Call::Pause))
    }

    pub fn cancel_count(&self) -> usize {
        self.count(|c| matches!(c, Call::Cancel))
    }

    fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn next_step(&self) -> StatusStep {
        let mut last = self.last.lock().unwrap();
        if let Some(step) = self.steps.lock().unwrap().pop_front() {
            *last = Some(step);
        }
        last.clone().unwrap_or(StatusStep::Done(0))
    }
}

fn status_for(sid: &str, step: &StatusStep) -> Result<JobStatus, ClientError> {
    let base = JobStatus {
        sid: sid.to_string(),
        ..Default::default()
    };
    match step {
        StatusStep::Running(count) => Ok(JobStatus {
            event_count: *count,
            dispatch_state: "RUNNING".to_string(),
            ..base
        }),
        StatusStep::Done(count) => Ok(JobStatus {
            is_done: true,
            event_count: *count,
            done_progress: 1.0,
            dispatch_state: "DONE".to_string(),
            run_duration: 0.25,
            ..base
        }),
        StatusStep::Failed(message) => Ok(JobStatus {
            is_done: true,
            is_failed: true,
            dispatch_state: "FAILED".to_string(),
            messages: vec![SplunkMessage {
                message_type: MessageType::Fatal,
                text: message.clone(),
            }],
            ..base
        }),
        StatusStep::Transient => Err(ClientError::MaxRetriesExceeded(4)),
        StatusStep::Fatal => Err(ClientError::NotFound(format!("search job {sid}"))),
    }
}

#[async_trait]
impl JobApi for ScriptedJobApi {
    async fn dispatch(
        &self,
        query: &str,
        options: &DispatchOptions,
    ) -> splunkblaze_client::Result<SearchJob> {
        self.record(Call::Dispatch(query.to_string()));
        if let Some(err) = self.dispatch_error.lock().unwrap().take() {
            return Err(err);
        }
        Ok(SearchJob::new("scripted-1", query, options.fetch.clone()))
    }

    async fn status(&self, job: &SearchJob) -> splunkblaze_client::Result<JobStatus> {
        let step = self.next_step();
        let result = status_for(&job.sid, &step);
        self.record(Call::Status(
            result.as_ref().ok().map(|status| status.event_count),
        ));
        result
    }

    async fn fetch_events(
        &self,
        _job: &SearchJob,
        start: usize,
        end: usize,
    ) -> splunkblaze_client::Result<EventBatch> {
        self.record(Call::Fetch { start, end });
        if start > end {
            return Err(ClientError::InvalidRange { start, end });
        }
        {
            let mut failing = self.failing_fetches.lock().unwrap();
            if *failing > 0 {
                *failing -= 1;
                return Err(ClientError::MaxRetriesExceeded(4));
            }
            let mut until = self.fetches_until_failure.lock().unwrap();
            match *until {
                Some(0) => {
                    *until = None;
                    return Err(ClientError::MaxRetriesExceeded(4));
                }
                Some(n) => *until = Some(n - 1),
                None => {}
            }
        }
        let events = (start..end)
            .map(|i| Event::from_raw(format!("event {i}")))
            .collect();
        Ok(EventBatch::new(start, events))
    }

    async fn pause(&self, _job: &SearchJob) -> splunkblaze_client::Result<()> {
        self.record(Call::Pause);
        Ok(())
    }

    async fn cancel(&self, _job: &SearchJob) -> splunkblaze_client::Result<()> {
        self.record(Call::Cancel);
        Ok(())
    }
}

/// A status script with non-decreasing counts that always ends in `Done`.
///
/// Growth per step is biased towards zero so idle ticks are common.
pub fn count_script(max_steps: usize) -> impl Strategy<Value = Vec<StatusStep>> {
    prop::collection::vec(
        prop_oneof![3 => Just(0usize), 2 => 1usize..25, 1 => Just(usize::MAX)],
        1..max_steps.max(2),
    )
    .prop_map(|growth| {
        let mut count = 0usize;
        let mut steps: Vec<StatusStep> = growth
            .into_iter()
            .map(|g| {
                if g == usize::MAX {
                    StatusStep::Transient
                } else {
                    count += g;
                    StatusStep::Running(count)
                }
            })
            .collect();
        steps.push(StatusStep::Done(count));
        steps
    })
}
