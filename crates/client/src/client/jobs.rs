//! Search job methods for [`SplunkClient`].

use async_trait::async_trait;
use tracing::debug;

use crate::api::JobApi;
use crate::client::SplunkClient;
use crate::endpoints::{self, JobAction};
use crate::error::{ClientError, Result};
use crate::models::{DispatchOptions, EventBatch, JobStatus, SearchJob};
use crate::redact_query;

impl SplunkClient {
    async fn control(&self, job: &SearchJob, action: JobAction) -> Result<()> {
        match endpoints::control_job(
            &self.http,
            &self.base_url,
            &self.credential,
            &job.sid,
            action,
            self.retry,
            self.metrics.as_ref(),
        )
        .await
        {
            // Already finished or reaped: nothing left to control.
            Err(ClientError::NotFound(_)) => {
                debug!(sid = %job.sid, %action, "Job no longer exists");
                Ok(())
            }
            other => other,
        }
    }
}

#[async_trait]
impl JobApi for SplunkClient {
    async fn dispatch(&self, query: &str, options: &DispatchOptions) -> Result<SearchJob> {
        let query = endpoints::normalize_query(query);
        let sid = endpoints::create_job(
            &self.http,
            &self.base_url,
            &self.credential,
            &query,
            options,
            self.retry,
            self.metrics.as_ref(),
        )
        .await?;
        debug!(sid = %sid, query = %redact_query(&query), "Dispatched search job");
        Ok(SearchJob::new(sid, query, options.fetch.clone()))
    }

    async fn status(&self, job: &SearchJob) -> Result<JobStatus> {
        endpoints::get_job_status(
            &self.http,
            &self.base_url,
            &self.credential,
            &job.sid,
            self.retry,
            self.metrics.as_ref(),
        )
        .await
    }

    async fn fetch_events(&self, job: &SearchJob, start: usize, end: usize) -> Result<EventBatch> {
        if start > end {
            return Err(ClientError::InvalidRange { start, end });
        }
        if start == end {
            return Ok(EventBatch::empty(start));
        }

        let mut events = endpoints::get_events(
            &self.http,
            &self.base_url,
            &self.credential,
            &job.sid,
            start,
            end - start,
            &job.fetch,
            self.retry,
            self.metrics.as_ref(),
        )
        .await?;
        events.truncate(end - start);
        Ok(EventBatch::new(start, events))
    }

    async fn pause(&self, job: &SearchJob) -> Result<()> {
        self.control(job, JobAction::Pause).await
    }

    async fn cancel(&self, job: &SearchJob) -> Result<()> {
        self.control(job, JobAction::Cancel).await
    }
}
