//! The job API seam.
//!
//! The poll loop and the HTTP front-end are written against [`JobApi`] rather
//! than [`crate::SplunkClient`], so a scripted implementation can drive them
//! in tests without a remote server.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{DispatchOptions, EventBatch, JobStatus, SearchJob};

/// Operations on remote search jobs.
///
/// Implementations must be cheap to share across tasks; every call takes
/// `&self` and no call mutates shared state.
#[async_trait]
pub trait JobApi: Send + Sync {
    /// Create a search job for `query`.
    ///
    /// Fails with [`crate::ClientError::QuerySyntax`] when the parser rejects
    /// the query, an auth error when the shared credential is rejected, and a
    /// transient error when the remote is unavailable.
    async fn dispatch(&self, query: &str, options: &DispatchOptions) -> Result<SearchJob>;

    /// Poll the job's progress.
    async fn status(&self, job: &SearchJob) -> Result<JobStatus>;

    /// Fetch events `[start, end)`.
    ///
    /// `start > end` fails with [`crate::ClientError::InvalidRange`];
    /// `start == end` yields an empty batch.
    async fn fetch_events(&self, job: &SearchJob, start: usize, end: usize) -> Result<EventBatch>;

    /// Ask the remote to pause the job. Idempotent.
    async fn pause(&self, job: &SearchJob) -> Result<()>;

    /// Ask the remote to cancel the job. Idempotent.
    async fn cancel(&self, job: &SearchJob) -> Result<()>;
}
