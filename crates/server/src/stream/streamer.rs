//! Incremental writes to one HTTP response.
//!
//! Responsibilities:
//! - Render header, event batches and the closing fragment in order.
//! - Push rendered chunks into the channel backing the response body.
//!
//! Does NOT handle:
//! - Deciding when to write (see [`super::poll`]).
//!
//! Invariants:
//! - The header is written at most once.
//! - `finalize` consumes the streamer, so nothing can be written after it
//!   and it cannot run twice.
//! - Dropping the sender ends the chunked body.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use splunkblaze_client::{EventBatch, JobStatus, SearchJob};
use thiserror::Error;
use tokio::sync::mpsc;

use super::poll::StopReason;
use super::render::Render;

/// Errors raised while writing to the response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// The body receiver is gone (client disconnected or response dropped).
    #[error("client disconnected")]
    ClientGone,

    #[error("response header already written")]
    HeaderAlreadyWritten,
}

/// How the response is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finalization {
    /// Nothing was streamed; write a complete page.
    FullTerminalRender,
    /// Header and batches are out; append the closing fragment.
    SimpleClose,
}

/// Everything the renderer needs to close a response.
#[derive(Debug, Clone)]
pub struct FinalView {
    pub job: SearchJob,
    pub reason: StopReason,
    /// Last status observed by the poll loop, if any.
    pub status: Option<JobStatus>,
    /// Events for a full terminal render. Empty for `SimpleClose`.
    pub events: EventBatch,
    /// Events already streamed before the close.
    pub events_flushed: usize,
    pub max_wait: Option<Duration>,
}

/// Writer half of a streamed response.
pub struct ResponseStreamer {
    tx: mpsc::Sender<Bytes>,
    renderer: Arc<dyn Render>,
    header_written: bool,
}

impl ResponseStreamer {
    /// Create a streamer and the receiver that feeds the response body.
    ///
    /// `capacity` bounds the number of rendered chunks buffered ahead of the
    /// client. A slow reader makes writes wait.
    pub fn channel(renderer: Arc<dyn Render>, capacity: usize) -> (Self, mpsc::Receiver<Bytes>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (
            Self {
                tx,
                renderer,
                header_written: false,
            },
            rx,
        )
    }

    pub fn header_written(&self) -> bool {
        self.header_written
    }

    pub async fn write_header(
        &mut self,
        job: &SearchJob,
        status: &JobStatus,
    ) -> Result<(), StreamError> {
        if self.header_written {
            return Err(StreamError::HeaderAlreadyWritten);
        }
        let chunk = self.renderer.header(job, status);
        self.send(chunk).await?;
        self.header_written = true;
        Ok(())
    }

    pub async fn write_events(&mut self, batch: &EventBatch) -> Result<(), StreamError> {
        if batch.is_empty() {
            return Ok(());
        }
        let chunk = self.renderer.events(batch);
        self.send(chunk).await
    }

    /// Close the response.
    pub async fn finalize(
        self,
        mode: Finalization,
        view: &FinalView,
    ) -> Result<(), StreamError> {
        let chunk = match mode {
            Finalization::FullTerminalRender => self.renderer.full_page(view),
            Finalization::SimpleClose => {
                let mut out = self.renderer.notice(view).unwrap_or_default();
                out.push_str(&self.renderer.footer());
                out
            }
        };
        self.send(chunk).await
    }

    async fn send(&self, chunk: String) -> Result<(), StreamError> {
        self.tx
            .send(Bytes::from(chunk))
            .await
            .map_err(|_| StreamError::ClientGone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::render::HtmlRenderer;
    use splunkblaze_client::{Event, FetchOptions};

    fn job() -> SearchJob {
        SearchJob::new("s1", "search *", FetchOptions::default())
    }

    fn streamer() -> (ResponseStreamer, mpsc::Receiver<Bytes>) {
        ResponseStreamer::channel(Arc::new(HtmlRenderer::new()), 16)
    }

    async fn drain(mut rx: mpsc::Receiver<Bytes>) -> String {
        let mut body = String::new();
        while let Some(chunk) = rx.recv().await {
            body.push_str(std::str::from_utf8(&chunk).unwrap());
        }
        body
    }

    fn view(reason: StopReason) -> FinalView {
        FinalView {
            job: job(),
            reason,
            status: None,
            events: EventBatch::empty(0),
            events_flushed: 0,
            max_wait: Some(Duration::from_secs(10)),
        }
    }

    #[tokio::test]
    async fn test_header_is_write_once() {
        let (mut s, _rx) = streamer();
        s.write_header(&job(), &JobStatus::default()).await.unwrap();
        assert!(s.header_written());
        let err = s
            .write_header(&job(), &JobStatus::default())
            .await
            .unwrap_err();
        assert_eq!(err, StreamError::HeaderAlreadyWritten);
    }

    #[tokio::test]
    async fn test_writes_are_ordered_and_close_ends_body() {
        let (mut s, rx) = streamer();
        s.write_header(&job(), &JobStatus::default()).await.unwrap();
        s.write_events(&EventBatch::new(0, vec![Event::from_raw("first")]))
            .await
            .unwrap();
        s.write_events(&EventBatch::new(1, vec![Event::from_raw("second")]))
            .await
            .unwrap();
        s.finalize(Finalization::SimpleClose, &view(StopReason::Completed))
            .await
            .unwrap();

        let body = drain(rx).await;
        let header = body.find("Search results").unwrap();
        let first = body.find("first").unwrap();
        let second = body.find("second").unwrap();
        assert!(header < first && first < second);
        assert!(body.trim_end().ends_with("</html>"));
        assert_eq!(body.matches("</html>").count(), 1);
    }

    #[tokio::test]
    async fn test_full_terminal_render_is_one_chunk() {
        let (s, mut rx) = streamer();
        s.finalize(Finalization::FullTerminalRender, &view(StopReason::TimedOut))
            .await
            .unwrap();
        let chunk = rx.recv().await.unwrap();
        assert!(chunk.starts_with(b"<!DOCTYPE html>"));
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_dropped_receiver_is_client_gone() {
        let (mut s, rx) = streamer();
        drop(rx);
        let err = s
            .write_header(&job(), &JobStatus::default())
            .await
            .unwrap_err();
        assert_eq!(err, StreamError::ClientGone);
        assert!(!s.header_written());
    }

    #[tokio::test]
    async fn test_empty_batch_writes_nothing() {
        let (mut s, mut rx) = streamer();
        s.write_events(&EventBatch::empty(3)).await.unwrap();
        drop(s);
        assert!(rx.recv().await.is_none());
    }
}
