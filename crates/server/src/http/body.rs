//! Response body that is either a complete page or a live channel.

use std::convert::Infallible;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use hyper::body::{Body, Frame, SizeHint};
use tokio::sync::mpsc;

/// Body for every response the server sends.
///
/// `Channel` yields chunks as the poll loop writes them and ends when the
/// sending [`crate::ResponseStreamer`] is dropped.
#[derive(Debug)]
pub enum ResponseBody {
    Full(Option<Bytes>),
    Channel(mpsc::Receiver<Bytes>),
}

impl ResponseBody {
    pub fn full(content: impl Into<Bytes>) -> Self {
        Self::Full(Some(content.into()))
    }

    pub fn channel(rx: mpsc::Receiver<Bytes>) -> Self {
        Self::Channel(rx)
    }
}

impl Body for ResponseBody {
    type Data = Bytes;
    type Error = Infallible;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        match self.get_mut() {
            Self::Full(content) => Poll::Ready(content.take().map(|c| Ok(Frame::data(c)))),
            Self::Channel(rx) => rx
                .poll_recv(cx)
                .map(|chunk| chunk.map(|c| Ok(Frame::data(c)))),
        }
    }

    fn is_end_stream(&self) -> bool {
        matches!(self, Self::Full(None))
    }

    fn size_hint(&self) -> SizeHint {
        match self {
            Self::Full(Some(content)) => SizeHint::with_exact(content.len() as u64),
            Self::Full(None) => SizeHint::with_exact(0),
            Self::Channel(_) => SizeHint::default(),
        }
    }
}
