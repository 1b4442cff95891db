//! Channel-backed response sink
//!
//! Bridges a blocking handler to the async HTTP server: the head goes
//! through a oneshot, body chunks through a bounded channel that the
//! server drains as the client reads.

use crate::domain::repositories::{ContentLength, ResponseSink, TransportError};
use bytes::{Bytes, BytesMut};
use std::convert::Infallible;
use tokio::sync::{mpsc, oneshot};

/// Body bytes gathered before a chunk is handed to the server
pub const FLUSH_THRESHOLD: usize = 64 * 1024;

/// Chunks buffered between the handler and the client
pub const CHANNEL_DEPTH: usize = 8;

/// Item type of the body channel
pub type BodyChunk = Result<Bytes, Infallible>;

/// Status line and headers of a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    pub status: u16,
    pub content_type: String,
    pub length: ContentLength,
}

/// Sink writing into channels read by the HTTP server
///
/// Must be driven from a blocking thread: sends block while the client
/// is slower than the handler. Small writes are coalesced up to
/// [`FLUSH_THRESHOLD`]; call [`ResponseSink::finish`] to push the rest.
pub struct ChannelSink {
    head: Option<oneshot::Sender<ResponseHead>>,
    body: mpsc::Sender<BodyChunk>,
    pending: BytesMut,
}

impl ChannelSink {
    /// Creates a sink and the receiving ends for the server
    pub fn channel() -> (Self, oneshot::Receiver<ResponseHead>, mpsc::Receiver<BodyChunk>) {
        let (head_tx, head_rx) = oneshot::channel();
        let (body_tx, body_rx) = mpsc::channel(CHANNEL_DEPTH);
        let sink = Self {
            head: Some(head_tx),
            body: body_tx,
            pending: BytesMut::with_capacity(FLUSH_THRESHOLD),
        };
        (sink, head_rx, body_rx)
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let chunk = self.pending.split().freeze();
        self.body
            .blocking_send(Ok(chunk))
            .map_err(|_| TransportError::Disconnected)
    }
}

impl ResponseSink for ChannelSink {
    fn begin(
        &mut self,
        status: u16,
        content_type: &str,
        length: ContentLength,
    ) -> Result<(), TransportError> {
        let head = self.head.take().ok_or(TransportError::AlreadyStarted)?;
        head.send(ResponseHead {
            status,
            content_type: content_type.to_string(),
            length,
        })
        .map_err(|_| TransportError::Disconnected)
    }

    fn send(&mut self, chunk: &[u8]) -> Result<(), TransportError> {
        if self.head.is_some() {
            return Err(TransportError::NotStarted);
        }
        if self.body.is_closed() {
            return Err(TransportError::Disconnected);
        }

        self.pending.extend_from_slice(chunk);
        if self.pending.len() >= FLUSH_THRESHOLD {
            self.flush()?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), TransportError> {
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_writes_are_coalesced() {
        let (mut sink, mut head_rx, mut body_rx) = ChannelSink::channel();

        sink.begin(200, "text/plain", ContentLength::Unknown).unwrap();
        sink.send(b"[").unwrap();
        sink.send(b"]").unwrap();
        assert!(body_rx.try_recv().is_err());

        sink.finish().unwrap();
        let head = head_rx.try_recv().unwrap();
        assert_eq!(head.status, 200);
        assert_eq!(body_rx.try_recv().unwrap().unwrap(), Bytes::from_static(b"[]"));
    }

    #[test]
    fn test_send_before_begin_is_rejected() {
        let (mut sink, _head_rx, _body_rx) = ChannelSink::channel();
        assert_eq!(sink.send(b"x"), Err(TransportError::NotStarted));
    }

    #[test]
    fn test_dropped_receiver_is_a_disconnect() {
        let (mut sink, _head_rx, body_rx) = ChannelSink::channel();
        sink.begin(200, "application/octet-stream", ContentLength::Known(4))
            .unwrap();
        drop(body_rx);
        assert_eq!(sink.send(b"data"), Err(TransportError::Disconnected));
    }
}
