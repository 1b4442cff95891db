//! Response sink trait
//!
//! The transport side of a request: one status line and header set,
//! then any number of body chunks written in order.

use thiserror::Error;

/// Declared length of a response body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentLength {
    /// Exact byte count, sent as `Content-Length`
    Known(u64),
    /// Length not known up front; the body is chunked
    Unknown,
}

/// Errors raised while writing a response
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Client disconnected")]
    Disconnected,

    #[error("Response head already sent")]
    AlreadyStarted,

    #[error("Body written before response head")]
    NotStarted,
}

/// Trait for writing an HTTP response incrementally
pub trait ResponseSink {
    /// Sends status and headers; may only be called once per response
    fn begin(
        &mut self,
        status: u16,
        content_type: &str,
        length: ContentLength,
    ) -> Result<(), TransportError>;

    /// Appends a chunk to the response body
    fn send(&mut self, chunk: &[u8]) -> Result<(), TransportError>;

    /// Flushes anything the sink still holds
    fn finish(&mut self) -> Result<(), TransportError> {
        Ok(())
    }

    /// Sends a complete response with a small in-memory body
    fn respond(&mut self, status: u16, content_type: &str, body: &str) -> Result<(), TransportError> {
        self.begin(status, content_type, ContentLength::Known(body.len() as u64))?;
        if !body.is_empty() {
            self.send(body.as_bytes())?;
        }
        Ok(())
    }
}
