//! In-memory response sink
//!
//! Collects a whole response, optionally simulating a client that hangs
//! up after a number of body bytes.

use crate::domain::repositories::{ContentLength, ResponseSink, TransportError};

/// Response collected in memory
#[derive(Debug, Default, Clone)]
pub struct BufferedResponse {
    status: Option<u16>,
    content_type: Option<String>,
    content_length: Option<ContentLength>,
    body: Vec<u8>,
    chunks: usize,
    disconnect_after: Option<usize>,
}

impl BufferedResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails every `send` once `bytes` body bytes have been accepted
    pub fn disconnect_after(bytes: usize) -> Self {
        Self {
            disconnect_after: Some(bytes),
            ..Self::default()
        }
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn content_length(&self) -> Option<ContentLength> {
        self.content_length
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body as UTF-8, lossily
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Number of accepted `send` calls
    pub fn chunks(&self) -> usize {
        self.chunks
    }

    pub fn is_started(&self) -> bool {
        self.status.is_some()
    }
}

impl ResponseSink for BufferedResponse {
    fn begin(
        &mut self,
        status: u16,
        content_type: &str,
        length: ContentLength,
    ) -> Result<(), TransportError> {
        if self.status.is_some() {
            return Err(TransportError::AlreadyStarted);
        }
        self.status = Some(status);
        self.content_type = Some(content_type.to_string());
        self.content_length = Some(length);
        Ok(())
    }

    fn send(&mut self, chunk: &[u8]) -> Result<(), TransportError> {
        if self.status.is_none() {
            return Err(TransportError::NotStarted);
        }

        if let Some(limit) = self.disconnect_after {
            let room = limit.saturating_sub(self.body.len());
            if chunk.len() > room {
                self.body.extend_from_slice(&chunk[..room]);
                return Err(TransportError::Disconnected);
            }
        }

        self.body.extend_from_slice(chunk);
        self.chunks += 1;
        Ok(())
    }
}
