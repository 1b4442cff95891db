//! Serve file use case
//!
//! Resolves a request path to a file on the card and streams it with a
//! content type inferred from its suffix.

use crate::application::error::HandlerError;
use crate::domain::entities::{ResolvedPath, DEFAULT_DOCUMENT, OCTET_STREAM, TEXT_HTML};
use crate::domain::repositories::{ContentLength, FileHandle, FileSystemView, ResponseSink};
use std::io::{ErrorKind, Read};
use tracing::{debug, warn};

/// Query argument that forces `application/octet-stream`
pub const DOWNLOAD_ARG: &str = "download";

const READ_CHUNK_SIZE: usize = 4096;

/// Result of a static file request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServeOutcome {
    /// Nothing could be opened; the caller should answer 404
    NotFound,
    /// The file was streamed
    Served {
        path: String,
        content_type: &'static str,
        declared: u64,
        sent: u64,
    },
}

/// Serve file use case
#[derive(Debug, Default, Clone, Copy)]
pub struct ServeFileUseCase;

impl ServeFileUseCase {
    pub fn new() -> Self {
        Self
    }

    /// Executes the request for `path`
    ///
    /// A directory is served through its `index.htm`. Once the response
    /// head is out, read errors and short files only produce a warning.
    pub fn execute<S: ResponseSink + ?Sized>(
        &self,
        filesystem: &dyn FileSystemView,
        path: &str,
        force_download: bool,
        sink: &mut S,
    ) -> Result<ServeOutcome, HandlerError> {
        let ResolvedPath {
            mut path,
            mut content_type,
        } = ResolvedPath::resolve(path);

        let mut file = filesystem.open(&path);
        if file.as_ref().is_some_and(|f| f.is_directory()) {
            drop(file);
            if !path.ends_with('/') {
                path.push('/');
            }
            path.push_str(DEFAULT_DOCUMENT);
            content_type = TEXT_HTML;
            file = filesystem.open(&path);
        }

        let Some(mut file) = file else {
            debug!(%path, "No file to serve");
            return Ok(ServeOutcome::NotFound);
        };

        if force_download {
            content_type = OCTET_STREAM;
        }

        let declared = file.size();
        sink.begin(200, content_type, ContentLength::Known(declared))?;
        let sent = stream_file(file.as_mut(), declared, sink);

        if sent != declared {
            warn!(%path, declared, sent, "Sent less data than expected");
        }

        Ok(ServeOutcome::Served {
            path,
            content_type,
            declared,
            sent,
        })
    }
}

/// Copies at most `limit` bytes from `file` to `sink`, returning the count
fn stream_file<S: ResponseSink + ?Sized>(
    file: &mut dyn FileHandle,
    limit: u64,
    sink: &mut S,
) -> u64 {
    let mut reader = file.take(limit);
    let mut buffer = [0u8; READ_CHUNK_SIZE];
    let mut sent = 0u64;

    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!(error = %e, "Read failed while sending file");
                break;
            }
        };

        if let Err(e) = sink.send(&buffer[..n]) {
            debug!(error = %e, "Client went away while sending file");
            break;
        }
        sent += n as u64;
    }

    sent
}
