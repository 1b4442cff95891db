//! List directory use case
//!
//! Streams the children of one directory as a JSON array, writing each
//! entry as soon as it is read.

use crate::application::error::HandlerError;
use crate::domain::entities::{DirectoryEntry, EntryKind, QueryArgs, TEXT_JSON, TEXT_PLAIN};
use crate::domain::repositories::{ContentLength, FileSystemView, ResponseSink};
use thiserror::Error;
use tracing::debug;

/// Query argument naming the directory to list
pub const DIR_ARG: &str = "dir";

/// Status used for rejected listing requests
pub const BAD_REQUEST: u16 = 400;

/// Reasons a listing request is rejected before streaming starts
///
/// The display form is the exact response body.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListError {
    #[error("BAD ARGS")]
    BadArgs,

    #[error("BAD PATH")]
    BadPath,

    #[error("NOT DIR")]
    NotDir,
}

/// Result of a listing request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOutcome {
    /// The array was streamed with this many entries
    Listed { entries: usize },
    /// A plain-text error was sent instead
    Rejected(ListError),
}

/// List directory use case
#[derive(Debug, Default, Clone, Copy)]
pub struct ListDirectoryUseCase;

impl ListDirectoryUseCase {
    pub fn new() -> Self {
        Self
    }

    /// Executes the listing for the `dir` argument in `args`
    pub fn execute<S: ResponseSink + ?Sized>(
        &self,
        filesystem: &dyn FileSystemView,
        args: &QueryArgs,
        sink: &mut S,
    ) -> Result<ListOutcome, HandlerError> {
        let Some(path) = args.get(DIR_ARG) else {
            return reject(sink, ListError::BadArgs);
        };

        if path.is_empty() || (path != "/" && !filesystem.exists(path)) {
            return reject(sink, ListError::BadPath);
        }

        let mut dir = match filesystem.open(path) {
            Some(handle) if handle.is_directory() => handle,
            Some(handle) => {
                drop(handle);
                return reject(sink, ListError::NotDir);
            }
            None => return reject(sink, ListError::NotDir),
        };

        sink.begin(200, TEXT_JSON, ContentLength::Unknown)?;
        sink.send(b"[")?;

        let mut entries = 0usize;
        let mut chunk = Vec::new();
        while let Some(entry) = dir.open_next_file() {
            chunk.clear();
            if entries > 0 {
                chunk.push(b',');
            }

            let kind = if entry.is_directory() {
                EntryKind::Dir
            } else {
                EntryKind::File
            };
            DirectoryEntry::new(kind, entry.path()).write_json(&mut chunk)?;
            drop(entry);

            sink.send(&chunk)?;
            entries += 1;
        }

        sink.send(b"]")?;
        debug!(dir = %dir.path(), entries, "Directory listed");

        Ok(ListOutcome::Listed { entries })
    }
}

fn reject<S: ResponseSink + ?Sized>(
    sink: &mut S,
    error: ListError,
) -> Result<ListOutcome, HandlerError> {
    debug!(%error, "Listing rejected");
    sink.respond(BAD_REQUEST, TEXT_PLAIN, &error.to_string())?;
    Ok(ListOutcome::Rejected(error))
}
