//! File system view trait
//!
//! Defines how request handlers see the card's filesystem: existence
//! checks, opening paths, and walking directories one entry at a time.

use std::io::Read;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when attaching a file system view
#[derive(Error, Debug)]
pub enum FileSystemError {
    #[error("Root not found: {0}")]
    RootNotFound(PathBuf),

    #[error("Root is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// An open file or directory
///
/// Dropping the handle releases it.
pub trait FileHandle: Read + Send {
    /// Whether this handle refers to a directory
    fn is_directory(&self) -> bool;

    /// Size in bytes (zero for directories)
    fn size(&self) -> u64;

    /// Absolute path inside the view, always starting with `/`
    fn path(&self) -> &str;

    /// Returns the next child of a directory, or `None` when exhausted
    ///
    /// Children come back in whatever order the underlying filesystem
    /// yields them. Always `None` for regular files.
    fn open_next_file(&mut self) -> Option<Box<dyn FileHandle>>;
}

/// Trait for browsing the card's filesystem
///
/// Paths are `/`-rooted strings as they appear in request URIs.
pub trait FileSystemView: Send + Sync {
    /// Whether `path` names an existing file or directory
    fn exists(&self, path: &str) -> bool;

    /// Opens `path`, returning `None` if it cannot be opened
    fn open(&self, path: &str) -> Option<Box<dyn FileHandle>>;
}
