//! Application layer
//!
//! Request handlers that drive the block device, the filesystem view and
//! the response sink.

pub mod dto;
mod error;
mod list_directory;
mod not_found;
mod serve_file;
mod storage;
mod stream_raw;

pub use error::HandlerError;
pub use list_directory::{ListDirectoryUseCase, ListError, ListOutcome, BAD_REQUEST, DIR_ARG};
pub use not_found::{not_found_message, NotFoundUseCase, DEVICE_UNAVAILABLE_NOTICE, NOT_FOUND};
pub use serve_file::{ServeFileUseCase, ServeOutcome, DOWNLOAD_ARG};
pub use storage::Storage;
pub use stream_raw::{StreamRawImageUseCase, DAMAGED_SECTOR_MARKER};
