//! Domain entities
//!
//! Request-scoped values the handlers work with: resolved paths and
//! their content types, listing entries and query arguments.

mod content_type;
mod directory_entry;
mod query_args;

pub use content_type::{
    content_type_for, ResolvedPath, DEFAULT_DOCUMENT, OCTET_STREAM, RAW_SOURCE_SUFFIX, TEXT_HTML,
    TEXT_JSON, TEXT_PLAIN,
};
pub use directory_entry::{DirectoryEntry, EntryKind};
pub use query_args::QueryArgs;
