//! Directory listing entry

use serde::Serialize;

/// Kind of a directory child
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Dir,
    File,
}

/// One element of a `/list` response, serialized as
/// `{"type":"dir"|"file","name":"<path>"}`
///
/// Borrowed from the open handle and written out immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DirectoryEntry<'a> {
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub name: &'a str,
}

impl<'a> DirectoryEntry<'a> {
    pub fn new(kind: EntryKind, name: &'a str) -> Self {
        Self { kind, name }
    }

    /// Appends the JSON form of this entry to `out`
    pub fn write_json(&self, out: &mut Vec<u8>) -> serde_json::Result<()> {
        serde_json::to_writer(out, self)
    }
}
