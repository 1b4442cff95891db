//! Content type resolution
//!
//! Maps a request path to the file that should be opened and the MIME
//! type it is served with.

pub const TEXT_PLAIN: &str = "text/plain";
pub const TEXT_HTML: &str = "text/html";
pub const TEXT_JSON: &str = "text/json";
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Document served for paths naming a directory
pub const DEFAULT_DOCUMENT: &str = "index.htm";

/// Suffix that forces a file to be delivered as plain text
pub const RAW_SOURCE_SUFFIX: &str = ".src";

/// Suffix to MIME type table; suffixes are matched case-sensitively
const CONTENT_TYPES: &[(&str, &str)] = &[
    ("htm", TEXT_HTML),
    ("css", "text/css"),
    ("js", "application/javascript"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("jpg", "image/jpeg"),
    ("ico", "image/x-icon"),
    ("xml", "text/xml"),
    ("pdf", "application/pdf"),
    ("zip", "application/zip"),
];

/// A request path after default-document and `.src` handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// Path to open in the file system view
    pub path: String,
    /// MIME type to serve it with
    pub content_type: &'static str,
}

impl ResolvedPath {
    /// Resolves `path` to the file to open and its content type
    ///
    /// # Example
    ///
    /// ```
    /// use sdrescue::domain::entities::ResolvedPath;
    ///
    /// let resolved = ResolvedPath::resolve("/page.htm.src");
    /// assert_eq!(resolved.path, "/page.htm");
    /// assert_eq!(resolved.content_type, "text/plain");
    /// ```
    pub fn resolve(path: &str) -> Self {
        let mut path = path.to_string();
        if path.ends_with('/') {
            path.push_str(DEFAULT_DOCUMENT);
        }

        if let Some(stripped) = path.strip_suffix(RAW_SOURCE_SUFFIX) {
            return Self {
                path: stripped.to_string(),
                content_type: TEXT_PLAIN,
            };
        }

        let content_type = extension(&path)
            .and_then(content_type_for)
            .unwrap_or(TEXT_PLAIN);

        Self { path, content_type }
    }
}

/// Looks up the MIME type registered for a suffix (without the dot)
pub fn content_type_for(extension: &str) -> Option<&'static str> {
    CONTENT_TYPES
        .iter()
        .find(|(suffix, _)| *suffix == extension)
        .map(|(_, mime)| *mime)
}

/// Suffix after the last dot of the final path segment
fn extension(path: &str) -> Option<&str> {
    let name = path.rsplit('/').next().unwrap_or(path);
    name.rsplit_once('.').map(|(_, ext)| ext)
}
