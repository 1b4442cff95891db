//! Host file system view
//!
//! Exposes the card's filesystem as mounted by the host OS. Request
//! paths are looked up under the mount point and never leave it.

use crate::domain::repositories::{FileHandle, FileSystemError, FileSystemView};
use std::fs::{self, File, Metadata, ReadDir};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File system view rooted at a host directory
///
/// # Example
///
/// ```ignore
/// let view = HostFileSystem::new("/media/sdcard")?;
/// let index = view.open("/index.htm");
/// ```
#[derive(Debug, Clone)]
pub struct HostFileSystem {
    root: PathBuf,
}

impl HostFileSystem {
    /// Creates a view of `root`, which must be an existing directory
    pub fn new(root: impl AsRef<Path>) -> Result<Self, FileSystemError> {
        let root = root.as_ref();
        let metadata = fs::metadata(root).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                FileSystemError::RootNotFound(root.to_path_buf())
            } else {
                FileSystemError::IoError(e)
            }
        })?;

        if !metadata.is_dir() {
            return Err(FileSystemError::NotADirectory(root.to_path_buf()));
        }

        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// Returns the mount point
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a request path to a host path and its normalized view path
    ///
    /// Returns `None` for paths that try to climb above the root.
    fn locate(&self, path: &str) -> Option<(PathBuf, String)> {
        let mut host_path = self.root.clone();
        let mut view_path = String::new();

        for component in path.split('/') {
            match component {
                "" | "." => continue,
                ".." => return None,
                name if name.contains('\\') => return None,
                name => {
                    host_path.push(name);
                    view_path.push('/');
                    view_path.push_str(name);
                }
            }
        }

        if view_path.is_empty() {
            view_path.push('/');
        }
        Some((host_path, view_path))
    }
}

impl FileSystemView for HostFileSystem {
    fn exists(&self, path: &str) -> bool {
        self.locate(path)
            .is_some_and(|(host_path, _)| host_path.exists())
    }

    fn open(&self, path: &str) -> Option<Box<dyn FileHandle>> {
        let (host_path, view_path) = self.locate(path)?;
        match HostHandle::open(host_path, view_path) {
            Ok(handle) => Some(Box::new(handle)),
            Err(e) => {
                debug!(path, error = %e, "Cannot open");
                None
            }
        }
    }
}

enum Node {
    File {
        host_path: PathBuf,
        // Opened on first read for handles produced by directory walks.
        file: Option<File>,
    },
    Directory {
        host_path: PathBuf,
        entries: Option<ReadDir>,
    },
}

/// Open file or directory under a [`HostFileSystem`]
pub struct HostHandle {
    view_path: String,
    size: u64,
    node: Node,
}

impl HostHandle {
    fn open(host_path: PathBuf, view_path: String) -> io::Result<Self> {
        let metadata = fs::metadata(&host_path)?;
        let file = if metadata.is_dir() {
            None
        } else {
            Some(File::open(&host_path)?)
        };

        let mut handle = Self::from_metadata(host_path, view_path, &metadata);
        if let Node::File { file: slot, .. } = &mut handle.node {
            *slot = file;
        }
        Ok(handle)
    }

    fn from_metadata(host_path: PathBuf, view_path: String, metadata: &Metadata) -> Self {
        if metadata.is_dir() {
            Self {
                view_path,
                size: 0,
                node: Node::Directory {
                    host_path,
                    entries: None,
                },
            }
        } else {
            Self {
                view_path,
                size: metadata.len(),
                node: Node::File {
                    host_path,
                    file: None,
                },
            }
        }
    }
}

fn child_path(parent: &str, name: &str) -> String {
    if parent.ends_with('/') {
        format!("{}{}", parent, name)
    } else {
        format!("{}/{}", parent, name)
    }
}

impl FileHandle for HostHandle {
    fn is_directory(&self) -> bool {
        matches!(self.node, Node::Directory { .. })
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn path(&self) -> &str {
        &self.view_path
    }

    fn open_next_file(&mut self) -> Option<Box<dyn FileHandle>> {
        let Node::Directory { host_path, entries } = &mut self.node else {
            return None;
        };

        if entries.is_none() {
            match fs::read_dir(&*host_path) {
                Ok(read_dir) => *entries = Some(read_dir),
                Err(e) => {
                    debug!(path = %self.view_path, error = %e, "Cannot read directory");
                    return None;
                }
            }
        }

        for entry in entries.as_mut()? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!(path = %self.view_path, error = %e, "Skipping unreadable entry");
                    continue;
                }
            };

            let entry_path = entry.path();
            let metadata = match fs::metadata(&entry_path) {
                Ok(metadata) => metadata,
                Err(e) => {
                    debug!(path = %entry_path.display(), error = %e, "Skipping entry");
                    continue;
                }
            };

            let name = entry.file_name().to_string_lossy().into_owned();
            let view_path = child_path(&self.view_path, &name);
            return Some(Box::new(HostHandle::from_metadata(
                entry_path, view_path, &metadata,
            )));
        }

        None
    }
}

impl Read for HostHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.node {
            Node::File { host_path, file } => {
                if file.is_none() {
                    *file = Some(File::open(&*host_path)?);
                }
                file.as_mut().map_or(Ok(0), |f| f.read(buf))
            }
            Node::Directory { .. } => Err(io::Error::other(format!(
                "{} is a directory",
                self.view_path
            ))),
        }
    }
}
