//! File system view implementations

mod host_file_system;

pub use host_file_system::{HostFileSystem, HostHandle};
