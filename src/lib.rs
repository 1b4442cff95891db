pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

pub use application::{Storage, DAMAGED_SECTOR_MARKER};
pub use domain::entities::ResolvedPath;
pub use domain::repositories::{BlockDevice, FileHandle, FileSystemView, ResponseSink};
