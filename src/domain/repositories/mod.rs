//! Repository traits (interfaces)
//!
//! These traits define the contracts for the collaborators the request
//! handlers consume: the block device, the filesystem and the transport.

mod block_device;
mod file_system;
mod response_sink;

pub use block_device::{BlockDevice, BlockDeviceError};
pub use file_system::{FileHandle, FileSystemError, FileSystemView};
pub use response_sink::{ContentLength, ResponseSink, TransportError};
