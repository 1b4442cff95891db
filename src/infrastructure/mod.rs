//! Infrastructure layer
//!
//! Concrete implementations of the domain repositories.
//! This layer contains all platform-specific and I/O code.

pub mod block_device;
pub mod file_systems;
pub mod transport;
