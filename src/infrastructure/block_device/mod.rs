//! Block device implementations

mod image_block_device;
mod memory_block_device;

pub use image_block_device::ImageBlockDevice;
pub use memory_block_device::MemoryBlockDevice;
