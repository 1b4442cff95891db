//! Block device trait
//!
//! Defines sector-granular read access to the card being rescued.
//! This abstraction lets the raw streamer work with any storage medium.

use std::io;
use thiserror::Error;

/// Errors that can occur when reading from a block device
#[derive(Error, Debug)]
pub enum BlockDeviceError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    #[error("Invalid sector {sector}: device has {sector_count} sectors")]
    InvalidSector { sector: u64, sector_count: u64 },

    #[error("Invalid sector size: {0} (must be a non-zero power of two)")]
    InvalidSectorSize(usize),

    #[error("Read error at sector {sector}: {message}")]
    ReadError { sector: u64, message: String },
}

/// Trait for reading raw sectors from a block device
///
/// A failed read affects only the requested sector; the device stays
/// usable and later sectors can still be read.
///
/// # Example
///
/// ```ignore
/// let device = ImageBlockDevice::open("/dev/mmcblk0", 512)?;
/// let mut sector = vec![0u8; device.sector_size()];
/// device.read_sector(0, &mut sector)?;
/// ```
pub trait BlockDevice: Send + Sync {
    /// Returns the number of addressable sectors
    fn sector_count(&self) -> u64;

    /// Returns the size of one sector in bytes
    fn sector_size(&self) -> usize;

    /// Reads one sector into the first `sector_size()` bytes of `buffer`
    ///
    /// On error the buffer contents are unspecified.
    fn read_sector(&self, sector: u64, buffer: &mut [u8]) -> Result<(), BlockDeviceError>;

    /// Returns the size of the raw image in bytes
    fn size(&self) -> u64 {
        self.sector_count()
            .saturating_mul(self.sector_size() as u64)
    }
}
