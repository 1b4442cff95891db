//! Storage detected at startup
//!
//! Handed to every request handler; never changes while the server runs.

use crate::domain::repositories::{BlockDevice, BlockDeviceError, FileHandle, FileSystemView};
use std::sync::Arc;

/// The card's block device and filesystem as found at startup
///
/// A card that was not detected is represented by stand-ins that report
/// zero sectors and an empty filesystem, so handlers behave as the
/// hardware would with no card inserted.
pub struct Storage {
    device: Option<Arc<dyn BlockDevice>>,
    filesystem: Option<Arc<dyn FileSystemView>>,
}

impl Storage {
    pub fn new(
        device: Option<Arc<dyn BlockDevice>>,
        filesystem: Option<Arc<dyn FileSystemView>>,
    ) -> Self {
        Self { device, filesystem }
    }

    /// Storage with no card detected
    pub fn unavailable() -> Self {
        Self::new(None, None)
    }

    /// Whether a card was detected at startup
    pub fn is_available(&self) -> bool {
        self.device.is_some()
    }

    pub fn device(&self) -> &dyn BlockDevice {
        match &self.device {
            Some(device) => device.as_ref(),
            None => &NoDevice,
        }
    }

    pub fn filesystem(&self) -> &dyn FileSystemView {
        match &self.filesystem {
            Some(filesystem) => filesystem.as_ref(),
            None => &NoFileSystem,
        }
    }
}

const NO_DEVICE_SECTOR_SIZE: usize = 512;

struct NoDevice;

impl BlockDevice for NoDevice {
    fn sector_count(&self) -> u64 {
        0
    }

    fn sector_size(&self) -> usize {
        NO_DEVICE_SECTOR_SIZE
    }

    fn read_sector(&self, sector: u64, _buffer: &mut [u8]) -> Result<(), BlockDeviceError> {
        Err(BlockDeviceError::InvalidSector {
            sector,
            sector_count: 0,
        })
    }
}

struct NoFileSystem;

impl FileSystemView for NoFileSystem {
    fn exists(&self, _path: &str) -> bool {
        false
    }

    fn open(&self, _path: &str) -> Option<Box<dyn FileHandle>> {
        None
    }
}
