//! Image block device implementation
//!
//! Provides sector reads from a card reader device node (`/dev/mmcblk0`,
//! `/dev/sdX`) or from a disk image file.

use crate::domain::repositories::{BlockDevice, BlockDeviceError};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;

/// Block device backed by a device node or image file
///
/// The file is opened read-only. A trailing partial sector is not
/// addressable.
///
/// # Example
///
/// ```ignore
/// let device = ImageBlockDevice::open("/dev/mmcblk0", 512)?;
/// let mut sector = vec![0u8; 512];
/// device.read_sector(0, &mut sector)?;
/// ```
pub struct ImageBlockDevice {
    file: Mutex<File>,
    path: String,
    size: u64,
    sector_size: usize,
    sector_count: u64,
}

impl ImageBlockDevice {
    /// Opens `path` with the given logical sector size
    pub fn open(path: impl AsRef<Path>, sector_size: usize) -> Result<Self, BlockDeviceError> {
        let path = path.as_ref();

        if sector_size == 0 || !sector_size.is_power_of_two() {
            return Err(BlockDeviceError::InvalidSectorSize(sector_size));
        }

        if !path.exists() {
            return Err(BlockDeviceError::DeviceNotFound(path.display().to_string()));
        }

        let mut file = OpenOptions::new().read(true).open(path).map_err(|e| {
            if e.kind() == ErrorKind::PermissionDenied {
                BlockDeviceError::PermissionDenied(format!(
                    "{} - try running with sudo",
                    path.display()
                ))
            } else {
                BlockDeviceError::IoError(e)
            }
        })?;

        #[cfg(target_os = "linux")]
        {
            use rustix::fs::{fadvise, Advice};

            let _ = fadvise(&file, 0, None, Advice::Sequential);
        }

        // Device nodes report a zero metadata length, seeking works for both.
        let size = file.seek(SeekFrom::End(0))?;
        file.seek(SeekFrom::Start(0))?;

        Ok(Self {
            file: Mutex::new(file),
            path: path.display().to_string(),
            size,
            sector_size,
            sector_count: size / sector_size as u64,
        })
    }

    /// Returns the device path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Size of the underlying file in bytes, including any partial sector
    pub fn byte_len(&self) -> u64 {
        self.size
    }
}

impl BlockDevice for ImageBlockDevice {
    fn sector_count(&self) -> u64 {
        self.sector_count
    }

    fn sector_size(&self) -> usize {
        self.sector_size
    }

    fn read_sector(&self, sector: u64, buffer: &mut [u8]) -> Result<(), BlockDeviceError> {
        if sector >= self.sector_count {
            return Err(BlockDeviceError::InvalidSector {
                sector,
                sector_count: self.sector_count,
            });
        }

        let buffer_len = buffer.len();
        let Some(target) = buffer.get_mut(..self.sector_size) else {
            return Err(BlockDeviceError::ReadError {
                sector,
                message: format!("buffer of {} bytes is smaller than a sector", buffer_len),
            });
        };

        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(sector * self.sector_size as u64))?;
        file.read_exact(target).map_err(|e| {
            if e.kind() == ErrorKind::UnexpectedEof {
                BlockDeviceError::ReadError {
                    sector,
                    message: "Unexpected end of device".to_string(),
                }
            } else {
                BlockDeviceError::IoError(e)
            }
        })
    }
}
