//! In-memory block device
//!
//! Holds a whole image in a buffer and can be told to fail chosen
//! sectors, which is how a card with bad blocks behaves.

use crate::domain::repositories::{BlockDevice, BlockDeviceError};
use std::collections::HashSet;

/// Block device backed by a byte vector
#[derive(Debug, Clone)]
pub struct MemoryBlockDevice {
    data: Vec<u8>,
    sector_size: usize,
    bad_sectors: HashSet<u64>,
}

impl MemoryBlockDevice {
    /// Wraps `data`; a trailing partial sector is not addressable
    pub fn new(data: Vec<u8>, sector_size: usize) -> Result<Self, BlockDeviceError> {
        if sector_size == 0 {
            return Err(BlockDeviceError::InvalidSectorSize(sector_size));
        }
        Ok(Self {
            data,
            sector_size,
            bad_sectors: HashSet::new(),
        })
    }

    /// Makes reads of `sectors` fail
    pub fn with_bad_sectors(mut self, sectors: impl IntoIterator<Item = u64>) -> Self {
        self.bad_sectors.extend(sectors);
        self
    }

    /// True contents of a sector, ignoring injected failures
    pub fn sector_data(&self, sector: u64) -> Option<&[u8]> {
        let start = usize::try_from(sector).ok()?.checked_mul(self.sector_size)?;
        self.data.get(start..start.checked_add(self.sector_size)?)
    }
}

impl BlockDevice for MemoryBlockDevice {
    fn sector_count(&self) -> u64 {
        (self.data.len() / self.sector_size) as u64
    }

    fn sector_size(&self) -> usize {
        self.sector_size
    }

    fn read_sector(&self, sector: u64, buffer: &mut [u8]) -> Result<(), BlockDeviceError> {
        if self.bad_sectors.contains(&sector) {
            return Err(BlockDeviceError::ReadError {
                sector,
                message: "media error".to_string(),
            });
        }

        let data = self
            .sector_data(sector)
            .ok_or(BlockDeviceError::InvalidSector {
                sector,
                sector_count: self.sector_count(),
            })?;

        let buffer_len = buffer.len();
        let target = buffer
            .get_mut(..self.sector_size)
            .ok_or_else(|| BlockDeviceError::ReadError {
                sector,
                message: format!("buffer of {} bytes is smaller than a sector", buffer_len),
            })?;
        target.copy_from_slice(data);
        Ok(())
    }
}
