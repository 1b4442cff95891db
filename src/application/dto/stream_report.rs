//! Raw stream report DTO

/// Damaged sector indices kept in a report; later ones are only counted
pub const DAMAGED_SECTORS_KEPT: usize = 1024;

/// Summary of one `/raw` transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawStreamReport {
    /// Sectors in the device when the request started
    pub sector_count: u64,
    /// Bytes per sector
    pub sector_size: usize,
    /// Sectors whose bytes were handed to the transport
    pub sectors_streamed: u64,
    /// Number of sectors replaced by the damaged-sector marker
    pub damaged_count: u64,
    /// Indices of the first [`DAMAGED_SECTORS_KEPT`] damaged sectors
    pub first_damaged: Vec<u64>,
    /// Body bytes handed to the transport
    pub bytes_sent: u64,
    /// Hex SHA-256 of the bytes handed to the transport
    pub sha256: String,
}

impl RawStreamReport {
    /// Declared length of the raw image
    pub fn declared_length(&self) -> u64 {
        self.sector_count.saturating_mul(self.sector_size as u64)
    }

    /// Records a substituted sector
    pub fn record_damaged(&mut self, sector: u64) {
        self.damaged_count += 1;
        if self.first_damaged.len() < DAMAGED_SECTORS_KEPT {
            self.first_damaged.push(sector);
        }
    }

    /// Whether every sector reached the transport
    pub fn is_complete(&self) -> bool {
        self.sectors_streamed == self.sector_count
    }
}
