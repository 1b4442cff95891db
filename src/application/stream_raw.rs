//! Stream raw image use case
//!
//! Sends the whole block device as one response, sector by sector,
//! independent of any filesystem on it.

use crate::application::dto::RawStreamReport;
use crate::domain::entities::OCTET_STREAM;
use crate::domain::repositories::{BlockDevice, ContentLength, ResponseSink};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

/// Byte written over every position of a sector that failed to read
pub const DAMAGED_SECTOR_MARKER: u8 = 0xE5;

/// Stream raw image use case
///
/// Visits sectors `0..sector_count` in ascending order exactly once.
/// A sector that fails to read is replaced by a full sector of
/// [`DAMAGED_SECTOR_MARKER`] bytes, so the body always has the declared
/// length unless the client goes away.
#[derive(Debug, Default, Clone, Copy)]
pub struct StreamRawImageUseCase;

impl StreamRawImageUseCase {
    pub fn new() -> Self {
        Self
    }

    /// Executes the transfer
    ///
    /// Never fails: damaged sectors are substituted and a transport error
    /// just ends the stream early, which the returned report shows.
    pub fn execute<S: ResponseSink + ?Sized>(
        &self,
        device: &dyn BlockDevice,
        sink: &mut S,
    ) -> RawStreamReport {
        let sector_count = device.sector_count();
        let sector_size = device.sector_size();
        let total = sector_count.saturating_mul(sector_size as u64);

        info!(
            "{} sectors, {} bytes per sector, {} bytes",
            sector_count, sector_size, total
        );

        let mut report = RawStreamReport {
            sector_count,
            sector_size,
            sectors_streamed: 0,
            damaged_count: 0,
            first_damaged: Vec::new(),
            bytes_sent: 0,
            sha256: String::new(),
        };
        let mut hasher = Sha256::new();

        if let Err(e) = sink.begin(200, OCTET_STREAM, ContentLength::Known(total)) {
            warn!(error = %e, "Could not start raw image response");
            report.sha256 = hex::encode(hasher.finalize());
            return report;
        }

        let mut buffer = vec![0u8; sector_size];

        for sector in 0..sector_count {
            if let Err(e) = device.read_sector(sector, &mut buffer) {
                buffer.fill(DAMAGED_SECTOR_MARKER);
                warn!(sector, error = %e, "Error reading sector");
                report.record_damaged(sector);
            }

            if let Err(e) = sink.send(&buffer) {
                info!(
                    sector,
                    bytes_sent = report.bytes_sent,
                    error = %e,
                    "Raw image transfer aborted"
                );
                break;
            }

            hasher.update(&buffer);
            report.sectors_streamed += 1;
            report.bytes_sent += sector_size as u64;
        }

        report.sha256 = hex::encode(hasher.finalize());

        info!(
            sectors = report.sectors_streamed,
            damaged = report.damaged_count,
            bytes = report.bytes_sent,
            sha256 = %report.sha256,
            complete = report.is_complete(),
            "Raw image transfer finished"
        );

        report
    }
}
