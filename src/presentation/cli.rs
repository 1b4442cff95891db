//! Command line configuration using clap

use crate::application::Storage;
use crate::domain::repositories::{BlockDevice, FileSystemView};
use crate::infrastructure::block_device::ImageBlockDevice;
use crate::infrastructure::file_systems::HostFileSystem;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// sdrescue - storage card recovery over HTTP
///
/// Streams the raw sector image of a card at /raw and, when its
/// filesystem is mounted, lists and serves its files.
#[derive(Parser, Debug, Clone)]
#[command(name = "sdrescue")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Serve a storage card over HTTP for recovery", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Card device or image file (e.g., /dev/mmcblk0, card.img)
    #[arg(long, default_value = "/dev/mmcblk0")]
    pub device: PathBuf,

    /// Directory where the card's filesystem is mounted
    #[arg(short, long)]
    pub mount: Option<PathBuf>,

    /// Address to listen on
    #[arg(short, long, default_value = "0.0.0.0:80")]
    pub listen: SocketAddr,

    /// Logical sector size in bytes
    #[arg(short, long, default_value_t = 512)]
    pub sector_size: usize,
}

impl Cli {
    /// Default log filter for the chosen verbosity
    pub fn log_level(&self) -> &'static str {
        if self.debug {
            "trace"
        } else if self.verbose {
            "debug"
        } else {
            "info"
        }
    }

    /// Installs the global tracing subscriber; `RUST_LOG` wins when set
    pub fn init_tracing(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.log_level()));
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    }

    /// Detects the card; missing pieces are logged, not fatal
    pub fn open_storage(&self) -> Storage {
        let device: Option<Arc<dyn BlockDevice>> =
            match ImageBlockDevice::open(&self.device, self.sector_size) {
                Ok(device) => {
                    info!(
                        path = device.path(),
                        sectors = device.sector_count(),
                        sector_size = device.sector_size(),
                        "Storage device initialized"
                    );
                    Some(Arc::new(device))
                }
                Err(e) => {
                    warn!(path = %self.device.display(), error = %e, "Storage device not detected");
                    None
                }
            };

        let filesystem: Option<Arc<dyn FileSystemView>> = match &self.mount {
            Some(mount) => match HostFileSystem::new(mount) {
                Ok(view) => {
                    info!(root = %view.root().display(), "Serving files from mount point");
                    Some(Arc::new(view))
                }
                Err(e) => {
                    warn!(error = %e, "Mount point unusable, file browsing disabled");
                    None
                }
            },
            None => None,
        };

        Storage::new(device, filesystem)
    }
}
