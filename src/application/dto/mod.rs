//! Data Transfer Objects

mod request;
mod stream_report;

pub use request::RequestInfo;
pub use stream_report::{RawStreamReport, DAMAGED_SECTORS_KEPT};
