//! Response sink implementations

mod buffered_sink;
mod channel_sink;

pub use buffered_sink::BufferedResponse;
pub use channel_sink::{
    BodyChunk, ChannelSink, ResponseHead, CHANNEL_DEPTH, FLUSH_THRESHOLD,
};
