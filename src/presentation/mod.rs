//! Presentation layer
//!
//! Command line configuration and the HTTP surface.

pub mod cli;
pub mod http;

pub use cli::Cli;
