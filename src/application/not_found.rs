//! Not-found fallback use case
//!
//! Runs for every request no route claimed: tries the card's files first,
//! then answers with a diagnostic 404.

use crate::application::dto::RequestInfo;
use crate::application::error::HandlerError;
use crate::application::serve_file::{ServeFileUseCase, ServeOutcome, DOWNLOAD_ARG};
use crate::application::storage::Storage;
use crate::domain::entities::TEXT_PLAIN;
use crate::domain::repositories::ResponseSink;
use std::fmt::Write;
use tracing::warn;

pub const NOT_FOUND: u16 = 404;

/// Prefix of the 404 body when no card was detected at startup
pub const DEVICE_UNAVAILABLE_NOTICE: &str = "SDCARD Not Detected\n\n";

/// Not-found fallback use case
#[derive(Debug, Default, Clone, Copy)]
pub struct NotFoundUseCase {
    serve_file: ServeFileUseCase,
}

impl NotFoundUseCase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Executes the fallback
    ///
    /// Only a transport failure can make this return an error.
    pub fn execute<S: ResponseSink + ?Sized>(
        &self,
        storage: &Storage,
        request: &RequestInfo,
        sink: &mut S,
    ) -> Result<(), HandlerError> {
        if storage.is_available() {
            let outcome = self.serve_file.execute(
                storage.filesystem(),
                &request.path,
                request.args.contains(DOWNLOAD_ARG),
                sink,
            )?;
            if outcome != ServeOutcome::NotFound {
                return Ok(());
            }
        }

        let message = not_found_message(storage.is_available(), request);
        warn!("{}", message);
        sink.respond(NOT_FOUND, TEXT_PLAIN, &message)?;
        Ok(())
    }
}

/// Builds the diagnostic 404 body
pub fn not_found_message(device_available: bool, request: &RequestInfo) -> String {
    let mut message = String::new();
    if !device_available {
        message.push_str(DEVICE_UNAVAILABLE_NOTICE);
    }

    // Writing to a String cannot fail.
    let _ = write!(
        message,
        "URI: {}\nMethod: {}\nArguments: {}\n",
        request.path,
        request.method,
        request.args.len()
    );
    for (name, value) in request.args.iter() {
        let _ = write!(message, " NAME:{}\n VALUE:{}\n", name, value);
    }

    message
}
