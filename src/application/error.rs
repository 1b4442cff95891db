use crate::domain::repositories::TransportError;
use thiserror::Error;

/// Errors that end a request handler early
///
/// These never reach the client as a status code: the response head has
/// either been sent already or the client is gone.
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}
