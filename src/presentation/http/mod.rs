//! HTTP server
//!
//! `/list` and `/raw` answer `GET`; every other path or method goes to
//! the fallback, which serves files from the card or a 404.

mod handlers;

pub use handlers::AppState;

use crate::application::Storage;
use axum::routing::get;
use axum::Router;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Builds the router over `storage`
pub fn router(storage: Arc<Storage>) -> Router {
    Router::new()
        .route(
            "/list",
            get(handlers::list_directory).fallback(handlers::not_found),
        )
        .route(
            "/raw",
            get(handlers::stream_raw).fallback(handlers::not_found),
        )
        .fallback(handlers::not_found)
        .with_state(AppState::new(storage))
}

/// Serves `storage` on `listener` until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, storage: Arc<Storage>, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(storage))
        .with_graceful_shutdown(shutdown)
        .await
}
