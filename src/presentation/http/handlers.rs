//! Route handlers
//!
//! Each handler takes the dispatch gate, runs its use case on the
//! blocking pool against a [`ChannelSink`], and answers with whatever
//! head the use case produced and a body streamed from the channel.

use crate::application::dto::RequestInfo;
use crate::application::{
    ListDirectoryUseCase, NotFoundUseCase, Storage, StreamRawImageUseCase, DIR_ARG,
};
use crate::domain::entities::QueryArgs;
use crate::domain::repositories::{ContentLength, ResponseSink};
use crate::infrastructure::transport::{ChannelSink, ResponseHead};
use axum::body::Body;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{header, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use percent_encoding::percent_decode_str;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, error};

/// Shared state of the router
#[derive(Clone)]
pub struct AppState {
    storage: Arc<Storage>,
    // One request is served at a time; held until its body is produced.
    gate: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self {
            storage,
            gate: Arc::new(Mutex::new(())),
        }
    }
}

type QueryPairs = Result<Query<Vec<(String, String)>>, QueryRejection>;

fn query_args(query: QueryPairs) -> QueryArgs {
    match query {
        Ok(Query(pairs)) => QueryArgs::from(pairs),
        Err(e) => {
            debug!(error = %e, "Ignoring malformed query string");
            QueryArgs::new()
        }
    }
}

pub async fn list_directory(State(state): State<AppState>, query: QueryPairs) -> Response {
    let args = query_args(query);
    debug!(dir = ?args.get(DIR_ARG), "GET /list");
    dispatch(state, move |storage, sink| {
        if let Err(e) = ListDirectoryUseCase::new().execute(storage.filesystem(), &args, sink) {
            debug!(error = %e, "Directory listing ended early");
        }
    })
    .await
}

pub async fn stream_raw(State(state): State<AppState>) -> Response {
    debug!("GET /raw");
    dispatch(state, |storage, sink| {
        StreamRawImageUseCase::new().execute(storage.device(), sink);
    })
    .await
}

pub async fn not_found(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    query: QueryPairs,
) -> Response {
    let path = decode_path(uri.path());
    let request = RequestInfo::new(method.as_str(), &path, query_args(query));
    debug!(%method, path = %request.path, "Fallback request");
    dispatch(state, move |storage, sink| {
        if let Err(e) = NotFoundUseCase::new().execute(storage, &request, sink) {
            debug!(error = %e, path = %request.path, "Fallback response ended early");
        }
    })
    .await
}

/// Percent-decodes a request path, keeping it as sent if not UTF-8
fn decode_path(raw: &str) -> String {
    match percent_decode_str(raw).decode_utf8() {
        Ok(path) => path.into_owned(),
        Err(e) => {
            debug!(path = raw, error = %e, "Request path is not UTF-8 once decoded");
            raw.to_string()
        }
    }
}

/// Runs `job` on the blocking pool and turns what it writes into a response
async fn dispatch<F>(state: AppState, job: F) -> Response
where
    F: FnOnce(&Storage, &mut ChannelSink) + Send + 'static,
{
    let guard = Arc::clone(&state.gate).lock_owned().await;
    let (mut sink, head_rx, body_rx) = ChannelSink::channel();
    let storage = Arc::clone(&state.storage);

    tokio::task::spawn_blocking(move || {
        let _guard = guard;
        job(&storage, &mut sink);
        if let Err(e) = sink.finish() {
            debug!(error = %e, "Response body not delivered");
        }
    });

    match head_rx.await {
        Ok(head) => build_response(head, Body::from_stream(ReceiverStream::new(body_rx))),
        Err(_) => {
            error!("Handler finished without a response");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn build_response(head: ResponseHead, body: Body) -> Response {
    let status = StatusCode::from_u16(head.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut builder = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, head.content_type);
    if let ContentLength::Known(length) = head.length {
        builder = builder.header(header::CONTENT_LENGTH, length);
    }

    builder.body(body).unwrap_or_else(|e| {
        error!(error = %e, "Invalid response head");
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    })
}
