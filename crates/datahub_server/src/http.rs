//! HTTP routes.
//!
//! | Method | Path              | Outcome                                          |
//! |--------|-------------------|--------------------------------------------------|
//! | GET    | `/health`         | 200 when ready, 503 otherwise                    |
//! | GET    | `/{location_id}`  | 200 JSON entry, 404 unknown location, 500        |
//! | PUT    | `/{location_id}`  | 201 empty, 400 bad body or id, 507 storage full  |
//!
//! Location reads and writes answer 408 when the store call does not finish
//! within the configured request timeout. Any other method on these paths
//! is answered with 405 by the router.

use crate::error::{ServerError, ServerResult};
use crate::protocol::{EntryResponse, PutRequest, ENDPOINT_HEALTH};
use crate::server::ServerState;
use axum::body::Bytes;
use axum::extract::{Extension, Path};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;
use std::time::Duration;

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            tracing::error!("request failed: {}", self);
        } else {
            tracing::debug!("request rejected: {}", self);
        }
        (self.status_code(), self.public_message()).into_response()
    }
}

/// Builds the router for a server state.
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route(ENDPOINT_HEALTH, get(handle_health))
        .route("/:location_id", get(handle_get).put(handle_put))
        .layer(Extension(state))
}

async fn handle_health(Extension(state): Extension<Arc<ServerState>>) -> (StatusCode, &'static str) {
    if state.is_ready() {
        (StatusCode::OK, "OK")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "Service unavailable")
    }
}

async fn handle_get(
    Extension(state): Extension<Arc<ServerState>>,
    Path(location_id): Path<String>,
) -> ServerResult<Json<EntryResponse>> {
    state.check_location(&location_id)?;

    let handler = state.handler().clone();
    let entry = run_store_call(state.config().request_timeout, move || {
        handler.handle_get(&location_id)
    })
    .await?;
    Ok(Json(EntryResponse::from(entry)))
}

async fn handle_put(
    Extension(state): Extension<Arc<ServerState>>,
    Path(location_id): Path<String>,
    body: Bytes,
) -> ServerResult<StatusCode> {
    state.check_location(&location_id)?;
    let request: PutRequest =
        serde_json::from_slice(&body).map_err(|e| ServerError::InvalidRequest(e.to_string()))?;
    let update = request.into_update()?;

    let handler = state.handler().clone();
    run_store_call(state.config().request_timeout, move || {
        handler.handle_put(&location_id, update)
    })
    .await?;
    Ok(StatusCode::CREATED)
}

/// Runs a store call on the blocking pool, answering 408 if it outlives
/// `timeout`.
///
/// Store calls block on segment locks, so they stay off the async workers.
/// A call that times out is not interrupted and still runs to completion.
async fn run_store_call<T, F>(timeout: Duration, call: F) -> ServerResult<T>
where
    F: FnOnce() -> ServerResult<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::time::timeout(timeout, tokio::task::spawn_blocking(call)).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => Err(ServerError::Internal(format!("store call failed: {e}"))),
        Err(_) => Err(ServerError::Timeout),
    }
}
