//! REST API: shared state, router, handlers, and error mapping.
//!
//! Every handler runs against the shared [`TaskStore`]. Failures are returned
//! as a JSON [`ErrorBody`] with a 400 (validation or malformed body), 404
//! (unknown task) or 500 (handler panic) status.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use taskboard_proto::dashboard::Dashboard;
use taskboard_proto::repo::RepoError;
use taskboard_proto::task::{Comment, Task, TaskId};
use taskboard_proto::wire::{ErrorBody, NewComment, NewTask, TaskPatch};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::store::TaskStore;

/// Shared server state.
pub struct ServerState {
    /// Task storage.
    pub store: TaskStore,
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerState {
    /// Creates server state with an empty store and default limits.
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: TaskStore::new(),
        }
    }

    /// Creates server state from a resolved configuration.
    #[must_use]
    pub fn with_config(config: &ServerConfig) -> Self {
        Self {
            store: TaskStore::with_config(config.catalog.clone(), config.max_title_length),
        }
    }
}

/// Errors returned by request handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Store-level failure (validation or unknown task).
    #[error(transparent)]
    Repo(#[from] RepoError),
    /// The request body could not be decoded.
    #[error("invalid request body: {0}")]
    BadBody(String),
    /// The request could not be completed; details stay in the server log.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self::BadBody(value.body_text())
    }
}

impl ApiError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Repo(RepoError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Repo(RepoError::Invalid(_)) | Self::BadBody(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = if let Self::Internal(detail) = &self {
            tracing::error!(status = %status, error = %detail, "request failed");
            "internal server error".to_string()
        } else {
            tracing::warn!(status = %status, error = %self, "request failed");
            self.to_string()
        };
        (status, Json(ErrorBody { error })).into_response()
    }
}

/// Turns a handler panic into a 500 response.
fn panic_response(panic: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "handler panicked".to_string());
    ApiError::Internal(detail).into_response()
}

/// `?owner=` query parameter accepted by the list and dashboard endpoints.
#[derive(Debug, Default, serde::Deserialize)]
struct OwnerQuery {
    owner: Option<String>,
}

/// Builds the application router over the given state.
pub fn router(state: Arc<ServerState>) -> Router {
    let routes = Router::new()
        .route("/health", get(health))
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/{id}", axum::routing::patch(update_task).delete(delete_task))
        .route("/tasks/{id}/comment", post(add_comment))
        .route("/dashboard", get(dashboard))
        .with_state(state);
    with_layers(routes)
}

/// Middleware shared by every route.
fn with_layers(routes: Router) -> Router {
    routes
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn health() -> &'static str {
    "OK"
}

async fn list_tasks(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<OwnerQuery>,
) -> Json<Vec<Task>> {
    Json(state.store.list(query.owner.as_deref()).await)
}

async fn create_task(
    State(state): State<Arc<ServerState>>,
    body: Result<Json<NewTask>, JsonRejection>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let Json(req) = body?;
    let task = state.store.create(req).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

async fn update_task(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
    body: Result<Json<TaskPatch>, JsonRejection>,
) -> Result<Json<Task>, ApiError> {
    let Json(patch) = body?;
    let task = state.store.update(&TaskId::from(id), &patch).await?;
    Ok(Json(task))
}

async fn delete_task(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.store.delete(&TaskId::from(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_comment(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
    body: Result<Json<NewComment>, JsonRejection>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    let Json(req) = body?;
    let comment = state.store.add_comment(&TaskId::from(id), &req.text).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

async fn dashboard(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<OwnerQuery>,
) -> Json<Dashboard> {
    Json(state.store.dashboard(query.owner.as_deref()).await)
}

/// Starts the server on the given address and returns the bound address
/// and a join handle.
///
/// This is the primary entry point used by both `main.rs` and test code.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server(
    addr: &str,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    start_server_with_state(addr, Arc::new(ServerState::new())).await
}

/// Starts the server with a pre-configured [`ServerState`].
///
/// Use [`ServerState::with_config`] to build state from the resolved
/// [`ServerConfig`].
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server_with_state(
    addr: &str,
    state: Arc<ServerState>,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "server error");
        }
    });

    Ok((bound_addr, handle))
}
