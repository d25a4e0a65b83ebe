//! Remote task service abstraction.
//!
//! Defines the [`TaskService`] trait the task store talks to. Concrete
//! implementations:
//! - [`http::HttpService`]: JSON client for the `taskboard-server` REST API
//! - [`local::LocalService`]: in-process repository for offline use and tests

pub mod http;
pub mod local;

use taskboard_proto::dashboard::Dashboard;
use taskboard_proto::task::{Comment, Task, TaskId, ValidationError};
use taskboard_proto::wire::{NewComment, NewTask, TaskPatch};

/// Errors returned by a [`TaskService`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// The request never produced a response (connection refused, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("service returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body.
        message: String,
    },

    /// The service has no task with this id.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The response body could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The request was rejected by validation.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

impl From<reqwest::Error> for ServiceError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Self::Decode(value.to_string())
        } else {
            Self::Transport(value.to_string())
        }
    }
}

/// Async request/response interface to wherever tasks are stored.
///
/// Every call is a single round trip. Implementations never retry, and a
/// returned error means the remote state is unchanged.
pub trait TaskService: Send + Sync {
    /// Lists the tasks belonging to `owner`.
    fn list(
        &self,
        owner: &str,
    ) -> impl std::future::Future<Output = Result<Vec<Task>, ServiceError>> + Send;

    /// Creates a task and returns it with its assigned id and defaults.
    fn create(
        &self,
        req: &NewTask,
    ) -> impl std::future::Future<Output = Result<Task, ServiceError>> + Send;

    /// Applies a partial update and returns the updated task.
    fn update(
        &self,
        id: &TaskId,
        patch: &TaskPatch,
    ) -> impl std::future::Future<Output = Result<Task, ServiceError>> + Send;

    /// Deletes a task.
    fn delete(&self, id: &TaskId)
    -> impl std::future::Future<Output = Result<(), ServiceError>> + Send;

    /// Appends a comment and returns the stored comment.
    fn add_comment(
        &self,
        id: &TaskId,
        req: &NewComment,
    ) -> impl std::future::Future<Output = Result<Comment, ServiceError>> + Send;

    /// Fetches the dashboard for `owner`.
    fn dashboard(
        &self,
        owner: &str,
    ) -> impl std::future::Future<Output = Result<Dashboard, ServiceError>> + Send;
}
