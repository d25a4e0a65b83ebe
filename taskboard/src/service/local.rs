//! In-process [`TaskService`] for offline use and testing.
//!
//! Wraps a [`TaskRepository`] behind a mutex, so it applies exactly the same
//! validation and patch rules as the server. Every call completes
//! immediately.

use chrono::Utc;
use parking_lot::Mutex;
use taskboard_proto::catalog::TagCatalog;
use taskboard_proto::dashboard::Dashboard;
use taskboard_proto::repo::{RepoError, TaskRepository};
use taskboard_proto::task::{Comment, Task, TaskId};
use taskboard_proto::wire::{NewComment, NewTask, TaskPatch};

use super::{ServiceError, TaskService};

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Invalid(e) => Self::Invalid(e),
            RepoError::NotFound(id) => Self::NotFound(id),
        }
    }
}

/// In-memory task service shared by all owners.
#[derive(Debug, Default)]
pub struct LocalService {
    repo: Mutex<TaskRepository>,
}

impl LocalService {
    /// Creates an empty service with the built-in catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty service with a custom catalog and title limit.
    #[must_use]
    pub fn with_config(catalog: TagCatalog, max_title_length: usize) -> Self {
        Self {
            repo: Mutex::new(TaskRepository::new(catalog, max_title_length)),
        }
    }

    /// Total number of tasks across all owners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.repo.lock().len()
    }

    /// Returns `true` if no tasks are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.repo.lock().is_empty()
    }
}

impl TaskService for LocalService {
    async fn list(&self, owner: &str) -> Result<Vec<Task>, ServiceError> {
        Ok(self.repo.lock().list(Some(owner)))
    }

    async fn create(&self, req: &NewTask) -> Result<Task, ServiceError> {
        Ok(self.repo.lock().create(req.clone(), Utc::now())?)
    }

    async fn update(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task, ServiceError> {
        Ok(self.repo.lock().update(id, patch, Utc::now())?)
    }

    async fn delete(&self, id: &TaskId) -> Result<(), ServiceError> {
        self.repo.lock().delete(id)?;
        Ok(())
    }

    async fn add_comment(&self, id: &TaskId, req: &NewComment) -> Result<Comment, ServiceError> {
        Ok(self.repo.lock().add_comment(id, &req.text, Utc::now())?)
    }

    async fn dashboard(&self, owner: &str) -> Result<Dashboard, ServiceError> {
        Ok(self.repo.lock().dashboard(Some(owner), Utc::now()))
    }
}
