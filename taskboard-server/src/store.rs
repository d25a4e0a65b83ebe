//! Shared, thread-safe task store for the server.
//!
//! The [`TaskStore`] wraps a [`TaskRepository`] in an async [`RwLock`] so
//! request handlers can read concurrently and mutate one at a time. Each
//! mutation runs to completion under the write lock.

use chrono::Utc;
use taskboard_proto::catalog::TagCatalog;
use taskboard_proto::dashboard::Dashboard;
use taskboard_proto::repo::{RepoError, TaskRepository};
use taskboard_proto::task::{Comment, Task, TaskId};
use taskboard_proto::wire::{NewTask, TaskPatch};
use tokio::sync::RwLock;

/// In-memory task store shared by all request handlers.
pub struct TaskStore {
    repo: RwLock<TaskRepository>,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore {
    /// Creates an empty store with the built-in catalog and default limits.
    #[must_use]
    pub fn new() -> Self {
        Self {
            repo: RwLock::new(TaskRepository::default()),
        }
    }

    /// Creates an empty store with a custom catalog and title limit.
    #[must_use]
    pub fn with_config(catalog: TagCatalog, max_title_length: usize) -> Self {
        Self {
            repo: RwLock::new(TaskRepository::new(catalog, max_title_length)),
        }
    }

    /// Returns the owner's tasks (all tasks for `None`) in insertion order.
    pub async fn list(&self, owner: Option<&str>) -> Vec<Task> {
        self.repo.read().await.list(owner)
    }

    /// Creates a task.
    ///
    /// # Errors
    ///
    /// Returns [`RepoError::Invalid`] if the request fails validation.
    pub async fn create(&self, req: NewTask) -> Result<Task, RepoError> {
        let task = self.repo.write().await.create(req, Utc::now())?;
        tracing::info!(task_id = %task.id, owner = %task.owner, "task created");
        Ok(task)
    }

    /// Applies a partial update.
    ///
    /// # Errors
    ///
    /// Returns [`RepoError::Invalid`] or [`RepoError::NotFound`].
    pub async fn update(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task, RepoError> {
        let task = self.repo.write().await.update(id, patch, Utc::now())?;
        tracing::info!(task_id = %id, status = %task.status, "task updated");
        Ok(task)
    }

    /// Deletes a task.
    ///
    /// # Errors
    ///
    /// Returns [`RepoError::NotFound`] if no task has this id.
    pub async fn delete(&self, id: &TaskId) -> Result<Task, RepoError> {
        let task = self.repo.write().await.delete(id)?;
        tracing::info!(task_id = %id, "task deleted");
        Ok(task)
    }

    /// Appends a comment to a task.
    ///
    /// # Errors
    ///
    /// Returns [`RepoError::Invalid`] for blank text or [`RepoError::NotFound`].
    pub async fn add_comment(&self, id: &TaskId, text: &str) -> Result<Comment, RepoError> {
        let comment = self.repo.write().await.add_comment(id, text, Utc::now())?;
        tracing::debug!(task_id = %id, "comment added");
        Ok(comment)
    }

    /// Computes the dashboard for an owner (all tasks for `None`).
    pub async fn dashboard(&self, owner: Option<&str>) -> Dashboard {
        self.repo.read().await.dashboard(owner, Utc::now())
    }

    /// Total number of stored tasks.
    pub async fn len(&self) -> usize {
        self.repo.read().await.len()
    }
}
