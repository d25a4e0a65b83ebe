//! In-memory task repository.
//!
//! Holds the authoritative task list for a service: the server wraps it in an
//! async lock, and the client's local-only service wraps it in a mutex. All
//! validation and patch semantics of the REST endpoints live here. Callers
//! pass the current time in so behavior is deterministic under test.

use chrono::{DateTime, Utc};

use crate::catalog::TagCatalog;
use crate::dashboard::{self, Dashboard};
use crate::task::{Comment, MAX_TASK_TITLE_LENGTH, Task, TaskId, ValidationError};
use crate::wire::{NewTask, TaskPatch};

/// Errors returned by repository operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepoError {
    /// The request failed validation.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    /// No task has the given id.
    #[error("task not found: {0}")]
    NotFound(TaskId),
}

/// Task list in insertion order, plus the rules for changing it.
#[derive(Debug, Clone)]
pub struct TaskRepository {
    tasks: Vec<Task>,
    catalog: TagCatalog,
    max_title_length: usize,
}

impl Default for TaskRepository {
    fn default() -> Self {
        Self::new(TagCatalog::builtin(), MAX_TASK_TITLE_LENGTH)
    }
}

impl TaskRepository {
    /// Creates an empty repository.
    #[must_use]
    pub const fn new(catalog: TagCatalog, max_title_length: usize) -> Self {
        Self {
            tasks: Vec::new(),
            catalog,
            max_title_length,
        }
    }

    /// The catalog tag ids are validated against.
    #[must_use]
    pub const fn catalog(&self) -> &TagCatalog {
        &self.catalog
    }

    /// Tasks of `owner` (all tasks for `None`), in insertion order.
    #[must_use]
    pub fn list(&self, owner: Option<&str>) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|t| owner.is_none_or(|o| t.owner == o))
            .cloned()
            .collect()
    }

    /// Looks up a task.
    #[must_use]
    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    /// Validates and stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`RepoError::Invalid`] if the request fails validation.
    pub fn create(&mut self, req: NewTask, now: DateTime<Utc>) -> Result<Task, RepoError> {
        req.validate(self.max_title_length, &self.catalog)?;
        let task = req.into_task(now);
        self.tasks.push(task.clone());
        Ok(task)
    }

    /// Applies a partial update, returning the updated task.
    ///
    /// # Errors
    ///
    /// Returns [`RepoError::Invalid`] or [`RepoError::NotFound`].
    pub fn update(
        &mut self,
        id: &TaskId,
        patch: &TaskPatch,
        now: DateTime<Utc>,
    ) -> Result<Task, RepoError> {
        patch.validate(self.max_title_length, &self.catalog)?;
        let task = self.get_mut(id)?;
        task.apply_patch(patch, now);
        Ok(task.clone())
    }

    /// Removes a task, returning it.
    ///
    /// # Errors
    ///
    /// Returns [`RepoError::NotFound`] if no task has this id.
    pub fn delete(&mut self, id: &TaskId) -> Result<Task, RepoError> {
        let pos = self
            .tasks
            .iter()
            .position(|t| &t.id == id)
            .ok_or_else(|| RepoError::NotFound(id.clone()))?;
        Ok(self.tasks.remove(pos))
    }

    /// Appends a comment, returning the stored comment.
    ///
    /// # Errors
    ///
    /// Returns [`RepoError::Invalid`] for blank text or
    /// [`RepoError::NotFound`].
    pub fn add_comment(
        &mut self,
        id: &TaskId,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<Comment, RepoError> {
        let comment = Comment::new(text, now)?;
        let task = self.get_mut(id)?;
        task.comments.push(comment.clone());
        Ok(comment)
    }

    /// Dashboard over the tasks of `owner` (all tasks for `None`).
    #[must_use]
    pub fn dashboard(&self, owner: Option<&str>, now: DateTime<Utc>) -> Dashboard {
        dashboard::aggregate(
            self.tasks
                .iter()
                .filter(|t| owner.is_none_or(|o| t.owner == o)),
            &self.catalog,
            now,
        )
    }

    /// Total number of tasks across all owners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns `true` if no tasks are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    fn get_mut(&mut self, id: &TaskId) -> Result<&mut Task, RepoError> {
        self.tasks
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| RepoError::NotFound(id.clone()))
    }
}
