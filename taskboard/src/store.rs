//! Client-side task store.
//!
//! [`TaskStore`] keeps a local mirror of the current owner's tasks and
//! synchronizes it with a [`TaskService`]. Every mutation is a single round
//! trip and is committed to the mirror only after the service confirms it.
//! A failed call leaves the mirror exactly as it was.
//!
//! # Concurrency
//!
//! All methods take `&self`. Mutations on the same task id are serialized
//! through a per-id async lock; mutations on different ids run
//! independently. The mirror lock is only taken for short synchronous
//! sections and never held across an `.await`.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use taskboard_proto::catalog::TagCatalog;
use taskboard_proto::dashboard::Dashboard;
use taskboard_proto::task::{
    Comment, MAX_TASK_TITLE_LENGTH, StatusModel, Task, TaskId, ValidationError, dedup_tags,
    validate_comment, validate_title,
};
use taskboard_proto::wire::{NewComment, NewTask, TaskPatch};
use tokio::sync::OwnedMutexGuard;

use crate::filter::{self, Criteria};
use crate::service::{ServiceError, TaskService};

/// Errors returned by [`TaskStore`] operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Input was rejected locally; no request was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The id is not in the local mirror; no request was sent.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The service call failed; the mirror is unchanged.
    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Settings that shape store behavior.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Tags that task tag ids are validated against.
    pub catalog: TagCatalog,
    /// How `toggle_status` advances a task.
    pub status_model: StatusModel,
    /// Maximum accepted title length in characters.
    pub max_title_length: usize,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            catalog: TagCatalog::builtin(),
            status_model: StatusModel::default(),
            max_title_length: MAX_TASK_TITLE_LENGTH,
        }
    }
}

/// Local mirror of one owner's tasks, backed by a [`TaskService`].
pub struct TaskStore<S> {
    service: S,
    options: StoreOptions,
    owner: RwLock<String>,
    tasks: RwLock<Vec<Task>>,
    /// Per-task mutation locks.
    locks: Mutex<HashMap<TaskId, Arc<tokio::sync::Mutex<()>>>>,
}

impl<S: TaskService> TaskStore<S> {
    /// Creates an empty store for `owner`. Call [`TaskStore::load_all`] to
    /// populate it.
    pub fn new(service: S, owner: impl Into<String>, options: StoreOptions) -> Self {
        Self {
            service,
            options,
            owner: RwLock::new(owner.into()),
            tasks: RwLock::new(Vec::new()),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// The underlying service.
    pub const fn service(&self) -> &S {
        &self.service
    }

    /// The tag catalog in use.
    pub const fn catalog(&self) -> &TagCatalog {
        &self.options.catalog
    }

    /// The current owner.
    pub fn owner(&self) -> String {
        self.owner.read().clone()
    }

    /// Snapshot of the mirror, in service order.
    pub fn tasks(&self) -> Vec<Task> {
        self.tasks.read().clone()
    }

    /// Looks up a task in the mirror.
    pub fn get(&self, id: &TaskId) -> Option<Task> {
        self.tasks.read().iter().find(|t| &t.id == id).cloned()
    }

    /// Number of mirrored tasks.
    pub fn len(&self) -> usize {
        self.tasks.read().len()
    }

    /// Returns `true` if the mirror is empty.
    pub fn is_empty(&self) -> bool {
        self.tasks.read().is_empty()
    }

    /// The current owner's tasks that pass `criteria`.
    pub fn visible(&self, criteria: &Criteria) -> Vec<Task> {
        let owner = self.owner.read();
        filter::visible(&self.tasks.read(), &owner, criteria)
    }

    /// Replaces the mirror with the owner's tasks from the service.
    ///
    /// On failure the mirror is left untouched. If the owner changes while
    /// the request is in flight the result is discarded.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Service`] if the list request fails.
    pub async fn load_all(&self) -> Result<(), StoreError> {
        let owner = self.owner();
        let mut tasks = self.service.list(&owner).await.inspect_err(|e| {
            tracing::warn!(owner = %owner, error = %e, "failed to load tasks");
        })?;
        tasks.retain(|t| t.owner == owner);
        let count = tasks.len();

        let replaced = self.commit(&owner, |mirror| *mirror = tasks);
        if replaced.is_some() {
            self.prune_locks();
            tracing::debug!(owner = %owner, count, "tasks loaded");
        } else {
            tracing::debug!(owner = %owner, "owner changed during load, result discarded");
        }
        Ok(())
    }

    /// Switches to another owner and reloads.
    ///
    /// The mirror is cleared before the reload, so a failed reload leaves it
    /// empty rather than showing the previous owner's tasks.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyOwner`] for a blank owner, or
    /// [`StoreError::Service`] if the reload fails.
    pub async fn set_owner(&self, owner: &str) -> Result<(), StoreError> {
        let owner = owner.trim();
        if owner.is_empty() {
            return Err(ValidationError::EmptyOwner.into());
        }
        {
            let mut current = self.owner.write();
            *current = owner.to_string();
            self.tasks.write().clear();
        }
        self.prune_locks();
        tracing::info!(owner, "owner switched");
        self.load_all().await
    }

    /// Creates a task for the current owner.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] for a blank or overlong title or an
    /// unknown tag id, or [`StoreError::Service`] if creation fails.
    pub async fn add(
        &self,
        title: &str,
        description: &str,
        tags: &[String],
    ) -> Result<Task, StoreError> {
        let title = validate_title(title, self.options.max_title_length)?;
        self.options.catalog.validate_ids(tags)?;
        let owner = self.owner();

        let req = NewTask {
            title,
            description: description.to_string(),
            tags: dedup_tags(tags),
            owner: owner.clone(),
        };
        let task = self.service.create(&req).await.inspect_err(|e| {
            tracing::warn!(owner = %owner, error = %e, "failed to create task");
        })?;

        if task.owner == owner {
            let created = task.clone();
            self.commit(&owner, |mirror| mirror.push(created));
        }
        tracing::info!(task_id = %task.id, "task added");
        Ok(task)
    }

    /// Deletes a task.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the id is not mirrored, or
    /// [`StoreError::Service`] if deletion fails.
    pub async fn remove(&self, id: &TaskId) -> Result<(), StoreError> {
        let _guard = self.acquire(id).await?;
        let owner = self.owner();

        self.service.delete(id).await.inspect_err(|e| {
            tracing::warn!(task_id = %id, error = %e, "failed to delete task");
        })?;

        self.commit(&owner, |mirror| mirror.retain(|t| &t.id != id));
        self.locks.lock().remove(id);
        tracing::info!(task_id = %id, "task removed");
        Ok(())
    }

    /// Replaces a task's title, description, and tags.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`], [`StoreError::NotFound`], or
    /// [`StoreError::Service`].
    pub async fn edit(
        &self,
        id: &TaskId,
        title: &str,
        description: &str,
        tags: &[String],
    ) -> Result<Task, StoreError> {
        let title = validate_title(title, self.options.max_title_length)?;
        self.options.catalog.validate_ids(tags)?;
        let _guard = self.acquire(id).await?;
        let owner = self.owner();

        let patch = TaskPatch::details(title, description.to_string(), dedup_tags(tags));
        let updated = self.service.update(id, &patch).await.inspect_err(|e| {
            tracing::warn!(task_id = %id, error = %e, "failed to edit task");
        })?;

        self.commit(&owner, |mirror| {
            if let Some(task) = mirror.iter_mut().find(|t| &t.id == id) {
                task.title.clone_from(&updated.title);
                task.description.clone_from(&updated.description);
                task.tags.clone_from(&updated.tags);
            }
        });
        tracing::info!(task_id = %id, "task edited");
        Ok(updated)
    }

    /// Advances a task one step through the configured status model.
    ///
    /// The mirror takes the status the service confirms, which may differ
    /// from the one requested.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] or [`StoreError::Service`].
    pub async fn toggle_status(&self, id: &TaskId) -> Result<Task, StoreError> {
        let _guard = self.acquire(id).await?;
        let owner = self.owner();
        let current = self
            .get(id)
            .map(|t| t.status)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        let next = current.next(self.options.status_model);

        let updated = self
            .service
            .update(id, &TaskPatch::status(next))
            .await
            .inspect_err(|e| {
                tracing::warn!(task_id = %id, error = %e, "failed to toggle task status");
            })?;
        if updated.status != next {
            tracing::debug!(
                task_id = %id,
                requested = %next,
                confirmed = %updated.status,
                "service confirmed a different status"
            );
        }

        self.commit(&owner, |mirror| {
            if let Some(task) = mirror.iter_mut().find(|t| &t.id == id) {
                task.status = updated.status;
                task.completed_at = updated.completed_at;
            }
        });
        tracing::info!(task_id = %id, status = %updated.status, "task status toggled");
        Ok(updated)
    }

    /// Appends a comment to a task.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] for blank text (no request is
    /// sent), [`StoreError::NotFound`], or [`StoreError::Service`].
    pub async fn add_comment(&self, id: &TaskId, text: &str) -> Result<Comment, StoreError> {
        let text = validate_comment(text)?;
        let _guard = self.acquire(id).await?;
        let owner = self.owner();

        let comment = self
            .service
            .add_comment(id, &NewComment { text })
            .await
            .inspect_err(|e| {
                tracing::warn!(task_id = %id, error = %e, "failed to add comment");
            })?;

        let stored = comment.clone();
        self.commit(&owner, |mirror| {
            if let Some(task) = mirror.iter_mut().find(|t| &t.id == id) {
                task.comments.push(stored);
            }
        });
        tracing::debug!(task_id = %id, "comment added");
        Ok(comment)
    }

    /// Fetches the current owner's dashboard.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Service`] if the request fails.
    pub async fn dashboard(&self) -> Result<Dashboard, StoreError> {
        let owner = self.owner();
        Ok(self.service.dashboard(&owner).await.inspect_err(|e| {
            tracing::warn!(owner = %owner, error = %e, "failed to load dashboard");
        })?)
    }

    /// Takes the mutation lock for `id`, failing fast if the id is unknown.
    async fn acquire(&self, id: &TaskId) -> Result<OwnedMutexGuard<()>, StoreError> {
        self.ensure_known(id)?;
        let lock = Arc::clone(self.locks.lock().entry(id.clone()).or_default());
        let guard = lock.lock_owned().await;
        // The task may have been removed while we waited.
        self.ensure_known(id)?;
        Ok(guard)
    }

    /// Drops lock entries for tasks that are no longer mirrored.
    ///
    /// An entry whose lock is still shared with an in-flight call is kept.
    fn prune_locks(&self) {
        let tasks = self.tasks.read();
        let mut locks = self.locks.lock();
        let before = locks.len();
        locks.retain(|id, lock| Arc::strong_count(lock) > 1 || tasks.iter().any(|t| &t.id == id));
        if locks.len() < before {
            tracing::trace!(dropped = before - locks.len(), "pruned task locks");
        }
    }

    fn ensure_known(&self, id: &TaskId) -> Result<(), StoreError> {
        if self.tasks.read().iter().any(|t| &t.id == id) {
            Ok(())
        } else {
            Err(StoreError::NotFound(id.clone()))
        }
    }

    /// Runs `f` on the mirror if `owner` is still current.
    ///
    /// Returns `None` (and does nothing) if the owner changed.
    fn commit<R>(&self, owner: &str, f: impl FnOnce(&mut Vec<Task>) -> R) -> Option<R> {
        let current = self.owner.read();
        if *current != owner {
            return None;
        }
        let result = f(&mut *self.tasks.write());
        drop(current);
        Some(result)
    }
}
