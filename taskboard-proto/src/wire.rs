//! Request and response bodies for the REST endpoints.
//!
//! | method | path | body | response |
//! |---|---|---|---|
//! | `GET` | `/tasks?owner=` | - | `[Task]` |
//! | `POST` | `/tasks` | [`NewTask`] | `201` [`Task`](crate::Task) |
//! | `PATCH` | `/tasks/{id}` | [`TaskPatch`] | [`Task`](crate::Task) |
//! | `DELETE` | `/tasks/{id}` | - | `204` |
//! | `POST` | `/tasks/{id}/comment` | [`NewComment`] | `201` [`Comment`](crate::Comment) |
//! | `GET` | `/dashboard?owner=` | - | [`Dashboard`](crate::Dashboard) |
//!
//! Failures carry an [`ErrorBody`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::TagCatalog;
use crate::task::{Task, TaskId, TaskStatus, ValidationError, dedup_tags, validate_title};

/// Body of `POST /tasks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    /// Task title.
    pub title: String,
    /// Optional description.
    #[serde(default)]
    pub description: String,
    /// Tag ids.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Owning user.
    pub owner: String,
}

impl NewTask {
    /// Checks title, tags, and owner.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self, max_title_len: usize, catalog: &TagCatalog) -> Result<(), ValidationError> {
        validate_title(&self.title, max_title_len)?;
        catalog.validate_ids(&self.tags)?;
        if self.owner.trim().is_empty() {
            return Err(ValidationError::EmptyOwner);
        }
        Ok(())
    }

    /// Builds the stored task: pending, no comments, fresh id.
    ///
    /// Call [`NewTask::validate`] first.
    #[must_use]
    pub fn into_task(self, now: DateTime<Utc>) -> Task {
        Task {
            id: TaskId::new(),
            title: self.title.trim().to_string(),
            description: self.description,
            status: TaskStatus::Pending,
            creation_date: now,
            completed_at: None,
            tags: dedup_tags(&self.tags),
            comments: Vec::new(),
            owner: self.owner,
        }
    }
}

/// Body of `PATCH /tasks/{id}`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    /// New status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    /// New title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Replacement tag ids.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl TaskPatch {
    /// A status-only patch, as sent by the toggle action.
    #[must_use]
    pub const fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            title: None,
            description: None,
            tags: None,
        }
    }

    /// A title/description/tags patch, as sent by the edit action.
    #[must_use]
    pub const fn details(title: String, description: String, tags: Vec<String>) -> Self {
        Self {
            status: None,
            title: Some(title),
            description: Some(description),
            tags: Some(tags),
        }
    }

    /// Checks any present title and tags.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self, max_title_len: usize, catalog: &TagCatalog) -> Result<(), ValidationError> {
        if let Some(title) = &self.title {
            validate_title(title, max_title_len)?;
        }
        if let Some(tags) = &self.tags {
            catalog.validate_ids(tags)?;
        }
        Ok(())
    }
}

/// Body of `POST /tasks/{id}/comment`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComment {
    /// Comment text.
    pub text: String,
}

/// JSON error payload returned with every non-success status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable reason.
    pub error: String,
}
