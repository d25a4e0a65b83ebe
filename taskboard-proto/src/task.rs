//! Task model: identifiers, status transitions, comments, and validation.
//!
//! Records arriving from the other side of the wire may omit optional
//! fields. Missing `description`, `tags`, and `comments` default to empty,
//! a missing `status` defaults to [`TaskStatus::Pending`], and a missing
//! `creationDate` defaults to the time of decoding.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::wire::TaskPatch;

/// Maximum allowed task title length in characters.
pub const MAX_TASK_TITLE_LENGTH: usize = 256;

/// Errors raised by client- or server-side validation before a change is
/// accepted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Task title is empty or whitespace only.
    #[error("task title cannot be empty")]
    EmptyTitle,
    /// Task title exceeds the configured maximum.
    #[error("task title too long (max {max} characters)")]
    TitleTooLong {
        /// Configured maximum in characters.
        max: usize,
    },
    /// Comment text is empty or whitespace only.
    #[error("comment text cannot be empty")]
    EmptyComment,
    /// A tag id is not part of the catalog.
    #[error("unknown tag: {0}")]
    UnknownTag(String),
    /// Owner identifier is empty.
    #[error("task owner cannot be empty")]
    EmptyOwner,
}

/// Server-assigned task identifier.
///
/// New identifiers are UUID v7 strings so that they sort by creation time,
/// but any non-empty string received from the service is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Creates a new time-ordered task identifier (UUID v7).
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How the toggle action advances a task's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusModel {
    /// Three-state cycle: pending, in-progress, completed, back to pending.
    #[default]
    Cycle,
    /// Two-state flip between pending and completed.
    Binary,
}

impl FromStr for StatusModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cycle" => Ok(Self::Cycle),
            "binary" => Ok(Self::Binary),
            other => Err(format!("unknown status model: {other}")),
        }
    }
}

/// Status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Task is open and not started.
    #[default]
    Pending,
    /// Task is actively being worked on.
    InProgress,
    /// Task has been completed.
    Completed,
}

impl TaskStatus {
    /// All statuses in cycle order.
    pub const ALL: [Self; 3] = [Self::Pending, Self::InProgress, Self::Completed];

    /// Returns the status one toggle step after `self` under `model`.
    ///
    /// Under [`StatusModel::Binary`] an in-progress task (which can only
    /// arrive through a direct edit) advances to completed.
    #[must_use]
    pub const fn next(self, model: StatusModel) -> Self {
        match (model, self) {
            (StatusModel::Cycle, Self::Pending) => Self::InProgress,
            (StatusModel::Cycle, Self::InProgress)
            | (StatusModel::Binary, Self::Pending | Self::InProgress) => Self::Completed,
            (_, Self::Completed) => Self::Pending,
        }
    }

    /// Returns `true` for [`TaskStatus::Completed`].
    #[must_use]
    pub const fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::InProgress => write!(f, "in-progress"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "in-progress" | "in_progress" | "inprogress" => Ok(Self::InProgress),
            "completed" | "done" => Ok(Self::Completed),
            other => Err(format!("unknown status: {other}")),
        }
    }
}

/// An immutable comment attached to a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Comment body, never empty after trimming.
    pub text: String,
    /// When the comment was created.
    pub date: DateTime<Utc>,
}

impl Comment {
    /// Creates a comment from raw user input, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyComment`] if `text` is blank.
    pub fn new(text: &str, date: DateTime<Utc>) -> Result<Self, ValidationError> {
        Ok(Self {
            text: validate_comment(text)?,
            date,
        })
    }
}

/// A user-owned task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Server-assigned identifier.
    pub id: TaskId,
    /// Short title, never empty.
    pub title: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Current status.
    #[serde(default)]
    pub status: TaskStatus,
    /// When the task was created.
    #[serde(default = "chrono::Utc::now")]
    pub creation_date: DateTime<Utc>,
    /// When the task last entered [`TaskStatus::Completed`], if it is completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Tag ids, resolved against a [`crate::TagCatalog`] for display.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Comments in creation order.
    #[serde(default)]
    pub comments: Vec<Comment>,
    /// Identifier of the owning user.
    #[serde(default)]
    pub owner: String,
}

impl Task {
    /// Returns `true` if the task carries the given tag id.
    #[must_use]
    pub fn has_tag(&self, tag_id: &str) -> bool {
        self.tags.iter().any(|t| t == tag_id)
    }

    /// Calendar date (UTC) on which the task was created.
    #[must_use]
    pub fn created_on(&self) -> NaiveDate {
        self.creation_date.date_naive()
    }

    /// Sets the status, maintaining `completed_at`.
    pub fn set_status(&mut self, status: TaskStatus, now: DateTime<Utc>) {
        if status.is_completed() {
            if !self.status.is_completed() || self.completed_at.is_none() {
                self.completed_at = Some(now);
            }
        } else {
            self.completed_at = None;
        }
        self.status = status;
    }

    /// Applies a validated partial update. Absent fields are left unchanged.
    pub fn apply_patch(&mut self, patch: &TaskPatch, now: DateTime<Utc>) {
        if let Some(title) = &patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(description) = &patch.description {
            self.description.clone_from(description);
        }
        if let Some(tags) = &patch.tags {
            self.tags = dedup_tags(tags);
        }
        if let Some(status) = patch.status {
            self.set_status(status, now);
        }
    }
}

/// Checks a task title, returning the trimmed form.
///
/// # Errors
///
/// Returns [`ValidationError::EmptyTitle`] or [`ValidationError::TitleTooLong`].
pub fn validate_title(title: &str, max_len: usize) -> Result<String, ValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if trimmed.chars().count() > max_len {
        return Err(ValidationError::TitleTooLong { max: max_len });
    }
    Ok(trimmed.to_string())
}

/// Checks comment text, returning the trimmed form.
///
/// # Errors
///
/// Returns [`ValidationError::EmptyComment`] if `text` is blank.
pub fn validate_comment(text: &str) -> Result<String, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyComment);
    }
    Ok(trimmed.to_string())
}

/// Removes repeated tag ids, keeping first-occurrence order.
#[must_use]
pub fn dedup_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        if !out.contains(tag) {
            out.push(tag.clone());
        }
    }
    out
}
