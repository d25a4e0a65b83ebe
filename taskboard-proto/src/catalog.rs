//! Tag catalog.
//!
//! Tasks reference tags by id. A [`TagCatalog`] is passed by value to
//! whatever needs to validate or display tags, so tests and deployments can
//! supply their own set.

use serde::{Deserialize, Serialize};

use crate::task::ValidationError;

/// A labeled, colored category attached to tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Stable key referenced by tasks.
    pub id: String,
    /// Display name.
    pub label: String,
    /// Display color (CSS color string).
    pub color: String,
}

impl Tag {
    /// Creates a tag.
    pub fn new(id: impl Into<String>, label: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            color: color.into(),
        }
    }
}

/// Errors raised when building a catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// A tag has an empty id.
    #[error("tag id cannot be empty")]
    EmptyId,
    /// Two tags share the same id.
    #[error("duplicate tag id: {0}")]
    DuplicateId(String),
}

/// An ordered set of tags with unique ids.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagCatalog {
    tags: Vec<Tag>,
}

impl TagCatalog {
    /// Builds a catalog, preserving the given order.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] on an empty or duplicated id.
    pub fn new(tags: Vec<Tag>) -> Result<Self, CatalogError> {
        for (i, tag) in tags.iter().enumerate() {
            if tag.id.trim().is_empty() {
                return Err(CatalogError::EmptyId);
            }
            if tags[..i].iter().any(|t| t.id == tag.id) {
                return Err(CatalogError::DuplicateId(tag.id.clone()));
            }
        }
        Ok(Self { tags })
    }

    /// The predefined catalog used when no tags are configured.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            tags: vec![
                Tag::new("work", "Work", "#3B82F6"),
                Tag::new("personal", "Personal", "#10B981"),
                Tag::new("urgent", "Urgent", "#EC4899"),
                Tag::new("study", "Study", "#FACC15"),
                Tag::new("health", "Health", "#9333EA"),
            ],
        }
    }

    /// Looks up a tag by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.id == id)
    }

    /// Returns `true` if the catalog has a tag with this id.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Display label for a tag id, falling back to the id itself.
    #[must_use]
    pub fn label_for<'a>(&'a self, id: &'a str) -> &'a str {
        self.get(id).map_or(id, |t| t.label.as_str())
    }

    /// Checks that every id is in the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownTag`] for the first unknown id.
    pub fn validate_ids(&self, ids: &[String]) -> Result<(), ValidationError> {
        match ids.iter().find(|id| !self.contains(id)) {
            Some(unknown) => Err(ValidationError::UnknownTag(unknown.clone())),
            None => Ok(()),
        }
    }

    /// Iterates over tags in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.tags.iter()
    }

    /// Number of tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Returns `true` if the catalog has no tags.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
