//! Filter engine: reduces the task list to what the user should see.
//!
//! [`visible`] is a pure function of the tasks, the current owner, and the
//! [`Criteria`]. It keeps store order and never sorts.

use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::NaiveDate;
use taskboard_proto::task::{Task, TaskStatus};

/// Status criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    /// Every status passes.
    #[default]
    Any,
    /// Only tasks with exactly this status pass.
    Only(TaskStatus),
}

impl StatusFilter {
    /// Returns `true` if `status` passes this filter.
    #[must_use]
    pub fn matches(self, status: TaskStatus) -> bool {
        match self {
            Self::Any => true,
            Self::Only(s) => s == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" | "any" => Ok(Self::Any),
            other => other.parse().map(Self::Only),
        }
    }
}

/// How a multi-tag selection is combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagMatch {
    /// A task passes if it carries at least one selected tag.
    #[default]
    Any,
    /// A task passes only if it carries every selected tag.
    All,
}

impl FromStr for TagMatch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "any" => Ok(Self::Any),
            "all" => Ok(Self::All),
            other => Err(format!("unknown tag match mode: {other}")),
        }
    }
}

/// User-selected filter criteria.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Criteria {
    /// Case-insensitive substring matched against title and description.
    pub text_query: String,
    /// Status criterion.
    pub status: StatusFilter,
    /// Creation date (UTC calendar day).
    pub date: Option<NaiveDate>,
    /// Selected tag ids.
    pub tag_ids: BTreeSet<String>,
    /// How `tag_ids` combine.
    pub tag_match: TagMatch,
}

impl Criteria {
    /// Empty criteria using the given tag match mode.
    #[must_use]
    pub const fn with_tag_match(tag_match: TagMatch) -> Self {
        Self {
            text_query: String::new(),
            status: StatusFilter::Any,
            date: None,
            tag_ids: BTreeSet::new(),
            tag_match,
        }
    }

    /// Selects the tag if unselected, deselects it otherwise.
    ///
    /// Returns `true` if the tag is selected afterwards.
    pub fn toggle_tag(&mut self, tag_id: &str) -> bool {
        if self.tag_ids.remove(tag_id) {
            false
        } else {
            self.tag_ids.insert(tag_id.to_string());
            true
        }
    }

    /// Returns `true` if no criterion restricts the list.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text_query.trim().is_empty()
            && self.status == StatusFilter::Any
            && self.date.is_none()
            && self.tag_ids.is_empty()
    }

    /// Returns `true` if `task` passes every criterion. Ownership is not
    /// checked here.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        let query = self.text_query.trim().to_lowercase();
        self.matches_with_query(task, &query)
    }

    fn matches_with_query(&self, task: &Task, query: &str) -> bool {
        let text_ok = query.is_empty()
            || task.title.to_lowercase().contains(query)
            || task.description.to_lowercase().contains(query);
        let date_ok = self.date.is_none_or(|d| task.created_on() == d);
        let tags_ok = self.tag_ids.is_empty()
            || match self.tag_match {
                TagMatch::Any => self.tag_ids.iter().any(|t| task.has_tag(t)),
                TagMatch::All => self.tag_ids.iter().all(|t| task.has_tag(t)),
            };

        text_ok && self.status.matches(task.status) && date_ok && tags_ok
    }
}

/// Tasks of `owner` that pass `criteria`, in their original order.
#[must_use]
pub fn visible(tasks: &[Task], owner: &str, criteria: &Criteria) -> Vec<Task> {
    let query = criteria.text_query.trim().to_lowercase();
    tasks
        .iter()
        .filter(|t| t.owner == owner && criteria.matches_with_query(t, &query))
        .cloned()
        .collect()
}
