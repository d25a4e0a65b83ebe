//! Per-owner dashboard record and the server-side aggregation that fills it.
//!
//! Every field defaults on decode, so a client talking to an older or
//! partial service still renders zeros instead of failing.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::TagCatalog;
use crate::task::{Task, TaskStatus};

/// Maximum number of entries in [`Dashboard::top_tags`].
pub const TOP_TAGS_LIMIT: usize = 5;

/// Window used for [`Dashboard::weekly_completion_rate`].
pub const COMPLETION_WINDOW_DAYS: i64 = 7;

/// Number of tasks in each status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatusCounts {
    /// Pending tasks.
    pub pending: u64,
    /// In-progress tasks.
    pub in_progress: u64,
    /// Completed tasks.
    pub completed: u64,
}

impl StatusCounts {
    /// Sum over all statuses.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.pending + self.in_progress + self.completed
    }

    const fn bump(&mut self, status: TaskStatus) {
        match status {
            TaskStatus::Pending => self.pending += 1,
            TaskStatus::InProgress => self.in_progress += 1,
            TaskStatus::Completed => self.completed += 1,
        }
    }
}

/// Tasks completed on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCount {
    /// UTC calendar date.
    pub date: NaiveDate,
    /// Tasks completed that day.
    pub count: u64,
}

/// Usage count of one tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    /// Tag display label.
    pub label: String,
    /// Number of tasks carrying the tag.
    pub count: u64,
}

/// Aggregate metrics for one owner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Dashboard {
    /// Task count per status.
    pub status: StatusCounts,
    /// Completed tasks per completion day, ascending by date.
    pub by_day: Vec<DayCount>,
    /// Most used tags, descending by count.
    pub top_tags: Vec<TagCount>,
    /// Mean days from creation to completion.
    pub mean_completion_time: f64,
    /// Tasks completed per day over the last week.
    pub weekly_completion_rate: f64,
}

/// Computes the dashboard over `tasks` as of `now`.
///
/// The caller is responsible for passing only the owner's tasks.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn aggregate<'a>(
    tasks: impl IntoIterator<Item = &'a Task>,
    catalog: &TagCatalog,
    now: DateTime<Utc>,
) -> Dashboard {
    let mut status = StatusCounts::default();
    let mut by_day: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    let mut tag_counts: HashMap<&str, u64> = HashMap::new();
    let mut completion_days_sum = 0.0_f64;
    let mut completion_samples = 0_u64;
    let mut completed_this_week = 0_u64;
    let window_start = now - Duration::days(COMPLETION_WINDOW_DAYS);

    for task in tasks {
        status.bump(task.status);
        for tag in &task.tags {
            *tag_counts.entry(tag.as_str()).or_default() += 1;
        }

        if let (TaskStatus::Completed, Some(done)) = (task.status, task.completed_at) {
            let secs = (done - task.creation_date).num_seconds().max(0);
            completion_days_sum += secs as f64 / 86_400.0;
            completion_samples += 1;
            *by_day.entry(done.date_naive()).or_default() += 1;
            if done > window_start && done <= now {
                completed_this_week += 1;
            }
        }
    }

    let mut top_tags: Vec<TagCount> = tag_counts
        .into_iter()
        .map(|(id, count)| TagCount {
            label: catalog.label_for(id).to_string(),
            count,
        })
        .collect();
    top_tags.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    top_tags.truncate(TOP_TAGS_LIMIT);

    let mean_completion_time = if completion_samples == 0 {
        0.0
    } else {
        round2(completion_days_sum / completion_samples as f64)
    };

    Dashboard {
        status,
        by_day: by_day
            .into_iter()
            .map(|(date, count)| DayCount { date, count })
            .collect(),
        top_tags,
        mean_completion_time,
        weekly_completion_rate: round2(completed_this_week as f64 / COMPLETION_WINDOW_DAYS as f64),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
