//! Plain-text rendering of tasks, dashboards, and tags.
//!
//! Every function returns a `String` and has no side effects.

use std::fmt::Write as _;

use taskboard_proto::catalog::TagCatalog;
use taskboard_proto::dashboard::Dashboard;
use taskboard_proto::task::{Task, TaskStatus};

use crate::filter::{Criteria, StatusFilter, TagMatch};

/// Number of trailing id characters shown in lists.
pub const SHORT_ID_LEN: usize = 8;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Checkbox-style marker for a status.
#[must_use]
pub const fn status_marker(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Pending => "[ ]",
        TaskStatus::InProgress => "[~]",
        TaskStatus::Completed => "[x]",
    }
}

/// Last [`SHORT_ID_LEN`] characters of an id.
#[must_use]
pub fn short_id(id: &str) -> &str {
    let start = id
        .char_indices()
        .rev()
        .nth(SHORT_ID_LEN - 1)
        .map_or(0, |(i, _)| i);
    &id[start..]
}

fn tag_labels(tags: &[String], catalog: &TagCatalog) -> String {
    tags.iter()
        .map(|t| format!("#{}", catalog.label_for(t)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// One line per task: short id, status, title, tags.
#[must_use]
pub fn task_line(task: &Task, catalog: &TagCatalog) -> String {
    let mut line = format!(
        "{:<width$}  {} {}",
        short_id(task.id.as_str()),
        status_marker(task.status),
        task.title,
        width = SHORT_ID_LEN
    );
    if !task.tags.is_empty() {
        line.push_str("  ");
        line.push_str(&tag_labels(&task.tags, catalog));
    }
    if !task.comments.is_empty() {
        let _ = write!(line, "  ({} comments)", task.comments.len());
    }
    line
}

/// A task list, or a placeholder when empty.
#[must_use]
pub fn task_list(tasks: &[Task], catalog: &TagCatalog) -> String {
    if tasks.is_empty() {
        return "No tasks.".to_string();
    }
    tasks
        .iter()
        .map(|t| task_line(t, catalog))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Full details of one task including its comments.
#[must_use]
pub fn task_detail(task: &Task, catalog: &TagCatalog) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {}", status_marker(task.status), task.title);
    let _ = writeln!(out, "  id:      {}", task.id);
    let _ = writeln!(out, "  status:  {}", task.status);
    let _ = writeln!(
        out,
        "  created: {}",
        task.creation_date.format(DATE_FORMAT)
    );
    if let Some(done) = task.completed_at {
        let _ = writeln!(out, "  done:    {}", done.format(DATE_FORMAT));
    }
    if !task.tags.is_empty() {
        let _ = writeln!(out, "  tags:    {}", tag_labels(&task.tags, catalog));
    }
    if !task.description.is_empty() {
        let _ = writeln!(out, "\n  {}", task.description);
    }
    if !task.comments.is_empty() {
        let _ = writeln!(out, "\n  Comments:");
        for comment in &task.comments {
            let _ = writeln!(
                out,
                "    {}  {}",
                comment.date.format(DATE_FORMAT),
                comment.text
            );
        }
    }
    out.trim_end().to_string()
}

/// Dashboard summary for `owner`.
#[must_use]
pub fn dashboard(owner: &str, d: &Dashboard) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Dashboard for {owner} ({} tasks)", d.status.total());
    let _ = writeln!(
        out,
        "  Pending: {}   In progress: {}   Completed: {}",
        d.status.pending, d.status.in_progress, d.status.completed
    );
    let _ = writeln!(
        out,
        "  Mean completion time: {:.2} days",
        d.mean_completion_time
    );
    let _ = writeln!(
        out,
        "  Weekly completion rate: {:.2} tasks/day",
        d.weekly_completion_rate
    );
    if !d.by_day.is_empty() {
        let _ = writeln!(out, "  Completed per day:");
        for day in &d.by_day {
            let _ = writeln!(out, "    {}  {}", day.date, day.count);
        }
    }
    if !d.top_tags.is_empty() {
        let _ = writeln!(out, "  Top tags:");
        for tag in &d.top_tags {
            let _ = writeln!(out, "    {:<12}{}", tag.label, tag.count);
        }
    }
    out.trim_end().to_string()
}

/// The tag catalog, one tag per line.
#[must_use]
pub fn tags(catalog: &TagCatalog) -> String {
    if catalog.is_empty() {
        return "No tags configured.".to_string();
    }
    catalog
        .iter()
        .map(|t| format!("{:<12}{:<12}{}", t.id, t.label, t.color))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One-line description of the active filter.
#[must_use]
pub fn criteria(criteria: &Criteria, catalog: &TagCatalog) -> String {
    if criteria.is_empty() {
        return "Filter: none".to_string();
    }
    let mut parts = Vec::new();
    let query = criteria.text_query.trim();
    if !query.is_empty() {
        parts.push(format!("text \"{query}\""));
    }
    if let StatusFilter::Only(status) = criteria.status {
        parts.push(format!("status {status}"));
    }
    if let Some(date) = criteria.date {
        parts.push(format!("created {date}"));
    }
    if !criteria.tag_ids.is_empty() {
        let mode = match criteria.tag_match {
            TagMatch::Any => "any",
            TagMatch::All => "all",
        };
        let ids: Vec<String> = criteria.tag_ids.iter().cloned().collect();
        parts.push(format!("{mode} of {}", tag_labels(&ids, catalog)));
    }
    format!("Filter: {}", parts.join(", "))
}
