//! Application state and command dispatch.
//!
//! [`App`] owns the task store, the active filter, and the last
//! user-visible [`Notice`]. Every user intent goes through here. Failures
//! become notices and never end the session.

use taskboard_proto::dashboard::Dashboard;
use taskboard_proto::task::{Comment, Task, TaskId};

use crate::cli::{Command, EditArgs, ShellCommand, ShellLine};
use crate::filter::{Criteria, TagMatch};
use crate::service::TaskService;
use crate::store::{StoreError, TaskStore};
use crate::view;

/// Severity of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Confirmation of a completed action.
    Info,
    /// An action failed; nothing changed.
    Error,
}

/// A short message for the user about the last action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Message text.
    pub text: String,
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.level {
            NoticeLevel::Info => write!(f, "{}", self.text),
            NoticeLevel::Error => write!(f, "error: {}", self.text),
        }
    }
}

/// What the shell should do after a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    /// Keep reading; print this output (may be empty).
    Continue(String),
    /// Leave the shell.
    Quit,
}

/// Main application state.
pub struct App<S> {
    store: TaskStore<S>,
    criteria: Criteria,
    default_tag_match: TagMatch,
    notice: Option<Notice>,
}

impl<S: TaskService> App<S> {
    /// Creates the app around a store. Filters start empty with the given
    /// tag match mode.
    pub const fn new(store: TaskStore<S>, tag_match: TagMatch) -> Self {
        Self {
            store,
            criteria: Criteria::with_tag_match(tag_match),
            default_tag_match: tag_match,
            notice: None,
        }
    }

    /// The task store.
    pub const fn store(&self) -> &TaskStore<S> {
        &self.store
    }

    /// The active filter.
    pub const fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    /// Mutable access to the active filter.
    pub const fn criteria_mut(&mut self) -> &mut Criteria {
        &mut self.criteria
    }

    /// The last notice, if any.
    pub const fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Takes the last notice, leaving none.
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// Tasks that pass the active filter.
    pub fn visible(&self) -> Vec<Task> {
        self.store.visible(&self.criteria)
    }

    fn info(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice {
            level: NoticeLevel::Info,
            text: text.into(),
        });
    }

    fn error(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice {
            level: NoticeLevel::Error,
            text: text.into(),
        });
    }

    /// Reloads the owner's tasks.
    ///
    /// A failed load is logged by the store and not surfaced; the previous
    /// list stays visible. Returns `true` on success.
    pub async fn refresh(&mut self) -> bool {
        self.store.load_all().await.is_ok()
    }

    /// Switches to another owner, reloads, and resets the filter.
    pub async fn switch_owner(&mut self, owner: &str) -> bool {
        match self.store.set_owner(owner).await {
            Ok(()) | Err(StoreError::Service(_)) => {}
            Err(e) => {
                self.error(format!("could not switch user: {e}"));
                return false;
            }
        }
        self.criteria = Criteria::with_tag_match(self.default_tag_match);
        self.info(format!("now showing tasks of {}", self.store.owner()));
        true
    }

    /// Clears the active filter.
    pub fn clear_filter(&mut self) {
        self.criteria = Criteria::with_tag_match(self.default_tag_match);
        self.info("filter cleared");
    }

    /// Resolves a full id or a unique leading or trailing part of one.
    ///
    /// # Errors
    ///
    /// Returns a message if nothing or more than one task matches.
    pub fn resolve_id(&self, id_ref: &str) -> Result<TaskId, String> {
        self.resolve_task(id_ref).map(|t| t.id)
    }

    /// Like [`App::resolve_id`] but returns the mirrored task.
    fn resolve_task(&self, id_ref: &str) -> Result<Task, String> {
        let id_ref = id_ref.trim();
        if id_ref.is_empty() {
            return Err("task id cannot be empty".to_string());
        }
        let mut tasks = self.store.tasks();
        if let Some(pos) = tasks.iter().position(|t| t.id.as_str() == id_ref) {
            return Ok(tasks.swap_remove(pos));
        }
        let mut matches = tasks.into_iter().filter(|t| {
            let id = t.id.as_str();
            id.starts_with(id_ref) || id.ends_with(id_ref)
        });
        match (matches.next(), matches.next()) {
            (Some(task), None) => Ok(task),
            (None, _) => Err(format!("no task matches {id_ref}")),
            (Some(_), Some(_)) => Err(format!("{id_ref} matches more than one task")),
        }
    }

    fn resolve_or_notice(&mut self, id_ref: &str) -> Option<Task> {
        match self.resolve_task(id_ref) {
            Ok(task) => Some(task),
            Err(message) => {
                self.error(message);
                None
            }
        }
    }

    /// Creates a task.
    pub async fn add(&mut self, title: &str, description: &str, tags: &[String]) -> Option<Task> {
        match self.store.add(title, description, tags).await {
            Ok(task) => {
                self.info(format!(
                    "added {} {}",
                    view::short_id(task.id.as_str()),
                    task.title
                ));
                Some(task)
            }
            Err(e) => {
                self.error(format!("could not add task: {e}"));
                None
            }
        }
    }

    /// Edits a task. Fields left as `None` keep their current value.
    pub async fn edit(
        &mut self,
        id_ref: &str,
        title: Option<&str>,
        description: Option<&str>,
        tags: Option<&[String]>,
    ) -> Option<Task> {
        let current = self.resolve_or_notice(id_ref)?;
        let result = self
            .store
            .edit(
                &current.id,
                title.unwrap_or(current.title.as_str()),
                description.unwrap_or(current.description.as_str()),
                tags.unwrap_or(current.tags.as_slice()),
            )
            .await;
        match result {
            Ok(task) => {
                self.info(format!("updated {}", task.title));
                Some(task)
            }
            Err(e) => {
                self.error(format!("could not edit task: {e}"));
                None
            }
        }
    }

    /// Deletes a task.
    pub async fn remove(&mut self, id_ref: &str) -> bool {
        let Some(id) = self.resolve_or_notice(id_ref).map(|t| t.id) else {
            return false;
        };
        match self.store.remove(&id).await {
            Ok(()) => {
                self.info(format!("removed {}", view::short_id(id.as_str())));
                true
            }
            Err(e) => {
                self.error(format!("could not remove task: {e}"));
                false
            }
        }
    }

    /// Advances a task to its next status.
    pub async fn toggle(&mut self, id_ref: &str) -> Option<Task> {
        let id = self.resolve_or_notice(id_ref)?.id;
        match self.store.toggle_status(&id).await {
            Ok(task) => {
                self.info(format!("{} is now {}", task.title, task.status));
                Some(task)
            }
            Err(e) => {
                self.error(format!("could not change status: {e}"));
                None
            }
        }
    }

    /// Adds a comment to a task.
    pub async fn comment(&mut self, id_ref: &str, text: &str) -> Option<Comment> {
        let id = self.resolve_or_notice(id_ref)?.id;
        match self.store.add_comment(&id, text).await {
            Ok(comment) => {
                self.info("comment added");
                Some(comment)
            }
            Err(e) => {
                self.error(format!("could not add comment: {e}"));
                None
            }
        }
    }

    /// Fetches the owner's dashboard. Missing fields default to zero.
    pub async fn dashboard(&mut self) -> Option<Dashboard> {
        match self.store.dashboard().await {
            Ok(d) => Some(d),
            Err(e) => {
                self.error(format!("could not load dashboard: {e}"));
                None
            }
        }
    }

    /// Runs one task command and returns the text to print.
    ///
    /// Mutations report through [`App::notice`] and return an empty string.
    pub async fn run(&mut self, command: &Command) -> String {
        let catalog = self.store.catalog().clone();
        match command {
            Command::List(args) => {
                let mut criteria = self.criteria.clone();
                args.apply(&mut criteria);
                view::task_list(&self.store.visible(&criteria), &catalog)
            }
            Command::Add {
                title,
                description,
                tags,
            } => {
                self.add(title, description, tags).await;
                String::new()
            }
            Command::Edit(args) => {
                self.run_edit(args).await;
                String::new()
            }
            Command::Remove { id } => {
                self.remove(id).await;
                String::new()
            }
            Command::Toggle { id } => {
                self.toggle(id).await;
                String::new()
            }
            Command::Comment { id, text } => {
                self.comment(id, text).await;
                String::new()
            }
            Command::Show { id } => self
                .resolve_or_notice(id)
                .map(|t| view::task_detail(&t, &catalog))
                .unwrap_or_default(),
            Command::Dashboard => match self.dashboard().await {
                Some(d) => view::dashboard(&self.store.owner(), &d),
                None => String::new(),
            },
            Command::Tags => view::tags(&catalog),
            Command::Shell => {
                self.error("already in a shell");
                String::new()
            }
        }
    }

    async fn run_edit(&mut self, args: &EditArgs) -> Option<Task> {
        let tags: Option<Vec<String>> = if args.clear_tags {
            Some(Vec::new())
        } else if args.tags.is_empty() {
            None
        } else {
            Some(args.tags.clone())
        };
        self.edit(
            &args.id,
            args.title.as_deref(),
            args.description.as_deref(),
            tags.as_deref(),
        )
        .await
    }

    /// Parses and runs one shell line.
    ///
    /// Blank lines do nothing. Parse errors become an error notice.
    pub async fn run_line(&mut self, line: &str) -> Flow {
        if line.trim().is_empty() {
            return Flow::Continue(String::new());
        }
        let parsed = match ShellLine::parse_line(line) {
            Ok(parsed) => parsed,
            Err(message) => return Flow::Continue(message.trim_end().to_string()),
        };

        match parsed.command {
            ShellCommand::Task(command) => Flow::Continue(self.run(&command).await),
            ShellCommand::User { owner } => {
                self.switch_owner(&owner).await;
                Flow::Continue(String::new())
            }
            ShellCommand::Filter(args) => {
                args.apply(&mut self.criteria);
                let catalog = self.store.catalog();
                Flow::Continue(view::criteria(&self.criteria, catalog))
            }
            ShellCommand::Clear => {
                self.clear_filter();
                Flow::Continue(String::new())
            }
            ShellCommand::Quit => Flow::Quit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskboard_proto::task::TaskStatus;

    use crate::filter::StatusFilter;
    use crate::service::local::LocalService;
    use crate::store::StoreOptions;

    fn app() -> App<LocalService> {
        let store = TaskStore::new(LocalService::new(), "alice", StoreOptions::default());
        App::new(store, TagMatch::Any)
    }

    fn short(task: &Task) -> String {
        view::short_id(task.id.as_str()).to_string()
    }

    #[tokio::test]
    async fn failed_add_sets_error_notice() {
        let mut app = app();
        assert!(app.add("  ", "", &[]).await.is_none());
        let notice = app.take_notice().unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert!(notice.text.contains("title cannot be empty"));
        assert!(app.notice().is_none());
    }

    #[tokio::test]
    async fn resolve_by_prefix_suffix_and_full_id() {
        let mut app = app();
        let task = app.add("A", "", &[]).await.unwrap();
        assert_eq!(app.resolve_id(task.id.as_str()), Ok(task.id.clone()));
        assert_eq!(app.resolve_id(&short(&task)), Ok(task.id.clone()));
        assert!(app.resolve_id("zzzz-no-such").is_err());
        assert!(app.resolve_id(" ").is_err());
    }

    #[tokio::test]
    async fn ambiguous_prefix_is_rejected() {
        let mut app = app();
        app.add("A", "", &[]).await.unwrap();
        app.add("B", "", &[]).await.unwrap();
        // UUID v7 ids lead with the creation timestamp.
        let err = app.resolve_id("01").unwrap_err();
        assert!(err.contains("more than one"));
    }

    #[tokio::test]
    async fn edit_keeps_omitted_fields() {
        let mut app = app();
        let task = app
            .add("Report", "quarterly", &["work".to_string()])
            .await
            .unwrap();
        let updated = app
            .edit(&short(&task), Some("Final report"), None, None)
            .await
            .unwrap();
        assert_eq!(updated.title, "Final report");
        assert_eq!(updated.description, "quarterly");
        assert_eq!(updated.tags, vec!["work".to_string()]);
    }

    #[tokio::test]
    async fn edit_unknown_task_sets_error_notice() {
        let mut app = app();
        app.add("Report", "", &[]).await.unwrap();
        app.take_notice();

        assert!(app.edit("zzzz-no-such", Some("New"), None, None).await.is_none());
        let notice = app.take_notice().unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert!(notice.text.contains("zzzz-no-such"));
    }

    #[tokio::test]
    async fn show_unknown_task_sets_error_notice() {
        let mut app = app();
        let out = app
            .run(&Command::Show {
                id: "missing".to_string(),
            })
            .await;
        assert!(out.is_empty());
        assert_eq!(app.take_notice().unwrap().level, NoticeLevel::Error);
    }

    #[tokio::test]
    async fn switch_owner_resets_filter_and_rescopes() {
        let mut app = app();
        app.add("Alice task", "", &[]).await.unwrap();
        app.criteria_mut().text_query = "alice".to_string();
        app.criteria_mut().status = StatusFilter::Only(TaskStatus::Pending);

        assert!(app.switch_owner("bob").await);
        assert!(app.criteria().is_empty());
        assert!(app.visible().is_empty());
        app.add("Bob task", "", &[]).await.unwrap();

        assert!(app.switch_owner("alice").await);
        let titles: Vec<String> = app.visible().into_iter().map(|t| t.title).collect();
        assert_eq!(titles, vec!["Alice task"]);
    }

    #[tokio::test]
    async fn switch_to_blank_owner_fails() {
        let mut app = app();
        assert!(!app.switch_owner("  ").await);
        assert_eq!(app.notice().unwrap().level, NoticeLevel::Error);
        assert_eq!(app.store().owner(), "alice");
    }

    #[tokio::test]
    async fn shell_session() {
        let mut app = app();
        assert_eq!(
            app.run_line("add \"Team meeting\" -t work").await,
            Flow::Continue(String::new())
        );
        app.run_line("add Groceries -t personal").await;

        let Flow::Continue(listing) = app.run_line("list -q meeting").await else {
            panic!("expected output");
        };
        assert!(listing.contains("Team meeting"));
        assert!(!listing.contains("Groceries"));

        let Flow::Continue(summary) = app.run_line("filter --tag personal").await else {
            panic!("expected output");
        };
        assert_eq!(summary, "Filter: any of #Personal");
        let titles: Vec<String> = app.visible().into_iter().map(|t| t.title).collect();
        assert_eq!(titles, vec!["Groceries"]);

        app.run_line("clear").await;
        assert!(app.criteria().is_empty());
        assert_eq!(app.run_line("quit").await, Flow::Quit);
    }

    #[tokio::test]
    async fn shell_toggle_and_comment_by_short_id() {
        let mut app = app();
        let task = app.add("Write", "", &[]).await.unwrap();
        let id = short(&task);

        app.run_line(&format!("toggle {id}")).await;
        assert_eq!(
            app.take_notice().unwrap().text,
            "Write is now in-progress"
        );
        app.run_line(&format!("comment {id} \"halfway there\"")).await;
        assert_eq!(app.store().get(&task.id).unwrap().comments.len(), 1);

        let Flow::Continue(detail) = app.run_line(&format!("show {id}")).await else {
            panic!("expected output");
        };
        assert!(detail.contains("halfway there"));
    }

    #[tokio::test]
    async fn shell_parse_error_is_reported() {
        let mut app = app();
        let Flow::Continue(message) = app.run_line("add \"unterminated").await else {
            panic!("expected output");
        };
        assert_eq!(message, "unterminated quote");
        assert_eq!(app.run_line("   ").await, Flow::Continue(String::new()));
    }

    #[tokio::test]
    async fn dashboard_renders_owner() {
        let mut app = app();
        app.add("A", "", &["work".to_string()]).await.unwrap();
        let out = app.run(&Command::Dashboard).await;
        assert!(out.starts_with("Dashboard for alice"));
        assert!(out.contains("Pending: 1"));
    }
}
