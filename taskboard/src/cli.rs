//! Command definitions shared by the one-shot CLI and the interactive shell.
//!
//! One-shot subcommands live in [`Command`]. The shell accepts the same
//! commands plus session-only ones ([`ShellCommand`]); each input line is
//! split with [`split_line`] and parsed by clap.

use chrono::NaiveDate;

use crate::filter::{Criteria, StatusFilter, TagMatch};

/// Task commands available both as subcommands and inside the shell.
#[derive(clap::Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List tasks, optionally filtered.
    #[command(visible_alias = "ls")]
    List(FilterArgs),

    /// Create a task.
    Add {
        /// Task title.
        title: String,
        /// Longer description.
        #[arg(short, long, default_value = "")]
        description: String,
        /// Tag id (repeatable).
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },

    /// Change a task's title, description, or tags.
    Edit(EditArgs),

    /// Delete a task.
    #[command(visible_alias = "rm")]
    Remove {
        /// Task id or unique id prefix.
        id: String,
    },

    /// Advance a task to its next status.
    Toggle {
        /// Task id or unique id prefix.
        id: String,
    },

    /// Add a comment to a task.
    Comment {
        /// Task id or unique id prefix.
        id: String,
        /// Comment text.
        text: String,
    },

    /// Show one task with its comments.
    Show {
        /// Task id or unique id prefix.
        id: String,
    },

    /// Show status counts and completion metrics.
    Dashboard,

    /// List the available tags.
    Tags,

    /// Start an interactive session.
    Shell,
}

/// Filter flags for `list` and the shell's `filter` command.
#[derive(clap::Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterArgs {
    /// Text to look for in title or description.
    #[arg(short, long)]
    pub query: Option<String>,

    /// Status to show (`pending`, `in-progress`, `completed`, `all`).
    #[arg(short, long)]
    pub status: Option<StatusFilter>,

    /// Creation date (YYYY-MM-DD).
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Tag id (repeatable). On `filter` each tag toggles its selection.
    #[arg(short, long = "tag")]
    pub tags: Vec<String>,

    /// Require every selected tag instead of any.
    #[arg(long, conflicts_with = "any_tags")]
    pub all_tags: bool,

    /// Require at least one selected tag.
    #[arg(long)]
    pub any_tags: bool,
}

impl FilterArgs {
    /// Applies these flags on top of `criteria`.
    ///
    /// Tags toggle their selection, so repeating a tag deselects it.
    pub fn apply(&self, criteria: &mut Criteria) {
        if let Some(query) = &self.query {
            criteria.text_query.clone_from(query);
        }
        if let Some(status) = self.status {
            criteria.status = status;
        }
        if self.date.is_some() {
            criteria.date = self.date;
        }
        for tag in &self.tags {
            criteria.toggle_tag(tag);
        }
        if self.all_tags {
            criteria.tag_match = TagMatch::All;
        } else if self.any_tags {
            criteria.tag_match = TagMatch::Any;
        }
    }
}

/// Arguments of `edit`. Omitted fields keep their current value.
#[derive(clap::Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct EditArgs {
    /// Task id or unique id prefix.
    pub id: String,

    /// New title.
    #[arg(long)]
    pub title: Option<String>,

    /// New description.
    #[arg(short, long)]
    pub description: Option<String>,

    /// Replacement tag id (repeatable).
    #[arg(short, long = "tag")]
    pub tags: Vec<String>,

    /// Remove every tag.
    #[arg(long, conflicts_with = "tags")]
    pub clear_tags: bool,
}

/// Commands accepted by the interactive shell.
#[derive(clap::Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Task commands.
    #[command(flatten)]
    Task(Command),

    /// Switch to another owner (resets the filter).
    User {
        /// Owner id.
        owner: String,
    },

    /// Change the active filter.
    Filter(FilterArgs),

    /// Clear the active filter.
    Clear,

    /// Leave the shell.
    #[command(visible_alias = "exit")]
    Quit,
}

/// One parsed shell line.
#[derive(clap::Parser, Debug)]
#[command(
    no_binary_name = true,
    disable_version_flag = true,
    override_usage = "<command> [args]"
)]
pub struct ShellLine {
    /// The command.
    #[command(subcommand)]
    pub command: ShellCommand,
}

impl ShellLine {
    /// Parses one shell input line.
    ///
    /// # Errors
    ///
    /// Returns a message describing the first problem found.
    pub fn parse_line(line: &str) -> Result<Self, String> {
        use clap::Parser;

        let words = split_line(line)?;
        Self::try_parse_from(words).map_err(|e| e.to_string())
    }
}

/// Splits a command line into words.
///
/// Words are separated by whitespace. Single or double quotes group words;
/// a backslash escapes the next character outside single quotes.
///
/// # Errors
///
/// Returns an error for an unterminated quote or a trailing backslash.
pub fn split_line(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some('\''), c) => current.push(c),
            (_, '\\') => {
                let escaped = chars.next().ok_or("trailing backslash")?;
                current.push(escaped);
                in_word = true;
            }
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return Err("unterminated quote".to_string());
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskboard_proto::task::TaskStatus;

    #[test]
    fn split_plain_words() {
        assert_eq!(split_line("  toggle   abc ").unwrap(), vec!["toggle", "abc"]);
        assert!(split_line("   ").unwrap().is_empty());
    }

    #[test]
    fn split_quotes_and_escapes() {
        assert_eq!(
            split_line(r#"add "Team meeting" -d 'it''s at 3' say\ hi"#).unwrap(),
            vec!["add", "Team meeting", "-d", "its at 3", "say hi"]
        );
        assert_eq!(split_line(r#"comment x """#).unwrap(), vec!["comment", "x", ""]);
        assert_eq!(split_line(r#""a \" b""#).unwrap(), vec![r#"a " b"#]);
    }

    #[test]
    fn split_errors() {
        assert!(split_line("add \"open").is_err());
        assert!(split_line("add trailing\\").is_err());
    }

    #[test]
    fn parse_task_command() {
        let line = ShellLine::parse_line("add \"Read book\" -t study -t personal").unwrap();
        assert_eq!(
            line.command,
            ShellCommand::Task(Command::Add {
                title: "Read book".to_string(),
                description: String::new(),
                tags: vec!["study".to_string(), "personal".to_string()],
            })
        );
    }

    #[test]
    fn parse_session_commands() {
        assert_eq!(
            ShellLine::parse_line("user bob").unwrap().command,
            ShellCommand::User {
                owner: "bob".to_string()
            }
        );
        assert_eq!(ShellLine::parse_line("clear").unwrap().command, ShellCommand::Clear);
        assert_eq!(ShellLine::parse_line("exit").unwrap().command, ShellCommand::Quit);
    }

    #[test]
    fn parse_filter() {
        let line = ShellLine::parse_line("filter -s in-progress --tag work --all-tags").unwrap();
        let ShellCommand::Filter(args) = line.command else {
            panic!("expected filter");
        };
        assert_eq!(args.status, Some(StatusFilter::Only(TaskStatus::InProgress)));
        assert_eq!(args.tags, vec!["work".to_string()]);
        assert!(args.all_tags);
    }

    #[test]
    fn parse_unknown_command_fails() {
        assert!(ShellLine::parse_line("frobnicate").is_err());
        assert!(ShellLine::parse_line("toggle").is_err());
    }

    #[test]
    fn filter_args_apply_toggles_tags() {
        let mut criteria = Criteria::default();
        criteria.toggle_tag("work");
        let args = FilterArgs {
            query: Some("report".to_string()),
            tags: vec!["work".to_string(), "urgent".to_string()],
            all_tags: true,
            ..FilterArgs::default()
        };
        args.apply(&mut criteria);
        assert_eq!(criteria.text_query, "report");
        assert!(!criteria.tag_ids.contains("work"));
        assert!(criteria.tag_ids.contains("urgent"));
        assert_eq!(criteria.tag_match, TagMatch::All);
    }
}
