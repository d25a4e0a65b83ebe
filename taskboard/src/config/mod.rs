//! Configuration system for the `Taskboard` client.
//!
//! Supports layered configuration with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attribute)
//! 3. TOML config file (`~/.config/taskboard/config.toml`)
//! 4. Compiled defaults
//!
//! Missing config file is not an error (defaults are used). An explicit
//! `--config` path that doesn't exist is an error.

use std::path::PathBuf;
use std::time::Duration;

use taskboard_proto::catalog::{CatalogError, Tag, TagCatalog};
use taskboard_proto::task::{MAX_TASK_TITLE_LENGTH, StatusModel};

use crate::cli::Command;
use crate::filter::TagMatch;
use crate::store::StoreOptions;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),

    /// The `[[tags]]` entries do not form a valid catalog.
    #[error("invalid tag catalog: {0}")]
    Catalog(#[from] CatalogError),

    /// `max_title_length` is zero, which would reject every title.
    #[error("max_title_length must be at least 1")]
    ZeroTitleLength,
}

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

/// Top-level TOML config file structure.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    server: ServerFileConfig,
    user: UserFileConfig,
    tasks: TasksFileConfig,
    tags: Option<Vec<Tag>>,
}

/// `[server]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ServerFileConfig {
    url: Option<String>,
    request_timeout_secs: Option<u64>,
}

/// `[user]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct UserFileConfig {
    owner: Option<String>,
}

/// `[tasks]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct TasksFileConfig {
    status_model: Option<StatusModel>,
    tag_match: Option<TagMatch>,
    max_title_length: Option<usize>,
}

// ---------------------------------------------------------------------------
// Resolved configuration (concrete types, all fields populated)
// ---------------------------------------------------------------------------

/// Fully resolved client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    // -- Server --
    /// Base URL of the task server.
    pub server_url: String,
    /// Per-request timeout; `None` uses the transport defaults.
    pub request_timeout: Option<Duration>,
    /// Use the in-process service instead of the server.
    pub offline: bool,

    // -- User --
    /// Owner whose tasks are shown at startup.
    pub owner: String,

    // -- Tasks --
    /// How the toggle action advances a task.
    pub status_model: StatusModel,
    /// Default combination mode for multi-tag filters.
    pub tag_match: TagMatch,
    /// Maximum task title length in characters.
    pub max_title_length: usize,
    /// Tags available for tasks.
    pub catalog: TagCatalog,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:5000".to_string(),
            request_timeout: None,
            offline: false,
            owner: "default".to_string(),
            status_model: StatusModel::default(),
            tag_match: TagMatch::default(),
            max_title_length: MAX_TASK_TITLE_LENGTH,
            catalog: TagCatalog::builtin(),
        }
    }
}

impl ClientConfig {
    /// Load configuration by merging CLI args, env vars, and a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the explicit config file cannot be read
    /// or parsed, if its tag catalog is invalid, or if `max_title_length` is 0.
    pub fn load(cli: &CliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Self::resolve(cli, file)
    }

    /// Resolve a `ClientConfig` from CLI args and a parsed config file.
    ///
    /// Priority: CLI > file > default.
    fn resolve(cli: &CliArgs, file: ConfigFile) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let catalog = match file.tags {
            Some(tags) => TagCatalog::new(tags)?,
            None => defaults.catalog,
        };
        let owner = cli
            .owner
            .clone()
            .or(file.user.owner)
            .filter(|o| !o.trim().is_empty())
            .unwrap_or(defaults.owner);
        let max_title_length = file
            .tasks
            .max_title_length
            .unwrap_or(defaults.max_title_length);
        if max_title_length == 0 {
            return Err(ConfigError::ZeroTitleLength);
        }

        Ok(Self {
            server_url: cli
                .server_url
                .clone()
                .or(file.server.url)
                .unwrap_or(defaults.server_url),
            request_timeout: file
                .server
                .request_timeout_secs
                .filter(|s| *s > 0)
                .map(Duration::from_secs),
            offline: cli.offline,
            owner,
            status_model: file.tasks.status_model.unwrap_or(defaults.status_model),
            tag_match: file.tasks.tag_match.unwrap_or(defaults.tag_match),
            max_title_length,
            catalog,
        })
    }

    /// Store settings derived from this configuration.
    #[must_use]
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            catalog: self.catalog.clone(),
            status_model: self.status_model,
            max_title_length: self.max_title_length,
        }
    }
}

/// CLI arguments parsed by clap.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "Personal task tracker")]
pub struct CliArgs {
    /// Base URL of the task server.
    #[arg(long, env = "TASKBOARD_URL", global = true)]
    pub server_url: Option<String>,

    /// Whose tasks to work with.
    #[arg(long, env = "TASKBOARD_OWNER", global = true)]
    pub owner: Option<String>,

    /// Path to config file (default: `~/.config/taskboard/config.toml`).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level for taskboard (trace, debug, info, warn, error) or a full filter directive.
    #[arg(long, default_value = "info", env = "TASKBOARD_LOG", global = true)]
    pub log_level: String,

    /// Path to log file (default: daily file under the user state directory).
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Keep tasks in memory instead of talking to a server.
    #[arg(long, global = true)]
    pub offline: bool,

    /// What to do (default: `list`).
    #[command(subcommand)]
    pub command: Option<Command>,
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Load and parse a TOML config file.
///
/// If `explicit_path` is `Some`, the file must exist (error if not).
/// If `explicit_path` is `None`, the default path is tried and missing file
/// is treated as empty config.
fn load_config_file(explicit_path: Option<&std::path::Path>) -> Result<ConfigFile, ConfigError> {
    let path = if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    } else {
        let Some(config_dir) = dirs::config_dir() else {
            return Ok(ConfigFile::default());
        };
        config_dir.join("taskboard").join("config.toml")
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}
