//! `Taskboard`: personal task tracker for the terminal.
//!
//! Talks to a `taskboard-server` over HTTP, or keeps tasks in memory with
//! `--offline`. Configuration via CLI flags, environment variables, or
//! config file (`~/.config/taskboard/config.toml`).
//!
//! ```bash
//! # List your tasks
//! cargo run --bin taskboard -- --owner alice list
//!
//! # Add a tagged task
//! cargo run --bin taskboard -- add "Team meeting" -t work
//!
//! # Interactive session without a server
//! cargo run --bin taskboard -- --offline shell
//! ```

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use taskboard::app::{App, Flow, NoticeLevel};
use taskboard::cli::{Command, FilterArgs};
use taskboard::config::{CliArgs, ClientConfig};
use taskboard::logging;
use taskboard::service::TaskService;
use taskboard::service::http::HttpService;
use taskboard::service::local::LocalService;
use taskboard::store::TaskStore;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = CliArgs::parse();

    let config = match ClientConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let _log_guard = logging::init(&cli.log_level, cli.log_file.as_deref());

    tracing::info!(owner = %config.owner, offline = config.offline, "taskboard starting");

    let command = cli
        .command
        .clone()
        .unwrap_or_else(|| Command::List(FilterArgs::default()));

    if config.offline {
        let service = LocalService::with_config(config.catalog.clone(), config.max_title_length);
        return run(service, &config, &command).await;
    }

    match HttpService::new(&config.server_url, config.request_timeout) {
        Ok(service) => {
            tracing::debug!(server = %service.base_url(), "using remote service");
            run(service, &config, &command).await
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Loads the owner's tasks and runs one command (or the shell).
async fn run<S: TaskService>(service: S, config: &ClientConfig, command: &Command) -> ExitCode {
    let store = TaskStore::new(service, config.owner.clone(), config.store_options());
    let mut app = App::new(store, config.tag_match);
    app.refresh().await;

    if matches!(command, Command::Shell) {
        return match run_shell(&mut app).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("error: {e}");
                ExitCode::FAILURE
            }
        };
    }

    let output = app.run(command).await;
    if !output.is_empty() {
        println!("{output}");
    }
    match app.take_notice() {
        Some(notice) if notice.level == NoticeLevel::Error => {
            eprintln!("{notice}");
            ExitCode::FAILURE
        }
        Some(notice) => {
            println!("{notice}");
            ExitCode::SUCCESS
        }
        None => ExitCode::SUCCESS,
    }
}

/// Reads commands from stdin until `quit` or end of input.
async fn run_shell<S: TaskService>(app: &mut App<S>) -> io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("taskboard shell: `help` lists commands, `quit` leaves");

    loop {
        print!("{}> ", app.store().owner());
        io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };
        match app.run_line(&line).await {
            Flow::Quit => break,
            Flow::Continue(output) => {
                if !output.is_empty() {
                    println!("{output}");
                }
                if let Some(notice) = app.take_notice() {
                    println!("{notice}");
                }
            }
        }
    }

    tracing::info!("shell closed");
    Ok(())
}
