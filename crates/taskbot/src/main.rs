mod bot;
mod config;
mod service;
mod shell;
mod todo;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use taskbot_db::Database;
use taskbot_logging::{record_usage, LogFormat};

use bot::Bot;
use config::{BotConfig, Overrides, Settings};
use service::{scan_logs, TaskService};
use todo::TodoAction;

#[derive(Parser, Debug)]
#[command(
    name = "taskbot",
    about = "Per-user task lists and usage statistics",
    version,
    author
)]
struct Cli {
    /// Acting user id
    #[arg(short, long, global = true, allow_hyphen_values = true)]
    user: Option<i64>,

    /// Config file (default: ./taskbot.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database file
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Directory for the rolling log files
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Console log format
    #[arg(long, value_enum, default_value = "pretty", global = true)]
    log_format: LogFormatChoice,

    /// Output results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage your tasks
    Todo {
        #[command(subcommand)]
        action: TodoAction,
    },

    /// Show usage statistics recomputed from the log files
    Stats {
        /// Glob for the log files (default: <log-dir>/taskbot.log*)
        #[arg(long)]
        pattern: Option<String>,

        /// Number of commands to show
        #[arg(long)]
        top: Option<usize>,
    },

    /// Read bot commands from stdin, one per line: `[<user_id>] /command args`
    Shell,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match cli.config {
        Some(ref path) => Some(BotConfig::load_from(path)?),
        None => {
            let working_dir =
                std::env::current_dir().context("Failed to get current directory")?;
            BotConfig::load(&working_dir)?
        }
    };

    let (pattern, top) = match cli.command {
        Command::Stats { ref pattern, top } => (pattern.clone(), top),
        _ => (None, None),
    };
    let settings = Settings::resolve(
        config,
        Overrides {
            database_path: cli.db.clone(),
            log_dir: cli.log_dir.clone(),
            log_pattern: pattern,
            top_commands: top,
        },
    );

    let _guard = taskbot_logging::init_tracing(
        &settings.log_level,
        cli.log_format.into(),
        Some(&settings.log_dir),
    )
    .with_context(|| format!("Failed to open log directory {}", settings.log_dir.display()))?;

    if let Some(parent) = settings.database_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    let db = Database::open_at(&settings.database_path).with_context(|| {
        format!("Failed to open database {}", settings.database_path.display())
    })?;
    let tasks = TaskService::new(db);
    tasks.init().await?;
    tracing::debug!("using database {}", settings.database_path.display());

    let bot = Bot::new(tasks, settings);

    match cli.command {
        Command::Todo { action } => {
            let user_id = require_user(cli.user)?;
            todo::handle_todo_command(&bot, user_id, action, cli.json).await?;
        }
        Command::Stats { .. } => {
            let user_id = require_user(cli.user)?;
            if cli.json {
                record_usage(user_id, "stats", None);
                let stats = scan_logs(bot.settings().log_pattern.clone()).await?;
                let body = serde_json::json!({
                    "uniqueUsers": stats.unique_users,
                    "commandCounts": stats.command_counts(),
                    "topCommands": stats.top_commands(bot.settings().top_commands),
                    "totalBytes": stats.total_bytes,
                    "filesMatched": stats.files_matched,
                });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                println!("{}", bot.stats(user_id).await?);
            }
        }
        Command::Shell => {
            shell::run_shell(&bot, cli.user).await?;
        }
    }

    Ok(())
}

fn require_user(user: Option<i64>) -> Result<i64> {
    user.context("This command needs --user <id>")
}
