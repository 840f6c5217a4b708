//! Configuration file support for taskbot.
//!
//! Loads configuration from `taskbot.toml` in the working directory.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use taskbot_db::Database;
use taskbot_logging::LOG_FILE_PREFIX;

/// The config file name
pub const CONFIG_FILE_NAME: &str = "taskbot.toml";

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_TOP_COMMANDS: usize = 10;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Settings loaded from `taskbot.toml`. Every key is optional.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    /// SQLite file holding the tasks
    pub database_path: Option<PathBuf>,
    /// Directory the rolling log files are written to
    pub log_dir: Option<PathBuf>,
    /// Glob for the log files read by `/stats`
    pub log_pattern: Option<String>,
    /// Tasks per page in `/todo list`
    pub page_size: Option<u32>,
    /// Commands shown by `/stats`
    pub top_commands: Option<usize>,
    /// Console log level when `RUST_LOG` is unset
    pub log_level: Option<String>,
}

impl BotConfig {
    /// Load configuration from the working directory.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if file exists and parses successfully
    /// - `Ok(None)` if file does not exist
    /// - `Err(...)` if file exists but fails to parse (hard error)
    pub fn load(working_dir: &Path) -> Result<Option<Self>> {
        let config_path = working_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Ok(None);
        }

        Self::load_from(&config_path).map(Some)
    }

    /// Load configuration from an explicit path, which must exist.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let config: BotConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        Ok(config)
    }
}

/// Values given on the command line; they win over the config file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub database_path: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    pub log_pattern: Option<String>,
    pub top_commands: Option<usize>,
}

/// Fully resolved settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_path: PathBuf,
    pub log_dir: PathBuf,
    pub log_pattern: String,
    pub page_size: u32,
    pub top_commands: usize,
    pub log_level: String,
}

impl Settings {
    /// Priority: command line > config file > defaults.
    ///
    /// The log pattern defaults to the rolling files in the log directory,
    /// so `/stats` reads what this process writes.
    pub fn resolve(config: Option<BotConfig>, overrides: Overrides) -> Self {
        let config = config.unwrap_or_default();

        let log_dir = overrides
            .log_dir
            .or(config.log_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        let log_pattern = overrides
            .log_pattern
            .or(config.log_pattern)
            .unwrap_or_else(|| default_pattern(&log_dir));

        Self {
            database_path: overrides
                .database_path
                .or(config.database_path)
                .unwrap_or_else(Database::default_path),
            log_dir,
            log_pattern,
            page_size: config.page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(1),
            top_commands: overrides
                .top_commands
                .or(config.top_commands)
                .unwrap_or(DEFAULT_TOP_COMMANDS),
            log_level: config
                .log_level
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        }
    }
}

fn default_pattern(log_dir: &Path) -> String {
    format!("{}*", log_dir.join(LOG_FILE_PREFIX).display())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(BotConfig::load(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_load_full_config() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"
database_path = "/var/lib/taskbot/tasks.db"
log_dir = "/var/log/taskbot"
page_size = 5
top_commands = 3
log_level = "debug"
"#,
        )
        .unwrap();

        let config = BotConfig::load(dir.path()).unwrap().unwrap();
        let settings = Settings::resolve(Some(config), Overrides::default());

        assert_eq!(settings.database_path, PathBuf::from("/var/lib/taskbot/tasks.db"));
        assert_eq!(settings.log_pattern, "/var/log/taskbot/taskbot.log*");
        assert_eq!(settings.page_size, 5);
        assert_eq!(settings.top_commands, 3);
        assert_eq!(settings.log_level, "debug");
    }

    #[test]
    fn test_unknown_key_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "bot_token = \"x\"\n").unwrap();
        assert!(BotConfig::load(dir.path()).is_err());
    }

    #[test]
    fn test_overrides_win() {
        let config = BotConfig {
            log_pattern: Some("a.log*".to_string()),
            top_commands: Some(3),
            ..Default::default()
        };
        let overrides = Overrides {
            log_pattern: Some("b.log*".to_string()),
            top_commands: Some(7),
            ..Default::default()
        };

        let settings = Settings::resolve(Some(config), overrides);
        assert_eq!(settings.log_pattern, "b.log*");
        assert_eq!(settings.top_commands, 7);
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::resolve(None, Overrides::default());
        assert_eq!(settings.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(settings.top_commands, DEFAULT_TOP_COMMANDS);
        assert_eq!(settings.log_level, DEFAULT_LOG_LEVEL);
        assert_eq!(settings.log_pattern, "./taskbot.log*");
    }

    #[test]
    fn test_zero_page_size_is_clamped() {
        let config = BotConfig {
            page_size: Some(0),
            ..Default::default()
        };
        assert_eq!(Settings::resolve(Some(config), Overrides::default()).page_size, 1);
    }
}
