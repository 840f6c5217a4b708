//! # taskbot-logging
//!
//! Logging for taskbot.
//!
//! ## Key Items
//!
//! - [`init_tracing`] - Console and rolling-file subscriber setup
//! - [`LogFormat`] - Console output formats (Pretty, JSON, Compact)
//! - [`record_usage`] - Emits the `STATS` usage lines that the stats
//!   scanner reads back
//!
//! The file layer is always plain text, whatever the console format, so
//! usage lines keep the `STATS user_id=.. command=..` shape on disk.

mod usage;

pub use usage::{record_usage, usage_message, USAGE_TARGET};

use std::path::Path;

use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Prefix of the log files; rotated files get a date suffix.
pub const LOG_FILE_PREFIX: &str = "taskbot.log";

/// Rotated files kept next to the current one.
const MAX_LOG_FILES: usize = 4;

/// Console output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with colors
    #[default]
    Pretty,
    /// JSON lines format for machine consumption
    Json,
    /// Compact single-line format
    Compact,
}

/// Initialize tracing for the application.
///
/// Console output goes to stderr, filtered by `RUST_LOG` or `level`. When
/// `log_dir` is given, INFO and above are also written to a daily-rolling
/// `taskbot.log.<date>` file there; keep the returned guard alive until
/// exit so buffered lines are flushed.
pub fn init_tracing(
    level: &str,
    format: LogFormat,
    log_dir: Option<&Path>,
) -> Result<Option<WorkerGuard>, InitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(LOG_FILE_PREFIX)
                .max_log_files(MAX_LOG_FILES)
                .build(dir)?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false)
                .with_filter(LevelFilter::INFO);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(file_layer)
                .with(
                    fmt::layer()
                        .json()
                        .with_target(false)
                        .with_writer(std::io::stderr)
                        .with_filter(filter),
                )
                .init();
        }
        LogFormat::Compact => {
            tracing_subscriber::registry()
                .with(file_layer)
                .with(
                    fmt::layer()
                        .compact()
                        .with_target(false)
                        .with_writer(std::io::stderr)
                        .with_filter(filter),
                )
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(file_layer)
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_writer(std::io::stderr)
                        .with_filter(filter),
                )
                .init();
        }
    }

    Ok(guard)
}
