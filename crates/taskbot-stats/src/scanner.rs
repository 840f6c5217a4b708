use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};

use crate::parser::parse_line;
use crate::types::LogStats;

/// Recomputes usage statistics from log files on every call.
pub struct LogScanner {
    pattern: String,
}

impl LogScanner {
    /// Create a scanner for a glob pattern such as `logs/taskbot.log*`.
    pub fn with_pattern(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    /// Scan every file matching the pattern.
    ///
    /// A file's size counts towards `total_bytes` even when it cannot be
    /// opened or read. Unreadable files and malformed lines are skipped;
    /// only an invalid pattern fails the scan.
    pub fn scan(&self) -> Result<LogStats> {
        self.scan_with(|path| File::open(path))
    }

    fn scan_with<R, F>(&self, open: F) -> Result<LogStats>
    where
        R: Read,
        F: Fn(&Path) -> io::Result<R>,
    {
        let paths = glob::glob(&self.pattern)
            .with_context(|| format!("Invalid log pattern: {}", self.pattern))?;

        let mut stats = LogStats::default();

        for entry in paths {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    tracing::debug!("Skipping unreadable log path: {}", e);
                    continue;
                }
            };

            let metadata = match std::fs::metadata(&path) {
                Ok(m) => m,
                Err(e) => {
                    tracing::debug!("Skipping vanished log file {:?}: {}", path, e);
                    continue;
                }
            };
            if !metadata.is_file() {
                continue;
            }

            stats.files_matched += 1;
            stats.total_bytes += metadata.len();

            let reader = match open(&path) {
                Ok(reader) => reader,
                Err(e) => {
                    tracing::debug!("Skipping unopenable log file {:?}: {}", path, e);
                    continue;
                }
            };
            if let Err(e) = scan_lines(BufReader::new(reader), &mut stats) {
                tracing::debug!("Stopped reading log file {:?}: {}", path, e);
            }
        }

        Ok(stats)
    }
}

/// Fold every usage line of one file into `stats`. Lines already folded
/// stay counted if reading fails part way.
fn scan_lines(mut reader: impl BufRead, stats: &mut LogStats) -> Result<()> {
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .with_context(|| "Failed to read line from log file")?;
        if read == 0 {
            break;
        }

        let line = String::from_utf8_lossy(&buf);
        if let Some(event) = parse_line(&line) {
            stats.record(&event);
        }
    }

    Ok(())
}
