//! Database layer for taskbot.
//!
//! Provides a unified `Database` struct that owns the SQLite connection
//! and provides access to the task store.

mod error;
mod tasks;

pub use error::DbError;
pub use tasks::{TaskPage, TaskRecord, Tasks};

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

/// Columns the `tasks` table must carry before the store accepts work.
const TASK_COLUMNS: [&str; 5] = ["id", "user_id", "text", "done", "created_at"];

/// How long a writer waits on another process holding the database file.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// The main database struct that owns the SQLite connection.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create a database at a specific path.
    pub fn open_at(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (useful for testing).
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Default database path: `~/.local/share/taskbot/taskbot.db` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("taskbot")
            .join("taskbot.db")
    }

    /// Re-run schema setup. Safe to call any number of times.
    pub fn init(&self) -> Result<(), DbError> {
        let conn = self.conn.lock().map_err(|_| DbError::LockPoisoned)?;
        Self::init_schema(&conn)
    }

    /// Access the tasks store.
    pub fn tasks(&self) -> Result<Tasks<'_>, DbError> {
        let conn = self.conn.lock().map_err(|_| DbError::LockPoisoned)?;
        Ok(Tasks::new(conn))
    }

    /// Create the schema if missing, then check that an existing `tasks`
    /// table has the columns the store reads and writes.
    fn init_schema(conn: &Connection) -> Result<(), DbError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                text TEXT NOT NULL,
                done INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            );
            "#,
        )?;

        let mut stmt = conn.prepare("PRAGMA table_info(tasks)")?;
        let columns = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(missing) = TASK_COLUMNS
            .iter()
            .find(|c| !columns.iter().any(|have| have == *c))
        {
            return Err(DbError::SchemaMismatch {
                table: "tasks".to_string(),
                column: missing.to_string(),
            });
        }

        conn.execute_batch("CREATE INDEX IF NOT EXISTS idx_tasks_user_id ON tasks(user_id, id);")?;

        tracing::info!("task schema ready");
        Ok(())
    }
}
