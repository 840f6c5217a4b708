//! Async front for the blocking task store and log scanner.
//!
//! SQLite calls and log reads run on tokio's blocking pool so overlapping
//! sessions never stall the runtime's worker threads.

use std::sync::Arc;

use anyhow::{Context, Result};
use taskbot_db::{Database, DbError, TaskPage, TaskRecord};
use taskbot_stats::{LogScanner, LogStats};

/// Cloneable handle to the shared task store.
#[derive(Clone)]
pub struct TaskService {
    db: Arc<Database>,
}

impl TaskService {
    pub fn new(db: Database) -> Self {
        Self { db: Arc::new(db) }
    }

    pub async fn init(&self) -> Result<()> {
        self.run(|db| db.init()).await
    }

    pub async fn add(&self, user_id: i64, text: String) -> Result<TaskRecord> {
        self.run(move |db| db.tasks()?.add(user_id, &text)).await
    }

    pub async fn mark_done(&self, user_id: i64, id: i64) -> Result<bool> {
        self.run(move |db| db.tasks()?.mark_done(user_id, id)).await
    }

    pub async fn get(&self, user_id: i64, id: i64) -> Result<Option<TaskRecord>> {
        self.run(move |db| db.tasks()?.get(user_id, id)).await
    }

    pub async fn list_page(&self, user_id: i64, page: u32, page_size: u32) -> Result<TaskPage> {
        self.run(move |db| db.tasks()?.list_page(user_id, page, page_size))
            .await
    }

    async fn run<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&Database) -> Result<T, DbError> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        let result = tokio::task::spawn_blocking(move || op(&db))
            .await
            .context("Task store worker failed")?;
        Ok(result?)
    }
}

/// Scan the log files matching `pattern` off the async runtime.
pub async fn scan_logs(pattern: String) -> Result<LogStats> {
    tokio::task::spawn_blocking(move || LogScanner::with_pattern(pattern).scan())
        .await
        .context("Log scan worker failed")?
}
