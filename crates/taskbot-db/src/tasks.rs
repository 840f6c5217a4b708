//! Tasks store for per-user to-do items.

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::sync::MutexGuard;

use crate::DbError;

/// A stored task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub id: i64,
    pub user_id: i64,
    pub text: String,
    pub done: bool,
    pub created_at: DateTime<Utc>,
}

/// One window over a user's tasks, ordered by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPage {
    pub items: Vec<TaskRecord>,
    /// All tasks owned by the user, regardless of the window.
    pub total_count: u64,
    /// 1-based page number that produced this window.
    pub page: u32,
    pub page_size: u32,
}

impl TaskPage {
    /// Number of pages needed to show every task. Never less than 1, so an
    /// empty list still renders as "page 1 of 1".
    pub fn total_pages(&self) -> u32 {
        if self.page_size == 0 {
            return 1;
        }
        let pages = self.total_count.div_ceil(u64::from(self.page_size));
        u32::try_from(pages).unwrap_or(u32::MAX).max(1)
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }
}

/// Tasks store with a borrowed connection.
///
/// Holding a `Tasks` holds the database lock, so every method runs without
/// interleaving from other threads of this process.
pub struct Tasks<'db> {
    conn: MutexGuard<'db, Connection>,
}

const SELECT_COLUMNS: &str = "SELECT id, user_id, text, done, created_at FROM tasks";

impl<'db> Tasks<'db> {
    pub(crate) fn new(conn: MutexGuard<'db, Connection>) -> Self {
        Self { conn }
    }

    /// Insert a new task for `user_id` and return it.
    ///
    /// The id comes from SQLite's AUTOINCREMENT counter, so it is unique
    /// across all users and never reused.
    pub fn add(&self, user_id: i64, text: &str) -> Result<TaskRecord, DbError> {
        if text.trim().is_empty() {
            return Err(DbError::EmptyText);
        }

        let now = Utc::now();
        self.conn.execute(
            "INSERT INTO tasks (user_id, text, done, created_at) VALUES (?1, ?2, 0, ?3)",
            params![user_id, text, now.to_rfc3339()],
        )?;
        let id = self.conn.last_insert_rowid();

        tracing::debug!(user_id, task_id = id, "task added");

        Ok(TaskRecord {
            id,
            user_id,
            text: text.to_string(),
            done: false,
            created_at: now,
        })
    }

    /// Mark a task done.
    ///
    /// Returns `false` when no task with this id belongs to `user_id`,
    /// including when the id exists under another user. Marking an already
    /// done task returns `true` again.
    pub fn mark_done(&self, user_id: i64, id: i64) -> Result<bool, DbError> {
        let rows_affected = self.conn.execute(
            "UPDATE tasks SET done = 1 WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a single task owned by `user_id`.
    pub fn get(&self, user_id: i64, id: i64) -> Result<Option<TaskRecord>, DbError> {
        let task = self
            .conn
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE id = ?1 AND user_id = ?2"),
                params![id, user_id],
                Self::row_to_record,
            )
            .optional()?;
        Ok(task)
    }

    /// List one page of a user's tasks together with their total count.
    ///
    /// `page` is 1-based; 0 is read as 1. The count and the rows come from
    /// the same read transaction.
    pub fn list_page(
        &mut self,
        user_id: i64,
        page: u32,
        page_size: u32,
    ) -> Result<TaskPage, DbError> {
        let page = page.max(1);
        let offset = u64::from(page - 1) * u64::from(page_size);

        let tx = self.conn.transaction()?;

        let total_count: i64 = tx.query_row(
            "SELECT COUNT(*) FROM tasks WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;

        let items = {
            let mut stmt = tx.prepare(&format!(
                "{SELECT_COLUMNS} WHERE user_id = ?1 ORDER BY id ASC LIMIT ?2 OFFSET ?3"
            ))?;
            let rows = stmt.query_map(
                params![
                    user_id,
                    i64::from(page_size),
                    i64::try_from(offset).unwrap_or(i64::MAX)
                ],
                Self::row_to_record,
            )?;

            let mut items = Vec::new();
            for row in rows {
                items.push(row?);
            }
            items
        };

        tx.commit()?;

        Ok(TaskPage {
            items,
            total_count: u64::try_from(total_count).unwrap_or(0),
            page,
            page_size,
        })
    }

    fn row_to_record(row: &rusqlite::Row) -> Result<TaskRecord, rusqlite::Error> {
        let created_at_str: String = row.get(4)?;
        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;

        Ok(TaskRecord {
            id: row.get(0)?,
            user_id: row.get(1)?,
            text: row.get(2)?,
            done: row.get(3)?,
            created_at,
        })
    }
}
