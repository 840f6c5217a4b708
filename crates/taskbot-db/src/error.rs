use thiserror::Error;

/// Errors surfaced by the task store.
///
/// Every variant except `EmptyText` means the backing store could not be
/// reached or trusted; callers must not treat them as "no results".
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Database lock poisoned")]
    LockPoisoned,

    #[error("Table '{table}' does not match the expected schema (missing column '{column}')")]
    SchemaMismatch { table: String, column: String },

    #[error("Task text must not be empty")]
    EmptyText,
}
