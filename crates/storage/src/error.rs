use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unsupported schema version {found} (max {supported})")]
    UnsupportedSchema { found: i32, supported: i32 },
}
