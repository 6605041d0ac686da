use promptmania_core::CoreError;
use promptmania_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("core error: {0}")]
    Core(#[from] CoreError),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("compression error: {0}")]
    Compression(String),

    #[error("archive error: {0}")]
    Archive(String),

    #[error("project not found: {0}")]
    ProjectNotFound(String),

    #[error("invalid project file: {0}")]
    InvalidProjectFile(String),

    #[error("project name required")]
    EmptyProjectName,

    #[error("no tag filter selected")]
    NoTagFilter,

    #[error("no boxes match the tag filter")]
    NoTagMatches,
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::Serialization(e.to_string())
    }
}

impl From<zip::result::ZipError> for EngineError {
    fn from(e: zip::result::ZipError) -> Self {
        EngineError::Archive(e.to_string())
    }
}
