use std::path::{Path, PathBuf};

use promptmania_core::{BoxId, Category, Project};
use promptmania_engine::{Action, Changes, Editor, EditorConfig, EngineError};
use promptmania_storage::{SqliteStorage, Storage, StorageError};
use tempfile::TempDir;

/// An editor over SQLite storage with helpers for building up projects.
pub struct TestSession {
    pub editor: Editor<SqliteStorage>,
}

impl TestSession {
    pub fn new() -> Result<Self, StorageError> {
        Self::with_config(EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Result<Self, StorageError> {
        let storage = SqliteStorage::open_in_memory()?;
        Ok(Self {
            editor: Editor::with_config(storage, config),
        })
    }

    /// Start a session from an already-populated storage backend.
    pub fn from_storage(storage: SqliteStorage) -> Self {
        Self {
            editor: Editor::new(storage),
        }
    }

    pub fn open(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let path = path.to_str().ok_or("non-utf8 database path")?;
        Ok(Self::from_storage(SqliteStorage::open(path)?))
    }

    pub fn dispatch(&mut self, action: Action) -> Result<Changes, EngineError> {
        self.editor.dispatch(action)
    }

    pub fn active(&self) -> Result<&Project, EngineError> {
        self.editor
            .active_project()
            .ok_or_else(|| EngineError::ProjectNotFound("active".into()))
    }

    /// Add a text box with the given content and weight. Returns its id.
    pub fn add_text(
        &mut self,
        category: Category,
        content: &str,
        weight: f64,
    ) -> Result<BoxId, Box<dyn std::error::Error>> {
        self.dispatch(Action::AddTextBox(category))?;
        let id = self
            .editor
            .state()
            .last_focused_box_id
            .clone()
            .ok_or("new text box was not focused")?;
        self.dispatch(Action::SetRichText {
            id: id.clone(),
            html: content.to_string(),
        })?;
        if weight > 0.0 {
            self.dispatch(Action::SetWeight {
                id: id.clone(),
                weight,
            })?;
        }
        Ok(id)
    }

    /// Add an image box holding `data_url`. Returns its id.
    pub fn add_image(
        &mut self,
        data_url: &str,
        filename: Option<&str>,
    ) -> Result<BoxId, Box<dyn std::error::Error>> {
        let before: Vec<BoxId> = self.active()?.image_boxes().map(|b| b.id.clone()).collect();
        self.dispatch(Action::AddImageBox)?;
        let id = self
            .active()?
            .image_boxes()
            .map(|b| b.id.clone())
            .find(|id| !before.contains(id))
            .ok_or("image box was not added")?;
        self.dispatch(Action::SetImage {
            id: id.clone(),
            content: data_url.to_string(),
            filename: filename.map(str::to_string),
        })?;
        Ok(id)
    }

    /// Drop the four seed boxes so tests start from an empty project.
    pub fn clear_seed_boxes(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let ids: Vec<BoxId> = self.active()?.boxes.iter().map(|b| b.id().clone()).collect();
        for id in ids {
            self.dispatch(Action::DeleteBox(id))?;
        }
        Ok(())
    }

    pub fn box_ids(&self) -> Result<Vec<BoxId>, EngineError> {
        Ok(self.active()?.boxes.iter().map(|b| b.id().clone()).collect())
    }

    pub fn toasts(&self) -> Vec<&str> {
        self.editor
            .state()
            .toasts
            .iter()
            .map(|t| t.message.as_str())
            .collect()
    }

    pub fn last_toast(&self) -> Option<&str> {
        self.editor.state().last_toast()
    }

    /// Raw JSON currently stored for the project list.
    pub fn stored_projects(&self) -> Result<Option<String>, StorageError> {
        self.editor
            .storage()
            .get(&self.editor.config().projects_key)
    }
}

/// A database file in a temporary directory that outlives individual sessions.
pub struct TempStore {
    _dir: TempDir,
    path: PathBuf,
}

impl TempStore {
    pub fn new() -> std::io::Result<Self> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("promptmania.db");
        Ok(Self { _dir: dir, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn session(&self) -> Result<TestSession, Box<dyn std::error::Error>> {
        TestSession::open(&self.path)
    }
}
