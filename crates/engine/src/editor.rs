use promptmania_core::{ImageBox, Project, TextBox, Timestamp, merge_prompt};
use promptmania_storage::Storage;

use crate::action::Action;
use crate::config::EditorConfig;
use crate::error::EngineError;
use crate::export::{
    BUNDLE_FILE_NAME, ExportFile, export_bundle, project_markdown, tag_markdown,
};
use crate::filter::{PaletteTag, filtered_image_boxes, filtered_text_boxes, palette_tags};
use crate::interchange::{file_stem, parse_project_file, project_json};
use crate::metrics::{ProjectMetrics, project_metrics};
use crate::reducer::{Changes, reduce};
use crate::state::AppState;
use crate::store::{load_state, persist_projects, persist_user_prefs};

/// Owns the session state and its storage backend. Every mutation goes
/// through [`dispatch`](Self::dispatch), which persists whatever changed.
pub struct Editor<S: Storage> {
    storage: S,
    state: AppState,
    config: EditorConfig,
}

impl<S: Storage> Editor<S> {
    pub fn new(storage: S) -> Self {
        Self::with_config(storage, EditorConfig::default())
    }

    pub fn with_config(storage: S, config: EditorConfig) -> Self {
        let state = load_state(&storage, &config);
        Self {
            storage,
            state,
            config,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn active_project(&self) -> Option<&Project> {
        self.state.active_project()
    }

    pub fn dispatch(&mut self, action: Action) -> Result<Changes, EngineError> {
        let changes = reduce(&mut self.state, action, &self.config);
        self.persist(changes)?;
        Ok(changes)
    }

    fn persist(&mut self, changes: Changes) -> Result<(), EngineError> {
        if changes.projects {
            persist_projects(&mut self.storage, &self.config.projects_key, &self.state.projects)?;
            tracing::debug!(projects = self.state.projects.len(), "persisted projects");
        }
        if changes.prefs {
            persist_user_prefs(&mut self.storage, &self.config.prefs_key, &self.state.user_prefs)?;
            tracing::debug!("persisted user preferences");
        }
        Ok(())
    }

    /// Load an uploaded project file into state. A rejected file only
    /// produces a toast.
    pub fn import_project_file(&mut self, text: &str) -> Result<Changes, EngineError> {
        match parse_project_file(text) {
            Ok(project) => self.dispatch(Action::ImportProject(project)),
            Err(e) => {
                tracing::warn!(error = %e, "rejected project file");
                let message = match e {
                    EngineError::InvalidProjectFile(_) | EngineError::Core(_) => {
                        "Invalid project file"
                    }
                    _ => "Failed to load file",
                };
                self.state.add_toast(message);
                Ok(Changes::NONE)
            }
        }
    }

    /// Discard in-memory state and re-read storage.
    pub fn reload(&mut self) {
        self.state = load_state(&self.storage, &self.config);
    }

    /// Expire old toasts. Hosts call this on a timer.
    pub fn sweep_toasts(&mut self, now: Timestamp) -> usize {
        self.state.sweep_toasts(now, self.config.toast_ttl_ms)
    }

    pub fn merged_prompt(&self) -> String {
        self.active_project()
            .map(|p| merge_prompt(p, self.state.active_preset))
            .unwrap_or_default()
    }

    /// Text boxes passing the current search and tag filter.
    pub fn visible_text_boxes(&self) -> Vec<&TextBox> {
        let state = &self.state;
        state
            .active_project()
            .map(|p| filtered_text_boxes(p, &state.search, &state.tag_filter, state.filter_mode))
            .unwrap_or_default()
    }

    pub fn visible_image_boxes(&self) -> Vec<&ImageBox> {
        let state = &self.state;
        state
            .active_project()
            .map(|p| filtered_image_boxes(p, &state.tag_filter, state.filter_mode))
            .unwrap_or_default()
    }

    pub fn palette(&self) -> Vec<PaletteTag> {
        self.active_project()
            .map(|p| palette_tags(p, &self.state.user_prefs.pinned_tags))
            .unwrap_or_default()
    }

    pub fn metrics(&self) -> Option<ProjectMetrics> {
        self.active_project().map(project_metrics)
    }

    fn active_or_err(&self) -> Result<&Project, EngineError> {
        self.active_project().ok_or_else(|| {
            EngineError::ProjectNotFound(
                self.state
                    .active_project_id
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
            )
        })
    }

    /// Report an export outcome as a toast, passing the result through.
    fn announce(
        &mut self,
        result: Result<ExportFile, EngineError>,
        success: &str,
    ) -> Result<ExportFile, EngineError> {
        match &result {
            Ok(_) => {
                self.state.add_toast(success);
            }
            Err(e) => {
                let message = match e {
                    EngineError::EmptyProjectName => "Project name required".to_string(),
                    EngineError::NoTagFilter => "Select tag filters first".to_string(),
                    EngineError::NoTagMatches => "No boxes match tags".to_string(),
                    other => format!("Export failed: {other}"),
                };
                self.state.add_toast(message);
            }
        }
        result
    }

    /// The active project as a `.json` download.
    pub fn save_project(&mut self) -> Result<ExportFile, EngineError> {
        let result = self.active_or_err().and_then(|p| {
            Ok(ExportFile {
                file_name: format!("{}.json", file_stem(&p.name)),
                contents: project_json(p)?.into_bytes(),
            })
        });
        self.announce(result, "Project saved")
    }

    pub fn export_markdown(&mut self) -> Result<ExportFile, EngineError> {
        let preset = self.state.active_preset;
        let result = self.active_or_err().map(|p| ExportFile {
            file_name: format!("{}.md", file_stem(&p.name)),
            contents: project_markdown(p, preset).into_bytes(),
        });
        self.announce(result, "Markdown exported")
    }

    pub fn export_tag_markdown(&mut self) -> Result<ExportFile, EngineError> {
        let state = &self.state;
        let result = self.active_or_err().and_then(|p| {
            Ok(ExportFile {
                file_name: format!("{}_tags.md", file_stem(&p.name)),
                contents: tag_markdown(p, &state.tag_filter, state.filter_mode)?.into_bytes(),
            })
        });
        self.announce(result, "Tag export downloaded")
    }

    pub fn export_bundle(&mut self) -> Result<ExportFile, EngineError> {
        let state = &self.state;
        let result = export_bundle(
            &state.projects,
            state.active_project_id.as_ref(),
            state.active_preset,
        )
        .map(|contents| ExportFile {
            file_name: BUNDLE_FILE_NAME.to_string(),
            contents,
        });
        self.announce(result, "Batch zip exported")
    }
}
