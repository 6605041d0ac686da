//! Load/persist boundary between [`AppState`] and durable storage.

use promptmania_core::{Project, migrate_projects};
use promptmania_storage::Storage;

use crate::config::EditorConfig;
use crate::error::EngineError;
use crate::state::{AppState, UserPrefs};

/// Read and migrate the stored project list. A missing entry is an empty list.
pub fn load_projects<S: Storage>(storage: &S, key: &str) -> Result<Vec<Project>, EngineError> {
    let Some(raw) = storage.get(key)? else {
        return Ok(Vec::new());
    };
    let value: serde_json::Value = serde_json::from_str(&raw)?;
    Ok(migrate_projects(value)?)
}

pub fn load_user_prefs<S: Storage>(storage: &S, key: &str) -> Result<UserPrefs, EngineError> {
    match storage.get(key)? {
        Some(raw) => Ok(serde_json::from_str(&raw)?),
        None => Ok(UserPrefs::default()),
    }
}

/// Build the session state from storage. Unreadable or corrupt entries fall
/// back to defaults with a warning; this never fails.
pub fn load_state<S: Storage>(storage: &S, config: &EditorConfig) -> AppState {
    let projects = load_projects(storage, &config.projects_key).unwrap_or_else(|e| {
        tracing::warn!(error = %e, key = %config.projects_key, "stored projects unreadable, starting fresh");
        Vec::new()
    });
    let prefs = load_user_prefs(storage, &config.prefs_key).unwrap_or_else(|e| {
        tracing::warn!(error = %e, key = %config.prefs_key, "stored preferences unreadable, using defaults");
        UserPrefs::default()
    });
    tracing::debug!(projects = projects.len(), "loaded editor state");
    AppState::new(projects, prefs, config.history.clone())
}

pub fn persist_projects<S: Storage>(
    storage: &mut S,
    key: &str,
    projects: &[Project],
) -> Result<(), EngineError> {
    let json = serde_json::to_string(projects)?;
    storage.put_entry(key, &json)?;
    Ok(())
}

pub fn persist_user_prefs<S: Storage>(
    storage: &mut S,
    key: &str,
    prefs: &UserPrefs,
) -> Result<(), EngineError> {
    let json = serde_json::to_string(prefs)?;
    storage.put_entry(key, &json)?;
    Ok(())
}
