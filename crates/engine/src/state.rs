use serde::{Deserialize, Serialize};

use promptmania_core::{BoxId, Preset, Project, ProjectId, Timestamp, ToastId, now_ms};

use crate::history::{History, HistoryConfig};

/// How multiple selected filter tags combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FilterMode {
    /// A box must carry every selected tag.
    #[default]
    And,
    /// A box must carry at least one selected tag.
    Or,
}

impl FilterMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::And => Self::Or,
            Self::Or => Self::And,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPrefs {
    #[serde(default)]
    pub pinned_tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: ToastId,
    pub message: String,
    pub ts: Timestamp,
}

/// The whole editor state. Exactly one instance exists per session, owned by
/// [`Editor`](crate::Editor).
#[derive(Debug)]
pub struct AppState {
    /// Never empty once constructed.
    pub projects: Vec<Project>,
    pub active_project_id: Option<ProjectId>,
    pub history: History,
    pub toasts: Vec<Toast>,
    pub search: String,
    pub tag_filter: Vec<String>,
    pub filter_mode: FilterMode,
    pub user_prefs: UserPrefs,
    pub last_focused_box_id: Option<BoxId>,
    pub active_preset: Preset,
}

impl AppState {
    /// Build state around a loaded project list. An empty list is seeded with
    /// one fresh project; the first project becomes active.
    pub fn new(mut projects: Vec<Project>, user_prefs: UserPrefs, history: HistoryConfig) -> Self {
        if projects.is_empty() {
            projects.push(Project::default());
        }
        let active_project_id = projects.first().map(|p| p.id.clone());
        Self {
            projects,
            active_project_id,
            history: History::new(history),
            toasts: Vec::new(),
            search: String::new(),
            tag_filter: Vec::new(),
            filter_mode: FilterMode::default(),
            user_prefs,
            last_focused_box_id: None,
            active_preset: Preset::default(),
        }
    }

    /// Default state: a single seeded project.
    pub fn fresh(history: HistoryConfig) -> Self {
        Self::new(Vec::new(), UserPrefs::default(), history)
    }

    pub fn active_index(&self) -> Option<usize> {
        let id = self.active_project_id.as_ref()?;
        self.projects.iter().position(|p| &p.id == id)
    }

    pub fn active_project(&self) -> Option<&Project> {
        self.active_index().map(|i| &self.projects[i])
    }

    pub fn active_project_mut(&mut self) -> Option<&mut Project> {
        let idx = self.active_index()?;
        self.projects.get_mut(idx)
    }

    pub fn project(&self, id: &ProjectId) -> Option<&Project> {
        self.projects.iter().find(|p| &p.id == id)
    }

    pub fn add_toast(&mut self, message: impl Into<String>) -> ToastId {
        let id = ToastId::new();
        self.toasts.push(Toast {
            id: id.clone(),
            message: message.into(),
            ts: now_ms(),
        });
        id
    }

    /// Drop toasts older than `ttl_ms`. Returns how many were removed.
    pub fn sweep_toasts(&mut self, now: Timestamp, ttl_ms: i64) -> usize {
        let before = self.toasts.len();
        self.toasts.retain(|t| now - t.ts < ttl_ms);
        before - self.toasts.len()
    }

    pub fn last_toast(&self) -> Option<&str> {
        self.toasts.last().map(|t| t.message.as_str())
    }
}
