pub use crate::history::HistoryConfig;

pub const PROJECTS_KEY: &str = "promptmania.projects.v1";
pub const USER_PREFS_KEY: &str = "promptmania.userprefs.v1";

/// How long a toast stays visible.
pub const TOAST_TTL_MS: i64 = 3_000;
/// How often a host should call [`Editor::sweep_toasts`](crate::Editor::sweep_toasts).
pub const TOAST_SWEEP_INTERVAL_MS: u64 = 1_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    pub history: HistoryConfig,
    pub toast_ttl_ms: i64,
    /// Storage key of the serialized project list.
    pub projects_key: String,
    /// Storage key of the serialized user preferences.
    pub prefs_key: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history: HistoryConfig::default(),
            toast_ttl_ms: TOAST_TTL_MS,
            projects_key: PROJECTS_KEY.to_string(),
            prefs_key: USER_PREFS_KEY.to_string(),
        }
    }
}

impl EditorConfig {
    pub fn with_history(mut self, history: HistoryConfig) -> Self {
        self.history = history;
        self
    }
}
