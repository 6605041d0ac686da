pub mod action;
pub mod config;
pub mod editor;
pub mod error;
pub mod export;
pub mod filter;
pub mod history;
pub mod interchange;
pub mod metrics;
pub mod reducer;
pub mod state;
pub mod store;

pub use action::Action;
pub use config::{EditorConfig, PROJECTS_KEY, TOAST_SWEEP_INTERVAL_MS, TOAST_TTL_MS, USER_PREFS_KEY};
pub use editor::Editor;
pub use error::EngineError;
pub use export::{ExportFile, export_bundle, project_markdown, tag_markdown};
pub use filter::{PaletteTag, passes_tag_filter};
pub use history::{History, HistoryConfig, Restored, Snapshot, compress_projects, decompress_projects};
pub use interchange::{file_stem, parse_project_file, project_json};
pub use metrics::{ProjectMetrics, project_metrics};
pub use reducer::{Changes, reduce};
pub use state::{AppState, FilterMode, Toast, UserPrefs};
pub use store::{load_state, persist_projects, persist_user_prefs};
