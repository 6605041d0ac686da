pub mod boxes;
pub mod clock;
pub mod error;
pub mod ids;
pub mod merge;
pub mod migrate;
pub mod project;
pub mod rich_text;
pub mod tags;

pub use boxes::{BoxKind, Category, ImageBox, PromptBox, TextBox};
pub use clock::{Timestamp, now_ms};
pub use error::CoreError;
pub use ids::*;
pub use merge::{Preset, format_weight, merge_prompt};
pub use migrate::{SCHEMA_VERSION, migrate_project, migrate_projects};
pub use project::{DEFAULT_PROJECT_NAME, Project, SEED_CATEGORIES};
