//! Single-project file format: a pretty-printed JSON project.

use promptmania_core::{Project, migrate_project};
use serde_json::Value;

use crate::error::EngineError;

/// Parse an uploaded project file.
///
/// Text that is not JSON yields [`EngineError::Serialization`]; JSON without
/// an array-typed `boxes` field yields [`EngineError::InvalidProjectFile`].
/// Accepted files are brought up to the current schema.
pub fn parse_project_file(text: &str) -> Result<Project, EngineError> {
    let raw: Value = serde_json::from_str(text)?;
    if !raw.get("boxes").is_some_and(Value::is_array) {
        return Err(EngineError::InvalidProjectFile(
            "missing boxes array".to_string(),
        ));
    }
    Ok(migrate_project(raw)?)
}

/// Serialize a project for saving. A blank name is rejected.
pub fn project_json(project: &Project) -> Result<String, EngineError> {
    if project.name.trim().is_empty() {
        return Err(EngineError::EmptyProjectName);
    }
    Ok(serde_json::to_string_pretty(project)?)
}

/// File name stem for a project: each run of whitespace becomes `_`.
pub fn file_stem(name: &str) -> String {
    let mut stem = String::with_capacity(name.len());
    let mut in_space = false;
    for c in name.chars() {
        if c.is_whitespace() {
            if !in_space {
                stem.push('_');
            }
            in_space = true;
        } else {
            stem.push(c);
            in_space = false;
        }
    }
    stem
}
