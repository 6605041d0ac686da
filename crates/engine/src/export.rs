//! Markdown exports and the multi-project zip bundle.

use std::collections::HashSet;
use std::io::{Cursor, Write};

use chrono::{DateTime, Utc};
use promptmania_core::rich_text::html_to_markdown_lite;
use promptmania_core::{Preset, Project, ProjectId, TextBox, Timestamp, format_weight, merge_prompt};
use zip::ZipWriter;
use zip::write::FileOptions;

use crate::error::EngineError;
use crate::filter::passes_tag_filter;
use crate::interchange::file_stem;
use crate::state::FilterMode;

pub const BUNDLE_FILE_NAME: &str = "projects_export.zip";

/// A generated download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub contents: Vec<u8>,
}

fn format_timestamp(ms: Timestamp) -> String {
    match DateTime::<Utc>::from_timestamp_millis(ms) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => ms.to_string(),
    }
}

fn tag_suffix(tags: &[String]) -> String {
    if tags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", tags.join(", "))
    }
}

fn weight_note(weight: f64) -> String {
    if weight > 0.0 {
        format!(" (w:{})", format_weight(weight))
    } else {
        String::new()
    }
}

/// Segment body for Markdown: formatted text when the box has any, else
/// the plain content.
fn segment_markdown(b: &TextBox) -> String {
    if b.rich_text.trim().is_empty() {
        b.content.trim().to_string()
    } else {
        html_to_markdown_lite(&b.rich_text).trim().to_string()
    }
}

/// Full single-project Markdown export.
pub fn project_markdown(project: &Project, preset: Preset) -> String {
    let mut lines = vec![
        format!("# {}", project.name),
        format!("Created: {}", format_timestamp(project.created)),
        format!("Modified: {}", format_timestamp(project.modified)),
    ];
    if !project.tags.is_empty() {
        lines.push(format!("Tags: {}", project.tags.join(", ")));
    }
    lines.push(String::new());

    let texts: Vec<_> = project.text_boxes().collect();
    if !texts.is_empty() {
        lines.push("## Text Segments".to_string());
        for b in texts {
            lines.push(format!(
                "- ({}){}{}: {}",
                b.category.as_str(),
                weight_note(b.weight),
                tag_suffix(&b.tags),
                segment_markdown(b)
            ));
        }
        lines.push(String::new());
    }

    let images: Vec<_> = project.image_boxes().collect();
    if !images.is_empty() {
        lines.push("## Image References".to_string());
        for (i, b) in images.iter().enumerate() {
            lines.push(format!("- Image {}{}", i + 1, tag_suffix(&b.tags)));
        }
        lines.push(String::new());
    }

    lines.push("## Merged Prompt".to_string());
    lines.push("```".to_string());
    lines.push(merge_prompt(project, preset));
    lines.push("```".to_string());
    lines.join("\n")
}

/// Markdown of the text boxes matching the tag filter, one section per
/// selected tag.
pub fn tag_markdown(
    project: &Project,
    filter: &[String],
    mode: FilterMode,
) -> Result<String, EngineError> {
    if filter.is_empty() {
        return Err(EngineError::NoTagFilter);
    }
    let matches: Vec<_> = project
        .text_boxes()
        .filter(|b| passes_tag_filter(&b.tags, filter, mode))
        .collect();
    if matches.is_empty() {
        return Err(EngineError::NoTagMatches);
    }

    let mut lines = Vec::new();
    for tag in filter {
        let group: Vec<_> = matches.iter().filter(|b| b.tags.contains(tag)).collect();
        if group.is_empty() {
            continue;
        }
        lines.push(format!("## {tag}"));
        for b in group {
            lines.push(format!("- {}{}", b.content.trim(), weight_note(b.weight)));
        }
        lines.push(String::new());
    }
    Ok(format!("# {} (Tag Export)\n\n{}", project.name, lines.join("\n")))
}

fn bundle_markdown(project: &Project, preset: Preset) -> String {
    let mut lines = vec![format!("# {}", project.name)];
    if !project.tags.is_empty() {
        lines.push(format!("Tags: {}", project.tags.join(", ")));
    }
    lines.push(String::new());
    for b in project.text_boxes() {
        let weight = if b.weight > 0.0 {
            format!("::{}", format_weight(b.weight))
        } else {
            String::new()
        };
        lines.push(format!("- ({}) {}{}", b.category.as_str(), b.content.trim(), weight));
    }
    lines.push(String::new());
    lines.push("Merged:".to_string());
    lines.push(merge_prompt(project, preset));
    lines.join("\n")
}

fn unique_stem(name: &str, used: &mut HashSet<String>) -> String {
    let base = file_stem(name);
    let mut stem = base.clone();
    let mut n = 2;
    while !used.insert(stem.clone()) {
        stem = format!("{base}_{n}");
        n += 1;
    }
    stem
}

fn archive_io(e: std::io::Error) -> EngineError {
    EngineError::Archive(e.to_string())
}

/// Zip every project as `<stem>.md` plus `<stem>.json`. The active project
/// merges with `preset`, the rest with `plain`. Repeated stems get a numeric
/// suffix.
pub fn export_bundle(
    projects: &[Project],
    active: Option<&ProjectId>,
    preset: Preset,
) -> Result<Vec<u8>, EngineError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default();
    let mut used = HashSet::new();

    for project in projects {
        let stem = unique_stem(&project.name, &mut used);
        let preset = if Some(&project.id) == active {
            preset
        } else {
            Preset::Plain
        };

        zip.start_file(format!("{stem}.md"), options)?;
        zip.write_all(bundle_markdown(project, preset).as_bytes())
            .map_err(archive_io)?;

        zip.start_file(format!("{stem}.json"), options)?;
        let json = serde_json::to_string_pretty(project)?;
        zip.write_all(json.as_bytes()).map_err(archive_io)?;
    }

    let bytes = zip.finish()?.into_inner();
    tracing::debug!(projects = projects.len(), bytes = bytes.len(), "exported project bundle");
    Ok(bytes)
}
