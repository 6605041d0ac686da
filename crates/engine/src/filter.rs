//! Tag filtering, search and the tag palette.
//!
//! Filter tags are compared exactly against stored tags.

use std::collections::BTreeMap;

use promptmania_core::tags::tag_color;
use promptmania_core::{ImageBox, Project, TextBox};

use crate::state::FilterMode;

/// An empty filter passes everything.
pub fn passes_tag_filter(tags: &[String], filter: &[String], mode: FilterMode) -> bool {
    if filter.is_empty() {
        return true;
    }
    match mode {
        FilterMode::And => filter.iter().all(|t| tags.contains(t)),
        FilterMode::Or => filter.iter().any(|t| tags.contains(t)),
    }
}

/// Text boxes whose content contains `search` (case-insensitive) and whose
/// tags pass the filter.
pub fn filtered_text_boxes<'a>(
    project: &'a Project,
    search: &str,
    filter: &[String],
    mode: FilterMode,
) -> Vec<&'a TextBox> {
    let needle = search.to_lowercase();
    project
        .text_boxes()
        .filter(|b| needle.is_empty() || b.content.to_lowercase().contains(&needle))
        .filter(|b| passes_tag_filter(&b.tags, filter, mode))
        .collect()
}

/// Image boxes are not searched, only tag-filtered.
pub fn filtered_image_boxes<'a>(
    project: &'a Project,
    filter: &[String],
    mode: FilterMode,
) -> Vec<&'a ImageBox> {
    project
        .image_boxes()
        .filter(|b| passes_tag_filter(&b.tags, filter, mode))
        .collect()
}

/// How many boxes carry each tag.
pub fn tag_frequencies(project: &Project) -> BTreeMap<String, usize> {
    let mut freq = BTreeMap::new();
    for tag in project.boxes.iter().flat_map(|b| b.tags()) {
        *freq.entry(tag.clone()).or_insert(0) += 1;
    }
    freq
}

/// Every box tag in the project, sorted.
pub fn all_tags(project: &Project) -> Vec<String> {
    tag_frequencies(project).into_keys().collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteTag {
    pub tag: String,
    pub count: usize,
    pub pinned: bool,
    /// Chip colour, stable per tag.
    pub color: String,
}

/// Pinned tags first in pin order (even when unused), then the remaining
/// box tags alphabetically.
pub fn palette_tags(project: &Project, pinned: &[String]) -> Vec<PaletteTag> {
    let freq = tag_frequencies(project);
    let pinned_entries = pinned.iter().map(|t| PaletteTag {
        tag: t.clone(),
        count: freq.get(t).copied().unwrap_or(0),
        pinned: true,
        color: tag_color(t),
    });
    let unpinned_entries = freq
        .iter()
        .filter(|(t, _)| !pinned.contains(*t))
        .map(|(t, count)| PaletteTag {
            tag: t.clone(),
            count: *count,
            pinned: false,
            color: tag_color(t),
        });
    pinned_entries.chain(unpinned_entries).collect()
}
