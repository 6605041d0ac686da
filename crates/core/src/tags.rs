//! Tag helpers shared by boxes and projects.
//!
//! Tags are an ordered, duplicate-free list. Input is normalised (trimmed,
//! lowercased) on insert only; comparisons against stored tags are exact.

/// Trim and lowercase a raw tag. Returns `None` for blank input.
pub fn normalize_tag(raw: &str) -> Option<String> {
    let tag = raw.trim().to_lowercase();
    if tag.is_empty() { None } else { Some(tag) }
}

/// Append `raw` (normalised) unless it is blank or already present.
/// Returns `true` when the list changed.
pub fn add_tag(tags: &mut Vec<String>, raw: &str) -> bool {
    match normalize_tag(raw) {
        Some(tag) if !tags.contains(&tag) => {
            tags.push(tag);
            true
        }
        _ => false,
    }
}

/// Remove an exact stored tag. Returns `true` when the list changed.
pub fn remove_tag(tags: &mut Vec<String>, tag: &str) -> bool {
    let before = tags.len();
    tags.retain(|t| t != tag);
    tags.len() != before
}

/// Drop duplicates while keeping first occurrences in order.
pub fn dedup_tags(tags: &mut Vec<String>) {
    let mut seen = Vec::with_capacity(tags.len());
    tags.retain(|t| {
        if seen.contains(t) {
            false
        } else {
            seen.push(t.clone());
            true
        }
    });
}

/// Deterministic hue in `0..360` for a tag.
pub fn tag_hue(tag: &str) -> u32 {
    let hash = tag
        .encode_utf16()
        .fold(0u32, |h, unit| h.wrapping_mul(31).wrapping_add(unit as u32));
    hash % 360
}

/// CSS colour for rendering a tag chip.
pub fn tag_color(tag: &str) -> String {
    format!("hsl({} 60% 45%)", tag_hue(tag))
}
