use promptmania_core::Project;

use crate::filter::tag_frequencies;

/// Summary numbers for the metadata panel.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectMetrics {
    pub text_boxes: usize,
    pub image_boxes: usize,
    pub words: usize,
    /// Length in UTF-16 code units, so astral-plane characters count twice.
    pub chars: usize,
    /// Rough token estimate: one token per four characters.
    pub est_tokens: usize,
    pub avg_weight: f64,
    /// Tags by descending frequency; ties stay alphabetical.
    pub tag_counts: Vec<(String, usize)>,
}

pub fn project_metrics(project: &Project) -> ProjectMetrics {
    let mut text_boxes = 0;
    let mut words = 0;
    let mut chars = 0;
    let mut weight_sum = 0.0;
    for b in project.text_boxes() {
        text_boxes += 1;
        words += b.content.split_whitespace().count();
        chars += b.content.encode_utf16().count();
        weight_sum += b.weight;
    }

    let mut tag_counts: Vec<(String, usize)> = tag_frequencies(project).into_iter().collect();
    tag_counts.sort_by(|a, b| b.1.cmp(&a.1));

    ProjectMetrics {
        text_boxes,
        image_boxes: project.image_boxes().count(),
        words,
        chars,
        est_tokens: (chars as f64 / 4.0).round() as usize,
        avg_weight: if text_boxes == 0 {
            0.0
        } else {
            weight_sum / text_boxes as f64
        },
        tag_counts,
    }
}
