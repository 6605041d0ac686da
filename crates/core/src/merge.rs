//! Prompt merging: turns a project's ordered text boxes into one string.

use serde::{Deserialize, Serialize};

use crate::project::Project;

/// Target platform formatting for weighted fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Preset {
    #[default]
    #[serde(rename = "plain")]
    Plain,
    #[serde(rename = "midjourney")]
    Midjourney,
    #[serde(rename = "stable-diffusion")]
    StableDiffusion,
    #[serde(rename = "dalle")]
    Dalle,
}

impl Preset {
    pub const ALL: [Preset; 4] = [
        Self::Plain,
        Self::Midjourney,
        Self::StableDiffusion,
        Self::Dalle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Midjourney => "midjourney",
            Self::StableDiffusion => "stable-diffusion",
            Self::Dalle => "dalle",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == s)
    }

    /// Render one trimmed fragment.
    pub fn format_part(&self, content: &str, weight: f64) -> String {
        if weight <= 0.0 || weight.is_nan() {
            return content.to_string();
        }
        match self {
            Self::Plain | Self::Midjourney => format!("{content}::{}", format_weight(weight)),
            Self::StableDiffusion => format!("({content}:{})", format_weight(weight)),
            Self::Dalle => content.to_string(),
        }
    }
}

/// Render a weight with exactly one fractional digit.
///
/// Exact binary ties (odd multiples of 0.25) round half away from zero, so
/// `1.25` renders as `1.3`; every other value is rounded from its exact
/// decimal expansion.
pub fn format_weight(weight: f64) -> String {
    let quarters = weight * 4.0;
    let is_tie = quarters.fract() == 0.0 && (quarters as i64) % 2 != 0;
    if is_tie {
        format!("{:.1}", (weight * 10.0).round() / 10.0)
    } else {
        format!("{weight:.1}")
    }
}

/// Merge the project's text boxes in sequence order: blank fragments are
/// dropped, the rest are trimmed, formatted per `preset` and joined with
/// `", "`.
pub fn merge_prompt(project: &Project, preset: Preset) -> String {
    project
        .text_boxes()
        .filter_map(|b| {
            let content = b.content.trim();
            if content.is_empty() {
                None
            } else {
                Some(preset.format_part(content, b.weight))
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boxes::{Category, ImageBox, PromptBox, TextBox};
    use crate::ids::BoxId;

    fn project_with(parts: &[(&str, f64)]) -> Project {
        let mut project = Project::new("Test");
        project.boxes = parts
            .iter()
            .enumerate()
            .map(|(idx, (content, weight))| {
                let mut b = TextBox::new(Category::Default);
                b.id = BoxId::from_string(format!("b{idx}"));
                b.content = content.to_string();
                b.weight = *weight;
                PromptBox::Text(b)
            })
            .collect();
        project
    }

    #[test]
    fn joins_parts_with_comma_space() {
        let p = project_with(&[("cat", 0.0), ("dog", 0.0), ("bird", 0.0)]);
        assert_eq!(merge_prompt(&p, Preset::Plain), "cat, dog, bird");
    }

    #[test]
    fn midjourney_weight_rounds_to_one_decimal() {
        let p = project_with(&[("cat", 1.25), ("dog", 0.0)]);
        assert_eq!(merge_prompt(&p, Preset::Midjourney), "cat::1.3, dog");
    }

    #[test]
    fn stable_diffusion_wraps_weighted_parts() {
        let p = project_with(&[("castle", 0.0), ("mist", 2.0)]);
        assert_eq!(merge_prompt(&p, Preset::StableDiffusion), "castle, (mist:2.0)");
    }

    #[test]
    fn dalle_ignores_weights() {
        let p = project_with(&[("sunset", 3.0), ("mountain", 0.0)]);
        assert_eq!(merge_prompt(&p, Preset::Dalle), "sunset, mountain");
    }

    #[test]
    fn skips_empty_content_regardless_of_weight() {
        let p = project_with(&[("", 2.0), ("visible", 1.0)]);
        assert_eq!(merge_prompt(&p, Preset::Plain), "visible::1.0");
    }

    #[test]
    fn trims_and_skips_whitespace_only_parts() {
        let p = project_with(&[("  fog  ", 0.0), ("   ", 4.0), ("\tpier\n", 0.5)]);
        assert_eq!(merge_prompt(&p, Preset::Plain), "fog, pier::0.5");
    }

    #[test]
    fn default_preset_is_plain() {
        let p = project_with(&[("cat", 2.5)]);
        assert_eq!(merge_prompt(&p, Preset::default()), "cat::2.5");
    }

    #[test]
    fn image_boxes_never_contribute() {
        let mut p = project_with(&[("cat", 0.0)]);
        let mut img = ImageBox::new();
        img.content = "data:image/png;base64,AAAA".into();
        p.boxes.push(PromptBox::Image(img));
        assert_eq!(merge_prompt(&p, Preset::Plain), "cat");
    }

    #[test]
    fn empty_project_merges_to_empty_string() {
        let p = project_with(&[]);
        assert_eq!(merge_prompt(&p, Preset::StableDiffusion), "");
    }

    #[test]
    fn weight_formatting() {
        assert_eq!(format_weight(1.25), "1.3");
        assert_eq!(format_weight(0.75), "0.8");
        assert_eq!(format_weight(2.0), "2.0");
        assert_eq!(format_weight(1.2), "1.2");
        assert_eq!(format_weight(4.96), "5.0");
        assert_eq!(format_weight(0.5), "0.5");
    }

    #[test]
    fn preset_names() {
        assert_eq!(
            serde_json::to_string(&Preset::StableDiffusion).unwrap(),
            "\"stable-diffusion\""
        );
        for p in Preset::ALL {
            assert_eq!(Preset::parse(p.as_str()), Some(p));
        }
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn part() -> impl Strategy<Value = (String, f64)> {
            (
                prop_oneof!["[a-z]{1,8}", Just(String::new()), Just("   ".to_string())],
                prop_oneof![Just(0.0), (1u32..=50).prop_map(|n| n as f64 / 10.0)],
            )
        }

        proptest! {
            #[test]
            fn weightless_presets_never_show_suffix(parts in prop::collection::vec(part(), 0..8)) {
                let refs: Vec<(&str, f64)> = parts.iter().map(|(c, w)| (c.as_str(), *w)).collect();
                let p = project_with(&refs);
                let merged = merge_prompt(&p, Preset::Dalle);
                let expected: Vec<&str> = parts
                    .iter()
                    .map(|(c, _)| c.trim())
                    .filter(|c| !c.is_empty())
                    .collect();
                prop_assert_eq!(merged, expected.join(", "));
            }

            #[test]
            fn zero_weights_render_bare(parts in prop::collection::vec("[a-z]{1,8}", 1..8)) {
                let refs: Vec<(&str, f64)> = parts.iter().map(|c| (c.as_str(), 0.0)).collect();
                let p = project_with(&refs);
                for preset in Preset::ALL {
                    prop_assert_eq!(merge_prompt(&p, preset), parts.join(", "));
                }
            }
        }
    }
}
