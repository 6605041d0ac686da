use serde::{Deserialize, Serialize};

use crate::clock::{Timestamp, now_ms};
use crate::ids::BoxId;
use crate::rich_text::visible_text;
use crate::tags;

pub const MIN_WEIGHT: f64 = 0.0;
pub const MAX_WEIGHT: f64 = 5.0;
pub const WEIGHT_STEP: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Default,
    Subject,
    Style,
    Background,
    Composition,
    Angle,
    Reference,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Self::Default,
        Self::Subject,
        Self::Style,
        Self::Background,
        Self::Composition,
        Self::Angle,
        Self::Reference,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Subject => "subject",
            Self::Style => "style",
            Self::Background => "background",
            Self::Composition => "composition",
            Self::Angle => "angle",
            Self::Reference => "reference",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxKind {
    Text,
    Image,
}

/// Clamp to `[0, 5]` and quantise to one decimal.
pub fn quantize_weight(weight: f64) -> f64 {
    if !weight.is_finite() {
        return MIN_WEIGHT;
    }
    (weight.clamp(MIN_WEIGHT, MAX_WEIGHT) * 10.0).round() / 10.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBox {
    pub id: BoxId,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub position: Timestamp,
    #[serde(default)]
    pub created: Timestamp,
    #[serde(default)]
    pub modified: Timestamp,
    pub content: String,
    #[serde(default)]
    pub rich_text: String,
    pub weight: f64,
    pub tags: Vec<String>,
}

impl TextBox {
    pub fn new(category: Category) -> Self {
        let now = now_ms();
        Self {
            id: BoxId::new(),
            category,
            position: now,
            created: now,
            modified: now,
            content: String::new(),
            rich_text: String::new(),
            weight: 0.0,
            tags: Vec::new(),
        }
    }

    pub fn set_weight(&mut self, weight: f64) {
        self.weight = quantize_weight(weight);
    }

    pub fn nudge_weight(&mut self, delta: f64) {
        self.set_weight(self.weight + delta);
    }

    /// Store the formatted representation and derive the plain-text content
    /// from it.
    pub fn set_rich_text(&mut self, html: impl Into<String>) {
        let html = html.into();
        self.content = visible_text(&html);
        self.rich_text = html;
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.rich_text.clear();
    }

    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageBox {
    pub id: BoxId,
    #[serde(default = "reference_category")]
    pub category: Category,
    #[serde(default)]
    pub position: Timestamp,
    #[serde(default)]
    pub created: Timestamp,
    #[serde(default)]
    pub modified: Timestamp,
    /// Data URL of the image; empty means no image set.
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub tags: Vec<String>,
}

fn reference_category() -> Category {
    Category::Reference
}

impl ImageBox {
    pub fn new() -> Self {
        let now = now_ms();
        Self {
            id: BoxId::new(),
            category: Category::Reference,
            position: now,
            created: now,
            modified: now,
            content: String::new(),
            filename: None,
            description: None,
            tags: Vec::new(),
        }
    }

    pub fn has_image(&self) -> bool {
        !self.content.is_empty()
    }

    pub fn set_image(&mut self, data_url: impl Into<String>, filename: Option<String>) {
        self.content = data_url.into();
        self.filename = filename;
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.filename = None;
    }
}

impl Default for ImageBox {
    fn default() -> Self {
        Self::new()
    }
}

/// One prompt fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PromptBox {
    Text(TextBox),
    Image(ImageBox),
}

impl PromptBox {
    pub fn new_text(category: Category) -> Self {
        Self::Text(TextBox::new(category))
    }

    pub fn new_image() -> Self {
        Self::Image(ImageBox::new())
    }

    pub fn kind(&self) -> BoxKind {
        match self {
            Self::Text(_) => BoxKind::Text,
            Self::Image(_) => BoxKind::Image,
        }
    }

    pub fn id(&self) -> &BoxId {
        match self {
            Self::Text(b) => &b.id,
            Self::Image(b) => &b.id,
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Self::Text(b) => b.category,
            Self::Image(b) => b.category,
        }
    }

    pub fn created(&self) -> Timestamp {
        match self {
            Self::Text(b) => b.created,
            Self::Image(b) => b.created,
        }
    }

    pub fn modified(&self) -> Timestamp {
        match self {
            Self::Text(b) => b.modified,
            Self::Image(b) => b.modified,
        }
    }

    pub fn tags(&self) -> &[String] {
        match self {
            Self::Text(b) => &b.tags,
            Self::Image(b) => &b.tags,
        }
    }

    pub fn tags_mut(&mut self) -> &mut Vec<String> {
        match self {
            Self::Text(b) => &mut b.tags,
            Self::Image(b) => &mut b.tags,
        }
    }

    pub fn add_tag(&mut self, raw: &str) -> bool {
        tags::add_tag(self.tags_mut(), raw)
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        tags::remove_tag(self.tags_mut(), tag)
    }

    pub fn as_text(&self) -> Option<&TextBox> {
        match self {
            Self::Text(b) => Some(b),
            Self::Image(_) => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextBox> {
        match self {
            Self::Text(b) => Some(b),
            Self::Image(_) => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageBox> {
        match self {
            Self::Image(b) => Some(b),
            Self::Text(_) => None,
        }
    }

    pub fn as_image_mut(&mut self) -> Option<&mut ImageBox> {
        match self {
            Self::Image(b) => Some(b),
            Self::Text(_) => None,
        }
    }

    pub fn touch(&mut self, now: Timestamp) {
        match self {
            Self::Text(b) => b.modified = now,
            Self::Image(b) => b.modified = now,
        }
    }

    /// Empty the box's content, keeping its metadata.
    pub fn clear_content(&mut self) {
        match self {
            Self::Text(b) => b.clear(),
            Self::Image(b) => b.content.clear(),
        }
    }

    /// Copy with a fresh id and fresh timestamps.
    pub fn duplicate(&self, now: Timestamp) -> Self {
        let mut copy = self.clone();
        match &mut copy {
            Self::Text(b) => {
                b.id = BoxId::new();
                b.created = now;
                b.modified = now;
                b.position = now;
            }
            Self::Image(b) => {
                b.id = BoxId::new();
                b.created = now;
                b.modified = now;
                b.position = now;
            }
        }
        copy
    }
}
