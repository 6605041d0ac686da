use serde::{Deserialize, Serialize};

use crate::boxes::{BoxKind, Category, ImageBox, PromptBox, TextBox};
use crate::clock::{Timestamp, now_ms};
use crate::ids::{BoxId, ProjectId};
use crate::migrate::SCHEMA_VERSION;
use crate::tags;

pub const DEFAULT_PROJECT_NAME: &str = "Untitled Project";

/// Categories of the text boxes a fresh project starts with.
pub const SEED_CATEGORIES: [Category; 4] = [
    Category::Subject,
    Category::Style,
    Category::Background,
    Category::Composition,
];

fn default_name() -> String {
    DEFAULT_PROJECT_NAME.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub created: Timestamp,
    #[serde(default)]
    pub modified: Timestamp,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub boxes: Vec<PromptBox>,
    #[serde(default)]
    pub version: u32,
}

impl Project {
    /// A project at the current schema version with the four seed text boxes.
    pub fn new(name: impl Into<String>) -> Self {
        let now = now_ms();
        Self {
            id: ProjectId::new(),
            name: name.into(),
            created: now,
            modified: now,
            tags: Vec::new(),
            boxes: SEED_CATEGORIES.into_iter().map(PromptBox::new_text).collect(),
            version: SCHEMA_VERSION,
        }
    }

    pub fn text_boxes(&self) -> impl Iterator<Item = &TextBox> {
        self.boxes.iter().filter_map(PromptBox::as_text)
    }

    pub fn image_boxes(&self) -> impl Iterator<Item = &ImageBox> {
        self.boxes.iter().filter_map(PromptBox::as_image)
    }

    pub fn find_box(&self, id: &BoxId) -> Option<&PromptBox> {
        self.boxes.iter().find(|b| b.id() == id)
    }

    pub fn find_box_mut(&mut self, id: &BoxId) -> Option<&mut PromptBox> {
        self.boxes.iter_mut().find(|b| b.id() == id)
    }

    pub fn contains_box(&self, id: &BoxId) -> bool {
        self.find_box(id).is_some()
    }

    /// Stable re-partition into `[text boxes][image boxes]`.
    pub fn partition_boxes(&mut self) {
        let (texts, images): (Vec<_>, Vec<_>) = std::mem::take(&mut self.boxes)
            .into_iter()
            .partition(|b| b.kind() == BoxKind::Text);
        self.boxes = texts;
        self.boxes.extend(images);
    }

    pub fn is_partitioned(&self) -> bool {
        let first_image = self
            .boxes
            .iter()
            .position(|b| b.kind() == BoxKind::Image)
            .unwrap_or(self.boxes.len());
        self.boxes[first_image..]
            .iter()
            .all(|b| b.kind() == BoxKind::Image)
    }

    pub fn touch(&mut self, now: Timestamp) {
        self.modified = now;
    }

    /// Move a box by `delta` places within its own type group. Out-of-range
    /// targets leave the order unchanged and return `false`.
    pub fn move_box(&mut self, id: &BoxId, delta: isize) -> bool {
        let Some(kind) = self.find_box(id).map(PromptBox::kind) else {
            return false;
        };
        let (mut group, others): (Vec<_>, Vec<_>) = std::mem::take(&mut self.boxes)
            .into_iter()
            .partition(|b| b.kind() == kind);
        let from = group.iter().position(|b| b.id() == id).unwrap_or(0);
        let target = (from as isize)
            .checked_add(delta)
            .and_then(|t| usize::try_from(t).ok())
            .filter(|t| *t < group.len() && delta != 0);
        let moved = target.is_some();
        if let Some(target) = target {
            let item = group.remove(from);
            group.insert(target, item);
        }
        self.boxes = match kind {
            BoxKind::Text => group.into_iter().chain(others).collect(),
            BoxKind::Image => others.into_iter().chain(group).collect(),
        };
        moved
    }

    /// Drag-and-drop reorder: move `id` to the slot currently held by `over`.
    /// Both boxes must share a type group.
    pub fn reorder_box(&mut self, id: &BoxId, over: &BoxId) -> bool {
        let (Some(a), Some(b)) = (self.find_box(id), self.find_box(over)) else {
            return false;
        };
        if a.kind() != b.kind() || id == over {
            return false;
        }
        let kind = a.kind();
        let group: Vec<&BoxId> = self
            .boxes
            .iter()
            .filter(|b| b.kind() == kind)
            .map(PromptBox::id)
            .collect();
        let from = group.iter().position(|b| *b == id).unwrap_or(0) as isize;
        let to = group.iter().position(|b| *b == over).unwrap_or(0) as isize;
        self.move_box(id, to - from)
    }

    pub fn add_tag(&mut self, raw: &str) -> bool {
        tags::add_tag(&mut self.tags, raw)
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        tags::remove_tag(&mut self.tags, tag)
    }

    /// A subject text box with blank content marks the project incomplete.
    pub fn subject_missing(&self) -> bool {
        self.text_boxes()
            .any(|b| b.category == Category::Subject && b.is_blank())
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new(DEFAULT_PROJECT_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(p: &Project) -> Vec<String> {
        p.boxes.iter().map(|b| b.id().to_string()).collect()
    }

    fn text(id: &str) -> PromptBox {
        let mut b = TextBox::new(Category::Default);
        b.id = BoxId::from(id);
        PromptBox::Text(b)
    }

    fn image(id: &str) -> PromptBox {
        let mut b = ImageBox::new();
        b.id = BoxId::from(id);
        PromptBox::Image(b)
    }

    #[test]
    fn new_project_has_seed_boxes() {
        let p = Project::new("Fresh");
        assert_eq!(p.version, SCHEMA_VERSION);
        let cats: Vec<Category> = p.text_boxes().map(|b| b.category).collect();
        assert_eq!(cats, SEED_CATEGORIES.to_vec());
        assert_eq!(p.image_boxes().count(), 0);
    }

    #[test]
    fn partition_is_stable() {
        let mut p = Project::new("P");
        p.boxes = vec![image("i1"), text("t1"), image("i2"), text("t2")];
        assert!(!p.is_partitioned());
        p.partition_boxes();
        assert_eq!(ids(&p), vec!["t1", "t2", "i1", "i2"]);
        assert!(p.is_partitioned());
    }

    #[test]
    fn move_within_group() {
        let mut p = Project::new("P");
        p.boxes = vec![text("t1"), text("t2"), text("t3"), image("i1"), image("i2")];
        assert!(p.move_box(&BoxId::from("t3"), -2));
        assert_eq!(ids(&p), vec!["t3", "t1", "t2", "i1", "i2"]);
        assert!(p.move_box(&BoxId::from("i1"), 1));
        assert_eq!(ids(&p), vec!["t3", "t1", "t2", "i2", "i1"]);
    }

    #[test]
    fn move_out_of_range_is_rejected() {
        let mut p = Project::new("P");
        p.boxes = vec![text("t1"), text("t2"), image("i1")];
        assert!(!p.move_box(&BoxId::from("t1"), -1));
        assert!(!p.move_box(&BoxId::from("i1"), 1));
        assert!(!p.move_box(&BoxId::from("missing"), 1));
        assert_eq!(ids(&p), vec!["t1", "t2", "i1"]);
    }

    #[test]
    fn extreme_deltas_are_out_of_range() {
        let mut p = Project::new("P");
        p.boxes = vec![text("t1"), text("t2"), text("t3"), image("i1")];
        for delta in [isize::MAX, isize::MIN, isize::MAX - 1, isize::MIN + 1] {
            assert!(!p.move_box(&BoxId::from("t2"), delta));
            assert!(!p.move_box(&BoxId::from("i1"), delta));
        }
        assert_eq!(ids(&p), vec!["t1", "t2", "t3", "i1"]);
    }

    #[test]
    fn reorder_onto_other_box() {
        let mut p = Project::new("P");
        p.boxes = vec![text("t1"), text("t2"), text("t3"), image("i1")];
        assert!(p.reorder_box(&BoxId::from("t1"), &BoxId::from("t3")));
        assert_eq!(ids(&p), vec!["t2", "t3", "t1", "i1"]);
        assert!(!p.reorder_box(&BoxId::from("t1"), &BoxId::from("i1")));
    }

    #[test]
    fn subject_missing_flags_blank_subject() {
        let mut p = Project::new("P");
        assert!(p.subject_missing());
        if let Some(PromptBox::Text(b)) = p.boxes.first_mut() {
            b.content = "a lighthouse".into();
        }
        assert!(!p.subject_missing());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let p: Project = serde_json::from_str(r#"{"id":"p1"}"#).unwrap();
        assert_eq!(p.name, DEFAULT_PROJECT_NAME);
        assert!(p.boxes.is_empty());
        assert_eq!(p.version, 0);
    }
}
