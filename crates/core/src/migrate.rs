//! Schema migration for persisted and imported projects.
//!
//! Migrations operate on the untyped JSON record so that fields missing from
//! older revisions can be filled in before the typed decode. Steps run
//! progressively: a record at version `n` passes through every step from `n`
//! up to [`SCHEMA_VERSION`].

use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::project::Project;
use crate::tags;

pub const SCHEMA_VERSION: u32 = 2;

type Step = fn(&mut Map<String, Value>);

/// `(from_version, step)` pairs, oldest first.
const STEPS: &[(u32, Step)] = &[(1, v1_to_v2)];

/// Every box gets a `tags` list; text boxes get numeric `weight` and string
/// `content`; image boxes get string `content`.
fn v1_to_v2(project: &mut Map<String, Value>) {
    let boxes = match project.remove("boxes") {
        Some(Value::Array(boxes)) => boxes,
        _ => Vec::new(),
    };
    let boxes = boxes
        .into_iter()
        .map(|mut b| {
            if let Value::Object(obj) = &mut b {
                let tags = match obj.remove("tags") {
                    Some(Value::Array(items)) => items.into_iter().filter(Value::is_string).collect(),
                    _ => Vec::new(),
                };
                obj.insert("tags".into(), Value::Array(tags));

                match obj.get("type").and_then(Value::as_str) {
                    Some("text") => {
                        if !obj.get("weight").is_some_and(Value::is_number) {
                            obj.insert("weight".into(), Value::from(0));
                        }
                        if !obj.get("content").is_some_and(Value::is_string) {
                            obj.insert("content".into(), Value::from(""));
                        }
                    }
                    Some("image") => {
                        if !obj.get("content").is_some_and(Value::is_string) {
                            obj.insert("content".into(), Value::from(""));
                        }
                    }
                    _ => {}
                }
            }
            b
        })
        .collect();
    project.insert("boxes".into(), Value::Array(boxes));
}

fn read_version(project: &Map<String, Value>) -> u32 {
    project
        .get("version")
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite() && *v >= 1.0)
        .map(|v| v as u32)
        .unwrap_or(1)
}

/// Bring a raw project record up to [`SCHEMA_VERSION`].
///
/// A null (absent) record is a hard error. Already-current records only get
/// their version stamp rewritten, duplicate tags dropped and boxes put in
/// text-before-image order.
pub fn migrate_project(raw: Value) -> Result<Project, CoreError> {
    let mut project = match raw {
        Value::Object(map) => map,
        Value::Null => return Err(CoreError::InvalidProject("project record is null".into())),
        other => {
            return Err(CoreError::InvalidProject(format!(
                "expected an object, found {}",
                json_kind(&other)
            )));
        }
    };

    let from = read_version(&project);
    for (step_from, step) in STEPS {
        if from <= *step_from {
            step(&mut project);
        }
    }
    project.insert("version".into(), Value::from(SCHEMA_VERSION));

    let mut project: Project = serde_json::from_value(Value::Object(project))?;
    tags::dedup_tags(&mut project.tags);
    for b in &mut project.boxes {
        tags::dedup_tags(b.tags_mut());
    }
    project.partition_boxes();
    Ok(project)
}

/// Migrate a stored project list.
pub fn migrate_projects(raw: Value) -> Result<Vec<Project>, CoreError> {
    match raw {
        Value::Array(items) => items.into_iter().map(migrate_project).collect(),
        Value::Null => Ok(Vec::new()),
        other => Err(CoreError::InvalidData(format!(
            "expected a project list, found {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boxes::{Category, PromptBox};
    use crate::ids::BoxId;
    use serde_json::json;

    fn legacy() -> Value {
        json!({
            "id": "p1",
            "name": "Legacy",
            "created": 1,
            "modified": 1,
            "tags": [],
            "version": 1,
            "boxes": [
                { "id": "b1", "type": "text", "category": "subject", "position": 1, "created": 1, "modified": 1 },
                { "id": "b2", "type": "image", "category": "reference", "position": 2, "created": 2, "modified": 2 }
            ]
        })
    }

    #[test]
    fn fills_missing_fields_and_bumps_version() {
        let migrated = migrate_project(legacy()).unwrap();
        assert_eq!(migrated.version, SCHEMA_VERSION);

        let text = migrated.find_box(&BoxId::from("b1")).and_then(PromptBox::as_text).unwrap();
        assert_eq!(text.weight, 0.0);
        assert_eq!(text.content, "");
        assert!(text.tags.is_empty());
        assert_eq!(text.category, Category::Subject);

        let image = migrated.find_box(&BoxId::from("b2")).and_then(PromptBox::as_image).unwrap();
        assert_eq!(image.content, "");
        assert!(image.tags.is_empty());
    }

    #[test]
    fn absent_version_is_treated_as_v1() {
        let mut raw = legacy();
        raw.as_object_mut().unwrap().remove("version");
        let migrated = migrate_project(raw).unwrap();
        assert_eq!(migrated.version, SCHEMA_VERSION);
        assert_eq!(migrated.boxes.len(), 2);
    }

    #[test]
    fn replaces_wrongly_typed_fields() {
        let raw = json!({
            "id": "p1",
            "boxes": [
                { "id": "t", "type": "text", "weight": "heavy", "content": 12, "tags": "moody" },
                { "id": "i", "type": "image", "content": null, "tags": ["ok", 3] }
            ]
        });
        let migrated = migrate_project(raw).unwrap();
        let text = migrated.boxes[0].as_text().unwrap();
        assert_eq!(text.weight, 0.0);
        assert_eq!(text.content, "");
        assert!(text.tags.is_empty());
        let image = migrated.boxes[1].as_image().unwrap();
        assert_eq!(image.content, "");
        assert_eq!(image.tags, vec!["ok"]);
    }

    #[test]
    fn keeps_existing_valid_fields() {
        let raw = json!({
            "id": "p1",
            "version": 1,
            "boxes": [{ "id": "t", "type": "text", "weight": 2.5, "content": "fog", "tags": ["mood"] }]
        });
        let migrated = migrate_project(raw).unwrap();
        let text = migrated.boxes[0].as_text().unwrap();
        assert_eq!(text.weight, 2.5);
        assert_eq!(text.content, "fog");
        assert_eq!(text.tags, vec!["mood"]);
    }

    #[test]
    fn duplicate_tags_are_dropped() {
        let raw = json!({
            "id": "p1",
            "tags": ["a", "b", "a"],
            "boxes": [{ "id": "t", "type": "text", "content": "", "weight": 0, "tags": ["x", "x", "y"] }]
        });
        let migrated = migrate_project(raw).unwrap();
        assert_eq!(migrated.tags, vec!["a", "b"]);
        assert_eq!(migrated.boxes[0].tags(), ["x", "y"]);
    }

    #[test]
    fn images_stored_before_text_are_moved_after_it() {
        let raw = json!({
            "id": "p1",
            "boxes": [
                { "id": "i1", "type": "image", "content": "" },
                { "id": "t1", "type": "text", "content": "cat" },
                { "id": "i2", "type": "image", "content": "" },
                { "id": "t2", "type": "text", "content": "dog" }
            ]
        });
        let migrated = migrate_project(raw).unwrap();
        assert!(migrated.is_partitioned());
        let order: Vec<&str> = migrated.boxes.iter().map(|b| b.id().as_str()).collect();
        assert_eq!(order, ["t1", "t2", "i1", "i2"]);
    }

    #[test]
    fn current_version_is_left_alone() {
        let project = Project::new("Current");
        let raw = serde_json::to_value(&project).unwrap();
        assert_eq!(migrate_project(raw).unwrap(), project);
    }

    #[test]
    fn null_input_is_an_error() {
        assert!(matches!(
            migrate_project(Value::Null),
            Err(CoreError::InvalidProject(_))
        ));
        assert!(migrate_project(json!("nope")).is_err());
    }

    #[test]
    fn project_lists_migrate_each_entry() {
        let list = migrate_projects(json!([legacy(), legacy()])).unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.iter().all(|p| p.version == SCHEMA_VERSION));
        assert!(migrate_projects(json!({"id": "x"})).is_err());
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn raw_box() -> impl Strategy<Value = Value> {
            (
                prop_oneof![Just("text"), Just("image")],
                proptest::option::of("[a-z ]{0,12}"),
                proptest::option::of(0u32..=50),
                proptest::option::of(prop::collection::vec("[a-z]{1,6}", 0..4)),
            )
                .prop_map(|(kind, content, weight, tags)| {
                    let mut obj = Map::new();
                    obj.insert("id".into(), Value::from(format!("{kind}-{}", content.clone().unwrap_or_default())));
                    obj.insert("type".into(), Value::from(kind));
                    if let Some(c) = content {
                        obj.insert("content".into(), Value::from(c));
                    }
                    if let Some(w) = weight {
                        obj.insert("weight".into(), Value::from(w as f64 / 10.0));
                    }
                    if let Some(t) = tags {
                        obj.insert("tags".into(), Value::from(t));
                    }
                    Value::Object(obj)
                })
        }

        proptest! {
            #[test]
            fn migration_is_idempotent(
                version in proptest::option::of(Just(1u32)),
                boxes in prop::collection::vec(raw_box(), 0..6),
            ) {
                let mut raw = json!({ "id": "p", "name": "Prop", "boxes": boxes });
                if let Some(v) = version {
                    raw["version"] = Value::from(v);
                }
                let once = migrate_project(raw).unwrap();
                let twice = migrate_project(serde_json::to_value(&once).unwrap()).unwrap();
                prop_assert_eq!(once.version, SCHEMA_VERSION);
                prop_assert_eq!(twice, once);
            }
        }
    }
}
