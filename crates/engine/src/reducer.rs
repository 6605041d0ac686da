//! The single update channel for [`AppState`].
//!
//! Structural edits to the active project follow one recipe: snapshot history,
//! mutate a copy, re-partition boxes by type, refresh `modified`, swap the copy
//! in. Rejected actions (missing box, last project) leave state untouched apart
//! from an optional toast.

use promptmania_core::{
    BoxId, BoxKind, DEFAULT_PROJECT_NAME, ImageBox, Project, ProjectId, PromptBox, TextBox,
    now_ms,
};

use crate::action::Action;
use crate::config::EditorConfig;
use crate::history::Restored;
use crate::state::AppState;

/// Which persisted slices an action touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Changes {
    pub projects: bool,
    pub prefs: bool,
}

impl Changes {
    pub const NONE: Changes = Changes {
        projects: false,
        prefs: false,
    };

    pub const PROJECTS: Changes = Changes {
        projects: true,
        prefs: false,
    };

    pub const PREFS: Changes = Changes {
        projects: false,
        prefs: true,
    };

    fn projects_if(changed: bool) -> Self {
        if changed { Self::PROJECTS } else { Self::NONE }
    }
}

fn push_history(state: &mut AppState) {
    state
        .history
        .push(&state.projects, state.active_project_id.as_ref());
}

/// Snapshot, then apply `mutate` to a copy of the active project.
fn update_active_project(state: &mut AppState, mutate: impl FnOnce(&mut Project)) -> bool {
    let Some(idx) = state.active_index() else {
        tracing::debug!("no active project to update");
        return false;
    };
    push_history(state);
    let mut project = state.projects[idx].clone();
    mutate(&mut project);
    project.partition_boxes();
    project.touch(now_ms());
    state.projects[idx] = project;
    true
}

fn active_box(state: &AppState, id: &BoxId) -> Option<BoxKind> {
    let kind = state
        .active_project()
        .and_then(|p| p.find_box(id))
        .map(PromptBox::kind);
    if kind.is_none() {
        tracing::debug!(box_id = %id, "action targets a missing box");
    }
    kind
}

fn update_box(state: &mut AppState, id: &BoxId, mutate: impl FnOnce(&mut PromptBox)) -> bool {
    if active_box(state, id).is_none() {
        return false;
    }
    update_active_project(state, |p| {
        if let Some(b) = p.find_box_mut(id) {
            mutate(b);
            b.touch(now_ms());
        }
    })
}

fn update_text_box(state: &mut AppState, id: &BoxId, mutate: impl FnOnce(&mut TextBox)) -> bool {
    if active_box(state, id) != Some(BoxKind::Text) {
        return false;
    }
    update_box(state, id, |b| {
        if let Some(text) = b.as_text_mut() {
            mutate(text);
        }
    })
}

fn update_image_box(state: &mut AppState, id: &BoxId, mutate: impl FnOnce(&mut ImageBox)) -> bool {
    if active_box(state, id) != Some(BoxKind::Image) {
        return false;
    }
    update_box(state, id, |b| {
        if let Some(image) = b.as_image_mut() {
            mutate(image);
        }
    })
}

/// Replace the live project list with a restored snapshot.
fn restore(state: &mut AppState, restored: Restored) {
    state.projects = restored.projects;
    if state.projects.is_empty() {
        state.projects.push(Project::default());
    }
    state.active_project_id = restored
        .active
        .filter(|id| state.projects.iter().any(|p| &p.id == id))
        .or_else(|| state.projects.first().map(|p| p.id.clone()));
}

fn undo(state: &mut AppState) -> Changes {
    match state
        .history
        .undo(&state.projects, state.active_project_id.as_ref())
    {
        Ok(Some(restored)) => {
            restore(state, restored);
            Changes::PROJECTS
        }
        Ok(None) => {
            state.add_toast("Nothing to undo");
            Changes::NONE
        }
        Err(e) => {
            tracing::warn!(error = %e, "undo failed, keeping current state");
            Changes::NONE
        }
    }
}

fn redo(state: &mut AppState) -> Changes {
    match state
        .history
        .redo(&state.projects, state.active_project_id.as_ref())
    {
        Ok(Some(restored)) => {
            restore(state, restored);
            Changes::PROJECTS
        }
        Ok(None) => {
            state.add_toast("Nothing to redo");
            Changes::NONE
        }
        Err(e) => {
            tracing::warn!(error = %e, "redo failed, keeping current state");
            Changes::NONE
        }
    }
}

fn delete_project(state: &mut AppState, id: &ProjectId) -> Changes {
    if state.projects.len() <= 1 {
        state.add_toast("Cannot delete last project");
        return Changes::NONE;
    }
    if state.project(id).is_none() {
        tracing::debug!(project_id = %id, "delete targets a missing project");
        return Changes::NONE;
    }
    push_history(state);
    state.projects.retain(|p| &p.id != id);
    if state.active_project_id.as_ref() == Some(id) {
        state.active_project_id = state.projects.first().map(|p| p.id.clone());
    }
    state.add_toast("Project deleted");
    Changes::PROJECTS
}

fn import_project(state: &mut AppState, mut project: Project) -> Changes {
    if state.project(&project.id).is_some() {
        let fresh = ProjectId::new();
        tracing::debug!(old = %project.id, new = %fresh, "imported project id collides, reassigning");
        project.id = fresh;
    }
    push_history(state);
    let message = format!("Project \"{}\" loaded", project.name);
    state.active_project_id = Some(project.id.clone());
    state.projects.insert(0, project);
    state.add_toast(message);
    Changes::PROJECTS
}

/// Tag the last-focused box, falling back to the project.
fn quick_add_tag(state: &mut AppState, tag: String) -> Changes {
    if tag.trim().is_empty() {
        return Changes::NONE;
    }
    let focused = state
        .last_focused_box_id
        .clone()
        .filter(|id| state.active_project().is_some_and(|p| p.contains_box(id)));

    let changed = match focused {
        Some(id) => {
            let changed = update_box(state, &id, |b| {
                b.add_tag(&tag);
            });
            state.add_toast(format!("Tag '{tag}' added to box"));
            changed
        }
        None => {
            let changed = update_active_project(state, |p| {
                p.add_tag(&tag);
            });
            state.add_toast(format!("Tag '{tag}' added to project"));
            changed
        }
    };
    Changes::projects_if(changed)
}

fn toggle(list: &mut Vec<String>, item: String) -> bool {
    if let Some(pos) = list.iter().position(|t| *t == item) {
        list.remove(pos);
        false
    } else {
        list.push(item);
        true
    }
}

/// Apply one action. The returned [`Changes`] name the slices the caller
/// must persist.
pub fn reduce(state: &mut AppState, action: Action, config: &EditorConfig) -> Changes {
    match action {
        Action::CreateProject { name } => {
            push_history(state);
            let name = name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_PROJECT_NAME.to_string());
            let project = Project::new(name);
            state.active_project_id = Some(project.id.clone());
            state.projects.insert(0, project);
            state.add_toast("New project created");
            Changes::PROJECTS
        }
        Action::SelectProject(id) => {
            match state.project(&id).map(|p| p.name.clone()) {
                Some(name) => {
                    state.active_project_id = Some(id);
                    state.add_toast(format!("Switched to \"{name}\""));
                }
                None => tracing::debug!(project_id = %id, "select targets a missing project"),
            }
            Changes::NONE
        }
        Action::RenameProject(name) => {
            Changes::projects_if(update_active_project(state, |p| p.name = name))
        }
        Action::DeleteProject(id) => delete_project(state, &id),
        Action::AddProjectTag(tag) => Changes::projects_if(update_active_project(state, |p| {
            p.add_tag(&tag);
        })),
        Action::RemoveProjectTag(tag) => Changes::projects_if(update_active_project(state, |p| {
            p.remove_tag(&tag);
        })),
        Action::ClearProjectTags => {
            Changes::projects_if(update_active_project(state, |p| p.tags.clear()))
        }
        Action::ImportProject(project) => import_project(state, project),

        Action::AddTextBox(category) => {
            let b = TextBox::new(category);
            let id = b.id.clone();
            let changed = update_active_project(state, |p| p.boxes.push(PromptBox::Text(b)));
            if changed {
                state.last_focused_box_id = Some(id);
                state.add_toast(format!("{} box added", category.as_str()));
            }
            Changes::projects_if(changed)
        }
        Action::AddImageBox => {
            let changed = update_active_project(state, |p| p.boxes.push(PromptBox::new_image()));
            if changed {
                state.add_toast("Image box added");
            }
            Changes::projects_if(changed)
        }
        Action::DeleteBox(id) => {
            if active_box(state, &id).is_none() {
                return Changes::NONE;
            }
            update_active_project(state, |p| p.boxes.retain(|b| b.id() != &id));
            if state.last_focused_box_id.as_ref() == Some(&id) {
                state.last_focused_box_id = None;
            }
            state.add_toast("Box deleted");
            Changes::PROJECTS
        }
        Action::DuplicateBox(id) => {
            if active_box(state, &id).is_none() {
                return Changes::NONE;
            }
            update_active_project(state, |p| {
                if let Some(copy) = p.find_box(&id).map(|b| b.duplicate(now_ms())) {
                    p.boxes.push(copy);
                }
            });
            state.add_toast("Box duplicated");
            Changes::PROJECTS
        }
        Action::MoveBox { id, delta } => {
            let Some(kind) = active_box(state, &id) else {
                return Changes::NONE;
            };
            let mut moved = false;
            update_active_project(state, |p| moved = p.move_box(&id, delta));
            if moved {
                state.add_toast(match kind {
                    BoxKind::Text => "Box reordered",
                    BoxKind::Image => "Image reordered",
                });
            }
            Changes::PROJECTS
        }
        Action::ReorderBox { id, over } => {
            if id == over {
                return Changes::NONE;
            }
            match (active_box(state, &id), active_box(state, &over)) {
                (Some(a), Some(b)) if a == b => {}
                _ => return Changes::NONE,
            }
            update_active_project(state, |p| {
                p.reorder_box(&id, &over);
            });
            state.add_toast("Box order updated");
            Changes::PROJECTS
        }
        Action::ClearBox(id) => {
            let changed = update_box(state, &id, PromptBox::clear_content);
            if changed {
                state.add_toast("Cleared");
            }
            Changes::projects_if(changed)
        }
        Action::ClearAllBoxes => {
            let changed = update_active_project(state, |p| {
                p.boxes.iter_mut().for_each(PromptBox::clear_content);
            });
            if changed {
                state.add_toast("All boxes cleared");
            }
            Changes::projects_if(changed)
        }
        Action::SetRichText { id, html } => {
            Changes::projects_if(update_text_box(state, &id, |b| b.set_rich_text(html)))
        }
        Action::SetWeight { id, weight } => {
            Changes::projects_if(update_text_box(state, &id, |b| b.set_weight(weight)))
        }
        Action::NudgeWeight { id, delta } => {
            Changes::projects_if(update_text_box(state, &id, |b| b.nudge_weight(delta)))
        }
        Action::AddBoxTag { id, tag } => Changes::projects_if(update_box(state, &id, |b| {
            b.add_tag(&tag);
        })),
        Action::RemoveBoxTag { id, tag } => Changes::projects_if(update_box(state, &id, |b| {
            b.remove_tag(&tag);
        })),
        Action::SetImage {
            id,
            content,
            filename,
        } => {
            let message = match &filename {
                Some(name) => format!("Image \"{name}\" uploaded"),
                None => "Image uploaded".to_string(),
            };
            let changed = update_image_box(state, &id, |b| b.set_image(content, filename));
            if changed {
                state.add_toast(message);
            }
            Changes::projects_if(changed)
        }
        Action::ClearImage(id) => {
            let changed = update_image_box(state, &id, ImageBox::clear);
            if changed {
                state.add_toast("Image cleared");
            }
            Changes::projects_if(changed)
        }
        Action::SetImageDescription { id, description } => {
            Changes::projects_if(update_image_box(state, &id, |b| {
                b.description = if description.is_empty() {
                    None
                } else {
                    Some(description)
                };
            }))
        }
        Action::QuickAddTag(tag) => quick_add_tag(state, tag),
        Action::FocusBox(id) => {
            state.last_focused_box_id = id;
            Changes::NONE
        }

        Action::SetSearch(search) => {
            state.search = search;
            Changes::NONE
        }
        Action::ToggleFilterTag(tag) => {
            toggle(&mut state.tag_filter, tag);
            Changes::NONE
        }
        Action::ToggleFilterMode => {
            state.filter_mode = state.filter_mode.toggled();
            Changes::NONE
        }
        Action::ClearTagFilter => {
            state.tag_filter.clear();
            Changes::NONE
        }
        Action::TogglePinnedTag(tag) => {
            let message_tag = tag.clone();
            let message = if toggle(&mut state.user_prefs.pinned_tags, tag) {
                format!("Pinned '{message_tag}'")
            } else {
                format!("Unpinned '{message_tag}'")
            };
            state.add_toast(message);
            Changes::PREFS
        }
        Action::SetPreset(preset) => {
            state.active_preset = preset;
            Changes::NONE
        }

        Action::Undo => undo(state),
        Action::Redo => redo(state),

        Action::Notify(message) => {
            state.add_toast(message);
            Changes::NONE
        }
        Action::SweepToasts { now } => {
            state.sweep_toasts(now, config.toast_ttl_ms);
            Changes::NONE
        }
    }
}
