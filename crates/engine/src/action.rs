use promptmania_core::{BoxId, Category, Preset, Project, ProjectId, Timestamp};

/// Every state transition the editor supports. Box- and tag-level actions
/// target the active project.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // Projects
    CreateProject { name: Option<String> },
    SelectProject(ProjectId),
    RenameProject(String),
    DeleteProject(ProjectId),
    AddProjectTag(String),
    RemoveProjectTag(String),
    ClearProjectTags,
    /// A parsed and migrated project file.
    ImportProject(Project),

    // Boxes
    AddTextBox(Category),
    AddImageBox,
    DeleteBox(BoxId),
    DuplicateBox(BoxId),
    /// Keyboard reorder by `delta` places within the box's type group.
    MoveBox { id: BoxId, delta: isize },
    /// Drag-and-drop onto the slot held by `over`.
    ReorderBox { id: BoxId, over: BoxId },
    ClearBox(BoxId),
    ClearAllBoxes,
    SetRichText { id: BoxId, html: String },
    SetWeight { id: BoxId, weight: f64 },
    NudgeWeight { id: BoxId, delta: f64 },
    AddBoxTag { id: BoxId, tag: String },
    RemoveBoxTag { id: BoxId, tag: String },
    SetImage { id: BoxId, content: String, filename: Option<String> },
    ClearImage(BoxId),
    SetImageDescription { id: BoxId, description: String },
    /// Tag the last-focused box, or the project when nothing has focus.
    QuickAddTag(String),
    FocusBox(Option<BoxId>),

    // View
    SetSearch(String),
    ToggleFilterTag(String),
    ToggleFilterMode,
    ClearTagFilter,
    TogglePinnedTag(String),
    SetPreset(Preset),

    // History
    Undo,
    Redo,

    // Notifications
    Notify(String),
    SweepToasts { now: Timestamp },
}
