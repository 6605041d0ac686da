use std::io::{Cursor, Read};

use promptmania_core::{Category, Preset, Project};
use promptmania_engine::{Action, parse_project_file};
use promptmania_harness::TestSession;

type TestResult = Result<(), Box<dyn std::error::Error>>;

/// A session whose active project is "Night Market" with three tagged boxes.
fn market() -> Result<TestSession, Box<dyn std::error::Error>> {
    let mut session = TestSession::new()?;
    session.clear_seed_boxes()?;
    session.dispatch(Action::RenameProject("Night Market".into()))?;
    let lanterns = session.add_text(Category::Subject, "paper lanterns", 1.5)?;
    let rain = session.add_text(Category::Background, "light rain", 0.0)?;
    session.add_text(Category::Style, "", 0.0)?;
    session.dispatch(Action::AddBoxTag { id: lanterns.clone(), tag: "light".into() })?;
    session.dispatch(Action::AddBoxTag { id: rain, tag: "weather".into() })?;
    Ok(session)
}

// ============================================================================
// Project file
// ============================================================================

#[test]
fn saved_project_reloads_identically() -> TestResult {
    let mut session = market()?;
    let file = session.editor.save_project()?;
    assert_eq!(file.file_name, "Night_Market.json");
    assert_eq!(session.last_toast(), Some("Project saved"));

    let parsed: Project = parse_project_file(std::str::from_utf8(&file.contents)?)?;
    assert_eq!(&parsed, session.active()?);
    Ok(())
}

#[test]
fn saving_a_blank_name_is_refused() -> TestResult {
    let mut session = TestSession::new()?;
    session.dispatch(Action::RenameProject("   ".into()))?;
    assert!(session.editor.save_project().is_err());
    assert_eq!(session.last_toast(), Some("Project name required"));
    Ok(())
}

// ============================================================================
// Markdown
// ============================================================================

#[test]
fn markdown_export_lists_segments_and_merge() -> TestResult {
    let mut session = market()?;
    session.dispatch(Action::SetPreset(Preset::StableDiffusion))?;
    let file = session.editor.export_markdown()?;
    assert_eq!(file.file_name, "Night_Market.md");

    let md = String::from_utf8(file.contents)?;
    assert!(md.starts_with("# Night Market\nCreated: "));
    assert!(md.contains("## Text Segments\n"));
    assert!(md.contains("- (subject) (w:1.5) [light]: paper lanterns\n"));
    assert!(md.contains("- (background) [weather]: light rain\n"));
    assert!(!md.contains("## Image References"));
    assert!(md.ends_with("## Merged Prompt\n```\n(paper lanterns:1.5), light rain\n```"));
    assert_eq!(session.last_toast(), Some("Markdown exported"));
    Ok(())
}

#[test]
fn markdown_export_numbers_images() -> TestResult {
    let mut session = market()?;
    let id = session.add_image("data:image/png;base64,AAAA", Some("a.png"))?;
    session.dispatch(Action::AddBoxTag { id, tag: "ref".into() })?;
    session.add_image("data:image/png;base64,BBBB", None)?;

    let md = String::from_utf8(session.editor.export_markdown()?.contents)?;
    assert!(md.contains("## Image References\n- Image 1 [ref]\n- Image 2\n"));
    Ok(())
}

#[test]
fn tag_export_groups_by_selected_tag() -> TestResult {
    let mut session = market()?;
    session.dispatch(Action::ToggleFilterTag("light".into()))?;
    session.dispatch(Action::ToggleFilterTag("weather".into()))?;
    session.dispatch(Action::ToggleFilterMode)?;

    let file = session.editor.export_tag_markdown()?;
    assert_eq!(file.file_name, "Night_Market_tags.md");
    let md = String::from_utf8(file.contents)?;
    assert_eq!(
        md,
        "# Night Market (Tag Export)\n\n## light\n- paper lanterns (w:1.5)\n\n## weather\n- light rain\n"
    );
    assert_eq!(session.last_toast(), Some("Tag export downloaded"));
    Ok(())
}

#[test]
fn tag_export_needs_a_filter_and_a_match() -> TestResult {
    let mut session = market()?;
    assert!(session.editor.export_tag_markdown().is_err());
    assert_eq!(session.last_toast(), Some("Select tag filters first"));

    session.dispatch(Action::ToggleFilterTag("light".into()))?;
    session.dispatch(Action::ToggleFilterTag("weather".into()))?;
    assert!(session.editor.export_tag_markdown().is_err());
    assert_eq!(session.last_toast(), Some("No boxes match tags"));
    Ok(())
}

// ============================================================================
// Bundle
// ============================================================================

fn read_entry(
    archive: &mut zip::ZipArchive<Cursor<Vec<u8>>>,
    name: &str,
) -> Result<String, Box<dyn std::error::Error>> {
    let mut text = String::new();
    archive.by_name(name)?.read_to_string(&mut text)?;
    Ok(text)
}

#[test]
fn bundle_holds_markdown_and_json_per_project() -> TestResult {
    let mut session = market()?;
    session.dispatch(Action::SetPreset(Preset::Midjourney))?;
    session.dispatch(Action::CreateProject { name: Some("Night Market".into()) })?;
    let original = session.editor.state().projects[1].id.clone();
    session.dispatch(Action::SelectProject(original))?;

    let file = session.editor.export_bundle()?;
    assert_eq!(file.file_name, "projects_export.zip");
    assert_eq!(session.last_toast(), Some("Batch zip exported"));

    let mut archive = zip::ZipArchive::new(Cursor::new(file.contents))?;
    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "Night_Market.json",
            "Night_Market.md",
            "Night_Market_2.json",
            "Night_Market_2.md",
        ]
    );

    // The new project sits first; the original, active one gets the `_2` stem.
    let active_md = read_entry(&mut archive, "Night_Market_2.md")?;
    assert!(active_md.contains("- (subject) paper lanterns::1.5\n"));
    assert!(active_md.ends_with("Merged:\npaper lanterns::1.5, light rain"));

    let json = read_entry(&mut archive, "Night_Market_2.json")?;
    let project: Project = serde_json::from_str(&json)?;
    assert_eq!(&project, session.active()?);
    Ok(())
}
