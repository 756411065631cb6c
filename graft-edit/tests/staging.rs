//! Staged apply, commit refusal, and patch rendering.

use camino::{Utf8Path, Utf8PathBuf};
use graft_domain::{FsSourceView, MemorySourceView, plan_change};
use graft_edit::{EditError, StagedTree};
use graft_types::change::{Change, ConfigEntry};
use graft_types::plan::EditPlan;
use pretty_assertions::assert_eq;

const ENV: &str = "src/environments/environment.ts";

fn firebase_field() -> Change {
    Change::AppendObjectField {
        declarator: Some("environment".to_string()),
        key: "firebase".to_string(),
        entries: vec![ConfigEntry::new("apiKey", "X")],
    }
}

fn env_view() -> MemorySourceView {
    MemorySourceView::new().with_file(ENV, "export const environment = { production: false };\n")
}

#[test]
fn apply_insert_updates_staged_text_and_history() {
    let view = env_view();
    let mut tree = StagedTree::new(&view);
    let path = Utf8Path::new(ENV);

    let plan = plan_change(tree.unit(path).unwrap(), &firebase_field()).unwrap();
    let result = tree.apply(&plan).unwrap();

    assert!(result.applied);
    assert_eq!(
        result.final_text,
        "export const environment = { production: false,\n  firebase: {\n    apiKey: 'X',\n  } };\n"
    );
    assert_eq!(tree.history(path).len(), 1);
    assert_eq!(tree.changes().len(), 1);
    assert_eq!(tree.changes()[0].edits, 1);
}

#[test]
fn second_plan_against_staged_text_is_noop() {
    let view = env_view();
    let mut tree = StagedTree::new(&view);
    let path = Utf8Path::new(ENV);

    let first = plan_change(tree.unit(path).unwrap(), &firebase_field()).unwrap();
    let once = tree.apply(&first).unwrap().final_text;

    let second = plan_change(tree.unit(path).unwrap(), &firebase_field()).unwrap();
    assert!(second.is_noop());
    let result = tree.apply(&second).unwrap();
    assert!(!result.applied);
    assert_eq!(result.final_text, once);
    assert_eq!(tree.history(path).len(), 1);
}

#[test]
fn corrupting_edit_is_refused_and_text_kept() {
    let view = env_view();
    let mut tree = StagedTree::new(&view);
    let path = Utf8Path::new(ENV);
    let before = tree.text(path).unwrap().to_string();

    let plan = EditPlan::Insert {
        target: Utf8PathBuf::from(ENV),
        offset: before.find('}').unwrap(),
        insert_text: ", {{".to_string(),
        rationale: "broken".to_string(),
    };
    let err = tree.apply(&plan).unwrap_err();

    assert!(matches!(err, EditError::WouldCorrupt { .. }));
    assert_eq!(tree.text(path).unwrap(), before);
    assert!(tree.history(path).is_empty());
    assert!(tree.changes().is_empty());
}

#[test]
fn offset_past_end_is_rejected() {
    let view = env_view();
    let mut tree = StagedTree::new(&view);
    let plan = EditPlan::Insert {
        target: Utf8PathBuf::from(ENV),
        offset: 10_000,
        insert_text: "x".to_string(),
        rationale: "out of range".to_string(),
    };
    assert!(matches!(
        tree.apply(&plan).unwrap_err(),
        EditError::OffsetOutOfBounds { offset: 10_000, .. }
    ));
}

#[test]
fn missing_file_is_target_missing() {
    let view = MemorySourceView::new();
    let mut tree = StagedTree::new(&view);
    let err = tree.unit(Utf8Path::new(ENV)).unwrap_err();
    assert!(err.is_target_missing());
    assert!(!tree.exists(Utf8Path::new(ENV)));
}

#[test]
fn dropped_recorder_discards_edits() {
    let view = env_view();
    let mut tree = StagedTree::new(&view);
    let path = Utf8Path::new(ENV);
    {
        let mut recorder = tree.begin(path).unwrap();
        recorder.insert(0, "// header\n", "header").unwrap();
        assert!(recorder.text().starts_with("// header"));
    }
    assert!(!tree.text(path).unwrap().starts_with("// header"));

    let mut recorder = tree.begin(path).unwrap();
    recorder.insert(0, "// header\n", "header").unwrap();
    assert!(recorder.commit().unwrap().applied);
    assert!(tree.text(path).unwrap().starts_with("// header"));
}

#[test]
fn json_files_are_checked_on_commit() {
    let view = MemorySourceView::new().with_file("package.json", "{\n  \"name\": \"app\"\n}\n");
    let mut tree = StagedTree::new(&view);
    let path = Utf8Path::new("package.json");

    let mut recorder = tree.begin(path).unwrap();
    recorder.replace_all("{ \"name\": ", "truncate");
    assert!(matches!(
        recorder.commit().unwrap_err(),
        EditError::WouldCorrupt { .. }
    ));

    let mut recorder = tree.begin(path).unwrap();
    recorder.replace_all("{\n  \"name\": \"app\",\n  \"private\": true\n}\n", "mark private");
    recorder.commit().unwrap();

    let history = tree.history(path);
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].removed, 0);
    assert_eq!(history[0].inserted, ",\n  \"private\": true");
}

#[test]
fn render_patch_shows_changed_files_only() {
    let view = env_view().with_file("src/main.ts", "console.log(1);\n");
    let mut tree = StagedTree::new(&view);
    tree.text(Utf8Path::new("src/main.ts")).unwrap();
    let plan = plan_change(tree.unit(Utf8Path::new(ENV)).unwrap(), &firebase_field()).unwrap();
    tree.apply(&plan).unwrap();

    let patch = tree.render_patch();
    assert!(patch.contains("--- a/src/environments/environment.ts"));
    assert!(patch.contains("+  firebase: {"));
    assert!(!patch.contains("src/main.ts"));
}

#[test]
fn fs_view_backs_the_tree_without_writing() {
    let td = tempfile::tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(td.path().to_path_buf()).unwrap();
    std::fs::create_dir_all(root.join("src/environments")).unwrap();
    let original = "export const environment = {};\n";
    std::fs::write(root.join(ENV), original).unwrap();

    let view = FsSourceView::new(root.clone());
    let mut tree = StagedTree::new(&view);
    let plan = plan_change(tree.unit(Utf8Path::new(ENV)).unwrap(), &firebase_field()).unwrap();
    let result = tree.apply(&plan).unwrap();

    assert_eq!(
        result.final_text,
        "export const environment = {\n  firebase: {\n    apiKey: 'X',\n  }};\n"
    );
    assert_eq!(std::fs::read_to_string(root.join(ENV)).unwrap(), original);
}

mod props {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn replace_all_records_a_splice_that_rebuilds_the_new_text(
            old in "[a-z \u{e9}]{0,24}",
            new in "[a-z \u{e9}]{0,24}",
        ) {
            let view = MemorySourceView::new().with_file("notes.txt", old.clone());
            let mut tree = StagedTree::new(&view);
            let path = Utf8Path::new("notes.txt");

            let mut recorder = tree.begin(path).unwrap();
            recorder.replace_all(&new, "rewrite");
            recorder.commit().unwrap();

            prop_assert_eq!(tree.text(path).unwrap(), new.as_str());
            match tree.history(path) {
                [] => prop_assert_eq!(&old, &new),
                [record] => {
                    let mut rebuilt = old.clone();
                    rebuilt.replace_range(record.offset..record.offset + record.removed, &record.inserted);
                    prop_assert_eq!(rebuilt, new);
                }
                more => prop_assert!(false, "expected one record, got {}", more.len()),
            }
        }
    }
}
