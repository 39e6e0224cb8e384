// Tests for the command workflows against files in a throwaway workspace.
use pcheck::config::Config;
use pcheck::context::TestContext;
use pcheck::controller::{ChecklistController, MergeOptions, Template, UpdateOptions};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

fn setup() -> (TestContext, ChecklistController, PathBuf) {
    let ctx = TestContext::new();
    let workspace = ctx.workspace();
    let controller = ChecklistController::new(Arc::new(ctx.clone()), Config::default());
    (ctx, controller, workspace)
}

#[test]
fn init_refuses_to_overwrite_without_force() {
    let (_ctx, controller, ws) = setup();

    let path = controller.init(&ws, Template::Default, false).unwrap();
    assert_eq!(path, ws.join("TODO.md"));
    assert_eq!(fs::read_to_string(&path).unwrap(), "# TODO\n\n## TODO\n\n## ICEBOX\n\n## COMPLETED\n");

    let err = controller.init(&ws, Template::Gtd, false).unwrap_err();
    assert!(err.to_string().contains("already exists. Use --force to overwrite."));

    controller.init(&ws, Template::Gtd, true).unwrap();
    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("<!-- Active tasks that need to be done -->"));
}

#[test]
fn template_names_parse_case_insensitively() {
    assert_eq!("GTD".parse::<Template>().unwrap(), Template::Gtd);
    assert_eq!("default".parse::<Template>().unwrap(), Template::Default);
    assert!("kanban".parse::<Template>().is_err());
}

#[test]
fn add_creates_missing_file() {
    let (_ctx, controller, ws) = setup();
    let file = ws.join("TODO.md");

    let outcome = controller.add(&file, None, "Fix login", Some("p0")).unwrap();
    assert!(outcome.created_file);
    assert_eq!(outcome.section, "TODO");
    assert_eq!(outcome.task, "[HIGH] Fix login");
    assert_eq!(
        fs::read_to_string(&file).unwrap(),
        "# TODO\n\n## TODO\n\n- [ ] [HIGH] Fix login\n"
    );
}

#[test]
fn add_to_new_section_of_existing_file() {
    let (_ctx, controller, ws) = setup();
    let file = ws.join("TODO.md");
    fs::write(&file, "# TODO\n\n## TODO\n\n- [ ] a\n").unwrap();

    let outcome = controller.add(&file, Some("later"), "b", None).unwrap();
    assert!(!outcome.created_file);
    assert_eq!(outcome.section, "LATER");
    assert_eq!(
        fs::read_to_string(&file).unwrap(),
        "# TODO\n\n## TODO\n\n- [ ] a\n\n## LATER\n- [ ] b\n"
    );
}

#[test]
fn add_rejects_bad_input() {
    let (_ctx, controller, ws) = setup();
    let file = ws.join("TODO.md");
    assert!(controller.add(&file, None, "   ", None).is_err());
    assert!(controller.add(&file, None, "x", Some("whenever")).is_err());
    assert!(!file.exists());
}

#[test]
fn private_file_lives_in_private_dir() {
    let (ctx, controller, _ws) = setup();
    let file = controller.private_file().unwrap();
    assert_eq!(file, ctx.root.join("private").join("TODO.md"));

    controller.add(&file, None, "personal", None).unwrap();
    assert!(file.exists());
}

#[test]
fn check_toggles_by_id() {
    let (_ctx, controller, ws) = setup();
    let file = ws.join("TODO.md");
    fs::write(&file, "# TODO\n\n## TODO\n\n- [ ] a\n  - [ ] b\n").unwrap();

    let listed = controller.list(&ws).unwrap();
    assert_eq!(listed.len(), 1);
    let child = &listed[0].items[0].children[0];
    assert_eq!(child.content, "b");
    let id = child.id.clone();

    let outcome = controller.check(&ws, &id, false).unwrap();
    assert!(!outcome.was_checked);
    assert!(outcome.checked);
    assert_eq!(outcome.line, 6);
    assert_eq!(
        fs::read_to_string(&file).unwrap(),
        "# TODO\n\n## TODO\n\n- [ ] a\n  - [x] b\n"
    );

    // Toggling leaves the text alone, so the ID still resolves.
    let outcome = controller.check(&ws, &id, false).unwrap();
    assert!(!outcome.checked);

    let outcome = controller.check(&ws, &id, true).unwrap();
    assert!(!outcome.was_checked && !outcome.checked);

    assert!(controller.check(&ws, "deadbeef", false).is_err());
}

#[test]
fn update_moves_completed_tasks() {
    let (_ctx, controller, ws) = setup();
    let file = ws.join("TODO.md");
    fs::write(&file, "# TODO\n\n## TODO\n\n- [ ] a\n- [x] b\n").unwrap();

    let options = UpdateOptions {
        completed: true,
        ..UpdateOptions::default()
    };
    let outcome = controller.update(&file, &options).unwrap();
    assert!(outcome.rejected.is_none());
    assert_eq!(outcome.operations, vec!["moved 1 completed tasks"]);
    assert_eq!(
        fs::read_to_string(&file).unwrap(),
        "# TODO\n\n## TODO\n\n- [ ] a\n\n## COMPLETED\n\n- b\n"
    );
}

#[test]
fn update_vacuum_reports_removed_lines() {
    let (_ctx, controller, ws) = setup();
    let file = ws.join("TODO.md");
    fs::write(&file, "# TODO\n- [x] gone\n- [ ] stays\n").unwrap();

    let options = UpdateOptions {
        vacuum: true,
        ..UpdateOptions::default()
    };
    let outcome = controller.update(&file, &options).unwrap();
    assert_eq!(outcome.vacuumed.len(), 1);
    assert_eq!(outcome.vacuumed[0].lines, vec!["- [x] gone"]);
    assert_eq!(fs::read_to_string(&file).unwrap(), "# TODO\n\n- [ ] stays\n");
}

#[test]
fn update_stops_on_validation_errors() {
    let (_ctx, controller, ws) = setup();
    let file = ws.join("TODO.md");
    let original = "# TODO\n- [x] a\tb\n";
    fs::write(&file, original).unwrap();

    let options = UpdateOptions {
        completed: true,
        ..UpdateOptions::default()
    };
    let outcome = controller.update(&file, &options).unwrap();
    assert!(outcome.rejected.is_some_and(|r| !r.valid));
    assert_eq!(fs::read_to_string(&file).unwrap(), original);

    let forced = UpdateOptions {
        skip_validation: true,
        ..options
    };
    let outcome = controller.update(&file, &forced).unwrap();
    assert!(outcome.rejected.is_none());
    assert!(fs::read_to_string(&file).unwrap().contains("## COMPLETED"));
}

#[test]
fn rejected_update_leaves_file_alone() {
    let (_ctx, controller, ws) = setup();
    let file = ws.join("TODO.md");
    let original = "# TODO\n- [ ] [LOW] b\n- [ ] [HIGH] a\tc\n";
    fs::write(&file, original).unwrap();

    let options = UpdateOptions {
        sort: true,
        code: true,
        ..UpdateOptions::default()
    };
    let outcome = controller.update(&file, &options).unwrap();
    assert!(outcome.rejected.is_some());
    assert!(outcome.operations.is_empty());
    assert_eq!(fs::read_to_string(&file).unwrap(), original);
}

#[test]
fn update_without_flags_suggests() {
    let (_ctx, controller, ws) = setup();
    let file = ws.join("TODO.md");
    let original = "# TODO\n- [ ] [HIGH] a\n- [x] b\n";
    fs::write(&file, original).unwrap();

    let outcome = controller.update(&file, &UpdateOptions::default()).unwrap();
    assert_eq!(outcome.suggestions.len(), 3);
    assert!(outcome.operations.is_empty());
    assert_eq!(fs::read_to_string(&file).unwrap(), original);
}

#[test]
fn update_pulls_items_from_code() {
    let (_ctx, controller, ws) = setup();
    let file = ws.join("TODO.md");
    fs::write(&file, "# Project\n\n## TODO\n\n- [ ] a\n").unwrap();
    fs::create_dir_all(ws.join("src")).unwrap();
    fs::write(ws.join("src/main.rs"), "// - [ ] wire logging\nfn main() {}\n").unwrap();

    let options = UpdateOptions {
        code: true,
        ..UpdateOptions::default()
    };
    let outcome = controller.update(&file, &options).unwrap();
    assert_eq!(outcome.operations, vec!["added 1 checklist items from code"]);
    assert_eq!(
        fs::read_to_string(&file).unwrap(),
        "# Project\n\n## TODO\n\n- [ ] a\n- [ ] wire logging\n"
    );
}

#[test]
fn merge_collects_subdirectory_files() {
    let (_ctx, controller, ws) = setup();
    for (dir, name, content) in [
        ("a", "TODO.md", "# A\n## TODO\n- [ ] a1"),
        ("b", "todo.md", "# B\n## ICEBOX\n- [ ] idea"),
        ("c", "TODO.md", "# C\n"),
        ("node_modules/pkg", "TODO.md", "# Vendored\n## TODO\n- [ ] not ours"),
    ] {
        fs::create_dir_all(ws.join(dir)).unwrap();
        fs::write(ws.join(dir).join(name), content).unwrap();
    }
    let target = ws.join("TODO.md");

    let preview = controller
        .merge(
            &ws,
            &MergeOptions {
                dry_run: true,
                ..MergeOptions::default()
            },
        )
        .unwrap();
    assert!(!preview.written);
    assert!(!target.exists());
    let labels: Vec<&str> = preview.sources.iter().map(|f| f.relative.as_str()).collect();
    assert_eq!(labels, vec!["a/TODO.md", "b/todo.md", "c/TODO.md"]);

    let report = controller
        .merge(
            &ws,
            &MergeOptions {
                skip_empty: true,
                remove_sources: true,
                ..MergeOptions::default()
            },
        )
        .unwrap();
    assert!(report.written);
    assert_eq!(report.sources.len(), 2);
    assert_eq!(report.outcome.task_count(), 2);

    let merged = fs::read_to_string(&target).unwrap();
    assert!(merged.contains("- [ ] a1"));
    assert!(merged.contains("- [ ] idea"));
    assert!(!merged.contains("not ours"));
    assert!(!ws.join("a/TODO.md").exists());
    assert!(!ws.join("b/todo.md").exists());
    assert!(ws.join("c/TODO.md").exists());
}

#[test]
fn validate_reports_unreadable_files() {
    let (_ctx, controller, ws) = setup();
    let results = controller.validate(&[ws.join("missing.md")]);
    assert_eq!(results.len(), 1);
    let (_, result) = &results[0];
    assert!(!result.valid);
    assert!(result.errors[0].message.starts_with("Failed to read file:"));
}

#[test]
fn scan_filters_checked_items() {
    let (_ctx, controller, ws) = setup();
    fs::write(ws.join("lib.py"), "# - [x] done thing\n# - [ ] open thing\n").unwrap();
    fs::write(ws.join("notes.txt"), "- [ ] not code\n").unwrap();

    assert_eq!(controller.scan(&ws, false).unwrap().len(), 2);
    let open = controller.scan(&ws, true).unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].content, "open thing");
    assert_eq!(open[0].line, 2);
    assert_eq!(open[0].language, "py");
}
