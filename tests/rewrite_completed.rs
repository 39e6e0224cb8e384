// Tests for moving, clearing and vacuuming completed tasks.
use pcheck::model::parse_markdown;
use pcheck::rewrite::{
    add_task, clear_done_section, move_completed_tasks_to_done, normalize, toggle_task_line,
    vacuum_completed,
};

#[test]
fn completed_tasks_become_plain_bullets() {
    let input = "# TODO\n- [ ] First task\n- [x] Second task\n- [x] [HIGH] Third task";
    let result = move_completed_tasks_to_done(input);

    assert_eq!(result.moved_count, 2);
    assert_eq!(
        result.content,
        "# TODO\n- [ ] First task\n\n## COMPLETED\n\n- Second task\n- Third task"
    );
    assert!(!result.content.contains("[HIGH]"));
}

#[test]
fn tasks_from_several_sections_keep_document_order() {
    let input = "# P\n## A\n- [x] a1\n- [ ] a2\n## B\n- [x] b1\n- [x] [LOW] b2\n";
    let result = move_completed_tasks_to_done(input);

    assert_eq!(result.moved_count, 3);
    assert!(result.content.ends_with("## COMPLETED\n\n- a1\n- b1\n- b2"));

    let parsed = parse_markdown(&result.content);
    let a = parsed.find_section("A").unwrap();
    assert_eq!(a.tasks.len(), 1);
    assert_eq!(a.tasks[0].content, "a2");
    assert!(parsed.find_section("B").unwrap().tasks.is_empty());
}

#[test]
fn completed_wins_over_done() {
    let input = "# T\n## TODO\n- [x] new\n## DONE\n- old\n## COMPLETED\n- older";
    let result = move_completed_tasks_to_done(input);

    assert_eq!(
        result.content,
        "# T\n## TODO\n## DONE\n- old\n## COMPLETED\n- new\n- older"
    );
}

#[test]
fn existing_done_is_reused() {
    let result = move_completed_tasks_to_done("# T\n- [x] a\n## DONE\n- b");
    assert_eq!(result.content, "# T\n## DONE\n- a\n- b");
    assert!(!result.content.contains("COMPLETED"));
}

#[test]
fn nothing_to_move_is_a_no_op() {
    let input = "# T\n- [ ] open\n## COMPLETED\n- [x] already there";
    let result = move_completed_tasks_to_done(input);
    assert_eq!(result.moved_count, 0);
    assert_eq!(result.content, input);
}

#[test]
fn nested_completed_task_keeps_its_depth() {
    let result = move_completed_tasks_to_done("# T\n- [ ] parent\n  - [x] child\n## COMPLETED\n");
    assert_eq!(result.moved_count, 1);
    assert!(result.content.contains("## COMPLETED\n\n    - child"));
}

#[test]
fn clear_removes_section_up_to_next_heading() {
    let input = "# T\n## TODO\n- [ ] a\n## COMPLETED\n- x\n- y\n## NOTES\ntext";
    assert_eq!(clear_done_section(input), "# T\n## TODO\n- [ ] a\n## NOTES\ntext");
}

#[test]
fn clear_without_completed_section_changes_nothing() {
    let input = "# T\n- [x] a";
    assert_eq!(clear_done_section(input), input);
}

#[test]
fn vacuum_takes_nested_tasks_along() {
    let result = vacuum_completed("# T\n- [ ] a\n- [x] b\n  - [ ] b1\n- [ ] c");

    assert_eq!(result.content, "# T\n- [ ] a\n- [ ] c");
    assert_eq!(result.removed_count(), 2);
    assert_eq!(result.sections.len(), 1);
    assert_eq!(result.sections[0].name, "T");
    assert_eq!(result.sections[0].lines, vec!["- [x] b", "  - [ ] b1"]);
}

#[test]
fn toggle_flips_only_the_target_line() {
    assert_eq!(
        toggle_task_line("# T\n- [ ] a\n- [ ] b", 1, true).as_deref(),
        Some("# T\n- [x] a\n- [ ] b")
    );
    assert_eq!(toggle_task_line("# T\n- [x] a", 1, false).as_deref(), Some("# T\n- [ ] a"));
    assert!(toggle_task_line("# T\n- [ ] a", 0, true).is_none());
    assert!(toggle_task_line("# T", 5, true).is_none());
}

#[test]
fn add_appends_to_end_of_existing_list() {
    let input = "# TODO\n\n## TODO\n\n- [ ] a\n\n## ICEBOX\n";
    let added = add_task(input, "ICEBOX", "b");
    assert_eq!(
        normalize(&added),
        "# TODO\n\n## TODO\n\n- [ ] a\n\n## ICEBOX\n\n- [ ] b\n"
    );
}

#[test]
fn add_creates_missing_section() {
    let added = add_task("# T\n\n## TODO\n- [ ] a", "LATER", "x");
    assert_eq!(added, "# T\n\n## TODO\n- [ ] a\n\n## LATER\n- [ ] x\n");
}
