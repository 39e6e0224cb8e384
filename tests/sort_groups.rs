// Tests for priority sorting of task lists and whole documents.
use pcheck::model::{ParsedTask, parse_markdown};
use pcheck::rewrite::{sort_document, sort_tasks_by_priority};

fn tasks(doc: &str) -> Vec<ParsedTask> {
    parse_markdown(doc).tasks().cloned().collect()
}

fn contents(tasks: &[ParsedTask]) -> Vec<&str> {
    tasks.iter().map(|t| t.content.as_str()).collect()
}

#[test]
fn named_priorities_sort_before_untagged() {
    let input = tasks("# T\n- [ ] none\n- [ ] [HIGH] h\n- [ ] [MID] m\n- [ ] [LOW] l");
    let weights: Vec<u32> = input.iter().map(|t| t.priority_value).collect();
    assert_eq!(weights, vec![100, 1, 5, 10]);

    let sorted = sort_tasks_by_priority(&input);
    assert_eq!(contents(&sorted), vec!["[HIGH] h", "[MID] m", "[LOW] l", "none"]);
}

#[test]
fn unchecked_before_checked_at_equal_weight() {
    let sorted = sort_tasks_by_priority(&tasks("# T\n- [x] [1] done\n- [ ] [1] open"));
    assert_eq!(contents(&sorted), vec!["[1] open", "[1] done"]);
}

#[test]
fn numbers_and_unknown_tags() {
    let sorted = sort_tasks_by_priority(&tasks(
        "# T\n- [ ] plain\n- [ ] [URGENT] u\n- [ ] [7] seven\n- [ ] [0] zero",
    ));
    assert_eq!(
        contents(&sorted),
        vec!["[0] zero", "[7] seven", "plain", "[URGENT] u"]
    );
}

#[test]
fn children_move_with_their_parent() {
    let input = "# T\n- [ ] [LOW] parent\n  - [ ] child z\n  - [ ] [HIGH] child a\n- [ ] [HIGH] top";
    assert_eq!(
        sort_document(input),
        "# T\n- [ ] [HIGH] top\n- [ ] [LOW] parent\n  - [ ] [HIGH] child a\n  - [ ] child z"
    );
}

#[test]
fn headings_split_runs() {
    let input = "# A\n- [ ] a\n- [ ] [HIGH] b\n# B\n- [ ] [HIGH] c";
    assert_eq!(
        sort_document(input),
        "# A\n- [ ] [HIGH] b\n- [ ] a\n# B\n- [ ] [HIGH] c"
    );
}

#[test]
fn sorting_twice_changes_nothing() {
    let once = sort_document("# T\n- [ ] c\n- [x] [MID] b\n  - [ ] b1\n- [ ] [HIGH] a\n");
    assert_eq!(sort_document(&once), once);
}

#[test]
fn code_blocks_are_left_alone() {
    let input = "# T\n```\n- [ ] z\n- [ ] [HIGH] a\n```\n";
    assert_eq!(sort_document(input), input);
}
