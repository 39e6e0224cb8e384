// Tests for keeping checklist syntax in code blocks and comments out of the task list.
use pcheck::model::{
    classify_lines, is_inside_code_block, is_inside_html_comment, parse_markdown, parse_task,
    parse_task_line,
};

fn contents(doc: &str) -> Vec<String> {
    parse_markdown(doc).tasks().map(|t| t.content.clone()).collect()
}

#[test]
fn fenced_examples_are_not_tasks() {
    let doc = "# TODO\n- [ ] real\n```md\n- [ ] example\n- [x] example done\n```\n- [x] done";
    assert_eq!(contents(doc), vec!["real", "done"]);
}

#[test]
fn commented_out_tasks_are_not_tasks() {
    let doc = "# TODO\n<!--\n- [ ] hidden\n-->\n- [ ] shown\n<!-- - [ ] inline -->";
    assert_eq!(contents(doc), vec!["shown"]);
}

#[test]
fn indented_code_block_ends_at_unindented_text() {
    let doc = "# TODO\nSome text\n\n    - [ ] code sample\n- [ ] after";
    assert_eq!(contents(doc), vec!["after"]);
}

#[test]
fn parse_task_uses_document_context_only_when_given() {
    let doc = "# T\n```\n- [ ] sample\n```";
    let lines: Vec<&str> = doc.split('\n').collect();

    assert!(parse_task(lines[2], 2, Some(lines.as_slice())).is_none());
    let bare = parse_task_line(lines[2], 2).expect("line parses without context");
    assert_eq!(bare.content, "sample");
}

#[test]
fn per_line_queries_agree_with_single_pass() {
    let doc = "# T\n<!-- a\nb -->\n```\ncode\n```\n    indented\ntext";
    let lines: Vec<&str> = doc.split('\n').collect();
    let contexts = classify_lines(&lines);
    for (i, ctx) in contexts.iter().enumerate() {
        assert_eq!(ctx.in_code_block, is_inside_code_block(&lines, i), "code at {}", i);
        assert_eq!(ctx.in_html_comment, is_inside_html_comment(&lines, i), "comment at {}", i);
    }
}

#[test]
fn uppercase_x_is_not_a_checked_task() {
    assert!(parse_task_line("- [X] shouting", 0).is_none());
    assert!(parse_task_line("- [x] quiet", 0).is_some_and(|t| t.checked));
}

#[test]
fn tasks_before_first_heading_are_dropped() {
    let parsed = parse_markdown("- [ ] loose\n# T\n- [ ] kept");
    assert_eq!(parsed.sections.len(), 1);
    assert_eq!(parsed.tasks().count(), 1);
}

#[test]
fn lines_round_trip() {
    let doc = "# T\r\n- [ ] a\n\n";
    assert_eq!(parse_markdown(doc).lines.join("\n"), doc);
}

#[test]
fn empty_input_is_an_empty_model() {
    let parsed = parse_markdown("");
    assert!(parsed.sections.is_empty());
    assert_eq!(parsed.lines, vec![String::new()]);
}
