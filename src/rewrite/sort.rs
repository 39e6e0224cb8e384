// File: ./src/rewrite/sort.rs
//! Priority sort that keeps every task together with its nested tasks.
//!
//! A task and the tasks indented deeper right after it form one group. Groups
//! are ordered by the head's priority weight, unchecked before checked, and
//! otherwise keep their original order. Children are sorted the same way
//! inside their parent.
use crate::model::item::ParsedTask;
use crate::model::parser::parse_markdown;
use std::collections::HashMap;

/// Sort key of a group head: `(indent, priority weight, checked)`.
trait SortKey {
    fn indent(&self) -> usize;
    fn rank(&self) -> (u32, bool);
}

impl SortKey for ParsedTask {
    fn indent(&self) -> usize {
        self.indent
    }

    fn rank(&self) -> (u32, bool) {
        (self.priority_value, self.checked)
    }
}

/// A task line plus the non-task indented lines that follow it.
#[derive(Clone)]
struct Entry {
    indent: usize,
    rank: (u32, bool),
    lines: Vec<String>,
}

impl SortKey for Entry {
    fn indent(&self) -> usize {
        self.indent
    }

    fn rank(&self) -> (u32, bool) {
        self.rank
    }
}

fn group_sort<T: SortKey + Clone>(items: &[T]) -> Vec<T> {
    let mut groups: Vec<Vec<T>> = Vec::new();
    let mut i = 0;
    while i < items.len() {
        let head_indent = items[i].indent();
        let mut end = i + 1;
        while end < items.len() && items[end].indent() > head_indent {
            end += 1;
        }
        let mut group = Vec::with_capacity(end - i);
        group.push(items[i].clone());
        group.extend(group_sort(&items[i + 1..end]));
        groups.push(group);
        i = end;
    }
    // Stable: equal ranks keep source order.
    groups.sort_by_key(|g| g[0].rank());
    groups.concat()
}

/// Sorts a task list in document order.
///
/// Given equal indents and weights `[100, 1, 5, 10]` the result is
/// HIGH, MID, LOW, untagged.
pub fn sort_tasks_by_priority(tasks: &[ParsedTask]) -> Vec<ParsedTask> {
    group_sort(tasks)
}

fn is_continuation(line: &str) -> bool {
    !line.trim().is_empty()
        && line.starts_with(char::is_whitespace)
        && !line.trim_start().starts_with("```")
}

/// Sorts every run of consecutive task lines in the document.
///
/// A run ends at a blank line, a heading, or any other unindented non-task
/// line; those lines never move. Indented non-task lines travel with the task
/// above them.
pub fn sort_document(content: &str) -> String {
    let parsed = parse_markdown(content);
    let tasks: HashMap<usize, &ParsedTask> = parsed.tasks().map(|t| (t.line_number, t)).collect();
    let lines = &parsed.lines;

    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut i = 0;
    while i < lines.len() {
        if !tasks.contains_key(&i) {
            out.push(lines[i].clone());
            i += 1;
            continue;
        }

        let mut run: Vec<Entry> = Vec::new();
        while i < lines.len() {
            if let Some(task) = tasks.get(&i) {
                run.push(Entry {
                    indent: task.indent,
                    rank: task.rank(),
                    lines: vec![lines[i].clone()],
                });
            } else if is_continuation(&lines[i])
                && let Some(last) = run.last_mut()
            {
                last.lines.push(lines[i].clone());
            } else {
                break;
            }
            i += 1;
        }
        out.extend(group_sort(&run).into_iter().flat_map(|e| e.lines));
    }

    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_is_sorted_and_surroundings_stay() {
        let input = "# T\nintro\n- [ ] none\n- [ ] [HIGH] high\n\ntrailer";
        assert_eq!(
            sort_document(input),
            "# T\nintro\n- [ ] [HIGH] high\n- [ ] none\n\ntrailer"
        );
    }

    #[test]
    fn notes_travel_with_their_task() {
        let input = "# T\n- [ ] b\n  note for b\n- [ ] [1] a";
        assert_eq!(sort_document(input), "# T\n- [ ] [1] a\n- [ ] b\n  note for b");
    }
}
