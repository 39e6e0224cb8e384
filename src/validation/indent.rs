// File: ./src/validation/indent.rs
use super::{Issue, IssueKind, ValidationOptions, Validator, all_tasks};
use crate::model::item::{ParsedMarkdown, ParsedTask};
use serde_json::json;
use std::collections::BTreeSet;

/// Indent multiples, jumps between used levels, and nested tasks without a parent.
pub struct IndentValidator;

impl Validator for IndentValidator {
    fn validate(&self, parsed: &ParsedMarkdown, options: &ValidationOptions) -> Vec<Issue> {
        let tasks = all_tasks(parsed);
        let size = options.indent_size();
        let mut issues = inconsistent_indents(&tasks, size);
        issues.extend(indent_jumps(&tasks, size));
        issues.extend(orphaned_tasks(&tasks, size));
        issues
    }
}

fn inconsistent_indents(tasks: &[&ParsedTask], size: usize) -> Vec<Issue> {
    tasks
        .iter()
        .filter(|t| t.indent % size != 0)
        .map(|t| {
            Issue::new(
                IssueKind::IndentInconsistency,
                t.line_number,
                format!(
                    "Inconsistent indentation detected (expected multiple of {} spaces, found {})",
                    size, t.indent
                ),
            )
            .with_details(json!({ "expectedMultiple": size, "actualIndent": t.indent }))
        })
        .collect()
}

/// Compares the distinct indent levels in ascending order. A level more than
/// one step above the previous one is reported on its first task.
fn indent_jumps(tasks: &[&ParsedTask], size: usize) -> Vec<Issue> {
    let levels: Vec<usize> = tasks
        .iter()
        .map(|t| t.indent)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    levels
        .windows(2)
        .filter(|w| w[1] - w[0] > size)
        .filter_map(|w| {
            let (from, to) = (w[0], w[1]);
            let first = tasks.iter().find(|t| t.indent == to)?;
            Some(
                Issue::new(
                    IssueKind::IndentJump,
                    first.line_number,
                    format!("Large indent jump detected (from {} to {} spaces)", from, to),
                )
                .with_details(json!({ "fromIndent": from, "toIndent": to, "maxJump": size })),
            )
        })
        .collect()
}

/// A nested task needs a task exactly one level shallower above it. The scan
/// backwards stops at the first task shallower than that. A task indented by
/// less than one level can never have a parent.
fn orphaned_tasks(tasks: &[&ParsedTask], size: usize) -> Vec<Issue> {
    let mut issues = Vec::new();
    for (i, task) in tasks.iter().enumerate() {
        if task.indent == 0 {
            continue;
        }

        let has_parent = match task.indent.checked_sub(size) {
            Some(parent_indent) => tasks[..i]
                .iter()
                .rev()
                .find(|prev| prev.indent <= parent_indent)
                .is_some_and(|prev| prev.indent == parent_indent),
            None => false,
        };

        if !has_parent {
            let expected = task.indent as i64 - size as i64;
            issues.push(
                Issue::new(
                    IssueKind::OrphanedNesting,
                    task.line_number,
                    format!(
                        "Task appears to be orphaned (no parent found at indent level {})",
                        expected
                    ),
                )
                .with_details(json!({ "taskIndent": task.indent, "expectedParentIndent": expected })),
            );
        }
    }
    issues
}
