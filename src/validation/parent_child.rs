// File: ./src/validation/parent_child.rs
use super::{Issue, IssueKind, ValidationOptions, Validator, all_tasks};
use crate::model::item::{ParsedMarkdown, ParsedTask};
use serde_json::json;

/// Completion consistency between a task and the tasks nested under it.
///
/// A checked parent over an unchecked child is allowed; only an unchecked
/// parent is questioned.
pub struct ParentChildValidator;

struct Node<'a> {
    task: &'a ParsedTask,
    children: Vec<usize>,
}

/// Builds the task forest with an indent stack. Returns the nodes and the
/// indices of the roots.
fn build_forest<'a>(tasks: &[&'a ParsedTask]) -> (Vec<Node<'a>>, Vec<usize>) {
    let mut nodes: Vec<Node<'a>> = Vec::with_capacity(tasks.len());
    let mut roots = Vec::new();
    let mut stack: Vec<usize> = Vec::new();

    for task in tasks {
        while let Some(&top) = stack.last() {
            if nodes[top].task.indent >= task.indent {
                stack.pop();
            } else {
                break;
            }
        }

        let index = nodes.len();
        nodes.push(Node {
            task,
            children: Vec::new(),
        });
        match stack.last() {
            Some(&parent) => nodes[parent].children.push(index),
            None => roots.push(index),
        }
        stack.push(index);
    }

    (nodes, roots)
}

fn check_node(nodes: &[Node], index: usize, issues: &mut Vec<Issue>) {
    let node = &nodes[index];
    let parent = node.task;

    if !parent.checked && !node.children.is_empty() {
        for &child_index in &node.children {
            let child = nodes[child_index].task;
            if child.checked {
                issues.push(
                    Issue::new(
                        IssueKind::CompletedChildOfOpenParent,
                        child.line_number,
                        format!(
                            "Parent task \"{}\" is incomplete but child task \"{}\" is completed",
                            parent.content, child.content
                        ),
                    )
                    .with_details(json!({
                        "parentLine": parent.line_number,
                        "childLine": child.line_number,
                    })),
                );
            }
        }

        if node.children.iter().all(|&c| nodes[c].task.checked) {
            issues.push(
                Issue::new(
                    IssueKind::OpenParentOfCompletedChildren,
                    parent.line_number,
                    format!(
                        "All child tasks are completed but parent task \"{}\" is not marked as complete",
                        parent.content
                    ),
                )
                .with_details(json!({ "childCount": node.children.len() })),
            );
        }
    }

    for &child in &node.children {
        check_node(nodes, child, issues);
    }
}

impl Validator for ParentChildValidator {
    fn validate(&self, parsed: &ParsedMarkdown, _options: &ValidationOptions) -> Vec<Issue> {
        let tasks = all_tasks(parsed);
        let (nodes, roots) = build_forest(&tasks);

        let mut issues = Vec::new();
        for root in roots {
            check_node(&nodes, root, &mut issues);
        }
        issues
    }
}
