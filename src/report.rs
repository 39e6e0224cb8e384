// File: ./src/report.rs
//! Rendering of validation results and checklist trees.
//!
//! Everything returns a `String`; the caller decides where it goes. Console
//! output shows 1-based line numbers, JSON keeps the 0-based index.
use crate::model::id::ChecklistItem;
use crate::validation::{Issue, ValidationResult};
use anyhow::Result;
use crossterm::style::{StyledContent, Stylize, style};
use serde::Serialize;

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const VERTICAL: &str = "│   ";
const EMPTY: &str = "    ";

/// ANSI styling that can be switched off (`--no-color`, `color = false`).
#[derive(Debug, Clone, Copy)]
pub struct Painter {
    enabled: bool,
}

impl Painter {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    fn paint<F>(&self, text: impl Into<String>, styler: F) -> String
    where
        F: FnOnce(StyledContent<String>) -> StyledContent<String>,
    {
        let text = text.into();
        if self.enabled {
            styler(style(text)).to_string()
        } else {
            text
        }
    }

    fn bold(&self, text: impl Into<String>) -> String {
        self.paint(text, |s| s.bold())
    }
    fn red(&self, text: impl Into<String>) -> String {
        self.paint(text, |s| s.red())
    }
    fn green(&self, text: impl Into<String>) -> String {
        self.paint(text, |s| s.green())
    }
    fn yellow(&self, text: impl Into<String>) -> String {
        self.paint(text, |s| s.yellow())
    }
    fn blue(&self, text: impl Into<String>) -> String {
        self.paint(text, |s| s.blue())
    }
    fn dim(&self, text: impl Into<String>) -> String {
        self.paint(text, |s| s.dim())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions {
    pub show_details: bool,
    pub color: bool,
}

fn push_issues(lines: &mut Vec<String>, issues: &[Issue], options: &ReportOptions, p: Painter) {
    for issue in issues {
        lines.push(format!("  Line {}: {}", issue.line() + 1, issue.message));
        if options.show_details && !issue.details.is_null() {
            lines.push(p.dim(format!("    Details: {}", issue.details)));
        }
    }
    lines.push(String::new());
}

/// Full console report for one file.
pub fn render_result(file: &str, result: &ValidationResult, options: &ReportOptions) -> String {
    let p = Painter::new(options.color);
    let summary = &result.summary;
    let mut lines = Vec::new();

    let icon = if result.valid { "✅" } else { "❌" };
    lines.push(p.bold(format!("{} Validation Results for {}", icon, file)));
    lines.push(String::new());

    lines.push(p.bold("📊 Summary:"));
    let status = if result.valid { p.green("✅") } else { p.red("❌") };
    lines.push(format!("  {} {} tasks validated", status, summary.total_tasks));
    if !result.warnings.is_empty() {
        lines.push(format!("  {}  {} warnings found", p.yellow("⚠️"), result.warnings.len()));
    }
    if !result.errors.is_empty() {
        lines.push(format!("  {} {} errors found", p.red("❌"), result.errors.len()));
    }
    if result.errors.is_empty() && result.warnings.is_empty() {
        lines.push(format!("  {} No issues found", p.green("✅")));
    }
    lines.push(String::new());

    if !result.errors.is_empty() {
        lines.push(p.bold(p.red("❌ Errors:")));
        push_issues(&mut lines, &result.errors, options, p);
    }
    if !result.warnings.is_empty() {
        lines.push(p.bold(p.yellow("⚠️  Warnings:")));
        push_issues(&mut lines, &result.warnings, options, p);
    }

    if summary.total_tasks > 0 {
        lines.push(p.bold(p.green("✅ Structure Analysis:")));
        lines.push(format!("  📁 {} sections found", summary.sections_count));
        lines.push(format!("  📝 {} total tasks", summary.total_tasks));
        lines.push(format!("  {} {} completed tasks", p.green("✅"), summary.completed_tasks));
        lines.push(format!("  {} {} pending tasks", p.blue("☐"), summary.pending_tasks));
        lines.push(format!("  🔢 Max nesting depth: {} levels", summary.max_depth));
        lines.push(format!("  📊 Completion rate: {}%", summary.completion_rate()));
        lines.push(String::new());
    }

    if !result.info.is_empty() {
        lines.push(p.bold(p.blue("ℹ️  Information:")));
        for info in &result.info {
            lines.push(format!("  {}", info.message));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

/// One line per file: status, path and issue counts.
pub fn render_summary_line(file: &str, result: &ValidationResult, color: bool) -> String {
    let p = Painter::new(color);
    let icon = if result.valid { p.green("✅") } else { p.red("❌") };
    let mut line = format!("{} {}", icon, file);

    if !result.errors.is_empty() {
        line.push(' ');
        line.push_str(&p.red(format!("{} errors", result.errors.len())));
    }
    if !result.warnings.is_empty() {
        line.push(' ');
        line.push_str(&p.yellow(format!("{} warnings", result.warnings.len())));
    }
    if result.errors.is_empty() && result.warnings.is_empty() {
        line.push(' ');
        line.push_str(&p.green("✓"));
    }
    line
}

/// Totals across several validated files.
pub fn render_statistics(results: &[&ValidationResult], color: bool) -> String {
    let p = Painter::new(color);
    let files = results.len();
    let valid = results.iter().filter(|r| r.valid).count();
    let errors: usize = results.iter().map(|r| r.errors.len()).sum();
    let warnings: usize = results.iter().map(|r| r.warnings.len()).sum();
    let tasks: usize = results.iter().map(|r| r.summary.total_tasks).sum();
    let completed: usize = results.iter().map(|r| r.summary.completed_tasks).sum();

    let mut lines = vec![
        p.bold("📊 Overall Statistics:"),
        format!("  📁 Files validated: {}", files),
        format!("  {} Valid files: {}", p.green("✅"), valid),
        format!("  {} Files with errors: {}", p.red("❌"), files - valid),
        format!("  📝 Total tasks: {}", tasks),
        format!("  {} Completed tasks: {}", p.green("✅"), completed),
    ];
    if tasks > 0 {
        let rate = (completed * 200 + tasks) / (tasks * 2);
        lines.push(format!("  📊 Overall completion: {}%", rate));
    }
    lines.push(format!("  {} Total errors: {}", p.red("❌"), errors));
    lines.push(format!("  {} Total warnings: {}", p.yellow("⚠️"), warnings));
    lines.join("\n")
}

#[derive(Serialize)]
struct JsonReport<'a> {
    file: &'a str,
    valid: bool,
    summary: &'a crate::validation::ValidationSummary,
    errors: &'a [Issue],
    warnings: &'a [Issue],
    info: &'a [Issue],
}

impl<'a> JsonReport<'a> {
    fn new(file: &'a str, result: &'a ValidationResult) -> Self {
        Self {
            file,
            valid: result.valid,
            summary: &result.summary,
            errors: &result.errors,
            warnings: &result.warnings,
            info: &result.info,
        }
    }
}

pub fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    Ok(if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    })
}

/// JSON for one file, or an array when several files were validated.
pub fn render_json(results: &[(String, ValidationResult)], pretty: bool) -> Result<String> {
    let reports: Vec<JsonReport> = results
        .iter()
        .map(|(file, result)| JsonReport::new(file, result))
        .collect();
    match reports.as_slice() {
        [single] => to_json(single, pretty),
        _ => to_json(&reports, pretty),
    }
}

/// A node of a rendered tree. Files have no checkbox; checklist items do.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TreeNode {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn container(label: impl Into<String>, children: Vec<TreeNode>) -> Self {
        Self {
            label: label.into(),
            children,
            ..Self::default()
        }
    }

    fn count(&self) -> usize {
        1 + self.children.iter().map(TreeNode::count).sum::<usize>()
    }

    fn has_unchecked_descendant(&self) -> bool {
        self.children
            .iter()
            .any(|c| c.checked == Some(false) || c.has_unchecked_descendant())
    }
}

impl From<&ChecklistItem> for TreeNode {
    fn from(item: &ChecklistItem) -> Self {
        Self {
            label: item.content.clone(),
            checked: Some(item.checked),
            id: Some(item.id.clone()),
            children: item.children.iter().map(TreeNode::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TreeOptions {
    pub show_ids: bool,
    pub max_items: Option<usize>,
    pub max_depth: Option<usize>,
    pub unchecked_only: bool,
}

fn node_text(node: &TreeNode, options: &TreeOptions, note: &str) -> String {
    let mut text = match node.checked {
        Some(checked) => format!("[{}] {}{}", if checked { "x" } else { " " }, node.label, note),
        None => node.label.clone(),
    };
    if options.show_ids
        && let Some(id) = &node.id
    {
        text.push_str(&format!(" [{}]", id));
    }
    text
}

/// Draws nodes with box-drawing branches.
///
/// With `unchecked_only`, a checked node is shown only when something below it
/// is still open.
pub fn render_tree(nodes: &[TreeNode], options: &TreeOptions) -> Vec<String> {
    let mut lines = Vec::new();
    draw(nodes, options, "", 0, &mut lines);
    lines
}

fn draw(nodes: &[TreeNode], options: &TreeOptions, prefix: &str, depth: usize, out: &mut Vec<String>) {
    if options.max_depth.is_some_and(|max| depth >= max) {
        if !nodes.is_empty() {
            let hidden: usize = nodes.iter().map(TreeNode::count).sum();
            out.push(format!("{}{}... ({} items hidden by depth limit)", prefix, LAST_BRANCH, hidden));
        }
        return;
    }

    let mut shown = 0;
    for (i, node) in nodes.iter().enumerate() {
        let is_last = i + 1 == nodes.len();
        let branch = if is_last { LAST_BRANCH } else { BRANCH };

        if options.max_items.is_some_and(|max| shown >= max) {
            out.push(format!("{}{}... and {} more items", prefix, branch, nodes.len() - i));
            break;
        }

        let note = if options.unchecked_only && node.checked == Some(true) {
            if !node.has_unchecked_descendant() {
                continue;
            }
            " (has unchecked items)"
        } else {
            ""
        };

        out.push(format!("{}{}{}", prefix, branch, node_text(node, options, note)));
        shown += 1;

        if !node.children.is_empty() {
            let child_prefix = format!("{}{}", prefix, if is_last { EMPTY } else { VERTICAL });
            draw(&node.children, options, &child_prefix, depth + 1, out);
        }
    }
}
