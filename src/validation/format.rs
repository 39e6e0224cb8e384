// File: ./src/validation/format.rs
use super::{Issue, IssueKind, ValidationOptions, Validator, all_tasks};
use crate::model::item::{ParsedMarkdown, ParsedTask};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;

const MAX_CONTENT_LENGTH: usize = 200;

static VALID_CHECKBOX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*-\s*\[(\s*|x|X)\]").unwrap());
static BRACKETED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]+)\]").unwrap());
static NAMED_PRIORITY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\[(HIGH|MID|LOW)\]").unwrap());
static NUMERIC_PRIORITY: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\d+\]").unwrap());
static CHECKBOX_SPACING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(\s*)-\s*\[[x ]\](\s*)(.*)").unwrap());

/// Line-level syntax checks on each task.
pub struct FormatValidator;

impl Validator for FormatValidator {
    fn validate(&self, parsed: &ParsedMarkdown, _options: &ValidationOptions) -> Vec<Issue> {
        let mut issues = Vec::new();
        for task in all_tasks(parsed) {
            check_checkbox(task, &mut issues);
            check_priority_tags(task, &mut issues);
            check_content(task, &mut issues);
            check_spacing(task, &mut issues);
        }
        issues
    }
}

fn check_checkbox(task: &ParsedTask, issues: &mut Vec<Issue>) {
    if !VALID_CHECKBOX.is_match(&task.line_text) {
        issues.push(Issue::new(
            IssueKind::CheckboxFormat,
            task.line_number,
            "Invalid checkbox format. Expected \"- [ ]\" or \"- [x]\" format",
        ));
    }
}

fn check_priority_tags(task: &ParsedTask, issues: &mut Vec<Issue>) {
    for m in BRACKETED.find_iter(&task.line_text) {
        let tag = m.as_str();
        if matches!(tag, "[ ]" | "[x]" | "[X]") {
            continue;
        }
        if NAMED_PRIORITY.is_match(tag) || NUMERIC_PRIORITY.is_match(tag) {
            continue;
        }
        issues.push(
            Issue::new(
                IssueKind::PriorityFormat,
                task.line_number,
                format!(
                    "Potentially invalid priority format: {}. Expected [HIGH], [MID], [LOW], or [number]",
                    tag
                ),
            )
            .with_details(json!({ "tag": tag })),
        );
    }
}

fn check_content(task: &ParsedTask, issues: &mut Vec<Issue>) {
    let content = task.content.as_str();

    if content.trim().is_empty() {
        issues.push(Issue::new(
            IssueKind::EmptyContent,
            task.line_number,
            "Task has empty content",
        ));
    }

    let length = content.chars().count();
    if length > MAX_CONTENT_LENGTH {
        issues.push(
            Issue::new(
                IssueKind::LongContent,
                task.line_number,
                format!(
                    "Task content is very long ({} characters). Consider breaking it down",
                    length
                ),
            )
            .with_details(json!({ "length": length, "maxLength": MAX_CONTENT_LENGTH })),
        );
    }

    // A lone trailing CR is the line ending of a CRLF file.
    let body = content.strip_suffix('\r').unwrap_or(content);
    if body.contains(['\t', '\r', '\n']) {
        issues.push(Issue::new(
            IssueKind::InvalidCharacters,
            task.line_number,
            "Task content contains invalid characters (tabs, carriage returns, or newlines)",
        ));
    }
}

fn check_spacing(task: &ParsedTask, issues: &mut Vec<Issue>) {
    let line = task.line_text.as_str();

    if let Some(caps) = CHECKBOX_SPACING.captures(line) {
        let spaces = caps.get(2).map_or(0, |m| m.as_str().len());
        if spaces != 1 {
            issues.push(
                Issue::new(
                    IssueKind::SpacingIssue,
                    task.line_number,
                    format!(
                        "Inconsistent spacing after checkbox (found {} spaces, recommended 1)",
                        spaces
                    ),
                )
                .with_details(json!({ "found": spaces })),
            );
        }
    }

    if line.ends_with([' ', '\t']) {
        issues.push(Issue::new(
            IssueKind::TrailingWhitespace,
            task.line_number,
            "Line has trailing whitespace",
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::parser::parse_markdown;

    fn kinds(content: &str) -> Vec<IssueKind> {
        FormatValidator
            .validate(&parse_markdown(content), &ValidationOptions::default())
            .into_iter()
            .map(|i| i.kind)
            .collect()
    }

    #[test]
    fn well_formed_task_is_clean() {
        assert!(kinds("# T\n- [ ] [HIGH] ship it\n- [x] [12] done\n- [ ] [low] later").is_empty());
    }

    #[test]
    fn unknown_bracket_tag_warns() {
        let issues =
            FormatValidator.validate(&parse_markdown("# T\n- [ ] [URGENT] fix"), &ValidationOptions::default());
        assert_eq!(issues.len(), 1);
        assert_eq!(
            issues[0].message,
            "Potentially invalid priority format: [URGENT]. Expected [HIGH], [MID], [LOW], or [number]"
        );
    }

    #[test]
    fn spacing_and_trailing_whitespace() {
        assert_eq!(
            kinds("# T\n- [ ]   wide "),
            vec![IssueKind::SpacingIssue, IssueKind::TrailingWhitespace]
        );
    }

    #[test]
    fn empty_task() {
        assert_eq!(
            kinds("# T\n- [ ]"),
            vec![IssueKind::EmptyContent, IssueKind::SpacingIssue]
        );
    }

    #[test]
    fn tab_in_content_is_an_error() {
        let issues =
            FormatValidator.validate(&parse_markdown("# T\n- [ ] a\tb"), &ValidationOptions::default());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::InvalidCharacters);
        assert_eq!(issues[0].severity, super::super::Severity::Error);
    }

    #[test]
    fn long_content_warns() {
        let text = format!("# T\n- [ ] {}", "x".repeat(201));
        assert_eq!(kinds(&text), vec![IssueKind::LongContent]);
    }
}
