// File: ./src/validation/mod.rs
//! Advisory checks over a parsed checklist document.
//!
//! Four independent validators look at the same parsed model and report
//! findings. Nothing here mutates input or fails: bad input just produces more
//! findings. Only error-severity findings make a document invalid.
pub mod format;
pub mod indent;
pub mod parent_child;
pub mod section;

use crate::model::item::{ParsedMarkdown, ParsedTask};
use crate::model::parser::parse_markdown;
use serde::Serialize;
use serde_json::{Value, json};
use strum::{AsRefStr, Display, EnumIter};

pub const DEFAULT_INDENT_SIZE: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// Coarse grouping kept for consumers of the older four-tag report format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, AsRefStr, EnumIter)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCategory {
    FormatError,
    IndentWarning,
    ParentChildInconsistency,
    StructureInfo,
}

/// One variant per kind of finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, AsRefStr, EnumIter)]
pub enum IssueKind {
    // format
    CheckboxFormat,
    InvalidCharacters,
    PriorityFormat,
    EmptyContent,
    LongContent,
    SpacingIssue,
    TrailingWhitespace,
    // indentation
    IndentInconsistency,
    IndentJump,
    OrphanedNesting,
    // parent/child
    CompletedChildOfOpenParent,
    OpenParentOfCompletedChildren,
    // sections
    FirstSectionLevel,
    SectionNesting,
    SectionTooDeep,
    EmptySection,
    AllTasksCompleted,
    DuplicateSection,
    EmptySectionName,
    LongSectionName,
    // document
    Unreadable,
    WellStructured,
    CompletionRate,
}

impl IssueKind {
    pub fn severity(self) -> Severity {
        match self {
            IssueKind::CheckboxFormat | IssueKind::InvalidCharacters | IssueKind::Unreadable => {
                Severity::Error
            }
            IssueKind::WellStructured | IssueKind::CompletionRate => Severity::Info,
            _ => Severity::Warning,
        }
    }

    pub fn category(self) -> IssueCategory {
        match self {
            IssueKind::CheckboxFormat | IssueKind::InvalidCharacters | IssueKind::Unreadable => {
                IssueCategory::FormatError
            }
            IssueKind::CompletedChildOfOpenParent
            | IssueKind::OpenParentOfCompletedChildren
            | IssueKind::AllTasksCompleted => IssueCategory::ParentChildInconsistency,
            IssueKind::WellStructured | IssueKind::CompletionRate => IssueCategory::StructureInfo,
            _ => IssueCategory::IndentWarning,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    pub kind: IssueKind,
    #[serde(rename = "type")]
    pub category: IssueCategory,
    pub severity: Severity,
    pub message: String,
    /// 0-based line. Document-level info carries none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub details: Value,
}

impl Issue {
    pub fn new(kind: IssueKind, line: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            category: kind.category(),
            severity: kind.severity(),
            message: message.into(),
            line: Some(line),
            details: Value::Null,
        }
    }

    pub fn document(kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            line: None,
            ..Self::new(kind, 0, message)
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    pub fn line(&self) -> usize {
        self.line.unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Spaces per nesting level.
    pub indent_size: usize,
    /// Warnings also fail `ValidationResult::passed`.
    pub strict: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            indent_size: DEFAULT_INDENT_SIZE,
            strict: false,
        }
    }
}

impl ValidationOptions {
    /// Indent size, never zero.
    pub fn indent_size(&self) -> usize {
        self.indent_size.max(1)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSummary {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub pending_tasks: usize,
    pub max_depth: usize,
    pub sections_count: usize,
}

impl ValidationSummary {
    /// Whole-percent completion, rounded half up.
    pub fn completion_rate(&self) -> usize {
        if self.total_tasks == 0 {
            return 0;
        }
        (self.completed_tasks * 200 + self.total_tasks) / (self.total_tasks * 2)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    /// `valid`, and in strict mode also free of warnings.
    pub passed: bool,
    pub errors: Vec<Issue>,
    pub warnings: Vec<Issue>,
    pub info: Vec<Issue>,
    pub summary: ValidationSummary,
}

impl ValidationResult {
    /// Result for a file that could not be read at all.
    pub fn unreadable(reason: &str) -> Self {
        let issue = Issue::new(
            IssueKind::Unreadable,
            0,
            format!("Failed to read file: {}", reason),
        );
        Self {
            valid: false,
            passed: false,
            errors: vec![issue],
            warnings: Vec::new(),
            info: Vec::new(),
            summary: ValidationSummary::default(),
        }
    }

    pub fn issues(&self) -> impl Iterator<Item = &Issue> {
        self.errors.iter().chain(self.warnings.iter())
    }

    pub fn count_kind(&self, kind: IssueKind) -> usize {
        self.issues().filter(|i| i.kind == kind).count()
    }
}

/// One pass over the parsed document.
pub trait Validator {
    fn validate(&self, parsed: &ParsedMarkdown, options: &ValidationOptions) -> Vec<Issue>;
}

pub(crate) fn all_tasks(parsed: &ParsedMarkdown) -> Vec<&ParsedTask> {
    parsed.tasks().collect()
}

fn summarize(parsed: &ParsedMarkdown, options: &ValidationOptions) -> ValidationSummary {
    let tasks = all_tasks(parsed);
    let completed = tasks.iter().filter(|t| t.checked).count();
    let max_depth = tasks
        .iter()
        .map(|t| t.indent)
        .max()
        .map_or(0, |deepest| deepest / options.indent_size() + 1);

    ValidationSummary {
        total_tasks: tasks.len(),
        completed_tasks: completed,
        pending_tasks: tasks.len() - completed,
        max_depth,
        sections_count: parsed.sections.len(),
    }
}

/// Runs all four validators and assembles the report.
pub fn validate_parsed_markdown(parsed: &ParsedMarkdown, options: &ValidationOptions) -> ValidationResult {
    let validators: [&dyn Validator; 4] = [
        &indent::IndentValidator,
        &parent_child::ParentChildValidator,
        &format::FormatValidator,
        &section::SectionValidator,
    ];

    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    for issue in validators.iter().flat_map(|v| v.validate(parsed, options)) {
        match issue.severity {
            Severity::Error => errors.push(issue),
            _ => warnings.push(issue),
        }
    }
    // Stable: findings on one line keep validator order.
    errors.sort_by_key(Issue::line);
    warnings.sort_by_key(Issue::line);

    let summary = summarize(parsed, options);
    let mut info = Vec::new();
    if errors.is_empty() && warnings.is_empty() {
        info.push(
            Issue::document(
                IssueKind::WellStructured,
                "Well-structured checklist with proper hierarchy",
            )
            .with_details(json!(summary)),
        );
    }
    if summary.total_tasks > 0 {
        let rate = summary.completion_rate();
        info.push(
            Issue::document(
                IssueKind::CompletionRate,
                format!(
                    "Task completion: {}/{} ({}%)",
                    summary.completed_tasks, summary.total_tasks, rate
                ),
            )
            .with_details(json!({ "completionRate": rate })),
        );
    }

    let valid = errors.is_empty();
    let passed = valid && (!options.strict || warnings.is_empty());
    log::debug!(
        "Validation finished: {} error(s), {} warning(s)",
        errors.len(),
        warnings.len()
    );

    ValidationResult {
        valid,
        passed,
        errors,
        warnings,
        info,
        summary,
    }
}

/// Parses and validates in one step.
pub fn validate_content(content: &str, options: &ValidationOptions) -> ValidationResult {
    validate_parsed_markdown(&parse_markdown(content), options)
}
