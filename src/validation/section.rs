// File: ./src/validation/section.rs
use super::{Issue, IssueKind, ValidationOptions, Validator};
use crate::model::item::{COMPLETED_SECTION, ParsedMarkdown, ParsedSection};
use serde_json::json;
use std::collections::HashSet;

const MAX_SECTION_LEVEL: usize = 6;
const MAX_SECTION_NAME_LENGTH: usize = 100;

/// Heading hierarchy and section contents.
pub struct SectionValidator;

impl Validator for SectionValidator {
    fn validate(&self, parsed: &ParsedMarkdown, _options: &ValidationOptions) -> Vec<Issue> {
        let mut issues = hierarchy(&parsed.sections);
        for section in &parsed.sections {
            contents(section, &parsed.lines, &mut issues);
        }
        issues.extend(names(&parsed.sections));
        issues
    }
}

fn hierarchy(sections: &[ParsedSection]) -> Vec<Issue> {
    let mut issues = Vec::new();

    if let Some(first) = sections.first()
        && first.level > 1
    {
        issues.push(Issue::new(
            IssueKind::FirstSectionLevel,
            first.start_line,
            format!(
                "First section starts at level {}, consider starting from level 1",
                first.level
            ),
        ));
    }

    for pair in sections.windows(2) {
        let (prev, current) = (&pair[0], &pair[1]);
        if current.level > prev.level + 1 {
            issues.push(
                Issue::new(
                    IssueKind::SectionNesting,
                    current.start_line,
                    format!(
                        "Section level jumps from {} to {}, consider gradual progression",
                        prev.level, current.level
                    ),
                )
                .with_details(json!({ "fromLevel": prev.level, "toLevel": current.level })),
            );
        }
    }

    for section in sections.iter().filter(|s| s.level > MAX_SECTION_LEVEL) {
        issues.push(Issue::new(
            IssueKind::SectionTooDeep,
            section.start_line,
            format!(
                "Section is deeply nested (level {}), consider restructuring",
                section.level
            ),
        ));
    }

    issues
}

fn contents(section: &ParsedSection, lines: &[String], issues: &mut Vec<Issue>) {
    if section.tasks.is_empty() {
        let has_text = lines
            .iter()
            .take(section.end_line + 1)
            .skip(section.start_line + 1)
            .any(|l| !l.trim().is_empty());
        if !has_text {
            issues.push(Issue::new(
                IssueKind::EmptySection,
                section.start_line,
                format!("Section \"{}\" is empty", section.name),
            ));
        }
        return;
    }

    let all_done = section.tasks.iter().all(|t| t.checked);
    if all_done && section.name.to_uppercase() != COMPLETED_SECTION {
        issues.push(
            Issue::new(
                IssueKind::AllTasksCompleted,
                section.start_line,
                format!(
                    "Section \"{}\" has all tasks completed, consider moving to COMPLETED section",
                    section.name
                ),
            )
            .with_details(json!({ "taskCount": section.tasks.len() })),
        );
    }
}

fn names(sections: &[ParsedSection]) -> Vec<Issue> {
    let mut issues = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for section in sections {
        if !seen.insert(section.name.to_uppercase()) {
            issues.push(Issue::new(
                IssueKind::DuplicateSection,
                section.start_line,
                format!("Duplicate section name: \"{}\"", section.name),
            ));
        }

        if section.name.trim().is_empty() {
            issues.push(Issue::new(
                IssueKind::EmptySectionName,
                section.start_line,
                "Section has empty name",
            ));
        }

        let length = section.name.chars().count();
        if length > MAX_SECTION_NAME_LENGTH {
            issues.push(Issue::new(
                IssueKind::LongSectionName,
                section.start_line,
                format!("Section name is very long ({} characters)", length),
            ));
        }
    }

    issues
}
