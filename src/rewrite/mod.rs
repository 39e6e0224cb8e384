// File: ./src/rewrite/mod.rs
//! Structure-preserving rewrites of checklist documents.
//!
//! Every operation takes text (or its line array) and returns new text. Lines an
//! operation does not touch are copied through byte for byte; task lines are
//! moved verbatim rather than rebuilt from parsed fields. The one exception is
//! `format_task(.., true)`, which renders the plain bullet stored in the
//! completed section.
pub mod merge;
pub mod normalize;
pub mod sort;

use crate::model::item::{COMPLETED_SECTION, ParsedSection, ParsedTask};
use crate::model::parser::{parse_heading, parse_markdown};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;

pub use merge::{MergeOutcome, MergeSource, merge_documents};
pub use normalize::normalize;
pub use sort::{sort_document, sort_tasks_by_priority};

static LEADING_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[.*?\]\s*").unwrap());
static CHECKBOX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([ x])\]").unwrap());

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn starts_with_whitespace(line: &str) -> bool {
    line.starts_with(char::is_whitespace)
}

/// Renders a task line.
///
/// With `remove_checkbox` the checkbox and any leading `[TAG]` are dropped and
/// the result is a plain bullet indented by two spaces per indent character.
/// Without it the original line is returned unchanged.
pub fn format_task(task: &ParsedTask, remove_checkbox: bool) -> String {
    if !remove_checkbox {
        return task.line_text.clone();
    }
    let content = LEADING_TAG.replace(&task.content, "");
    format!("{}- {}", "  ".repeat(task.indent), content)
}

fn is_heading_of_level(line: &str, level: usize) -> bool {
    let prefix = "#".repeat(level);
    line.strip_prefix(prefix.as_str())
        .is_some_and(|rest| rest.starts_with(char::is_whitespace))
}

/// Inserts an empty `name` heading after the last section of `level`.
///
/// The new block goes after that section's header, the blank lines following
/// it, and its contiguous bullet/indented lines. Without a section of that level
/// it is appended at the end, after a blank line unless the document already
/// ends with one.
pub fn insert_section(lines: &[String], name: &str, level: usize) -> Vec<String> {
    let mut new_lines = lines.to_vec();
    let header = format!("{} {}", "#".repeat(level), name);

    let mut insert_at = lines.len();
    if let Some(last_heading) = lines.iter().rposition(|l| is_heading_of_level(l, level)) {
        insert_at = last_heading + 1;
        while insert_at < lines.len() && is_blank(&lines[insert_at]) {
            insert_at += 1;
        }
        while insert_at < lines.len() {
            let line = &lines[insert_at];
            if line.starts_with("- ") || is_blank(line) || starts_with_whitespace(line) {
                insert_at += 1;
            } else {
                break;
            }
        }
    }

    if insert_at == lines.len() {
        if lines.last().is_none_or(|l| !is_blank(l)) {
            new_lines.push(String::new());
        }
        new_lines.push(header);
        new_lines.push(String::new());
    } else {
        new_lines.splice(insert_at..insert_at, [String::new(), header, String::new()]);
    }

    log::debug!("Inserted section '{}' at line {}", name, insert_at);
    new_lines
}

/// Index right after the contiguous list block that follows a section header.
fn list_end_index(lines: &[String], section: &ParsedSection, next_section_start: Option<usize>) -> usize {
    let end = next_section_start
        .unwrap_or(section.end_line)
        .min(lines.len().saturating_sub(1));
    let mut first = section.start_line + 1;
    while first < end && is_blank(&lines[first]) {
        first += 1;
    }

    let mut last_item = first - 1;
    for (i, line) in lines.iter().enumerate().take(end + 1).skip(first) {
        if line.starts_with("- ") || (starts_with_whitespace(line) && !is_blank(line)) {
            last_item = i;
        } else if !is_blank(line) {
            break;
        }
    }
    last_item + 1
}

/// Appends `- [ ] {task_text}` to the end of the section's existing list.
pub fn add_task_to_section(
    lines: &[String],
    section: &ParsedSection,
    task_text: &str,
    next_section_start: Option<usize>,
) -> Vec<String> {
    insert_lines_into_section(
        lines,
        section,
        vec![format!("- [ ] {}", task_text)],
        next_section_start,
    )
}

/// Appends raw lines to the end of the section's existing list.
pub fn insert_lines_into_section(
    lines: &[String],
    section: &ParsedSection,
    new_items: Vec<String>,
    next_section_start: Option<usize>,
) -> Vec<String> {
    let mut new_lines = lines.to_vec();
    let at = list_end_index(lines, section, next_section_start).min(new_lines.len());
    new_lines.splice(at..at, new_items);
    new_lines
}

/// Adds a task to the named section, creating the section when missing.
pub fn add_task(content: &str, section_name: &str, task_text: &str) -> String {
    let parsed = parse_markdown(content);
    if let Some(section) = parsed.find_section(section_name) {
        return add_task_to_section(&parsed.lines, section, task_text, None).join("\n");
    }

    let with_section = insert_section(&parsed.lines, section_name, 2).join("\n");
    let reparsed = parse_markdown(&with_section);
    match reparsed.find_section(section_name) {
        Some(section) => add_task_to_section(&reparsed.lines, section, task_text, None).join("\n"),
        // The heading we just wrote did not parse back (e.g. an empty name).
        None => with_section,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveResult {
    pub content: String,
    pub moved_count: usize,
}

/// Moves every checked task outside COMPLETED/DONE into the completed section.
///
/// Moved tasks become plain bullets (see `format_task`) and keep document
/// order. COMPLETED is preferred over DONE; when neither exists a COMPLETED
/// section is created.
pub fn move_completed_tasks_to_done(content: &str) -> MoveResult {
    let parsed = parse_markdown(content);

    let mut moved: Vec<String> = Vec::new();
    let mut skip: HashSet<usize> = HashSet::new();
    for section in parsed.sections.iter().filter(|s| !s.is_completed_section()) {
        for task in section.tasks.iter().filter(|t| t.checked) {
            moved.push(format_task(task, true));
            skip.insert(task.line_number);
        }
    }

    let remaining: Vec<String> = parsed
        .lines
        .iter()
        .enumerate()
        .filter(|(i, _)| !skip.contains(i))
        .map(|(_, l)| l.clone())
        .collect();

    if moved.is_empty() {
        return MoveResult {
            content: remaining.join("\n"),
            moved_count: 0,
        };
    }

    let (mut result, header) = match parsed.find_completed_section() {
        Some(target) => {
            // Removed lines above the header shift it up.
            let shift = skip.iter().filter(|&&l| l < target.start_line).count();
            (remaining, Some(target.start_line - shift))
        }
        None => {
            let inserted = insert_section(&remaining, COMPLETED_SECTION, 2);
            let reparsed = parse_markdown(&inserted.join("\n"));
            let header = reparsed.find_completed_section().map(|s| s.start_line);
            (inserted, header)
        }
    };

    let moved_count = moved.len();
    if let Some(header) = header {
        let mut at = header + 1;
        while at < result.len() && is_blank(&result[at]) {
            at += 1;
        }
        result.splice(at..at, moved);
    }

    log::info!("Moved {} completed task(s)", moved_count);
    MoveResult {
        content: result.join("\n"),
        moved_count,
    }
}

/// Removes the completed section (header through just before the next heading
/// of the same or a higher level). COMPLETED is preferred over DONE.
pub fn clear_done_section(content: &str) -> String {
    let parsed = parse_markdown(content);
    let Some(section) = parsed.find_completed_section() else {
        return content.to_string();
    };

    let start = section.start_line;
    let end = parsed
        .lines
        .iter()
        .enumerate()
        .skip(start + 1)
        .find(|(_, l)| parse_heading(l).is_some_and(|(level, _)| level <= section.level))
        .map_or(parsed.lines.len(), |(i, _)| i);

    log::info!("Cleared section '{}' ({} lines)", section.name, end - start);
    parsed
        .lines
        .iter()
        .enumerate()
        .filter(|(i, _)| !(start..end).contains(i))
        .map(|(_, l)| l.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VacuumedSection {
    pub name: String,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VacuumResult {
    pub content: String,
    pub sections: Vec<VacuumedSection>,
}

impl VacuumResult {
    pub fn removed_count(&self) -> usize {
        self.sections.iter().map(|s| s.lines.len()).sum()
    }
}

/// Deletes every checked task together with all of its nested tasks, in every
/// section, and returns what was removed grouped by section.
pub fn vacuum_completed(content: &str) -> VacuumResult {
    let parsed = parse_markdown(content);
    let mut skip: HashSet<usize> = HashSet::new();
    let mut sections = Vec::new();

    for section in &parsed.sections {
        let mut removed = Vec::new();
        let mut i = 0;
        while i < section.tasks.len() {
            let task = &section.tasks[i];
            if !task.checked {
                i += 1;
                continue;
            }
            // The task plus every following task nested deeper than it.
            let mut j = i + 1;
            while j < section.tasks.len() && section.tasks[j].indent > task.indent {
                j += 1;
            }
            for t in &section.tasks[i..j] {
                skip.insert(t.line_number);
                removed.push(t.line_text.clone());
            }
            i = j;
        }
        if !removed.is_empty() {
            sections.push(VacuumedSection {
                name: section.name.clone(),
                lines: removed,
            });
        }
    }

    let content = parsed
        .lines
        .iter()
        .enumerate()
        .filter(|(i, _)| !skip.contains(i))
        .map(|(_, l)| l.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    VacuumResult { content, sections }
}

/// Sets the first checkbox on line `line_index` (0-based) to `checked`.
///
/// Returns `None` when the line does not exist or carries no checkbox.
pub fn toggle_task_line(content: &str, line_index: usize, checked: bool) -> Option<String> {
    let lines: Vec<&str> = content.split('\n').collect();
    let line = lines.get(line_index)?;
    let m = CHECKBOX.find(line)?;
    let replacement = if checked { "[x]" } else { "[ ]" };
    let updated = format!("{}{}{}", &line[..m.start()], replacement, &line[m.end()..]);

    let rebuilt: Vec<&str> = lines
        .iter()
        .enumerate()
        .map(|(i, l)| if i == line_index { updated.as_str() } else { *l })
        .collect();
    Some(rebuilt.join("\n"))
}
