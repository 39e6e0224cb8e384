// File: ./src/model/parser.rs
// Task line and document parsing for the checklist dialect.
use crate::model::classifier::{self, LineContext};
use crate::model::item::{ParsedMarkdown, ParsedSection, ParsedTask};
use crate::model::priority::parse_priority;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Heading,
    Task,
}

// Evaluated in order; the first pattern that matches decides the line's kind.
static LINE_RULES: Lazy<Vec<(LineKind, Regex)>> = Lazy::new(|| {
    vec![
        (LineKind::Heading, Regex::new(r"^(#+)\s+(.+)$").unwrap()),
        (
            LineKind::Task,
            Regex::new(r"^(\s*)-\s*\[([ x])\]\s*(.*)$").unwrap(),
        ),
    ]
});

fn match_rule(line: &str) -> Option<(LineKind, Captures<'_>)> {
    LINE_RULES
        .iter()
        .find_map(|(kind, re)| re.captures(line).map(|caps| (*kind, caps)))
}

/// A Markdown heading: `(level, trimmed name)`.
pub fn parse_heading(line: &str) -> Option<(usize, String)> {
    match match_rule(line) {
        Some((LineKind::Heading, caps)) => Some((caps[1].len(), caps[2].trim().to_string())),
        _ => None,
    }
}

fn task_from_captures(line: &str, line_number: usize, caps: &Captures<'_>) -> ParsedTask {
    let priority = parse_priority(line);
    ParsedTask {
        line_text: line.to_string(),
        line_number,
        checked: &caps[2] == "x",
        content: caps[3].to_string(),
        indent: caps[1].chars().count(),
        priority: priority.token,
        priority_value: priority.value,
    }
}

/// Parses one line as a checklist item.
///
/// Only a lowercase `x` marks a task as checked; `[X]` does not parse. When the
/// whole document is passed in `all_lines`, items inside code blocks and HTML
/// comments are rejected.
pub fn parse_task<S: AsRef<str>>(
    line: &str,
    line_number: usize,
    all_lines: Option<&[S]>,
) -> Option<ParsedTask> {
    let (LineKind::Task, caps) = match_rule(line)? else {
        return None;
    };
    if let Some(lines) = all_lines
        && (classifier::is_inside_code_block(lines, line_number)
            || classifier::is_inside_html_comment(lines, line_number))
    {
        return None;
    }
    Some(task_from_captures(line, line_number, &caps))
}

/// `parse_task` without document context.
pub fn parse_task_line(line: &str, line_number: usize) -> Option<ParsedTask> {
    parse_task::<&str>(line, line_number, None)
}

#[derive(Default)]
struct ParseState {
    sections: Vec<ParsedSection>,
    current: Option<ParsedSection>,
}

impl ParseState {
    fn open_section(mut self, section: ParsedSection) -> Self {
        if let Some(mut previous) = self.current.take() {
            previous.end_line = section.start_line.saturating_sub(1);
            self.sections.push(previous);
        }
        self.current = Some(section);
        self
    }

    fn finish(mut self) -> Vec<ParsedSection> {
        if let Some(last) = self.current.take() {
            self.sections.push(last);
        }
        self.sections
    }
}

/// Builds the whole-document model in one left-to-right fold.
///
/// Tasks before the first heading belong to no section and are not tracked.
/// `lines` is `content.split('\n')`, so joining it back reproduces `content`.
pub fn parse_markdown(content: &str) -> ParsedMarkdown {
    let lines: Vec<String> = content.split('\n').map(str::to_string).collect();
    let contexts: Vec<LineContext> = classifier::classify_lines(&lines);
    let last_line = lines.len().saturating_sub(1);

    let state = lines
        .iter()
        .enumerate()
        .fold(ParseState::default(), |mut state, (i, line)| {
            match match_rule(line) {
                Some((LineKind::Heading, caps)) => state.open_section(ParsedSection {
                    name: caps[2].trim().to_string(),
                    level: caps[1].len(),
                    start_line: i,
                    end_line: last_line,
                    tasks: Vec::new(),
                }),
                Some((LineKind::Task, caps)) => {
                    if let Some(section) = state.current.as_mut()
                        && !contexts[i].is_hidden()
                    {
                        section.tasks.push(task_from_captures(line, i, &caps));
                    }
                    state
                }
                None => state,
            }
        });

    log::debug!(
        "Parsed {} lines into {} sections",
        lines.len(),
        state.sections.len() + usize::from(state.current.is_some())
    );

    ParsedMarkdown {
        sections: state.finish(),
        lines,
    }
}
