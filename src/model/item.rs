// File: ./src/model/item.rs
use serde::Serialize;

pub const COMPLETED_SECTION: &str = "COMPLETED";
pub const DONE_SECTION: &str = "DONE";

/// One checklist line, as found in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedTask {
    /// Exact source line. Rewrites copy this, they never rebuild it from fields.
    pub line_text: String,
    /// 0-based index into `ParsedMarkdown::lines`.
    pub line_number: usize,
    pub checked: bool,
    /// Text after the checkbox, inline priority tag included.
    pub content: String,
    /// Leading whitespace characters. A tab counts as one.
    pub indent: usize,
    pub priority: Option<String>,
    pub priority_value: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedSection {
    pub name: String,
    pub level: usize,
    pub start_line: usize,
    pub end_line: usize,
    pub tasks: Vec<ParsedTask>,
}

impl ParsedSection {
    pub fn is_completed_section(&self) -> bool {
        is_completed_name(&self.name)
    }

    pub fn contains_line(&self, line: usize) -> bool {
        (self.start_line..=self.end_line).contains(&line)
    }
}

/// Whole-document model. `lines` is the source of truth; sections and tasks
/// index into it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedMarkdown {
    pub sections: Vec<ParsedSection>,
    pub lines: Vec<String>,
}

impl ParsedMarkdown {
    /// All tasks in document order.
    pub fn tasks(&self) -> impl Iterator<Item = &ParsedTask> {
        self.sections.iter().flat_map(|s| s.tasks.iter())
    }

    pub fn task_at_line(&self, line: usize) -> Option<&ParsedTask> {
        self.tasks().find(|t| t.line_number == line)
    }

    pub fn section_of_line(&self, line: usize) -> Option<&ParsedSection> {
        self.sections.iter().find(|s| s.contains_line(line))
    }

    pub fn find_section(&self, name: &str) -> Option<&ParsedSection> {
        find_section(&self.sections, name)
    }

    pub fn find_completed_section(&self) -> Option<&ParsedSection> {
        find_completed_section(&self.sections)
    }

    /// Joins `lines` back with `\n`. Always equal to the parsed input.
    pub fn to_content(&self) -> String {
        self.lines.join("\n")
    }
}

/// Section names COMPLETED and DONE (any case) receive finished work.
pub fn is_completed_name(name: &str) -> bool {
    name.eq_ignore_ascii_case(COMPLETED_SECTION) || name.eq_ignore_ascii_case(DONE_SECTION)
}

/// Case-insensitive exact lookup. The first match wins.
pub fn find_section<'a>(sections: &'a [ParsedSection], name: &str) -> Option<&'a ParsedSection> {
    let wanted = name.to_uppercase();
    sections.iter().find(|s| s.name.to_uppercase() == wanted)
}

/// COMPLETED if present, else DONE, else nothing.
pub fn find_completed_section(sections: &[ParsedSection]) -> Option<&ParsedSection> {
    find_section(sections, COMPLETED_SECTION).or_else(|| find_section(sections, DONE_SECTION))
}
