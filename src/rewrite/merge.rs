// File: ./src/rewrite/merge.rs
// Folds the tasks of several checklist documents into one target document.
use crate::model::parser::parse_markdown;
use crate::rewrite::{insert_lines_into_section, insert_section, normalize};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Well-known sections come first, in this order; the rest follow alphabetically.
const SECTION_ORDER: [&str; 4] = ["TODO", "IN PROGRESS", "ICEBOX", "COMPLETED"];

const NEW_TARGET_HEADER: &str =
    "# Project TODO List\n\nMerged from multiple TODO.md files across the project.\n";

#[derive(Debug, Clone)]
pub struct MergeSource {
    /// Shown in reports, usually the path relative to the merge root.
    pub label: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergedSection {
    pub name: String,
    pub task_count: usize,
    pub created: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub content: String,
    pub sections: Vec<MergedSection>,
}

impl MergeOutcome {
    pub fn task_count(&self) -> usize {
        self.sections.iter().map(|s| s.task_count).sum()
    }
}

fn section_rank(upper: &str) -> Option<usize> {
    SECTION_ORDER.iter().position(|s| *s == upper)
}

fn compare_sections(a: &str, b: &str) -> Ordering {
    match (section_rank(a), section_rank(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Appends every task line of every source section to the same-named section
/// of `target` (case-insensitive), creating missing sections.
///
/// Task lines are copied verbatim, nested tasks included. Existing target
/// content is kept; the result is normalized. An empty target starts from a
/// small generated header.
pub fn merge_documents(target: &str, sources: &[MergeSource]) -> MergeOutcome {
    // upper name -> (display name, lines)
    let mut collected: HashMap<String, (String, Vec<String>)> = HashMap::new();
    for source in sources {
        let parsed = parse_markdown(&source.content);
        for section in parsed.sections.iter().filter(|s| !s.tasks.is_empty()) {
            log::info!(
                "Merging {} task(s) from {} [{}]",
                section.tasks.len(),
                source.label,
                section.name
            );
            let entry = collected
                .entry(section.name.to_uppercase())
                .or_insert_with(|| (section.name.clone(), Vec::new()));
            entry
                .1
                .extend(section.tasks.iter().map(|t| t.line_text.clone()));
        }
    }

    let mut keys: Vec<String> = collected.keys().cloned().collect();
    keys.sort_by(|a, b| compare_sections(a, b));

    let mut content = if target.trim().is_empty() {
        NEW_TARGET_HEADER.to_string()
    } else {
        target.to_string()
    };
    let mut merged = Vec::new();

    for key in keys {
        let Some((name, task_lines)) = collected.remove(&key) else {
            continue;
        };
        let task_count = task_lines.len();

        let mut parsed = parse_markdown(&content);
        let created = parsed.find_section(&name).is_none();
        if created {
            content = insert_section(&parsed.lines, &name, 2).join("\n");
            parsed = parse_markdown(&content);
        }
        if let Some(section) = parsed.find_section(&name) {
            content = insert_lines_into_section(&parsed.lines, section, task_lines, None).join("\n");
        }

        merged.push(MergedSection {
            name,
            task_count,
            created,
        });
    }

    MergeOutcome {
        content: normalize(&content),
        sections: merged,
    }
}
