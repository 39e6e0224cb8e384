// File: ./src/model/id.rs
// Stable short identifiers for checklist items, and the tree that carries them.
use crate::model::item::{ParsedMarkdown, ParsedTask};
use serde::Serialize;
use sha2::{Digest, Sha256};

pub const ROOT_PARENT: &str = "root";
const ID_LEN: usize = 8;

/// First 8 hex chars of SHA-256 over `"{parent}-{line}-{content}"`.
///
/// `line` is 1-based. The same triple always yields the same ID, so an ID stays
/// valid until its line moves or its text changes.
pub fn generate_id(content: &str, line: usize, parent_id: Option<&str>) -> String {
    let input = format!("{}-{}-{}", parent_id.unwrap_or(ROOT_PARENT), line, content);
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let hex = format!("{:x}", hasher.finalize());
    hex[..ID_LEN].to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecklistItem {
    pub id: String,
    pub content: String,
    pub checked: bool,
    /// 1-based, as shown to users.
    pub line: usize,
    pub indent: usize,
    pub section: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ChecklistItem>,
}

impl ChecklistItem {
    /// Depth-first search by ID.
    pub fn find(&self, id: &str) -> Option<&ChecklistItem> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    pub fn has_unchecked_descendant(&self) -> bool {
        self.children
            .iter()
            .any(|c| !c.checked || c.has_unchecked_descendant())
    }

    pub fn count(&self) -> usize {
        1 + self.children.iter().map(ChecklistItem::count).sum::<usize>()
    }
}

pub fn find_item<'a>(items: &'a [ChecklistItem], id: &str) -> Option<&'a ChecklistItem> {
    items.iter().find_map(|item| item.find(id))
}

/// Path of child indexes from the roots down to one item.
type NodePath = Vec<usize>;

fn node_at<'a>(roots: &'a mut [ChecklistItem], path: &[usize]) -> Option<&'a mut ChecklistItem> {
    let (first, rest) = path.split_first()?;
    let mut node = roots.get_mut(*first)?;
    for idx in rest {
        node = node.children.get_mut(*idx)?;
    }
    Some(node)
}

fn make_item(task: &ParsedTask, section: &str, parent: Option<&str>) -> ChecklistItem {
    let content = task.content.trim().to_string();
    let line = task.line_number + 1;
    ChecklistItem {
        id: generate_id(&content, line, parent),
        content,
        checked: task.checked,
        line,
        indent: task.indent,
        section: section.to_string(),
        parent: parent.map(str::to_string),
        children: Vec::new(),
    }
}

/// Builds the ID-carrying tree for a parsed document.
///
/// Nesting follows the indent stack: a task's parent is the closest preceding
/// task with a smaller indent. The stack resets at every section boundary.
pub fn build_checklist(parsed: &ParsedMarkdown) -> Vec<ChecklistItem> {
    let mut roots: Vec<ChecklistItem> = Vec::new();

    for section in &parsed.sections {
        // (indent, path) of the open ancestors.
        let mut stack: Vec<(usize, NodePath)> = Vec::new();

        for task in &section.tasks {
            while stack.last().is_some_and(|(indent, _)| *indent >= task.indent) {
                stack.pop();
            }

            let parent_path = stack.last().map(|(_, path)| path.clone());
            let path = match parent_path.and_then(|p| {
                let parent = node_at(&mut roots, &p)?;
                let item = make_item(task, &section.name, Some(&parent.id));
                parent.children.push(item);
                let mut child_path = p;
                child_path.push(parent.children.len() - 1);
                Some(child_path)
            }) {
                Some(path) => path,
                None => {
                    roots.push(make_item(task, &section.name, None));
                    vec![roots.len() - 1]
                }
            };
            stack.push((task.indent, path));
        }
    }

    roots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::parser::parse_markdown;

    #[test]
    fn id_is_eight_hex_chars_and_deterministic() {
        let a = generate_id("Write docs", 3, None);
        assert_eq!(a.len(), 8);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(a, generate_id("Write docs", 3, Some("root")));
        assert_ne!(a, generate_id("Write docs", 4, None));
        assert_ne!(a, generate_id("Write docs", 3, Some("abcd1234")));
    }

    #[test]
    fn missing_parent_hashes_as_root() {
        let expected = {
            let mut h = Sha256::new();
            h.update(b"root-1-a");
            format!("{:x}", h.finalize())[..8].to_string()
        };
        assert_eq!(generate_id("a", 1, None), expected);
    }

    #[test]
    fn tree_follows_indentation() {
        let parsed = parse_markdown("# T\n- [ ] a\n  - [x] b\n  - [ ] c\n- [ ] d");
        let items = build_checklist(&parsed);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].children.len(), 2);
        assert_eq!(items[0].children[0].parent.as_deref(), Some(items[0].id.as_str()));
        assert_eq!(items[0].children[0].line, 3);
        assert!(items[1].children.is_empty());
        assert!(find_item(&items, &items[0].children[1].id).is_some());
    }
}
