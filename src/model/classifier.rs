// File: ./src/model/classifier.rs
//! Line context classification.
//!
//! Decides whether a line of a Markdown document sits inside a fenced code
//! block, an indented code block, or an HTML comment. Checklist syntax found in
//! any of those places is example text, not a task.
//!
//! The per-index functions rescan from the top of the document every time.
//! `classify_lines` computes the same answers for every line in one pass and is
//! what the document parser uses.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Fenced,
    Indented,
}

/// Classification of a single line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineContext {
    pub in_code_block: bool,
    pub in_html_comment: bool,
}

impl LineContext {
    /// True when checklist syntax on this line must be ignored.
    pub fn is_hidden(&self) -> bool {
        self.in_code_block || self.in_html_comment
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct CodeBlockState {
    block: Option<BlockKind>,
}

impl CodeBlockState {
    fn step(&mut self, line: &str) {
        let blank = line.trim().is_empty();

        if is_fence(line) {
            match self.block {
                None => self.block = Some(BlockKind::Fenced),
                Some(BlockKind::Fenced) => self.block = None,
                // A fence inside an indented block is just indented text.
                Some(BlockKind::Indented) => {}
            }
        } else if has_code_indent(line) {
            if self.block.is_none() && !blank {
                self.block = Some(BlockKind::Indented);
            }
        } else if self.block == Some(BlockKind::Indented) && !blank {
            self.block = None;
        }
    }

    fn inside(&self) -> bool {
        self.block.is_some()
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct CommentState {
    inside: bool,
}

impl CommentState {
    fn step(&mut self, line: &str) {
        if line.contains("<!--") {
            self.inside = true;
        }
        // Checked after the opener so `<!-- x -->` on one line closes itself.
        if line.contains("-->") {
            self.inside = false;
        }
    }
}

fn is_fence(line: &str) -> bool {
    line.trim_start().starts_with("```")
}

/// Four leading spaces or a leading tab. Tabs are not expanded.
fn has_code_indent(line: &str) -> bool {
    line.starts_with("    ") || line.starts_with('\t')
}

/// Whether line `index` lies inside a fenced or indented code block.
///
/// An index past the end of the document is answered for the last line.
///
/// Known ambiguity: list items nested four or more spaces deep look exactly like
/// an indented code block and are classified as code.
pub fn is_inside_code_block<S: AsRef<str>>(lines: &[S], index: usize) -> bool {
    let mut state = CodeBlockState::default();
    for line in lines.iter().take(index.saturating_add(1)) {
        state.step(line.as_ref());
    }
    state.inside()
}

/// Whether line `index` lies inside an HTML comment.
pub fn is_inside_html_comment<S: AsRef<str>>(lines: &[S], index: usize) -> bool {
    let mut state = CommentState::default();
    for line in lines.iter().take(index.saturating_add(1)) {
        state.step(line.as_ref());
    }
    state.inside
}

/// Classifies every line of a document in a single pass.
///
/// `classify_lines(lines)[i]` always agrees with `is_inside_code_block(lines, i)`
/// and `is_inside_html_comment(lines, i)`.
pub fn classify_lines<S: AsRef<str>>(lines: &[S]) -> Vec<LineContext> {
    let mut code = CodeBlockState::default();
    let mut comment = CommentState::default();

    lines
        .iter()
        .map(|line| {
            let line = line.as_ref();
            code.step(line);
            comment.step(line);
            LineContext {
                in_code_block: code.inside(),
                in_html_comment: comment.inside,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<&str> {
        text.split('\n').collect()
    }

    #[test]
    fn fenced_block_toggles_on_parity() {
        let doc = lines("# T\n```\n- [ ] fake\n```\n- [ ] real");
        assert!(!is_inside_code_block(&doc, 0));
        assert!(is_inside_code_block(&doc, 1));
        assert!(is_inside_code_block(&doc, 2));
        assert!(!is_inside_code_block(&doc, 3));
        assert!(!is_inside_code_block(&doc, 4));
    }

    #[test]
    fn fence_with_language_and_indent_still_counts() {
        let doc = lines("  ```rust\n- [ ] fake\n  ```");
        assert!(is_inside_code_block(&doc, 1));
        assert!(!is_inside_code_block(&doc, 2));
    }

    #[test]
    fn indented_block_opens_and_closes() {
        let doc = lines("text\n    code\n\n    more code\nback to text");
        assert!(is_inside_code_block(&doc, 1));
        // Blank lines do not close an indented block.
        assert!(is_inside_code_block(&doc, 2));
        assert!(is_inside_code_block(&doc, 3));
        assert!(!is_inside_code_block(&doc, 4));
    }

    #[test]
    fn tab_opens_indented_block() {
        let doc = lines("\t- [ ] tabbed");
        assert!(is_inside_code_block(&doc, 0));
    }

    #[test]
    fn deeply_nested_list_item_is_misread_as_code() {
        // Documented false positive: a four-space sub-bullet looks like code.
        let doc = lines("- [ ] parent\n  - [ ] child\n    - [ ] grandchild");
        assert!(!is_inside_code_block(&doc, 1));
        assert!(is_inside_code_block(&doc, 2));
    }

    #[test]
    fn html_comment_spans_lines() {
        let doc = lines("<!--\n- [ ] hidden\n-->\n- [ ] shown");
        assert!(is_inside_html_comment(&doc, 0));
        assert!(is_inside_html_comment(&doc, 1));
        assert!(!is_inside_html_comment(&doc, 2));
        assert!(!is_inside_html_comment(&doc, 3));
    }

    #[test]
    fn single_line_comment_closes_itself() {
        let doc = lines("<!-- note --> - [ ] x");
        assert!(!is_inside_html_comment(&doc, 0));
    }

    #[test]
    fn out_of_range_index_scans_whole_document() {
        let doc = lines("```\ncode");
        assert!(is_inside_code_block(&doc, 99));
    }

    #[test]
    fn one_pass_classification_matches_per_index_contract() {
        let doc = lines(
            "# Doc\n- [ ] a\n```\n- [ ] b\n```\n    indented\n<!-- open\n- [ ] c\nclose -->\n\t- [ ] d\n- [ ] e",
        );
        let contexts = classify_lines(&doc);
        assert_eq!(contexts.len(), doc.len());
        for (i, ctx) in contexts.iter().enumerate() {
            assert_eq!(ctx.in_code_block, is_inside_code_block(&doc, i), "code at {}", i);
            assert_eq!(ctx.in_html_comment, is_inside_html_comment(&doc, i), "comment at {}", i);
        }
    }
}
