// File: ./src/rewrite/normalize.rs
// Blank-line normalization applied after structural rewrites.
use crate::model::classifier::classify_lines;
use crate::model::parser::parse_heading;

/// Collapses blank-line runs, puts a blank line after every heading, trims
/// trailing blank lines and ends the text with exactly one newline.
///
/// Lines inside code blocks are copied as they are, blank runs included; only
/// the blank line after a heading that opens onto a fence is added. A document
/// with nothing but blank lines normalizes to the empty string.
pub fn normalize(content: &str) -> String {
    let lines: Vec<&str> = content.split('\n').collect();
    let contexts = classify_lines(&lines);

    let mut out: Vec<&str> = Vec::with_capacity(lines.len());
    let mut prev_blank = false;
    let mut prev_heading = false;

    for (line, ctx) in lines.iter().zip(&contexts) {
        let blank = line.trim().is_empty();

        if prev_heading && !blank {
            out.push("");
        }

        if ctx.in_code_block {
            out.push(line);
            prev_blank = blank;
            prev_heading = false;
            continue;
        }

        if blank && prev_blank {
            continue;
        }
        out.push(line);

        prev_blank = blank;
        prev_heading = parse_heading(line).is_some();
    }

    while out.last().is_some_and(|l| l.trim().is_empty()) {
        out.pop();
    }

    if out.is_empty() {
        return String::new();
    }
    let mut result = out.join("\n");
    result.push('\n');
    result
}
