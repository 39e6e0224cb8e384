// File: ./src/model/priority.rs
// Maps inline priority tags to sort weights.
use anyhow::{Result, anyhow};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Weight used for tasks without a tag, and for tags that are not understood.
pub const DEFAULT_PRIORITY_VALUE: u32 = 100;

/// Largest numeric tag that is taken at face value.
pub const MAX_NUMERIC_PRIORITY: u32 = 999;

static PRIORITY_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*-\s*\[[x ]?\]\s*\[([^\]]+)\]").unwrap());

const NAMED_PRIORITIES: [(&str, u32); 3] = [("HIGH", 1), ("MID", 5), ("LOW", 10)];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Priority {
    /// Raw tag, uppercased. `None` when the line carries no tag.
    pub token: Option<String>,
    /// Lower sorts first.
    pub value: u32,
}

impl Default for Priority {
    fn default() -> Self {
        Self {
            token: None,
            value: DEFAULT_PRIORITY_VALUE,
        }
    }
}

/// Reads the `[TAG]` directly after the checkbox of a task line.
pub fn parse_priority(line: &str) -> Priority {
    let Some(caps) = PRIORITY_TAG.captures(line) else {
        return Priority::default();
    };
    let token = caps[1].to_uppercase();

    if let Some((_, value)) = NAMED_PRIORITIES.iter().find(|(name, _)| *name == token) {
        return Priority {
            token: Some(token),
            value: *value,
        };
    }

    let value = match leading_integer(&token) {
        Some(n) if (0..=MAX_NUMERIC_PRIORITY as i64).contains(&n) => n as u32,
        _ => DEFAULT_PRIORITY_VALUE,
    };
    Priority {
        token: Some(token),
        value,
    }
}

/// Integer prefix of a token: optional whitespace, optional sign, digits.
/// `"12abc"` reads as 12, `"abc"` as nothing.
fn leading_integer(token: &str) -> Option<i64> {
    let s = token.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    // Overlong digit runs are out of range anyway.
    let n: i64 = digits.parse().unwrap_or(i64::MAX);
    Some(if negative { -n } else { n })
}

/// Normalizes a priority given on the command line for a new task.
///
/// Accepts HIGH/MID/LOW in any case, P0-P3 bug levels (mapped onto the named
/// levels), and plain numbers 0-999.
pub fn validate_priority_input(input: &str) -> Result<String> {
    let upper = input.trim().to_uppercase();

    if NAMED_PRIORITIES.iter().any(|(name, _)| *name == upper) {
        return Ok(upper);
    }

    match upper.as_str() {
        "P0" | "P1" => return Ok("HIGH".to_string()),
        "P2" => return Ok("MID".to_string()),
        "P3" => return Ok("LOW".to_string()),
        _ => {}
    }

    if !upper.is_empty() && upper.chars().all(|c| c.is_ascii_digit()) {
        return match upper.parse::<u32>() {
            Ok(n) if n <= MAX_NUMERIC_PRIORITY => Ok(n.to_string()),
            _ => Err(anyhow!("Numeric priority should be between 0-999")),
        };
    }

    let has_digit = upper.chars().any(|c| c.is_ascii_digit());
    let has_letter = upper.chars().any(|c| c.is_ascii_alphabetic());
    if has_digit && has_letter {
        return Err(anyhow!(
            "Invalid priority format: \"{}\". Use either HIGH/MID/LOW, P0-P3, or a number (0-999).",
            input
        ));
    }
    Err(anyhow!(
        "Invalid priority: \"{}\". Use HIGH/MID/LOW, P0-P3, or a number (0-999).",
        input
    ))
}

/// Prefixes task text with its tag, e.g. `[HIGH] Fix login`.
pub fn format_with_priority(text: &str, priority: Option<&str>) -> Result<String> {
    match priority {
        Some(p) => Ok(format!("[{}] {}", validate_priority_input(p)?, text)),
        None => Ok(text.to_string()),
    }
}
