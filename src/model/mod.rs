// File: ./src/model/mod.rs
pub mod classifier;
pub mod id;
pub mod item;
pub mod parser;
pub mod priority;

pub use classifier::{LineContext, classify_lines, is_inside_code_block, is_inside_html_comment};
pub use id::{ChecklistItem, build_checklist, find_item, generate_id};
pub use item::{
    COMPLETED_SECTION, DONE_SECTION, ParsedMarkdown, ParsedSection, ParsedTask,
    find_completed_section, find_section, is_completed_name,
};
pub use parser::{parse_heading, parse_markdown, parse_task, parse_task_line};
pub use priority::{Priority, parse_priority, validate_priority_input};
