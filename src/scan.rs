// File: ./src/scan.rs
//! Discovery of checklist documents and of checkbox items in source code.
//!
//! Walking honours `.gitignore` files and skips any directory whose name is in
//! the configured exclude list.
use crate::config::Config;
use anyhow::{Result, anyhow};
use ignore::WalkBuilder;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

static CODE_CHECKBOX: Lazy<Regex> = Lazy::new(|| Regex::new(r"- \[([ x])\]").unwrap());

#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    pub exclude_dirs: Vec<String>,
    pub todo_file_names: Vec<String>,
    pub code_extensions: Vec<String>,
}

impl From<&Config> for ScanOptions {
    fn from(config: &Config) -> Self {
        Self {
            exclude_dirs: config.exclude_dirs.clone(),
            todo_file_names: config.todo_file_names.iter().map(|n| n.to_lowercase()).collect(),
            code_extensions: config.code_extensions.clone(),
        }
    }
}

/// A checklist document found under a scan root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TodoFile {
    pub path: PathBuf,
    /// Path relative to the scan root, with `/` separators.
    pub relative: String,
}

/// A checkbox item written inside a source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeChecklist {
    pub path: String,
    /// 1-based.
    pub line: usize,
    pub content: String,
    pub checked: bool,
    /// The whole line, trimmed.
    pub context: String,
    pub language: String,
}

fn relative_label(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// All regular files under `root`, sorted. A file root yields itself.
pub fn walk_files(root: &Path, exclude_dirs: &[String]) -> Result<Vec<PathBuf>> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }
    if !root.is_dir() {
        return Err(anyhow!("Path not found: {}", root.display()));
    }

    let excluded = exclude_dirs.to_vec();
    let walker = WalkBuilder::new(root)
        .hidden(false)
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
            !(is_dir && excluded.iter().any(|d| entry.file_name() == d.as_str()))
        })
        .build();

    let mut files = Vec::new();
    for entry in walker {
        match entry {
            Ok(entry) if entry.file_type().is_some_and(|ft| ft.is_file()) => {
                files.push(entry.into_path());
            }
            Ok(_) => {}
            Err(e) => log::warn!("Skipping unreadable entry: {}", e),
        }
    }
    files.sort();
    Ok(files)
}

/// Checklist documents under `root`, matched on file name.
pub fn find_todo_files(root: &Path, options: &ScanOptions) -> Result<Vec<TodoFile>> {
    let base = if root.is_file() {
        root.parent().unwrap_or(root)
    } else {
        root
    };

    let found: Vec<TodoFile> = walk_files(root, &options.exclude_dirs)?
        .into_iter()
        .filter(|path| {
            root.is_file()
                || path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_lowercase())
                    .is_some_and(|n| options.todo_file_names.contains(&n))
        })
        .map(|path| TodoFile {
            relative: relative_label(base, &path),
            path,
        })
        .collect();

    log::info!("Found {} checklist file(s) under {}", found.len(), root.display());
    Ok(found)
}

/// Checkbox items on the lines of one source text.
///
/// Every marker on a line yields an item; its text runs to the next `- [` or
/// the end of the line.
pub fn extract_code_checklists(content: &str, path: &str, language: &str) -> Vec<CodeChecklist> {
    let mut items = Vec::new();
    for (index, line) in content.lines().enumerate() {
        for caps in CODE_CHECKBOX.captures_iter(line) {
            let Some(marker) = caps.get(0) else {
                continue;
            };
            let rest = &line[marker.end()..];
            let text = rest.find("- [").map_or(rest, |end| &rest[..end]).trim();
            if text.is_empty() {
                continue;
            }
            items.push(CodeChecklist {
                path: path.to_string(),
                line: index + 1,
                content: text.to_string(),
                checked: &caps[1] == "x",
                context: line.trim().to_string(),
                language: language.to_string(),
            });
        }
    }
    items
}

/// Checkbox items in every source file under `root` with a configured extension.
pub fn scan_code_checklists(root: &Path, options: &ScanOptions) -> Result<Vec<CodeChecklist>> {
    let mut items = Vec::new();
    for path in walk_files(root, &options.exclude_dirs)? {
        let Some(ext) = path.extension().map(|e| e.to_string_lossy().to_string()) else {
            continue;
        };
        if !options.code_extensions.iter().any(|e| *e == ext) {
            continue;
        }
        // Binary or non-UTF-8 files are skipped.
        let Ok(content) = fs::read_to_string(&path) else {
            log::debug!("Skipping non-text file {}", path.display());
            continue;
        };
        items.extend(extract_code_checklists(
            &content,
            &path.to_string_lossy(),
            &ext,
        ));
    }
    log::info!("Found {} checklist item(s) in code", items.len());
    Ok(items)
}
