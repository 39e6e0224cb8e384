// File: src/controller.rs
//! Command workflows over checklist files.
//!
//! Every mutating command goes through `LocalStorage::update_document`, so the
//! read, the pure rewrite from `crate::rewrite` and the write happen under one
//! lock. The controller never prints; callers render the returned outcomes.
use crate::config::Config;
use crate::context::AppContext;
use crate::model::id::{ChecklistItem, build_checklist, find_item};
use crate::model::parser::parse_markdown;
use crate::model::priority::format_with_priority;
use crate::rewrite::{
    self, MergeOutcome, MergeSource, VacuumedSection, clear_done_section, insert_lines_into_section,
    insert_section, merge_documents, move_completed_tasks_to_done, normalize, sort_document,
    toggle_task_line, vacuum_completed,
};
use crate::scan::{self, CodeChecklist, ScanOptions, TodoFile};
use crate::storage::LocalStorage;
use crate::validation::{ValidationOptions, ValidationResult, validate_content};
use anyhow::{Context, Result, anyhow};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use strum::{AsRefStr, Display, EnumString};

pub const DEFAULT_TEMPLATE: &str = "# TODO\n\n## TODO\n\n## ICEBOX\n\n## COMPLETED\n";

pub const GTD_TEMPLATE: &str = "# TODO

## TODO
<!-- Active tasks that need to be done -->

## ICEBOX
<!-- Ideas and tasks for later consideration -->

## COMPLETED
<!-- Finished tasks for reference -->
";

/// Section receiving checklist items pulled out of source code.
const CODE_TASKS_SECTION: &str = "Tasks";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, AsRefStr, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Template {
    #[default]
    Default,
    Gtd,
}

impl Template {
    pub fn content(self) -> &'static str {
        match self {
            Template::Default => DEFAULT_TEMPLATE,
            Template::Gtd => GTD_TEMPLATE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOutcome {
    pub path: PathBuf,
    pub section: String,
    pub task: String,
    pub created_file: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub path: PathBuf,
    pub id: String,
    pub content: String,
    /// 1-based.
    pub line: usize,
    pub was_checked: bool,
    pub checked: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    pub sort: bool,
    pub completed: bool,
    pub vacuum: bool,
    pub force_clear: bool,
    pub code: bool,
    pub skip_validation: bool,
}

impl UpdateOptions {
    fn any_operation(&self) -> bool {
        self.sort || self.completed || self.vacuum || self.force_clear || self.code
    }
}

#[derive(Debug, Clone, Default)]
pub struct UpdateOutcome {
    /// Human-readable list of what was done.
    pub operations: Vec<String>,
    /// Lines removed by `--vacuum`, grouped by section.
    pub vacuumed: Vec<VacuumedSection>,
    /// Set when validation errors stopped the update.
    pub rejected: Option<ValidationResult>,
    /// Without operation flags: operations that would change something.
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    pub target: Option<PathBuf>,
    pub dry_run: bool,
    pub skip_empty: bool,
    pub remove_sources: bool,
}

#[derive(Debug, Clone)]
pub struct MergeReport {
    pub target: PathBuf,
    pub sources: Vec<TodoFile>,
    pub outcome: MergeOutcome,
    pub written: bool,
}

#[derive(Debug, Clone)]
pub struct ListedFile {
    pub file: TodoFile,
    pub items: Vec<ChecklistItem>,
}

#[derive(Clone)]
pub struct ChecklistController {
    pub ctx: Arc<dyn AppContext>,
    pub config: Config,
}

impl ChecklistController {
    pub fn new(ctx: Arc<dyn AppContext>, config: Config) -> Self {
        Self { ctx, config }
    }

    fn scan_options(&self) -> ScanOptions {
        ScanOptions::from(&self.config)
    }

    pub fn validation_options(&self) -> ValidationOptions {
        ValidationOptions {
            indent_size: self.config.indent_size,
            strict: self.config.strict,
        }
    }

    /// `file` or the configured default file in the working directory.
    pub fn resolve_file(&self, file: Option<&Path>) -> PathBuf {
        file.map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(&self.config.default_file))
    }

    /// The default file inside the per-user private directory.
    pub fn private_file(&self) -> Result<PathBuf> {
        Ok(self.ctx.get_private_dir()?.join(&self.config.default_file))
    }

    /// Adds an unchecked task, creating the file or the section when missing.
    pub fn add(
        &self,
        file: &Path,
        section: Option<&str>,
        text: &str,
        priority: Option<&str>,
    ) -> Result<AddOutcome> {
        if text.trim().is_empty() {
            return Err(anyhow!("Task text is empty"));
        }
        let section = section
            .unwrap_or(&self.config.default_section)
            .trim()
            .to_uppercase();
        let task = format_with_priority(text.trim(), priority)?;

        if !file.exists() {
            let content = format!("# TODO\n\n## {}\n\n- [ ] {}\n", section, task);
            LocalStorage::write_document(file, &content)?;
            log::info!("Created {} with section {}", file.display(), section);
            return Ok(AddOutcome {
                path: file.to_path_buf(),
                section,
                task,
                created_file: true,
            });
        }

        LocalStorage::update_document(file, |content| {
            Ok((rewrite::add_task(content, &section, &task), ()))
        })?;
        Ok(AddOutcome {
            path: file.to_path_buf(),
            section,
            task,
            created_file: false,
        })
    }

    /// Flips the item with `id` somewhere under `root`, or unchecks it with `force_off`.
    pub fn check(&self, root: &Path, id: &str, force_off: bool) -> Result<CheckOutcome> {
        for file in scan::find_todo_files(root, &self.scan_options())? {
            let content = LocalStorage::read_document(&file.path)?;
            if find_item(&build_checklist(&parse_markdown(&content)), id).is_none() {
                continue;
            }

            return LocalStorage::update_document(&file.path, |content| {
                // Resolve again under the lock; the file may have changed.
                let items = build_checklist(&parse_markdown(content));
                let item = find_item(&items, id)
                    .ok_or_else(|| anyhow!("Item {} changed while updating", id))?;
                let checked = !force_off && !item.checked;
                let updated = toggle_task_line(content, item.line - 1, checked)
                    .ok_or_else(|| anyhow!("No checkbox on line {}", item.line))?;
                let outcome = CheckOutcome {
                    path: file.path.clone(),
                    id: id.to_string(),
                    content: item.content.clone(),
                    line: item.line,
                    was_checked: item.checked,
                    checked,
                };
                Ok((updated, outcome))
            });
        }
        Err(anyhow!("No checklist item with ID {} under {}", id, root.display()))
    }

    /// Priority sort of every task run. Returns whether the file changed.
    pub fn sort(&self, file: &Path) -> Result<bool> {
        LocalStorage::update_document(file, |content| {
            let sorted = sort_document(content);
            let changed = sorted != content;
            Ok((sorted, changed))
        })
    }

    /// Runs the selected update steps in their fixed order.
    pub fn update(&self, file: &Path, options: &UpdateOptions) -> Result<UpdateOutcome> {
        let mut outcome = UpdateOutcome::default();

        if !options.any_operation() {
            if file.exists() {
                outcome.rejected = self.rejection(file, &LocalStorage::read_document(file)?, options);
            }
            if outcome.rejected.is_none() {
                outcome.suggestions = self.suggest_updates(file)?;
            }
            return Ok(outcome);
        }

        let code_items = if options.code {
            let dir = match file.parent() {
                Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
                _ => PathBuf::from("."),
            };
            scan::scan_code_checklists(&dir, &self.scan_options())?
        } else {
            Vec::new()
        };

        if !file.exists() && !code_items.is_empty() {
            LocalStorage::write_document(file, "# TODO\n")?;
        }

        LocalStorage::update_document(file, |original| {
            // Checked under the same lock as the write.
            if let Some(result) = self.rejection(file, original, options) {
                outcome.rejected = Some(result);
                return Ok((original.to_string(), ()));
            }
            let mut content = original.to_string();

            if options.code && !code_items.is_empty() {
                content = insert_code_items(&content, &code_items);
                outcome
                    .operations
                    .push(format!("added {} checklist items from code", code_items.len()));
            }

            if options.sort {
                let sorted = sort_document(&content);
                if sorted != content {
                    outcome.operations.push("sorted by priority".to_string());
                }
                content = sorted;
            }

            if options.vacuum {
                let result = vacuum_completed(&content);
                if result.removed_count() > 0 {
                    outcome
                        .operations
                        .push(format!("vacuumed {} completed tasks", result.removed_count()));
                }
                content = result.content;
                outcome.vacuumed = result.sections;
            } else if options.completed {
                let result = move_completed_tasks_to_done(&content);
                if result.moved_count > 0 {
                    outcome
                        .operations
                        .push(format!("moved {} completed tasks", result.moved_count));
                }
                content = result.content;
            }

            if options.force_clear {
                let cleared = clear_done_section(&content);
                if cleared != content {
                    outcome.operations.push("cleared completed section".to_string());
                }
                content = cleared;
            }

            Ok((normalize(&content), ()))
        })?;

        Ok(outcome)
    }

    /// The validation result that blocks an update of `content`, if it has errors.
    fn rejection(&self, file: &Path, content: &str, options: &UpdateOptions) -> Option<ValidationResult> {
        if options.skip_validation {
            return None;
        }
        let result = validate_content(content, &self.validation_options());
        if result.valid {
            return None;
        }
        log::warn!("{} has validation errors, update aborted", file.display());
        Some(result)
    }

    fn suggest_updates(&self, file: &Path) -> Result<Vec<String>> {
        let parsed = parse_markdown(&LocalStorage::read_document(file)?);
        let open_sections = parsed.sections.iter().filter(|s| !s.is_completed_section());

        let mut has_priority = false;
        let mut has_completed = false;
        for task in open_sections.flat_map(|s| s.tasks.iter()) {
            has_priority |= task.priority.is_some();
            has_completed |= task.checked;
        }

        let mut suggestions = Vec::new();
        if has_priority {
            suggestions.push("--sort: sort tasks by priority".to_string());
        }
        if has_completed {
            suggestions.push("--done: move completed tasks to the COMPLETED section".to_string());
            suggestions.push("--vacuum: remove completed tasks and print them".to_string());
        }
        Ok(suggestions)
    }

    /// Writes a template `TODO.md` into `dir`.
    pub fn init(&self, dir: &Path, template: Template, force: bool) -> Result<PathBuf> {
        let path = dir.join(&self.config.default_file);
        if path.exists() && !force {
            return Err(anyhow!(
                "{} already exists. Use --force to overwrite.",
                path.display()
            ));
        }
        LocalStorage::write_document(&path, template.content())?;
        log::info!("Initialized {} from the {} template", path.display(), template);
        Ok(path)
    }

    /// Folds every checklist file under `root` into the target document.
    pub fn merge(&self, root: &Path, options: &MergeOptions) -> Result<MergeReport> {
        let target = options
            .target
            .clone()
            .unwrap_or_else(|| root.join(&self.config.default_file));
        let target_abs = std::path::absolute(&target).unwrap_or_else(|_| target.clone());

        let mut sources = Vec::new();
        let mut files = Vec::new();
        for file in scan::find_todo_files(root, &self.scan_options())? {
            let abs = std::path::absolute(&file.path).unwrap_or_else(|_| file.path.clone());
            if abs == target_abs {
                continue;
            }
            let content = match LocalStorage::read_document(&file.path) {
                Ok(c) => c,
                Err(e) => {
                    log::warn!("Could not read {}: {:#}", file.path.display(), e);
                    continue;
                }
            };
            if options.skip_empty && parse_markdown(&content).tasks().next().is_none() {
                log::debug!("Skipping {} (no tasks)", file.relative);
                continue;
            }
            sources.push(MergeSource {
                label: file.relative.clone(),
                content,
            });
            files.push(file);
        }

        let current = if target.exists() {
            LocalStorage::read_document(&target)?
        } else {
            String::new()
        };
        let outcome = merge_documents(&current, &sources);

        if options.dry_run || files.is_empty() {
            return Ok(MergeReport {
                target,
                sources: files,
                outcome,
                written: false,
            });
        }

        if target.exists() {
            let merged = outcome.content.clone();
            LocalStorage::update_document(&target, |_| Ok((merged, ())))?;
        } else {
            LocalStorage::write_document(&target, &outcome.content)?;
        }

        if options.remove_sources {
            for file in &files {
                std::fs::remove_file(&file.path)
                    .with_context(|| format!("Failed to remove {}", file.path.display()))?;
                log::info!("Removed {}", file.relative);
            }
        }

        Ok(MergeReport {
            target,
            sources: files,
            outcome,
            written: true,
        })
    }

    /// Validates each file; unreadable files become failing results.
    pub fn validate(&self, files: &[PathBuf]) -> Vec<(String, ValidationResult)> {
        let options = self.validation_options();
        files
            .iter()
            .map(|path| {
                let label = path.display().to_string();
                let result = match LocalStorage::read_document(path) {
                    Ok(content) => validate_content(&content, &options),
                    Err(e) => ValidationResult::unreadable(&format!("{:#}", e)),
                };
                (label, result)
            })
            .collect()
    }

    /// Checklist trees of every checklist file under `root`.
    pub fn list(&self, root: &Path) -> Result<Vec<ListedFile>> {
        scan::find_todo_files(root, &self.scan_options())?
            .into_iter()
            .map(|file| {
                let content = LocalStorage::read_document(&file.path)?;
                let items = build_checklist(&parse_markdown(&content));
                Ok(ListedFile { file, items })
            })
            .collect()
    }

    /// Checkbox items in source files under `root`.
    pub fn scan(&self, root: &Path, unchecked_only: bool) -> Result<Vec<CodeChecklist>> {
        let mut items = scan::scan_code_checklists(root, &self.scan_options())?;
        if unchecked_only {
            items.retain(|i| !i.checked);
        }
        Ok(items)
    }
}

/// Appends code checklist items to the TASKS or TODO section, or to a new
/// `Tasks` section.
fn insert_code_items(content: &str, items: &[CodeChecklist]) -> String {
    let lines: Vec<String> = items
        .iter()
        .map(|i| format!("- [{}] {}", if i.checked { "x" } else { " " }, i.content))
        .collect();

    let parsed = parse_markdown(content);
    let existing = parsed
        .find_section("TASKS")
        .or_else(|| parsed.find_section("TODO"));
    if let Some(section) = existing {
        return insert_lines_into_section(&parsed.lines, section, lines, None).join("\n");
    }

    let with_section = insert_section(&parsed.lines, CODE_TASKS_SECTION, 2).join("\n");
    let reparsed = parse_markdown(&with_section);
    match reparsed.find_section(CODE_TASKS_SECTION) {
        Some(section) => insert_lines_into_section(&reparsed.lines, section, lines, None).join("\n"),
        None => with_section,
    }
}
