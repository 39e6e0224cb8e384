// File: ./src/config.rs
// Handles configuration loading, saving, and defaults.
use crate::context::AppContext;
use crate::storage::LocalStorage;
use anyhow::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

fn default_indent_size() -> usize {
    2
}
fn default_file() -> String {
    "TODO.md".to_string()
}
fn default_section() -> String {
    "TODO".to_string()
}
fn default_todo_file_names() -> Vec<String> {
    vec!["todo.md".to_string()]
}
fn default_exclude_dirs() -> Vec<String> {
    ["node_modules", ".git", "dist", "build", "target", "vendor", "coverage"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_code_extensions() -> Vec<String> {
    ["ts", "tsx", "js", "jsx", "py", "go", "rs", "java", "c", "cpp", "h", "hpp"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_true() -> bool {
    true
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Config {
    /// Spaces per nesting level for validation.
    #[serde(default = "default_indent_size")]
    pub indent_size: usize,
    /// Document used when a command gets no file argument.
    #[serde(default = "default_file")]
    pub default_file: String,
    #[serde(default = "default_section")]
    pub default_section: String,
    /// File names treated as checklist documents, compared case-insensitively.
    #[serde(default = "default_todo_file_names")]
    pub todo_file_names: Vec<String>,
    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,
    #[serde(default = "default_code_extensions")]
    pub code_extensions: Vec<String>,
    #[serde(default)]
    pub show_ids: bool,
    #[serde(default = "default_true")]
    pub color: bool,
    /// Treat validation warnings as failures.
    #[serde(default)]
    pub strict: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            // Match the serde defaults
            indent_size: default_indent_size(),
            default_file: default_file(),
            default_section: default_section(),
            todo_file_names: default_todo_file_names(),
            exclude_dirs: default_exclude_dirs(),
            code_extensions: default_code_extensions(),
            show_ids: false,
            color: true,
            strict: false,
        }
    }
}

impl Config {
    /// Load the configuration from the context's config file.
    /// A missing file yields the defaults; a malformed one is an error.
    pub fn load(ctx: &dyn AppContext) -> Result<Self> {
        let path = ctx.get_config_file_path()?;
        match Self::load_from(&path) {
            Err(e) if Self::is_missing_config_error(&e) => {
                log::debug!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Load an explicit config file (`--config`). The file must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found: {}", path.display()));
        }

        let contents = fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e)
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| {
            anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e)
        })?;

        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Whether an error from `load_from` means the file was simply absent.
    pub fn is_missing_config_error(err: &Error) -> bool {
        if err.to_string().starts_with("Config file not found") {
            return true;
        }
        err.chain().any(|cause| {
            cause
                .downcast_ref::<std::io::Error>()
                .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound)
        })
    }

    /// Save configuration using an explicit context.
    pub fn save(&self, ctx: &dyn AppContext) -> Result<()> {
        let path = ctx.get_config_file_path()?;
        LocalStorage::with_lock(&path, || {
            let toml_str = toml::to_string_pretty(self)?;
            LocalStorage::atomic_write(&path, toml_str)?;
            Ok(())
        })
    }
}
