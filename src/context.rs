// File: ./src/context.rs
/*! Filesystem context for configuration and private data.

`AppContext` decides where the config file and the private directory live.
`StandardContext` uses the platform directories (or an override root given
with `--root`); `TestContext` uses a throwaway temp directory.

Nothing here reads global state. Code that touches the filesystem outside the
documents it was given receives a `&dyn AppContext`.
*/

use anyhow::{Context, Result};
use directories::{BaseDirs, ProjectDirs};
use std::path::PathBuf;

/// Name of the per-user private directory under the home directory.
pub const PRIVATE_DIR_NAME: &str = ".todo";

pub trait AppContext: Send + Sync + std::fmt::Debug {
    fn get_config_dir(&self) -> Result<PathBuf>;

    /// Per-user directory for documents kept outside any project.
    fn get_private_dir(&self) -> Result<PathBuf>;

    fn get_config_file_path(&self) -> Result<PathBuf> {
        Ok(self.get_config_dir()?.join("config.toml"))
    }
}

#[derive(Clone, Debug, Default)]
pub struct StandardContext {
    override_root: Option<PathBuf>,
}

impl StandardContext {
    /// With `Some(root)`, everything lives under `root/config` and `root/private`.
    pub fn new(override_root: Option<PathBuf>) -> Self {
        Self { override_root }
    }

    fn ensure_exists(path: PathBuf) -> Result<PathBuf> {
        if !path.exists() {
            std::fs::create_dir_all(&path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(path)
    }
}

impl AppContext for StandardContext {
    fn get_config_dir(&self) -> Result<PathBuf> {
        if let Some(root) = &self.override_root {
            return Self::ensure_exists(root.join("config"));
        }
        let proj = ProjectDirs::from("com", "pcheck", "pcheck")
            .ok_or_else(|| anyhow::anyhow!("No home directory"))?;
        Self::ensure_exists(proj.config_dir().to_path_buf())
    }

    fn get_private_dir(&self) -> Result<PathBuf> {
        if let Some(root) = &self.override_root {
            return Ok(root.join("private"));
        }
        let base = BaseDirs::new().ok_or_else(|| anyhow::anyhow!("No home directory"))?;
        Ok(base.home_dir().join(PRIVATE_DIR_NAME))
    }
}

#[derive(Clone, Debug)]
pub struct TestContext {
    pub root: PathBuf,
}

impl TestContext {
    /// Creates a context backed by a unique temporary directory, removed on drop.
    pub fn new() -> Self {
        let root = std::env::temp_dir().join(format!("pcheck_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&root).expect("failed to create TestContext temp dir");
        Self { root }
    }

    /// A directory inside the root that tests can use as a project.
    pub fn workspace(&self) -> PathBuf {
        let p = self.root.join("workspace");
        let _ = std::fs::create_dir_all(&p);
        p
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl AppContext for TestContext {
    fn get_config_dir(&self) -> Result<PathBuf> {
        let p = self.root.join("config");
        std::fs::create_dir_all(&p)?;
        Ok(p)
    }

    fn get_private_dir(&self) -> Result<PathBuf> {
        Ok(self.root.join("private"))
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}
