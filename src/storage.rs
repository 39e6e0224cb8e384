// File: ./src/storage.rs
// Locked, atomic reads and writes of checklist documents.
use anyhow::{Context, Result};
use fs2::FileExt;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

const LOCK_DIR_NAME: &str = "pcheck-locks";

pub struct LocalStorage;

impl LocalStorage {
    /// Lock files live in the temp dir, keyed by a hash of the target path, so
    /// nothing is left next to the user's documents.
    fn get_lock_path(file_path: &Path) -> Result<PathBuf> {
        let dir = std::env::temp_dir().join(LOCK_DIR_NAME);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create lock directory: {:?}", dir))?;

        let absolute = std::path::absolute(file_path).unwrap_or_else(|_| file_path.to_path_buf());
        let mut hasher = Sha256::new();
        hasher.update(absolute.to_string_lossy().as_bytes());
        let digest = format!("{:x}", hasher.finalize());
        Ok(dir.join(format!("{}.lock", &digest[..16])))
    }

    /// Runs `f` while holding an exclusive advisory lock for `file_path`.
    pub fn with_lock<F, T>(file_path: &Path, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let lock_path = Self::get_lock_path(file_path)?;
        let file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .with_context(|| format!("Failed to open lock file: {:?}", lock_path))?;

        file.lock_exclusive()?;
        let result = f();
        file.unlock()?;
        result
    }

    /// Atomic write: write `<file>.tmp`, then rename over the target.
    pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> Result<()> {
        let path = path.as_ref();
        let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = path.with_file_name(tmp_name);

        fs::write(&tmp_path, contents)
            .with_context(|| format!("Failed to write {:?}", tmp_path))?;
        fs::rename(&tmp_path, path)
            .with_context(|| format!("Failed to replace {:?}", path))?;
        Ok(())
    }

    pub fn read_document(path: &Path) -> Result<String> {
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
    }

    /// Read, transform and write back under one lock.
    ///
    /// The file is rewritten only when `f` changed the text. Returns whatever
    /// `f` reports alongside the new content.
    pub fn update_document<F, T>(path: &Path, f: F) -> Result<T>
    where
        F: FnOnce(&str) -> Result<(String, T)>,
    {
        Self::with_lock(path, || {
            let original = Self::read_document(path)?;
            let (updated, report) = f(&original)?;
            if updated != original {
                Self::atomic_write(path, &updated)?;
                log::info!("Wrote {}", path.display());
            } else {
                log::debug!("{} unchanged", path.display());
            }
            Ok(report)
        })
    }

    /// Writes a whole new document under the lock.
    pub fn write_document(path: &Path, contents: &str) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
        Self::with_lock(path, || Self::atomic_write(path, contents))
    }
}
