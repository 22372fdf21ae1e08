//! Temporary project layouts for end-to-end tests.
//!
//! A [`StepWorkspace`] owns a temporary directory holding step sources (under
//! `steps/` by default) and YAML sentence catalogs. Paths are UTF-8 so they
//! can be passed straight to the `stepcheck` binary.

use anyhow::{Context, Result, anyhow};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tempfile::TempDir;

/// Directory, relative to the workspace root, that holds step sources.
pub const STEPS_DIR: &str = "steps";

/// A temporary directory populated with step sources and catalogs.
#[derive(Debug)]
pub struct StepWorkspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl StepWorkspace {
    /// Create an empty workspace.
    ///
    /// # Errors
    ///
    /// Fails when the temporary directory cannot be created or its path is
    /// not UTF-8.
    pub fn new() -> Result<Self> {
        let dir = TempDir::new().context("create temporary workspace")?;
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
            .map_err(|path| anyhow!("workspace path {} is not UTF-8", path.display()))?;
        Ok(Self { _dir: dir, root })
    }

    /// Workspace root.
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Directory scanned for step sources.
    pub fn steps_dir(&self) -> Utf8PathBuf {
        self.root.join(STEPS_DIR)
    }

    /// Write `contents` to `relative`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Fails when the file or its parents cannot be written.
    pub fn write(&self, relative: &str, contents: &str) -> Result<Utf8PathBuf> {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create {parent}"))?;
        }
        fs::write(&path, contents).with_context(|| format!("write {path}"))?;
        Ok(path)
    }

    /// Write a Rust step source file named `file` under [`STEPS_DIR`].
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be written.
    pub fn write_steps(&self, file: &str, source: &str) -> Result<Utf8PathBuf> {
        self.write(&format!("{STEPS_DIR}/{file}"), source)
    }

    /// Write a YAML sentence catalog named `file` at the workspace root.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be written.
    pub fn write_catalog(&self, file: &str, yaml: &str) -> Result<Utf8PathBuf> {
        self.write(file, yaml)
    }
}
