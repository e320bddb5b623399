//! Session over a directory of script files.
//!
//! Script paths are `/`-separated, relative to the root, and start with a
//! leading `/` (e.g. `/config.production/grant.sh`), so the name of the
//! root directory itself never takes part in run-mode scoping.

use std::fs;
use std::path::{Component, Path, PathBuf};

use onstart_core::error::{CoreError, CoreResult};
use onstart_core::session::{Session, SessionFactory};

/// Default file extension treated as a script.
pub const DEFAULT_SCRIPT_EXTENSION: &str = "sh";

/// Opens [`DirectorySession`]s rooted at a fixed directory.
#[derive(Debug, Clone)]
pub struct DirectorySessionFactory {
    root: PathBuf,
    extension: String,
}

impl DirectorySessionFactory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extension: DEFAULT_SCRIPT_EXTENSION.to_string(),
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }
}

impl SessionFactory for DirectorySessionFactory {
    fn open(&self) -> CoreResult<Box<dyn Session>> {
        if !self.root.is_dir() {
            return Err(CoreError::Session(format!(
                "Script root is not a directory: {}",
                self.root.display()
            )));
        }
        tracing::debug!(root = %self.root.display(), "Opened directory session");
        Ok(Box::new(DirectorySession {
            root: self.root.clone(),
            extension: self.extension.clone(),
        }))
    }
}

/// Read access to the scripts below one directory.
#[derive(Debug)]
pub struct DirectorySession {
    root: PathBuf,
    extension: String,
}

impl DirectorySession {
    /// Map a script path to a file below the root, refusing `..` escapes.
    fn resolve(&self, path: &str) -> CoreResult<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(CoreError::Repository(format!(
                "Script path escapes the script root: {path}"
            )));
        }
        Ok(self.root.join(relative))
    }

    fn collect(&self, dir: &Path, out: &mut Vec<String>) -> CoreResult<()> {
        let entries = fs::read_dir(dir).map_err(|e| {
            CoreError::Repository(format!("Cannot list {}: {e}", dir.display()))
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| {
                CoreError::Repository(format!("Cannot list {}: {e}", dir.display()))
            })?;
            let path = entry.path();
            if path.is_dir() {
                self.collect(&path, out)?;
            } else if path.extension().is_some_and(|ext| ext == self.extension.as_str()) {
                out.push(self.script_path(&path));
            }
        }
        Ok(())
    }

    fn script_path(&self, file: &Path) -> String {
        let relative = file.strip_prefix(&self.root).unwrap_or(file);
        let segments: Vec<_> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect();
        format!("/{}", segments.join("/"))
    }
}

impl Session for DirectorySession {
    fn list_scripts(&self) -> CoreResult<Vec<String>> {
        let mut paths = Vec::new();
        self.collect(&self.root, &mut paths)?;
        paths.sort();
        Ok(paths)
    }

    fn read_script(&self, path: &str) -> CoreResult<String> {
        let file = self.resolve(path)?;
        fs::read_to_string(&file)
            .map_err(|e| CoreError::Repository(format!("Cannot read script {path}: {e}")))
    }

    fn commit(&mut self) -> CoreResult<()> {
        // Filesystem writes made by scripts are already durable.
        tracing::debug!(root = %self.root.display(), "Directory session commit");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
