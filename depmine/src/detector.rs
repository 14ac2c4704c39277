use crate::parsers::is_dependency_file;
use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};

/// Files larger than this are not parsed
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Directories never searched for manifests
const SKIPPED_DIRS: [&str; 5] = [".venv", "venv", "node_modules", "__pycache__", "target"];

/// Finds dependency manifests under a project root
pub struct ManifestDetector {
    root: PathBuf,
}

impl ManifestDetector {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All manifest files under the root, sorted
    pub fn detect(&self) -> Result<Vec<PathBuf>> {
        if !self.root.exists() {
            bail!("path does not exist: {}", self.root.display());
        }

        if self.root.is_file() {
            let matches = self.root.to_str().is_some_and(is_dependency_file);
            return Ok(if matches { vec![self.root.clone()] } else { Vec::new() });
        }

        let mut found = Vec::new();
        Self::walk(&self.root, &mut found)
            .with_context(|| format!("failed to read directory {}", self.root.display()))?;
        found.sort();
        Ok(found)
    }

    fn walk(dir: &Path, found: &mut Vec<PathBuf>) -> Result<()> {
        for entry in fs::read_dir(dir)?.flatten() {
            let path = entry.path();
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            let name = entry.file_name();
            let name = name.to_string_lossy();

            if file_type.is_dir() {
                if name.starts_with('.') || SKIPPED_DIRS.iter().any(|skipped| name == *skipped) {
                    continue;
                }
                // An unreadable subdirectory shouldn't hide the rest of the tree
                if let Err(e) = Self::walk(&path, found) {
                    tracing::warn!(dir = %path.display(), "skipping directory: {e}");
                }
            } else if file_type.is_file() && is_dependency_file(&name) {
                found.push(path);
            }
        }
        Ok(())
    }
}

/// Read a manifest, returning `None` when it is larger than `max_bytes`
pub fn load(path: &Path, max_bytes: u64) -> Result<Option<String>> {
    let size = fs::metadata(path)
        .with_context(|| format!("failed to stat {}", path.display()))?
        .len();

    if size > max_bytes {
        tracing::warn!(
            file = %path.display(),
            size,
            limit = max_bytes,
            "file exceeds size limit, skipping"
        );
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(Some(content))
}
