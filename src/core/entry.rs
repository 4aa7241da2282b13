use crate::utils::{PackError, Result};
use std::path::{Path, PathBuf};

/// Source extensions an entry may have.
pub const ENTRY_EXTENSIONS: &[&str] = &["js", "ts"];

/// Resolves user-supplied entry paths against a project root.
pub struct EntryResolver {
    project_root: PathBuf,
}

impl EntryResolver {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
        }
    }

    /// Validates the extension, then returns the canonical absolute path of an existing entry.
    pub fn resolve(&self, raw: impl AsRef<Path>) -> Result<PathBuf> {
        let raw = raw.as_ref();

        if !has_entry_extension(raw) {
            return Err(PackError::InvalidEntryExtension {
                path: raw.to_path_buf(),
                allowed: ENTRY_EXTENSIONS.to_vec(),
            });
        }

        let absolute = if raw.is_absolute() {
            raw.to_path_buf()
        } else {
            self.project_root.join(raw)
        };

        if !absolute.is_file() {
            return Err(PackError::EntryNotFound(absolute));
        }

        Ok(absolute.canonicalize()?)
    }
}

pub fn has_entry_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ENTRY_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

/// Whether the entry is typed-script source.
pub fn is_typed_source(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some("ts")
}
