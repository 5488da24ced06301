//! Path resolution against the working directory and the fallback root.

use std::path::{Path, PathBuf};

/// Outcome of resolving one reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The file exists; absolute, symlink-free identity.
    Found(PathBuf),
    /// The file is missing; where it was expected to be.
    NotFound(PathBuf),
}

/// Resolves candidate references to canonical paths.
///
/// Relative candidates are tested against the process working directory,
/// which the walker points at the map path for the whole traversal.
#[derive(Debug, Clone, Default)]
pub struct PathResolver {
    base: Option<PathBuf>,
    fallback_root: Option<PathBuf>,
}

impl PathResolver {
    /// `base` is used to report where a missing relative reference was
    /// expected. `fallback_root` is tried before anything else.
    pub fn new(base: Option<PathBuf>, fallback_root: Option<PathBuf>) -> Self {
        Self {
            base,
            fallback_root,
        }
    }

    /// Fallback root derived from a default mapfile path: its parent directory.
    pub fn fallback_from_default_mapfile(default_mapfile: &Path) -> Option<PathBuf> {
        default_mapfile
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
    }

    pub fn fallback_root(&self) -> Option<&Path> {
        self.fallback_root.as_deref()
    }

    pub fn resolve(&self, candidate: &Path) -> Resolution {
        // Some path-bearing fields of a default mapfile keep the path as
        // written rather than absolute, so the default mapfile's directory
        // is consulted first.
        if let Some(root) = &self.fallback_root {
            if let Some(canonical) = canonical_if_exists(&root.join(candidate)) {
                return Resolution::Found(canonical);
            }
        }

        if let Some(canonical) = canonical_if_exists(candidate) {
            return Resolution::Found(canonical);
        }

        Resolution::NotFound(self.expected_path(candidate))
    }

    /// Where `candidate` would be if it existed.
    pub fn expected_path(&self, candidate: &Path) -> PathBuf {
        match &self.base {
            Some(base) if candidate.is_relative() => base.join(candidate),
            _ => candidate.to_path_buf(),
        }
    }
}

fn canonical_if_exists(path: &Path) -> Option<PathBuf> {
    if !path.exists() {
        return None;
    }
    match std::fs::canonicalize(path) {
        Ok(canonical) => Some(canonical),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Existing path could not be canonicalized");
            None
        }
    }
}
