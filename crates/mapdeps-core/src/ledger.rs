//! Canonical path reference counts.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;

/// Append-only map from canonical path to reference count.
///
/// Iteration follows the order in which each path was first recorded.
#[derive(Debug, Clone, Default)]
pub struct DependencyLedger {
    counts: IndexMap<PathBuf, usize>,
}

impl DependencyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one more reference to `path`, returning the new count.
    pub fn record(&mut self, path: PathBuf) -> usize {
        let count = self.counts.entry(path).or_insert(0);
        *count += 1;
        *count
    }

    pub fn count(&self, path: &Path) -> Option<usize> {
        self.counts.get(path).copied()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&Path, usize)> {
        self.counts.iter().map(|(path, count)| (path.as_path(), *count))
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
