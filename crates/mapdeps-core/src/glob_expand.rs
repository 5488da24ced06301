//! Wildcard expansion for datasets split across several files sharing a stem.

use std::path::{Path, PathBuf};

use glob::Pattern;

fn dataset_stem(shape_path: Option<&str>, reference: &str) -> PathBuf {
    let base = match shape_path {
        Some(root) if !root.is_empty() => Path::new(root).join(reference),
        _ => PathBuf::from(reference),
    };
    base.with_extension("")
}

/// Build the `<shape_path>/<reference>.*` pattern for a layer's DATA or
/// TILEINDEX value.
///
/// Any extension already on `reference` is dropped, and the literal part of
/// the path is escaped so brackets or asterisks in a file name match
/// themselves.
pub fn wildcard_pattern(shape_path: Option<&str>, reference: &str) -> String {
    let stem = dataset_stem(shape_path, reference);
    format!("{}.*", Pattern::escape(&stem.to_string_lossy()))
}

/// The same `<shape_path>/<reference>.*` location without glob escaping,
/// as a user would write it.
pub fn dataset_path(shape_path: Option<&str>, reference: &str) -> PathBuf {
    let mut path = dataset_stem(shape_path, reference).into_os_string();
    path.push(".*");
    PathBuf::from(path)
}

/// Expand `pattern` against the filesystem, sorted.
///
/// No match is an empty result. Entries that cannot be read while walking
/// directories are logged and skipped.
pub fn expand(pattern: &str) -> Result<Vec<PathBuf>, glob::PatternError> {
    let mut matches = Vec::new();
    for entry in glob::glob(pattern)? {
        match entry {
            Ok(path) => matches.push(path),
            Err(e) => {
                tracing::warn!(pattern, path = %e.path().display(), error = %e.error(), "Skipping unreadable glob match");
            }
        }
    }
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_pattern_replaces_extension() {
        assert_eq!(wildcard_pattern(None, "roads.shp"), "roads.*");
        assert_eq!(wildcard_pattern(None, "roads"), "roads.*");
    }

    #[test]
    fn test_pattern_prefixes_shape_path() {
        assert_eq!(wildcard_pattern(Some("data"), "roads"), "data/roads.*");
        assert_eq!(wildcard_pattern(Some(""), "roads"), "roads.*");
        assert_eq!(
            wildcard_pattern(Some("data"), "/abs/roads.shp"),
            "/abs/roads.*"
        );
    }

    #[test]
    fn test_pattern_escapes_metacharacters() {
        assert_eq!(wildcard_pattern(None, "roads[1]"), "roads[[]1[]].*");
    }

    #[test]
    fn test_dataset_path_keeps_metacharacters() {
        assert_eq!(
            dataset_path(Some("data"), "roads[1].shp"),
            PathBuf::from("data/roads[1].*")
        );
        assert_eq!(dataset_path(None, "roads"), PathBuf::from("roads.*"));
    }

    #[test]
    fn test_expand_matches_all_shards() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path();
        for name in ["roads.shp", "roads.dbf", "roads.shx", "rivers.shp"] {
            fs::write(dir.join(name), b"").unwrap();
        }

        let pattern = wildcard_pattern(dir.to_str(), "roads");
        let matches = expand(&pattern).unwrap();

        assert_eq!(
            matches,
            vec![
                dir.join("roads.dbf"),
                dir.join("roads.shp"),
                dir.join("roads.shx")
            ]
        );
    }

    #[test]
    fn test_expand_no_match_is_empty() {
        let temp = tempfile::tempdir().unwrap();
        let pattern = wildcard_pattern(temp.path().to_str(), "missing");
        assert!(expand(&pattern).unwrap().is_empty());
    }

    #[test]
    fn test_expand_invalid_pattern() {
        assert!(expand("a/***/b").is_err());
    }
}
