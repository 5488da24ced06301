//! FONTSET file loading.
//!
//! A fontset is a plain text file with one `alias  file` pair per line.
//! Relative font files are relative to the fontset file itself.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub fn load_fontset(path: &Path) -> Result<HashMap<String, PathBuf>> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let dir = path.parent().unwrap_or(Path::new(""));
    let fonts = parse_fontset(&content, dir);
    tracing::debug!(fontset = %path.display(), fonts = fonts.len(), "Loaded fontset");
    Ok(fonts)
}

pub fn parse_fontset(content: &str, fontset_dir: &Path) -> HashMap<String, PathBuf> {
    let mut fonts = HashMap::new();
    for (number, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut parts = line.split_whitespace().map(unquote);
        let (Some(alias), Some(file)) = (parts.next(), parts.next()) else {
            tracing::debug!(line = number + 1, "Skipping fontset line without a file");
            continue;
        };
        fonts.insert(alias.to_string(), fontset_dir.join(file));
    }
    fonts
}

fn unquote(s: &str) -> &str {
    s.trim_matches(|c| c == '"' || c == '\'')
}
