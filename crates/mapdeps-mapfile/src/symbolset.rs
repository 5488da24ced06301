//! SYMBOLSET file loading.

use std::path::Path;

use crate::convert::symbol_from_block;
use crate::error::{Error, Result};
use crate::lexer::tokenize;
use crate::syntax::{find_block, parse_tree};
use crate::types::Symbol;

/// Read every SYMBOL defined in a `SYMBOLSET ... END` file.
///
/// Pixmap images are resolved against the symbolset file's directory.
pub fn load_symbolset(path: &Path) -> Result<Vec<Symbol>> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let dir = path.parent().unwrap_or(Path::new(""));
    let symbols = parse_symbolset(&content, &path.display().to_string(), dir)?;
    tracing::debug!(symbolset = %path.display(), symbols = symbols.len(), "Loaded symbolset");
    Ok(symbols)
}

pub fn parse_symbolset(content: &str, source_name: &str, base_dir: &Path) -> Result<Vec<Symbol>> {
    let nodes = parse_tree(tokenize(content, source_name)?)?;
    let block = find_block(&nodes, "SYMBOLSET").ok_or_else(|| {
        Error::syntax(1, format!("{} does not contain a SYMBOLSET block", source_name))
    })?;
    block
        .blocks()
        .filter(|b| b.keyword == "SYMBOL")
        .map(|b| symbol_from_block(b, base_dir))
        .collect()
}
