//! # mapdeps-mapfile
//!
//! Reader for MapServer mapfiles, producing a read-only [`Map`] model.
//!
//! Only the parts of the grammar that reference other files are modelled:
//! output formats, FONTSET and SYMBOLSET (both loaded eagerly), the WEB
//! block, and layers with their classes, styles and labels. Everything else
//! is parsed for structure and then ignored.
//!
//! ## Pipeline
//!
//! 1. `lexer` tokenizes the document and splices INCLUDE files.
//! 2. `syntax` builds a generic `KEYWORD ... END` block tree.
//! 3. `convert` maps the tree onto [`Map`], loading the fontset and symbolset.
//! 4. `substitute` applies VALIDATION `default_*` values to `%key%` tokens.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! let map = mapdeps_mapfile::load_map(Path::new("demo.map")).unwrap();
//! for layer in &map.layers {
//!     println!("{:?} uses {}", layer.name, layer.connection_type);
//! }
//! ```

mod convert;
mod error;
mod fontset;
mod lexer;
mod substitute;
mod symbolset;
mod syntax;
mod types;
mod version;

use std::path::{Path, PathBuf};

pub use error::{Error, MAX_INCLUDE_DEPTH, Result};
pub use fontset::{load_fontset, parse_fontset};
pub use substitute::apply_default_substitutions;
pub use symbolset::load_symbolset;
pub use types::{
    Class, ConnectionType, FontRef, FontSet, Label, Layer, Map, OutputFormat, Style, Symbol,
    SymbolKind, SymbolRef, SymbolSet, Web,
};
pub use version::version;

/// Read and parse the mapfile at `path`.
pub fn load_map(path: &Path) -> Result<Map> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    parse_map(&content, path)
}

/// Parse mapfile `content` as if it had been read from `path`.
///
/// `path` determines the map path: INCLUDE, FONTSET and SYMBOLSET
/// references are resolved against its directory.
pub fn parse_map(content: &str, path: &Path) -> Result<Map> {
    let map_path = map_directory(path)?;
    tracing::debug!(mapfile = %path.display(), map_path = %map_path.display(), "Loading mapfile");

    let mut includes = Vec::new();
    let tokens = lexer::tokenize_with_includes(content, path, &map_path, &mut includes)?;
    let nodes = syntax::parse_tree(tokens)?;
    let mut map = convert::map_from_tree(&nodes, path, &map_path, includes)?;
    apply_default_substitutions(&mut map);

    tracing::debug!(
        layers = map.layers.len(),
        symbols = map.symbolset.symbols.len(),
        fonts = map.fontset.fonts.len(),
        "Loaded mapfile"
    );
    Ok(map)
}

fn map_directory(path: &Path) -> Result<PathBuf> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::canonicalize(parent).map_err(|e| Error::io(parent, e))
}
