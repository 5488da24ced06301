//! Read-only accessor contract over a parsed map.
//!
//! The walker only ever sees a map through [`MapSource`], so it can run over
//! any model that exposes these accessors. [`Map`] from `mapdeps-mapfile`
//! is the production implementation.

use std::path::{Path, PathBuf};

use mapdeps_mapfile::{Layer, Map, OutputFormat, Symbol, Web};

pub trait MapSource {
    /// The document itself, registered as a dependency by [`inspect`](crate::inspect).
    fn mapfile(&self) -> Option<&Path>;

    /// Files spliced into the document through INCLUDE.
    fn includes(&self) -> &[PathBuf];

    /// Base directory; the walker switches into it for the traversal.
    fn map_path(&self) -> Option<&Path>;

    /// Search root prefixed to layer DATA and TILEINDEX values.
    fn shape_path(&self) -> Option<&str>;

    fn fontset_filename(&self) -> Option<&str>;

    fn symbolset_filename(&self) -> Option<&str>;

    /// Font file registered under `alias` in the fontset.
    fn lookup_font(&self, alias: &str) -> Option<&Path>;

    fn font_count(&self) -> usize;

    /// Every symbol in definition order.
    fn symbols(&self) -> &[Symbol];

    fn output_formats(&self) -> &[OutputFormat];

    fn web(&self) -> &Web;

    fn layers(&self) -> &[Layer];
}

impl MapSource for Map {
    fn mapfile(&self) -> Option<&Path> {
        (!self.mapfile.as_os_str().is_empty()).then_some(self.mapfile.as_path())
    }

    fn includes(&self) -> &[PathBuf] {
        &self.includes
    }

    fn map_path(&self) -> Option<&Path> {
        self.map_path.as_deref()
    }

    fn shape_path(&self) -> Option<&str> {
        self.shape_path.as_deref()
    }

    fn fontset_filename(&self) -> Option<&str> {
        self.fontset.filename.as_deref()
    }

    fn symbolset_filename(&self) -> Option<&str> {
        self.symbolset.filename.as_deref()
    }

    fn lookup_font(&self, alias: &str) -> Option<&Path> {
        self.fontset.lookup(alias)
    }

    fn font_count(&self) -> usize {
        self.fontset.fonts.len()
    }

    fn symbols(&self) -> &[Symbol] {
        &self.symbolset.symbols
    }

    fn output_formats(&self) -> &[OutputFormat] {
        &self.output_formats
    }

    fn web(&self) -> &Web {
        &self.web
    }

    fn layers(&self) -> &[Layer] {
        &self.layers
    }
}
