//! Typed, read-only map model produced by the reader.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// A fully loaded mapfile.
#[derive(Debug, Clone, Default)]
pub struct Map {
    pub name: Option<String>,
    /// The mapfile that was loaded.
    pub mapfile: PathBuf,
    /// Absolute directory of the mapfile; relative references resolve here.
    pub map_path: Option<PathBuf>,
    pub shape_path: Option<String>,
    pub fontset: FontSet,
    pub symbolset: SymbolSet,
    pub output_formats: Vec<OutputFormat>,
    pub web: Web,
    pub layers: Vec<Layer>,
    /// Files spliced in through INCLUDE, in reading order.
    pub includes: Vec<PathBuf>,
}

/// FONTSET file name plus its alias table.
#[derive(Debug, Clone, Default)]
pub struct FontSet {
    /// The FONTSET value as written in the mapfile.
    pub filename: Option<String>,
    /// Alias to absolute font file path.
    pub fonts: HashMap<String, PathBuf>,
}

impl FontSet {
    pub fn lookup(&self, alias: &str) -> Option<&Path> {
        self.fonts.get(alias).map(PathBuf::as_path)
    }
}

/// SYMBOLSET file name plus every known symbol.
///
/// Symbols from the SYMBOLSET file come first, followed by SYMBOL blocks
/// written inline in the MAP.
#[derive(Debug, Clone, Default)]
pub struct SymbolSet {
    pub filename: Option<String>,
    pub symbols: Vec<Symbol>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SymbolKind {
    #[default]
    Vector,
    Ellipse,
    Pixmap,
    Truetype,
    Hatch,
    Svg,
    Simple,
}

impl SymbolKind {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword.to_ascii_uppercase().as_str() {
            "VECTOR" => SymbolKind::Vector,
            "ELLIPSE" => SymbolKind::Ellipse,
            "PIXMAP" => SymbolKind::Pixmap,
            "TRUETYPE" => SymbolKind::Truetype,
            "HATCH" => SymbolKind::Hatch,
            "SVG" => SymbolKind::Svg,
            "SIMPLE" => SymbolKind::Simple,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct Symbol {
    pub name: Option<String>,
    pub kind: SymbolKind,
    /// Font alias for truetype symbols.
    pub font: Option<String>,
    /// IMAGE value as written.
    pub image: Option<String>,
    /// IMAGE joined to the directory of the file that defined the symbol.
    pub full_pixmap_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct OutputFormat {
    pub name: Option<String>,
    pub driver: String,
    pub format_options: Vec<String>,
}

/// The WEB block's file references.
#[derive(Debug, Clone, Default)]
pub struct Web {
    pub header: Option<String>,
    pub footer: Option<String>,
    pub empty: Option<String>,
    pub error: Option<String>,
    pub template: Option<String>,
    pub min_template: Option<String>,
    pub max_template: Option<String>,
    pub validation: Vec<(String, String)>,
}

/// Backend supplying a layer's data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionType {
    Inline,
    #[default]
    Shapefile,
    TiledShapefile,
    Ogr,
    Postgis,
    Wms,
    OracleSpatial,
    Wfs,
    Graticule,
    Mysql,
    Raster,
    Plugin,
    Union,
    UvRaster,
    Contour,
    /// Any other CONNECTIONTYPE value, verbatim.
    Other(String),
}

impl ConnectionType {
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword.to_ascii_uppercase().as_str() {
            "INLINE" => ConnectionType::Inline,
            "LOCAL" | "SHAPEFILE" => ConnectionType::Shapefile,
            "TILED_SHAPEFILE" => ConnectionType::TiledShapefile,
            "OGR" => ConnectionType::Ogr,
            "POSTGIS" => ConnectionType::Postgis,
            "WMS" => ConnectionType::Wms,
            "ORACLESPATIAL" => ConnectionType::OracleSpatial,
            "WFS" => ConnectionType::Wfs,
            "GRATICULE" => ConnectionType::Graticule,
            "MYSQL" => ConnectionType::Mysql,
            "RASTER" => ConnectionType::Raster,
            "PLUGIN" => ConnectionType::Plugin,
            "UNION" => ConnectionType::Union,
            "UVRASTER" => ConnectionType::UvRaster,
            "CONTOUR" => ConnectionType::Contour,
            _ => ConnectionType::Other(keyword.to_string()),
        }
    }
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            ConnectionType::Inline => "INLINE",
            ConnectionType::Shapefile => "SHAPEFILE",
            ConnectionType::TiledShapefile => "TILED_SHAPEFILE",
            ConnectionType::Ogr => "OGR",
            ConnectionType::Postgis => "POSTGIS",
            ConnectionType::Wms => "WMS",
            ConnectionType::OracleSpatial => "ORACLESPATIAL",
            ConnectionType::Wfs => "WFS",
            ConnectionType::Graticule => "GRATICULE",
            ConnectionType::Mysql => "MYSQL",
            ConnectionType::Raster => "RASTER",
            ConnectionType::Plugin => "PLUGIN",
            ConnectionType::Union => "UNION",
            ConnectionType::UvRaster => "UVRASTER",
            ConnectionType::Contour => "CONTOUR",
            ConnectionType::Other(raw) => raw,
        };
        f.write_str(tag)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Layer {
    pub name: Option<String>,
    pub connection_type: ConnectionType,
    pub connection: Option<String>,
    pub data: Option<String>,
    pub tileindex: Option<String>,
    pub header: Option<String>,
    pub footer: Option<String>,
    pub template: Option<String>,
    pub style_item: Option<String>,
    pub plugin_library: Option<String>,
    pub classes: Vec<Class>,
    pub validation: Vec<(String, String)>,
}

#[derive(Debug, Clone, Default)]
pub struct Class {
    pub name: Option<String>,
    pub template: Option<String>,
    pub styles: Vec<Style>,
    pub labels: Vec<Label>,
}

/// How a STYLE names its symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolRef {
    Index(u32),
    Name(String),
    /// Attribute binding, resolved per feature at render time.
    Binding(String),
}

#[derive(Debug, Clone, Default)]
pub struct Style {
    pub symbol: Option<SymbolRef>,
}

impl Style {
    pub fn symbol_name(&self) -> Option<&str> {
        match &self.symbol {
            Some(SymbolRef::Name(name)) => Some(name),
            _ => None,
        }
    }
}

/// How a LABEL names its font.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontRef {
    Name(String),
    Binding(String),
}

#[derive(Debug, Clone, Default)]
pub struct Label {
    pub font: Option<FontRef>,
    pub styles: Vec<Style>,
}

impl Label {
    pub fn font_name(&self) -> Option<&str> {
        match &self.font {
            Some(FontRef::Name(name)) => Some(name),
            _ => None,
        }
    }
}
