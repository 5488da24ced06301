//! Conversion from the generic block tree to the typed map model.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::fontset::load_fontset;
use crate::lexer::TokenKind;
use crate::symbolset::load_symbolset;
use crate::syntax::{Block, Directive, Node, find_block};
use crate::types::{
    Class, ConnectionType, FontRef, Label, Layer, Map, OutputFormat, Style, Symbol, SymbolKind,
    SymbolRef, Web,
};

fn text(d: &Directive) -> Result<String> {
    d.first()
        .map(|t| t.text.clone())
        .ok_or_else(|| Error::InvalidValue {
            line: d.line,
            keyword: d.keyword.clone(),
            message: "missing value".to_string(),
        })
}

fn pairs(block: &Block) -> Vec<(String, String)> {
    block
        .values
        .chunks_exact(2)
        .map(|kv| (kv[0].text.clone(), kv[1].text.clone()))
        .collect()
}

/// Build a [`Map`] from a parsed mapfile tree.
///
/// `map_path` is the absolute directory of the mapfile. FONTSET and
/// SYMBOLSET files are read relative to it.
pub fn map_from_tree(
    nodes: &[Node],
    mapfile: &Path,
    map_path: &Path,
    includes: Vec<PathBuf>,
) -> Result<Map> {
    let block = find_block(nodes, "MAP").ok_or(Error::MissingMap)?;

    let mut map = Map {
        mapfile: mapfile.to_path_buf(),
        map_path: Some(map_path.to_path_buf()),
        includes,
        ..Map::default()
    };
    let mut inline_symbols = Vec::new();

    for node in &block.children {
        match node {
            Node::Directive(d) => match d.keyword.as_str() {
                "NAME" => map.name = Some(text(d)?),
                "SHAPEPATH" => map.shape_path = Some(text(d)?),
                "FONTSET" => map.fontset.filename = Some(text(d)?),
                "SYMBOLSET" => map.symbolset.filename = Some(text(d)?),
                _ => {}
            },
            Node::Block(b) => match b.keyword.as_str() {
                "OUTPUTFORMAT" => map.output_formats.push(output_format_from_block(b)?),
                "WEB" => map.web = web_from_block(b)?,
                "LAYER" => map.layers.push(layer_from_block(b)?),
                "SYMBOL" => inline_symbols.push(symbol_from_block(b, map_path)?),
                _ => {}
            },
        }
    }

    if let Some(filename) = &map.fontset.filename {
        map.fontset.fonts = load_fontset(&map_path.join(filename))?;
    }
    if let Some(filename) = &map.symbolset.filename {
        map.symbolset.symbols = load_symbolset(&map_path.join(filename))?;
    }
    map.symbolset.symbols.extend(inline_symbols);

    Ok(map)
}

fn output_format_from_block(block: &Block) -> Result<OutputFormat> {
    let mut format = OutputFormat::default();
    for d in block.directives() {
        match d.keyword.as_str() {
            "NAME" => format.name = Some(text(d)?),
            "DRIVER" => format.driver = text(d)?,
            "FORMATOPTION" => format.format_options.push(text(d)?),
            _ => {}
        }
    }
    Ok(format)
}

fn web_from_block(block: &Block) -> Result<Web> {
    let mut web = Web::default();
    for d in block.directives() {
        let slot = match d.keyword.as_str() {
            "HEADER" => &mut web.header,
            "FOOTER" => &mut web.footer,
            "EMPTY" => &mut web.empty,
            "ERROR" => &mut web.error,
            "TEMPLATE" => &mut web.template,
            "MINTEMPLATE" => &mut web.min_template,
            "MAXTEMPLATE" => &mut web.max_template,
            _ => continue,
        };
        *slot = Some(text(d)?);
    }
    if let Some(validation) = block.blocks().find(|b| b.keyword == "VALIDATION") {
        web.validation = pairs(validation);
    }
    Ok(web)
}

fn layer_from_block(block: &Block) -> Result<Layer> {
    let mut layer = Layer::default();
    for node in &block.children {
        match node {
            Node::Directive(d) => {
                let slot = match d.keyword.as_str() {
                    "CONNECTIONTYPE" => {
                        layer.connection_type = ConnectionType::from_keyword(&text(d)?);
                        continue;
                    }
                    "NAME" => &mut layer.name,
                    "CONNECTION" => &mut layer.connection,
                    "DATA" => &mut layer.data,
                    "TILEINDEX" => &mut layer.tileindex,
                    "HEADER" => &mut layer.header,
                    "FOOTER" => &mut layer.footer,
                    "TEMPLATE" => &mut layer.template,
                    "STYLEITEM" => &mut layer.style_item,
                    "PLUGIN" => &mut layer.plugin_library,
                    _ => continue,
                };
                *slot = Some(text(d)?);
            }
            Node::Block(b) => match b.keyword.as_str() {
                "CLASS" => layer.classes.push(class_from_block(b)?),
                "FEATURE" => layer.connection_type = ConnectionType::Inline,
                "VALIDATION" => layer.validation = pairs(b),
                _ => {}
            },
        }
    }
    Ok(layer)
}

fn class_from_block(block: &Block) -> Result<Class> {
    let mut class = Class::default();
    for d in block.directives() {
        match d.keyword.as_str() {
            "NAME" => class.name = Some(text(d)?),
            "TEMPLATE" => class.template = Some(text(d)?),
            _ => {}
        }
    }
    for b in block.blocks() {
        match b.keyword.as_str() {
            "STYLE" => class.styles.push(style_from_block(b)),
            "LABEL" => class.labels.push(label_from_block(b)),
            _ => {}
        }
    }
    Ok(class)
}

fn style_from_block(block: &Block) -> Style {
    let symbol = block
        .directives()
        .filter(|d| d.keyword == "SYMBOL")
        .filter_map(|d| d.first())
        .map(|t| match t.kind {
            TokenKind::Binding => SymbolRef::Binding(t.text.clone()),
            TokenKind::Word => match t.text.parse::<u32>() {
                Ok(index) => SymbolRef::Index(index),
                Err(_) => SymbolRef::Name(t.text.clone()),
            },
            _ => SymbolRef::Name(t.text.clone()),
        })
        .last();
    Style { symbol }
}

fn label_from_block(block: &Block) -> Label {
    let font = block
        .directives()
        .filter(|d| d.keyword == "FONT")
        .filter_map(|d| d.first())
        .map(|t| match t.kind {
            TokenKind::Binding => FontRef::Binding(t.text.clone()),
            _ => FontRef::Name(t.text.clone()),
        })
        .last();
    let styles = block
        .blocks()
        .filter(|b| b.keyword == "STYLE")
        .map(style_from_block)
        .collect();
    Label { font, styles }
}

/// Build a [`Symbol`]; pixmap and SVG images are joined to `base_dir`.
pub fn symbol_from_block(block: &Block, base_dir: &Path) -> Result<Symbol> {
    let mut symbol = Symbol::default();
    for d in block.directives() {
        match d.keyword.as_str() {
            "NAME" => symbol.name = Some(text(d)?),
            "FONT" => symbol.font = Some(text(d)?),
            "IMAGE" => symbol.image = Some(text(d)?),
            "TYPE" => {
                let value = text(d)?;
                symbol.kind =
                    SymbolKind::from_keyword(&value).ok_or_else(|| Error::InvalidValue {
                        line: d.line,
                        keyword: "TYPE".to_string(),
                        message: format!("unknown symbol type {}", value),
                    })?;
            }
            _ => {}
        }
    }
    if matches!(symbol.kind, SymbolKind::Pixmap | SymbolKind::Svg) {
        symbol.full_pixmap_path = symbol.image.as_ref().map(|image| base_dir.join(image));
    }
    Ok(symbol)
}
