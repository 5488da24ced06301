//! Generic block tree built from the token stream.
//!
//! Mapfiles are a nest of `KEYWORD ... END` blocks holding directives. Which
//! keywords open a nested block depends on the enclosing block (`SYMBOL`
//! opens a block inside `MAP` but is a plain directive inside `STYLE`), so
//! the parser carries a [`Context`] and consults a fixed table. The typed
//! model is built from this tree in `convert`.

use crate::error::{Error, Result};
use crate::lexer::{Token, TokenKind};

/// A directive: keyword plus the values that followed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub keyword: String,
    pub values: Vec<Token>,
    pub line: usize,
}

impl Directive {
    /// First value of the directive, if any.
    pub fn first(&self) -> Option<&Token> {
        self.values.first()
    }
}

/// A `KEYWORD ... END` block.
///
/// Value-list blocks (METADATA, PROJECTION, POINTS, ...) keep their raw
/// tokens in `values` and have no children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub keyword: String,
    pub line: usize,
    pub children: Vec<Node>,
    pub values: Vec<Token>,
}

impl Block {
    pub fn directives(&self) -> impl Iterator<Item = &Directive> {
        self.children.iter().filter_map(|n| match n {
            Node::Directive(d) => Some(d),
            Node::Block(_) => None,
        })
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.children.iter().filter_map(|n| match n {
            Node::Block(b) => Some(b),
            Node::Directive(_) => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Directive(Directive),
    Block(Block),
}

/// Enclosing block kind, deciding which keywords open nested blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Context {
    Root,
    Map,
    Layer,
    Class,
    Style,
    Label,
    Leader,
    Web,
    Symbol,
    SymbolSet,
    Legend,
    Feature,
    ScaleToken,
    /// Blocks holding only directives (OUTPUTFORMAT, JOIN, QUERYMAP, ...).
    Plain,
}

enum Opening {
    Block(Context),
    ValueList,
}

fn opening(context: Context, keyword: &str) -> Option<Opening> {
    use Context::*;
    let list = matches!(
        (context, keyword),
        (Map | Layer | Class | Web, "METADATA" | "VALIDATION")
            | (Map | Layer, "PROJECTION")
            | (Layer, "CONNECTIONOPTIONS" | "BINDVALS")
            | (Symbol | Feature, "POINTS")
            | (Style, "PATTERN")
            | (ScaleToken, "VALUES")
    );
    if list {
        return Some(Opening::ValueList);
    }

    let nested = match (context, keyword) {
        (Root, "MAP") => Map,
        (Root, "SYMBOLSET") => SymbolSet,
        (Map, "LAYER") => Layer,
        (Map, "WEB") => Web,
        (Map | SymbolSet, "SYMBOL") => Symbol,
        (Map, "LEGEND" | "SCALEBAR") => Legend,
        (Map, "OUTPUTFORMAT" | "QUERYMAP" | "REFERENCE") => Plain,
        (Layer, "CLASS") => Class,
        (Layer, "FEATURE") => Feature,
        (Layer, "SCALETOKEN") => ScaleToken,
        (Layer, "JOIN" | "CLUSTER" | "GRID" | "COMPOSITE") => Plain,
        (Class | Label | Leader, "STYLE") => Style,
        (Class | Legend, "LABEL") => Label,
        (Class, "LEADER") => Leader,
        _ => return None,
    };
    Some(Opening::Block(nested))
}

/// Directives that take exactly one value.
const SINGLE_VALUE: &[&str] = &[
    "CHARACTER",
    "CLASSITEM",
    "CONNECTION",
    "CONNECTIONTYPE",
    "DATA",
    "DEBUG",
    "DRIVER",
    "EMPTY",
    "ERROR",
    "EXPRESSION",
    "EXTENSION",
    "FILLED",
    "FILTER",
    "FONT",
    "FONTSET",
    "FOOTER",
    "FORMATOPTION",
    "GROUP",
    "HEADER",
    "IMAGE",
    "IMAGEMODE",
    "IMAGEPATH",
    "IMAGEURL",
    "LABELITEM",
    "MAXTEMPLATE",
    "MIMETYPE",
    "MINTEMPLATE",
    "NAME",
    "PLUGIN",
    "SHAPEPATH",
    "STATUS",
    "STYLEITEM",
    "SYMBOL",
    "SYMBOLSET",
    "TEMPLATE",
    "TEXT",
    "TILEINDEX",
    "TILEITEM",
    "TYPE",
    "UNITS",
];

fn is_known_keyword(context: Context, keyword: &str) -> bool {
    keyword == "END" || SINGLE_VALUE.contains(&keyword) || opening(context, keyword).is_some()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Parse nodes until END (consumed) or, at the root, end of input.
    fn body(&mut self, context: Context, opener: Option<(&str, usize)>) -> Result<Vec<Node>> {
        let mut nodes = Vec::new();
        loop {
            let Some(token) = self.next() else {
                return match opener {
                    None => Ok(nodes),
                    Some((keyword, line)) => Err(Error::UnexpectedEof(format!(
                        "missing END for {} opened on line {}",
                        keyword, line
                    ))),
                };
            };

            let Some(keyword) = token.keyword() else {
                return Err(Error::syntax(
                    token.line,
                    format!("expected a keyword, found \"{}\"", token.text),
                ));
            };

            if keyword == "END" {
                if opener.is_none() {
                    return Err(Error::syntax(token.line, "END without an open block"));
                }
                return Ok(nodes);
            }

            match opening(context, &keyword) {
                Some(Opening::Block(nested)) => {
                    let children = self.body(nested, Some((&keyword, token.line)))?;
                    nodes.push(Node::Block(Block {
                        keyword,
                        line: token.line,
                        children,
                        values: Vec::new(),
                    }));
                }
                Some(Opening::ValueList) => {
                    let values = self.value_list(&keyword, token.line)?;
                    nodes.push(Node::Block(Block {
                        keyword,
                        line: token.line,
                        children: Vec::new(),
                        values,
                    }));
                }
                None => {
                    let values = self.directive_values(context, &keyword);
                    nodes.push(Node::Directive(Directive {
                        keyword,
                        values,
                        line: token.line,
                    }));
                }
            }
        }
    }

    fn value_list(&mut self, keyword: &str, line: usize) -> Result<Vec<Token>> {
        let mut values = Vec::new();
        loop {
            match self.next() {
                None => {
                    return Err(Error::UnexpectedEof(format!(
                        "missing END for {} opened on line {}",
                        keyword, line
                    )));
                }
                Some(t) if t.is_keyword("END") => return Ok(values),
                Some(t) => values.push(t),
            }
        }
    }

    /// Values of a directive, regardless of line breaks.
    ///
    /// Single-value keywords take the next token. Other directives take
    /// quoted, bracketed and numeric tokens, plus one leading bare word
    /// (`POSITION AUTO`), and stop at END or at the next keyword.
    fn directive_values(&mut self, context: Context, keyword: &str) -> Vec<Token> {
        let mut values = Vec::new();
        if SINGLE_VALUE.contains(&keyword) {
            if self.peek().is_some_and(|t| !t.is_keyword("END")) {
                values.extend(self.next());
            }
            return values;
        }

        while let Some(t) = self.peek() {
            if t.kind == TokenKind::Word {
                let upper = t.text.to_ascii_uppercase();
                if is_known_keyword(context, &upper) {
                    break;
                }
                if !values.is_empty() && t.text.parse::<f64>().is_err() {
                    break;
                }
            }
            values.extend(self.next());
        }
        values
    }
}

/// Build the block tree for a whole document.
pub fn parse_tree(tokens: Vec<Token>) -> Result<Vec<Node>> {
    let mut parser = Parser { tokens, pos: 0 };
    parser.body(Context::Root, None)
}

/// First top-level block named `keyword`.
pub fn find_block<'a>(nodes: &'a [Node], keyword: &str) -> Option<&'a Block> {
    nodes.iter().find_map(|n| match n {
        Node::Block(b) if b.keyword == keyword => Some(b),
        _ => None,
    })
}
