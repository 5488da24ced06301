//! Tokenizer for the mapfile syntax, with INCLUDE expansion.

use std::path::{Path, PathBuf};

use crate::error::{Error, MAX_INCLUDE_DEPTH, Result};

/// Lexical category of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Bare word: keyword, number, or unquoted value.
    Word,
    /// Single- or double-quoted string, quotes removed.
    Quoted,
    /// Attribute binding such as `[size]`, brackets removed.
    Binding,
    /// Parenthesised expression, kept verbatim including the parentheses.
    Expression,
    /// Regular expression literal `/.../`, slashes removed.
    Regex,
    /// Brace list such as `{a,b}`, kept verbatim.
    List,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
}

impl Token {
    /// True if this is a bare word equal to `keyword`, ignoring case.
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Word && self.text.eq_ignore_ascii_case(keyword)
    }

    /// Keyword spelling used for table lookups.
    pub fn keyword(&self) -> Option<String> {
        (self.kind == TokenKind::Word).then(|| self.text.to_ascii_uppercase())
    }
}

struct Lexer<'a> {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    source_name: &'a str,
}

impl<'a> Lexer<'a> {
    fn new(source: &str, source_name: &'a str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            source_name,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn skip_trivia(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.bump();
            } else if c == '#' {
                while let Some(c) = self.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.bump();
                }
            } else {
                break;
            }
        }
    }

    fn unterminated(&self, what: &str, line: usize) -> Error {
        Error::UnexpectedEof(format!(
            "unterminated {} starting on line {} of {}",
            what, line, self.source_name
        ))
    }

    fn quoted(&mut self, quote: char) -> Result<String> {
        let start = self.line;
        let mut text = String::new();
        loop {
            match self.bump() {
                None => return Err(self.unterminated("string", start)),
                Some('\\') => match self.bump() {
                    Some(c) if c == quote || c == '\\' => text.push(c),
                    Some(c) => {
                        text.push('\\');
                        text.push(c);
                    }
                    None => return Err(self.unterminated("string", start)),
                },
                Some(c) if c == quote => break,
                Some(c) => text.push(c),
            }
        }
        // Case-insensitive comparison marker: "value"i
        if self.peek() == Some('i')
            && self
                .chars
                .get(self.pos + 1)
                .is_none_or(|c| c.is_whitespace())
        {
            self.bump();
        }
        Ok(text)
    }

    fn delimited(&mut self, open: char, close: char, what: &str) -> Result<String> {
        let start = self.line;
        let mut text = String::new();
        let mut depth = 0usize;
        loop {
            let c = self.bump().ok_or_else(|| self.unterminated(what, start))?;
            text.push(c);
            if c == '"' || c == '\'' {
                let inner = self.quoted(c)?;
                text.push_str(&inner);
                text.push(c);
            } else if c == open {
                depth += 1;
            } else if c == close {
                depth -= 1;
                if depth == 0 {
                    return Ok(text);
                }
            }
        }
    }

    fn word(&mut self) -> String {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c.is_whitespace() || c == '"' || c == '\'' {
                break;
            }
            text.push(c);
            self.bump();
        }
        text
    }

    fn regex(&mut self) -> Result<String> {
        let start = self.line;
        self.bump();
        let mut text = String::new();
        loop {
            match self.bump() {
                None => return Err(self.unterminated("regular expression", start)),
                Some('\\') => {
                    text.push('\\');
                    if let Some(c) = self.bump() {
                        text.push(c);
                    }
                }
                Some('/') => break,
                Some(c) => text.push(c),
            }
        }
        if self.peek() == Some('i') {
            self.bump();
        }
        Ok(text)
    }

    fn run(mut self) -> Result<Vec<Token>> {
        let mut tokens: Vec<Token> = Vec::new();
        loop {
            self.skip_trivia();
            let Some(c) = self.peek() else { break };
            let line = self.line;
            let after_expression = tokens.last().is_some_and(|t| t.is_keyword("EXPRESSION"));
            let (kind, text) = match c {
                '"' | '\'' => {
                    self.bump();
                    (TokenKind::Quoted, self.quoted(c)?)
                }
                '[' => {
                    let raw = self.delimited('[', ']', "attribute binding")?;
                    (TokenKind::Binding, raw[1..raw.len() - 1].to_string())
                }
                '(' => (
                    TokenKind::Expression,
                    self.delimited('(', ')', "expression")?,
                ),
                '{' => (TokenKind::List, self.delimited('{', '}', "list")?),
                '/' if after_expression => (TokenKind::Regex, self.regex()?),
                _ => (TokenKind::Word, self.word()),
            };
            tokens.push(Token { kind, text, line });
        }
        Ok(tokens)
    }
}

/// Split `source` into tokens. `source_name` only appears in error messages.
pub fn tokenize(source: &str, source_name: &str) -> Result<Vec<Token>> {
    Lexer::new(source, source_name).run()
}

/// Read and tokenize `path`, splicing in every `INCLUDE "file"` it names.
///
/// Relative include paths resolve against `include_base`, the directory of
/// the top-level mapfile. Each included file is appended to `includes` in
/// the order it is first read.
pub fn tokenize_with_includes(
    source: &str,
    path: &Path,
    include_base: &Path,
    includes: &mut Vec<PathBuf>,
) -> Result<Vec<Token>> {
    expand(source, path, include_base, 0, includes)
}

fn expand(
    source: &str,
    path: &Path,
    include_base: &Path,
    depth: usize,
    includes: &mut Vec<PathBuf>,
) -> Result<Vec<Token>> {
    let raw = tokenize(source, &path.display().to_string())?;
    let mut out = Vec::with_capacity(raw.len());
    let mut iter = raw.into_iter();

    while let Some(token) = iter.next() {
        if !token.is_keyword("INCLUDE") {
            out.push(token);
            continue;
        }

        let target = match iter.next() {
            Some(t) if t.kind == TokenKind::Quoted => t,
            _ => {
                return Err(Error::syntax(
                    token.line,
                    "INCLUDE expects a quoted file name",
                ));
            }
        };
        if depth + 1 > MAX_INCLUDE_DEPTH {
            return Err(Error::IncludeDepth {
                path: PathBuf::from(&target.text),
                max: MAX_INCLUDE_DEPTH,
            });
        }

        let include_path = include_base.join(&target.text);
        let content = std::fs::read_to_string(&include_path)
            .map_err(|e| Error::io(&include_path, e))?;
        tracing::debug!(include = %include_path.display(), depth = depth + 1, "Expanding INCLUDE");
        includes.push(include_path.clone());
        out.extend(expand(
            &content,
            &include_path,
            include_base,
            depth + 1,
            includes,
        )?);
    }

    Ok(out)
}
