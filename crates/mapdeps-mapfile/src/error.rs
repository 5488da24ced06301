//! Error types for mapfile loading.

use std::path::PathBuf;

/// Result type alias for mapdeps-mapfile operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Maximum INCLUDE nesting accepted by the reader.
pub const MAX_INCLUDE_DEPTH: usize = 5;

/// Errors that can occur while reading a mapfile, fontset or symbolset.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A referenced file could not be read.
    #[error("{path}: {source}", path = .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed token or misplaced keyword.
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    /// Input ended inside a block or string.
    #[error("unexpected end of input: {0}")]
    UnexpectedEof(String),

    /// INCLUDE chain nested too deeply.
    #[error("INCLUDE nesting deeper than {max} levels at {path}", path = .path.display())]
    IncludeDepth { path: PathBuf, max: usize },

    /// A keyword carried a value the reader does not accept.
    #[error("line {line}: invalid {keyword} value: {message}")]
    InvalidValue {
        line: usize,
        keyword: String,
        message: String,
    },

    /// The document has no MAP block.
    #[error("no MAP block found")]
    MissingMap,
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn syntax(line: usize, message: impl Into<String>) -> Self {
        Error::Syntax {
            line,
            message: message.into(),
        }
    }
}
