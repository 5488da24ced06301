//! Error types for mapdeps-core

use std::path::PathBuf;

use thiserror::Error;

/// Fatal traversal errors.
///
/// Unresolved references and unsupported constructs are never errors; they
/// are recorded in the [`ReviewLog`](crate::ReviewLog).
#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to read current working directory: {0}")]
    CurrentDirectory(#[source] std::io::Error),

    #[error("failed to switch working directory to {path}: {source}", path = .path.display())]
    WorkingDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
