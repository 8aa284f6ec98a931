//! Failures while reading or writing tree distributions and event logs.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IoError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("file system error: {0}")]
    FileSystem(#[from] std::io::Error),

    /// Blank input, rejected before the parser sees it.
    #[error("empty JSON document")]
    EmptyDocument,

    #[error("no such file: {}", .0.display())]
    MissingFile(PathBuf),

    /// Parsed fine, but no tree could be planted from it.
    #[error("invalid tree distribution: {0}")]
    InvalidDistribution(String),

    #[error("{context}: {source}")]
    Context {
        context: String,
        source: Box<IoError>,
    },
}

pub type Result<T> = std::result::Result<T, IoError>;

impl IoError {
    /// Prefixes the error with what was being attempted, e.g. the file operation.
    #[must_use]
    pub fn with_context<S: Into<String>>(self, context: S) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }
}
