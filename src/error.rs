use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the annotation core.
#[derive(Debug, Error)]
pub enum AnnotateError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("lock error: {0}")]
    Lock(String),

    #[error("failed to load source '{source_name}': {reason}")]
    SourceLoad {
        source_name: String,
        reason: Box<str>,
    },

    #[error("source '{source_name}' contains no readable records")]
    EmptySource { source_name: String },

    #[error("invalid mapping table: {reason}")]
    InvalidMapping { reason: Box<str> },

    #[error("malformed score table: {reason}")]
    MalformedStore { reason: Box<str> },

    #[error("store file {path:?} could not be written: {reason}")]
    StoreWrite { path: PathBuf, reason: Box<str> },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("remote fetching is disabled (enable the `remote` feature) for {url}")]
    RemoteDisabled { url: String },
}

impl AnnotateError {
    /// Whether the underlying failure is I/O, including I/O surfaced through
    /// the CSV reader.
    #[must_use]
    pub fn is_io(&self) -> bool {
        match self {
            Self::Io(_) => true,
            Self::Csv(err) => err.is_io_error(),
            _ => false,
        }
    }

    pub(crate) fn source_load(source_name: impl Into<String>, reason: impl Into<Box<str>>) -> Self {
        Self::SourceLoad {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AnnotateError>;
