use std::path::PathBuf;

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to connect to document store: {0}")]
    Connect(#[source] mongodb::error::Error),

    #[error("lookup of '{key}' failed")]
    Query {
        key: String,
        #[source]
        source: mongodb::error::Error,
    },

    #[error("failed to download large content {content_id} of '{id}'")]
    Download {
        id: String,
        content_id: String,
        #[source]
        source: BoxError,
    },

    #[error("malformed record '{id}': {reason}")]
    Malformed { id: String, reason: String },
}

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("cannot persist '{id}': {reason}")]
    Precondition { id: String, reason: &'static str },

    #[error("failed to write {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error("document '{0}' was not found")]
    NotFound(String),

    #[error("failed to fetch '{key}'")]
    Store {
        key: String,
        #[source]
        source: StoreError,
    },

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error("failed to report written path")]
    Report(#[source] std::io::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdError {
    #[error("data type cannot be blank")]
    BlankDataType,

    #[error("invalid coordinate range '{0}'")]
    InvalidRange(String),

    #[error("coordinate range '{0}' runs backwards")]
    ReversedRange(String),

    #[error("coordinate list '{input}' expands to more than {limit} values")]
    TooManyCoords { input: String, limit: usize },

    #[error("tile range covers {count} tiles, more than {limit}")]
    TooManyTiles { count: usize, limit: usize },
}
