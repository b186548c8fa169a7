//! Error types for the live graph server.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Client sent a missing, empty, or non-mapping submission body.
    #[error("Malformed submission: {0}")]
    MalformedSubmission(String),

    /// Client sent a query parameter that cannot be interpreted.
    #[error("Malformed query: {0}")]
    MalformedQuery(String),

    /// Parsing or storage failed after the submission was accepted.
    #[error("Ingestion failure: {0}")]
    IngestionFailure(String),

    /// The store refused a record before counting it.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether the caller, rather than the server, caused this error.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::MalformedSubmission(_) | Self::MalformedQuery(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
