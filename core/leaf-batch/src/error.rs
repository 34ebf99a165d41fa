//! Error types for batch issuance and redemption.

use std::path::PathBuf;
use thiserror::Error;

pub type BatchResult<T> = Result<T, BatchError>;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("activation code not found: {0}")]
    CodeNotFound(String),

    #[error("activation code already used: {0}")]
    CodeAlreadyUsed(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
