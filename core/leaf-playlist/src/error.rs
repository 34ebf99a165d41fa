//! Error types for playlist obfuscation.

use std::path::PathBuf;
use thiserror::Error;

use leaf_codec::CodecError;

pub type PlaylistResult<T> = Result<T, PlaylistError>;

#[derive(Debug, Error)]
pub enum PlaylistError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("invalid base64 in encrypted URL: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("decrypted URL is not UTF-8")]
    NotUtf8,

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PlaylistError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
