//! Error types for the activation-code codecs.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while encoding, decoding or verifying codes.
///
/// Every error is terminal for the call that produced it. No codec
/// returns a partially encoded or partially decoded artifact.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Input violates a basic shape rule (non-digit, empty machine code).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Date string does not match `yyyy-MM-dd HH:mm:ss`.
    #[error("invalid timestamp format: {0}")]
    Format(String),

    /// Ciphertext, padding, base64/hex or payload structure is broken.
    #[error("decode failed: {0}")]
    Decode(String),

    /// Day count does not fit the 5-digit compact field.
    #[error("expiry day count {days} exceeds the 5-digit field")]
    RangeOverflow { days: i64 },

    /// Derived key does not match any supported cipher key size.
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    /// Compact code check digit does not match its data digits.
    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: u8, actual: u8 },
}

/// The coarse error categories callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    Format,
    Decode,
    RangeOverflow,
}

impl CodecError {
    /// Collapses the error into one of the four caller-facing kinds.
    ///
    /// Key-length errors come from configuration and report as
    /// `InvalidInput`; a checksum mismatch is a decode failure.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) | Self::InvalidKeyLength { .. } => ErrorKind::InvalidInput,
            Self::Format(_) => ErrorKind::Format,
            Self::Decode(_) | Self::ChecksumMismatch { .. } => ErrorKind::Decode,
            Self::RangeOverflow { .. } => ErrorKind::RangeOverflow,
        }
    }
}
