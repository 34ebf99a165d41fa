//! Shared-secret handling and key derivation.
//!
//! The derivation matches the deployed validators:
//! right-pad the secret with `'0'` characters to the key length, then
//! truncate. There is no stretching, so the secret *is* the key material.

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{CodecError, CodecResult};

/// Supported AES key sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeySize {
    /// 16 bytes, used for activation codes.
    Aes128,
    /// 32 bytes, used for playlist URLs.
    Aes256,
}

impl KeySize {
    /// Key length in bytes.
    #[must_use]
    pub fn len(self) -> usize {
        match self {
            Self::Aes128 => 16,
            Self::Aes256 => 32,
        }
    }
}

/// A configuration-supplied shared secret.
///
/// Never printed: `Debug` is redacted and there is no `Display`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Secret(String);

impl Secret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret([REDACTED])")
    }
}

/// Key bytes ready for the block cipher, zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    bytes: Vec<u8>,
}

impl DerivedKey {
    /// Wraps raw key bytes, checking they fit an AES key size.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidKeyLength`] unless `bytes` is 16 or 32 long.
    pub fn from_bytes(bytes: Vec<u8>, size: KeySize) -> CodecResult<Self> {
        if bytes.len() != size.len() {
            return Err(CodecError::InvalidKeyLength {
                expected: size.len(),
                actual: bytes.len(),
            });
        }
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn size(&self) -> KeySize {
        if self.bytes.len() == KeySize::Aes256.len() {
            KeySize::Aes256
        } else {
            KeySize::Aes128
        }
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Derives a key by right-padding `secret` with `'0'` and truncating.
///
/// Padding and truncation count characters, then the result is UTF-8
/// encoded, so a secret with multi-byte characters can overshoot.
///
/// # Errors
///
/// Returns [`CodecError::InvalidKeyLength`] if the encoded key is not
/// exactly `size.len()` bytes.
pub fn derive_key(secret: &Secret, size: KeySize) -> CodecResult<DerivedKey> {
    let mut material: String = secret
        .expose()
        .chars()
        .chain(std::iter::repeat('0'))
        .take(size.len())
        .collect();
    let bytes = material.as_bytes().to_vec();
    material.zeroize();
    DerivedKey::from_bytes(bytes, size)
}
