//! AES-256-CBC encryption of single stream URLs.

use base64::{engine::general_purpose::STANDARD, Engine};
use std::fmt;

use leaf_codec::{derive_key, BlockCipher, CipherMode, KeySize, Secret, BLOCK_SIZE, DEFAULT_IV};

use crate::error::{PlaylistError, PlaylistResult};

/// Minimum length of text that [`looks_encrypted`] accepts.
const MIN_ENCRYPTED_LEN: usize = 21;

/// Encrypts and decrypts stream URLs shared with the player app.
///
/// The key is the secret right-padded with `'0'` to 32 bytes. Mode is CBC
/// with a fixed IV, so equal URLs always encrypt to equal text.
pub struct UrlCipher {
    cipher: BlockCipher,
}

impl UrlCipher {
    /// Builds a cipher with the default IV.
    ///
    /// # Errors
    ///
    /// Returns [`leaf_codec::CodecError::InvalidKeyLength`] if the padded
    /// secret is not 32 bytes.
    pub fn new(secret: &Secret) -> PlaylistResult<Self> {
        Self::with_iv(secret, DEFAULT_IV)
    }

    pub fn with_iv(secret: &Secret, iv: [u8; BLOCK_SIZE]) -> PlaylistResult<Self> {
        let key = derive_key(secret, KeySize::Aes256)?;
        Ok(Self {
            cipher: BlockCipher::new(&key, CipherMode::CbcFixedIv, iv)?,
        })
    }

    /// Encrypts `url` to standard padded base64.
    #[must_use]
    pub fn encrypt_url(&self, url: &str) -> String {
        STANDARD.encode(self.cipher.encrypt(url.as_bytes()))
    }

    /// Reverses [`encrypt_url`](Self::encrypt_url).
    ///
    /// # Errors
    ///
    /// Fails on bad base64, bad padding, or non-UTF-8 plaintext.
    pub fn decrypt_url(&self, encrypted: &str) -> PlaylistResult<String> {
        let ciphertext = STANDARD.decode(encrypted.trim())?;
        let plaintext = self.cipher.decrypt(&ciphertext)?;
        String::from_utf8(plaintext).map_err(|_| PlaylistError::NotUtf8)
    }
}

impl fmt::Debug for UrlCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UrlCipher").finish_non_exhaustive()
    }
}

/// Heuristic the player uses to decide whether a URL field is encrypted:
/// only base64 characters, longer than 20, and not a plain `http` URL.
#[must_use]
pub fn looks_encrypted(text: &str) -> bool {
    text.len() >= MIN_ENCRYPTED_LEN
        && !text.starts_with("http")
        && text
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'='))
}
