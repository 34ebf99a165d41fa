//! AES block encryption with PKCS#7 padding in ECB or fixed-IV CBC mode.
//!
//! Both modes are deterministic: the same key, IV and plaintext always
//! produce the same ciphertext. That is what lets a validator re-derive
//! and compare codes, and it is also why this layer only hides content
//! from casual inspection.

use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use aes::{Aes128, Aes256};
use serde::{Deserialize, Serialize};

use crate::error::{CodecError, CodecResult};
use crate::key::{DerivedKey, KeySize};

/// AES block size in bytes.
pub const BLOCK_SIZE: usize = 16;

/// IV shared by the deployed issuer and validator builds.
pub const DEFAULT_IV: [u8; BLOCK_SIZE] = *b"1234567890123456";

/// Block chaining mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CipherMode {
    /// Each block encrypted independently, no IV.
    #[default]
    Ecb,
    /// CBC chaining from a fixed, shared IV.
    CbcFixedIv,
}

impl std::str::FromStr for CipherMode {
    type Err = CodecError;

    fn from_str(s: &str) -> CodecResult<Self> {
        match s {
            "ecb" => Ok(Self::Ecb),
            "cbc-fixed-iv" => Ok(Self::CbcFixedIv),
            other => Err(CodecError::InvalidInput(format!("unknown cipher mode {other:?}"))),
        }
    }
}

enum Aes {
    Aes128(Box<Aes128>),
    Aes256(Box<Aes256>),
}

impl Aes {
    fn encrypt_block(&self, block: &mut [u8]) {
        match self {
            Self::Aes128(c) => c.encrypt_block(block.into()),
            Self::Aes256(c) => c.encrypt_block(block.into()),
        }
    }

    fn decrypt_block(&self, block: &mut [u8]) {
        match self {
            Self::Aes128(c) => c.decrypt_block(block.into()),
            Self::Aes256(c) => c.decrypt_block(block.into()),
        }
    }
}

/// A keyed AES instance bound to one chaining mode.
pub struct BlockCipher {
    aes: Aes,
    mode: CipherMode,
    iv: [u8; BLOCK_SIZE],
}

impl BlockCipher {
    /// Builds a cipher. `iv` is ignored in ECB mode.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidKeyLength`] if the key bytes do not fit
    /// the AES variant they claim.
    pub fn new(key: &DerivedKey, mode: CipherMode, iv: [u8; BLOCK_SIZE]) -> CodecResult<Self> {
        let size = key.size();
        let invalid = |_| CodecError::InvalidKeyLength {
            expected: size.len(),
            actual: key.as_bytes().len(),
        };
        let aes = match size {
            KeySize::Aes128 => Aes::Aes128(Box::new(
                Aes128::new_from_slice(key.as_bytes()).map_err(invalid)?,
            )),
            KeySize::Aes256 => Aes::Aes256(Box::new(
                Aes256::new_from_slice(key.as_bytes()).map_err(invalid)?,
            )),
        };
        Ok(Self { aes, mode, iv })
    }

    #[must_use]
    pub fn mode(&self) -> CipherMode {
        self.mode
    }

    /// Pads and encrypts `plaintext`. The output is a non-empty multiple of
    /// [`BLOCK_SIZE`].
    #[must_use]
    pub fn encrypt(&self, plaintext: &[u8]) -> Vec<u8> {
        let mut buf = pad(plaintext);
        let mut chain = self.iv;
        for block in buf.chunks_mut(BLOCK_SIZE) {
            if self.mode == CipherMode::CbcFixedIv {
                xor_in_place(block, &chain);
            }
            self.aes.encrypt_block(block);
            if self.mode == CipherMode::CbcFixedIv {
                chain.copy_from_slice(block);
            }
        }
        buf
    }

    /// Decrypts `ciphertext` and strips its padding.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Decode`] if the input is empty, not block
    /// aligned, or the recovered padding is malformed.
    pub fn decrypt(&self, ciphertext: &[u8]) -> CodecResult<Vec<u8>> {
        if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
            return Err(CodecError::Decode(format!(
                "ciphertext length {} is not a positive multiple of {BLOCK_SIZE}",
                ciphertext.len()
            )));
        }
        let mut buf = ciphertext.to_vec();
        let mut chain = self.iv;
        for block in buf.chunks_mut(BLOCK_SIZE) {
            let mut saved = [0u8; BLOCK_SIZE];
            saved.copy_from_slice(block);
            self.aes.decrypt_block(block);
            if self.mode == CipherMode::CbcFixedIv {
                xor_in_place(block, &chain);
                chain = saved;
            }
        }
        unpad(buf)
    }
}

fn xor_in_place(block: &mut [u8], other: &[u8; BLOCK_SIZE]) {
    for (b, o) in block.iter_mut().zip(other) {
        *b ^= o;
    }
}

/// PKCS#7: always adds 1..=16 bytes, each holding the pad length.
fn pad(data: &[u8]) -> Vec<u8> {
    let pad_len = BLOCK_SIZE - data.len() % BLOCK_SIZE;
    let mut out = Vec::with_capacity(data.len() + pad_len);
    out.extend_from_slice(data);
    out.resize(data.len() + pad_len, pad_len as u8);
    out
}

fn unpad(mut data: Vec<u8>) -> CodecResult<Vec<u8>> {
    let pad_len = usize::from(*data.last().unwrap_or(&0));
    if pad_len == 0 || pad_len > BLOCK_SIZE || pad_len > data.len() {
        return Err(CodecError::Decode(format!("invalid padding length {pad_len}")));
    }
    let body_len = data.len() - pad_len;
    if data[body_len..].iter().any(|&b| usize::from(b) != pad_len) {
        return Err(CodecError::Decode("inconsistent padding bytes".to_string()));
    }
    data.truncate(body_len);
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pad_full_block_when_aligned() {
        let padded = pad(&[0u8; 16]);
        assert_eq!(padded.len(), 32);
        assert!(padded[16..].iter().all(|&b| b == 16));
    }

    #[test]
    fn pad_partial_block() {
        let padded = pad(b"abc");
        assert_eq!(padded.len(), 16);
        assert!(padded[3..].iter().all(|&b| b == 13));
        assert_eq!(unpad(padded).unwrap(), b"abc");
    }

    #[test]
    fn unpad_rejects_zero_and_oversized() {
        let mut block = vec![0u8; 16];
        assert!(unpad(block.clone()).is_err());
        block[15] = 17;
        assert!(unpad(block).is_err());
    }

    #[test]
    fn unpad_rejects_mixed_pad_bytes() {
        let mut block = vec![4u8; 16];
        block[13] = 3;
        assert!(unpad(block).is_err());
    }
}
