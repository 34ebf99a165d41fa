//! Cipher-based activation codes.
//!
//! `AES(pad("<machine_code>|<yyyy-MM-dd HH:mm:ss>"))`, rendered as
//! uppercase alphanumerics in hyphen-separated groups of four.
//!
//! # Renderings
//!
//! - [`CodeRendering::Hex`] renders the ciphertext as uppercase hex. It is
//!   always reversible.
//! - [`CodeRendering::LegacyBase64`] reproduces the original issuance
//!   tools: base64, drop every non-alphanumeric character, uppercase.
//!   Dropping `+ / =` and folding case loses information, so such a code
//!   only decodes when the base64 text happened to be uppercase letters and
//!   digits already. [`CipherActivationCode::is_reversible`] tells which
//!   case an issued code is in; irreversible codes fail to decode with
//!   [`CodecError::Decode`].

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::cipher::{BlockCipher, CipherMode, BLOCK_SIZE, DEFAULT_IV};
use crate::device::MachineCode;
use crate::error::{CodecError, CodecResult};
use crate::key::{derive_key, KeySize, Secret};
use crate::payload::ActivationPayload;

/// Characters per hyphen-separated group.
pub const GROUP_LEN: usize = 4;

/// Text rendering of the ciphertext.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CodeRendering {
    /// Uppercase hex, reversible.
    #[default]
    Hex,
    /// Stripped, uppercased base64 as issued by the legacy tools.
    LegacyBase64,
}

impl std::str::FromStr for CodeRendering {
    type Err = CodecError;

    fn from_str(s: &str) -> CodecResult<Self> {
        match s {
            "hex" => Ok(Self::Hex),
            "legacy-base64" => Ok(Self::LegacyBase64),
            other => Err(CodecError::InvalidInput(format!("unknown code rendering {other:?}"))),
        }
    }
}

/// Cipher codec settings. Issuer and validator must agree on all of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CipherCodecConfig {
    pub mode: CipherMode,
    pub rendering: CodeRendering,
    /// Only used in [`CipherMode::CbcFixedIv`].
    pub iv: [u8; BLOCK_SIZE],
}

impl Default for CipherCodecConfig {
    fn default() -> Self {
        Self {
            mode: CipherMode::Ecb,
            rendering: CodeRendering::Hex,
            iv: DEFAULT_IV,
        }
    }
}

/// An issued cipher activation code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CipherActivationCode {
    text: String,
    reversible: bool,
}

impl CipherActivationCode {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Whether decoding this text can recover the ciphertext.
    #[must_use]
    pub fn is_reversible(&self) -> bool {
        self.reversible
    }
}

impl fmt::Display for CipherActivationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Encodes and decodes cipher activation codes under one key and config.
pub struct CipherCodec {
    cipher: BlockCipher,
    rendering: CodeRendering,
}

impl CipherCodec {
    /// Derives an AES-128 key from `secret` and binds it to `config`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidKeyLength`] if the padded secret does
    /// not encode to 16 bytes.
    pub fn new(secret: &Secret, config: &CipherCodecConfig) -> CodecResult<Self> {
        let key = derive_key(secret, KeySize::Aes128)?;
        Ok(Self {
            cipher: BlockCipher::new(&key, config.mode, config.iv)?,
            rendering: config.rendering,
        })
    }

    /// Encodes `machine_code` and `expiry` (truncated to whole seconds).
    #[must_use]
    pub fn encode(&self, machine_code: &MachineCode, expiry: &DateTime<Utc>) -> CipherActivationCode {
        self.encode_payload(&ActivationPayload::new(machine_code.clone(), *expiry))
    }

    #[must_use]
    pub fn encode_payload(&self, payload: &ActivationPayload) -> CipherActivationCode {
        let ciphertext = self.cipher.encrypt(payload.to_string().as_bytes());
        let (text, reversible) = match self.rendering {
            CodeRendering::Hex => (hex::encode_upper(&ciphertext), true),
            CodeRendering::LegacyBase64 => {
                let b64 = STANDARD.encode(&ciphertext);
                let reversible = is_legacy_reversible(&b64);
                let cleaned: String = b64
                    .chars()
                    .filter(char::is_ascii_alphanumeric)
                    .map(|c| c.to_ascii_uppercase())
                    .collect();
                (cleaned, reversible)
            }
        };
        debug!(
            mode = ?self.cipher.mode(),
            rendering = ?self.rendering,
            reversible,
            "encoded cipher activation code"
        );
        CipherActivationCode {
            text: group(&text, GROUP_LEN),
            reversible,
        }
    }

    /// Recovers the payload from a code.
    ///
    /// Hyphens and whitespace are ignored and letters are uppercased before
    /// decoding, so hand-typed codes are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Decode`] if the text is not valid for the
    /// rendering, the ciphertext is not block aligned, the padding is bad,
    /// or the recovered plaintext is not a well-formed payload.
    pub fn decode(&self, code: &str) -> CodecResult<ActivationPayload> {
        let normalized = normalize(code);
        if normalized.is_empty() {
            return Err(CodecError::Decode("activation code is empty".to_string()));
        }
        let ciphertext = match self.rendering {
            CodeRendering::Hex => hex::decode(&normalized)
                .map_err(|e| CodecError::Decode(format!("invalid hex: {e}")))?,
            CodeRendering::LegacyBase64 => decode_legacy_base64(&normalized)?,
        };
        let plaintext = self.cipher.decrypt(&ciphertext)?;
        let text = String::from_utf8(plaintext)
            .map_err(|_| CodecError::Decode("recovered payload is not UTF-8".to_string()))?;
        let payload = ActivationPayload::parse(&text).map_err(|e| match e {
            CodecError::Decode(_) => e,
            other => CodecError::Decode(format!("recovered payload is malformed: {other}")),
        })?;
        debug!(mode = ?self.cipher.mode(), "decoded cipher activation code");
        Ok(payload)
    }
}

impl fmt::Debug for CipherCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherCodec")
            .field("mode", &self.cipher.mode())
            .field("rendering", &self.rendering)
            .finish_non_exhaustive()
    }
}

/// Inserts a hyphen every `len` characters.
#[must_use]
pub fn group(text: &str, len: usize) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / len);
    for (i, ch) in text.chars().enumerate() {
        if i > 0 && i % len == 0 {
            out.push('-');
        }
        out.push(ch);
    }
    out
}

fn normalize(code: &str) -> String {
    code.chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Whether stripping and uppercasing `b64` keeps it decodable. Trailing `=`
/// padding is rebuilt from the length on decode, so it does not count.
fn is_legacy_reversible(b64: &str) -> bool {
    b64.trim_end_matches('=')
        .bytes()
        .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

/// Rebuilds `=` padding from the length, then base64-decodes.
fn decode_legacy_base64(stripped: &str) -> CodecResult<Vec<u8>> {
    if !stripped.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(CodecError::Decode(
            "legacy code contains non-alphanumeric characters".to_string(),
        ));
    }
    let padding = match stripped.len() % 4 {
        0 => "",
        2 => "==",
        3 => "=",
        _ => {
            return Err(CodecError::Decode(format!(
                "legacy code length {} cannot be base64",
                stripped.len()
            )));
        }
    };
    STANDARD
        .decode(format!("{stripped}{padding}"))
        .map_err(|e| CodecError::Decode(format!("invalid base64: {e}")))
}
