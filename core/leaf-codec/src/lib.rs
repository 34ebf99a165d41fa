//! Activation-code codecs for LeafStudio licensing.
//!
//! Two independent code families bind a machine code to an expiry:
//!
//! - **Cipher codes** ([`CipherCodec`]): AES over
//!   `"<machine_code>|<yyyy-MM-dd HH:mm:ss>"`, fully recoverable by anyone
//!   holding the shared secret.
//! - **Compact codes** ([`CompactActivationCode`]): ten digits made of a
//!   4-digit machine hash, a 5-digit expiry day count and a Luhn check
//!   digit. Verifiable, short, and keyless.
//!
//! # Design Principles
//!
//! - **Injected secrets**: key material and IVs arrive as configuration on
//!   every codec; nothing secret is baked into this crate.
//! - **All or nothing**: encode and decode either succeed completely or
//!   return a typed [`CodecError`].
//! - **Pure**: no I/O, no shared mutable state. Codecs are `Send + Sync`
//!   and safe to share across threads.
//!
//! # Threat Model
//!
//! This resists casual tampering and wire sniffing only. The validator
//! ships the secret, ECB and fixed-IV CBC are deterministic, and compact
//! codes have no key at all.

mod checksum;
mod cipher;
mod cipher_code;
mod compact_code;
mod device;
mod error;
mod expiry;
mod key;
mod payload;
mod status;

pub use checksum::{compute_checksum, has_valid_check_digit};
pub use cipher::{BlockCipher, CipherMode, BLOCK_SIZE, DEFAULT_IV};
pub use cipher_code::{
    group, CipherActivationCode, CipherCodec, CipherCodecConfig, CodeRendering, GROUP_LEN,
};
pub use compact_code::{machine_hash, verify, CompactActivationCode, CODE_DIGITS, MAX_EXPIRY_DAYS};
pub use device::{DeviceFingerprint, DeviceInfo, MachineCode, FINGERPRINT_LEN};
pub use error::{CodecError, CodecResult, ErrorKind};
pub use expiry::{
    day_count, day_start, days_from, days_from_now, format_timestamp, parse_timestamp,
    SECS_PER_DAY, TIMESTAMP_FORMAT,
};
pub use key::{derive_key, DerivedKey, KeySize, Secret};
pub use payload::{ActivationPayload, PAYLOAD_SEPARATOR};
pub use status::{cipher_status, compact_status, ActivationInfo, ActivationStatus};
