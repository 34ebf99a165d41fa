//! Shared fixtures for codec tests.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use leaf_codec::{CipherCodec, CipherCodecConfig, CipherMode, CodeRendering, MachineCode, Secret};

pub const MACHINE: &str = "A1B2C3D4E5F6G7H8";
pub const SECRET: &str = "LeafStudio2024!@";

/// 2024-01-01 00:00:00 UTC.
pub fn reference() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

pub fn machine() -> MachineCode {
    MachineCode::new(MACHINE).unwrap()
}

pub fn codec(mode: CipherMode, rendering: CodeRendering) -> CipherCodec {
    let config = CipherCodecConfig {
        mode,
        rendering,
        ..CipherCodecConfig::default()
    };
    CipherCodec::new(&Secret::from(SECRET), &config).unwrap()
}

pub fn ecb_hex() -> CipherCodec {
    codec(CipherMode::Ecb, CodeRendering::Hex)
}
