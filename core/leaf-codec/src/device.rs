//! Machine codes and device fingerprinting.
//!
//! A machine code is whatever identifier the licensed client reports. The
//! codecs treat it as opaque text; [`DeviceFingerprint`] is one way a
//! client can derive a stable one from host identifiers.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::env;
use std::fmt;

use crate::error::{CodecError, CodecResult};

/// Number of hex digits in a fingerprint-derived machine code.
pub const FINGERPRINT_LEN: usize = 16;

/// Opaque device identifier bound into activation codes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MachineCode(String);

impl MachineCode {
    /// Wraps a machine code.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidInput`] if `code` is empty or contains
    /// control characters.
    pub fn new(code: impl Into<String>) -> CodecResult<Self> {
        let code = code.into();
        if code.is_empty() {
            return Err(CodecError::InvalidInput("machine code is empty".to_string()));
        }
        if code.chars().any(char::is_control) {
            return Err(CodecError::InvalidInput(
                "machine code contains control characters".to_string(),
            ));
        }
        Ok(Self(code))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for MachineCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for MachineCode {
    type Error = CodecError;

    fn try_from(value: String) -> CodecResult<Self> {
        Self::new(value)
    }
}

impl TryFrom<&str> for MachineCode {
    type Error = CodecError;

    fn try_from(value: &str) -> CodecResult<Self> {
        Self::new(value)
    }
}

impl From<MachineCode> for String {
    fn from(code: MachineCode) -> Self {
        code.0
    }
}

/// Host identifiers collected for fingerprinting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Operating system name.
    pub os_name: String,
    /// CPU architecture.
    pub arch: String,
    /// Hostname.
    pub hostname: String,
    /// Platform machine id, when one is available.
    pub machine_id: Option<String>,
}

impl DeviceInfo {
    /// Collects identifiers for the current host.
    #[must_use]
    pub fn collect() -> Self {
        Self {
            os_name: env::consts::OS.to_string(),
            arch: env::consts::ARCH.to_string(),
            hostname: get_hostname(),
            machine_id: get_machine_id(),
        }
    }

    /// The ordered components fed into the fingerprint digest.
    #[must_use]
    pub fn components(&self) -> Vec<&str> {
        let mut parts = vec![
            self.os_name.as_str(),
            self.arch.as_str(),
            self.hostname.as_str(),
        ];
        if let Some(id) = &self.machine_id {
            parts.push(id.as_str());
        }
        parts
    }
}

/// Derives machine codes from host identifiers.
pub struct DeviceFingerprint;

impl DeviceFingerprint {
    /// Fingerprint of the current host.
    #[must_use]
    pub fn current() -> MachineCode {
        let info = DeviceInfo::collect();
        Self::from_components(&info.components())
    }

    /// First [`FINGERPRINT_LEN`] uppercase hex digits of the SHA-256 of the
    /// `|`-joined components.
    #[must_use]
    pub fn from_components(components: &[&str]) -> MachineCode {
        let combined = components.join("|");
        let digest = Sha256::digest(combined.as_bytes());
        let mut id = hex::encode_upper(digest);
        id.truncate(FINGERPRINT_LEN);
        MachineCode(id)
    }
}

fn get_hostname() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "unknown".to_string())
}

fn get_machine_id() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        std::fs::read_to_string("/etc/machine-id")
            .or_else(|_| std::fs::read_to_string("/var/lib/dbus/machine-id"))
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}
