//! Validator-side evaluation of issued codes against a clock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cipher_code::CipherCodec;
use crate::compact_code::CompactActivationCode;
use crate::device::MachineCode;
use crate::error::CodecResult;
use crate::expiry::SECS_PER_DAY;

/// The state of an activation code for a given machine and instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationStatus {
    /// Valid for this machine.
    Active {
        /// Seconds until expiry.
        remaining_secs: i64,
    },
    /// Valid for this machine but past its expiry.
    Expired,
    /// Issued for a different machine.
    MachineMismatch,
}

impl ActivationStatus {
    /// Returns true if the app should unlock.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        matches!(self, Self::Active { .. })
    }

    fn from_expiry(expiry: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let remaining_secs = expiry.timestamp() - now.timestamp();
        if remaining_secs > 0 {
            Self::Active { remaining_secs }
        } else {
            Self::Expired
        }
    }
}

/// Summary reported to clients after an activation check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationInfo {
    pub is_valid: bool,
    pub remaining_seconds: i64,
    /// Expiry as milliseconds since the Unix epoch.
    pub expiry_time: i64,
    pub message: String,
}

impl ActivationInfo {
    #[must_use]
    pub fn new(status: &ActivationStatus, expiry: DateTime<Utc>) -> Self {
        let (is_valid, remaining_seconds, message) = match status {
            ActivationStatus::Active { remaining_secs } => {
                let days = remaining_secs / SECS_PER_DAY;
                (true, *remaining_secs, format!("activated, {days} days remaining"))
            }
            ActivationStatus::Expired => (false, 0, "activation expired".to_string()),
            ActivationStatus::MachineMismatch => {
                (false, 0, "activation code belongs to another device".to_string())
            }
        };
        Self {
            is_valid,
            remaining_seconds,
            expiry_time: expiry.timestamp_millis(),
            message,
        }
    }
}

/// Decodes a cipher code and evaluates it for `machine_code` at `now`.
///
/// # Errors
///
/// Propagates decode failures; a well-formed code for another machine is
/// a [`ActivationStatus::MachineMismatch`], not an error.
pub fn cipher_status(
    codec: &CipherCodec,
    code: &str,
    machine_code: &MachineCode,
    now: DateTime<Utc>,
) -> CodecResult<(ActivationStatus, DateTime<Utc>)> {
    let payload = codec.decode(code)?;
    let status = if payload.machine_code != *machine_code {
        ActivationStatus::MachineMismatch
    } else {
        ActivationStatus::from_expiry(payload.expiry, now)
    };
    Ok((status, payload.expiry))
}

/// Parses a compact code and evaluates it for `machine_code` at `now`.
///
/// Compact codes carry a day, not an instant: they stay active until the
/// end of their expiry day (UTC).
///
/// # Errors
///
/// Propagates shape and checksum failures.
pub fn compact_status(
    code: &str,
    machine_code: &MachineCode,
    now: DateTime<Utc>,
) -> CodecResult<(ActivationStatus, DateTime<Utc>)> {
    let parsed = CompactActivationCode::parse(code)?;
    let expiry = parsed.expiry_day_start()? + chrono::Duration::seconds(SECS_PER_DAY);
    let status = if parsed.matches_machine(machine_code) {
        ActivationStatus::from_expiry(expiry, now)
    } else {
        ActivationStatus::MachineMismatch
    };
    Ok((status, expiry))
}
