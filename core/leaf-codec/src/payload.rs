//! The `<machine_code>|<yyyy-MM-dd HH:mm:ss>` plaintext inside cipher codes.

use chrono::{DateTime, SubsecRound, Utc};
use std::fmt;

use crate::device::MachineCode;
use crate::error::{CodecError, CodecResult};
use crate::expiry::{format_timestamp, parse_timestamp};

/// Separator between machine code and expiry.
pub const PAYLOAD_SEPARATOR: char = '|';

/// What a cipher activation code carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationPayload {
    pub machine_code: MachineCode,
    /// Expiry instant, always whole seconds.
    pub expiry: DateTime<Utc>,
}

impl ActivationPayload {
    /// Builds a payload, dropping sub-second precision from `expiry`.
    #[must_use]
    pub fn new(machine_code: MachineCode, expiry: DateTime<Utc>) -> Self {
        Self {
            machine_code,
            expiry: expiry.trunc_subsecs(0),
        }
    }

    /// Parses `<machine_code>|<timestamp>`.
    ///
    /// Splits on the last separator, since the timestamp never contains one
    /// but a machine code may.
    ///
    /// # Errors
    ///
    /// [`CodecError::Decode`] if there is no separator, otherwise the
    /// machine-code or timestamp error.
    pub fn parse(text: &str) -> CodecResult<Self> {
        let (machine, expiry) = text
            .rsplit_once(PAYLOAD_SEPARATOR)
            .ok_or_else(|| CodecError::Decode("payload has no '|' separator".to_string()))?;
        Ok(Self {
            machine_code: MachineCode::new(machine)?,
            expiry: parse_timestamp(expiry)?,
        })
    }
}

impl fmt::Display for ActivationPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{PAYLOAD_SEPARATOR}{}",
            self.machine_code,
            format_timestamp(&self.expiry)
        )
    }
}
