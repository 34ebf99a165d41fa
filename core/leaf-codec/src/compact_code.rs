//! Compact numeric activation codes.
//!
//! Ten digits rendered `DDDDD-DDDDD`:
//!
//! ```text
//! machine_hash (4) | expiry_days (5) | check digit (1)
//! ```
//!
//! - `machine_hash` is `CRC32(machine_code) mod 10000`. Roughly one machine
//!   code in 10 000 shares a hash with any other; a code issued for one
//!   machine verifies for its colliding peers.
//! - `expiry_days` is whole days since the Unix epoch. The field holds at
//!   most 99 999 (the year 2243); larger values are rejected with
//!   [`CodecError::RangeOverflow`] rather than wrapped.
//! - The check digit is the Luhn digit of the first nine.
//!
//! There is no key. Anyone who knows the layout can mint a valid code for
//! any machine and day; the check digit only catches typos and casual
//! edits.

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::checksum::compute_checksum;
use crate::device::MachineCode;
use crate::error::{CodecError, CodecResult};
use crate::expiry::{day_count, day_start};

/// Largest day count the 5-digit field holds.
pub const MAX_EXPIRY_DAYS: u32 = 99_999;

/// Total digits in a compact code.
pub const CODE_DIGITS: usize = 10;

const HASH_MODULUS: u32 = 10_000;

/// `CRC32(machine_code) mod 10000`.
#[must_use]
pub fn machine_hash(machine_code: &MachineCode) -> u16 {
    (crc32fast::hash(machine_code.as_bytes()) % HASH_MODULUS) as u16
}

/// A structurally valid compact code (check digit verified).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompactActivationCode {
    machine_hash: u16,
    expiry_days: u32,
    check_digit: u8,
}

impl CompactActivationCode {
    /// Encodes a code for `machine_code` expiring at `expiry`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::RangeOverflow`] if the expiry day count is
    /// negative or above [`MAX_EXPIRY_DAYS`].
    pub fn encode(machine_code: &MachineCode, expiry: &DateTime<Utc>) -> CodecResult<Self> {
        Self::from_days(machine_code, day_count(expiry))
    }

    /// Encodes a code from an explicit epoch day count.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::RangeOverflow`] outside `0..=MAX_EXPIRY_DAYS`.
    pub fn from_days(machine_code: &MachineCode, days: i64) -> CodecResult<Self> {
        let expiry_days = u32::try_from(days)
            .ok()
            .filter(|d| *d <= MAX_EXPIRY_DAYS)
            .ok_or(CodecError::RangeOverflow { days })?;
        let hash = machine_hash(machine_code);
        let check_digit = compute_checksum(&data_digits(hash, expiry_days))?;
        debug!(expiry_days, "encoded compact activation code");
        Ok(Self {
            machine_hash: hash,
            expiry_days,
            check_digit,
        })
    }

    /// Parses `DDDDD-DDDDD` (or ten bare digits) and checks the check digit.
    ///
    /// Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// [`CodecError::InvalidInput`] for the wrong shape or a non-digit,
    /// [`CodecError::ChecksumMismatch`] when the check digit is wrong.
    pub fn parse(code: &str) -> CodecResult<Self> {
        let code = code.trim();
        let digits: String = match code.split_once('-') {
            Some((head, tail)) if head.len() == 5 && tail.len() == 5 => format!("{head}{tail}"),
            Some(_) => {
                return Err(CodecError::InvalidInput(format!(
                    "compact code {code:?} is not DDDDD-DDDDD"
                )));
            }
            None => code.to_string(),
        };
        if digits.len() != CODE_DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CodecError::InvalidInput(format!(
                "compact code {code:?} must be {CODE_DIGITS} decimal digits"
            )));
        }

        let (data, check) = digits.split_at(CODE_DIGITS - 1);
        let expected = compute_checksum(data)?;
        let actual = check.as_bytes()[0] - b'0';
        if expected != actual {
            return Err(CodecError::ChecksumMismatch { expected, actual });
        }

        // Both fields are pure digits of bounded width, so these cannot fail.
        let machine_hash = data[..4]
            .parse()
            .map_err(|_| CodecError::InvalidInput("bad machine hash digits".to_string()))?;
        let expiry_days = data[4..]
            .parse()
            .map_err(|_| CodecError::InvalidInput("bad expiry digits".to_string()))?;
        Ok(Self {
            machine_hash,
            expiry_days,
            check_digit: actual,
        })
    }

    #[must_use]
    pub fn machine_hash(&self) -> u16 {
        self.machine_hash
    }

    /// Whole days since the Unix epoch.
    #[must_use]
    pub fn expiry_days(&self) -> u32 {
        self.expiry_days
    }

    #[must_use]
    pub fn check_digit(&self) -> u8 {
        self.check_digit
    }

    /// Midnight UTC at the start of the expiry day.
    ///
    /// # Errors
    ///
    /// Never in practice; the day count is bounded by [`MAX_EXPIRY_DAYS`].
    pub fn expiry_day_start(&self) -> CodecResult<DateTime<Utc>> {
        day_start(i64::from(self.expiry_days))
    }

    /// Whether the embedded hash matches `machine_code`.
    #[must_use]
    pub fn matches_machine(&self, machine_code: &MachineCode) -> bool {
        self.machine_hash == machine_hash(machine_code)
    }

    /// The ten digits without the hyphen.
    #[must_use]
    pub fn digits(&self) -> String {
        format!("{}{}", data_digits(self.machine_hash, self.expiry_days), self.check_digit)
    }
}

impl fmt::Display for CompactActivationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.digits();
        write!(f, "{}-{}", &digits[..5], &digits[5..])
    }
}

impl FromStr for CompactActivationCode {
    type Err = CodecError;

    fn from_str(s: &str) -> CodecResult<Self> {
        Self::parse(s)
    }
}

/// Checks `code` against `machine_code`: the check digit must hold and the
/// machine hash must match.
///
/// Malformed codes and invalid machine codes simply fail verification.
#[must_use]
pub fn verify(code: &str, machine_code: &str) -> bool {
    let Ok(machine_code) = MachineCode::new(machine_code) else {
        return false;
    };
    CompactActivationCode::parse(code).is_ok_and(|parsed| parsed.matches_machine(&machine_code))
}

fn data_digits(hash: u16, expiry_days: u32) -> String {
    format!("{hash:04}{expiry_days:05}")
}
