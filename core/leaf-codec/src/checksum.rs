//! Luhn check digit over decimal digit strings.

use crate::error::{CodecError, CodecResult};

/// Computes the Luhn check digit for `digits`.
///
/// Digits are walked right to left over the string as given (no check
/// digit is inserted first). Digits at odd positions from the right (the
/// rightmost digit is position 0) are doubled and reduced by 9 when above 9.
///
/// # Errors
///
/// Returns [`CodecError::InvalidInput`] if any character is not `0-9`.
pub fn compute_checksum(digits: &str) -> CodecResult<u8> {
    let mut sum: u32 = 0;
    for (i, ch) in digits.chars().rev().enumerate() {
        let mut n = ch
            .to_digit(10)
            .ok_or_else(|| CodecError::InvalidInput(format!("non-digit character {ch:?}")))?;
        if i % 2 == 1 {
            n *= 2;
            if n > 9 {
                n -= 9;
            }
        }
        sum += n;
    }
    Ok(((10 - (sum % 10)) % 10) as u8)
}

/// Returns true if the last digit of `code` is the check digit of the rest.
///
/// Non-digit input and strings shorter than two characters are never valid.
#[must_use]
pub fn has_valid_check_digit(code: &str) -> bool {
    if code.len() < 2 || !code.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let (data, check) = code.split_at(code.len() - 1);
    match compute_checksum(data) {
        Ok(expected) => check.as_bytes()[0] - b'0' == expected,
        Err(_) => false,
    }
}
