//! Random redeemable codes of the form `XXXX-XXXX-XXXX`.

use rand::Rng;
use std::collections::HashSet;

use crate::error::{BatchError, BatchResult};

/// Uppercase letters and digits without the look-alikes `0 O 1 I L`.
pub const CODE_ALPHABET: &str = "23456789ABCDEFGHJKMNPQRSTUVWXYZ";

pub const CODE_GROUPS: usize = 3;
pub const CODE_GROUP_LEN: usize = 4;

/// Largest batch [`generate_batch`] will draw in one call.
pub const MAX_BATCH: usize = 100_000;

/// Draws one code.
pub fn generate_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    let alphabet = CODE_ALPHABET.as_bytes();
    let mut code = String::with_capacity(CODE_GROUPS * (CODE_GROUP_LEN + 1));
    for group in 0..CODE_GROUPS {
        if group > 0 {
            code.push('-');
        }
        for _ in 0..CODE_GROUP_LEN {
            code.push(char::from(alphabet[rng.gen_range(0..alphabet.len())]));
        }
    }
    code
}

/// Draws `count` distinct codes, in draw order.
///
/// # Errors
///
/// Returns [`BatchError::InvalidInput`] if `count` is zero or above
/// [`MAX_BATCH`].
pub fn generate_batch<R: Rng + ?Sized>(count: usize, rng: &mut R) -> BatchResult<Vec<String>> {
    if count == 0 {
        return Err(BatchError::InvalidInput("count must be greater than 0".to_string()));
    }
    if count > MAX_BATCH {
        return Err(BatchError::InvalidInput(format!(
            "count {count} exceeds the batch limit of {MAX_BATCH}"
        )));
    }
    let mut seen = HashSet::with_capacity(count);
    let mut codes = Vec::with_capacity(count);
    while codes.len() < count {
        let code = generate_code(rng);
        if seen.insert(code.clone()) {
            codes.push(code);
        }
    }
    Ok(codes)
}

/// Whether `code` has the batch shape and alphabet.
#[must_use]
pub fn is_batch_code(code: &str) -> bool {
    let groups: Vec<&str> = code.split('-').collect();
    groups.len() == CODE_GROUPS
        && groups.iter().all(|g| {
            g.len() == CODE_GROUP_LEN && g.chars().all(|c| CODE_ALPHABET.contains(c))
        })
}

/// Trims and uppercases a hand-typed code.
#[must_use]
pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}
