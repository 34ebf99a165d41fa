//! Batch issuance into a [`CodeStore`].

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{BatchError, BatchResult};
use crate::generator::generate_batch;
use crate::store::CodeStore;

/// Outcome of [`issue_batch`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Every generated code, stored or not, in generation order.
    pub codes: Vec<String>,
    pub duration_days: u32,
    pub inserted: usize,
    pub failed: usize,
}

/// Generates `count` codes worth `duration_days` each and stores them.
///
/// A code the store rejects is logged and counted in
/// [`BatchReport::failed`]; the rest of the batch still goes in.
///
/// # Errors
///
/// Returns [`BatchError::InvalidInput`] if `count` or `duration_days` is zero.
pub fn issue_batch<S, R>(
    store: &S,
    count: usize,
    duration_days: u32,
    rng: &mut R,
) -> BatchResult<BatchReport>
where
    S: CodeStore + ?Sized,
    R: Rng + ?Sized,
{
    if duration_days == 0 {
        return Err(BatchError::InvalidInput(
            "duration_days must be greater than 0".to_string(),
        ));
    }
    let codes = generate_batch(count, rng)?;

    let mut inserted = 0;
    let mut failed = 0;
    for (i, code) in codes.iter().enumerate() {
        match store.insert(code, duration_days) {
            Ok(()) => inserted += 1,
            Err(e) => {
                warn!(index = i + 1, error = %e, "failed to store activation code");
                failed += 1;
            }
        }
    }
    info!(count, inserted, failed, duration_days, "activation code batch issued");

    Ok(BatchReport {
        codes,
        duration_days,
        inserted,
        failed,
    })
}
