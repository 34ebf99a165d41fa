use chrono::{TimeZone, Utc};
use leaf_batch::{
    batch_file_name, generate_batch, generate_code, is_batch_code, issue_batch, render_batch,
    write_batch_file, BatchError, BatchReport, BatchResult, CodeRecord, CodeStore,
    SqliteCodeStore, CODE_ALPHABET, MAX_BATCH,
};
use leaf_codec::MachineCode;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cell::Cell;

fn rng() -> StdRng {
    StdRng::seed_from_u64(7)
}

fn machine() -> MachineCode {
    MachineCode::new("A1B2C3D4E5F6G7H8").unwrap()
}

// ── Generation ───────────────────────────────────────────────────

#[test]
fn generated_code_has_batch_shape() {
    let code = generate_code(&mut rng());
    assert_eq!(code.len(), 14);
    assert!(is_batch_code(&code), "{code}");
}

#[test]
fn alphabet_excludes_look_alikes() {
    for c in ['0', 'O', '1', 'I', 'L'] {
        assert!(!CODE_ALPHABET.contains(c));
    }
    assert_eq!(CODE_ALPHABET.len(), 31);
}

#[test]
fn batch_codes_are_unique() {
    let codes = generate_batch(500, &mut rng()).unwrap();
    assert_eq!(codes.len(), 500);
    let unique: std::collections::HashSet<_> = codes.iter().collect();
    assert_eq!(unique.len(), 500);
}

#[test]
fn seeded_batches_are_reproducible() {
    assert_eq!(
        generate_batch(10, &mut rng()).unwrap(),
        generate_batch(10, &mut rng()).unwrap()
    );
}

#[test]
fn zero_count_is_rejected() {
    assert!(matches!(generate_batch(0, &mut rng()), Err(BatchError::InvalidInput(_))));
}

#[test]
fn oversized_count_is_rejected() {
    assert!(matches!(
        generate_batch(MAX_BATCH + 1, &mut rng()),
        Err(BatchError::InvalidInput(_))
    ));
    assert!(matches!(
        generate_batch(usize::MAX, &mut rng()),
        Err(BatchError::InvalidInput(_))
    ));
}

#[test]
fn batch_code_shape_checks() {
    assert!(is_batch_code("ABCD-2345-WXYZ"));
    assert!(!is_batch_code("ABCD-2345"));
    assert!(!is_batch_code("ABCD-2345-WXY0"));
    assert!(!is_batch_code("abcd-2345-wxyz"));
    assert!(!is_batch_code("ABCDE-234-WXYZ"));
}

// ── SqliteCodeStore ──────────────────────────────────────────────

#[test]
fn insert_and_get() {
    let store = SqliteCodeStore::open_in_memory().unwrap();
    store.insert("ABCD-2345-WXYZ", 30).unwrap();
    assert_eq!(
        store.get("ABCD-2345-WXYZ").unwrap(),
        Some(CodeRecord {
            code: "ABCD-2345-WXYZ".into(),
            duration_days: 30,
            is_used: false,
            used_by_machine: None,
            used_at: None,
        })
    );
    assert_eq!(store.get("ZZZZ-ZZZZ-ZZZZ").unwrap(), None);
}

#[test]
fn duplicate_insert_fails() {
    let store = SqliteCodeStore::open_in_memory().unwrap();
    store.insert("ABCD-2345-WXYZ", 30).unwrap();
    assert!(matches!(store.insert("ABCD-2345-WXYZ", 7), Err(BatchError::Storage(_))));
    assert_eq!(store.count().unwrap(), 1);
}

#[test]
fn redeem_marks_code_used() {
    let store = SqliteCodeStore::open_in_memory().unwrap();
    store.insert("ABCD-2345-WXYZ", 30).unwrap();
    let at = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();

    assert_eq!(store.redeem(" abcd-2345-wxyz ", &machine(), at).unwrap(), 30);

    let record = store.get("ABCD-2345-WXYZ").unwrap().unwrap();
    assert!(record.is_used);
    assert_eq!(record.used_by_machine.as_deref(), Some("A1B2C3D4E5F6G7H8"));
    assert_eq!(record.used_at, Some(at));
}

#[test]
fn redeem_twice_fails() {
    let store = SqliteCodeStore::open_in_memory().unwrap();
    store.insert("ABCD-2345-WXYZ", 30).unwrap();
    store.redeem("ABCD-2345-WXYZ", &machine(), Utc::now()).unwrap();
    assert!(matches!(
        store.redeem("ABCD-2345-WXYZ", &machine(), Utc::now()),
        Err(BatchError::CodeAlreadyUsed(_))
    ));
}

#[test]
fn redeem_unknown_code_fails() {
    let store = SqliteCodeStore::open_in_memory().unwrap();
    assert!(matches!(
        store.redeem("ABCD-2345-WXYZ", &machine(), Utc::now()),
        Err(BatchError::CodeNotFound(_))
    ));
}

#[test]
fn store_persists_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("codes.db");
    {
        let store = SqliteCodeStore::open(&path).unwrap();
        store.insert("ABCD-2345-WXYZ", 90).unwrap();
    }
    let store = SqliteCodeStore::open(&path).unwrap();
    assert_eq!(store.get("ABCD-2345-WXYZ").unwrap().unwrap().duration_days, 90);
}

// ── Issuance ─────────────────────────────────────────────────────

#[test]
fn issue_batch_stores_every_code() {
    let store = SqliteCodeStore::open_in_memory().unwrap();
    let report = issue_batch(&store, 25, 30, &mut rng()).unwrap();
    assert_eq!(report.codes.len(), 25);
    assert_eq!(report.inserted, 25);
    assert_eq!(report.failed, 0);
    assert_eq!(store.count().unwrap(), 25);
    for code in &report.codes {
        assert_eq!(store.get(code).unwrap().unwrap().duration_days, 30);
    }
}

#[test]
fn issue_batch_rejects_zero_duration() {
    let store = SqliteCodeStore::open_in_memory().unwrap();
    assert!(matches!(
        issue_batch(&store, 5, 0, &mut rng()),
        Err(BatchError::InvalidInput(_))
    ));
    assert_eq!(store.count().unwrap(), 0);
}

/// Rejects every other insert.
struct FlakyStore {
    calls: Cell<usize>,
}

impl CodeStore for FlakyStore {
    fn insert(&self, _code: &str, _duration_days: u32) -> BatchResult<()> {
        let n = self.calls.get();
        self.calls.set(n + 1);
        if n % 2 == 1 {
            Err(BatchError::Storage("disk full".into()))
        } else {
            Ok(())
        }
    }

    fn redeem(&self, code: &str, _: &MachineCode, _: chrono::DateTime<Utc>) -> BatchResult<u32> {
        Err(BatchError::CodeNotFound(code.into()))
    }

    fn get(&self, _code: &str) -> BatchResult<Option<CodeRecord>> {
        Ok(None)
    }
}

#[test]
fn insert_failures_do_not_abort_the_batch() {
    let store = FlakyStore { calls: Cell::new(0) };
    let report = issue_batch(&store, 5, 7, &mut rng()).unwrap();
    assert_eq!(report.codes.len(), 5);
    assert_eq!(report.inserted, 3);
    assert_eq!(report.failed, 2);
}

// ── Export ───────────────────────────────────────────────────────

fn sample_report() -> BatchReport {
    BatchReport {
        codes: vec!["ABCD-2345-WXYZ".into(), "EFGH-6789-STUV".into()],
        duration_days: 30,
        inserted: 2,
        failed: 0,
    }
}

#[test]
fn batch_file_is_named_by_time() {
    let at = Utc.with_ymd_and_hms(2024, 3, 7, 8, 5, 9).unwrap();
    assert_eq!(batch_file_name(&at), "activation_codes_20240307_080509.txt");
}

#[test]
fn batch_listing_layout() {
    let at = Utc.with_ymd_and_hms(2024, 3, 7, 8, 5, 9).unwrap();
    let expected = format!(
        "Activation codes - generated at: 2024-03-07 08:05:09\nDuration: 30 days\n{}\n\n1. ABCD-2345-WXYZ\n2. EFGH-6789-STUV\n",
        "=".repeat(60)
    );
    assert_eq!(render_batch(&sample_report(), &at), expected);
}

#[test]
fn write_batch_file_into_directory() {
    let dir = tempfile::tempdir().unwrap();
    let at = Utc.with_ymd_and_hms(2024, 3, 7, 8, 5, 9).unwrap();
    let path = write_batch_file(dir.path(), &sample_report(), &at).unwrap();
    assert_eq!(path, dir.path().join("activation_codes_20240307_080509.txt"));
    assert!(std::fs::read_to_string(&path).unwrap().contains("2. EFGH-6789-STUV"));
}

#[test]
fn write_batch_file_to_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");
    let err = write_batch_file(&missing, &sample_report(), &Utc::now()).unwrap_err();
    assert!(matches!(err, BatchError::Io { .. }));
}

// ── Properties ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn any_seed_yields_valid_unique_codes(seed in any::<u64>(), count in 1usize..64) {
        let codes = generate_batch(count, &mut StdRng::seed_from_u64(seed)).unwrap();
        prop_assert_eq!(codes.len(), count);
        prop_assert!(codes.iter().all(|c| is_batch_code(c)));
        let unique: std::collections::HashSet<_> = codes.iter().collect();
        prop_assert_eq!(unique.len(), count);
    }
}
