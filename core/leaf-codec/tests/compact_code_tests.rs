mod common;

use chrono::{TimeZone, Utc};
use common::{machine, reference, MACHINE};
use leaf_codec::{
    compute_checksum, day_start, days_from, machine_hash, verify, CodecError, CompactActivationCode,
    ErrorKind, MachineCode, MAX_EXPIRY_DAYS,
};

const SCENARIO_CODE: &str = "83191-97535";

// ── Encoding ─────────────────────────────────────────────────────

#[test]
fn machine_hash_is_crc32_mod_10000() {
    // CRC32("A1B2C3D4E5F6G7H8") = 2549698319
    assert_eq!(machine_hash(&machine()), 8319);
}

#[test]
fn scenario_thirty_days_is_stable() {
    let expiry = days_from(&reference(), 30).unwrap();
    let code = CompactActivationCode::encode(&machine(), &expiry).unwrap();
    assert_eq!(code.to_string(), SCENARIO_CODE);
    assert_eq!(code.machine_hash(), 8319);
    assert_eq!(code.expiry_days(), 19753);
    assert_eq!(code.check_digit(), 5);
}

#[test]
fn scenario_check_digit_satisfies_luhn() {
    let digits = SCENARIO_CODE.replace('-', "");
    let expected = compute_checksum(&digits[..9]).unwrap();
    assert_eq!(u32::from(expected), digits[9..].parse::<u32>().unwrap());
}

#[test]
fn encoding_is_deterministic() {
    let expiry = days_from(&reference(), 365).unwrap();
    let a = CompactActivationCode::encode(&machine(), &expiry).unwrap();
    let b = CompactActivationCode::encode(&machine(), &expiry).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.to_string(), b.to_string());
}

#[test]
fn time_of_day_does_not_matter() {
    let morning = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 1).unwrap();
    let night = Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap();
    assert_eq!(
        CompactActivationCode::encode(&machine(), &morning).unwrap(),
        CompactActivationCode::encode(&machine(), &night).unwrap()
    );
}

#[test]
fn small_values_are_zero_padded() {
    let code = CompactActivationCode::from_days(&machine(), 7).unwrap();
    assert!(code.digits().starts_with("831900007"));
    assert_eq!(code.digits().len(), 10);
}

#[test]
fn rendering_is_two_groups_of_five() {
    let code = CompactActivationCode::from_days(&machine(), 20_000).unwrap();
    let text = code.to_string();
    assert_eq!(text.len(), 11);
    assert_eq!(&text[5..6], "-");
    assert!(text.replace('-', "").bytes().all(|b| b.is_ascii_digit()));
}

// ── Range boundary ───────────────────────────────────────────────

#[test]
fn max_day_count_encodes() {
    let code = CompactActivationCode::from_days(&machine(), i64::from(MAX_EXPIRY_DAYS)).unwrap();
    assert_eq!(code.to_string(), "83199-99991");
    let via_instant = CompactActivationCode::encode(&machine(), &day_start(99_999).unwrap()).unwrap();
    assert_eq!(code, via_instant);
}

#[test]
fn day_count_past_field_is_rejected() {
    let err = CompactActivationCode::from_days(&machine(), 100_000).unwrap_err();
    assert_eq!(err, CodecError::RangeOverflow { days: 100_000 });
    assert_eq!(err.kind(), ErrorKind::RangeOverflow);
}

#[test]
fn instant_past_field_is_rejected() {
    let late = Utc.with_ymd_and_hms(2300, 1, 1, 0, 0, 0).unwrap();
    let err = CompactActivationCode::encode(&machine(), &late).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RangeOverflow);
}

#[test]
fn pre_epoch_is_rejected() {
    let early = Utc.with_ymd_and_hms(1969, 12, 31, 12, 0, 0).unwrap();
    let err = CompactActivationCode::encode(&machine(), &early).unwrap_err();
    assert_eq!(err, CodecError::RangeOverflow { days: -1 });
}

// ── Parsing ──────────────────────────────────────────────────────

#[test]
fn parse_recovers_fields() {
    let code: CompactActivationCode = SCENARIO_CODE.parse().unwrap();
    assert_eq!(code.machine_hash(), 8319);
    assert_eq!(code.expiry_days(), 19753);
    assert_eq!(
        code.expiry_day_start().unwrap(),
        Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap()
    );
}

#[test]
fn parse_accepts_bare_digits_and_whitespace() {
    assert!(CompactActivationCode::parse(" 8319197535 ").is_ok());
}

#[test]
fn parse_rejects_bad_shapes() {
    for bad in ["", "83191-9753", "8319-197535", "83191-9753X", "831919753", "83191--97535"] {
        let err = CompactActivationCode::parse(bad).unwrap_err();
        assert!(matches!(err, CodecError::InvalidInput(_)), "{bad:?} gave {err:?}");
    }
}

#[test]
fn parse_reports_checksum_mismatch() {
    let err = CompactActivationCode::parse("83191-97536").unwrap_err();
    assert_eq!(err, CodecError::ChecksumMismatch { expected: 5, actual: 6 });
    assert_eq!(err.kind(), ErrorKind::Decode);
}

// ── Verification ─────────────────────────────────────────────────

#[test]
fn verify_accepts_own_machine() {
    assert!(verify(SCENARIO_CODE, MACHINE));
}

#[test]
fn verify_rejects_other_machine() {
    assert!(!verify(SCENARIO_CODE, "B1B2C3D4E5F6G7H8"));
}

#[test]
fn verify_rejects_corrupted_digit() {
    assert!(!verify("83191-97545", MACHINE));
}

#[test]
fn verify_rejects_empty_machine_code() {
    assert!(!verify(SCENARIO_CODE, ""));
}

#[test]
fn colliding_machine_codes_both_verify() {
    // The 4-digit hash admits collisions; find one and confirm it verifies.
    let target = machine_hash(&machine());
    let twin = (0u32..)
        .map(|i| MachineCode::new(format!("TWIN-{i}")).unwrap())
        .find(|m| machine_hash(m) == target)
        .unwrap();
    assert!(verify(SCENARIO_CODE, twin.as_str()));
}
