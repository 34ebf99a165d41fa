//! Plain-text listing of an issued batch.

use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};

use leaf_codec::format_timestamp;

use crate::error::{BatchError, BatchResult};
use crate::issue::BatchReport;

const RULE_WIDTH: usize = 60;

/// `activation_codes_YYYYmmdd_HHMMSS.txt`
#[must_use]
pub fn batch_file_name(generated_at: &DateTime<Utc>) -> String {
    format!("activation_codes_{}.txt", generated_at.format("%Y%m%d_%H%M%S"))
}

/// Header, rule, then a numbered list of codes.
#[must_use]
pub fn render_batch(report: &BatchReport, generated_at: &DateTime<Utc>) -> String {
    let mut out = format!(
        "Activation codes - generated at: {}\nDuration: {} days\n{}\n\n",
        format_timestamp(generated_at),
        report.duration_days,
        "=".repeat(RULE_WIDTH)
    );
    for (i, code) in report.codes.iter().enumerate() {
        out.push_str(&format!("{}. {code}\n", i + 1));
    }
    out
}

/// Writes the batch listing into `dir` and returns the file path.
pub fn write_batch_file(
    dir: &Path,
    report: &BatchReport,
    generated_at: &DateTime<Utc>,
) -> BatchResult<PathBuf> {
    let path = dir.join(batch_file_name(generated_at));
    fs::write(&path, render_batch(report, generated_at)).map_err(|source| BatchError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}
