//! Command handlers. Each returns a printable [`Report`].

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rand::Rng;
use std::path::Path;
use tracing::info;

use leaf_batch::{issue_batch, write_batch_file, SqliteCodeStore};
use leaf_codec::{
    cipher_status, compact_status, days_from, format_timestamp, verify, ActivationInfo,
    ActivationStatus, CipherCodec, CompactActivationCode, MachineCode,
};
use leaf_playlist::{obfuscate_file, reveal_file, UrlCipher};

use crate::cli::{BatchCommand, CipherCommand, Command, CompactCommand, PlaylistCommand};
use crate::config::IssuerConfig;

/// Output of one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub text: String,
    /// False when a check ran but came out negative.
    pub success: bool,
}

impl Report {
    fn ok(text: String) -> Self {
        Self { text, success: true }
    }
}

/// Dispatches a parsed command.
pub fn run<R: Rng + ?Sized>(
    command: &Command,
    config: &IssuerConfig,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<Report> {
    match command {
        Command::Cipher(CipherCommand::Generate {
            machine_code, days, ..
        }) => cipher_generate(config, machine_code, *days, now),
        Command::Cipher(CipherCommand::Decode { code }) => cipher_decode(config, code),
        Command::Cipher(CipherCommand::Status { code, machine_code }) => {
            cipher_check(config, code, machine_code, now)
        }
        Command::Compact(CompactCommand::Generate { machine_code, days }) => {
            compact_generate(machine_code, *days, now)
        }
        Command::Compact(CompactCommand::Verify { code, machine_code }) => {
            Ok(compact_verify(code, machine_code))
        }
        Command::Compact(CompactCommand::Status { code, machine_code }) => {
            compact_check(code, machine_code, now)
        }
        Command::Playlist(PlaylistCommand::EncryptUrl { url }) => playlist_encrypt_url(config, url),
        Command::Playlist(PlaylistCommand::Encrypt { input, output }) => {
            playlist_encrypt(config, input, output)
        }
        Command::Playlist(PlaylistCommand::Reveal { input, output }) => {
            playlist_reveal(config, input, output)
        }
        Command::Batch(BatchCommand::Generate { count, days, .. }) => {
            batch_generate(config, *count, *days, now, rng)
        }
    }
}

fn codec(config: &IssuerConfig) -> Result<CipherCodec> {
    let codec = CipherCodec::new(&config.activation_secret()?, &config.cipher_codec_config()?)
        .context("failed to set up activation cipher")?;
    Ok(codec)
}

fn url_cipher(config: &IssuerConfig) -> Result<UrlCipher> {
    let cipher = UrlCipher::with_iv(&config.playlist_secret()?, config.playlist_iv()?)
        .context("failed to set up playlist cipher")?;
    Ok(cipher)
}

// ── Cipher codes ─────────────────────────────────────────────────

pub fn cipher_generate(
    config: &IssuerConfig,
    machine_code: &str,
    days: i64,
    now: DateTime<Utc>,
) -> Result<Report> {
    let machine_code = MachineCode::new(machine_code)?;
    let expiry = days_from(&now, days)?;
    let code = codec(config)?.encode(&machine_code, &expiry);

    let mut text = format!(
        "Machine code:    {machine_code}\nExpires:         {}\nActivation code: {code}\n",
        format_timestamp(&expiry)
    );
    if !code.is_reversible() {
        text.push_str("Note: this legacy code cannot be decoded back\n");
    }
    info!(days, "issued cipher activation code");
    Ok(Report::ok(text))
}

pub fn cipher_decode(config: &IssuerConfig, code: &str) -> Result<Report> {
    let payload = codec(config)?
        .decode(code)
        .context("could not decode activation code")?;
    Ok(Report::ok(format!(
        "Machine code: {}\nExpires:      {}\n",
        payload.machine_code,
        format_timestamp(&payload.expiry)
    )))
}

pub fn cipher_check(
    config: &IssuerConfig,
    code: &str,
    machine_code: &str,
    now: DateTime<Utc>,
) -> Result<Report> {
    let machine_code = MachineCode::new(machine_code)?;
    let (status, expiry) = cipher_status(&codec(config)?, code, &machine_code, now)
        .context("could not decode activation code")?;
    Ok(status_report(&status, expiry))
}

fn status_report(status: &ActivationStatus, expiry: DateTime<Utc>) -> Report {
    let info = ActivationInfo::new(status, expiry);
    Report {
        text: format!(
            "Status:  {}\nExpires: {}\n",
            info.message,
            format_timestamp(&expiry)
        ),
        success: status.is_usable(),
    }
}

// ── Compact codes ────────────────────────────────────────────────

pub fn compact_generate(machine_code: &str, days: i64, now: DateTime<Utc>) -> Result<Report> {
    let machine_code = MachineCode::new(machine_code)?;
    let expiry = days_from(&now, days)?;
    let code = CompactActivationCode::encode(&machine_code, &expiry)?;

    info!(days, "issued compact activation code");
    Ok(Report::ok(format!(
        "Machine code:    {machine_code}\nExpiry day:      {}\nActivation code: {code}\n",
        code.expiry_days()
    )))
}

/// Evaluates a compact code for a machine at `now`. Compact codes stay
/// active through the end of their expiry day.
pub fn compact_check(code: &str, machine_code: &str, now: DateTime<Utc>) -> Result<Report> {
    let machine_code = MachineCode::new(machine_code)?;
    let (status, expiry) = compact_status(code, &machine_code, now)
        .context("could not read compact activation code")?;
    Ok(status_report(&status, expiry))
}

pub fn compact_verify(code: &str, machine_code: &str) -> Report {
    let success = verify(code, machine_code);
    let text = if success {
        "Code is valid for this machine\n".to_string()
    } else {
        "Code is NOT valid for this machine\n".to_string()
    };
    Report { text, success }
}

// ── Playlists ────────────────────────────────────────────────────

pub fn playlist_encrypt_url(config: &IssuerConfig, url: &str) -> Result<Report> {
    let encrypted = url_cipher(config)?.encrypt_url(url);
    Ok(Report::ok(format!("{encrypted}\n")))
}

pub fn playlist_encrypt(config: &IssuerConfig, input: &Path, output: &Path) -> Result<Report> {
    let stats = obfuscate_file(&url_cipher(config)?, input, output)?;
    Ok(Report::ok(format!(
        "Encrypted {} of {} lines into {}\n",
        stats.encrypted,
        stats.lines,
        output.display()
    )))
}

pub fn playlist_reveal(config: &IssuerConfig, input: &Path, output: &Path) -> Result<Report> {
    reveal_file(&url_cipher(config)?, input, output)?;
    Ok(Report::ok(format!("Revealed playlist into {}\n", output.display())))
}

// ── Batches ──────────────────────────────────────────────────────

pub fn batch_generate<R: Rng + ?Sized>(
    config: &IssuerConfig,
    count: usize,
    days: u32,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<Report> {
    let store = SqliteCodeStore::open(&config.batch.database)?;
    let report = issue_batch(&store, count, days, rng)?;
    let path = write_batch_file(&config.batch.output_dir, &report, &now)?;

    let mut text = String::new();
    for (i, code) in report.codes.iter().enumerate() {
        text.push_str(&format!("{}. {code} - {days} days\n", i + 1));
    }
    text.push_str(&format!(
        "Stored {}/{} codes\nSaved list to {}\n",
        report.inserted,
        report.codes.len(),
        path.display()
    ));
    Ok(Report {
        text,
        success: report.failed == 0,
    })
}
