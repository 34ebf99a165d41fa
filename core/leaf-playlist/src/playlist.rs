//! Line-level playlist obfuscation and reveal.
//!
//! A URL line is any line containing `://` that is not an `#EXT` directive
//! or comment. Only the part before the first `|` is encrypted; request
//! parameters after it (headers, user agent) stay readable. Every line
//! keeps its own terminator, so `\r\n` playlists come out as `\r\n`.

use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::error::{PlaylistError, PlaylistResult};
use crate::url::{looks_encrypted, UrlCipher};

const PARAM_SEPARATOR: char = '|';

/// Counts from one obfuscation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaylistStats {
    pub lines: usize,
    pub encrypted: usize,
}

fn is_url_line(line: &str) -> bool {
    line.contains("://") && !line.starts_with('#')
}

/// Encrypts the URL of a single line (no terminator). Non-URL lines are
/// returned unchanged.
#[must_use]
pub fn obfuscate_line(cipher: &UrlCipher, line: &str) -> String {
    let trimmed = line.trim();
    if !is_url_line(trimmed) {
        return line.to_string();
    }
    match trimmed.split_once(PARAM_SEPARATOR) {
        Some((url, params)) => format!("{}{PARAM_SEPARATOR}{params}", cipher.encrypt_url(url)),
        None => cipher.encrypt_url(trimmed),
    }
}

/// Decrypts the URL of a single line if it looks encrypted.
///
/// Anything that does not decrypt is passed through as-is, since it may be
/// a plaintext line that happens to look like base64.
#[must_use]
pub fn reveal_line(cipher: &UrlCipher, line: &str) -> String {
    let (head, params) = match line.split_once(PARAM_SEPARATOR) {
        Some((head, params)) => (head, Some(params)),
        None => (line, None),
    };
    if !looks_encrypted(head) {
        return line.to_string();
    }
    match cipher.decrypt_url(head) {
        Ok(url) => match params {
            Some(params) => format!("{url}{PARAM_SEPARATOR}{params}"),
            None => url,
        },
        Err(e) => {
            warn!(error = %e, "line looked encrypted but did not decrypt, keeping it");
            line.to_string()
        }
    }
}

/// Applies `f` to each line body, preserving `\n` / `\r\n` terminators.
fn map_lines(text: &str, mut f: impl FnMut(&str) -> String) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    for raw in text.split_inclusive('\n') {
        let (body, terminator) = if let Some(body) = raw.strip_suffix("\r\n") {
            (body, "\r\n")
        } else if let Some(body) = raw.strip_suffix('\n') {
            (body, "\n")
        } else {
            (raw, "")
        };
        out.push_str(&f(body));
        out.push_str(terminator);
    }
    out
}

/// Obfuscates every URL line of a playlist.
#[must_use]
pub fn obfuscate_playlist(cipher: &UrlCipher, text: &str) -> (String, PlaylistStats) {
    let mut stats = PlaylistStats::default();
    let out = map_lines(text, |line| {
        stats.lines += 1;
        if is_url_line(line.trim()) {
            stats.encrypted += 1;
        }
        obfuscate_line(cipher, line)
    });
    (out, stats)
}

/// Reveals every encrypted line of a playlist.
#[must_use]
pub fn reveal_playlist(cipher: &UrlCipher, text: &str) -> String {
    map_lines(text, |line| reveal_line(cipher, line))
}

fn read(path: &Path) -> PlaylistResult<String> {
    fs::read_to_string(path).map_err(|e| PlaylistError::io(path, e))
}

fn write(path: &Path, contents: &str) -> PlaylistResult<()> {
    fs::write(path, contents).map_err(|e| PlaylistError::io(path, e))
}

/// Reads `input`, obfuscates it and writes `output`.
pub fn obfuscate_file(cipher: &UrlCipher, input: &Path, output: &Path) -> PlaylistResult<PlaylistStats> {
    let (out, stats) = obfuscate_playlist(cipher, &read(input)?);
    write(output, &out)?;
    info!(
        input = %input.display(),
        output = %output.display(),
        lines = stats.lines,
        encrypted = stats.encrypted,
        "playlist obfuscated"
    );
    Ok(stats)
}

/// Reads `input`, reveals it and writes `output`.
pub fn reveal_file(cipher: &UrlCipher, input: &Path, output: &Path) -> PlaylistResult<()> {
    let out = reveal_playlist(cipher, &read(input)?);
    write(output, &out)?;
    info!(input = %input.display(), output = %output.display(), "playlist revealed");
    Ok(())
}
