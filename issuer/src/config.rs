//! Issuer configuration loaded from TOML.
//!
//! Secrets may live in the file or come from the command line and
//! environment, which take precedence. There are no built-in secrets.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use leaf_codec::{CipherCodecConfig, CipherMode, CodeRendering, Secret, BLOCK_SIZE, DEFAULT_IV};

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuerConfig {
    #[serde(default)]
    pub activation: ActivationConfig,
    #[serde(default)]
    pub playlist: PlaylistConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for IssuerConfig {
    fn default() -> Self {
        Self {
            activation: ActivationConfig::default(),
            playlist: PlaylistConfig::default(),
            batch: BatchConfig::default(),
            log_level: default_log_level(),
        }
    }
}

/// Cipher activation code settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivationConfig {
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(default)]
    pub mode: CipherMode,
    #[serde(default)]
    pub rendering: CodeRendering,
    /// 16 ASCII bytes; defaults to the shared IV.
    #[serde(default)]
    pub iv: Option<String>,
}

/// Playlist URL cipher settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaylistConfig {
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(default)]
    pub iv: Option<String>,
}

/// Batch issuance settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    #[serde(default = "default_database")]
    pub database: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_database() -> PathBuf {
    PathBuf::from("activation_codes.db")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl IssuerConfig {
    /// Reads a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn activation_secret(&self) -> Result<Secret> {
        match &self.activation.secret {
            Some(s) if !s.is_empty() => Ok(Secret::new(s.as_str())),
            _ => bail!("no activation secret: set [activation] secret or LEAF_ACTIVATION_SECRET"),
        }
    }

    pub fn playlist_secret(&self) -> Result<Secret> {
        match &self.playlist.secret {
            Some(s) if !s.is_empty() => Ok(Secret::new(s.as_str())),
            _ => bail!("no playlist secret: set [playlist] secret or LEAF_PLAYLIST_SECRET"),
        }
    }

    pub fn cipher_codec_config(&self) -> Result<CipherCodecConfig> {
        Ok(CipherCodecConfig {
            mode: self.activation.mode,
            rendering: self.activation.rendering,
            iv: parse_iv(self.activation.iv.as_deref()).context("invalid [activation] iv")?,
        })
    }

    pub fn playlist_iv(&self) -> Result<[u8; BLOCK_SIZE]> {
        parse_iv(self.playlist.iv.as_deref()).context("invalid [playlist] iv")
    }
}

fn parse_iv(iv: Option<&str>) -> Result<[u8; BLOCK_SIZE]> {
    let Some(iv) = iv else {
        return Ok(DEFAULT_IV);
    };
    match <[u8; BLOCK_SIZE]>::try_from(iv.as_bytes()) {
        Ok(bytes) => Ok(bytes),
        Err(_) => bail!("IV must be {BLOCK_SIZE} bytes, got {}", iv.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iv_defaults_and_length() {
        assert_eq!(parse_iv(None).unwrap(), DEFAULT_IV);
        assert_eq!(&parse_iv(Some("abcdefghijklmnop")).unwrap(), b"abcdefghijklmnop");
        assert!(parse_iv(Some("short")).is_err());
    }
}
