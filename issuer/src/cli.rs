//! Command-line arguments.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use leaf_codec::{CipherMode, CodeRendering};

use crate::config::IssuerConfig;

#[derive(Parser, Debug)]
#[command(name = "leaf-issuer", version)]
#[command(about = "Issue and check LeafStudio activation codes and playlists")]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Secret for cipher activation codes
    #[arg(long, env = "LEAF_ACTIVATION_SECRET", hide_env_values = true, global = true)]
    pub activation_secret: Option<String>,

    /// Secret for playlist URL encryption
    #[arg(long, env = "LEAF_PLAYLIST_SECRET", hide_env_values = true, global = true)]
    pub playlist_secret: Option<String>,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Cipher-based activation codes
    #[command(subcommand)]
    Cipher(CipherCommand),
    /// Compact 10-digit activation codes
    #[command(subcommand)]
    Compact(CompactCommand),
    /// Playlist URL encryption
    #[command(subcommand)]
    Playlist(PlaylistCommand),
    /// Redeemable code batches
    #[command(subcommand)]
    Batch(BatchCommand),
}

#[derive(Subcommand, Debug)]
pub enum CipherCommand {
    /// Issue a code for a machine
    Generate {
        #[arg(long)]
        machine_code: String,
        /// Days from now until expiry
        #[arg(long, default_value_t = 30)]
        days: i64,
        /// Overrides [activation] mode (ecb, cbc-fixed-iv)
        #[arg(long)]
        mode: Option<CipherMode>,
        /// Overrides [activation] rendering (hex, legacy-base64)
        #[arg(long)]
        rendering: Option<CodeRendering>,
    },
    /// Show what a code carries
    Decode {
        #[arg(long)]
        code: String,
    },
    /// Check a code for a machine right now
    Status {
        #[arg(long)]
        code: String,
        #[arg(long)]
        machine_code: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum CompactCommand {
    /// Issue a code for a machine
    Generate {
        #[arg(long)]
        machine_code: String,
        #[arg(long, default_value_t = 30)]
        days: i64,
    },
    /// Check a code against a machine
    Verify {
        #[arg(long)]
        code: String,
        #[arg(long)]
        machine_code: String,
    },
    /// Check a code for a machine right now
    Status {
        #[arg(long)]
        code: String,
        #[arg(long)]
        machine_code: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum PlaylistCommand {
    /// Encrypt a single URL
    EncryptUrl { url: String },
    /// Encrypt every URL in a playlist file
    Encrypt { input: PathBuf, output: PathBuf },
    /// Decrypt every encrypted URL in a playlist file
    Reveal { input: PathBuf, output: PathBuf },
}

#[derive(Subcommand, Debug)]
pub enum BatchCommand {
    /// Generate, store and list a batch of redeemable codes
    Generate {
        #[arg(long)]
        count: usize,
        /// Duration granted by each code
        #[arg(long)]
        days: u32,
        /// Overrides [batch] database
        #[arg(long)]
        database: Option<PathBuf>,
        /// Overrides [batch] output_dir
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

impl Cli {
    /// Layers command-line and environment values over `config`.
    pub fn apply_overrides(&self, config: &mut IssuerConfig) {
        if let Some(secret) = &self.activation_secret {
            config.activation.secret = Some(secret.clone());
        }
        if let Some(secret) = &self.playlist_secret {
            config.playlist.secret = Some(secret.clone());
        }
        match &self.command {
            Command::Cipher(CipherCommand::Generate { mode, rendering, .. }) => {
                if let Some(mode) = mode {
                    config.activation.mode = *mode;
                }
                if let Some(rendering) = rendering {
                    config.activation.rendering = *rendering;
                }
            }
            Command::Batch(BatchCommand::Generate {
                database,
                output_dir,
                ..
            }) => {
                if let Some(database) = database {
                    config.batch.database = database.clone();
                }
                if let Some(output_dir) = output_dir {
                    config.batch.output_dir = output_dir.clone();
                }
            }
            _ => {}
        }
    }
}
