//! LeafStudio issuer
//!
//! Usage:
//!   leaf-issuer --config issuer.toml cipher generate --machine-code A1B2C3D4E5F6G7H8
//!   leaf-issuer compact verify --code 83191-97535 --machine-code A1B2C3D4E5F6G7H8
//!   leaf-issuer playlist encrypt channels.m3u channels_encrypted.m3u

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use leaf_issuer::{run, Cli, IssuerConfig};
use std::process::ExitCode;
use tracing::{debug, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => IssuerConfig::load(path)?,
        None => IssuerConfig::default(),
    };
    cli.apply_overrides(&mut config);

    let builder = FmtSubscriber::builder().with_target(false).compact();
    if cli.verbose {
        builder.with_max_level(Level::DEBUG).init();
    } else {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&config.log_level))
            .unwrap_or_else(|_| EnvFilter::new("info"));
        builder.with_env_filter(filter).init();
    }
    debug!(config = ?cli.config, "issuer starting");

    let report = run(&cli.command, &config, Utc::now(), &mut rand::thread_rng())?;
    print!("{}", report.text);
    Ok(if report.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
