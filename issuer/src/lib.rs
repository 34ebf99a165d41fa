//! Issuer tooling for LeafStudio activation codes and playlists.

pub mod cli;
pub mod commands;
pub mod config;

pub use cli::Cli;
pub use commands::{run, Report};
pub use config::IssuerConfig;
