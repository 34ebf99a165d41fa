//! M3U playlist URL obfuscation.
//!
//! The issuer encrypts stream URLs in a playlist before publishing it; the
//! player reveals them on load. This hides URLs from casual traffic
//! inspection only: the player carries the key.

mod error;
mod playlist;
mod url;

pub use error::{PlaylistError, PlaylistResult};
pub use playlist::{
    obfuscate_file, obfuscate_line, obfuscate_playlist, reveal_file, reveal_line, reveal_playlist,
    PlaylistStats,
};
pub use url::{looks_encrypted, UrlCipher};
