//! Redeemable activation-code batches.
//!
//! Batch codes are random `XXXX-XXXX-XXXX` strings stored server-side with
//! a duration. Unlike cipher and compact codes they carry nothing: a code
//! is only meaningful through its row in a [`CodeStore`], and redeeming it
//! marks it used.

mod error;
mod export;
mod generator;
mod issue;
mod store;

pub use error::{BatchError, BatchResult};
pub use export::{batch_file_name, render_batch, write_batch_file};
pub use generator::{
    generate_batch, generate_code, is_batch_code, normalize_code, CODE_ALPHABET, CODE_GROUPS,
    CODE_GROUP_LEN, MAX_BATCH,
};
pub use issue::{issue_batch, BatchReport};
pub use store::{CodeRecord, CodeStore, SqliteCodeStore};
