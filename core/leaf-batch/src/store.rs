//! Persistent storage for redeemable activation codes.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

use leaf_codec::MachineCode;

use crate::error::{BatchError, BatchResult};
use crate::generator::normalize_code;

/// One row of the code table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeRecord {
    pub code: String,
    pub duration_days: u32,
    pub is_used: bool,
    pub used_by_machine: Option<String>,
    pub used_at: Option<DateTime<Utc>>,
}

/// Backend for issued batch codes.
pub trait CodeStore {
    /// Stores a fresh, unused code.
    ///
    /// # Errors
    ///
    /// Fails if the code already exists or the backend fails.
    fn insert(&self, code: &str, duration_days: u32) -> BatchResult<()>;

    /// Marks `code` used by `machine_code` and returns its duration in days.
    ///
    /// # Errors
    ///
    /// [`BatchError::CodeNotFound`] for an unknown code,
    /// [`BatchError::CodeAlreadyUsed`] for one already redeemed.
    fn redeem(&self, code: &str, machine_code: &MachineCode, at: DateTime<Utc>) -> BatchResult<u32>;

    /// Looks up a code.
    fn get(&self, code: &str) -> BatchResult<Option<CodeRecord>>;
}

/// [`CodeStore`] backed by SQLite.
pub struct SqliteCodeStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCodeStore {
    /// Opens (or creates) a code store at the given path.
    pub fn open(path: &Path) -> BatchResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| BatchError::Storage(format!("failed to open code store: {e}")))?;
        Self::with_connection(conn)
    }

    /// Opens an in-memory code store.
    pub fn open_in_memory() -> BatchResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| BatchError::Storage(format!("failed to open in-memory code store: {e}")))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> BatchResult<Self> {
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn lock(&self) -> BatchResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| BatchError::Storage("code store lock poisoned".to_string()))
    }

    fn init_schema(&self) -> BatchResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS activation_codes (
                code TEXT PRIMARY KEY,
                duration_days INTEGER NOT NULL,
                is_used INTEGER NOT NULL DEFAULT 0,
                used_by_machine TEXT,
                used_at INTEGER
            );
            ",
        )
        .map_err(|e| BatchError::Storage(format!("failed to init code schema: {e}")))?;
        Ok(())
    }

    /// Number of stored codes, used or not.
    pub fn count(&self) -> BatchResult<usize> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM activation_codes", [], |row| row.get(0))
            .map_err(|e| BatchError::Storage(format!("failed to count codes: {e}")))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}

impl CodeStore for SqliteCodeStore {
    fn insert(&self, code: &str, duration_days: u32) -> BatchResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO activation_codes (code, duration_days, is_used) VALUES (?1, ?2, 0)",
            params![code, duration_days],
        )
        .map_err(|e| BatchError::Storage(format!("failed to insert code: {e}")))?;
        Ok(())
    }

    fn redeem(&self, code: &str, machine_code: &MachineCode, at: DateTime<Utc>) -> BatchResult<u32> {
        let code = normalize_code(code);
        let conn = self.lock()?;
        let row: Option<(u32, bool)> = conn
            .query_row(
                "SELECT duration_days, is_used FROM activation_codes WHERE code = ?1",
                params![code],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(|e| BatchError::Storage(format!("failed to look up code: {e}")))?;

        let duration_days = match row {
            None => return Err(BatchError::CodeNotFound(code)),
            Some((_, true)) => return Err(BatchError::CodeAlreadyUsed(code)),
            Some((days, false)) => days,
        };

        conn.execute(
            "UPDATE activation_codes SET is_used = 1, used_by_machine = ?1, used_at = ?2 WHERE code = ?3",
            params![machine_code.as_str(), at.timestamp_millis(), code],
        )
        .map_err(|e| BatchError::Storage(format!("failed to mark code used: {e}")))?;
        debug!(duration_days, "redeemed activation code");
        Ok(duration_days)
    }

    fn get(&self, code: &str) -> BatchResult<Option<CodeRecord>> {
        let code = normalize_code(code);
        let conn = self.lock()?;
        conn.query_row(
            "SELECT code, duration_days, is_used, used_by_machine, used_at FROM activation_codes WHERE code = ?1",
            params![code],
            |row| {
                let used_at: Option<i64> = row.get(4)?;
                Ok(CodeRecord {
                    code: row.get(0)?,
                    duration_days: row.get(1)?,
                    is_used: row.get(2)?,
                    used_by_machine: row.get(3)?,
                    used_at: used_at.and_then(DateTime::from_timestamp_millis),
                })
            },
        )
        .optional()
        .map_err(|e| BatchError::Storage(format!("failed to read code: {e}")))
    }
}
