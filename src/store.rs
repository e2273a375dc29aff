//! Durable settings store
//!
//! A small key→string store backed by SQLite, surviving process restarts.
//! It holds exactly two kinds of state: the generated emulator device id and
//! the captured install referral. The store is shared mutable state — the
//! referral tracker writes into it while a reporting cycle may be reading —
//! so every operation is a single-key atomic read or upsert; no multi-key
//! transactions exist or are needed.

use crate::error::Result;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::PathBuf;
use std::sync::Mutex;

/// Store key for the generated emulator device id
pub const KEY_EMULATOR_DEVICE_ID: &str = "emulatorDeviceId";

/// Store key for the captured install referral
pub const KEY_INSTALL_REFERRAL: &str = "InstallReferral";

/// Durable key-value store handle (single connection)
pub struct SettingsStore {
    conn: Mutex<Connection>,
}

impl SettingsStore {
    /// Open or create a settings store at the given path
    pub fn open(path: &PathBuf) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // WAL mode for concurrent reader/writer access
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory store (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS settings (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    /// Get the stored value for a key, or None if absent
    pub fn get_string(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT value FROM settings WHERE key = ?1", [key], |row| {
            row.get(0)
        })
        .optional()
        .map_err(crate::error::Error::from)
    }

    /// Set the value for a key, replacing any existing value
    pub fn put_string(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }
}
