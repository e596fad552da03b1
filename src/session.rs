//! Local key-value slots for session persistence
//!
//! The logged-in account's `{email, role}` lives under the `"user"` slot as a
//! flat JSON record. It is read back at boot and cleared on logout.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::model::Role;

pub const SESSION_KEY: &str = "user";

pub trait SlotStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn put(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub email: String,
    pub role: Role,
}

pub fn save_session(slots: &dyn SlotStore, record: &SessionRecord) -> Result<()> {
    let value = serde_json::to_string(record).context("Failed to serialize session")?;
    slots.put(SESSION_KEY, &value)
}

/// Restore the persisted session; an unreadable record is treated as absent.
pub fn load_session(slots: &dyn SlotStore) -> Result<Option<SessionRecord>> {
    let Some(value) = slots.get(SESSION_KEY)? else {
        return Ok(None);
    };
    match serde_json::from_str(&value) {
        Ok(record) => Ok(Some(record)),
        Err(e) => {
            warn!("Discarding unreadable session record: {}", e);
            slots.remove(SESSION_KEY)?;
            Ok(None)
        }
    }
}

pub fn clear_session(slots: &dyn SlotStore) -> Result<()> {
    slots.remove(SESSION_KEY)
}

pub struct SqliteSlots {
    conn: Mutex<Connection>,
}

impl SqliteSlots {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref()).with_context(|| {
            format!("Failed to open session database {}", path.as_ref().display())
        })?;
        Self::with_connection(conn)
    }

    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS slots (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )
        .context("Failed to create slots table")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl SlotStore for SqliteSlots {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock();
        let value = conn
            .query_row(
                "SELECT value FROM slots WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT OR REPLACE INTO slots (key, value, updated_at) VALUES (?1, ?2, ?3)",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        debug!("Stored slot {}", key);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute("DELETE FROM slots WHERE key = ?1", params![key])?;
        debug!("Cleared slot {}", key);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemorySlots {
    values: Mutex<HashMap<String, String>>,
}

impl MemorySlots {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlotStore for MemorySlots {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values.lock().remove(key);
        Ok(())
    }
}
