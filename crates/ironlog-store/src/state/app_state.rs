//! Key/value application state
//!
//! Each call is atomic on its own; nothing links two keys transactionally.
//! The typed accessors treat "set to None" as deleting the key.

use ironlog_core::{ExError, ExErrorKind, TimerSnapshot, TimerState};
use rusqlite::OptionalExtension;
use uuid::Uuid;

use crate::db::StorageHandle;
use crate::errors::{from_rusqlite, Result};

pub const ACTIVE_SESSION_ID: &str = "active_session_id";
pub const LAST_TEMPLATE_ID: &str = "last_template_id";
pub const TIMER_STATE: &str = "timer_state";

pub struct KeyValueStateStore<'a> {
    db: &'a StorageHandle,
}

impl<'a> KeyValueStateStore<'a> {
    pub fn new(db: &'a StorageHandle) -> Self {
        Self { db }
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        self.db.cursor(|conn| {
            conn.query_row("SELECT value FROM app_state WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(from_rusqlite)
        })
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.db.transaction(|tx| {
            tx.execute(
                "INSERT INTO app_state (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                [key, value],
            )
            .map_err(from_rusqlite)?;
            Ok(())
        })
    }

    /// Remove a key; returns false if it was not set
    pub fn delete(&self, key: &str) -> Result<bool> {
        let removed = self.db.transaction(|tx| {
            tx.execute("DELETE FROM app_state WHERE key = ?1", [key])
                .map_err(from_rusqlite)
        })?;
        Ok(removed > 0)
    }

    /// Remove every key
    pub fn clear_all(&self) -> Result<()> {
        self.db.transaction(|tx| {
            tx.execute("DELETE FROM app_state", [])
                .map_err(from_rusqlite)?;
            Ok(())
        })
    }

    pub fn active_session_id(&self) -> Result<Option<Uuid>> {
        self.get_id(ACTIVE_SESSION_ID)
    }

    pub fn set_active_session_id(&self, id: Option<Uuid>) -> Result<()> {
        self.set_id(ACTIVE_SESSION_ID, id)
    }

    pub fn last_template_id(&self) -> Result<Option<Uuid>> {
        self.get_id(LAST_TEMPLATE_ID)
    }

    pub fn set_last_template_id(&self, id: Option<Uuid>) -> Result<()> {
        self.set_id(LAST_TEMPLATE_ID, id)
    }

    /// The saved timer snapshot
    ///
    /// An unreadable or unsupported snapshot is "no saved state".
    pub fn timer_state(&self) -> Result<Option<TimerState>> {
        Ok(self
            .get(TIMER_STATE)?
            .and_then(|raw| TimerSnapshot::decode(&raw)))
    }

    pub fn set_timer_state(&self, state: Option<&TimerState>) -> Result<()> {
        match state {
            Some(state) => self.set(TIMER_STATE, &TimerSnapshot::encode(state)?),
            None => self.delete(TIMER_STATE).map(|_| ()),
        }
    }

    fn get_id(&self, key: &str) -> Result<Option<Uuid>> {
        self.get(key)?
            .map(|raw| {
                Uuid::parse_str(&raw).map_err(|e| {
                    ExError::new(ExErrorKind::Persistence)
                        .with_op("read_app_state")
                        .with_entity_id(key)
                        .with_message(format!("Stored value is not an id: {}", e))
                })
            })
            .transpose()
    }

    fn set_id(&self, key: &str, id: Option<Uuid>) -> Result<()> {
        match id {
            Some(id) => self.set(key, &id.to_string()),
            None => self.delete(key).map(|_| ()),
        }
    }
}
