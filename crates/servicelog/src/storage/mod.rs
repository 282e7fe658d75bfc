//! Persistence layer for servicelog.
//!
//! Application state (drafts and submitted logs) is serialized as a single
//! JSON document and stored in a `SQLite` key-value table under one
//! namespaced root key. The stores themselves stay in memory; this layer
//! only loads a snapshot at startup and writes one back after mutations.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::draft::DraftsSnapshot;
use crate::error::{Error, Result};
use crate::logbook::LogsSnapshot;

/// The root key the application snapshot is persisted under.
pub const ROOT_KEY: &str = "servicelog:root";

/// The whitelisted application state persisted under [`ROOT_KEY`].
///
/// Only the draft and log stores are persisted; everything else
/// (configuration, timers, validation results) is rebuilt at startup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Draft store state.
    pub drafts: DraftsSnapshot,
    /// Log store state.
    pub logs: LogsSnapshot,
}

/// Key-value snapshot storage backed by `SQLite`.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist
    /// and brings the schema up to date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema
    /// initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::ensure_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::ensure_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the application snapshot under the root key, replacing any
    /// previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the database write fails.
    pub fn save_snapshot(&self, snapshot: &Snapshot) -> Result<()> {
        let value = serde_json::to_string(snapshot)?;
        self.conn.execute(
            r"
            INSERT INTO snapshots (key, value, updated_at)
            VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            ",
            params![ROOT_KEY, value],
        )?;
        debug!("Persisted snapshot ({} bytes)", value.len());
        Ok(())
    }

    /// Load the persisted application snapshot, if any.
    ///
    /// A snapshot that no longer deserializes (written by an incompatible
    /// version) is discarded with a warning rather than failing startup.
    ///
    /// # Errors
    ///
    /// Returns an error if the database read fails.
    pub fn load_snapshot(&self) -> Result<Option<Snapshot>> {
        let value: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM snapshots WHERE key = ?1",
                [ROOT_KEY],
                |row| row.get(0),
            )
            .optional()?;

        let Some(value) = value else {
            return Ok(None);
        };

        match serde_json::from_str(&value) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(err) => {
                warn!("Discarding unreadable snapshot: {err}");
                Ok(None)
            }
        }
    }

    /// Remove the persisted snapshot, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails.
    pub fn clear_snapshot(&self) -> Result<()> {
        self.conn
            .execute("DELETE FROM snapshots WHERE key = ?1", [ROOT_KEY])?;
        Ok(())
    }
}
