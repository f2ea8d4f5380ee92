// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Keyed tab record store backed by SQLite.
//
// One row per live tab.  The record column is nullable: a NULL value is a
// tab that has been created but whose first main-frame navigation has not
// been observed yet.  Absent row and NULL value read back identically as
// `None` — both mean "nothing to signal for".

use rusqlite::{Connection, params};
use tracing::{debug, info, instrument};

use certcue_core::error::{CertcueError, Result};
use certcue_core::types::{SecurityRecord, TabId};

/// SQLite schema for the tabs table.
const CREATE_TABLE_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS tabs (
        tab_id TEXT PRIMARY KEY,
        record TEXT
    )
"#;

/// Keyed map from tab id to security record.
///
/// All methods are synchronous because `rusqlite` does not support async
/// natively.  Operations are sub-millisecond; async callers share the store
/// behind an `Arc<Mutex<TabStore>>` and hold the lock only across a single
/// call, never across an await point.
pub struct TabStore {
    /// The open SQLite connection.
    conn: Connection,
}

impl TabStore {
    /// Open (or create) the store database at the given path.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())
            .map_err(|e| CertcueError::Store(format!("open: {e}")))?;

        // WAL mode survives unclean shutdowns more gracefully.
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| CertcueError::Store(format!("WAL pragma: {e}")))?;

        conn.execute_batch(CREATE_TABLE_SQL)
            .map_err(|e| CertcueError::Store(format!("create table: {e}")))?;

        info!("tab store opened");
        Ok(Self { conn })
    }

    /// Open an in-memory store (useful for tests and ephemeral sessions).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| CertcueError::Store(format!("open in-memory: {e}")))?;

        conn.execute_batch(CREATE_TABLE_SQL)
            .map_err(|e| CertcueError::Store(format!("create table: {e}")))?;

        debug!("in-memory tab store opened");
        Ok(Self { conn })
    }

    /// Upsert or clear the record for a tab.
    ///
    /// `None` writes an empty entry — the tab is tracked but nothing has
    /// been observed.  Idempotent.
    #[instrument(skip(self, record), fields(tab = %tab))]
    pub fn put(&self, tab: TabId, record: Option<&SecurityRecord>) -> Result<()> {
        let json = record.map(serde_json::to_string).transpose()?;

        self.conn
            .execute(
                "INSERT OR REPLACE INTO tabs (tab_id, record) VALUES (?1, ?2)",
                params![tab.to_string(), json],
            )
            .map_err(|e| CertcueError::Store(format!("put: {e}")))?;

        debug!(observed = record.is_some(), "tab record written");
        Ok(())
    }

    /// Read the record for a tab.
    ///
    /// Returns `None` for an unknown tab and for a tracked-but-unobserved
    /// tab alike.
    #[instrument(skip(self), fields(tab = %tab))]
    pub fn get(&self, tab: TabId) -> Result<Option<SecurityRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT record FROM tabs WHERE tab_id = ?1")
            .map_err(|e| CertcueError::Store(format!("prepare get: {e}")))?;

        let mut rows = stmt
            .query(params![tab.to_string()])
            .map_err(|e| CertcueError::Store(format!("query get: {e}")))?;

        let row = rows
            .next()
            .map_err(|e| CertcueError::Store(format!("row get: {e}")))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let json: Option<String> = row
            .get(0)
            .map_err(|e| CertcueError::Store(format!("column get: {e}")))?;

        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Delete the entry for a tab.
    ///
    /// Returns `Ok(())` even if the tab was never tracked (idempotent).
    #[instrument(skip(self), fields(tab = %tab))]
    pub fn remove(&self, tab: TabId) -> Result<()> {
        self.conn
            .execute("DELETE FROM tabs WHERE tab_id = ?1", params![tab.to_string()])
            .map_err(|e| CertcueError::Store(format!("remove: {e}")))?;

        debug!("tab entry removed");
        Ok(())
    }

    /// Number of tracked tabs (observed or not).
    pub fn count(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM tabs", [], |row| row.get(0))
            .map_err(|e| CertcueError::Store(format!("count: {e}")))?;
        Ok(count as u64)
    }
}
