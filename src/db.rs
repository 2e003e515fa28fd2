//! Database module
//!
//! Append-only document store for interaction records, plus the queries the
//! admin surface needs (paged listing, age-based purge).

mod schema;

pub use schema::*;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type DbResult<T> = Result<T, DbError>;

/// Thread-safe database handle
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing)
    #[allow(dead_code)] // Used in tests
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn run_migrations(&self) -> DbResult<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // ==================== Interaction Records ====================

    pub fn insert_interaction(&self, record: &InteractionRecord) -> DbResult<()> {
        self.conn().execute(
            "INSERT INTO consultas (id, usuario, nombre, mensaje, contexto, estado, fecha)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.id,
                record.sender,
                record.display_name,
                record.message,
                record.context,
                record.state_label,
                format_datetime(&record.recorded_at),
            ],
        )?;
        Ok(())
    }

    /// Page through records, newest first. `page` is 1-based.
    pub fn list_interactions(&self, page: u32, limit: u32) -> DbResult<Vec<InteractionRecord>> {
        let offset = i64::from(page.saturating_sub(1)) * i64::from(limit);
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, usuario, nombre, mensaje, contexto, estado, fecha
             FROM consultas
             ORDER BY fecha DESC, rowid DESC
             LIMIT ?1 OFFSET ?2",
        )?;

        let rows = stmt.query_map(params![i64::from(limit), offset], record_from_row)?;
        let records = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Most recent record for a sender, if any
    pub fn latest_for_sender(&self, sender: &str) -> DbResult<Option<InteractionRecord>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, usuario, nombre, mensaje, contexto, estado, fecha
             FROM consultas
             WHERE usuario = ?1
             ORDER BY fecha DESC, rowid DESC
             LIMIT 1",
        )?;

        let latest = stmt.query_row(params![sender], record_from_row).optional()?;
        Ok(latest)
    }

    /// Delete records strictly older than `cutoff`; returns how many went
    pub fn delete_older_than(&self, cutoff: DateTime<Utc>) -> DbResult<usize> {
        let deleted = self.conn().execute(
            "DELETE FROM consultas WHERE fecha < ?1",
            params![format_datetime(&cutoff)],
        )?;
        Ok(deleted)
    }

    #[allow(dead_code)] // Used in tests
    pub fn count_interactions(&self) -> DbResult<u64> {
        let count: i64 = self
            .conn()
            .query_row("SELECT COUNT(*) FROM consultas", [], |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<InteractionRecord> {
    Ok(InteractionRecord {
        id: row.get(0)?,
        sender: row.get(1)?,
        display_name: row.get(2)?,
        message: row.get(3)?,
        context: row.get(4)?,
        state_label: row.get(5)?,
        recorded_at: parse_datetime(&row.get::<_, String>(6)?),
    })
}

/// Fixed-width UTC timestamps so string order matches time order
fn format_datetime(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc))
}
