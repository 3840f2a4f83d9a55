//! Database layer for the task tracker.
//!
//! `Database` owns the SQLite connection and schema migrations. The entity
//! repositories in the submodules are free functions over a borrowed
//! [`Connection`], so service code can run several of them inside one
//! transaction.

pub mod links;
pub mod statuses;
pub mod tags;
pub mod tasks;

use crate::error::TrackerResult;
use anyhow::Result;
use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Persisted timestamp format. Lexical order equals chronological order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Database handle wrapping a SQLite connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create the database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA foreign_keys=ON;
             PRAGMA busy_timeout=5000;",
        )?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.initialize()?;
        debug!(path = %path.display(), "Opened database");

        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;

        conn.execute_batch("PRAGMA foreign_keys=ON;")?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.initialize()?;

        Ok(db)
    }

    /// Run migrations, then make sure every known status has a row.
    fn initialize(&self) -> Result<()> {
        let mut conn = self.lock();
        embedded::migrations::runner().run(&mut *conn)?;
        statuses::seed_statuses(&conn)?;
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Execute a function with exclusive access to the connection.
    pub fn with_conn<F, T>(&self, f: F) -> TrackerResult<T>
    where
        F: FnOnce(&Connection) -> TrackerResult<T>,
    {
        let conn = self.lock();
        f(&conn)
    }

    /// Execute a function with mutable access to the connection (for transactions).
    ///
    /// The lock is held for the whole call, so read-then-write sequences
    /// inside `f` cannot interleave with another caller.
    pub fn with_conn_mut<F, T>(&self, f: F) -> TrackerResult<T>
    where
        F: FnOnce(&mut Connection) -> TrackerResult<T>,
    {
        let mut conn = self.lock();
        f(&mut conn)
    }
}

/// Current UTC time truncated to whole seconds.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(value: &str) -> rusqlite::Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .map(|dt| dt.and_utc())
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e)))
}

/// Whether the error is a uniqueness or other constraint violation.
pub fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

/// Build a `?, ?, ?` placeholder list.
pub(crate) fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}
