//! Status table seeding and lookups.

use crate::types::Status;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{Connection, params};
use std::str::FromStr;

impl ToSql for Status {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Status {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let name = value.as_str()?;
        Status::from_str(name).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

/// Insert any status from the enumeration that is not stored yet.
pub fn seed_statuses(conn: &Connection) -> rusqlite::Result<()> {
    let mut stmt =
        conn.prepare("INSERT OR IGNORE INTO task_statuses (name, position) VALUES (?1, ?2)")?;
    for status in Status::ALL {
        stmt.execute(params![status, status.position()])?;
    }
    Ok(())
}

/// Stored statuses ordered by position. Unrecognised rows are skipped.
pub fn list_statuses(conn: &Connection) -> rusqlite::Result<Vec<Status>> {
    let mut stmt = conn.prepare("SELECT name FROM task_statuses ORDER BY position ASC")?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(names
        .iter()
        .filter_map(|name| Status::from_str(name).ok())
        .collect())
}

pub fn status_exists(conn: &Connection, status: Status) -> rusqlite::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM task_statuses WHERE name = ?1",
        params![status],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}
