//! Task link rows.

use crate::types::{TaskId, TaskLink};
use rusqlite::{Connection, Row, params};

pub fn parse_link_row(row: &Row) -> rusqlite::Result<TaskLink> {
    Ok(TaskLink {
        id: row.get("id")?,
        from_task_id: row.get("from_task_id")?,
        to_task_id: row.get("to_task_id")?,
        link_type: row.get("type")?,
    })
}

/// Insert a link. An existing `(from, to, type)` triple surfaces as a
/// constraint violation.
pub fn insert_link(
    conn: &Connection,
    from_task_id: TaskId,
    to_task_id: TaskId,
    link_type: &str,
) -> rusqlite::Result<TaskLink> {
    conn.execute(
        "INSERT INTO task_links (from_task_id, to_task_id, type) VALUES (?1, ?2, ?3)",
        params![from_task_id, to_task_id, link_type],
    )?;
    Ok(TaskLink {
        id: conn.last_insert_rowid(),
        from_task_id,
        to_task_id,
        link_type: link_type.to_string(),
    })
}

pub fn delete_link(
    conn: &Connection,
    from_task_id: TaskId,
    to_task_id: TaskId,
    link_type: &str,
) -> rusqlite::Result<usize> {
    conn.execute(
        "DELETE FROM task_links WHERE from_task_id = ?1 AND to_task_id = ?2 AND type = ?3",
        params![from_task_id, to_task_id, link_type],
    )
}

/// All links ordered by id.
pub fn list_links(conn: &Connection) -> rusqlite::Result<Vec<TaskLink>> {
    let mut stmt =
        conn.prepare("SELECT id, from_task_id, to_task_id, type FROM task_links ORDER BY id")?;
    let links = stmt
        .query_map([], parse_link_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(links)
}

/// Targets of every outgoing edge of `task_id`, across all link types.
pub fn outgoing_targets(conn: &Connection, task_id: TaskId) -> rusqlite::Result<Vec<TaskId>> {
    let mut stmt = conn.prepare_cached(
        "SELECT DISTINCT to_task_id FROM task_links WHERE from_task_id = ?1 ORDER BY to_task_id",
    )?;
    let targets = stmt
        .query_map(params![task_id], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(targets)
}
