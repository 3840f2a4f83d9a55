//! Task rows and the filtered task query.

use super::tags::tags_for_tasks;
use super::{format_timestamp, parse_timestamp, placeholders};
use crate::types::{Status, Task, TaskFilters, TaskId};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, ToSql, params, params_from_iter};
use std::collections::BTreeSet;

const TASK_COLUMNS: &str = "t.id, t.title, t.description, t.status, t.created_at, t.updated_at";

/// Parse a task row. Tags are attached separately.
pub fn parse_task_row(row: &Row) -> rusqlite::Result<Task> {
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;

    Ok(Task {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        status: row.get("status")?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
        tags: Vec::new(),
    })
}

pub fn insert_task(
    conn: &Connection,
    title: &str,
    description: &str,
    status: Status,
    now: &DateTime<Utc>,
) -> rusqlite::Result<TaskId> {
    let ts = format_timestamp(now);
    conn.execute(
        "INSERT INTO tasks (title, description, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?4)",
        params![title, description, status, ts],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Update the provided columns and stamp `updated_at`. `created_at` is never written.
pub fn update_task_fields(
    conn: &Connection,
    task_id: TaskId,
    title: Option<&str>,
    description: Option<&str>,
    status: Option<Status>,
    now: &DateTime<Utc>,
) -> rusqlite::Result<usize> {
    let ts = format_timestamp(now);
    let mut sets: Vec<&str> = Vec::new();
    let mut values: Vec<&dyn ToSql> = Vec::new();

    if let Some(t) = &title {
        sets.push("title = ?");
        values.push(t);
    }
    if let Some(d) = &description {
        sets.push("description = ?");
        values.push(d);
    }
    if let Some(s) = &status {
        sets.push("status = ?");
        values.push(s);
    }
    sets.push("updated_at = ?");
    values.push(&ts);
    values.push(&task_id);

    let sql = format!("UPDATE tasks SET {} WHERE id = ?", sets.join(", "));
    conn.execute(&sql, values.as_slice())
}

pub fn delete_task(conn: &Connection, task_id: TaskId) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM tasks WHERE id = ?1", params![task_id])
}

pub fn task_exists(conn: &Connection, task_id: TaskId) -> rusqlite::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM tasks WHERE id = ?1",
        params![task_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Get a task with its tags.
pub fn get_task(conn: &Connection, task_id: TaskId) -> rusqlite::Result<Option<Task>> {
    let sql = format!("SELECT {} FROM tasks t WHERE t.id = ?1", TASK_COLUMNS);
    let task = conn
        .query_row(&sql, params![task_id], parse_task_row)
        .optional()?;

    match task {
        Some(mut task) => {
            let mut tags = tags_for_tasks(conn, &[task.id])?;
            task.tags = tags.remove(&task.id).unwrap_or_default();
            Ok(Some(task))
        }
        None => Ok(None),
    }
}

/// List tasks matching the filters, most recently updated first, ties by id.
pub fn list_tasks(conn: &Connection, filters: &TaskFilters) -> rusqlite::Result<Vec<Task>> {
    let mut clauses: Vec<String> = Vec::new();
    let mut values: Vec<Box<dyn ToSql>> = Vec::new();

    if !filters.statuses.is_empty() {
        let statuses: BTreeSet<Status> = filters.statuses.iter().copied().collect();
        clauses.push(format!("t.status IN ({})", placeholders(statuses.len())));
        for status in statuses {
            values.push(Box::new(status));
        }
    }

    let bounds = [
        ("t.created_at >= ?", &filters.created_after),
        ("t.created_at <= ?", &filters.created_before),
        ("t.updated_at >= ?", &filters.updated_after),
        ("t.updated_at <= ?", &filters.updated_before),
    ];
    for (clause, bound) in bounds {
        if let Some(ts) = bound {
            clauses.push(clause.to_string());
            values.push(Box::new(format_timestamp(ts)));
        }
    }

    // A task must carry every requested tag: count distinct matches per task.
    // A blank name is kept so that it matches nothing, like any unknown tag.
    let tag_names: BTreeSet<&str> = filters.tag_names.iter().map(|name| name.trim()).collect();
    if !tag_names.is_empty() {
        clauses.push(format!(
            "t.id IN (
                SELECT tt.task_id FROM task_tags tt
                JOIN tags tg ON tg.id = tt.tag_id
                WHERE tg.name IN ({})
                GROUP BY tt.task_id
                HAVING COUNT(DISTINCT tg.name) = ?
            )",
            placeholders(tag_names.len())
        ));
        let count = tag_names.len() as i64;
        for name in tag_names {
            values.push(Box::new(name.to_string()));
        }
        values.push(Box::new(count));
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };

    let sql = format!(
        "SELECT {} FROM tasks t {} ORDER BY t.updated_at DESC, t.id ASC",
        TASK_COLUMNS, where_sql
    );

    let mut stmt = conn.prepare(&sql)?;
    let mut tasks = stmt
        .query_map(params_from_iter(values.iter()), parse_task_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let ids: Vec<TaskId> = tasks.iter().map(|t| t.id).collect();
    let mut tags = tags_for_tasks(conn, &ids)?;
    for task in &mut tasks {
        task.tags = tags.remove(&task.id).unwrap_or_default();
    }

    Ok(tasks)
}
