//! Tag rows and task-tag associations.

use super::placeholders;
use crate::types::{Tag, TagId, TaskId};
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use std::collections::HashMap;

pub fn parse_tag_row(row: &Row) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: row.get("id")?,
        name: row.get("name")?,
        color: row.get("color")?,
    })
}

/// Insert a tag. A name collision surfaces as a constraint violation.
pub fn insert_tag(conn: &Connection, name: &str, color: Option<&str>) -> rusqlite::Result<Tag> {
    conn.execute(
        "INSERT INTO tags (name, color) VALUES (?1, ?2)",
        params![name, color],
    )?;
    Ok(Tag {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
        color: color.map(String::from),
    })
}

/// Update the provided fields. Returns the number of rows touched.
pub fn update_tag(
    conn: &Connection,
    tag_id: TagId,
    name: Option<&str>,
    color: Option<&str>,
) -> rusqlite::Result<usize> {
    let mut sets: Vec<&str> = Vec::new();
    let mut values: Vec<&dyn rusqlite::ToSql> = Vec::new();

    if let Some(n) = &name {
        sets.push("name = ?");
        values.push(n);
    }
    if let Some(c) = &color {
        sets.push("color = ?");
        values.push(c);
    }
    if sets.is_empty() {
        return Ok(0);
    }
    values.push(&tag_id);

    let sql = format!("UPDATE tags SET {} WHERE id = ?", sets.join(", "));
    conn.execute(&sql, values.as_slice())
}

pub fn delete_tag(conn: &Connection, tag_id: TagId) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM tags WHERE id = ?1", params![tag_id])
}

pub fn get_tag(conn: &Connection, tag_id: TagId) -> rusqlite::Result<Option<Tag>> {
    conn.query_row(
        "SELECT id, name, color FROM tags WHERE id = ?1",
        params![tag_id],
        parse_tag_row,
    )
    .optional()
}

pub fn get_tag_by_name(conn: &Connection, name: &str) -> rusqlite::Result<Option<Tag>> {
    conn.query_row(
        "SELECT id, name, color FROM tags WHERE name = ?1",
        params![name],
        parse_tag_row,
    )
    .optional()
}

pub fn list_tags(conn: &Connection) -> rusqlite::Result<Vec<Tag>> {
    let mut stmt = conn.prepare("SELECT id, name, color FROM tags ORDER BY name ASC")?;
    let tags = stmt
        .query_map([], parse_tag_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(tags)
}

/// Associate a tag with a task. Already-present associations are kept as is.
pub fn attach_tag(conn: &Connection, task_id: TaskId, tag_id: TagId) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO task_tags (task_id, tag_id) VALUES (?1, ?2)",
        params![task_id, tag_id],
    )?;
    Ok(())
}

pub fn detach_tag(conn: &Connection, task_id: TaskId, tag_id: TagId) -> rusqlite::Result<usize> {
    conn.execute(
        "DELETE FROM task_tags WHERE task_id = ?1 AND tag_id = ?2",
        params![task_id, tag_id],
    )
}

/// Replace the task's tag set.
pub fn replace_task_tags(
    conn: &Connection,
    task_id: TaskId,
    tag_ids: &[TagId],
) -> rusqlite::Result<()> {
    conn.execute("DELETE FROM task_tags WHERE task_id = ?1", params![task_id])?;
    for tag_id in tag_ids {
        attach_tag(conn, task_id, *tag_id)?;
    }
    Ok(())
}

/// Load tags for many tasks at once, each list sorted by name.
pub fn tags_for_tasks(
    conn: &Connection,
    task_ids: &[TaskId],
) -> rusqlite::Result<HashMap<TaskId, Vec<Tag>>> {
    let mut map: HashMap<TaskId, Vec<Tag>> = HashMap::new();
    if task_ids.is_empty() {
        return Ok(map);
    }

    let sql = format!(
        "SELECT tt.task_id, tg.id, tg.name, tg.color
         FROM task_tags tt
         JOIN tags tg ON tg.id = tt.tag_id
         WHERE tt.task_id IN ({})
         ORDER BY tg.name ASC",
        placeholders(task_ids.len())
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(task_ids.iter()), |row| {
        Ok((
            row.get::<_, TaskId>(0)?,
            Tag {
                id: row.get(1)?,
                name: row.get(2)?,
                color: row.get(3)?,
            },
        ))
    })?;

    for row in rows {
        let (task_id, tag) = row?;
        map.entry(task_id).or_default().push(tag);
    }

    Ok(map)
}
