//! Tag service: uniqueness, auto-creation and task associations.

use crate::db::{self, Database, is_constraint_violation};
use crate::error::{TrackerError, TrackerResult};
use crate::types::{Tag, TagId, Task, TaskId};
use rusqlite::Connection;
use tracing::{debug, info};

/// Trim a tag name and reject blank ones.
pub(crate) fn normalize_tag_name(name: &str) -> TrackerResult<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(TrackerError::invalid_argument(
            "name",
            "Tag name must not be empty",
        ));
    }
    Ok(trimmed)
}

/// Insert a tag, translating a name collision into `DuplicateName`.
pub(crate) fn create_tag(conn: &Connection, name: &str, color: Option<&str>) -> TrackerResult<Tag> {
    let name = normalize_tag_name(name)?;
    match db::tags::insert_tag(conn, name, color) {
        Ok(tag) => {
            info!(tag_id = tag.id, name = %tag.name, "Created tag");
            Ok(tag)
        }
        Err(e) if is_constraint_violation(&e) => Err(TrackerError::duplicate_name(name)),
        Err(e) => Err(e.into()),
    }
}

/// Look a tag up by name, creating it if absent.
///
/// The lookup and the insert run on the caller's connection; callers that
/// hold the database lock for the whole sequence cannot race themselves.
pub(crate) fn ensure_tag(conn: &Connection, name: &str, color: Option<&str>) -> TrackerResult<Tag> {
    let name = normalize_tag_name(name)?;
    if let Some(tag) = db::tags::get_tag_by_name(conn, name)? {
        return Ok(tag);
    }
    create_tag(conn, name, color)
}

/// Resolve (and auto-create) tags by name, dropping duplicate ids.
pub(crate) fn resolve_tag_ids<S: AsRef<str>>(
    conn: &Connection,
    names: &[S],
) -> TrackerResult<Vec<TagId>> {
    let mut ids: Vec<TagId> = Vec::with_capacity(names.len());
    for name in names {
        let tag = ensure_tag(conn, name.as_ref(), None)?;
        if !ids.contains(&tag.id) {
            ids.push(tag.id);
        }
    }
    Ok(ids)
}

fn require_task(conn: &Connection, task_id: TaskId) -> TrackerResult<Task> {
    db::tasks::get_task(conn, task_id)?.ok_or_else(|| TrackerError::task_not_found(task_id))
}

/// Tag operations exposed to the shell.
#[derive(Clone)]
pub struct TagService {
    db: Database,
}

impl TagService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create a tag. Fails with `DuplicateName` if the trimmed name is taken.
    pub fn create(&self, name: &str, color: Option<&str>) -> TrackerResult<Tag> {
        self.db.with_conn(|conn| create_tag(conn, name, color))
    }

    /// Partially update a tag; omitted fields keep their values.
    pub fn update(&self, tag_id: TagId, name: Option<&str>, color: Option<&str>) -> TrackerResult<Tag> {
        let name = name.map(normalize_tag_name).transpose()?;

        self.db.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            if db::tags::get_tag(&tx, tag_id)?.is_none() {
                return Err(TrackerError::tag_not_found(tag_id));
            }

            match db::tags::update_tag(&tx, tag_id, name, color) {
                Ok(_) => {}
                Err(e) if is_constraint_violation(&e) => {
                    return Err(TrackerError::duplicate_name(name.unwrap_or_default()));
                }
                Err(e) => return Err(e.into()),
            }

            let tag = db::tags::get_tag(&tx, tag_id)?
                .ok_or_else(|| TrackerError::tag_not_found(tag_id))?;
            tx.commit()?;

            info!(tag_id, name = %tag.name, "Updated tag");
            Ok(tag)
        })
    }

    /// Delete a tag and its associations. Deleting an absent tag is not an error.
    pub fn delete(&self, tag_id: TagId) -> TrackerResult<()> {
        self.db.with_conn(|conn| {
            let removed = db::tags::delete_tag(conn, tag_id)?;
            info!(tag_id, removed, "Deleted tag");
            Ok(())
        })
    }

    /// Return the tag with this name, creating it if needed.
    pub fn ensure(&self, name: &str, color: Option<&str>) -> TrackerResult<Tag> {
        self.db.with_conn(|conn| ensure_tag(conn, name, color))
    }

    /// Attach a tag (auto-created if needed) to a task.
    pub fn assign(&self, task_id: TaskId, tag_name: &str) -> TrackerResult<Task> {
        self.db.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            require_task(&tx, task_id)?;
            let tag = ensure_tag(&tx, tag_name, None)?;
            db::tags::attach_tag(&tx, task_id, tag.id)?;
            db::tasks::update_task_fields(&tx, task_id, None, None, None, &db::now())?;
            let task = require_task(&tx, task_id)?;

            tx.commit()?;
            info!(task_id, tag = %tag.name, "Assigned tag");
            Ok(task)
        })
    }

    /// Detach a tag from a task. Fails if the tag is unknown; detaching a tag
    /// the task never had is a no-op.
    pub fn unassign(&self, task_id: TaskId, tag_name: &str) -> TrackerResult<Task> {
        let name = normalize_tag_name(tag_name)?;

        self.db.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let tag = db::tags::get_tag_by_name(&tx, name)?
                .ok_or_else(|| TrackerError::unknown_tag(name))?;
            require_task(&tx, task_id)?;

            let removed = db::tags::detach_tag(&tx, task_id, tag.id)?;
            if removed > 0 {
                db::tasks::update_task_fields(&tx, task_id, None, None, None, &db::now())?;
            } else {
                debug!(task_id, tag = %tag.name, "Tag was not assigned");
            }
            let task = require_task(&tx, task_id)?;

            tx.commit()?;
            Ok(task)
        })
    }

    /// All tags ordered by name.
    pub fn list(&self) -> TrackerResult<Vec<Tag>> {
        self.db
            .with_conn(|conn| db::tags::list_tags(conn).map_err(TrackerError::from))
    }
}
