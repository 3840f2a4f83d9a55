//! Task service: validation, tag replacement, filtering and cycle-safe linking.

use super::tags::resolve_tag_ids;
use crate::db::{self, Database, is_constraint_violation};
use crate::error::{TrackerError, TrackerResult};
use crate::types::{Status, Task, TaskFilters, TaskId, TaskLink, TaskUpdate};
use rusqlite::{Connection, TransactionBehavior};
use std::collections::HashSet;
use std::str::FromStr;
use tracing::{debug, info, warn};

fn normalize_title(title: &str) -> TrackerResult<&str> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(TrackerError::invalid_argument(
            "title",
            "Task title must not be empty",
        ));
    }
    Ok(trimmed)
}

/// Parse a status and confirm the store knows it.
fn validate_status(conn: &Connection, status: &str) -> TrackerResult<Status> {
    let parsed = Status::from_str(status)?;
    if !db::statuses::status_exists(conn, parsed)? {
        let known = db::statuses::list_statuses(conn)?;
        let names: Vec<&str> = known.iter().map(Status::as_str).collect();
        return Err(TrackerError::invalid_status(status, &names));
    }
    Ok(parsed)
}

fn require_task(conn: &Connection, task_id: TaskId) -> TrackerResult<Task> {
    db::tasks::get_task(conn, task_id)?.ok_or_else(|| TrackerError::task_not_found(task_id))
}

/// Fail with `NotFound` naming every id that has no task.
fn ensure_tasks_exist(conn: &Connection, task_ids: &[TaskId]) -> TrackerResult<()> {
    let mut missing: Vec<TaskId> = Vec::new();
    for &task_id in task_ids {
        if !missing.contains(&task_id) && !db::tasks::task_exists(conn, task_id)? {
            missing.push(task_id);
        }
    }
    if missing.is_empty() {
        Ok(())
    } else {
        Err(TrackerError::tasks_not_found(&missing))
    }
}

/// Whether adding `from -> to` would close a cycle.
///
/// Walks outgoing edges depth-first from `to` over the persisted graph
/// (every link type). Reaching `from` means `to` already leads back to it.
/// The visited set bounds the walk even if the stored graph is cyclic.
pub(crate) fn would_create_cycle(
    conn: &Connection,
    from_task_id: TaskId,
    to_task_id: TaskId,
) -> TrackerResult<bool> {
    let mut stack: Vec<TaskId> = vec![to_task_id];
    let mut visited: HashSet<TaskId> = HashSet::new();

    while let Some(current) = stack.pop() {
        if current == from_task_id {
            return Ok(true);
        }
        if !visited.insert(current) {
            continue;
        }
        for next in db::links::outgoing_targets(conn, current)? {
            if !visited.contains(&next) {
                stack.push(next);
            }
        }
    }

    Ok(false)
}

/// Task and link operations exposed to the shell.
#[derive(Clone)]
pub struct TaskService {
    db: Database,
}

impl TaskService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create a task, auto-creating any tags it names.
    ///
    /// The insert and the tag resolution share one transaction, so a failed
    /// tag leaves no task behind.
    pub fn create(
        &self,
        title: &str,
        description: &str,
        status: &str,
        tag_names: &[&str],
    ) -> TrackerResult<Task> {
        let title = normalize_title(title)?;

        self.db.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let status = validate_status(&tx, status)?;
            let task_id =
                db::tasks::insert_task(&tx, title, description.trim(), status, &db::now())?;
            let tag_ids = resolve_tag_ids(&tx, tag_names)?;
            db::tags::replace_task_tags(&tx, task_id, &tag_ids)?;
            let task = require_task(&tx, task_id)?;

            tx.commit()?;
            info!(task_id, status = %task.status, tags = tag_ids.len(), "Created task");
            Ok(task)
        })
    }

    /// Apply the provided changes.
    ///
    /// `tags: Some(..)` replaces the whole tag set (an empty list clears it);
    /// `tags: None` leaves tags untouched. Any change refreshes `updated_at`.
    pub fn update(&self, task_id: TaskId, changes: TaskUpdate) -> TrackerResult<Task> {
        let title = changes.title.as_deref().map(normalize_title).transpose()?;
        let description = changes.description.as_deref().map(str::trim);

        self.db.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let current = require_task(&tx, task_id)?;
            if changes.is_empty() {
                debug!(task_id, "Update with no changes");
                return Ok(current);
            }

            let status = changes
                .status
                .as_deref()
                .map(|s| validate_status(&tx, s))
                .transpose()?;

            db::tasks::update_task_fields(&tx, task_id, title, description, status, &db::now())?;

            if let Some(names) = &changes.tags {
                let tag_ids = resolve_tag_ids(&tx, names.as_slice())?;
                db::tags::replace_task_tags(&tx, task_id, &tag_ids)?;
            }

            let task = require_task(&tx, task_id)?;
            tx.commit()?;

            info!(task_id, "Updated task");
            Ok(task)
        })
    }

    /// Change only the status of a task.
    pub fn change_status(&self, task_id: TaskId, status: &str) -> TrackerResult<Task> {
        self.update(
            task_id,
            TaskUpdate {
                status: Some(status.to_string()),
                ..Default::default()
            },
        )
    }

    /// Delete a task with its tag associations and links. Absent ids are ignored.
    pub fn delete(&self, task_id: TaskId) -> TrackerResult<()> {
        self.db.with_conn(|conn| {
            let removed = db::tasks::delete_task(conn, task_id)?;
            info!(task_id, removed, "Deleted task");
            Ok(())
        })
    }

    pub fn get(&self, task_id: TaskId) -> TrackerResult<Task> {
        self.db.with_conn(|conn| require_task(conn, task_id))
    }

    /// Tasks matching `filters`, most recently updated first (ties by id).
    pub fn list(&self, filters: &TaskFilters) -> TrackerResult<Vec<Task>> {
        if filters.tag_names.iter().any(|name| name.trim().is_empty()) {
            return Err(TrackerError::invalid_argument(
                "tag",
                "Tag filter names must not be empty",
            ));
        }
        self.db.with_conn(|conn| {
            let tasks = db::tasks::list_tasks(conn, filters)?;
            debug!(count = tasks.len(), "Listed tasks");
            Ok(tasks)
        })
    }

    /// Create a typed link `from -> to`.
    ///
    /// Checks run in order: self-link, existence of both tasks, cycle, then
    /// duplicate. The cycle check and the insert share one immediate
    /// transaction under the connection lock.
    pub fn link(&self, from_task_id: TaskId, to_task_id: TaskId, link_type: &str) -> TrackerResult<TaskLink> {
        if from_task_id == to_task_id {
            return Err(TrackerError::self_link(from_task_id));
        }
        let link_type = link_type.trim();
        if link_type.is_empty() {
            return Err(TrackerError::invalid_argument(
                "type",
                "Link type must not be empty",
            ));
        }

        self.db.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            ensure_tasks_exist(&tx, &[from_task_id, to_task_id])?;

            if would_create_cycle(&tx, from_task_id, to_task_id)? {
                warn!(from_task_id, to_task_id, "Rejected link: would create a cycle");
                return Err(TrackerError::cycle_detected(from_task_id, to_task_id));
            }

            let link = match db::links::insert_link(&tx, from_task_id, to_task_id, link_type) {
                Ok(link) => link,
                Err(e) if is_constraint_violation(&e) => {
                    return Err(TrackerError::duplicate_link(from_task_id, to_task_id, link_type));
                }
                Err(e) => return Err(e.into()),
            };

            tx.commit()?;
            info!(link_id = link.id, from_task_id, to_task_id, link_type, "Linked tasks");
            Ok(link)
        })
    }

    /// Remove a typed link. Removing an absent link is not an error.
    pub fn unlink(&self, from_task_id: TaskId, to_task_id: TaskId, link_type: &str) -> TrackerResult<()> {
        let link_type = link_type.trim();
        self.db.with_conn(|conn| {
            let removed = db::links::delete_link(conn, from_task_id, to_task_id, link_type)?;
            info!(from_task_id, to_task_id, link_type, removed, "Unlinked tasks");
            Ok(())
        })
    }

    /// Every link, ordered by id.
    pub fn list_links(&self) -> TrackerResult<Vec<TaskLink>> {
        self.db.with_conn(|conn| Ok(db::links::list_links(conn)?))
    }

    /// Known statuses in board order.
    pub fn statuses(&self) -> TrackerResult<Vec<Status>> {
        self.db.with_conn(|conn| Ok(db::statuses::list_statuses(conn)?))
    }
}
