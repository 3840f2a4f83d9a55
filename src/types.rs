//! Core types for the task tracker.

use crate::error::{TrackerError, TrackerResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type TaskId = i64;
pub type TagId = i64;
pub type LinkId = i64;

/// Link type used when a caller does not name one.
pub const DEFAULT_LINK_TYPE: &str = "dependency";

/// Workflow state of a task.
///
/// The set is closed; each variant carries a fixed position that orders
/// board columns and seeds the `task_statuses` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Todo,
    InProgress,
    Blocked,
    Done,
}

impl Status {
    /// All statuses in board order.
    pub const ALL: [Status; 4] = [
        Status::Todo,
        Status::InProgress,
        Status::Blocked,
        Status::Done,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Todo => "TODO",
            Status::InProgress => "IN_PROGRESS",
            Status::Blocked => "BLOCKED",
            Status::Done => "DONE",
        }
    }

    /// Seeded position, starting at 1.
    pub fn position(&self) -> i64 {
        match self {
            Status::Todo => 1,
            Status::InProgress => 2,
            Status::Blocked => 3,
            Status::Done => 4,
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(Status::as_str).collect()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = TrackerError;

    /// Parse a status name. Matching ignores case and surrounding whitespace
    /// and accepts `-` or a space in place of `_`.
    fn from_str(s: &str) -> TrackerResult<Self> {
        let normalized = s.trim().to_uppercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| TrackerError::invalid_status(s, &Self::names()))
    }
}

/// A shared label attachable to many tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    pub color: Option<String>,
}

/// A trackable unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub status: Status,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Associated tags, sorted by name.
    pub tags: Vec<Tag>,
}

impl Task {
    pub fn tag_names(&self) -> Vec<&str> {
        self.tags.iter().map(|t| t.name.as_str()).collect()
    }
}

/// A directed, typed edge between two tasks (`from` depends on `to`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskLink {
    pub id: LinkId,
    pub from_task_id: TaskId,
    pub to_task_id: TaskId,
    #[serde(rename = "type")]
    pub link_type: String,
}

/// Field changes for a task update. `None` leaves the field untouched.
///
/// `tags: Some(vec![])` clears every tag; `tags: None` keeps them.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl TaskUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.tags.is_none()
    }
}

/// Query descriptor for listing tasks.
///
/// Statuses are OR-combined, tag names are AND-combined (a task must carry
/// all of them), and the timestamp bounds are inclusive. Every non-empty
/// criterion must hold; an empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilters {
    pub statuses: Vec<Status>,
    pub tag_names: Vec<String>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
    pub updated_after: Option<DateTime<Utc>>,
    pub updated_before: Option<DateTime<Utc>>,
}

impl TaskFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.statuses.push(status);
        self
    }

    pub fn with_tag(mut self, name: impl Into<String>) -> Self {
        self.tag_names.push(name.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
            && self.tag_names.is_empty()
            && self.created_after.is_none()
            && self.created_before.is_none()
            && self.updated_after.is_none()
            && self.updated_before.is_none()
    }

    /// Parse a date bound given as `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM:SS` (UTC).
    ///
    /// A bare date means midnight at the start of that day.
    pub fn parse_bound(field: &str, value: &str) -> TrackerResult<DateTime<Utc>> {
        let value = value.trim();
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
            return Ok(dt.and_utc());
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
            return Ok(dt.and_utc());
        }
        if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d")
            && let Some(dt) = date.and_hms_opt(0, 0, 0)
        {
            return Ok(dt.and_utc());
        }
        Err(TrackerError::invalid_argument(
            field,
            format!(
                "Invalid date '{}' for {}: expected YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS",
                value, field
            ),
        ))
    }
}
