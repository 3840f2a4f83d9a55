//! Structured error types for tracker operations.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors
    InvalidArgument,
    InvalidStatus,

    // Not found errors
    NotFound,

    // Conflict errors
    DuplicateName,
    DuplicateLink,
    SelfLink,
    CycleDetected,

    // Storage errors
    DatabaseError,
}

/// Structured error returned by every service operation.
#[derive(Debug, Error, Serialize)]
#[error("{message}")]
pub struct TrackerError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl TrackerError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    // Convenience constructors

    pub fn invalid_argument(field: &str, reason: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidArgument, reason).with_field(field)
    }

    pub fn invalid_status(value: &str, valid: &[&str]) -> Self {
        Self::new(
            ErrorCode::InvalidStatus,
            format!(
                "Invalid status '{}'. Valid statuses: {}",
                value,
                valid.join(", ")
            ),
        )
        .with_field("status")
    }

    pub fn task_not_found(task_id: i64) -> Self {
        Self::new(ErrorCode::NotFound, format!("Task {} not found", task_id))
    }

    pub fn tasks_not_found(task_ids: &[i64]) -> Self {
        let ids: Vec<String> = task_ids.iter().map(|id| id.to_string()).collect();
        Self::new(
            ErrorCode::NotFound,
            format!("Unknown task(s): {}", ids.join(", ")),
        )
    }

    pub fn tag_not_found(tag_id: i64) -> Self {
        Self::new(ErrorCode::NotFound, format!("Tag {} not found", tag_id))
    }

    pub fn unknown_tag(name: &str) -> Self {
        Self::new(ErrorCode::NotFound, format!("Unknown tag '{}'", name)).with_field("tag")
    }

    pub fn duplicate_name(name: &str) -> Self {
        Self::new(
            ErrorCode::DuplicateName,
            format!("Tag '{}' already exists", name),
        )
        .with_field("name")
    }

    pub fn duplicate_link(from_task_id: i64, to_task_id: i64, link_type: &str) -> Self {
        Self::new(
            ErrorCode::DuplicateLink,
            format!(
                "Link {} -> {} ({}) already exists",
                from_task_id, to_task_id, link_type
            ),
        )
    }

    pub fn self_link(task_id: i64) -> Self {
        Self::new(
            ErrorCode::SelfLink,
            format!("Cannot link task {} to itself", task_id),
        )
    }

    pub fn cycle_detected(from_task_id: i64, to_task_id: i64) -> Self {
        Self::new(
            ErrorCode::CycleDetected,
            format!(
                "Linking {} -> {} would create a circular dependency",
                from_task_id, to_task_id
            ),
        )
    }

    pub fn database(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::DatabaseError, err.to_string())
    }

    /// Whether this error names a domain condition rather than a storage failure.
    pub fn is_domain(&self) -> bool {
        self.code != ErrorCode::DatabaseError
    }
}

impl From<rusqlite::Error> for TrackerError {
    fn from(err: rusqlite::Error) -> Self {
        TrackerError::database(err)
    }
}

/// Result type for tracker operations.
pub type TrackerResult<T> = std::result::Result<T, TrackerError>;
