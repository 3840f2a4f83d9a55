//! Task tracker library
//!
//! Tasks, shared tags and typed links between tasks, persisted in SQLite.
//! The services refuse links that would close a dependency cycle; the
//! renderers turn the stored graph into a status board or a dependency tree.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod format;
pub mod render;
pub mod service;
pub mod types;
