//! Configuration loading and management.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Project-local config file, looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "task-tracker.yaml";

pub const ENV_DB_PATH: &str = "TASK_TRACKER_DB_PATH";
pub const ENV_COLOR: &str = "TASK_TRACKER_COLOR";

/// Tracker configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("task_manager.db")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Colorize terminal output.
    #[serde(default = "default_color")]
    pub color: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            color: default_color(),
        }
    }
}

fn default_color() -> bool {
    true
}

/// `~/.task-tracker/config.yaml`, if a home directory is known.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".task-tracker").join("config.yaml"))
}

/// Interpret an environment flag. Unrecognized values yield `None`.
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Config {
    /// Load configuration from file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Resolve configuration for a run.
    ///
    /// An explicit file must load. Otherwise the first existing file among
    /// `./task-tracker.yaml` and the user config is used, falling back to
    /// defaults. Environment overrides apply last.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load(path)?,
            None => Self::load_first_existing()?,
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn load_first_existing() -> Result<Self> {
        let candidates = std::iter::once(PathBuf::from(LOCAL_CONFIG_FILE)).chain(user_config_path());
        for candidate in candidates {
            if candidate.is_file() {
                return Self::load(&candidate);
            }
        }
        Ok(Self::default())
    }

    /// Apply `TASK_TRACKER_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_DB_PATH).filter(|p| !p.trim().is_empty()) {
            self.database.path = PathBuf::from(path);
        }
        if let Some(color) = lookup(ENV_COLOR).as_deref().and_then(parse_flag) {
            self.display.color = color;
        }
    }
}
