//! CLI command definitions for task-tracker
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands;
//! each command group lives in its own module with a `run` function that
//! calls into the domain services.

pub mod tag;
pub mod task;
pub mod view;

use crate::error::TrackerResult;
use crate::format::{OutputFormat, to_json};
use crate::service::Services;
use crate::types::{Status, TaskFilters};
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use serde_json::json;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::str::FromStr;
use tag::TagArgs;
use task::TaskArgs;
use view::ViewArgs;

/// Track tasks, tags and dependencies between them
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to database file (overrides config)
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create, edit, list and link tasks
    Task(TaskArgs),

    /// Manage tags and their assignment to tasks
    Tag(TagArgs),

    /// Render the status board or the dependency graph
    View(ViewArgs),
}

/// Filters shared by `task list` and `view board`.
#[derive(Args, Debug, Default, Clone)]
pub struct FilterArgs {
    /// Match any of these statuses (repeatable)
    #[arg(short, long = "status", value_name = "STATUS")]
    pub statuses: Vec<String>,

    /// Require all of these tags (repeatable)
    #[arg(short, long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,

    /// Created at or after (YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS, UTC)
    #[arg(long, value_name = "DATE")]
    pub created_after: Option<String>,

    /// Created at or before
    #[arg(long, value_name = "DATE")]
    pub created_before: Option<String>,

    /// Updated at or after
    #[arg(long, value_name = "DATE")]
    pub updated_after: Option<String>,

    /// Updated at or before
    #[arg(long, value_name = "DATE")]
    pub updated_before: Option<String>,
}

impl FilterArgs {
    pub fn to_filters(&self) -> TrackerResult<TaskFilters> {
        let bound = |field: &str, value: &Option<String>| {
            value
                .as_deref()
                .map(|v| TaskFilters::parse_bound(field, v))
                .transpose()
        };

        Ok(TaskFilters {
            statuses: self
                .statuses
                .iter()
                .map(|s| Status::from_str(s))
                .collect::<TrackerResult<Vec<_>>>()?,
            tag_names: self.tags.clone(),
            created_after: bound("created_after", &self.created_after)?,
            created_before: bound("created_before", &self.created_before)?,
            updated_after: bound("updated_after", &self.updated_after)?,
            updated_before: bound("updated_before", &self.updated_before)?,
        })
    }
}

/// Everything a command needs to run.
pub struct Context {
    pub services: Services,
    pub format: OutputFormat,
}

impl Context {
    pub fn new(services: Services, format: OutputFormat) -> Self {
        Self { services, format }
    }

    /// Print `value` as JSON, or the text produced by `text` otherwise.
    pub fn emit<T, F>(&self, value: &T, text: F) -> Result<()>
    where
        T: Serialize + ?Sized,
        F: FnOnce(&T) -> String,
    {
        self.emit_to(&mut io::stdout().lock(), value, text)
    }

    pub fn emit_to<W, T, F>(&self, out: &mut W, value: &T, text: F) -> Result<()>
    where
        W: Write,
        T: Serialize + ?Sized,
        F: FnOnce(&T) -> String,
    {
        match self.format {
            OutputFormat::Json => writeln!(out, "{}", to_json(value)?)?,
            OutputFormat::Text => write!(out, "{}", text(value))?,
        }
        Ok(())
    }

    /// Report a declined confirmation.
    pub fn aborted(&self) -> Result<()> {
        self.aborted_to(&mut io::stdout().lock())
    }

    fn aborted_to<W: Write>(&self, out: &mut W) -> Result<()> {
        self.emit_to(out, &json!({ "aborted": true }), |_| "Aborted.\n".to_string())
    }

    /// Print a confirmation line in text mode.
    pub fn success(&self, message: impl AsRef<str>) {
        if self.format == OutputFormat::Text {
            println!("{}", message.as_ref().green());
        }
    }
}

/// Dispatch a parsed command.
pub fn run(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Task(args) => task::run(args.command, ctx),
        Command::Tag(args) => tag::run(args.command, ctx),
        Command::View(args) => view::run(args.command, ctx),
    }
}

/// Read a yes/no answer from `input`. Only `y`/`yes` confirm.
pub fn confirm_with<R: BufRead, W: Write>(prompt: &str, input: &mut R, output: &mut W) -> io::Result<bool> {
    write!(output, "{} [y/N] ", prompt)?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

/// Ask on stdin unless `assume_yes` is set. The prompt goes to stderr so
/// that stdout stays machine-readable under `--json`.
pub fn confirm(prompt: &str, assume_yes: bool) -> io::Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    confirm_with(prompt, &mut io::stdin().lock(), &mut io::stderr())
}
