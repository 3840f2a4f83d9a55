//! `tag` subcommands.

use super::{Context, confirm};
use crate::format::{format_tag_table, format_task_detail};
use crate::types::{TagId, TaskId};
use anyhow::Result;
use clap::{Args, Subcommand};
use serde_json::json;

#[derive(Args, Debug)]
pub struct TagArgs {
    #[command(subcommand)]
    pub command: TagCommand,
}

#[derive(Subcommand, Debug)]
pub enum TagCommand {
    /// Create a tag
    Create {
        name: String,

        #[arg(long)]
        color: Option<String>,
    },

    /// Rename or recolor a tag
    Update {
        id: TagId,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        color: Option<String>,
    },

    /// Delete a tag; tasks keep existing without it
    Delete {
        id: TagId,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// List tags by name
    List,

    /// Attach a tag to a task, creating the tag if needed
    Assign { task: TaskId, name: String },

    /// Detach a tag from a task
    Remove { task: TaskId, name: String },
}

pub fn run(command: TagCommand, ctx: &Context) -> Result<()> {
    let tags = &ctx.services.tags;

    match command {
        TagCommand::Create { name, color } => {
            let tag = tags.create(&name, color.as_deref())?;
            ctx.success(format!("Created tag '{}' (#{})", tag.name, tag.id));
            ctx.emit(&tag, |_| String::new())
        }

        TagCommand::Update { id, name, color } => {
            let tag = tags.update(id, name.as_deref(), color.as_deref())?;
            ctx.success(format!("Updated tag #{} '{}'", tag.id, tag.name));
            ctx.emit(&tag, |_| String::new())
        }

        TagCommand::Delete { id, yes } => {
            if !confirm(&format!("Delete tag #{}?", id), yes)? {
                return ctx.aborted();
            }
            tags.delete(id)?;
            ctx.success(format!("Deleted tag #{}", id));
            ctx.emit(&json!({ "deleted": id }), |_| String::new())
        }

        TagCommand::List => {
            let all = tags.list()?;
            ctx.emit(all.as_slice(), format_tag_table)
        }

        TagCommand::Assign { task, name } => {
            let task = tags.assign(task, &name)?;
            ctx.success(format!("Tagged task #{} with '{}'", task.id, name.trim()));
            ctx.emit(&task, |t| format_task_detail(t, &[]))
        }

        TagCommand::Remove { task, name } => {
            let task = tags.unassign(task, &name)?;
            ctx.success(format!("Removed '{}' from task #{}", name.trim(), task.id));
            ctx.emit(&task, |t| format_task_detail(t, &[]))
        }
    }
}
