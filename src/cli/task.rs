//! `task` subcommands.

use super::{Context, FilterArgs, confirm};
use crate::format::{format_task_detail, format_task_table};
use crate::types::{DEFAULT_LINK_TYPE, Task, TaskId, TaskUpdate};
use anyhow::Result;
use clap::{Args, Subcommand};
use serde_json::json;

#[derive(Args, Debug)]
pub struct TaskArgs {
    #[command(subcommand)]
    pub command: TaskCommand,
}

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    /// Create a task
    Add {
        title: String,

        #[arg(short, long, default_value = "")]
        description: String,

        #[arg(short, long, default_value = "TODO")]
        status: String,

        /// Tag to attach, created if missing (repeatable)
        #[arg(short, long = "tag", value_name = "TAG")]
        tags: Vec<String>,
    },

    /// Change fields of a task
    Update {
        id: TaskId,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(short, long)]
        status: Option<String>,

        /// Replace the task's tags with these (repeatable)
        #[arg(short, long = "tag", value_name = "TAG", conflicts_with = "clear_tags")]
        tags: Vec<String>,

        /// Remove every tag from the task
        #[arg(long)]
        clear_tags: bool,
    },

    /// Change only the status of a task
    Status { id: TaskId, status: String },

    /// Show one task with its links
    Show { id: TaskId },

    /// Delete a task with its tags and links
    Delete {
        id: TaskId,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// List tasks, most recently updated first
    List(FilterArgs),

    /// Link two tasks: FROM depends on TO
    Link {
        from: TaskId,
        to: TaskId,

        #[arg(long = "type", default_value = DEFAULT_LINK_TYPE)]
        link_type: String,
    },

    /// Remove a link between two tasks
    Unlink {
        from: TaskId,
        to: TaskId,

        #[arg(long = "type", default_value = DEFAULT_LINK_TYPE)]
        link_type: String,
    },
}

fn show(ctx: &Context, task: &Task) -> Result<()> {
    let links = ctx.services.tasks.list_links()?;
    ctx.emit(task, |t| format_task_detail(t, &links))
}

pub fn run(command: TaskCommand, ctx: &Context) -> Result<()> {
    let tasks = &ctx.services.tasks;

    match command {
        TaskCommand::Add {
            title,
            description,
            status,
            tags,
        } => {
            let tag_names: Vec<&str> = tags.iter().map(String::as_str).collect();
            let task = tasks.create(&title, &description, &status, &tag_names)?;
            ctx.success(format!("Created task #{}", task.id));
            show(ctx, &task)
        }

        TaskCommand::Update {
            id,
            title,
            description,
            status,
            tags,
            clear_tags,
        } => {
            let tags = if clear_tags {
                Some(Vec::new())
            } else if tags.is_empty() {
                None
            } else {
                Some(tags)
            };
            let task = tasks.update(
                id,
                TaskUpdate {
                    title,
                    description,
                    status,
                    tags,
                },
            )?;
            ctx.success(format!("Updated task #{}", task.id));
            show(ctx, &task)
        }

        TaskCommand::Status { id, status } => {
            let task = tasks.change_status(id, &status)?;
            ctx.success(format!("Task #{} is now {}", task.id, task.status));
            ctx.emit(&task, |_| String::new())
        }

        TaskCommand::Show { id } => {
            let task = tasks.get(id)?;
            show(ctx, &task)
        }

        TaskCommand::Delete { id, yes } => {
            let task = tasks.get(id)?;
            if !confirm(&format!("Delete task #{} '{}'?", task.id, task.title), yes)? {
                return ctx.aborted();
            }
            tasks.delete(id)?;
            ctx.success(format!("Deleted task #{}", id));
            ctx.emit(&json!({ "deleted": id }), |_| String::new())
        }

        TaskCommand::List(filters) => {
            let found = tasks.list(&filters.to_filters()?)?;
            ctx.emit(found.as_slice(), format_task_table)
        }

        TaskCommand::Link {
            from,
            to,
            link_type,
        } => {
            let link = tasks.link(from, to, &link_type)?;
            ctx.success(format!(
                "Linked #{} -> #{} ({})",
                link.from_task_id, link.to_task_id, link.link_type
            ));
            ctx.emit(&link, |_| String::new())
        }

        TaskCommand::Unlink {
            from,
            to,
            link_type,
        } => {
            tasks.unlink(from, to, &link_type)?;
            ctx.success(format!("Unlinked #{} -> #{} ({})", from, to, link_type));
            ctx.emit(
                &json!({ "from_task_id": from, "to_task_id": to, "type": link_type }),
                |_| String::new(),
            )
        }
    }
}
