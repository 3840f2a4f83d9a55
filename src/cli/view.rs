//! `view` subcommands: board and dependency graph.

use super::{Context, FilterArgs};
use crate::format::{OutputFormat, paint_status};
use crate::render::graph::GRAPH_TITLE;
use crate::render::{Board, Forest, LineKind, render_board, render_graph};
use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use serde_json::json;

#[derive(Args, Debug)]
pub struct ViewArgs {
    #[command(subcommand)]
    pub command: ViewCommand,
}

#[derive(Subcommand, Debug)]
pub enum ViewCommand {
    /// Tasks grouped into one column per status
    Board(FilterArgs),

    /// Dependency tree of every task
    Graph,
}

fn print_board(board: &Board<'_>) {
    for (i, column) in board.columns.iter().enumerate() {
        if i > 0 {
            println!();
        }
        let text = column.to_string();
        let mut lines = text.lines();
        if let Some(header) = lines.next() {
            println!("{}", paint_status(header, column.status).bold());
        }
        for line in lines {
            if column.tasks.is_empty() {
                println!("{}", line.dimmed());
            } else {
                println!("{}", line);
            }
        }
    }
}

fn print_forest(forest: &Forest) {
    println!("{}", GRAPH_TITLE.bold());
    for line in forest.lines() {
        let text = match line.kind {
            LineKind::Task => line.text.normal(),
            LineKind::Cycle => line.text.yellow(),
            LineKind::Missing => line.text.red(),
        };
        println!("{}{}", line.prefix.dimmed(), text);
    }
}

pub fn run(command: ViewCommand, ctx: &Context) -> Result<()> {
    match command {
        ViewCommand::Board(filters) => {
            let tasks = ctx.services.tasks.list(&filters.to_filters()?)?;
            let board = render_board(&tasks);
            if ctx.format == OutputFormat::Json {
                let columns: Vec<_> = board
                    .columns
                    .iter()
                    .map(|c| json!({ "status": c.status, "tasks": c.tasks }))
                    .collect();
                return ctx.emit(&columns, |_| String::new());
            }
            print_board(&board);
            Ok(())
        }

        ViewCommand::Graph => {
            let tasks = ctx.services.tasks.list(&Default::default())?;
            let links = ctx.services.tasks.list_links()?;
            let forest = render_graph(&tasks, &links);
            if ctx.format == OutputFormat::Json {
                let lines: Vec<_> = forest
                    .lines()
                    .into_iter()
                    .map(|l| format!("{}{}", l.prefix, l.text))
                    .collect();
                return ctx.emit(&json!({ "title": GRAPH_TITLE, "lines": lines }), |_| String::new());
            }
            print_forest(&forest);
            Ok(())
        }
    }
}
