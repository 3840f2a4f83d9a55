//! Text views over tasks and links.
//!
//! Both renderers are pure: they borrow their inputs, never touch the
//! database, and produce the same output for the same input.

pub mod board;
pub mod graph;

pub use board::{Board, BoardColumn, render_board};
pub use graph::{Forest, LineKind, TreeLine, TreeNode, render_graph};

use crate::types::Task;

/// `#<id> <title> [<STATUS>]`, followed by ` (tag, tag)` when tagged.
pub fn task_label(task: &Task) -> String {
    let mut label = format!("#{} {} [{}]", task.id, task.title, task.status);
    if !task.tags.is_empty() {
        label.push_str(&format!(" ({})", task.tag_names().join(", ")));
    }
    label
}
