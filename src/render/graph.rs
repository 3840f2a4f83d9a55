//! Dependency forest built from tasks and links.
//!
//! A link `from -> to` makes `to` a child of `from`. Roots are tasks with
//! no parent inside the task set; when every task has one, every task is a
//! root. Expansion carries the current ancestor path rather than a global
//! visited set, so a shared dependency shows up under each of its parents,
//! while a child already on its own path becomes a cycle marker. Children
//! outside the task set become missing-task markers. Tasks no branch
//! reached are listed flat after the roots.

use super::task_label;
use crate::types::{Task, TaskId, TaskLink};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

pub const GRAPH_TITLE: &str = "Task Dependencies";

/// What a node in the forest stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Task,
    /// The child is already an ancestor on this branch.
    Cycle,
    /// The child id has no task in the supplied set.
    Missing,
}

/// A node of the forest. Children are indices into the owning [`Forest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub task_id: TaskId,
    pub kind: LineKind,
    pub label: String,
    pub children: Vec<usize>,
}

/// One printed line: box-drawing prefix, node kind and text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeLine {
    pub prefix: String,
    pub kind: LineKind,
    pub text: String,
}

/// Rendered dependency forest.
///
/// Nodes live in one flat arena and refer to their children by index, so
/// building, walking and dropping the forest never recurse, however deep a
/// dependency chain runs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Forest {
    nodes: Vec<TreeNode>,
    /// Expanded trees, one per root, in ascending id order.
    roots: Vec<usize>,
    /// Tasks no branch reached, in ascending id order.
    detached: Vec<usize>,
}

impl Forest {
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty() && self.detached.is_empty()
    }

    /// Total number of nodes, markers included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn roots(&self) -> impl Iterator<Item = &TreeNode> {
        self.roots.iter().map(|&i| &self.nodes[i])
    }

    pub fn detached(&self) -> impl Iterator<Item = &TreeNode> {
        self.detached.iter().map(|&i| &self.nodes[i])
    }

    pub fn children<'a>(&'a self, node: &'a TreeNode) -> impl Iterator<Item = &'a TreeNode> {
        node.children.iter().map(|&i| &self.nodes[i])
    }

    fn push(&mut self, task_id: TaskId, kind: LineKind, label: String) -> usize {
        self.nodes.push(TreeNode {
            task_id,
            kind,
            label,
            children: Vec::new(),
        });
        self.nodes.len() - 1
    }

    /// Flatten the forest into printable lines, depth-first.
    pub fn lines(&self) -> Vec<TreeLine> {
        let mut lines = Vec::with_capacity(self.nodes.len());
        let top: Vec<usize> = self.roots.iter().chain(&self.detached).copied().collect();

        // (node, indent inherited from the parent, last among its siblings)
        let mut stack: Vec<(usize, String, bool)> = Vec::new();
        let count = top.len();
        for (i, &index) in top.iter().enumerate().rev() {
            stack.push((index, String::new(), i + 1 == count));
        }

        while let Some((index, indent, last)) = stack.pop() {
            let node = &self.nodes[index];
            let connector = if last { "└── " } else { "├── " };
            lines.push(TreeLine {
                prefix: format!("{}{}", indent, connector),
                kind: node.kind,
                text: node.label.clone(),
            });

            let child_indent = format!("{}{}", indent, if last { "    " } else { "│   " });
            let count = node.children.len();
            for (i, &child) in node.children.iter().enumerate().rev() {
                stack.push((child, child_indent.clone(), i + 1 == count));
            }
        }

        lines
    }
}

impl fmt::Display for Forest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", GRAPH_TITLE)?;
        for line in self.lines() {
            writeln!(f, "{}{}", line.prefix, line.text)?;
        }
        Ok(())
    }
}

fn label(tasks: &BTreeMap<TaskId, &Task>, task_id: TaskId) -> String {
    tasks
        .get(&task_id)
        .map(|task| task_label(task))
        .unwrap_or_else(|| format!("#{}", task_id))
}

/// Build the dependency forest. Inputs are only read.
///
/// Links whose source is not in `tasks` cannot be reached from any task and
/// are ignored; links to targets not in `tasks` produce missing markers.
pub fn render_graph(tasks: &[Task], links: &[TaskLink]) -> Forest {
    let task_map: BTreeMap<TaskId, &Task> = tasks.iter().map(|t| (t.id, t)).collect();

    let mut children: BTreeMap<TaskId, Vec<TaskId>> = BTreeMap::new();
    let mut has_parent: HashSet<TaskId> = HashSet::new();
    for link in links {
        if !task_map.contains_key(&link.from_task_id) {
            continue;
        }
        children
            .entry(link.from_task_id)
            .or_default()
            .push(link.to_task_id);
        if task_map.contains_key(&link.to_task_id) {
            has_parent.insert(link.to_task_id);
        }
    }
    for ids in children.values_mut() {
        ids.sort_unstable();
        ids.dedup();
    }

    let mut roots: Vec<TaskId> = task_map
        .keys()
        .copied()
        .filter(|id| !has_parent.contains(id))
        .collect();
    if roots.is_empty() {
        roots = task_map.keys().copied().collect();
    }

    let mut forest = Forest::default();
    let mut touched: HashSet<TaskId> = HashSet::new();

    // Ancestors of the node being expanded, as an ordered path and a set.
    let mut path: Vec<TaskId> = Vec::new();
    let mut on_path: HashSet<TaskId> = HashSet::new();
    // (node index, depth) still waiting for their children.
    let mut pending: Vec<(usize, usize)> = Vec::new();

    for root in roots {
        let index = forest.push(root, LineKind::Task, label(&task_map, root));
        forest.roots.push(index);
        pending.push((index, 0));

        while let Some((index, depth)) = pending.pop() {
            for gone in path.drain(depth..) {
                on_path.remove(&gone);
            }
            let task_id = forest.nodes[index].task_id;
            path.push(task_id);
            on_path.insert(task_id);
            touched.insert(task_id);

            let child_ids = children.get(&task_id).map(Vec::as_slice).unwrap_or_default();
            let mut expand: Vec<usize> = Vec::new();
            for &child_id in child_ids {
                let child = if on_path.contains(&child_id) {
                    forest.push(child_id, LineKind::Cycle, format!("cycle back to #{}", child_id))
                } else if !task_map.contains_key(&child_id) {
                    forest.push(child_id, LineKind::Missing, format!("missing task #{}", child_id))
                } else {
                    let child = forest.push(child_id, LineKind::Task, label(&task_map, child_id));
                    expand.push(child);
                    child
                };
                forest.nodes[index].children.push(child);
            }
            // Reversed so the lowest id is expanded first.
            for &child in expand.iter().rev() {
                pending.push((child, depth + 1));
            }
        }
    }

    let detached: Vec<TaskId> = task_map
        .keys()
        .copied()
        .filter(|id| !touched.contains(id))
        .collect();
    for task_id in detached {
        let index = forest.push(task_id, LineKind::Task, label(&task_map, task_id));
        forest.detached.push(index);
    }

    forest
}
