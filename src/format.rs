//! Output formatting utilities for tables and JSON.
//!
//! Cells are padded before they are colored so ANSI escapes never skew
//! column widths. Whether color is emitted at all is decided globally
//! through `colored::control`.

use crate::db::format_timestamp;
use crate::types::{Status, Tag, Task, TaskLink};
use colored::{ColoredString, Colorize};
use serde::Serialize;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Text }
    }
}

/// Serialize any result as pretty JSON.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}

/// Status text colored by board position.
pub fn paint_status(text: &str, status: Status) -> ColoredString {
    match status {
        Status::Todo => text.normal(),
        Status::InProgress => text.yellow(),
        Status::Blocked => text.red(),
        Status::Done => text.green(),
    }
}

struct Column {
    header: &'static str,
    width: usize,
}

fn display_width(text: &str) -> usize {
    text.chars().count()
}

fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(display_width(text));
    format!("{}{}", text, " ".repeat(fill))
}

/// Render rows under bold headers; the last column is not padded.
/// `paint` may recolor a padded cell given its row and column index.
fn render_table<F>(headers: &[&'static str], rows: &[Vec<String>], paint: F) -> String
where
    F: Fn(usize, usize, String) -> ColoredString,
{
    let mut columns: Vec<Column> = headers
        .iter()
        .map(|&header| Column {
            header,
            width: display_width(header),
        })
        .collect();
    for row in rows {
        for (column, cell) in columns.iter_mut().zip(row) {
            column.width = column.width.max(display_width(cell));
        }
    }

    let last = columns.len().saturating_sub(1);
    let mut out = String::new();

    let header_cells: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let text = if i == last { c.header.to_string() } else { pad(c.header, c.width) };
            text.bold().to_string()
        })
        .collect();
    out.push_str(header_cells.join("  ").trim_end());
    out.push('\n');

    for (r, row) in rows.iter().enumerate() {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let text = if i == last { cell.clone() } else { pad(cell, columns[i].width) };
                paint(r, i, text).to_string()
            })
            .collect();
        out.push_str(cells.join("  ").trim_end());
        out.push('\n');
    }

    out
}

/// Aligned task table, one row per task in the given order.
pub fn format_task_table(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return "No tasks found.\n".to_string();
    }

    let rows: Vec<Vec<String>> = tasks
        .iter()
        .map(|task| {
            vec![
                task.id.to_string(),
                task.status.to_string(),
                task.title.clone(),
                task.tag_names().join(", "),
                format_timestamp(&task.updated_at),
            ]
        })
        .collect();

    render_table(
        &["ID", "STATUS", "TITLE", "TAGS", "UPDATED"],
        &rows,
        |r, i, text| match i {
            1 => paint_status(&text, tasks[r].status),
            0 | 4 => text.dimmed(),
            _ => text.normal(),
        },
    )
}

/// Aligned tag table.
pub fn format_tag_table(tags: &[Tag]) -> String {
    if tags.is_empty() {
        return "No tags found.\n".to_string();
    }

    let rows: Vec<Vec<String>> = tags
        .iter()
        .map(|tag| {
            vec![
                tag.id.to_string(),
                tag.name.clone(),
                tag.color.clone().unwrap_or_default(),
            ]
        })
        .collect();

    render_table(&["ID", "NAME", "COLOR"], &rows, |_, i, text| match i {
        0 => text.dimmed(),
        _ => text.normal(),
    })
}

/// Full view of one task with the links touching it.
pub fn format_task_detail(task: &Task, links: &[TaskLink]) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}\n", format!("#{} {}", task.id, task.title).bold()));
    out.push_str(&format!(
        "  Status:   {}\n",
        paint_status(task.status.as_str(), task.status)
    ));
    if !task.tags.is_empty() {
        out.push_str(&format!("  Tags:     {}\n", task.tag_names().join(", ")));
    }
    out.push_str(&format!("  Created:  {}\n", format_timestamp(&task.created_at)));
    out.push_str(&format!("  Updated:  {}\n", format_timestamp(&task.updated_at)));

    let outgoing: Vec<&TaskLink> = links.iter().filter(|l| l.from_task_id == task.id).collect();
    let incoming: Vec<&TaskLink> = links.iter().filter(|l| l.to_task_id == task.id).collect();
    if !outgoing.is_empty() {
        out.push_str("  Links to:\n");
        for link in outgoing {
            out.push_str(&format!("    #{} ({})\n", link.to_task_id, link.link_type));
        }
    }
    if !incoming.is_empty() {
        out.push_str("  Linked from:\n");
        for link in incoming {
            out.push_str(&format!("    #{} ({})\n", link.from_task_id, link.link_type));
        }
    }

    if !task.description.is_empty() {
        out.push('\n');
        for line in task.description.lines() {
            out.push_str(&format!("  {}\n", line));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn plain() {
        colored::control::set_override(false);
    }

    fn task(id: i64, title: &str, status: Status) -> Task {
        let ts = Utc.with_ymd_and_hms(2024, 3, 9, 8, 30, 0).unwrap();
        Task {
            id,
            title: title.to_string(),
            description: String::new(),
            status,
            created_at: ts,
            updated_at: ts,
            tags: Vec::new(),
        }
    }

    #[test]
    fn task_table_aligns_columns() {
        plain();
        let mut tagged = task(12, "Write docs", Status::InProgress);
        tagged.tags = vec![Tag {
            id: 1,
            name: "docs".to_string(),
            color: None,
        }];
        let tasks = vec![task(3, "Fix", Status::Todo), tagged];

        let table = format_task_table(&tasks);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines[0], "ID  STATUS       TITLE       TAGS  UPDATED");
        assert_eq!(lines[1], "3   TODO         Fix               2024-03-09T08:30:00");
        assert_eq!(lines[2], "12  IN_PROGRESS  Write docs  docs  2024-03-09T08:30:00");
    }

    #[test]
    fn empty_tables_say_so() {
        plain();
        assert_eq!(format_task_table(&[]), "No tasks found.\n");
        assert_eq!(format_tag_table(&[]), "No tags found.\n");
    }

    #[test]
    fn tag_table_leaves_missing_color_blank() {
        plain();
        let tags = vec![Tag {
            id: 1,
            name: "backend".to_string(),
            color: None,
        }];

        let table = format_tag_table(&tags);

        assert_eq!(table, "ID  NAME     COLOR\n1   backend\n");
    }

    #[test]
    fn detail_lists_links_in_both_directions() {
        plain();
        let mut t = task(2, "Middle", Status::Blocked);
        t.description = "first line\nsecond line".to_string();
        let links = vec![
            TaskLink {
                id: 1,
                from_task_id: 1,
                to_task_id: 2,
                link_type: "dependency".to_string(),
            },
            TaskLink {
                id: 2,
                from_task_id: 2,
                to_task_id: 3,
                link_type: "relates".to_string(),
            },
        ];

        let detail = format_task_detail(&t, &links);

        assert!(detail.starts_with("#2 Middle\n  Status:   BLOCKED\n"));
        assert!(detail.contains("  Links to:\n    #3 (relates)\n"));
        assert!(detail.contains("  Linked from:\n    #1 (dependency)\n"));
        assert!(detail.ends_with("\n  first line\n  second line\n"));
    }

    #[test]
    fn json_output_uses_wire_names() {
        let value = to_json(&task(1, "A", Status::InProgress)).unwrap();
        assert!(value.contains("\"status\": \"IN_PROGRESS\""));
    }
}
