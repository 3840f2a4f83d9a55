//! Status board: one column per status in fixed order.

use crate::types::{Status, Task};
use std::fmt;

/// Placeholder line for a column with no tasks.
pub const EMPTY_COLUMN: &str = "(no tasks)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardColumn<'a> {
    pub status: Status,
    /// Most recently updated first, ties by ascending id.
    pub tasks: Vec<&'a Task>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board<'a> {
    pub columns: Vec<BoardColumn<'a>>,
}

impl Board<'_> {
    pub fn column(&self, status: Status) -> Option<&BoardColumn<'_>> {
        self.columns.iter().find(|c| c.status == status)
    }
}

/// `#<id> <title>`, followed by ` (tag, tag)` when tagged.
fn card_label(task: &Task) -> String {
    if task.tags.is_empty() {
        format!("#{} {}", task.id, task.title)
    } else {
        format!("#{} {} ({})", task.id, task.title, task.tag_names().join(", "))
    }
}

/// Group tasks by status. Every status gets a column, empty or not.
pub fn render_board(tasks: &[Task]) -> Board<'_> {
    let columns = Status::ALL
        .iter()
        .map(|&status| {
            let mut column: Vec<&Task> = tasks.iter().filter(|t| t.status == status).collect();
            column.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(a.id.cmp(&b.id)));
            BoardColumn { status, tasks: column }
        })
        .collect();
    Board { columns }
}

impl fmt::Display for BoardColumn<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== {} ({}) ==", self.status, self.tasks.len())?;
        if self.tasks.is_empty() {
            writeln!(f, "  {}", EMPTY_COLUMN)?;
        }
        for task in &self.tasks {
            writeln!(f, "  {}", card_label(task))?;
        }
        Ok(())
    }
}

impl fmt::Display for Board<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", column)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn task(id: i64, status: Status, age_minutes: i64) -> Task {
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let ts = base - Duration::minutes(age_minutes);
        Task {
            id,
            title: format!("Task {}", id),
            description: String::new(),
            status,
            created_at: ts,
            updated_at: ts,
            tags: Vec::new(),
        }
    }

    #[test]
    fn every_status_has_a_column_in_order() {
        let board = render_board(&[]);
        let statuses: Vec<Status> = board.columns.iter().map(|c| c.status).collect();
        assert_eq!(statuses, Status::ALL.to_vec());
        assert!(board.columns.iter().all(|c| c.tasks.is_empty()));
    }

    #[test]
    fn empty_column_shows_placeholder() {
        let tasks = vec![task(1, Status::Todo, 0)];
        let rendered = render_board(&tasks).to_string();

        assert!(rendered.starts_with("== TODO (1) ==\n  #1 Task 1\n"));
        assert!(rendered.contains("== DONE (0) ==\n  (no tasks)\n"));
    }

    #[test]
    fn cards_are_most_recent_first_with_id_tiebreak() {
        let tasks = vec![
            task(1, Status::InProgress, 30),
            task(2, Status::InProgress, 5),
            task(4, Status::InProgress, 10),
            task(3, Status::InProgress, 10),
        ];

        let board = render_board(&tasks);
        let ids: Vec<i64> = board
            .column(Status::InProgress)
            .unwrap()
            .tasks
            .iter()
            .map(|t| t.id)
            .collect();

        assert_eq!(ids, vec![2, 3, 4, 1]);
    }

    #[test]
    fn each_task_lands_in_exactly_one_column() {
        let tasks = vec![
            task(1, Status::Todo, 0),
            task(2, Status::Blocked, 0),
            task(3, Status::Done, 0),
            task(4, Status::Done, 1),
        ];

        let board = render_board(&tasks);
        let total: usize = board.columns.iter().map(|c| c.tasks.len()).sum();

        assert_eq!(total, tasks.len());
        assert_eq!(board.column(Status::Done).unwrap().tasks.len(), 2);
        assert!(board.column(Status::InProgress).unwrap().tasks.is_empty());
    }
}
