//! End-to-end rendering over tasks and links read back from the store.

use rusqlite::params;
use task_tracker::db::Database;
use task_tracker::render::{LineKind, render_board, render_graph};
use task_tracker::service::Services;
use task_tracker::types::{Status, TaskFilters};

fn setup() -> (Database, Services) {
    let db = Database::open_in_memory().expect("Failed to create in-memory database");
    (db.clone(), Services::new(db))
}

#[test]
fn graph_of_stored_chain_and_loner() {
    let (_db, s) = setup();
    let a = s.tasks.create("Design", "", "DONE", &["arch"]).unwrap().id;
    let b = s.tasks.create("Build", "", "IN_PROGRESS", &[]).unwrap().id;
    let c = s.tasks.create("Ship", "", "TODO", &[]).unwrap().id;
    s.tasks.create("Unrelated", "", "TODO", &[]).unwrap();
    s.tasks.link(c, b, "dependency").unwrap();
    s.tasks.link(b, a, "dependency").unwrap();

    let tasks = s.tasks.list(&TaskFilters::new()).unwrap();
    let links = s.tasks.list_links().unwrap();
    let rendered = render_graph(&tasks, &links).to_string();

    let expected = [
        "Task Dependencies",
        "├── #3 Ship [TODO]",
        "│   └── #2 Build [IN_PROGRESS]",
        "│       └── #1 Design [DONE] (arch)",
        "└── #4 Unrelated [TODO]",
        "",
    ]
    .join("\n");
    assert_eq!(rendered, expected);
}

#[test]
fn graph_of_filtered_tasks_marks_missing_targets() {
    let (_db, s) = setup();
    let a = s.tasks.create("A", "", "TODO", &[]).unwrap().id;
    let b = s.tasks.create("B", "", "DONE", &[]).unwrap().id;
    s.tasks.link(a, b, "dependency").unwrap();

    let todo = s.tasks.list(&TaskFilters::new().with_status(Status::Todo)).unwrap();
    let links = s.tasks.list_links().unwrap();
    let lines = render_graph(&todo, &links).lines();

    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1].kind, LineKind::Missing);
    assert_eq!(lines[1].text, format!("missing task #{}", b));
}

#[test]
fn board_follows_updated_at_from_the_store() {
    let (db, s) = setup();
    let old = s.tasks.create("Old", "", "TODO", &[]).unwrap().id;
    let new = s.tasks.create("New", "", "TODO", &["ui"]).unwrap().id;
    db.with_conn(|conn| {
        conn.execute(
            "UPDATE tasks SET updated_at = ?1 WHERE id = ?2",
            params!["2020-01-01T00:00:00", old],
        )?;
        Ok(())
    })
    .unwrap();

    let tasks = s.tasks.list(&TaskFilters::new()).unwrap();
    let rendered = render_board(&tasks).to_string();

    let new_card = format!("  #{} New (ui)", new);
    let old_card = format!("  #{} Old", old);
    let expected = [
        "== TODO (2) ==",
        new_card.as_str(),
        old_card.as_str(),
        "",
        "== IN_PROGRESS (0) ==",
        "  (no tasks)",
        "",
        "== BLOCKED (0) ==",
        "  (no tasks)",
        "",
        "== DONE (0) ==",
        "  (no tasks)",
        "",
    ]
    .join("\n");
    assert_eq!(rendered, expected);
}
