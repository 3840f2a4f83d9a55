//! Integration tests for composed task filters and list ordering.

use rusqlite::params;
use task_tracker::db::{self, Database};
use task_tracker::error::ErrorCode;
use task_tracker::service::TaskService;
use task_tracker::types::{Status, TaskFilters, TaskId};

struct Fixture {
    db: Database,
    tasks: TaskService,
}

impl Fixture {
    fn new() -> Self {
        let db = Database::open_in_memory().expect("Failed to create in-memory database");
        let tasks = TaskService::new(db.clone());
        Self { db, tasks }
    }

    /// Create a task and pin both timestamps.
    fn add(&self, title: &str, status: &str, tags: &[&str], created: &str, updated: &str) -> TaskId {
        let id = self.tasks.create(title, "", status, tags).unwrap().id;
        self.db
            .with_conn(|conn| {
                conn.execute(
                    "UPDATE tasks SET created_at = ?1, updated_at = ?2 WHERE id = ?3",
                    params![created, updated, id],
                )?;
                Ok(())
            })
            .unwrap();
        id
    }

    fn ids(&self, filters: &TaskFilters) -> Vec<TaskId> {
        self.tasks
            .list(filters)
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect()
    }
}

fn bound(value: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    Some(TaskFilters::parse_bound("test", value).unwrap())
}

/// Four tasks spread over statuses, tags and dates.
fn seeded() -> (Fixture, [TaskId; 4]) {
    let f = Fixture::new();
    let a = f.add("A", "TODO", &["api", "backend"], "2024-01-01T09:00:00", "2024-01-05T09:00:00");
    let b = f.add("B", "IN_PROGRESS", &["api"], "2024-01-02T09:00:00", "2024-01-04T09:00:00");
    let c = f.add("C", "DONE", &["backend"], "2024-01-03T09:00:00", "2024-01-06T09:00:00");
    let d = f.add("D", "TODO", &[], "2024-01-04T09:00:00", "2024-01-04T09:00:00");
    (f, [a, b, c, d])
}

#[test]
fn empty_filter_lists_everything_most_recent_first() {
    let (f, [a, b, c, d]) = seeded();

    // b and d share updated_at; ascending id breaks the tie.
    assert_eq!(f.ids(&TaskFilters::new()), vec![c, a, b, d]);
}

#[test]
fn statuses_are_or_combined() {
    let (f, [a, _, c, d]) = seeded();

    let filters = TaskFilters::new().with_status(Status::Todo).with_status(Status::Done);

    assert_eq!(f.ids(&filters), vec![c, a, d]);
}

#[test]
fn tags_are_and_combined() {
    let (f, [a, b, _, _]) = seeded();

    assert_eq!(f.ids(&TaskFilters::new().with_tag("api")), vec![a, b]);
    assert_eq!(f.ids(&TaskFilters::new().with_tag("api").with_tag("backend")), vec![a]);
}

#[test]
fn repeated_and_padded_tag_names_do_not_change_the_result() {
    let (f, [a, _, _, _]) = seeded();

    let filters = TaskFilters::new()
        .with_tag("api")
        .with_tag(" api ")
        .with_tag("backend");

    assert_eq!(f.ids(&filters), vec![a]);
}

#[test]
fn unknown_tag_matches_nothing() {
    let (f, _) = seeded();
    assert!(f.ids(&TaskFilters::new().with_tag("nope")).is_empty());
}

#[test]
fn blank_tag_name_is_rejected() {
    let (f, _) = seeded();

    for blank in ["", "   "] {
        let err = f.tasks.list(&TaskFilters::new().with_tag(blank)).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidArgument);
        assert_eq!(err.field.as_deref(), Some("tag"));
    }

    let mixed = TaskFilters::new().with_tag("api").with_tag("  ");
    assert!(f.tasks.list(&mixed).is_err());
}

#[test]
fn blank_tag_name_matches_nothing_in_the_store() {
    let (f, _) = seeded();

    let filters = TaskFilters::new().with_tag("  ");
    let found = f
        .db
        .with_conn(|conn| Ok(db::tasks::list_tasks(conn, &filters)?))
        .unwrap();

    assert!(found.is_empty());
}

#[test]
fn date_bounds_are_inclusive() {
    let (f, [_, b, c, _]) = seeded();

    let filters = TaskFilters {
        created_after: bound("2024-01-02T09:00:00"),
        created_before: bound("2024-01-03T09:00:00"),
        ..Default::default()
    };

    assert_eq!(f.ids(&filters), vec![c, b]);
}

#[test]
fn date_only_bound_means_midnight() {
    let (f, [a, _, c, _]) = seeded();

    let filters = TaskFilters {
        updated_after: bound("2024-01-05"),
        ..Default::default()
    };

    assert_eq!(f.ids(&filters), vec![c, a]);
}

#[test]
fn all_criteria_are_and_combined() {
    let (f, [a, _, _, _]) = seeded();

    let filters = TaskFilters {
        statuses: vec![Status::Todo],
        tag_names: vec!["backend".to_string()],
        updated_before: bound("2024-01-05T09:00:00"),
        ..Default::default()
    };

    assert_eq!(f.ids(&filters), vec![a]);
}

#[test]
fn inverted_range_matches_nothing() {
    let (f, _) = seeded();

    let filters = TaskFilters {
        created_after: bound("2024-02-01"),
        created_before: bound("2024-01-01"),
        ..Default::default()
    };

    assert!(f.ids(&filters).is_empty());
}

#[test]
fn listed_tasks_carry_their_tags() {
    let (f, [a, _, _, _]) = seeded();

    let tasks = f.tasks.list(&TaskFilters::new().with_tag("api").with_tag("backend")).unwrap();

    assert_eq!(tasks[0].id, a);
    assert_eq!(tasks[0].tag_names(), vec!["api", "backend"]);
}
