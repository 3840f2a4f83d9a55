//! Integration tests for typed links and cycle prevention.

use std::thread;
use task_tracker::db::Database;
use task_tracker::error::ErrorCode;
use task_tracker::service::TaskService;
use task_tracker::types::TaskId;

fn setup() -> TaskService {
    TaskService::new(Database::open_in_memory().expect("Failed to create in-memory database"))
}

fn add(tasks: &TaskService, title: &str) -> TaskId {
    tasks.create(title, "", "TODO", &[]).unwrap().id
}

#[test]
fn chain_then_back_edge_is_rejected() {
    let tasks = setup();
    let (a, b, c) = (add(&tasks, "1"), add(&tasks, "2"), add(&tasks, "3"));

    tasks.link(a, b, "dependency").unwrap();
    tasks.link(b, c, "dependency").unwrap();
    let err = tasks.link(c, a, "dependency").unwrap_err();

    assert_eq!(err.code, ErrorCode::CycleDetected);
    let links: Vec<(TaskId, TaskId)> = tasks
        .list_links()
        .unwrap()
        .into_iter()
        .map(|l| (l.from_task_id, l.to_task_id))
        .collect();
    assert_eq!(links, vec![(a, b), (b, c)]);
}

#[test]
fn removing_a_middle_edge_allows_the_back_edge() {
    let tasks = setup();
    let (a, b, c) = (add(&tasks, "A"), add(&tasks, "B"), add(&tasks, "C"));
    tasks.link(a, b, "dependency").unwrap();
    tasks.link(b, c, "dependency").unwrap();
    assert!(tasks.link(c, a, "dependency").is_err());

    tasks.unlink(b, c, "dependency").unwrap();

    let link = tasks.link(c, a, "dependency").unwrap();
    assert_eq!((link.from_task_id, link.to_task_id), (c, a));
}

#[test]
fn cycle_check_spans_link_types() {
    let tasks = setup();
    let (a, b) = (add(&tasks, "A"), add(&tasks, "B"));

    tasks.link(a, b, "relates").unwrap();
    let err = tasks.link(b, a, "dependency").unwrap_err();

    assert_eq!(err.code, ErrorCode::CycleDetected);
}

#[test]
fn diamond_is_allowed() {
    let tasks = setup();
    let ids: Vec<TaskId> = ["top", "left", "right", "bottom"]
        .iter()
        .map(|t| add(&tasks, t))
        .collect();

    tasks.link(ids[0], ids[1], "dependency").unwrap();
    tasks.link(ids[0], ids[2], "dependency").unwrap();
    tasks.link(ids[1], ids[3], "dependency").unwrap();
    tasks.link(ids[2], ids[3], "dependency").unwrap();

    assert_eq!(tasks.list_links().unwrap().len(), 4);
}

#[test]
fn self_link_is_rejected_before_lookup() {
    let tasks = setup();

    let err = tasks.link(5, 5, "dependency").unwrap_err();

    assert_eq!(err.code, ErrorCode::SelfLink);
}

#[test]
fn missing_endpoints_are_named() {
    let tasks = setup();
    let a = add(&tasks, "A");

    let err = tasks.link(40, 41, "dependency").unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
    assert_eq!(err.message, "Unknown task(s): 40, 41");

    let err = tasks.link(a, 41, "dependency").unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
    assert_eq!(err.message, "Unknown task(s): 41");
}

#[test]
fn duplicate_triple_is_rejected_but_other_types_are_not() {
    let tasks = setup();
    let (a, b) = (add(&tasks, "A"), add(&tasks, "B"));

    tasks.link(a, b, "dependency").unwrap();
    let err = tasks.link(a, b, "dependency").unwrap_err();
    assert_eq!(err.code, ErrorCode::DuplicateLink);

    let other = tasks.link(a, b, "relates").unwrap();
    assert_eq!(other.link_type, "relates");
}

#[test]
fn blank_link_type_is_invalid() {
    let tasks = setup();
    let (a, b) = (add(&tasks, "A"), add(&tasks, "B"));

    let err = tasks.link(a, b, "  ").unwrap_err();

    assert_eq!(err.code, ErrorCode::InvalidArgument);
}

#[test]
fn unlink_is_idempotent_and_type_scoped() {
    let tasks = setup();
    let (a, b) = (add(&tasks, "A"), add(&tasks, "B"));
    tasks.link(a, b, "dependency").unwrap();
    tasks.link(a, b, "relates").unwrap();

    tasks.unlink(a, b, "dependency").unwrap();
    tasks.unlink(a, b, "dependency").unwrap();

    let remaining = tasks.list_links().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].link_type, "relates");
}

#[test]
fn unlink_reopens_the_reverse_direction() {
    let tasks = setup();
    let (a, b) = (add(&tasks, "A"), add(&tasks, "B"));
    tasks.link(a, b, "dependency").unwrap();

    tasks.unlink(a, b, "dependency").unwrap();

    tasks.link(b, a, "dependency").unwrap();
}

#[test]
fn concurrent_opposite_links_never_both_succeed() {
    for _ in 0..20 {
        let tasks = setup();
        let (a, b) = (add(&tasks, "A"), add(&tasks, "B"));

        let forward = {
            let tasks = tasks.clone();
            thread::spawn(move || tasks.link(a, b, "dependency"))
        };
        let backward = {
            let tasks = tasks.clone();
            thread::spawn(move || tasks.link(b, a, "dependency"))
        };

        let results = [forward.join().unwrap(), backward.join().unwrap()];
        let succeeded = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(succeeded, 1);
        assert_eq!(tasks.list_links().unwrap().len(), 1);
    }
}
