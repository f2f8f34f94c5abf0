use kanban::io::snapshot::{decode, encode, load_forest, save_forest, try_load_forest};
use kanban::io::storage::{FileStorage, MemoryStorage, Storage};
use kanban::model::{BoardColor, Forest, Priority};
use kanban::ops::seed::seed_forest;
use kanban::ops::task_ops::{self, TaskUpdate, find_task};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::fs;

const KEY: &str = "kanban-data";

/// A forest touching every field: nesting, dates, tags, content, colours.
fn rich_forest() -> Forest {
    let mut forest = seed_forest();
    let parent = task_ops::add_task(&mut forest, "board-2", "Parent", "").unwrap();
    let child = task_ops::add_subtask(&mut forest, &parent, "Child", "with text").unwrap();
    task_ops::add_subtask(&mut forest, &child, "Grandchild", "").unwrap();
    task_ops::update_task(
        &mut forest,
        &child,
        TaskUpdate::parse("due", "2025-12-31").unwrap(),
    )
    .unwrap();
    task_ops::update_task(&mut forest, &parent, TaskUpdate::Priority(Priority::Low)).unwrap();
    task_ops::add_tag(&mut forest, &parent, "home").unwrap();
    forest.boards[2].color = BoardColor::Teal;
    forest
}

// ============================================================================
// Storage round-trips
// ============================================================================

#[test]
fn round_trip_file_storage() {
    let tmp = tempfile::TempDir::new().unwrap();
    let storage = FileStorage::new(tmp.path());
    let forest = rich_forest();

    save_forest(&storage, KEY, &forest).unwrap();
    let loaded = try_load_forest(&storage, KEY).unwrap().unwrap();
    assert_eq!(loaded, forest);

    // Saving what was loaded reproduces the same file
    let first = fs::read_to_string(storage.path_for(KEY)).unwrap();
    save_forest(&storage, KEY, &loaded).unwrap();
    let second = fs::read_to_string(storage.path_for(KEY)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn round_trip_memory_storage() {
    let storage = MemoryStorage::new();
    let forest = rich_forest();
    save_forest(&storage, KEY, &forest).unwrap();
    assert_eq!(load_forest(&storage, KEY, Forest::default), forest);
}

#[test]
fn round_trip_due_dates_outside_four_digit_years() {
    for value in ["+12345-01-01", "-0001-05-05", "0999-01-01"] {
        let storage = MemoryStorage::new();
        let mut forest = seed_forest();
        task_ops::update_task(
            &mut forest,
            "task-1",
            TaskUpdate::parse("dueDate", value).unwrap(),
        )
        .unwrap();
        assert!(find_task(&forest, "task-1").unwrap().due_date.is_some());

        save_forest(&storage, KEY, &forest).unwrap();
        assert_eq!(load_forest(&storage, KEY, Forest::default), forest, "{}", value);
    }
}

#[test]
fn stored_document_shape() {
    let value = encode(&seed_forest()).unwrap();
    let boards = value.as_array().unwrap();
    assert_eq!(boards.len(), 3);
    assert_eq!(
        boards[0]["tasks"][0],
        json!({
            "id": "task-1",
            "title": "Welcome to your board",
            "description": "Drag tasks between boards, or onto another task to nest them.",
            "dueDate": "",
            "priority": "medium",
            "tags": [],
            "content": [
                {"kind": "bullet", "text": "Add boards and tasks from the toolbar"},
                {"kind": "bullet", "text": "Set due dates and priorities inline"}
            ],
            "subtasks": []
        })
    );
    assert_eq!(boards[1]["color"], "yellow");
    assert_eq!(boards[2]["order"], 2);
}

// ============================================================================
// Lenient decoding of older or foreign documents
// ============================================================================

#[test]
fn decode_old_document_fills_defaults() {
    let old = json!([
        {
            "id": "b1",
            "title": "Inbox",
            "tasks": [
                {"id": "t1", "title": "Bare task"},
                {
                    "id": "t2",
                    "title": "Older fields",
                    "dueDate": "2024-03-05T00:00:00.000Z",
                    "priority": "urgent",
                    "content": [{"type": "numbered", "text": "one"}]
                }
            ]
        },
        {"id": "b2", "title": "Archive", "color": "magenta", "tasks": []}
    ]);

    let forest = decode(old).unwrap();
    assert_eq!(forest.boards[0].order, 0);
    assert_eq!(forest.boards[1].order, 1);
    assert_eq!(forest.boards[1].color, BoardColor::Gray);

    let bare = find_task(&forest, "t1").unwrap();
    assert_eq!(bare.priority, Priority::Medium);
    assert!(bare.due_date.is_none());
    assert!(bare.subtasks.is_empty());

    let older = find_task(&forest, "t2").unwrap();
    assert_eq!(older.due_date.unwrap().to_string(), "2024-03-05");
    assert_eq!(older.priority, Priority::Medium);
    assert_eq!(older.content[0].text, "one");
}

#[test]
fn unreadable_snapshot_falls_back() {
    let tmp = tempfile::TempDir::new().unwrap();
    let storage = FileStorage::new(tmp.path());
    fs::write(storage.path_for(KEY), "{ this is not json").unwrap();

    assert!(try_load_forest(&storage, KEY).is_err());
    assert_eq!(load_forest(&storage, KEY, seed_forest), seed_forest());

    // The unreadable file is kept aside before anything can overwrite it
    let bak = tmp.path().join(format!("{}.json.bak", KEY));
    assert_eq!(fs::read_to_string(bak).unwrap(), "{ this is not json");
}

#[test]
fn wrong_shape_falls_back() {
    let storage = MemoryStorage::new();
    storage.save(KEY, &json!({"boards": "nope"})).unwrap();
    assert_eq!(load_forest(&storage, KEY, Forest::default), Forest::default());
}
