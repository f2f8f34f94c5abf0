//! End-to-end behaviour of the session: intents, drag gestures and the tree
//! invariants they must preserve.

use kanban::io::storage::MemoryStorage;
use kanban::model::{AppConfig, Forest, Priority, Task};
use kanban::ops::drag::{DragPayload, DragState, DropOutcome, DropTarget};
use kanban::ops::relocate::MoveRequest;
use kanban::ops::OpError;
use kanban::ops::task_ops::{TaskUpdate, find_task, find_task_location};
use kanban::session::{Applied, Intent, Session};
use pretty_assertions::assert_eq;

fn open(storage: &MemoryStorage) -> Session<&MemoryStorage> {
    Session::open(storage, &AppConfig::default())
}

fn created(applied: Option<Applied>) -> String {
    match applied {
        Some(Applied::Created(id)) => id,
        other => panic!("expected a created id, got {:?}", other),
    }
}

/// Build a chain a -> b -> c -> d of nested subtasks under task-1.
fn chain(session: &mut Session<&MemoryStorage>) -> Vec<String> {
    let mut ids = vec!["task-1".to_string()];
    for _ in 0..3 {
        let parent = ids.last().unwrap().clone();
        ids.push(created(session.dispatch(Intent::AddSubtask {
            parent_id: parent,
            title: None,
        })));
    }
    ids
}

fn sorted_ids(forest: &Forest) -> Vec<String> {
    let mut ids: Vec<String> = forest.boards.iter().map(|b| b.id.clone()).collect();
    ids.sort();
    ids
}

fn drag_task_onto(
    session: &mut Session<&MemoryStorage>,
    task_id: &str,
    target_id: &str,
) -> DropOutcome {
    session.begin_task_drag(task_id).unwrap();
    let board_id = find_task_location(session.forest(), target_id)
        .unwrap()
        .board_id;
    session.drop_on(&DropTarget::Task {
        board_id,
        task_id: target_id.to_string(),
    })
}

// ============================================================================
// Board ordering
// ============================================================================

#[test]
fn reorder_keeps_boards_and_renumbers() {
    let storage = MemoryStorage::new();
    let mut session = open(&storage);
    let extra = created(session.dispatch(Intent::AddBoard { title: None }));
    let before = sorted_ids(session.forest());

    for (source, target) in [
        ("board-3", "board-1"),
        (extra.as_str(), "board-2"),
        ("board-1", extra.as_str()),
    ] {
        session
            .dispatch(Intent::Move(MoveRequest::Board {
                source_board_id: source.into(),
                target_board_id: target.into(),
            }))
            .unwrap();
        assert_eq!(sorted_ids(session.forest()), before);
        let orders: Vec<i64> = session
            .forest()
            .sorted_boards()
            .iter()
            .map(|b| b.order)
            .collect();
        assert_eq!(orders, vec![0, 1, 2, 3]);
    }
}

#[test]
fn add_task_then_reorder_boards() {
    let storage = MemoryStorage::new();
    let mut session = open(&storage);
    let id = created(session.dispatch(Intent::AddTask {
        board_id: "board-2".into(),
        title: None,
    }));
    session
        .dispatch(Intent::UpdateTask {
            task_id: id.clone(),
            update: TaskUpdate::Priority(Priority::High),
        })
        .unwrap();
    session
        .dispatch(Intent::Move(MoveRequest::Board {
            source_board_id: "board-2".into(),
            target_board_id: "board-1".into(),
        }))
        .unwrap();

    let forest = session.forest();
    let order_of = |id: &str| forest.board(id).unwrap().order;
    assert_eq!(order_of("board-2"), 0);
    assert_eq!(order_of("board-1"), 1);
    assert_eq!(order_of("board-3"), 2);
    assert_eq!(forest.board("board-2").unwrap().tasks[0].priority, Priority::High);

    // Persisted exactly as held in memory
    assert_eq!(open(&storage).forest(), session.forest());
}

#[test]
fn dropping_board_on_itself_changes_nothing() {
    let storage = MemoryStorage::new();
    let mut session = open(&storage);
    let before = session.forest().clone();
    session.begin_board_drag("board-2").unwrap();
    let outcome = session.drop_on(&DropTarget::Board {
        board_id: "board-2".into(),
    });
    assert_eq!(outcome, DropOutcome::Rejected(OpError::SelfDrop("board-2".into())));
    assert_eq!(session.forest(), &before);
    assert!(storage.get_raw("kanban-data").is_none());
}

// ============================================================================
// Deletion
// ============================================================================

#[test]
fn delete_task_removes_whole_subtree() {
    let storage = MemoryStorage::new();
    let mut session = open(&storage);
    let ids = chain(&mut session);
    let before = session.forest().task_count();

    let size = find_task(session.forest(), &ids[1]).unwrap().subtree_size();
    assert_eq!(size, 3);
    session
        .dispatch(Intent::DeleteTask {
            task_id: ids[1].clone(),
        })
        .unwrap();

    assert_eq!(session.forest().task_count(), before - size);
    for id in &ids[1..] {
        assert!(find_task(session.forest(), id).is_none());
    }
    assert!(find_task(session.forest(), "task-1").unwrap().subtasks.is_empty());
}

#[test]
fn delete_board_removes_nested_tasks() {
    let storage = MemoryStorage::new();
    let mut session = open(&storage);
    let ids = chain(&mut session);
    session
        .dispatch(Intent::DeleteBoard {
            board_id: "board-1".into(),
        })
        .unwrap();
    assert_eq!(session.forest().boards.len(), 2);
    assert_eq!(session.forest().task_count(), 0);
    for id in &ids {
        assert!(find_task(session.forest(), id).is_none());
    }
}

// ============================================================================
// Relocation
// ============================================================================

#[test]
fn relocation_carries_subtree_intact() {
    let storage = MemoryStorage::new();
    let mut session = open(&storage);
    let ids = chain(&mut session);
    let moving: Task = find_task(session.forest(), &ids[1]).unwrap().clone();
    let count = session.forest().task_count();

    session.begin_task_drag(&ids[1]).unwrap();
    let outcome = session.drop_on(&DropTarget::Board {
        board_id: "board-3".into(),
    });
    assert!(matches!(outcome, DropOutcome::Applied(_)));

    let board = session.forest().board("board-3").unwrap();
    assert_eq!(board.tasks, vec![moving]);
    assert_eq!(session.forest().task_count(), count);
    let location = find_task_location(session.forest(), &ids[3]).unwrap();
    assert_eq!(location.board_id, "board-3");
    assert_eq!(location.parent_id.as_deref(), Some(ids[2].as_str()));
}

#[test]
fn drop_into_descendant_rejected_at_every_depth() {
    let storage = MemoryStorage::new();
    let mut session = open(&storage);
    let ids = chain(&mut session);
    let before = session.forest().clone();

    for depth in 1..=3 {
        let outcome = drag_task_onto(&mut session, "task-1", &ids[depth]);
        assert_eq!(
            outcome,
            DropOutcome::Rejected(OpError::WouldCreateCycle {
                task_id: "task-1".into(),
                target_id: ids[depth].clone(),
            }),
            "depth {}",
            depth
        );
        assert_eq!(session.forest(), &before);
        assert_eq!(session.drag_state(), &DragState::Idle);
    }
}

#[test]
fn drop_task_on_itself_is_noop() {
    let storage = MemoryStorage::new();
    let mut session = open(&storage);
    let before = session.forest().clone();
    let outcome = drag_task_onto(&mut session, "task-1", "task-1");
    assert_eq!(outcome, DropOutcome::Rejected(OpError::SelfDrop("task-1".into())));
    assert_eq!(session.forest(), &before);
}

#[test]
fn new_board_with_two_tasks_then_nest() {
    let storage = MemoryStorage::new();
    let mut session = open(&storage);
    let board = created(session.dispatch(Intent::AddBoard { title: None }));
    let t1 = created(session.dispatch(Intent::AddTask {
        board_id: board.clone(),
        title: None,
    }));
    let t2 = created(session.dispatch(Intent::AddTask {
        board_id: board.clone(),
        title: None,
    }));

    let outcome = drag_task_onto(&mut session, &t2, &t1);
    assert_eq!(
        outcome,
        DropOutcome::Applied(MoveRequest::Task {
            task_id: t2.clone(),
            target_board_id: board.clone(),
            target_task_id: Some(t1.clone()),
        })
    );

    let tasks = &session.forest().board(&board).unwrap().tasks;
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, t1);
    assert_eq!(tasks[0].subtasks[0].id, t2);
}

#[test]
fn subtask_promoted_to_another_board() {
    let storage = MemoryStorage::new();
    let mut session = open(&storage);
    let ids = chain(&mut session);

    let payload = DragPayload::for_task(session.forest(), &ids[2]).unwrap();
    let DragPayload::Task(ref info) = payload else {
        panic!("expected a task payload");
    };
    assert!(info.is_subtask);
    assert_eq!(info.parent_task_id.as_deref(), Some(ids[1].as_str()));

    let wire = payload.to_transfer().unwrap();
    let outcome = session.drop_with_transfer(
        &wire,
        &DropTarget::Board {
            board_id: "board-2".into(),
        },
    );
    assert!(matches!(outcome, DropOutcome::Applied(_)));
    let location = find_task_location(session.forest(), &ids[2]).unwrap();
    assert_eq!(location.board_id, "board-2");
    assert_eq!(location.parent_id, None);
    assert!(find_task(session.forest(), &ids[1]).unwrap().subtasks.is_empty());
}

#[test]
fn stale_ids_are_silent_noops() {
    let storage = MemoryStorage::new();
    let mut session = open(&storage);
    let before = session.forest().clone();

    let intents = vec![
        Intent::DeleteBoard {
            board_id: "board-404".into(),
        },
        Intent::AddSubtask {
            parent_id: "task-404".into(),
            title: None,
        },
        Intent::UpdateContentItem {
            task_id: "task-1".into(),
            index: 7,
            text: "x".into(),
        },
        Intent::Move(MoveRequest::Task {
            task_id: "task-404".into(),
            target_board_id: "board-1".into(),
            target_task_id: None,
        }),
    ];
    for intent in intents {
        assert_eq!(session.dispatch(intent), None);
    }
    assert_eq!(session.forest(), &before);
    assert!(storage.get_raw("kanban-data").is_none());
}
