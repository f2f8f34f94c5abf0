use crate::model::board::{Board, BoardColor};
use crate::model::forest::Forest;
use crate::model::task::{ContentItem, ContentKind, Task};

/// First-run dataset: three boards, one sample task on the first.
pub fn seed_forest() -> Forest {
    let mut todo = Board::new("board-1".into(), "To Do".into(), BoardColor::Blue, 0);
    let doing = Board::new("board-2".into(), "In Progress".into(), BoardColor::Yellow, 1);
    let done = Board::new("board-3".into(), "Done".into(), BoardColor::Green, 2);

    let mut welcome = Task::new(
        "task-1".into(),
        "Welcome to your board".into(),
        "Drag tasks between boards, or onto another task to nest them.".into(),
    );
    welcome.content = vec![
        ContentItem {
            kind: ContentKind::Bullet,
            text: "Add boards and tasks from the toolbar".into(),
        },
        ContentItem {
            kind: ContentKind::Bullet,
            text: "Set due dates and priorities inline".into(),
        },
    ];
    todo.tasks.push(welcome);

    Forest::new(vec![todo, doing, done])
}

/// Dataset used when nothing is stored yet
pub fn initial_forest(seed_enabled: bool) -> Forest {
    if seed_enabled {
        seed_forest()
    } else {
        Forest::default()
    }
}
