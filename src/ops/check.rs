use std::collections::{HashMap, HashSet};
use std::fmt;

use super::task_ops::for_each_task;
use crate::model::forest::Forest;

/// Something structurally off in a forest
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckIssue {
    /// The same ID is used by more than one board or task
    DuplicateId { id: String, count: usize },
    /// Two or more boards share an order value
    DuplicateOrder { order: i64, board_ids: Vec<String> },
    /// Board orders are not exactly `0..n`
    SparseOrder,
    EmptyBoardTitle { board_id: String },
    EmptyTaskTitle { board_id: String, task_id: String },
}

impl CheckIssue {
    /// Issues that break id-based lookups, as opposed to cosmetic ones
    pub fn is_error(&self) -> bool {
        matches!(self, CheckIssue::DuplicateId { .. })
    }
}

impl fmt::Display for CheckIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckIssue::DuplicateId { id, count } => {
                write!(f, "id {} is used {} times", id, count)
            }
            CheckIssue::DuplicateOrder { order, board_ids } => {
                write!(f, "boards {} share order {}", board_ids.join(", "), order)
            }
            CheckIssue::SparseOrder => write!(f, "board order values have gaps"),
            CheckIssue::EmptyBoardTitle { board_id } => {
                write!(f, "board {} has an empty title", board_id)
            }
            CheckIssue::EmptyTaskTitle { board_id, task_id } => {
                write!(f, "task {} on {} has an empty title", task_id, board_id)
            }
        }
    }
}

/// Validate a forest. An empty result means clean.
pub fn check_forest(forest: &Forest) -> Vec<CheckIssue> {
    let mut issues = Vec::new();

    // Ids, first-seen order
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut seen_order: Vec<String> = Vec::new();
    let mut note_id = |id: &str| {
        let entry = counts.entry(id.to_string()).or_insert(0);
        if *entry == 0 {
            seen_order.push(id.to_string());
        }
        *entry += 1;
    };
    for board in &forest.boards {
        note_id(&board.id);
        for_each_task(&board.tasks, &mut |task| note_id(&task.id));
    }
    for id in &seen_order {
        let count = counts[id];
        if count > 1 {
            issues.push(CheckIssue::DuplicateId {
                id: id.clone(),
                count,
            });
        }
    }

    // Board order
    let mut by_order: Vec<(i64, Vec<String>)> = Vec::new();
    for board in forest.sorted_boards() {
        match by_order.last_mut() {
            Some((order, ids)) if *order == board.order => ids.push(board.id.clone()),
            _ => by_order.push((board.order, vec![board.id.clone()])),
        }
    }
    for (order, board_ids) in &by_order {
        if board_ids.len() > 1 {
            issues.push(CheckIssue::DuplicateOrder {
                order: *order,
                board_ids: board_ids.clone(),
            });
        }
    }
    let orders: HashSet<i64> = forest.boards.iter().map(|b| b.order).collect();
    let dense = (0..forest.boards.len() as i64).all(|i| orders.contains(&i));
    if !dense && orders.len() == forest.boards.len() {
        issues.push(CheckIssue::SparseOrder);
    }

    // Titles
    for board in &forest.boards {
        if board.title.trim().is_empty() {
            issues.push(CheckIssue::EmptyBoardTitle {
                board_id: board.id.clone(),
            });
        }
        for_each_task(&board.tasks, &mut |task| {
            if task.title.trim().is_empty() {
                issues.push(CheckIssue::EmptyTaskTitle {
                    board_id: board.id.clone(),
                    task_id: task.id.clone(),
                });
            }
        });
    }

    issues
}
