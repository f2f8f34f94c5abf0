use chrono::NaiveDate;

use super::task_ops::for_each_task;
use super::{OpError, fresh_id};
use crate::model::board::{Board, BoardColor};
use crate::model::forest::Forest;
use crate::model::task::Priority;

/// Append a new empty board. Its order is the current board count and its
/// colour cycles through the palette. Returns the new board's ID.
pub fn add_board(forest: &mut Forest, title: &str) -> Result<String, OpError> {
    let n = forest.boards.len();
    let id = fresh_id("board");
    forest.boards.push(Board::new(
        id.clone(),
        title.to_string(),
        BoardColor::cycled(n),
        n as i64,
    ));
    Ok(id)
}

/// Remove a board and everything on it. Surviving boards keep their order
/// values; gaps are fine since display sorts by value.
pub fn delete_board(forest: &mut Forest, board_id: &str) -> Result<Board, OpError> {
    let idx = forest
        .boards
        .iter()
        .position(|b| b.id == board_id)
        .ok_or_else(|| OpError::BoardNotFound(board_id.to_string()))?;
    Ok(forest.boards.remove(idx))
}

pub fn rename_board(forest: &mut Forest, board_id: &str, title: &str) -> Result<(), OpError> {
    let board = board_mut_or_err(forest, board_id)?;
    board.title = title.to_string();
    Ok(())
}

pub fn recolor_board(forest: &mut Forest, board_id: &str, color: BoardColor) -> Result<(), OpError> {
    let board = board_mut_or_err(forest, board_id)?;
    board.color = color;
    Ok(())
}

/// Move `source_id` to sit immediately before `target_id` in display order,
/// then renumber every board so `order` equals its index.
pub fn reorder_boards(forest: &mut Forest, source_id: &str, target_id: &str) -> Result<(), OpError> {
    if source_id == target_id {
        return Err(OpError::SelfDrop(source_id.to_string()));
    }
    if forest.board(target_id).is_none() {
        return Err(OpError::BoardNotFound(target_id.to_string()));
    }

    // Stable sort keeps array position as the tie-break for equal orders.
    let mut boards = std::mem::take(&mut forest.boards);
    boards.sort_by_key(|b| b.order);

    let Some(src_idx) = boards.iter().position(|b| b.id == source_id) else {
        forest.boards = boards;
        return Err(OpError::BoardNotFound(source_id.to_string()));
    };
    let moving = boards.remove(src_idx);
    let target_idx = boards
        .iter()
        .position(|b| b.id == target_id)
        .unwrap_or(boards.len());
    boards.insert(target_idx, moving);

    for (i, board) in boards.iter_mut().enumerate() {
        board.order = i as i64;
    }
    forest.boards = boards;
    Ok(())
}

fn board_mut_or_err<'a>(forest: &'a mut Forest, board_id: &str) -> Result<&'a mut Board, OpError> {
    forest
        .board_mut(board_id)
        .ok_or_else(|| OpError::BoardNotFound(board_id.to_string()))
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Task counts for one board, nested tasks included
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardStats {
    pub total: usize,
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    /// Tasks whose due date is before `today`
    pub overdue: usize,
}

impl BoardStats {
    pub fn add(&mut self, other: &BoardStats) {
        self.total += other.total;
        self.low += other.low;
        self.medium += other.medium;
        self.high += other.high;
        self.overdue += other.overdue;
    }
}

pub fn board_stats(board: &Board, today: NaiveDate) -> BoardStats {
    let mut stats = BoardStats::default();
    for_each_task(&board.tasks, &mut |task| {
        stats.total += 1;
        match task.priority {
            Priority::Low => stats.low += 1,
            Priority::Medium => stats.medium += 1,
            Priority::High => stats.high += 1,
        }
        if task.due_date.is_some_and(|d| d < today) {
            stats.overdue += 1;
        }
    });
    stats
}
