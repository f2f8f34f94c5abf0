use serde::Serialize;

use crate::model::board::Board;
use crate::model::task::{ContentKind, Priority, Task};
use crate::ops::board_ops::BoardStats;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct StatsJson {
    pub boards: Vec<BoardStatsEntryJson>,
    pub totals: BoardStatsJson,
}

#[derive(Serialize)]
pub struct BoardStatsEntryJson {
    pub id: String,
    pub title: String,
    pub stats: BoardStatsJson,
}

#[derive(Serialize)]
pub struct BoardStatsJson {
    pub total: usize,
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub overdue: usize,
}

impl From<&BoardStats> for BoardStatsJson {
    fn from(s: &BoardStats) -> Self {
        BoardStatsJson {
            total: s.total,
            low: s.low,
            medium: s.medium,
            high: s.high,
            overdue: s.overdue,
        }
    }
}

#[derive(Serialize)]
pub struct SearchHitJson {
    pub board: String,
    pub task_id: String,
    pub title: String,
    pub field: String,
}

#[derive(Serialize)]
pub struct CreatedJson {
    pub id: String,
}

#[derive(Serialize)]
pub struct CheckJson {
    pub ok: bool,
    pub issues: Vec<String>,
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

fn priority_marker(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "!",
        Priority::Medium => " ",
        Priority::Low => "-",
    }
}

/// Single-line summary: `! Title (due 2025-06-01) #tag  [task-…]`
pub fn format_task_line(task: &Task, show_id: bool) -> String {
    let mut line = format!("{} {}", priority_marker(task.priority), task.title);
    if let Some(due) = task.due_date {
        line.push_str(&format!(" (due {})", due.format("%Y-%m-%d")));
    }
    for tag in &task.tags {
        line.push_str(&format!(" #{}", tag));
    }
    if show_id {
        line.push_str(&format!("  [{}]", task.id));
    }
    line
}

pub fn format_board_header(board: &Board, show_id: bool) -> String {
    let count: usize = board.tasks.iter().map(Task::subtree_size).sum();
    let mut header = format!("== {} ({}, {} tasks)", board.title, board.color, count);
    if show_id {
        header.push_str(&format!("  [{}]", board.id));
    }
    header
}

/// Indented tree of a task list, two spaces per nesting level.
pub fn format_task_tree(tasks: &[Task], depth: usize, show_id: bool, out: &mut Vec<String>) {
    for task in tasks {
        out.push(format!(
            "{}{}",
            "  ".repeat(depth + 1),
            format_task_line(task, show_id)
        ));
        format_task_tree(&task.subtasks, depth + 1, show_id, out);
    }
}

/// Full detail view of a single task
pub fn format_task_detail(task: &Task) -> Vec<String> {
    let mut lines = vec![
        format!("{}  [{}]", task.title, task.id),
        format!("priority: {}", task.priority),
    ];
    if let Some(due) = task.due_date {
        lines.push(format!("due: {}", due.format("%Y-%m-%d")));
    }
    if !task.tags.is_empty() {
        let tags: Vec<String> = task.tags.iter().map(|t| format!("#{}", t)).collect();
        lines.push(format!("tags: {}", tags.join(" ")));
    }
    if !task.description.is_empty() {
        lines.push(String::new());
        lines.push(task.description.clone());
    }
    if !task.content.is_empty() {
        lines.push(String::new());
        let mut number = 0;
        for item in &task.content {
            match item.kind {
                ContentKind::Bullet => lines.push(format!("  • {}", item.text)),
                ContentKind::Numbered => {
                    number += 1;
                    lines.push(format!("  {}. {}", number, item.text));
                }
            }
        }
    }
    if !task.subtasks.is_empty() {
        lines.push(String::new());
        lines.push("subtasks:".to_string());
        format_task_tree(&task.subtasks, 0, true, &mut lines);
    }
    lines
}
