use chrono::NaiveDate;

use super::{OpError, fresh_id};
use crate::model::forest::Forest;
use crate::model::task::{ContentItem, ContentKind, DUE_DATE_FORMAT, Priority, Task};

// ---------------------------------------------------------------------------
// Task-list container helpers
//
// A board's `tasks` and a task's `subtasks` are the same kind of list, so
// every lookup below recurses through one shape. Search order is depth-first
// pre-order: a task, then its subtasks, then its next sibling.
// ---------------------------------------------------------------------------

pub fn find_task_in_list<'a>(tasks: &'a [Task], task_id: &str) -> Option<&'a Task> {
    for task in tasks {
        if task.id == task_id {
            return Some(task);
        }
        if let Some(t) = find_task_in_list(&task.subtasks, task_id) {
            return Some(t);
        }
    }
    None
}

pub fn find_task_mut_in_list<'a>(tasks: &'a mut [Task], task_id: &str) -> Option<&'a mut Task> {
    for task in tasks.iter_mut() {
        if task.id == task_id {
            return Some(task);
        }
        if let Some(t) = find_task_mut_in_list(&mut task.subtasks, task_id) {
            return Some(t);
        }
    }
    None
}

/// Detach the first task with `task_id` (and its whole subtree) from the list.
pub fn take_task_from_list(tasks: &mut Vec<Task>, task_id: &str) -> Option<Task> {
    for idx in 0..tasks.len() {
        if tasks[idx].id == task_id {
            return Some(tasks.remove(idx));
        }
        if let Some(t) = take_task_from_list(&mut tasks[idx].subtasks, task_id) {
            return Some(t);
        }
    }
    None
}

/// Visit every task in the list, parents before children.
pub fn for_each_task(tasks: &[Task], f: &mut dyn FnMut(&Task)) {
    for task in tasks {
        f(task);
        for_each_task(&task.subtasks, f);
    }
}

// ---------------------------------------------------------------------------
// Forest-wide lookup
// ---------------------------------------------------------------------------

/// Where a task lives in the forest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskLocation {
    /// Board whose task forest holds the task
    pub board_id: String,
    /// Direct parent task, or None for a top-level task
    pub parent_id: Option<String>,
    /// Index among its siblings
    pub sibling_index: usize,
}

/// Find a task by ID anywhere in the forest (boards in array order).
pub fn find_task<'a>(forest: &'a Forest, task_id: &str) -> Option<&'a Task> {
    forest
        .boards
        .iter()
        .find_map(|b| find_task_in_list(&b.tasks, task_id))
}

pub fn find_task_mut<'a>(forest: &'a mut Forest, task_id: &str) -> Option<&'a mut Task> {
    for board in forest.boards.iter_mut() {
        if let Some(t) = find_task_mut_in_list(&mut board.tasks, task_id) {
            return Some(t);
        }
    }
    None
}

/// Detach a task and its subtree from wherever it lives.
pub fn take_task(forest: &mut Forest, task_id: &str) -> Option<Task> {
    for board in forest.boards.iter_mut() {
        if let Some(t) = take_task_from_list(&mut board.tasks, task_id) {
            return Some(t);
        }
    }
    None
}

pub fn find_task_location(forest: &Forest, task_id: &str) -> Option<TaskLocation> {
    fn locate(
        tasks: &[Task],
        task_id: &str,
        board_id: &str,
        parent_id: Option<&str>,
    ) -> Option<TaskLocation> {
        for (i, task) in tasks.iter().enumerate() {
            if task.id == task_id {
                return Some(TaskLocation {
                    board_id: board_id.to_string(),
                    parent_id: parent_id.map(str::to_string),
                    sibling_index: i,
                });
            }
            if let Some(loc) = locate(&task.subtasks, task_id, board_id, Some(&task.id)) {
                return Some(loc);
            }
        }
        None
    }

    forest
        .boards
        .iter()
        .find_map(|b| locate(&b.tasks, task_id, &b.id, None))
}

fn task_mut_or_err<'a>(forest: &'a mut Forest, task_id: &str) -> Result<&'a mut Task, OpError> {
    find_task_mut(forest, task_id).ok_or_else(|| OpError::TaskNotFound(task_id.to_string()))
}

// ---------------------------------------------------------------------------
// Task CRUD
// ---------------------------------------------------------------------------

/// Append a new task to the top level of a board. Returns the new task's ID.
pub fn add_task(
    forest: &mut Forest,
    board_id: &str,
    title: &str,
    description: &str,
) -> Result<String, OpError> {
    let board = forest
        .board_mut(board_id)
        .ok_or_else(|| OpError::BoardNotFound(board_id.to_string()))?;
    let id = fresh_id("task");
    board
        .tasks
        .push(Task::new(id.clone(), title.to_string(), description.to_string()));
    Ok(id)
}

/// Append a new task to another task's subtasks. There is no depth limit.
pub fn add_subtask(
    forest: &mut Forest,
    parent_id: &str,
    title: &str,
    description: &str,
) -> Result<String, OpError> {
    let parent = task_mut_or_err(forest, parent_id)?;
    let id = fresh_id("task");
    parent
        .subtasks
        .push(Task::new(id.clone(), title.to_string(), description.to_string()));
    Ok(id)
}

/// Remove a task (with its subtree). Returns the removed task.
pub fn delete_task(forest: &mut Forest, task_id: &str) -> Result<Task, OpError> {
    take_task(forest, task_id).ok_or_else(|| OpError::TaskNotFound(task_id.to_string()))
}

/// A single editable task field with its new value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskUpdate {
    Title(String),
    Description(String),
    DueDate(Option<NaiveDate>),
    Priority(Priority),
}

impl TaskUpdate {
    /// Build an update from a field name and its textual value, e.g.
    /// `("priority", "high")` or `("dueDate", "")`.
    pub fn parse(field: &str, value: &str) -> Result<TaskUpdate, OpError> {
        let invalid = || OpError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
        };
        match field.to_ascii_lowercase().as_str() {
            "title" => Ok(TaskUpdate::Title(value.to_string())),
            "description" | "desc" => Ok(TaskUpdate::Description(value.to_string())),
            "duedate" | "due_date" | "due" => {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    Ok(TaskUpdate::DueDate(None))
                } else {
                    NaiveDate::parse_from_str(trimmed, DUE_DATE_FORMAT)
                        .map(|d| TaskUpdate::DueDate(Some(d)))
                        .map_err(|_| invalid())
                }
            }
            "priority" => Priority::parse_name(value)
                .map(TaskUpdate::Priority)
                .ok_or_else(invalid),
            _ => Err(OpError::UnknownField(field.to_string())),
        }
    }
}

pub fn update_task(forest: &mut Forest, task_id: &str, update: TaskUpdate) -> Result<(), OpError> {
    let task = task_mut_or_err(forest, task_id)?;
    match update {
        TaskUpdate::Title(title) => task.title = title,
        TaskUpdate::Description(description) => task.description = description,
        TaskUpdate::DueDate(due) => task.due_date = due,
        TaskUpdate::Priority(priority) => task.priority = priority,
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Content items
// ---------------------------------------------------------------------------

/// Append an empty content item. Returns its index.
pub fn add_content_item(
    forest: &mut Forest,
    task_id: &str,
    kind: ContentKind,
) -> Result<usize, OpError> {
    let task = task_mut_or_err(forest, task_id)?;
    task.content.push(ContentItem {
        kind,
        text: String::new(),
    });
    Ok(task.content.len() - 1)
}

pub fn delete_content_item(
    forest: &mut Forest,
    task_id: &str,
    index: usize,
) -> Result<ContentItem, OpError> {
    let task = task_mut_or_err(forest, task_id)?;
    if index >= task.content.len() {
        return Err(OpError::ContentIndexOutOfRange {
            task_id: task_id.to_string(),
            index,
        });
    }
    Ok(task.content.remove(index))
}

pub fn update_content_item(
    forest: &mut Forest,
    task_id: &str,
    index: usize,
    text: &str,
) -> Result<(), OpError> {
    let task = task_mut_or_err(forest, task_id)?;
    let item = task
        .content
        .get_mut(index)
        .ok_or_else(|| OpError::ContentIndexOutOfRange {
            task_id: task_id.to_string(),
            index,
        })?;
    item.text = text.to_string();
    Ok(())
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

/// Add a tag (leading `#` stripped). Returns false if it was already present.
pub fn add_tag(forest: &mut Forest, task_id: &str, tag: &str) -> Result<bool, OpError> {
    let tag = normalize_tag(tag)?;
    let task = task_mut_or_err(forest, task_id)?;
    if task.tags.contains(&tag) {
        return Ok(false);
    }
    task.tags.push(tag);
    Ok(true)
}

/// Remove a tag. Returns false if the task didn't carry it.
pub fn remove_tag(forest: &mut Forest, task_id: &str, tag: &str) -> Result<bool, OpError> {
    let tag = normalize_tag(tag)?;
    let task = task_mut_or_err(forest, task_id)?;
    let before = task.tags.len();
    task.tags.retain(|t| *t != tag);
    Ok(task.tags.len() != before)
}

fn normalize_tag(tag: &str) -> Result<String, OpError> {
    let tag = tag.trim().trim_start_matches('#');
    if tag.is_empty() {
        return Err(OpError::InvalidValue {
            field: "tag".into(),
            value: tag.to_string(),
        });
    }
    Ok(tag.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
