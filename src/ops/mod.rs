pub mod board_ops;
pub mod check;
pub mod drag;
pub mod relocate;
pub mod search;
pub mod seed;
pub mod task_ops;

use crate::model::Forest;

/// Error type for tree operations.
///
/// Callers that follow the "silent no-op" contract (the session layer) log
/// these and keep the previous snapshot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OpError {
    #[error("board not found: {0}")]
    BoardNotFound(String),
    #[error("task not found: {0}")]
    TaskNotFound(String),
    #[error("content index {index} out of range for task {task_id}")]
    ContentIndexOutOfRange { task_id: String, index: usize },
    #[error("cannot drop {0} onto itself")]
    SelfDrop(String),
    #[error("cannot move task {task_id} into its own subtree ({target_id})")]
    WouldCreateCycle { task_id: String, target_id: String },
    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },
    #[error("unknown task field: {0}")]
    UnknownField(String),
}

/// Run `op` against a copy of `forest`.
///
/// On success the mutated copy is returned along with the operation's
/// result. On failure the original snapshot is returned unchanged, so a
/// failing operation never leaves a half-applied tree behind.
pub fn apply<T>(
    forest: &Forest,
    op: impl FnOnce(&mut Forest) -> Result<T, OpError>,
) -> (Forest, Result<T, OpError>) {
    let mut next = forest.clone();
    match op(&mut next) {
        Ok(value) => (next, Ok(value)),
        Err(e) => (forest.clone(), Err(e)),
    }
}

/// Generate a fresh id like `task-3f2a…`, unique across the forest.
pub fn fresh_id(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4().simple())
}
