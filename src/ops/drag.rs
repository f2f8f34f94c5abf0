//! Drag gesture state machine.
//!
//! One gesture picks up a board or a task, optionally carries a serialized
//! payload across whatever transport the front end uses, and ends in a drop
//! (turned into a [`MoveRequest`]) or a cancel. The controller never mutates
//! the caller's forest; a drop hands back the next snapshot.

use serde::{Deserialize, Serialize};

use super::relocate::{MoveRequest, execute};
use super::task_ops::find_task_location;
use super::{OpError, apply};
use crate::model::forest::Forest;

/// What a dragged task carries with it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPayload {
    pub source_board_id: String,
    pub task_id: String,
    pub is_subtask: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_task_id: Option<String>,
}

/// The drag payload, as it travels between drag-start and drop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DragPayload {
    #[serde(rename_all = "camelCase")]
    Board { board_id: String },
    Task(TaskPayload),
}

impl DragPayload {
    /// Payload for dragging a task, built from where it currently sits
    pub fn for_task(forest: &Forest, task_id: &str) -> Option<DragPayload> {
        let loc = find_task_location(forest, task_id)?;
        Some(DragPayload::Task(TaskPayload {
            source_board_id: loc.board_id,
            task_id: task_id.to_string(),
            is_subtask: loc.parent_id.is_some(),
            parent_task_id: loc.parent_id,
        }))
    }

    pub fn for_board(forest: &Forest, board_id: &str) -> Option<DragPayload> {
        forest.board(board_id).map(|b| DragPayload::Board {
            board_id: b.id.clone(),
        })
    }

    /// Encode for a text data channel
    pub fn to_transfer(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decode from a text data channel. Anything unreadable is no payload.
    pub fn from_transfer(data: &str) -> Option<DragPayload> {
        match serde_json::from_str(data) {
            Ok(payload) => Some(payload),
            Err(e) => {
                log::debug!("ignoring unreadable drag payload: {}", e);
                None
            }
        }
    }
}

/// Where something was dropped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// A board's drop zone: "top-level task of this board" / "before this board"
    Board { board_id: String },
    /// A task card: "subtask of this task"
    Task { board_id: String, task_id: String },
}

/// Current gesture
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    DraggingBoard { board_id: String },
    DraggingTask(TaskPayload),
}

/// How a drop ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// The move was carried out
    Applied(MoveRequest),
    /// The move was invalid (self-drop, cycle, stale id); tree unchanged
    Rejected(OpError),
    /// The target doesn't accept this payload; tree unchanged
    Ignored,
}

/// Translate a payload and a drop target into a move, if the target accepts it.
pub fn move_request(payload: &DragPayload, target: &DropTarget) -> Option<MoveRequest> {
    match (payload, target) {
        (DragPayload::Board { board_id }, DropTarget::Board { board_id: target_id }) => {
            Some(MoveRequest::Board {
                source_board_id: board_id.clone(),
                target_board_id: target_id.clone(),
            })
        }
        // Boards only land on board drop zones
        (DragPayload::Board { .. }, DropTarget::Task { .. }) => None,
        (DragPayload::Task(p), DropTarget::Board { board_id }) => Some(MoveRequest::Task {
            task_id: p.task_id.clone(),
            target_board_id: board_id.clone(),
            target_task_id: None,
        }),
        (DragPayload::Task(p), DropTarget::Task { board_id, task_id }) => {
            Some(MoveRequest::Task {
                task_id: p.task_id.clone(),
                target_board_id: board_id.clone(),
                target_task_id: Some(task_id.clone()),
            })
        }
    }
}

/// Finish a drop from a payload alone. Returns the next snapshot (the
/// original one unless the outcome is `Applied`).
pub fn complete_drop(
    forest: &Forest,
    payload: &DragPayload,
    target: &DropTarget,
) -> (Forest, DropOutcome) {
    let Some(request) = move_request(payload, target) else {
        return (forest.clone(), DropOutcome::Ignored);
    };
    let (next, result) = apply(forest, |f| execute(f, &request));
    match result {
        Ok(()) => (next, DropOutcome::Applied(request)),
        Err(e) => {
            log::debug!("drop rejected: {}", e);
            (next, DropOutcome::Rejected(e))
        }
    }
}

/// Tracks one drag gesture at a time
#[derive(Debug, Clone, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == DragState::Idle
    }

    /// Pick up a board by its grip. Returns the payload to put on the
    /// transport, or None (staying idle) if the board doesn't exist.
    pub fn begin_board(&mut self, forest: &Forest, board_id: &str) -> Option<DragPayload> {
        let payload = DragPayload::for_board(forest, board_id)?;
        self.state = DragState::DraggingBoard {
            board_id: board_id.to_string(),
        };
        Some(payload)
    }

    /// Pick up a task card at any depth.
    pub fn begin_task(&mut self, forest: &Forest, task_id: &str) -> Option<DragPayload> {
        let payload = DragPayload::for_task(forest, task_id)?;
        if let DragPayload::Task(p) = &payload {
            self.state = DragState::DraggingTask(p.clone());
        }
        Some(payload)
    }

    /// The in-flight payload, if a gesture is active
    pub fn payload(&self) -> Option<DragPayload> {
        match &self.state {
            DragState::Idle => None,
            DragState::DraggingBoard { board_id } => Some(DragPayload::Board {
                board_id: board_id.clone(),
            }),
            DragState::DraggingTask(p) => Some(DragPayload::Task(p.clone())),
        }
    }

    /// Escape, or a drop outside any target
    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }

    /// End the gesture on `target`. The controller is idle afterwards
    /// whatever the outcome.
    pub fn drop_on(&mut self, forest: &Forest, target: &DropTarget) -> (Forest, DropOutcome) {
        let payload = self.payload();
        self.state = DragState::Idle;
        match payload {
            Some(payload) => complete_drop(forest, &payload, target),
            None => (forest.clone(), DropOutcome::Ignored),
        }
    }
}
