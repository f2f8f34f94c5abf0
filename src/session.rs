use std::path::{Path, PathBuf};

use crate::io::exchange;
use crate::io::snapshot::{self, decode, load_forest, save_forest};
use crate::io::storage::{Storage, StorageError};
use crate::model::board::BoardColor;
use crate::model::config::{AppConfig, DefaultsConfig};
use crate::model::forest::Forest;
use crate::model::task::ContentKind;
use crate::ops::drag::{DragController, DragPayload, DragState, DropOutcome, DropTarget, complete_drop};
use crate::ops::relocate::{self, MoveRequest};
use crate::ops::seed::initial_forest;
use crate::ops::task_ops::{self, TaskUpdate};
use crate::ops::{OpError, apply, board_ops};

/// A user intent, as dispatched by a front end.
///
/// The `title` on the create intents overrides the configured default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    AddBoard { title: Option<String> },
    DeleteBoard { board_id: String },
    RenameBoard { board_id: String, title: String },
    RecolorBoard { board_id: String, color: BoardColor },
    AddTask { board_id: String, title: Option<String> },
    AddSubtask { parent_id: String, title: Option<String> },
    DeleteTask { task_id: String },
    UpdateTask { task_id: String, update: TaskUpdate },
    AddContentItem { task_id: String, kind: ContentKind, text: String },
    DeleteContentItem { task_id: String, index: usize },
    UpdateContentItem { task_id: String, index: usize, text: String },
    AddTag { task_id: String, tag: String },
    RemoveTag { task_id: String, tag: String },
    Move(MoveRequest),
}

/// What a successful dispatch did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    Changed,
    /// A board or task was created with this ID
    Created(String),
}

/// Owns the canonical forest and mirrors it to storage.
///
/// Every successful change replaces the snapshot and saves it whole. A
/// failed operation leaves the snapshot as it was; a failed save leaves the
/// in-memory forest intact and raises `save_failed` until the next good save.
pub struct Session<S: Storage> {
    forest: Forest,
    storage: S,
    key: String,
    defaults: DefaultsConfig,
    drag: DragController,
    save_failed: bool,
}

impl<S: Storage> Session<S> {
    /// Load the stored forest, or start from the configured defaults.
    pub fn open(storage: S, config: &AppConfig) -> Self {
        let seed_enabled = config.seed.enabled;
        let forest = load_forest(&storage, &config.storage.key, || {
            initial_forest(seed_enabled)
        });
        Session {
            forest,
            storage,
            key: config.storage.key.clone(),
            defaults: config.defaults.clone(),
            drag: DragController::new(),
            save_failed: false,
        }
    }

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// True when the most recent save attempt failed
    pub fn save_failed(&self) -> bool {
        self.save_failed
    }

    /// Apply an intent. Returns None when it was a no-op (stale id, invalid
    /// move, bad value); the forest is then unchanged.
    pub fn dispatch(&mut self, intent: Intent) -> Option<Applied> {
        match self.try_dispatch(intent) {
            Ok(applied) => Some(applied),
            Err(e) => {
                log::debug!("ignored: {}", e);
                None
            }
        }
    }

    /// Like [`Session::dispatch`], but hands back the reason for a no-op.
    pub fn try_dispatch(&mut self, intent: Intent) -> Result<Applied, OpError> {
        let defaults = self.defaults.clone();
        match intent {
            Intent::AddBoard { title } => {
                let title = title.unwrap_or(defaults.board_title);
                self.commit(|f| board_ops::add_board(f, &title))
                    .map(Applied::Created)
            }
            Intent::DeleteBoard { board_id } => self
                .commit(|f| board_ops::delete_board(f, &board_id))
                .map(|_| Applied::Changed),
            Intent::RenameBoard { board_id, title } => self
                .commit(|f| board_ops::rename_board(f, &board_id, &title))
                .map(|_| Applied::Changed),
            Intent::RecolorBoard { board_id, color } => self
                .commit(|f| board_ops::recolor_board(f, &board_id, color))
                .map(|_| Applied::Changed),
            Intent::AddTask { board_id, title } => {
                let title = title.unwrap_or(defaults.task_title);
                self.commit(|f| {
                    task_ops::add_task(f, &board_id, &title, &defaults.task_description)
                })
                .map(Applied::Created)
            }
            Intent::AddSubtask { parent_id, title } => {
                let title = title.unwrap_or(defaults.task_title);
                self.commit(|f| {
                    task_ops::add_subtask(f, &parent_id, &title, &defaults.task_description)
                })
                .map(Applied::Created)
            }
            Intent::DeleteTask { task_id } => self
                .commit(|f| task_ops::delete_task(f, &task_id))
                .map(|_| Applied::Changed),
            Intent::UpdateTask { task_id, update } => self
                .commit(|f| task_ops::update_task(f, &task_id, update))
                .map(|_| Applied::Changed),
            Intent::AddContentItem {
                task_id,
                kind,
                text,
            } => self
                .commit(|f| {
                    let index = task_ops::add_content_item(f, &task_id, kind)?;
                    task_ops::update_content_item(f, &task_id, index, &text)
                })
                .map(|_| Applied::Changed),
            Intent::DeleteContentItem { task_id, index } => self
                .commit(|f| task_ops::delete_content_item(f, &task_id, index))
                .map(|_| Applied::Changed),
            Intent::UpdateContentItem {
                task_id,
                index,
                text,
            } => self
                .commit(|f| task_ops::update_content_item(f, &task_id, index, &text))
                .map(|_| Applied::Changed),
            Intent::AddTag { task_id, tag } => self
                .commit(|f| task_ops::add_tag(f, &task_id, &tag))
                .map(|_| Applied::Changed),
            Intent::RemoveTag { task_id, tag } => self
                .commit(|f| task_ops::remove_tag(f, &task_id, &tag))
                .map(|_| Applied::Changed),
            Intent::Move(request) => self
                .commit(|f| relocate::execute(f, &request))
                .map(|_| Applied::Changed),
        }
    }

    fn commit<T>(
        &mut self,
        op: impl FnOnce(&mut Forest) -> Result<T, OpError>,
    ) -> Result<T, OpError> {
        let (next, result) = apply(&self.forest, op);
        let value = result?;
        self.forest = next;
        self.persist();
        Ok(value)
    }

    /// Save the current forest. Failures are logged and flagged, never fatal.
    pub fn persist(&mut self) -> bool {
        match save_forest(&self.storage, &self.key, &self.forest) {
            Ok(()) => {
                self.save_failed = false;
                true
            }
            Err(e) => {
                log::error!("could not save {}, changes are only in memory: {}", self.key, e);
                self.save_failed = true;
                false
            }
        }
    }

    // -----------------------------------------------------------------------
    // Drag and drop
    // -----------------------------------------------------------------------

    pub fn drag_state(&self) -> &DragState {
        self.drag.state()
    }

    /// Start dragging a board. Returns the payload for the transport.
    pub fn begin_board_drag(&mut self, board_id: &str) -> Option<DragPayload> {
        self.drag.begin_board(&self.forest, board_id)
    }

    /// Start dragging a task. Returns the payload for the transport.
    pub fn begin_task_drag(&mut self, task_id: &str) -> Option<DragPayload> {
        self.drag.begin_task(&self.forest, task_id)
    }

    pub fn cancel_drag(&mut self) {
        self.drag.cancel();
    }

    /// Finish the in-progress gesture on `target`.
    pub fn drop_on(&mut self, target: &DropTarget) -> DropOutcome {
        let (next, outcome) = self.drag.drop_on(&self.forest, target);
        self.settle_drop(next, &outcome);
        outcome
    }

    /// Finish a drop using only a payload received over a data channel,
    /// e.g. from a gesture that started in another window.
    pub fn drop_with_transfer(&mut self, data: &str, target: &DropTarget) -> DropOutcome {
        self.drag.cancel();
        let Some(payload) = DragPayload::from_transfer(data) else {
            return DropOutcome::Ignored;
        };
        let (next, outcome) = complete_drop(&self.forest, &payload, target);
        self.settle_drop(next, &outcome);
        outcome
    }

    fn settle_drop(&mut self, next: Forest, outcome: &DropOutcome) {
        if let DropOutcome::Applied(_) = outcome {
            self.forest = next;
            self.persist();
        }
    }

    // -----------------------------------------------------------------------
    // Export / import
    // -----------------------------------------------------------------------

    pub fn export_to(&self, dest: &Path) -> Result<PathBuf, StorageError> {
        let value = snapshot::encode(&self.forest)?;
        exchange::export_to_file(dest, &value)
    }

    /// Replace the whole forest with the contents of an exported file.
    /// Returns false, keeping the current forest, if the file is unusable.
    pub fn import_from(&mut self, path: &Path) -> bool {
        let Some(value) = exchange::import_from_file(path) else {
            return false;
        };
        match decode(value) {
            Ok(forest) => {
                log::info!(
                    "imported {} boards from {}",
                    forest.boards.len(),
                    path.display()
                );
                self.forest = forest;
                self.persist();
                true
            }
            Err(e) => {
                log::warn!("{} is not a board export: {}", path.display(), e);
                false
            }
        }
    }
}
