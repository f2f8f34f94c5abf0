//! Relocating tasks and boards within the forest.
//!
//! A move is described by a [`MoveRequest`] carrying only identifiers, so the
//! same rules apply whether the intent came from a drag gesture, a command
//! line or a payload handed over by another process.

use serde::{Deserialize, Serialize};

use super::OpError;
use super::board_ops::reorder_boards;
use super::task_ops::{find_task, find_task_in_list, find_task_mut, take_task};
use crate::model::forest::Forest;

/// An explicit request to move something
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MoveRequest {
    /// Put `source_board_id` immediately before `target_board_id`
    #[serde(rename_all = "camelCase")]
    Board {
        source_board_id: String,
        target_board_id: String,
    },
    /// Make `task_id` the last subtask of `target_task_id`, or, when that is
    /// absent, the last top-level task of `target_board_id`
    #[serde(rename_all = "camelCase")]
    Task {
        task_id: String,
        target_board_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target_task_id: Option<String>,
    },
}

/// Carry out a move. Validation happens before anything is detached, so an
/// `Err` leaves the forest exactly as it was.
pub fn execute(forest: &mut Forest, request: &MoveRequest) -> Result<(), OpError> {
    match request {
        MoveRequest::Board {
            source_board_id,
            target_board_id,
        } => reorder_boards(forest, source_board_id, target_board_id),
        MoveRequest::Task {
            task_id,
            target_board_id,
            target_task_id,
        } => relocate_task(forest, task_id, target_board_id, target_task_id.as_deref()),
    }
}

/// True if `candidate_id` appears anywhere below `task_id`.
pub fn is_descendant(forest: &Forest, task_id: &str, candidate_id: &str) -> bool {
    find_task(forest, task_id)
        .is_some_and(|task| find_task_in_list(&task.subtasks, candidate_id).is_some())
}

/// Move a task, with its subtree intact, to a new parent container.
pub fn relocate_task(
    forest: &mut Forest,
    task_id: &str,
    target_board_id: &str,
    target_task_id: Option<&str>,
) -> Result<(), OpError> {
    if target_task_id == Some(task_id) {
        return Err(OpError::SelfDrop(task_id.to_string()));
    }

    let source =
        find_task(forest, task_id).ok_or_else(|| OpError::TaskNotFound(task_id.to_string()))?;

    match target_task_id {
        Some(target_id) => {
            if find_task_in_list(&source.subtasks, target_id).is_some() {
                return Err(OpError::WouldCreateCycle {
                    task_id: task_id.to_string(),
                    target_id: target_id.to_string(),
                });
            }
            if find_task(forest, target_id).is_none() {
                return Err(OpError::TaskNotFound(target_id.to_string()));
            }
        }
        None => {
            if forest.board(target_board_id).is_none() {
                return Err(OpError::BoardNotFound(target_board_id.to_string()));
            }
        }
    }

    let moving =
        take_task(forest, task_id).ok_or_else(|| OpError::TaskNotFound(task_id.to_string()))?;

    // Look the destination up again in the already-detached tree.
    let destination = match target_task_id {
        Some(target_id) => find_task_mut(forest, target_id).map(|t| &mut t.subtasks),
        None => forest.board_mut(target_board_id).map(|b| &mut b.tasks),
    };
    match destination {
        Some(list) => {
            list.push(moving);
            Ok(())
        }
        // Unreachable after the checks above
        None => Err(OpError::TaskNotFound(
            target_task_id.unwrap_or(target_board_id).to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::task_ops::find_task_location;
    use pretty_assertions::assert_eq;

    fn sample_forest() -> Forest {
        serde_json::from_str(
            r#"[
  {"id":"b1","title":"One","tasks":[
    {"id":"a","title":"A","subtasks":[
      {"id":"a1","title":"A1","subtasks":[
        {"id":"a1x","title":"A1x","subtasks":[{"id":"a1x9","title":"A1x9"}]}
      ]}
    ]},
    {"id":"b","title":"B","content":[{"kind":"bullet","text":"keep me"}]}
  ]},
  {"id":"b2","title":"Two","tasks":[{"id":"c","title":"C"}]}
]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_move_to_other_board_top_level() {
        let mut forest = sample_forest();
        relocate_task(&mut forest, "a", "b2", None).unwrap();
        let b2 = forest.board("b2").unwrap();
        let ids: Vec<&str> = b2.tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a"]);
        // Subtree travels intact
        assert_eq!(b2.tasks[1].subtree_size(), 4);
    }

    #[test]
    fn test_move_onto_task_makes_subtask() {
        let mut forest = sample_forest();
        relocate_task(&mut forest, "b", "b2", Some("c")).unwrap();
        let loc = find_task_location(&forest, "b").unwrap();
        assert_eq!(loc.board_id, "b2");
        assert_eq!(loc.parent_id.as_deref(), Some("c"));
        assert_eq!(find_task(&forest, "b").unwrap().content[0].text, "keep me");
    }

    #[test]
    fn test_promote_nested_task_to_top_level() {
        let mut forest = sample_forest();
        let before = find_task(&forest, "a1x").unwrap().clone();
        relocate_task(&mut forest, "a1x", "b1", None).unwrap();
        let b1 = forest.board("b1").unwrap();
        assert_eq!(b1.tasks.last().unwrap(), &before);
        assert!(find_task(&forest, "a1").unwrap().subtasks.is_empty());
    }

    #[test]
    fn test_self_drop_rejected() {
        let mut forest = sample_forest();
        let before = forest.clone();
        assert_eq!(
            relocate_task(&mut forest, "a", "b1", Some("a")),
            Err(OpError::SelfDrop("a".into()))
        );
        assert_eq!(forest, before);
    }

    #[test]
    fn test_drop_into_descendant_rejected_at_every_depth() {
        for target in ["a1", "a1x", "a1x9"] {
            let mut forest = sample_forest();
            let before = forest.clone();
            let result = relocate_task(&mut forest, "a", "b1", Some(target));
            assert!(
                matches!(result, Err(OpError::WouldCreateCycle { .. })),
                "target {} should be rejected",
                target
            );
            assert_eq!(forest, before);
        }
    }

    #[test]
    fn test_drop_into_ancestor_allowed() {
        let mut forest = sample_forest();
        relocate_task(&mut forest, "a1x9", "b1", Some("a")).unwrap();
        let a = find_task(&forest, "a").unwrap();
        let ids: Vec<&str> = a.subtasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "a1x9"]);
    }

    #[test]
    fn test_missing_ids_leave_tree_unchanged() {
        let mut forest = sample_forest();
        let before = forest.clone();
        assert!(relocate_task(&mut forest, "ghost", "b1", None).is_err());
        assert!(relocate_task(&mut forest, "b", "nowhere", None).is_err());
        assert!(relocate_task(&mut forest, "b", "b1", Some("ghost")).is_err());
        assert_eq!(forest, before);
    }

    #[test]
    fn test_is_descendant() {
        let forest = sample_forest();
        assert!(is_descendant(&forest, "a", "a1x9"));
        assert!(!is_descendant(&forest, "a1", "a"));
        assert!(!is_descendant(&forest, "a", "a"));
        assert!(!is_descendant(&forest, "ghost", "a"));
    }

    #[test]
    fn test_execute_board_request() {
        let mut forest = sample_forest();
        execute(
            &mut forest,
            &MoveRequest::Board {
                source_board_id: "b2".into(),
                target_board_id: "b1".into(),
            },
        )
        .unwrap();
        assert_eq!(forest.sorted_boards()[0].id, "b2");
    }

    #[test]
    fn test_move_request_wire_shape() {
        let req = MoveRequest::Task {
            task_id: "a".into(),
            target_board_id: "b2".into(),
            target_task_id: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["type"], "task");
        assert_eq!(json["taskId"], "a");
        assert_eq!(json["targetBoardId"], "b2");
        assert!(json.get("targetTaskId").is_none());
    }
}
