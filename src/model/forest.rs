use serde::{Deserialize, Deserializer, Serialize};

use super::board::{Board, BoardColor};
use super::task::Task;

/// The whole dataset: every board with its task forest.
///
/// Serialized as a bare JSON array of boards. Decoding tolerates documents
/// written before `order`, `color` or the newer task fields existed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Forest {
    pub boards: Vec<Board>,
}

impl Forest {
    pub fn new(boards: Vec<Board>) -> Self {
        Forest { boards }
    }

    pub fn board(&self, board_id: &str) -> Option<&Board> {
        self.boards.iter().find(|b| b.id == board_id)
    }

    pub fn board_mut(&mut self, board_id: &str) -> Option<&mut Board> {
        self.boards.iter_mut().find(|b| b.id == board_id)
    }

    /// Boards in display order: by `order`, ties broken by array position
    pub fn sorted_boards(&self) -> Vec<&Board> {
        let mut boards: Vec<&Board> = self.boards.iter().collect();
        boards.sort_by_key(|b| b.order);
        boards
    }

    /// Total number of tasks at every depth
    pub fn task_count(&self) -> usize {
        self.boards
            .iter()
            .flat_map(|b| b.tasks.iter())
            .map(Task::subtree_size)
            .sum()
    }
}

#[derive(Deserialize)]
struct BoardRecord {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    color: Option<BoardColor>,
    #[serde(default)]
    order: Option<i64>,
    #[serde(default)]
    tasks: Vec<Task>,
}

impl BoardRecord {
    fn into_board(self, index: usize) -> Board {
        Board {
            id: self.id,
            title: self.title,
            color: self.color.unwrap_or_else(|| BoardColor::cycled(index)),
            order: self.order.unwrap_or(index as i64),
            tasks: self.tasks,
        }
    }
}

impl<'de> Deserialize<'de> for Forest {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let records = Vec::<BoardRecord>::deserialize(d)?;
        let boards = records
            .into_iter()
            .enumerate()
            .map(|(i, r)| r.into_board(i))
            .collect();
        Ok(Forest { boards })
    }
}
