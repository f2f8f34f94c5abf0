use serde::{Deserialize, Serialize};

use super::task::Task;

/// Board colour tag, drawn from a fixed palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardColor {
    Blue,
    Green,
    Purple,
    Orange,
    Pink,
    Teal,
    Red,
    Yellow,
    /// Also the landing spot for colours this build doesn't know
    #[serde(other)]
    Gray,
}

/// Every colour a board may carry, in the order new boards cycle through them
pub const PALETTE: &[BoardColor] = &[
    BoardColor::Blue,
    BoardColor::Green,
    BoardColor::Purple,
    BoardColor::Orange,
    BoardColor::Pink,
    BoardColor::Teal,
    BoardColor::Red,
    BoardColor::Yellow,
    BoardColor::Gray,
];

impl BoardColor {
    pub fn name(self) -> &'static str {
        match self {
            BoardColor::Blue => "blue",
            BoardColor::Green => "green",
            BoardColor::Purple => "purple",
            BoardColor::Orange => "orange",
            BoardColor::Pink => "pink",
            BoardColor::Teal => "teal",
            BoardColor::Red => "red",
            BoardColor::Yellow => "yellow",
            BoardColor::Gray => "gray",
        }
    }

    /// Parse a palette name (case-insensitive). Unknown names are rejected.
    pub fn parse_name(s: &str) -> Option<BoardColor> {
        let lower = s.trim().to_ascii_lowercase();
        PALETTE.iter().copied().find(|c| c.name() == lower)
    }

    /// Palette entry for the `n`th board, wrapping around
    pub fn cycled(n: usize) -> BoardColor {
        PALETTE[n % PALETTE.len()]
    }
}

impl std::fmt::Display for BoardColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A named, coloured column owning a forest of tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Board {
    /// Opaque id, immutable after creation
    pub id: String,
    pub title: String,
    pub color: BoardColor,
    /// Rank among sibling boards. Only the relative order matters; values are
    /// made dense again by every reorder.
    pub order: i64,
    /// Top-level tasks on this board
    pub tasks: Vec<Task>,
}

impl Board {
    pub fn new(id: String, title: String, color: BoardColor, order: i64) -> Self {
        Board {
            id,
            title,
            color,
            order,
            tasks: Vec::new(),
        }
    }
}
