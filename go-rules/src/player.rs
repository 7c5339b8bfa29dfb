use serde_repr::{Deserialize_repr, Serialize_repr};
use std::fmt;

/// The side to move. Black always moves first.
///
/// The discriminants double as the board's cell values; an empty cell is `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr)]
#[repr(i8)]
pub enum Player {
    Black = 1,
    White = -1,
}

impl Player {
    /// The player owning a board cell, or `None` for an empty or invalid cell.
    pub fn from_cell(v: i8) -> Option<Self> {
        match v {
            1 => Some(Player::Black),
            -1 => Some(Player::White),
            _ => None,
        }
    }

    pub fn cell(self) -> i8 {
        self as i8
    }

    pub fn other(self) -> Self {
        match self {
            Player::Black => Player::White,
            Player::White => Player::Black,
        }
    }

    /// Single-letter form used in result strings.
    pub fn letter(self) -> char {
        match self {
            Player::Black => 'B',
            Player::White => 'W',
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::Black => write!(f, "Black"),
            Player::White => write!(f, "White"),
        }
    }
}
