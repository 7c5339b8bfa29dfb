use serde::{Deserialize, Serialize};
use std::fmt;

use crate::point::Point;

/// A single action by the player to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Move {
    Play(Point),
    Pass,
    Resign,
}

impl Move {
    pub fn play(row: u8, col: u8) -> Self {
        Move::Play(Point::new(row, col))
    }

    pub fn point(&self) -> Option<Point> {
        match self {
            Move::Play(p) => Some(*p),
            _ => None,
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Move::Pass)
    }

    pub fn is_resign(&self) -> bool {
        matches!(self, Move::Resign)
    }
}

impl std::str::FromStr for Move {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pass" => Ok(Move::Pass),
            "resign" => Ok(Move::Resign),
            other => other
                .parse::<Point>()
                .map(Move::Play)
                .map_err(|_| format!("invalid move: {s}")),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Play(p) => write!(f, "{p}"),
            Move::Pass => write!(f, "pass"),
            Move::Resign => write!(f, "resign"),
        }
    }
}
