use serde::{Deserialize, Serialize};
use std::fmt;

/// An intersection on the board, addressed by row then column from the
/// top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub row: u8,
    pub col: u8,
}

impl Point {
    pub const fn new(row: u8, col: u8) -> Self {
        Point { row, col }
    }
}

impl From<(u8, u8)> for Point {
    fn from((row, col): (u8, u8)) -> Self {
        Point { row, col }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.row, self.col)
    }
}

impl std::str::FromStr for Point {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (row, col) = s
            .split_once(',')
            .ok_or_else(|| format!("invalid point: {s}"))?;
        let row = row
            .trim()
            .parse()
            .map_err(|_| format!("invalid row in point: {s}"))?;
        let col = col
            .trim()
            .parse()
            .map_err(|_| format!("invalid column in point: {s}"))?;
        Ok(Point { row, col })
    }
}
