use std::fmt;

/// Why an otherwise well-formed move is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    SelfCapture,
    Ko,
    GameOver,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::SelfCapture => write!(f, "self-capture"),
            Violation::Ko => write!(f, "ko violation"),
            Violation::GameOver => write!(f, "game is over"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoError {
    OutOfBounds,
    Occupied,
    IllegalMove(Violation),
    NotFound,
}

impl fmt::Display for GoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoError::OutOfBounds => write!(f, "out of bounds"),
            GoError::Occupied => write!(f, "occupied"),
            GoError::IllegalMove(v) => write!(f, "illegal move: {v}"),
            GoError::NotFound => write!(f, "no stone at point"),
        }
    }
}

impl std::error::Error for GoError {}

impl From<Violation> for GoError {
    fn from(v: Violation) -> Self {
        GoError::IllegalMove(v)
    }
}
