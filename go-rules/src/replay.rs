use std::fmt;
use std::sync::Arc;

use crate::config::{ConfigError, GameConfig};
use crate::error::GoError;
use crate::game::GameState;
use crate::moves::Move;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayError {
    Config(ConfigError),
    /// The move at `index` (zero-based) was refused.
    Move {
        index: usize,
        mv: Move,
        error: GoError,
    },
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplayError::Config(e) => write!(f, "{e}"),
            ReplayError::Move { index, mv, error } => {
                write!(f, "move {} ({mv}) rejected: {error}", index + 1)
            }
        }
    }
}

impl std::error::Error for ReplayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReplayError::Config(e) => Some(e),
            ReplayError::Move { error, .. } => Some(error),
        }
    }
}

impl From<ConfigError> for ReplayError {
    fn from(e: ConfigError) -> Self {
        ReplayError::Config(e)
    }
}

/// Play a recorded move sequence from an empty board, stopping at the first
/// move the rules refuse.
pub fn replay<I>(config: &GameConfig, moves: I) -> Result<Arc<GameState>, ReplayError>
where
    I: IntoIterator<Item = Move>,
{
    let root = GameState::with_config(config)?;
    replay_from(&root, moves)
}

/// Like [`replay`], continuing from an existing state.
pub fn replay_from<I>(start: &Arc<GameState>, moves: I) -> Result<Arc<GameState>, ReplayError>
where
    I: IntoIterator<Item = Move>,
{
    let mut state = Arc::clone(start);
    for (index, mv) in moves.into_iter().enumerate() {
        state = state.apply_move(mv).map_err(|error| {
            tracing::debug!("replay stopped at move {}: {error}", index + 1);
            ReplayError::Move { index, mv, error }
        })?;
    }
    Ok(state)
}
