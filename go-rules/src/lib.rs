pub mod board;
pub mod config;
pub mod error;
pub mod game;
pub mod legality;
pub mod moves;
pub mod player;
pub mod point;
pub mod replay;
mod zobrist;

pub use board::{Board, Group};
pub use config::{ConfigError, GameConfig, KoRule};
pub use error::{GoError, Violation};
pub use game::{Ancestors, Captures, GameState, Phase, Snapshot};
pub use moves::Move;
pub use player::Player;
pub use point::Point;
pub use replay::{ReplayError, replay, replay_from};
pub use zobrist::MAX_BOARD_SIZE;
