use serde::{Deserialize, Serialize};
use std::fmt;

use crate::zobrist::MAX_BOARD_SIZE;

/// Which earlier positions a play may not recreate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KoRule {
    /// Only the position right after the mover's previous move is off limits.
    #[default]
    Positional,
    /// No position that occurred earlier in the game may be repeated.
    Superko,
}

/// Settings fixed for the lifetime of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub board_size: u8,
    pub ko_rule: KoRule,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            board_size: 19,
            ko_rule: KoRule::Positional,
        }
    }
}

impl GameConfig {
    pub fn new(board_size: u8) -> Self {
        GameConfig {
            board_size,
            ..Default::default()
        }
    }

    pub fn with_ko_rule(mut self, ko_rule: KoRule) -> Self {
        self.ko_rule = ko_rule;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if (1..=MAX_BOARD_SIZE).contains(&self.board_size) {
            Ok(())
        } else {
            Err(ConfigError::InvalidBoardSize(self.board_size))
        }
    }

    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(s: &str) -> Result<Self, ConfigError> {
        let config: GameConfig =
            serde_json::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidBoardSize(u8),
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidBoardSize(size) => write!(
                f,
                "invalid board size {size}, expected 1 to {MAX_BOARD_SIZE}"
            ),
            ConfigError::Parse(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}
