//! Game configuration.
//!
//! A `GameConfig` fixes the board shape, the number of players and the
//! per-player region cap for the lifetime of a game. Front ends may build
//! one directly or load it from JSON.

use std::collections::TryReserveError;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a game cannot be constructed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("board width must be positive")]
    ZeroWidth,

    #[error("board height must be positive")]
    ZeroHeight,

    #[error("player count must be positive")]
    ZeroPlayers,

    #[error("area limit must be positive")]
    ZeroAreaLimit,

    #[error("board {width}x{height} has more cells than this platform can address")]
    BoardTooLarge { width: u32, height: u32 },

    #[error("not enough memory for the game: {0}")]
    OutOfMemory(#[from] TryReserveError),

    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parameters of a single game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameConfig {
    pub width: u32,
    pub height: u32,
    pub players: u32,
    pub areas_limit: u32,
}

impl GameConfig {
    pub const fn new(width: u32, height: u32, players: u32, areas_limit: u32) -> Self {
        GameConfig {
            width,
            height,
            players,
            areas_limit,
        }
    }

    /// Parses and validates a configuration such as
    /// `{"width":10,"height":10,"players":2,"areas_limit":3}`.
    pub fn from_json(s: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every parameter is positive and the board is addressable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 {
            return Err(ConfigError::ZeroWidth);
        }
        if self.height == 0 {
            return Err(ConfigError::ZeroHeight);
        }
        if self.players == 0 {
            return Err(ConfigError::ZeroPlayers);
        }
        if self.areas_limit == 0 {
            return Err(ConfigError::ZeroAreaLimit);
        }
        self.cell_count().map(|_| ())
    }

    /// Total number of cells, or `BoardTooLarge` if it overflows `usize`.
    pub fn cell_count(&self) -> Result<usize, ConfigError> {
        (self.width as usize)
            .checked_mul(self.height as usize)
            .ok_or(ConfigError::BoardTooLarge {
                width: self.width,
                height: self.height,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_zeroes() {
        assert!(matches!(
            GameConfig::new(0, 10, 2, 2).validate(),
            Err(ConfigError::ZeroWidth)
        ));
        assert!(matches!(
            GameConfig::new(10, 0, 2, 2).validate(),
            Err(ConfigError::ZeroHeight)
        ));
        assert!(matches!(
            GameConfig::new(10, 10, 0, 2).validate(),
            Err(ConfigError::ZeroPlayers)
        ));
        assert!(matches!(
            GameConfig::new(10, 10, 2, 0).validate(),
            Err(ConfigError::ZeroAreaLimit)
        ));
        assert!(GameConfig::new(1, 1, 1, 1).validate().is_ok());
    }

    #[test]
    fn cell_count_multiplies() {
        assert_eq!(GameConfig::new(7, 9, 2, 4).cell_count().unwrap(), 63);
        assert_eq!(
            GameConfig::new(u32::MAX, 2, 2, 2).cell_count().unwrap(),
            u32::MAX as usize * 2
        );
    }

    #[test]
    fn json_roundtrip() {
        let config = GameConfig::new(10, 10, 2, 3);
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(GameConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn json_errors() {
        assert!(matches!(
            GameConfig::from_json("{\"width\":10}"),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            GameConfig::from_json(r#"{"width":3,"height":3,"players":0,"areas_limit":1}"#),
            Err(ConfigError::ZeroPlayers)
        ));
    }

    #[test]
    fn error_messages() {
        let err = ConfigError::BoardTooLarge { width: 5, height: 6 };
        assert_eq!(
            err.to_string(),
            "board 5x6 has more cells than this platform can address"
        );
        assert_eq!(ConfigError::ZeroAreaLimit.to_string(), "area limit must be positive");
    }
}
