//! Game settings, loadable from a JSON file.
//!
//! Every field has a default matching the classic board: 16 unit cells on a
//! 25x25 grid, snake starting at (160, 160) heading right with length 4.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::food::FoodPlacement;
use crate::snake::{Bounds, Direction};
use crate::Coords;

pub const CONFIG_ENV_VAR: &str = "SNAKE_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("read config '{path}': {source}")]
    Read { path: PathBuf, source: std::io::Error },

    #[error("parse config '{path}': {source}")]
    Parse { path: PathBuf, source: serde_json::Error },

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Cell size in units. All positions are multiples of it.
    pub grid_size: i32,
    pub board_width: i32,
    pub board_height: i32,
    /// Starting head cell, in cells (not units).
    pub start_cell: (i32, i32),
    pub start_direction: Direction,
    pub initial_length: usize,
    pub food_reward: u64,
    pub frames_per_tick: u32,
    pub frame_interval_ms: u64,
    pub sound_enabled: bool,
    pub food_placement: FoodPlacement,
    pub high_score_path: Option<PathBuf>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            grid_size: 16,
            board_width: 25,
            board_height: 25,
            start_cell: (10, 10),
            start_direction: Direction::Right,
            initial_length: 4,
            food_reward: 10,
            frames_per_tick: 4,
            frame_interval_ms: 16,
            sound_enabled: true,
            food_placement: FoodPlacement::Rejection,
            high_score_path: None,
        }
    }
}

impl GameConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        let config: GameConfig = serde_json::from_str(&raw)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads from an explicit path, else from `SNAKE_CONFIG`, else defaults.
    pub fn resolve(path: Option<PathBuf>) -> Result<Self, ConfigError> {
        match path.or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from)) {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size <= 0 {
            return Err(ConfigError::Invalid(format!("grid_size must be positive, got {}", self.grid_size)));
        }
        if self.board_width < 2 || self.board_height < 2 {
            return Err(ConfigError::Invalid(format!(
                "board must be at least 2x2 cells, got {}x{}",
                self.board_width, self.board_height
            )));
        }
        let (sx, sy) = self.start_cell;
        if sx < 0 || sy < 0 || sx >= self.board_width || sy >= self.board_height {
            return Err(ConfigError::Invalid(format!("start_cell ({}, {}) is off the board", sx, sy)));
        }
        if self.initial_length == 0 {
            return Err(ConfigError::Invalid("initial_length must be at least 1".into()));
        }
        if self.frames_per_tick == 0 {
            return Err(ConfigError::Invalid("frames_per_tick must be at least 1".into()));
        }
        Ok(())
    }

    pub fn bounds(&self) -> Bounds {
        Bounds {
            width: self.board_width * self.grid_size,
            height: self.board_height * self.grid_size,
        }
    }

    pub fn start_position(&self) -> Coords {
        (self.start_cell.0 * self.grid_size, self.start_cell.1 * self.grid_size)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}
