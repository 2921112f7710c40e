//! Snake on a wrapping grid.
//!
//! The library holds the game state engine and the seams around it: the
//! input adapter, the fixed-step scheduler, configuration and best-score
//! persistence. The `snake` binary puts a crossterm front-end on top.

pub mod config;
pub mod engine;
pub mod error;
pub mod food;
pub mod highscore;
pub mod input;
pub mod scheduler;
pub mod snake;

/// A position in grid units. Both components are multiples of the cell size.
pub type Coords = (i32, i32);

pub use crate::config::GameConfig;
pub use crate::engine::{GameEngine, GameEvent, SessionState, TickResult};
pub use crate::snake::{Direction, Snake};
