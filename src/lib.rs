//! Classic snake on a fixed grid.
//!
//! - `engine`: the game state machine, free of I/O
//! - `clock`: fixed-rate tick scheduling
//! - `game`: the single-threaded loop tying input, ticks and rendering together
//! - `term`: crossterm screen handling

pub mod clock;
pub mod config;
pub mod engine;
pub mod game;
pub mod input;
pub mod snake;
pub mod term;

pub type TermInt = u16;
pub type Coords = (u16, u16);

pub use config::{CollisionRule, ConfigError, GameConfig};
pub use engine::{BoardFull, Engine, Ending, RunState, Snapshot, Step};
pub use snake::{Cell, Direction};
