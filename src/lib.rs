//! GridRPG - a turn-based grid dungeon crawler
//!
//! Walk a small map, dodge hidden traps, fight what wanders into you and
//! juggle your loot in a grid inventory. Clear enough enemies to open the
//! portal to the next level.

pub mod data;
pub mod items;
pub mod entities;
pub mod world;
pub mod combat;
pub mod game;
pub mod save;
pub mod ui;

// Re-export commonly used types
pub use data::GameConfig;
pub use game::{World, SessionEnd, TurnOutcome};
pub use world::map::Map;
