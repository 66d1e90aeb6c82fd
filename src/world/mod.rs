//! World module
//!
//! Positions, the map projection, tiles, and spawn placement.

pub mod position;
pub mod map;
pub mod tile;
pub mod generation;

pub use position::{Position, Direction};
pub use map::Map;
pub use tile::TileType;
