//! Tile definitions
//!
//! What a single cell of the projected map shows.

use serde::{Deserialize, Serialize};

/// Types of tiles in the map projection
///
/// Variants are listed in layering order: when several things share a cell,
/// the later variant is the one that gets drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TileType {
    #[default]
    Floor,
    GroundItem,
    /// Only discovered traps are ever projected
    Trap,
    Enemy,
    Portal,
    Player,
}

impl TileType {
    /// Get the display character
    pub fn glyph(&self) -> char {
        match self {
            TileType::Floor => '.',
            TileType::GroundItem => 'I',
            TileType::Trap => 'T',
            TileType::Enemy => 'E',
            TileType::Portal => 'O',
            TileType::Player => 'P',
        }
    }
}
