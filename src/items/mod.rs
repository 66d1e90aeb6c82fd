//! Item system

pub mod item;
pub mod grid;
pub mod loot;

pub use item::{Item, ItemId, ItemKind, templates};
pub use grid::{InventoryGrid, GridPosition, InventoryError, GRID_WIDTH, GRID_HEIGHT};
pub use loot::{generate_floor_loot, generate_enemy_loot, generate_gold_drop};
