//! Entity models

pub mod player;
pub mod enemies;
pub mod traps;

pub use player::{Player, ItemUse, ItemUseError};
pub use enemies::{Enemy, spawn_enemy_scaled};
pub use traps::{Trap, spawn_trap_scaled};
