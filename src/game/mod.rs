//! Game module - world state and turn resolution

mod state;
mod turn;

pub use state::{World, SessionEnd, TurnOutcome, GroundItem, GameMessage, MessageCategory, StatusLine};
pub use turn::{PickupOutcome, ENEMY_MOVE_CHANCE};
