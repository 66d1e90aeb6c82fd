//! Player entity

use rand::Rng;
use thiserror::Error;

use crate::items::{InventoryError, InventoryGrid, Item, ItemId};
use crate::world::Position;

/// Starting stats
pub const STARTING_MAX_HEALTH: i32 = 200;
pub const STARTING_ATTACK: i32 = 17;
pub const STARTING_GOLD: u32 = 15;

/// Longest accepted player name, in characters
pub const MAX_NAME_LEN: usize = 49;

/// Name used when the player enters nothing
const DEFAULT_NAME: &str = "Hero";

/// Why using an inventory item failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemUseError {
    #[error(transparent)]
    Inventory(#[from] InventoryError),
    #[error("{0} is already in use")]
    AlreadyActive(String),
}

/// What using an item did to the player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemUse {
    pub name: String,
    pub healed: i32,
    pub attack_gained: i32,
    pub defense_gained: i32,
    /// The item was used up and left the inventory
    pub consumed: bool,
}

/// The player character
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub name: String,
    pub health: i32,
    pub max_health: i32,
    pub attack: i32,
    pub defense: i32,
    pub position: Position,
    pub gold: u32,
    pub inventory: InventoryGrid,
}

impl Player {
    /// Create a player with the starting stats at the map origin
    pub fn new(name: &str, inventory: InventoryGrid, rng: &mut impl Rng) -> Self {
        Self {
            name: sanitize_name(name),
            health: STARTING_MAX_HEALTH,
            max_health: STARTING_MAX_HEALTH,
            attack: STARTING_ATTACK,
            defense: rng.gen_range(5..15),
            position: Position::ORIGIN,
            gold: STARTING_GOLD,
            inventory,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    /// Subtract health, returns true if the player died
    pub fn take_damage(&mut self, amount: i32) -> bool {
        self.health -= amount;
        self.is_dead()
    }

    /// Heal up to max health, returns the amount actually restored
    pub fn heal(&mut self, amount: i32) -> i32 {
        let before = self.health;
        self.health = (self.health + amount).min(self.max_health);
        (self.health - before).max(0)
    }

    /// Entering a new level restores health to 80% of max (at least 1)
    pub fn restore_for_new_level(&mut self) {
        self.health = (self.max_health * 4 / 5).max(1);
    }

    /// Put an item into the first free inventory slot
    pub fn store_item(&mut self, item: Item) -> Result<ItemId, Item> {
        self.inventory.add_item(item)
    }

    /// Use the item anchored at inventory cell (x, y)
    pub fn use_item_at(&mut self, x: u8, y: u8) -> Result<ItemUse, ItemUseError> {
        if !self.inventory.is_valid_position(x, y) {
            return Err(InventoryError::OutOfBounds { x, y }.into());
        }
        let id = self
            .inventory
            .anchor_at(x, y)
            .ok_or(InventoryError::NoItemHere { x, y })?;
        let item = match self.inventory.get(id) {
            Some(item) => item.clone(),
            None => return Err(InventoryError::NoItemHere { x, y }.into()),
        };

        if !item.is_consumable() && item.active {
            return Err(ItemUseError::AlreadyActive(item.name));
        }

        let healed = self.heal(item.health_bonus);
        self.attack += item.attack_bonus;
        self.defense += item.defense_bonus;

        let consumed = item.is_consumable();
        if consumed {
            self.inventory.remove(id);
        } else {
            self.inventory.mark_active(id);
        }

        log::debug!("{} used {}", self.name, item.name);
        Ok(ItemUse {
            name: item.name,
            healed,
            attack_gained: item.attack_bonus,
            defense_gained: item.defense_bonus,
            consumed,
        })
    }
}

/// Trim a typed name and cap its length
pub fn sanitize_name(name: &str) -> String {
    let trimmed: String = name.trim().chars().take(MAX_NAME_LEN).collect();
    if trimmed.is_empty() {
        DEFAULT_NAME.to_string()
    } else {
        trimmed
    }
}
