//! Item definitions
//!
//! Core item types and their footprints, symbols and bonuses.

use serde::{Deserialize, Serialize};
use super::grid::GridPosition;

/// Key of an item inside an inventory's item table
pub type ItemId = u64;

/// The kinds of items that exist in the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    HealthPotion,
    LongSword,
    PlateArmor,
}

impl ItemKind {
    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            ItemKind::HealthPotion => "Potion of Health",
            ItemKind::LongSword => "Long Sword",
            ItemKind::PlateArmor => "Plate Armor",
        }
    }

    /// Symbol shown on the item's anchor cell
    pub fn symbol(&self) -> char {
        match self {
            ItemKind::HealthPotion => 'H',
            ItemKind::LongSword => 'S',
            ItemKind::PlateArmor => 'A',
        }
    }

    /// Footprint as (width, height) in inventory cells
    pub fn grid_size(&self) -> (u8, u8) {
        match self {
            ItemKind::HealthPotion => (1, 1),
            ItemKind::LongSword => (1, 3),
            ItemKind::PlateArmor => (2, 3),
        }
    }

    /// Consumables disappear from the inventory once used
    pub fn is_consumable(&self) -> bool {
        matches!(self, ItemKind::HealthPotion)
    }
}

/// A placeable item
///
/// Items are plain values: picking one up or dropping it copies the record
/// between the ground and an inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub kind: ItemKind,
    pub name: String,
    pub symbol: char,
    /// Footprint (width, height)
    pub grid_size: (u8, u8),
    /// Top-left inventory cell while placed in an inventory
    pub anchor: Option<GridPosition>,
    pub attack_bonus: i32,
    pub defense_bonus: i32,
    pub health_bonus: i32,
    /// Gear bonus already applied to the player
    pub active: bool,
}

impl Item {
    /// Create an item of `kind` with no bonuses
    pub fn new(kind: ItemKind) -> Self {
        Self {
            kind,
            name: kind.name().to_string(),
            symbol: kind.symbol(),
            grid_size: kind.grid_size(),
            anchor: None,
            attack_bonus: 0,
            defense_bonus: 0,
            health_bonus: 0,
            active: false,
        }
    }

    pub fn width(&self) -> u8 {
        self.grid_size.0
    }

    pub fn height(&self) -> u8 {
        self.grid_size.1
    }

    /// An item is equipped while it sits in an inventory
    pub fn is_equipped(&self) -> bool {
        self.anchor.is_some()
    }

    pub fn is_consumable(&self) -> bool {
        self.kind.is_consumable()
    }

    /// Short description of the bonuses for display
    pub fn bonus_summary(&self) -> String {
        let mut parts = Vec::new();
        if self.health_bonus != 0 {
            parts.push(format!("+{} HP", self.health_bonus));
        }
        if self.attack_bonus != 0 {
            parts.push(format!("+{} ATK", self.attack_bonus));
        }
        if self.defense_bonus != 0 {
            parts.push(format!("+{} DEF", self.defense_bonus));
        }
        parts.join(", ")
    }
}

/// Item templates
pub mod templates {
    use rand::Rng;
    use super::{Item, ItemKind};

    /// Potion of Health: restores 30 health, 1x1
    pub fn health_potion() -> Item {
        let mut item = Item::new(ItemKind::HealthPotion);
        item.health_bonus = 30;
        item
    }

    /// Long Sword: +5..=19 attack, 1x3
    pub fn long_sword(rng: &mut impl Rng) -> Item {
        let mut item = Item::new(ItemKind::LongSword);
        item.attack_bonus = rng.gen_range(5..=19);
        item
    }

    /// Plate Armor: +5..=24 defense, 2x3
    pub fn plate_armor(rng: &mut impl Rng) -> Item {
        let mut item = Item::new(ItemKind::PlateArmor);
        item.defense_bonus = rng.gen_range(5..=24);
        item
    }

    /// Build an item of the given kind with freshly rolled bonuses
    pub fn roll(kind: ItemKind, rng: &mut impl Rng) -> Item {
        match kind {
            ItemKind::HealthPotion => health_potion(),
            ItemKind::LongSword => long_sword(rng),
            ItemKind::PlateArmor => plate_armor(rng),
        }
    }
}
