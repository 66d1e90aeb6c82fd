//! Loot generation
//!
//! Drop tables for items scattered on a fresh level and items dropped by
//! defeated enemies.

use rand::Rng;
use super::item::{templates, Item, ItemKind};

/// Percent chance that a defeated enemy drops anything at all
pub const ENEMY_DROP_CHANCE: u32 = 90;

/// Pick an item kind from a 0-99 roll and two cumulative thresholds
fn kind_for_roll(roll: u32, potion_below: u32, sword_below: u32) -> ItemKind {
    if roll < potion_below {
        ItemKind::HealthPotion
    } else if roll < sword_below {
        ItemKind::LongSword
    } else {
        ItemKind::PlateArmor
    }
}

/// Roll an item lying on the floor of a new level (50% potion, 25% sword, 25% armor)
pub fn generate_floor_loot(rng: &mut impl Rng) -> Item {
    let kind = kind_for_roll(rng.gen_range(0..100), 50, 75);
    templates::roll(kind, rng)
}

/// Roll the drop of a defeated enemy
///
/// 90% of enemies drop something: 60% potion, 30% sword, 10% armor.
pub fn generate_enemy_loot(rng: &mut impl Rng) -> Option<Item> {
    if rng.gen_range(0..100) >= ENEMY_DROP_CHANCE {
        return None;
    }
    let kind = kind_for_roll(rng.gen_range(0..100), 60, 90);
    Some(templates::roll(kind, rng))
}

/// Gold awarded for defeating an enemy (10..=29)
pub fn generate_gold_drop(rng: &mut impl Rng) -> u32 {
    rng.gen_range(10..30)
}
