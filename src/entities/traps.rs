//! Trap entities

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::world::Position;

pub const TRAP_DESCRIPTIONS: [&str; 2] = ["Spikes", "Falling boulders"];

/// A hidden hazard that hurts the player once
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trap {
    pub position: Position,
    pub damage: i32,
    /// Sticky once the player has stepped on it
    pub discovered: bool,
    pub description: String,
}

impl Trap {
    /// Roll a level 1 trap dealing 5..=19 damage
    pub fn random(position: Position, rng: &mut impl Rng) -> Self {
        Self {
            position,
            damage: rng.gen_range(5..20),
            discovered: false,
            description: TRAP_DESCRIPTIONS[rng.gen_range(0..TRAP_DESCRIPTIONS.len())].to_string(),
        }
    }

    pub fn scale_for_level(&mut self, level: u32) {
        self.damage += level as i32 * 2;
    }

    /// Spring the trap; returns the damage to apply, or `None` if it was already found
    pub fn trigger(&mut self) -> Option<i32> {
        if self.discovered {
            return None;
        }
        self.discovered = true;
        Some(self.damage)
    }
}

/// Spawn a trap with level scaling applied (level 1 spawns are unscaled)
pub fn spawn_trap_scaled(position: Position, level: u32, rng: &mut impl Rng) -> Trap {
    let mut trap = Trap::random(position, rng);
    if level > 1 {
        trap.scale_for_level(level);
    }
    trap
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_trigger_once() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut trap = Trap::random(Position::new(2, 2), &mut rng);
        let damage = trap.damage;
        assert!((5..=19).contains(&damage));

        assert_eq!(trap.trigger(), Some(damage));
        assert!(trap.discovered);
        assert_eq!(trap.trigger(), None);
        assert!(trap.discovered);
    }

    #[test]
    fn test_scaled_spawn() {
        let mut rng = StdRng::seed_from_u64(4);
        let base = Trap::random(Position::ORIGIN, &mut rng);
        let mut rng = StdRng::seed_from_u64(4);
        let scaled = spawn_trap_scaled(Position::ORIGIN, 3, &mut rng);
        assert_eq!(scaled.damage, base.damage + 6);
    }
}
