//! Enemy entities
//!
//! Enemy creation, per-level scaling and the random walk they use to move.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::world::{Direction, Position};

/// Names an enemy can be given
pub const ENEMY_NAMES: [&str; 2] = ["Goblin", "Ork"];

/// A hostile creature on the map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enemy {
    pub name: String,
    pub health: i32,
    pub attack: i32,
    pub defense: i32,
    pub position: Position,
}

impl Enemy {
    pub fn new(name: impl Into<String>, health: i32, attack: i32, defense: i32, position: Position) -> Self {
        Self {
            name: name.into(),
            health,
            attack,
            defense,
            position,
        }
    }

    /// Roll a level 1 enemy: 20..=69 health, 5..=9 attack, 2..=6 defense
    pub fn random(position: Position, rng: &mut impl Rng) -> Self {
        let name = ENEMY_NAMES[rng.gen_range(0..ENEMY_NAMES.len())];
        Self::new(
            name,
            rng.gen_range(20..70),
            rng.gen_range(5..10),
            rng.gen_range(2..7),
            position,
        )
    }

    /// Strengthen an enemy spawned on a later level
    pub fn scale_for_level(&mut self, level: u32) {
        let level = level as i32;
        self.health += level * 5;
        self.attack += level * 2;
        self.defense += level;
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    /// Subtract health, returns true if the enemy died
    pub fn take_damage(&mut self, amount: i32) -> bool {
        self.health -= amount;
        self.is_dead()
    }

    /// Step one cell in a random direction, staying put if that leaves the map
    ///
    /// Enemies may end up sharing a cell with each other or with a trap.
    pub fn wander(&mut self, rng: &mut impl Rng, width: i32, height: i32) -> bool {
        let next = self.position.step(Direction::random(rng));
        if next.x >= 0 && next.x < width && next.y >= 0 && next.y < height {
            self.position = next;
            true
        } else {
            false
        }
    }
}

/// Spawn an enemy with level scaling applied (level 1 spawns are unscaled)
pub fn spawn_enemy_scaled(position: Position, level: u32, rng: &mut impl Rng) -> Enemy {
    let mut enemy = Enemy::random(position, rng);
    if level > 1 {
        enemy.scale_for_level(level);
    }
    enemy
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_enemy_ranges() {
        let mut rng = StdRng::seed_from_u64(21);
        for _ in 0..200 {
            let enemy = Enemy::random(Position::new(1, 1), &mut rng);
            assert!(ENEMY_NAMES.contains(&enemy.name.as_str()));
            assert!((20..=69).contains(&enemy.health));
            assert!((5..=9).contains(&enemy.attack));
            assert!((2..=6).contains(&enemy.defense));
        }
    }

    #[test]
    fn test_scaling() {
        let mut enemy = Enemy::new("Ork", 30, 6, 3, Position::ORIGIN);
        enemy.scale_for_level(2);
        assert_eq!((enemy.health, enemy.attack, enemy.defense), (40, 10, 5));
    }

    #[test]
    fn test_wander_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut enemy = Enemy::new("Goblin", 30, 6, 3, Position::ORIGIN);
        for _ in 0..500 {
            let before = enemy.position;
            let moved = enemy.wander(&mut rng, 2, 2);
            assert!(enemy.position.x >= 0 && enemy.position.x < 2);
            assert!(enemy.position.y >= 0 && enemy.position.y < 2);
            assert_eq!(moved, before != enemy.position);
            if moved {
                assert_eq!(before.distance(&enemy.position), 1);
            }
        }
    }
}
