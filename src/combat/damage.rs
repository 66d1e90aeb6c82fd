//! Damage calculation
//!
//! Two formulas: a normal hit and a critical hit. Both use truncating integer
//! division and never deal less than 1 damage.

use rand::Rng;

/// Percent chance an attack becomes a critical hit
pub const CRIT_CHANCE: u32 = 15;

/// Which formula an attack uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackKind {
    Normal,
    Critical,
}

impl AttackKind {
    /// Roll the critical chance
    pub fn roll(rng: &mut impl Rng) -> Self {
        if rng.gen_range(0..100) < CRIT_CHANCE {
            AttackKind::Critical
        } else {
            AttackKind::Normal
        }
    }

    pub fn damage(self, attack: i32, defense: i32, rng: &mut impl Rng) -> i32 {
        match self {
            AttackKind::Normal => normal_damage(attack, defense, rng),
            AttackKind::Critical => critical_damage(attack, defense, rng),
        }
    }
}

/// A single resolved hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strike {
    pub kind: AttackKind,
    pub damage: i32,
}

impl Strike {
    pub fn is_critical(&self) -> bool {
        self.kind == AttackKind::Critical
    }
}

/// max(1, attack/2 + uniform(0..=attack/2) - defense/3)
pub fn normal_damage(attack: i32, defense: i32, rng: &mut impl Rng) -> i32 {
    let half = (attack / 2).max(0);
    let roll = rng.gen_range(0..=half);
    half.saturating_add(roll).saturating_sub(defense / 3).max(1)
}

/// max(1, attack + uniform(0..=attack) - defense/4)
pub fn critical_damage(attack: i32, defense: i32, rng: &mut impl Rng) -> i32 {
    let attack = attack.max(0);
    let roll = rng.gen_range(0..=attack);
    attack.saturating_add(roll).saturating_sub(defense / 4).max(1)
}

/// Roll crit, then compute damage with the chosen formula
pub fn roll_strike(attack: i32, defense: i32, rng: &mut impl Rng) -> Strike {
    let kind = AttackKind::roll(rng);
    Strike {
        kind,
        damage: kind.damage(attack, defense, rng),
    }
}
