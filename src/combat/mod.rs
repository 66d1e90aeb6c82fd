//! Combat system

pub mod damage;
pub mod battle;

pub use damage::{AttackKind, Strike, normal_damage, critical_damage, roll_strike, CRIT_CHANCE};
pub use battle::{BattleAction, BattleInput, BattleResult, RoundReport, fight, resolve_round, describe_strike, describe_round};
