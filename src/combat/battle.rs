//! Battle resolution
//!
//! A battle is a loop of rounds between the player and one enemy. The caller
//! supplies the player's choice each round through [`BattleInput`], so the same
//! resolver drives both the console prompt and scripted tests.

use rand::Rng;

use super::damage::{normal_damage, roll_strike, AttackKind, Strike};
use crate::entities::{Enemy, Player};
use crate::items::generate_gold_drop;

/// Percent chance a flee attempt succeeds
pub const FLEE_CHANCE: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleAction {
    Attack,
    Flee,
}

/// What happened during one round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoundReport {
    /// The player's hit, if they attacked
    pub player_strike: Option<Strike>,
    /// `Some(success)` if the player tried to flee
    pub flee_attempt: Option<bool>,
    /// Damage the enemy dealt back, if it acted
    pub enemy_damage: Option<i32>,
}

impl RoundReport {
    pub fn fled(&self) -> bool {
        self.flee_attempt == Some(true)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleResult {
    Won { gold: u32 },
    Fled,
    Lost,
}

/// Source of the player's decisions during a battle
pub trait BattleInput {
    fn choose_action(&mut self, player: &Player, enemy: &Enemy) -> BattleAction;

    /// Called after every round with the updated combatants
    fn round_resolved(&mut self, _report: &RoundReport, _player: &Player, _enemy: &Enemy) {}
}

impl<F> BattleInput for F
where
    F: FnMut(&Player, &Enemy) -> BattleAction,
{
    fn choose_action(&mut self, player: &Player, enemy: &Enemy) -> BattleAction {
        self(player, enemy)
    }
}

/// Resolve a single round for the given player action
pub fn resolve_round(
    player: &mut Player,
    enemy: &mut Enemy,
    action: BattleAction,
    rng: &mut impl Rng,
) -> RoundReport {
    let mut report = RoundReport::default();

    match action {
        BattleAction::Attack => {
            let strike = roll_strike(player.attack, enemy.defense, rng);
            enemy.take_damage(strike.damage);
            report.player_strike = Some(strike);
        }
        BattleAction::Flee => {
            let escaped = rng.gen_range(0..100) < FLEE_CHANCE;
            report.flee_attempt = Some(escaped);
            if escaped {
                return report;
            }
        }
    }

    if !enemy.is_dead() {
        let damage = normal_damage(enemy.attack, player.defense, rng);
        player.take_damage(damage);
        report.enemy_damage = Some(damage);
    }

    report
}

/// Fight until one side falls or the player escapes
///
/// On victory the gold reward is added to the player. Kill counters are the
/// caller's concern.
pub fn fight(
    player: &mut Player,
    enemy: &mut Enemy,
    input: &mut impl BattleInput,
    rng: &mut impl Rng,
) -> BattleResult {
    log::debug!("{} engages {} ({} hp)", player.name, enemy.name, enemy.health);

    loop {
        let action = input.choose_action(player, enemy);
        let report = resolve_round(player, enemy, action, rng);
        input.round_resolved(&report, player, enemy);

        if report.fled() {
            return BattleResult::Fled;
        }
        if enemy.is_dead() {
            let gold = generate_gold_drop(rng);
            player.gold = player.gold.saturating_add(gold);
            return BattleResult::Won { gold };
        }
        if player.is_dead() {
            return BattleResult::Lost;
        }
    }
}

/// Verb used in battle messages
pub fn describe_strike(strike: &Strike) -> &'static str {
    match strike.kind {
        AttackKind::Normal => "hit",
        AttackKind::Critical => "critically hit",
    }
}

/// Lines describing one round from the player's point of view
pub fn describe_round(report: &RoundReport, enemy_name: &str) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(strike) = &report.player_strike {
        lines.push(format!(
            "You {} the {} for {} damage!",
            describe_strike(strike),
            enemy_name,
            strike.damage
        ));
    }
    match report.flee_attempt {
        Some(true) => lines.push("You managed to escape!".to_string()),
        Some(false) => lines.push("You failed to escape!".to_string()),
        None => {}
    }
    if let Some(damage) = report.enemy_damage {
        lines.push(format!("The {} deals {} damage to you!", enemy_name, damage));
    }
    lines
}
