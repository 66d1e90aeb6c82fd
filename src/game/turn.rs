//! Turn resolution
//!
//! One player command moves the whole world forward: the player steps, traps
//! spring, enemies wander and any enemy sharing the player's cell is fought.

use rand::Rng;

use super::state::{GroundItem, MessageCategory, SessionEnd, TurnOutcome, World};
use crate::combat::{fight, BattleInput, BattleResult};
use crate::entities::{ItemUse, ItemUseError};
use crate::items::{generate_enemy_loot, InventoryError, ItemId};
use crate::world::Direction;

/// Percent chance an enemy moves on a given turn
pub const ENEMY_MOVE_CHANCE: u32 = 50;

/// Result of trying to pick something up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickupOutcome {
    PickedUp { name: String, id: ItemId },
    /// The item stays on the ground
    NoRoom { name: String },
    NothingHere,
}

impl World {
    /// Resolve one movement command
    pub fn player_turn(&mut self, direction: Direction, input: &mut impl BattleInput) -> TurnOutcome {
        let destination = self.player.position.step(direction);

        if self.map.contains(destination) {
            self.player.position = destination;

            if self.portal == Some(destination) {
                self.add_message("You step through the portal...", MessageCategory::System);
                return self.advance_level();
            }

            if let Some(end) = self.check_traps() {
                self.rebuild_projection();
                return TurnOutcome::Ended(end);
            }
        } else {
            self.add_message("You cannot go that way.", MessageCategory::Warning);
        }

        self.move_enemies();

        if let Some(end) = self.resolve_encounters(input) {
            self.rebuild_projection();
            return TurnOutcome::Ended(end);
        }

        self.rebuild_projection();
        TurnOutcome::Continue
    }

    /// Spring an undiscovered trap under the player
    ///
    /// Returns the session end if the trap was fatal.
    pub fn check_traps(&mut self) -> Option<SessionEnd> {
        let position = self.player.position;
        let trap = self.traps.iter_mut().find(|t| t.position == position)?;
        let damage = trap.trigger()?;
        let description = trap.description.clone();

        self.player.take_damage(damage);
        log::debug!("Trap at ({}, {}) dealt {}", position.x, position.y, damage);
        self.add_message(
            format!("You triggered a trap: {}! You take {} damage.", description, damage),
            MessageCategory::Combat,
        );

        if self.player.is_dead() {
            self.add_message("The trap was fatal.", MessageCategory::Combat);
            return Some(SessionEnd::Defeat {
                cause: format!("Killed by a trap ({})", description),
            });
        }
        None
    }

    /// Every enemy takes a random step half of the time
    fn move_enemies(&mut self) {
        let (width, height) = (self.map.width, self.map.height);
        for enemy in self.enemies.iter_mut() {
            if self.rng.gen_range(0..100) < ENEMY_MOVE_CHANCE {
                enemy.wander(&mut self.rng, width, height);
            }
        }
    }

    /// Fight every enemy standing on the player's cell, in array order
    fn resolve_encounters(&mut self, input: &mut impl BattleInput) -> Option<SessionEnd> {
        let mut index = 0;
        while index < self.enemies.len() {
            if self.enemies[index].position != self.player.position {
                index += 1;
                continue;
            }

            let name = self.enemies[index].name.clone();
            self.add_message(format!("You encountered a {}!", name), MessageCategory::Combat);

            let result = fight(&mut self.player, &mut self.enemies[index], input, &mut self.rng);
            match result {
                BattleResult::Won { gold } => {
                    self.add_message(
                        format!("You defeated the {} and found {} gold.", name, gold),
                        MessageCategory::Combat,
                    );
                    self.record_enemy_defeat();
                    self.drop_enemy_loot();
                    self.remove_enemy(index);
                    self.pause_requested = true;
                }
                BattleResult::Fled => {
                    self.add_message(
                        format!("You escaped from the {}.", name),
                        MessageCategory::Combat,
                    );
                    index += 1;
                }
                BattleResult::Lost => {
                    self.add_message(
                        format!("You were defeated by the {}.", name),
                        MessageCategory::Combat,
                    );
                    log::info!("{} fell to a {} on level {}", self.player.name, name, self.level);
                    return Some(SessionEnd::Defeat {
                        cause: format!("Slain by a {}", name),
                    });
                }
            }
        }
        None
    }

    /// Roll a drop and put it in the inventory, or on the ground if it does not fit
    fn drop_enemy_loot(&mut self) {
        let Some(item) = generate_enemy_loot(&mut self.rng) else {
            self.add_message("The enemy dropped nothing.", MessageCategory::Item);
            return;
        };

        let name = item.name.clone();
        self.add_message(format!("The enemy dropped a {}!", name), MessageCategory::Item);

        match self.player.store_item(item) {
            Ok(_) => {
                self.add_message(format!("You obtained the {}.", name), MessageCategory::Item);
            }
            Err(item) => {
                let position = self.player.position;
                if self.add_ground_item(position, item) {
                    self.add_message(
                        format!("No room in your inventory; the {} lies on the ground.", name),
                        MessageCategory::Item,
                    );
                }
            }
        }
    }

    /// Pick up the first ground item on the player's cell
    pub fn pickup(&mut self) -> PickupOutcome {
        let position = self.player.position;
        let Some(index) = self.ground_items.iter().position(|g| g.position == position) else {
            self.add_message("There is nothing here to pick up.", MessageCategory::Item);
            return PickupOutcome::NothingHere;
        };

        let ground = self.ground_items.remove(index);
        let name = ground.item.name.clone();
        let outcome = match self.player.store_item(ground.item) {
            Ok(id) => {
                self.add_message(format!("Picked up the {}!", name), MessageCategory::Item);
                PickupOutcome::PickedUp { name, id }
            }
            Err(item) => {
                self.ground_items.insert(index, GroundItem { position, item });
                self.add_message(
                    format!("You have no room for the {}.", name),
                    MessageCategory::Warning,
                );
                PickupOutcome::NoRoom { name }
            }
        };

        self.rebuild_projection();
        outcome
    }

    /// Use the item anchored at inventory cell (x, y)
    pub fn use_inventory_item(&mut self, x: u8, y: u8) -> Result<ItemUse, ItemUseError> {
        let used = self.player.use_item_at(x, y)?;

        let mut effects = Vec::new();
        if used.healed > 0 {
            effects.push(format!("+{} HP", used.healed));
        }
        if used.attack_gained > 0 {
            effects.push(format!("+{} ATK", used.attack_gained));
        }
        if used.defense_gained > 0 {
            effects.push(format!("+{} DEF", used.defense_gained));
        }
        let summary = if effects.is_empty() {
            "no effect".to_string()
        } else {
            effects.join(", ")
        };
        self.add_message(format!("Used {} ({}).", used.name, summary), MessageCategory::Item);
        Ok(used)
    }

    /// Move an inventory item between anchors, keeping it in place on failure
    pub fn move_inventory_item(
        &mut self,
        from: (u8, u8),
        to: (u8, u8),
    ) -> Result<ItemId, InventoryError> {
        let id = self.player.inventory.move_item(from.0, from.1, to.0, to.1)?;
        self.add_message(
            format!("Moved item from ({}, {}) to ({}, {}).", from.0, from.1, to.0, to.1),
            MessageCategory::Item,
        );
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::BattleAction;
    use crate::data::GameConfig;
    use crate::entities::{Enemy, Player};
    use crate::game::GameMessage;
    use crate::items::templates;
    use crate::world::Position;

    fn quiet_world(seed: u64) -> World {
        let mut world = World::with_seed("Tester", GameConfig::default(), seed);
        world.enemies.clear();
        world.traps.clear();
        world.ground_items.clear();
        world.rebuild_projection();
        world.drain_messages();
        world
    }

    fn attack() -> impl FnMut(&Player, &Enemy) -> BattleAction {
        |_: &Player, _: &Enemy| BattleAction::Attack
    }

    #[test]
    fn test_move_in_bounds() {
        let mut world = quiet_world(1);
        assert_eq!(world.player_turn(Direction::Right, &mut attack()), TurnOutcome::Continue);
        assert_eq!(world.player().position, Position::new(1, 0));
        assert_eq!(world.player_turn(Direction::Down, &mut attack()), TurnOutcome::Continue);
        assert_eq!(world.player().position, Position::new(1, 1));
        assert_eq!(world.map().get(1, 1), Some(crate::world::TileType::Player));
    }

    #[test]
    fn test_blocked_move_still_passes_turn() {
        let mut world = quiet_world(2);
        world.player_turn(Direction::Up, &mut attack());
        assert_eq!(world.player().position, Position::ORIGIN);
        assert!(world
            .drain_messages()
            .iter()
            .any(|m| m.category == MessageCategory::Warning));
    }

    #[test]
    fn test_trap_triggers_once() {
        let mut world = quiet_world(3);
        let mut trap = crate::entities::Trap::random(Position::new(1, 0), &mut world.rng);
        trap.damage = 12;
        world.traps.push(trap);

        world.player_turn(Direction::Right, &mut attack());
        assert_eq!(world.player().health, 188);
        assert!(world.traps()[0].discovered);

        world.player_turn(Direction::Left, &mut attack());
        world.player_turn(Direction::Right, &mut attack());
        assert_eq!(world.player().health, 188);
    }

    #[test]
    fn test_fatal_trap_ends_session() {
        let mut world = quiet_world(4);
        world.player_mut().health = 5;
        let mut trap = crate::entities::Trap::random(Position::new(0, 1), &mut world.rng);
        trap.damage = 10;
        world.traps.push(trap);

        let outcome = world.player_turn(Direction::Down, &mut attack());
        assert!(matches!(outcome, TurnOutcome::Ended(SessionEnd::Defeat { .. })));
    }

    #[test]
    fn test_portal_advances_level() {
        let mut world = quiet_world(5);
        world.portal = Some(Position::new(1, 0));
        let outcome = world.player_turn(Direction::Right, &mut attack());
        assert_eq!(outcome, TurnOutcome::LevelChanged { level: 2 });
        assert_eq!(world.player().position, Position::ORIGIN);
    }

    #[test]
    fn test_battle_on_shared_cell() {
        let mut world = quiet_world(6);
        // A one-by-one map pins the enemy to the player's cell
        world.map = crate::world::Map::new(1, 1);
        world.enemies.push(Enemy::new("Goblin", 1, 5, 2, Position::ORIGIN));

        let outcome = world.player_turn(Direction::Right, &mut attack());
        assert_eq!(outcome, TurnOutcome::Continue);
        assert!(world.enemies().is_empty());
        assert_eq!(world.level_kills(), 1);
        assert_eq!(world.total_kills(), 1);
        assert!(world.player().gold >= 25);
        assert!(world.take_pause_request());
        assert!(!world.take_pause_request());
    }

    /// World with a full one-cell inventory and a one-hit enemy on the player
    fn cornered_world(seed: u64, ground_items: usize) -> World {
        let mut world = quiet_world(seed);
        world.map = crate::world::Map::new(1, 1);
        world.player_mut().inventory = crate::items::InventoryGrid::new(1, 1);
        world.player_mut().inventory.add_item(templates::health_potion()).unwrap();
        for _ in 0..ground_items {
            world.add_ground_item(Position::ORIGIN, templates::health_potion());
        }
        world.enemies.push(Enemy::new("Goblin", 1, 5, 2, Position::ORIGIN));
        world.drain_messages();
        world
    }

    fn dropped_something(messages: &[GameMessage]) -> bool {
        messages.iter().any(|m| m.text.starts_with("The enemy dropped a"))
    }

    #[test]
    fn test_drop_without_room_lands_on_player_cell() {
        let mut drops = 0;
        for seed in 0..30 {
            let mut world = cornered_world(seed, 0);
            world.player_turn(Direction::Right, &mut attack());
            assert!(world.enemies().is_empty());
            assert_eq!(world.player().inventory.count(), 1);

            let messages = world.drain_messages();
            if dropped_something(&messages) {
                drops += 1;
                assert_eq!(world.ground_items().len(), 1);
                assert_eq!(world.ground_items()[0].position, world.player().position);
            } else {
                assert!(world.ground_items().is_empty());
            }
        }
        assert!(drops > 0);
    }

    #[test]
    fn test_drop_past_ground_cap_is_discarded() {
        let cap = GameConfig::default().max_ground_items;
        let mut drops = 0;
        for seed in 0..30 {
            let mut world = cornered_world(seed, cap);
            assert_eq!(world.ground_items().len(), cap);
            world.player_turn(Direction::Right, &mut attack());

            let messages = world.drain_messages();
            assert_eq!(world.ground_items().len(), cap);
            if dropped_something(&messages) {
                drops += 1;
                assert!(messages.iter().any(|m| {
                    m.category == MessageCategory::Warning && m.text.contains("no room on the ground")
                }));
            }
        }
        assert!(drops > 0);
    }

    #[test]
    fn test_pickup() {
        let mut world = quiet_world(7);
        assert_eq!(world.pickup(), PickupOutcome::NothingHere);

        world.add_ground_item(Position::ORIGIN, templates::health_potion());
        world.add_ground_item(Position::ORIGIN, templates::health_potion());
        match world.pickup() {
            PickupOutcome::PickedUp { name, .. } => assert_eq!(name, "Potion of Health"),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(world.ground_items().len(), 1);
        assert_eq!(world.player().inventory.count(), 1);
    }

    #[test]
    fn test_pickup_without_room_keeps_item() {
        let mut world = quiet_world(8);
        world.player_mut().inventory = crate::items::InventoryGrid::new(1, 1);
        world.player_mut().inventory.add_item(templates::health_potion()).unwrap();

        world.add_ground_item(Position::ORIGIN, templates::health_potion());
        assert!(matches!(world.pickup(), PickupOutcome::NoRoom { .. }));
        assert_eq!(world.ground_items().len(), 1);
    }

    #[test]
    fn test_inventory_actions() {
        let mut world = quiet_world(9);
        world.player_mut().health = 100;
        world.player_mut().inventory.place(templates::health_potion(), 4, 4).unwrap();

        assert_eq!(
            world.move_inventory_item((0, 0), (1, 1)),
            Err(InventoryError::NoItemHere { x: 0, y: 0 })
        );
        world.move_inventory_item((4, 4), (0, 0)).unwrap();
        let used = world.use_inventory_item(0, 0).unwrap();
        assert!(used.consumed);
        assert_eq!(world.player().health, 130);
    }
}
