//! World state
//!
//! Owns every entity of a session plus the level counters, and keeps the map
//! projection in sync with them.

use std::fmt;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::data::GameConfig;
use crate::entities::{spawn_enemy_scaled, spawn_trap_scaled, Enemy, Player, Trap};
use crate::items::{generate_floor_loot, InventoryGrid, Item};
use crate::world::generation::{ground_item_count, pick_free_cell};
use crate::world::{Map, Position, TileType};

/// Oldest messages are dropped beyond this
const MAX_MESSAGES: usize = 100;

/// How a session finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    /// Took the portal on the final level
    Victory { total_kills: u32 },
    Defeat { cause: String },
    Quit,
}

/// Result of one player turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    Continue,
    LevelChanged { level: u32 },
    Ended(SessionEnd),
}

/// An item lying on the map
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroundItem {
    pub position: Position,
    pub item: Item,
}

/// A message to display in the game log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameMessage {
    pub text: String,
    pub category: MessageCategory,
}

/// Categories for message filtering/coloring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageCategory {
    Combat,
    Item,
    System,
    Warning,
}

/// Snapshot of the numbers shown under the map
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub name: String,
    pub level: u32,
    pub health: i32,
    pub max_health: i32,
    pub attack: i32,
    pub defense: i32,
    pub gold: u32,
    pub level_kills: u32,
    pub kill_threshold: u32,
    pub total_kills: u32,
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} | Level {} | HP {}/{} | ATK {} | DEF {} | Gold {}",
            self.name, self.level, self.health, self.max_health, self.attack, self.defense, self.gold
        )?;
        write!(
            f,
            "Kills this level: {}/{} | Total kills: {}",
            self.level_kills, self.kill_threshold, self.total_kills
        )
    }
}

/// A whole play session
#[derive(Debug, Clone)]
pub struct World {
    pub(crate) config: GameConfig,
    pub(crate) player: Player,
    pub(crate) enemies: Vec<Enemy>,
    pub(crate) traps: Vec<Trap>,
    pub(crate) ground_items: Vec<GroundItem>,
    /// Read-only projection, written only by `rebuild_projection`
    pub(crate) map: Map,
    pub(crate) level: u32,
    pub(crate) level_kills: u32,
    pub(crate) total_kills: u32,
    pub(crate) portal: Option<Position>,
    pub(crate) rng: StdRng,
    pub(crate) messages: Vec<GameMessage>,
    /// Set when the last turn had a battle worth pausing on
    pub(crate) pause_requested: bool,
}

/// Whether the player or one of the listed entities stands on `pos`
fn cell_taken(player: &Player, enemies: &[Enemy], traps: &[Trap], pos: Position) -> bool {
    player.position == pos
        || enemies.iter().any(|e| e.position == pos)
        || traps.iter().any(|t| t.position == pos)
}

impl World {
    /// Start a session, seeding the RNG from the config or from entropy
    pub fn new(name: &str, config: GameConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(name, config, rng)
    }

    /// Start a session with a fixed seed
    pub fn with_seed(name: &str, config: GameConfig, seed: u64) -> Self {
        Self::with_rng(name, config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(name: &str, config: GameConfig, mut rng: StdRng) -> Self {
        let inventory = InventoryGrid::new(config.inventory_width, config.inventory_height);
        let player = Player::new(name, inventory, &mut rng);
        let map = Map::new(config.map_width, config.map_height);

        let mut world = Self {
            config,
            player,
            enemies: Vec::new(),
            traps: Vec::new(),
            ground_items: Vec::new(),
            map,
            level: 1,
            level_kills: 0,
            total_kills: 0,
            portal: None,
            rng,
            messages: Vec::new(),
            pause_requested: false,
        };
        world.populate_level();
        world.rebuild_projection();

        log::info!(
            "Created world for {}: {} enemies, {} traps, {} ground items",
            world.player.name,
            world.enemies.len(),
            world.traps.len(),
            world.ground_items.len()
        );
        world.add_message(
            format!("Welcome, {}! Defeat enemies to open the portal.", world.player.name),
            MessageCategory::System,
        );
        world
    }

    /// Place this level's enemies, traps and ground items on free cells
    fn populate_level(&mut self) {
        self.enemies.clear();
        self.traps.clear();
        self.ground_items.clear();

        let bonus = (self.level / 2) as usize;
        let enemy_count = self.config.enemies_per_level + bonus;
        let trap_count = self.config.traps_per_level + bonus;
        let (width, height) = (self.map.width, self.map.height);

        for _ in 0..enemy_count {
            let taken = |pos| cell_taken(&self.player, &self.enemies, &self.traps, pos);
            let Some(pos) = pick_free_cell(&mut self.rng, width, height, taken) else {
                break;
            };
            let enemy = spawn_enemy_scaled(pos, self.level, &mut self.rng);
            log::debug!("Spawned {} at ({}, {})", enemy.name, pos.x, pos.y);
            self.enemies.push(enemy);
        }

        for _ in 0..trap_count {
            let taken = |pos| cell_taken(&self.player, &self.enemies, &self.traps, pos);
            let Some(pos) = pick_free_cell(&mut self.rng, width, height, taken) else {
                break;
            };
            let trap = spawn_trap_scaled(pos, self.level, &mut self.rng);
            log::debug!("Hid {} at ({}, {})", trap.description, pos.x, pos.y);
            self.traps.push(trap);
        }

        let items = ground_item_count(
            &mut self.rng,
            self.config.ground_items_min,
            self.config.ground_items_max,
        )
        .min(self.config.max_ground_items);
        for _ in 0..items {
            let taken = |pos| {
                cell_taken(&self.player, &self.enemies, &self.traps, pos)
                    || self.ground_items.iter().any(|g| g.position == pos)
            };
            let Some(pos) = pick_free_cell(&mut self.rng, width, height, taken) else {
                break;
            };
            let item = generate_floor_loot(&mut self.rng);
            self.ground_items.push(GroundItem { position: pos, item });
        }
    }

    /// Redraw the projection from entity state
    ///
    /// Later layers win: ground items, discovered traps, enemies, portal, player.
    pub fn rebuild_projection(&mut self) {
        self.map.clear();
        for ground in &self.ground_items {
            self.map.set(ground.position, TileType::GroundItem);
        }
        for trap in self.traps.iter().filter(|t| t.discovered) {
            self.map.set(trap.position, TileType::Trap);
        }
        for enemy in &self.enemies {
            self.map.set(enemy.position, TileType::Enemy);
        }
        if let Some(portal) = self.portal {
            self.map.set(portal, TileType::Portal);
        }
        self.map.set(self.player.position, TileType::Player);
    }

    /// Is `pos` held by the player, one of the first `enemies_considered`
    /// enemies or one of the first `traps_considered` traps
    pub fn is_occupied(&self, pos: Position, enemies_considered: usize, traps_considered: usize) -> bool {
        let enemies = &self.enemies[..enemies_considered.min(self.enemies.len())];
        let traps = &self.traps[..traps_considered.min(self.traps.len())];
        cell_taken(&self.player, enemies, traps, pos)
    }

    /// Open the portal on a free cell, once per level
    pub fn activate_portal(&mut self) -> Option<Position> {
        if self.portal.is_some() {
            return self.portal;
        }

        let (width, height) = (self.map.width, self.map.height);
        let taken = |pos| {
            cell_taken(&self.player, &self.enemies, &self.traps, pos)
                || self.ground_items.iter().any(|g| g.position == pos)
        };
        let pos = pick_free_cell(&mut self.rng, width, height, taken)?;

        self.portal = Some(pos);
        self.rebuild_projection();
        log::info!("Portal opened at ({}, {}) on level {}", pos.x, pos.y, self.level);
        self.add_message(
            format!("A portal has opened at ({}, {})!", pos.x, pos.y),
            MessageCategory::System,
        );
        Some(pos)
    }

    /// Count a kill and open the portal once enough enemies fell this level
    pub fn record_enemy_defeat(&mut self) {
        self.level_kills += 1;
        self.total_kills += 1;
        if self.level_kills >= self.config.portal_kill_threshold && self.portal.is_none() {
            if self.activate_portal().is_none() {
                log::warn!("No free cell for the portal on level {}", self.level);
            }
        }
    }

    /// Move to the next level, or win if this was the last one
    pub fn advance_level(&mut self) -> TurnOutcome {
        if self.level >= self.config.final_level {
            log::info!("{} cleared the final level", self.player.name);
            self.add_message(
                format!("Congratulations! You completed all {} levels!", self.config.final_level),
                MessageCategory::System,
            );
            return TurnOutcome::Ended(SessionEnd::Victory {
                total_kills: self.total_kills,
            });
        }

        self.level += 1;
        self.level_kills = 0;
        self.portal = None;

        // Back to the start before respawning so nothing lands on the player
        self.player.position = Position::ORIGIN;
        self.populate_level();
        self.player.restore_for_new_level();
        self.rebuild_projection();

        log::info!("Entered level {}", self.level);
        self.add_message(
            format!("Welcome to level {}! The enemies grow stronger.", self.level),
            MessageCategory::System,
        );
        TurnOutcome::LevelChanged { level: self.level }
    }

    /// Remove an enemy, keeping the others in order
    pub fn remove_enemy(&mut self, index: usize) -> Option<Enemy> {
        if index < self.enemies.len() {
            Some(self.enemies.remove(index))
        } else {
            None
        }
    }

    /// Drop an item on the map, discarding it if the ground is full
    pub fn add_ground_item(&mut self, position: Position, item: Item) -> bool {
        if self.ground_items.len() >= self.config.max_ground_items {
            self.add_message(
                format!("There is no room on the ground; the {} is lost.", item.name),
                MessageCategory::Warning,
            );
            return false;
        }
        self.ground_items.push(GroundItem { position, item });
        true
    }

    pub fn add_message(&mut self, text: impl Into<String>, category: MessageCategory) {
        self.messages.push(GameMessage {
            text: text.into(),
            category,
        });
        if self.messages.len() > MAX_MESSAGES {
            self.messages.remove(0);
        }
    }

    /// Take all pending messages
    pub fn drain_messages(&mut self) -> Vec<GameMessage> {
        std::mem::take(&mut self.messages)
    }

    /// Whether the display should linger before the next prompt
    pub fn take_pause_request(&mut self) -> bool {
        std::mem::take(&mut self.pause_requested)
    }

    pub fn status(&self) -> StatusLine {
        StatusLine {
            name: self.player.name.clone(),
            level: self.level,
            health: self.player.health,
            max_health: self.player.max_health,
            attack: self.player.attack,
            defense: self.player.defense,
            gold: self.player.gold,
            level_kills: self.level_kills,
            kill_threshold: self.config.portal_kill_threshold,
            total_kills: self.total_kills,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn enemies_mut(&mut self) -> &mut Vec<Enemy> {
        &mut self.enemies
    }

    pub fn traps(&self) -> &[Trap] {
        &self.traps
    }

    pub fn traps_mut(&mut self) -> &mut Vec<Trap> {
        &mut self.traps
    }

    pub fn ground_items(&self) -> &[GroundItem] {
        &self.ground_items
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn level_kills(&self) -> u32 {
        self.level_kills
    }

    pub fn total_kills(&self) -> u32 {
        self.total_kills
    }

    pub fn portal(&self) -> Option<Position> {
        self.portal
    }
}
