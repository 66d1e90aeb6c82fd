//! Game save/load system
//!
//! A save file is a short header (magic tag plus format version) followed by a
//! bincode body. Every count and position in the body is checked against the
//! current configuration before a world is rebuilt from it.

use std::fs;
use std::path::Path;

use bincode::Options;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::GameConfig;
use crate::entities::player::sanitize_name;
use crate::entities::{Enemy, Player, Trap};
use crate::game::{GroundItem, World};
use crate::items::{InventoryGrid, Item};
use crate::world::{Map, Position};

/// First bytes of every save file
pub const SAVE_MAGIC: &[u8; 4] = b"GRPG";

/// Save file version for compatibility checking
pub const SAVE_VERSION: u32 = 1;

/// Upper bound on the body size, so a corrupt length cannot exhaust memory
const MAX_BODY_BYTES: u64 = 1 << 20;

const HEADER_LEN: usize = SAVE_MAGIC.len() + 4;

/// Largest stat, bonus or trap damage accepted from a file
const MAX_STAT: i32 = 100_000;

/// Largest gold amount or kill tally accepted from a file
const MAX_TALLY: u32 = 1_000_000;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode save: {0}")]
    Encode(#[source] bincode::Error),
    #[error("failed to decode save: {0}")]
    Decode(#[source] bincode::Error),
    #[error("not a save file")]
    BadMagic,
    #[error("save version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
    #[error("invalid save data: {0}")]
    InvalidData(String),
}

fn invalid(msg: impl Into<String>) -> SaveError {
    SaveError::InvalidData(msg.into())
}

fn check_stat(value: i32, min: i32, max: i32, what: &str) -> Result<(), SaveError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(invalid(format!("{} {} out of range {}..={}", what, value, min, max)))
    }
}

fn check_item(item: &Item) -> Result<(), SaveError> {
    if item.grid_size != item.kind.grid_size() {
        return Err(invalid(format!("{} has the wrong footprint", item.name)));
    }
    check_stat(item.attack_bonus, 0, MAX_STAT, "item attack bonus")?;
    check_stat(item.defense_bonus, 0, MAX_STAT, "item defense bonus")?;
    check_stat(item.health_bonus, 0, MAX_STAT, "item health bonus")
}

/// Level counters and entity counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSaveData {
    pub level: u32,
    pub level_kills: u32,
    pub total_kills: u32,
    pub portal: Option<Position>,
    pub enemy_count: u32,
    pub trap_count: u32,
    pub ground_item_count: u32,
}

/// Player-specific save data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSaveData {
    pub name: String,
    pub health: i32,
    pub max_health: i32,
    pub attack: i32,
    pub defense: i32,
    pub position: Position,
    pub gold: u32,
}

/// Inventory dimensions plus each placed item, anchors in row-major order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySaveData {
    pub width: u8,
    pub height: u8,
    pub item_count: u32,
    pub items: Vec<Item>,
}

/// Item on the ground
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemOnGround {
    pub position: Position,
    pub item: Item,
}

/// Complete save data structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveData {
    pub world: WorldSaveData,
    pub player: PlayerSaveData,
    pub inventory: InventorySaveData,
    pub enemies: Vec<Enemy>,
    pub traps: Vec<Trap>,
    pub items_on_ground: Vec<ItemOnGround>,
}

fn body_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_limit(MAX_BODY_BYTES)
}

impl SaveData {
    /// Extract save data from the current world
    pub fn from_world(world: &World) -> Self {
        let player = world.player();
        let items: Vec<Item> = player
            .inventory
            .anchored_items()
            .into_iter()
            .cloned()
            .collect();

        SaveData {
            world: WorldSaveData {
                level: world.level(),
                level_kills: world.level_kills(),
                total_kills: world.total_kills(),
                portal: world.portal(),
                enemy_count: world.enemies().len() as u32,
                trap_count: world.traps().len() as u32,
                ground_item_count: world.ground_items().len() as u32,
            },
            player: PlayerSaveData {
                name: player.name.clone(),
                health: player.health,
                max_health: player.max_health,
                attack: player.attack,
                defense: player.defense,
                position: player.position,
                gold: player.gold,
            },
            inventory: InventorySaveData {
                width: player.inventory.width(),
                height: player.inventory.height(),
                item_count: items.len() as u32,
                items,
            },
            enemies: world.enemies().to_vec(),
            traps: world.traps().to_vec(),
            items_on_ground: world
                .ground_items()
                .iter()
                .map(|g| ItemOnGround {
                    position: g.position,
                    item: g.item.clone(),
                })
                .collect(),
        }
    }

    /// Check every count, coordinate and stat, then rebuild a world
    pub fn into_world(self, config: GameConfig) -> Result<World, SaveError> {
        let map = Map::new(config.map_width, config.map_height);
        let in_map = |pos: Position, what: &str| {
            if map.contains(pos) {
                Ok(())
            } else {
                Err(invalid(format!("{} at ({}, {}) is off the map", what, pos.x, pos.y)))
            }
        };

        let w = &self.world;
        if w.level == 0 || w.level > config.final_level {
            return Err(invalid(format!("level {} out of range", w.level)));
        }
        if w.level_kills > w.total_kills {
            return Err(invalid("level kills exceed total kills"));
        }
        if w.total_kills > MAX_TALLY {
            return Err(invalid(format!("total kills {} out of range", w.total_kills)));
        }
        if w.enemy_count as usize != self.enemies.len() {
            return Err(invalid(format!(
                "enemy count {} but {} enemies stored",
                w.enemy_count,
                self.enemies.len()
            )));
        }
        if w.trap_count as usize != self.traps.len() {
            return Err(invalid(format!(
                "trap count {} but {} traps stored",
                w.trap_count,
                self.traps.len()
            )));
        }
        if w.ground_item_count as usize != self.items_on_ground.len() {
            return Err(invalid("ground item count does not match"));
        }
        if self.inventory.item_count as usize != self.inventory.items.len() {
            return Err(invalid("inventory item count does not match"));
        }

        if let Some(portal) = w.portal {
            in_map(portal, "portal")?;
        }
        in_map(self.player.position, "player")?;
        for enemy in &self.enemies {
            in_map(enemy.position, "enemy")?;
        }
        for trap in &self.traps {
            in_map(trap.position, "trap")?;
        }
        for ground in &self.items_on_ground {
            in_map(ground.position, "ground item")?;
        }

        let p = &self.player;
        check_stat(p.max_health, 1, MAX_STAT, "player max health")?;
        check_stat(p.health, 1, p.max_health, "player health")?;
        check_stat(p.attack, 0, MAX_STAT, "player attack")?;
        check_stat(p.defense, 0, MAX_STAT, "player defense")?;
        if p.gold > MAX_TALLY {
            return Err(invalid(format!("player gold {} out of range", p.gold)));
        }
        for enemy in &self.enemies {
            check_stat(enemy.health, 1, MAX_STAT, "enemy health")?;
            check_stat(enemy.attack, 0, MAX_STAT, "enemy attack")?;
            check_stat(enemy.defense, 0, MAX_STAT, "enemy defense")?;
        }
        for trap in &self.traps {
            check_stat(trap.damage, 0, MAX_STAT, "trap damage")?;
        }
        for ground in &self.items_on_ground {
            check_item(&ground.item)?;
        }

        let mut inventory = InventoryGrid::new(self.inventory.width, self.inventory.height);
        if inventory.width() == 0 || inventory.height() == 0 {
            return Err(invalid("inventory has no cells"));
        }
        for item in self.inventory.items {
            check_item(&item)?;
            let anchor = item
                .anchor
                .ok_or_else(|| invalid(format!("{} has no anchor", item.name)))?;
            if let Err(item) = inventory.place(item, anchor.x, anchor.y) {
                return Err(invalid(format!(
                    "{} does not fit at ({}, {})",
                    item.name, anchor.x, anchor.y
                )));
            }
        }

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let player = Player {
            name: sanitize_name(&self.player.name),
            health: self.player.health,
            max_health: self.player.max_health,
            attack: self.player.attack,
            defense: self.player.defense,
            position: self.player.position,
            gold: self.player.gold,
            inventory,
        };

        let mut world = World {
            config,
            player,
            enemies: self.enemies,
            traps: self.traps,
            ground_items: self
                .items_on_ground
                .into_iter()
                .map(|g| GroundItem {
                    position: g.position,
                    item: g.item,
                })
                .collect(),
            map,
            level: self.world.level,
            level_kills: self.world.level_kills,
            total_kills: self.world.total_kills,
            portal: self.world.portal,
            rng,
            messages: Vec::new(),
            pause_requested: false,
        };
        world.rebuild_projection();
        Ok(world)
    }
}

/// Serialize save data with its header
pub fn encode(data: &SaveData) -> Result<Vec<u8>, SaveError> {
    let body = body_options().serialize(data).map_err(SaveError::Encode)?;
    let mut bytes = Vec::with_capacity(HEADER_LEN + body.len());
    bytes.extend_from_slice(SAVE_MAGIC);
    bytes.extend_from_slice(&SAVE_VERSION.to_le_bytes());
    bytes.extend_from_slice(&body);
    Ok(bytes)
}

/// Check the header and deserialize the body
pub fn decode(bytes: &[u8]) -> Result<SaveData, SaveError> {
    if bytes.len() < SAVE_MAGIC.len() || &bytes[..SAVE_MAGIC.len()] != SAVE_MAGIC {
        return Err(SaveError::BadMagic);
    }
    let version_bytes: [u8; 4] = bytes
        .get(SAVE_MAGIC.len()..HEADER_LEN)
        .and_then(|b| b.try_into().ok())
        .ok_or_else(|| invalid("truncated header"))?;
    let found = u32::from_le_bytes(version_bytes);
    if found != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found,
        });
    }

    body_options()
        .deserialize(&bytes[HEADER_LEN..])
        .map_err(SaveError::Decode)
}

/// Save the world, replacing any previous file atomically
pub fn save_world(world: &World, path: &Path) -> Result<(), SaveError> {
    let bytes = encode(&SaveData::from_world(world))?;

    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }

    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, bytes)?;
    fs::rename(&temp_path, path)?;

    log::info!("Game saved to {}", path.display());
    Ok(())
}

/// Load a world saved by [`save_world`]
pub fn load_world(path: &Path, config: GameConfig) -> Result<World, SaveError> {
    let bytes = fs::read(path)?;
    let world = decode(&bytes)?.into_world(config)?;
    log::info!("Game loaded from {}", path.display());
    Ok(world)
}

pub fn save_exists(path: &Path) -> bool {
    path.exists()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_world() -> World {
        World::with_seed("Saver", GameConfig::default(), 11)
    }

    #[test]
    fn test_header() {
        let bytes = encode(&SaveData::from_world(&sample_world())).unwrap();
        assert_eq!(&bytes[..4], b"GRPG");
        assert_eq!(&bytes[4..8], &1u32.to_le_bytes());
    }

    #[test]
    fn test_roundtrip_preserves_world() {
        let mut world = sample_world();
        world.record_enemy_defeat();
        let data = SaveData::from_world(&world);
        let decoded = decode(&encode(&data).unwrap()).unwrap();
        assert_eq!(decoded, data);

        let restored = decoded.into_world(GameConfig::default()).unwrap();
        assert_eq!(restored.enemies(), world.enemies());
        assert_eq!(restored.traps(), world.traps());
        assert_eq!(restored.ground_items(), world.ground_items());
        assert_eq!(restored.level_kills(), 1);
        assert_eq!(restored.map(), world.map());
    }

    #[test]
    fn test_rejects_bad_headers() {
        assert!(matches!(decode(b""), Err(SaveError::BadMagic)));
        assert!(matches!(decode(b"NOPE\x01\0\0\0"), Err(SaveError::BadMagic)));
        assert!(matches!(decode(b"GRPG\x01"), Err(SaveError::InvalidData(_))));
        assert!(matches!(
            decode(b"GRPG\x07\0\0\0"),
            Err(SaveError::VersionMismatch { expected: 1, found: 7 })
        ));
    }

    #[test]
    fn test_rejects_truncated_body() {
        let bytes = encode(&SaveData::from_world(&sample_world())).unwrap();
        for cut in [HEADER_LEN, HEADER_LEN + 3, bytes.len() / 2, bytes.len() - 1] {
            assert!(decode(&bytes[..cut]).is_err(), "cut at {}", cut);
        }
    }

    #[test]
    fn test_rejects_inconsistent_counts() {
        let mut data = SaveData::from_world(&sample_world());
        data.world.enemy_count += 1;
        assert!(matches!(
            data.into_world(GameConfig::default()),
            Err(SaveError::InvalidData(_))
        ));
    }

    #[test]
    fn test_rejects_off_map_positions() {
        let mut data = SaveData::from_world(&sample_world());
        data.traps[0].position = Position::new(50, 2);
        assert!(data.into_world(GameConfig::default()).is_err());
    }

    #[test]
    fn test_rejects_overlapping_inventory() {
        let mut world = sample_world();
        world
            .player_mut()
            .inventory
            .place(crate::items::templates::health_potion(), 0, 0)
            .unwrap();
        let mut data = SaveData::from_world(&world);
        let copy = data.inventory.items[0].clone();
        data.inventory.items.push(copy);
        data.inventory.item_count = 2;
        assert!(matches!(
            data.into_world(GameConfig::default()),
            Err(SaveError::InvalidData(_))
        ));
    }

    #[test]
    fn test_rejects_out_of_range_stats() {
        let tampers: &[(&str, fn(&mut SaveData))] = &[
            ("player health zero", |d| d.player.health = 0),
            ("player health negative", |d| d.player.health = -50),
            ("player health above max", |d| d.player.health = d.player.max_health + 1),
            ("player max health", |d| d.player.max_health = i32::MAX),
            ("player attack", |d| d.player.attack = i32::MAX),
            ("player negative attack", |d| d.player.attack = -1),
            ("player defense", |d| d.player.defense = i32::MIN),
            ("player gold", |d| d.player.gold = u32::MAX),
            ("total kills", |d| d.world.total_kills = u32::MAX),
            ("enemy health", |d| d.enemies[0].health = 0),
            ("enemy attack", |d| d.enemies[0].attack = i32::MAX),
            ("enemy defense", |d| d.enemies[0].defense = -7),
            ("trap damage", |d| d.traps[0].damage = i32::MAX),
            ("ground item bonus", |d| d.items_on_ground[0].item.attack_bonus = i32::MAX),
            ("inventory item bonus", |d| d.inventory.items[0].health_bonus = -30),
        ];

        let mut world = sample_world();
        world
            .player_mut()
            .inventory
            .place(crate::items::templates::health_potion(), 0, 0)
            .unwrap();
        let clean = SaveData::from_world(&world);
        assert!(!clean.items_on_ground.is_empty());
        assert!(clean.clone().into_world(GameConfig::default()).is_ok());

        for &(what, tamper) in tampers {
            let mut data = clean.clone();
            tamper(&mut data);
            let decoded = decode(&encode(&data).unwrap()).unwrap();
            assert!(
                matches!(
                    decoded.into_world(GameConfig::default()),
                    Err(SaveError::InvalidData(_))
                ),
                "accepted tampered {}",
                what
            );
        }
    }

    #[test]
    fn test_loaded_name_is_sanitized() {
        let mut data = SaveData::from_world(&sample_world());
        data.player.name = "y".repeat(10_000);
        let world = data.clone().into_world(GameConfig::default()).unwrap();
        assert_eq!(world.player().name.len(), 49);

        data.player.name = "   ".to_string();
        let world = data.into_world(GameConfig::default()).unwrap();
        assert_eq!(world.player().name, "Hero");
    }
}
