//! Game configuration
//!
//! Loaded from `assets/data/config.ron`, falling back to built-in defaults
//! when the file is missing, unreadable or describes an unplayable world.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where the config file lives, relative to the working directory
pub const CONFIG_PATH: &str = "assets/data/config.ron";

/// Save file name used when no path is configured
pub const DEFAULT_SAVE_FILE: &str = "savegame.dat";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("map must be at least 1x1, got {width}x{height}")]
    EmptyMap { width: i32, height: i32 },
    #[error("inventory must be at least 1x1, got {width}x{height}")]
    EmptyInventory { width: u8, height: u8 },
    #[error("{needed} entities cannot fit on a map of {cells} cells")]
    Overcrowded { needed: usize, cells: usize },
    #[error("ground item range {min}..={max} is invalid (cap {cap})")]
    GroundItemRange { min: usize, max: usize, cap: usize },
    #[error("final level must be at least 1")]
    NoLevels,
}

/// Pauses the console takes after notable events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Delays {
    pub short_ms: u64,
    pub long_ms: u64,
    pub finale_ms: u64,
}

impl Default for Delays {
    fn default() -> Self {
        Self {
            short_ms: 1000,
            long_ms: 2000,
            finale_ms: 3000,
        }
    }
}

impl Delays {
    /// No pauses at all, for scripted sessions
    pub fn none() -> Self {
        Self {
            short_ms: 0,
            long_ms: 0,
            finale_ms: 0,
        }
    }
}

/// Tunables for a play session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub map_width: i32,
    pub map_height: i32,
    pub enemies_per_level: usize,
    pub traps_per_level: usize,
    pub inventory_width: u8,
    pub inventory_height: u8,
    /// Ground item cap; drops beyond it are discarded
    pub max_ground_items: usize,
    pub ground_items_min: usize,
    pub ground_items_max: usize,
    /// Kills on one level needed to open the portal
    pub portal_kill_threshold: u32,
    /// Taking the portal on this level wins the game
    pub final_level: u32,
    /// Fixed RNG seed for reproducible sessions
    pub seed: Option<u64>,
    pub save_file: Option<PathBuf>,
    pub delays: Delays,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            map_width: 10,
            map_height: 12,
            enemies_per_level: 5,
            traps_per_level: 12,
            inventory_width: 10,
            inventory_height: 10,
            max_ground_items: 10,
            ground_items_min: 5,
            ground_items_max: 10,
            portal_kill_threshold: 5,
            final_level: 3,
            seed: None,
            save_file: None,
            delays: Delays::default(),
        }
    }
}

impl GameConfig {
    /// Load from [`CONFIG_PATH`], or use defaults
    pub fn load() -> Self {
        Self::load_from(Path::new(CONFIG_PATH))
    }

    /// Load from a RON file, falling back to defaults on any problem
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Self::default();
        }

        let config: GameConfig = match fs::read_to_string(path) {
            Ok(content) => match ron::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!("Failed to parse {}: {}", path.display(), e);
                    return Self::default();
                }
            },
            Err(e) => {
                log::warn!("Failed to read {}: {}", path.display(), e);
                return Self::default();
            }
        };

        match config.validate() {
            Ok(()) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Rejected config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Entities that must fit on the map at the deepest level
    fn worst_case_population(&self) -> usize {
        let bonus = (self.final_level / 2) as usize;
        // player + portal + enemies + traps + ground items
        2 + self.enemies_per_level + bonus + self.traps_per_level + bonus + self.ground_items_max
    }

    /// Reject configurations where placement could never finish
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.map_width < 1 || self.map_height < 1 {
            return Err(ConfigError::EmptyMap {
                width: self.map_width,
                height: self.map_height,
            });
        }
        if self.inventory_width == 0 || self.inventory_height == 0 {
            return Err(ConfigError::EmptyInventory {
                width: self.inventory_width,
                height: self.inventory_height,
            });
        }
        if self.final_level == 0 {
            return Err(ConfigError::NoLevels);
        }
        if self.ground_items_min > self.ground_items_max
            || self.ground_items_max > self.max_ground_items
        {
            return Err(ConfigError::GroundItemRange {
                min: self.ground_items_min,
                max: self.ground_items_max,
                cap: self.max_ground_items,
            });
        }

        let cells = (self.map_width as usize) * (self.map_height as usize);
        let needed = self.worst_case_population();
        if needed > cells {
            return Err(ConfigError::Overcrowded { needed, cells });
        }
        Ok(())
    }

    /// Resolve where the save file goes
    pub fn save_path(&self) -> PathBuf {
        match &self.save_file {
            Some(path) => path.clone(),
            None => default_save_path(),
        }
    }
}

/// Platform data directory, or the working directory if there is none
pub fn default_save_path() -> PathBuf {
    use directories::ProjectDirs;

    if let Some(proj_dirs) = ProjectDirs::from("com", "gridrpg", "GridRPG") {
        let mut path = proj_dirs.data_local_dir().to_path_buf();
        path.push(DEFAULT_SAVE_FILE);
        path
    } else {
        PathBuf::from(".").join(DEFAULT_SAVE_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = GameConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!((config.map_width, config.map_height), (10, 12));
        assert_eq!(config.delays.long_ms, 2000);
    }

    #[test]
    fn test_overcrowded_map_rejected() {
        let config = GameConfig {
            map_width: 3,
            map_height: 3,
            ..GameConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Overcrowded { .. })));
    }

    #[test]
    fn test_zero_inventory_rejected() {
        let config = GameConfig {
            inventory_height: 0,
            ..GameConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::EmptyInventory { .. })));
    }

    #[test]
    fn test_partial_ron_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "(map_width: 12, seed: Some(42), delays: (short_ms: 0))").unwrap();

        let config = GameConfig::load_from(file.path());
        assert_eq!(config.map_width, 12);
        assert_eq!(config.map_height, 12);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.delays.short_ms, 0);
        assert_eq!(config.delays.long_ms, 2000);
    }

    #[test]
    fn test_bad_file_falls_back() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "this is not ron").unwrap();
        assert_eq!(GameConfig::load_from(file.path()), GameConfig::default());

        let missing = Path::new("/definitely/not/here/config.ron");
        assert_eq!(GameConfig::load_from(missing), GameConfig::default());
    }

    #[test]
    fn test_explicit_save_file() {
        let config = GameConfig {
            save_file: Some(PathBuf::from("/tmp/x.dat")),
            ..GameConfig::default()
        };
        assert_eq!(config.save_path(), PathBuf::from("/tmp/x.dat"));
        assert!(default_save_path().ends_with(DEFAULT_SAVE_FILE));
    }
}
