//! Data loading
//!
//! Game tunables come from an external RON file so sessions can be tweaked
//! without rebuilding.

pub mod config;

pub use config::{GameConfig, ConfigError, Delays, default_save_path};
