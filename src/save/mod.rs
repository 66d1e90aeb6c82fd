//! Save/load system

pub mod save_game;

pub use save_game::{
    SaveData, SaveError, SAVE_MAGIC, SAVE_VERSION,
    encode, decode, save_world, load_world, save_exists,
};
