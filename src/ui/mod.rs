//! User interface
//!
//! The console front end: draws the map projection and status line, and turns
//! typed commands into world actions.

pub mod console;

pub use console::{ConsoleApp, Command, parse_coords};
