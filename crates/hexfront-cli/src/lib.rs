//! Hexfront terminal front end.
//!
//! Wires a [`hexfront_core::Session`] to stdin and stdout and paces scripted factions with
//! tokio timers.

pub mod config;
pub mod driver;
pub mod input;
pub mod render;
pub mod terrain_file;

pub use config::load_settings;
pub use driver::{run_ai_turns, start_session, AiRunEnd};
pub use input::{parse_command, Command, InputError};
pub use render::{TextGameOver, TextRenderer, TextStatus};
pub use terrain_file::JsonTerrainFile;
