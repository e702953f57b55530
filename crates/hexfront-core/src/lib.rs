//! Hexfront Core Library
//!
//! This crate contains the core game logic for Hexfront, a four-faction turn-based
//! conquest game played on a hexagonal board laid over the Korean peninsula.
//!
//! # Design Principles
//!
//! - **No UI dependencies**: rendering and notices go through sink traits
//! - **Deterministic**: a seeded session replays identically
//! - **Serializable**: settings, board and events all derive serde
//! - **Single-threaded**: a [`Session`] is driven by one caller; pacing is the caller's job

// Core modules
pub mod hex;
pub mod terrain;
pub mod types;
pub mod unit;

// Board and configuration
pub mod error;
pub mod grid;
pub mod settings;

// Map generation
pub mod mapgen;

// Rules
pub mod combat;
pub mod merge;
pub mod movement;
pub mod territory;
pub mod victory;

// Turn flow and scripted factions
pub mod ai;
pub mod events;
pub mod session;
pub mod turn;

// Re-exports for convenience
pub use ai::AiAction;
pub use combat::{calculate_damage, can_attack, possible_attacks, resolve_attack, CombatContext, CombatResult};
pub use error::{GameError, GameResult, InitError, MergeError, SelectionReason, TerrainError};
pub use events::{
    GameEvent, GameOverSink, NoTerrain, Notice, NullSink, RenderFrame, RenderSink, StaticTerrain,
    StatusSink, TerrainElement, TerrainProvider,
};
pub use grid::{Grid, Hex, PlacementError};
pub use hex::HexCoord;
pub use mapgen::{TerrainIngest, TerrainSource, TerrainStats};
pub use merge::{MergeOutcome, MergePlan};
pub use movement::possible_moves;
pub use session::{AiStep, Handoff, Session, TurnChange};
pub use settings::{GameSettings, GeoBounds, SettingsError, StartingArea, MAX_BOARD_HEXES};
pub use terrain::{NaturalTag, Terrain};
pub use turn::{ControllerMode, Phase, SelectionState, TurnState};
pub use types::*;
pub use unit::{MergeRule, Unit, UnitStats, UnitType};
pub use victory::{Elimination, GameOutcome, VictoryEvaluator};
