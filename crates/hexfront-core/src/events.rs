//! Game events and the ports a front end plugs into.
//!
//! Every session operation returns the [`GameEvent`]s it produced. Presentation goes through
//! three sinks:
//! - [`RenderSink`]: receives a [`RenderFrame`] after every state change
//! - [`StatusSink`]: receives short player-facing [`Notice`]s
//! - [`GameOverSink`]: told once when the game ends
//!
//! Terrain comes in through a [`TerrainProvider`].

use crate::error::TerrainError;
use crate::grid::Grid;
use crate::hex::HexCoord;
use crate::terrain::NaturalTag;
use crate::turn::{ControllerMode, SelectionState, TurnState};
use crate::types::Faction;
use crate::unit::UnitType;
use crate::victory::Elimination;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

/// Something that happened in the game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    UnitSelected {
        coord: HexCoord,
    },
    SelectionCancelled {
        coord: HexCoord,
    },
    UnitMoved {
        faction: Faction,
        unit_type: UnitType,
        from: HexCoord,
        to: HexCoord,
    },
    HexCaptured {
        coord: HexCoord,
        faction: Faction,
        previous: Option<Faction>,
    },
    UnitSpawned {
        coord: HexCoord,
        faction: Faction,
    },
    UnitsMerged {
        center: HexCoord,
        faction: Faction,
        from: UnitType,
        to: UnitType,
        consumed: usize,
    },
    MergeFailed {
        center: HexCoord,
        reason: String,
    },
    Attacked {
        from: HexCoord,
        to: HexCoord,
        damage: u32,
        remaining_health: u32,
    },
    UnitDestroyed {
        coord: HexCoord,
        faction: Faction,
        unit_type: UnitType,
    },
    FactionEliminated {
        faction: Faction,
        elimination: Elimination,
    },
    TurnEnded {
        faction: Faction,
        next: Faction,
        turn: u32,
    },
    GameOver {
        winner: Option<Faction>,
    },
}

/// A short status message for the player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    /// How long the message should stay visible.
    pub duration: Duration,
}

impl Notice {
    pub fn new(text: impl Into<String>, duration: Duration) -> Self {
        Self {
            text: text.into(),
            duration,
        }
    }
}

/// Snapshot handed to the renderer.
#[derive(Clone, Copy, Debug)]
pub struct RenderFrame<'a> {
    pub grid: &'a Grid,
    pub turn: &'a TurnState,
    pub selection: &'a SelectionState,
    pub mode: ControllerMode,
    /// The human-controlled faction, if any.
    pub human: Option<Faction>,
}

impl RenderFrame<'_> {
    /// Hexes holding units that cannot act until the next turn boundary.
    pub fn newly_created(&self) -> BTreeSet<HexCoord> {
        self.grid
            .units()
            .filter(|(_, u)| u.newly_created)
            .map(|(c, _)| c)
            .collect()
    }
}

/// Draws the board.
pub trait RenderSink {
    fn render(&mut self, frame: &RenderFrame<'_>);
}

/// Shows status notices.
pub trait StatusSink {
    fn notify(&mut self, notice: &Notice);
}

/// Told when the game ends. `None` means a draw.
pub trait GameOverSink {
    fn game_over(&mut self, winner: Option<Faction>);
}

/// A natural feature at a geographic position.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerrainElement {
    pub lat: f64,
    pub lon: f64,
    pub natural: NaturalTag,
}

impl TerrainElement {
    pub fn new(lat: f64, lon: f64, natural: NaturalTag) -> Self {
        Self { lat, lon, natural }
    }
}

/// Source of terrain elements.
pub trait TerrainProvider {
    fn fetch(&mut self) -> Result<Vec<TerrainElement>, TerrainError>;
}

/// Provider that always fails, so setup falls back to generated terrain.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoTerrain;

impl TerrainProvider for NoTerrain {
    fn fetch(&mut self) -> Result<Vec<TerrainElement>, TerrainError> {
        Err(TerrainError::Unavailable("no terrain source configured".to_string()))
    }
}

/// Provider backed by an in-memory list.
#[derive(Clone, Debug, Default)]
pub struct StaticTerrain(pub Vec<TerrainElement>);

impl TerrainProvider for StaticTerrain {
    fn fetch(&mut self) -> Result<Vec<TerrainElement>, TerrainError> {
        Ok(self.0.clone())
    }
}

/// Sink that discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl RenderSink for NullSink {
    fn render(&mut self, _frame: &RenderFrame<'_>) {}
}

impl StatusSink for NullSink {
    fn notify(&mut self, _notice: &Notice) {}
}

impl GameOverSink for NullSink {
    fn game_over(&mut self, _winner: Option<Faction>) {}
}
