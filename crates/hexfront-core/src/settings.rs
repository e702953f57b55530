//! Game settings and configuration.

use crate::hex::HexCoord;
use crate::types::Faction;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Largest board, in hexes, that settings may ask for.
pub const MAX_BOARD_HEXES: u64 = 1 << 20;

/// Geographic bounding box projected onto the board.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl GeoBounds {
    /// Latitude span.
    pub fn lat_range(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// Longitude span.
    pub fn lon_range(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    /// Check if a point lies inside the box (edges included).
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lon..=self.max_lon).contains(&lon)
    }
}

impl Default for GeoBounds {
    fn default() -> Self {
        Self {
            min_lat: 37.25,
            max_lat: 38.75,
            min_lon: 125.0,
            max_lon: 129.0,
        }
    }
}

/// A faction's starting rectangle, inclusive on both ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartingArea {
    pub faction: Faction,
    pub row_min: i32,
    pub row_max: i32,
    pub col_min: i32,
    pub col_max: i32,
}

impl StartingArea {
    /// Create a starting area.
    pub const fn new(faction: Faction, rows: (i32, i32), cols: (i32, i32)) -> Self {
        Self {
            faction,
            row_min: rows.0,
            row_max: rows.1,
            col_min: cols.0,
            col_max: cols.1,
        }
    }

    /// All coordinates in the area, row-major.
    pub fn coords(&self) -> Vec<HexCoord> {
        (self.row_min..=self.row_max)
            .flat_map(|row| (self.col_min..=self.col_max).map(move |col| HexCoord::new(row, col)))
            .collect()
    }

    /// Check if a coordinate lies in the area.
    pub fn contains(&self, coord: &HexCoord) -> bool {
        (self.row_min..=self.row_max).contains(&coord.row)
            && (self.col_min..=self.col_max).contains(&coord.col)
    }
}

/// Units each faction starts with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartingForce {
    pub infantry: u32,
    pub tanks: u32,
    pub artillery: u32,
}

impl Default for StartingForce {
    fn default() -> Self {
        Self {
            infantry: 3,
            tanks: 1,
            artillery: 1,
        }
    }
}

/// Element counts for generated terrain when no terrain source is available.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultTerrain {
    pub rocks: u32,
    pub forests: u32,
    pub waters: u32,
}

impl Default for DefaultTerrain {
    fn default() -> Self {
        Self {
            rocks: 8,
            forests: 30,
            waters: 15,
        }
    }
}

/// Configuration for a game session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    /// Board rows.
    pub rows: u32,
    /// Board columns.
    pub cols: u32,
    /// Geographic area covered by the board.
    pub bounds: GeoBounds,
    /// RNG seed. `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Delay before a scripted faction starts acting, in milliseconds.
    pub ai_start_delay_ms: u64,
    /// Pause between scripted units, in milliseconds.
    pub ai_unit_pause_ms: u64,
    /// Terrain elements ingested per batch.
    pub terrain_batch_size: usize,
    /// Pause between terrain batches, in milliseconds.
    pub terrain_batch_pause_ms: u64,
    /// Default display time for status notices, in milliseconds.
    pub notice_duration_ms: u64,
    /// Random placement attempts per faction at setup.
    pub placement_attempts: u32,
    /// Units each faction starts with.
    pub starting_force: StartingForce,
    /// Starting rectangle for each faction.
    pub starting_areas: Vec<StartingArea>,
    /// Generated terrain used when the terrain source fails.
    pub default_terrain: DefaultTerrain,
}

impl GameSettings {
    /// Standard 10x15 board.
    pub fn new() -> Self {
        Self {
            rows: 10,
            cols: 15,
            bounds: GeoBounds::default(),
            seed: None,
            ai_start_delay_ms: 1000,
            ai_unit_pause_ms: 500,
            terrain_batch_size: 5000,
            terrain_batch_pause_ms: 10,
            notice_duration_ms: 3000,
            placement_attempts: 100,
            starting_force: StartingForce::default(),
            starting_areas: vec![
                StartingArea::new(Faction::Us, (7, 9), (0, 3)),
                StartingArea::new(Faction::Rok, (7, 9), (11, 14)),
                StartingArea::new(Faction::Dprk, (0, 2), (0, 3)),
                StartingArea::new(Faction::Pla, (0, 2), (11, 14)),
            ],
            default_terrain: DefaultTerrain::default(),
        }
    }

    /// Settings with a fixed seed, for reproducible sessions.
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::new()
        }
    }

    /// Load settings from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self =
            serde_json::from_str(json).map_err(|e| SettingsError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate settings and return any errors.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(SettingsError::EmptyGrid);
        }
        if u64::from(self.rows) * u64::from(self.cols) > MAX_BOARD_HEXES {
            return Err(SettingsError::GridTooLarge {
                rows: self.rows,
                cols: self.cols,
            });
        }
        if self.bounds.lat_range() <= 0.0 || self.bounds.lon_range() <= 0.0 {
            return Err(SettingsError::InvalidBounds);
        }
        if self.terrain_batch_size == 0 {
            return Err(SettingsError::ZeroBatchSize);
        }
        for faction in Faction::all() {
            let area = self
                .starting_area(*faction)
                .ok_or(SettingsError::MissingStartingArea(*faction))?;
            let corners = [
                HexCoord::new(area.row_min, area.col_min),
                HexCoord::new(area.row_max, area.col_max),
            ];
            if area.row_min > area.row_max
                || area.col_min > area.col_max
                || corners.iter().any(|c| !c.in_bounds(self.rows, self.cols))
            {
                return Err(SettingsError::AreaOutOfBounds(*faction));
            }
        }
        Ok(())
    }

    /// The starting area of a faction.
    pub fn starting_area(&self, faction: Faction) -> Option<&StartingArea> {
        self.starting_areas.iter().find(|a| a.faction == faction)
    }

    pub fn ai_start_delay(&self) -> Duration {
        Duration::from_millis(self.ai_start_delay_ms)
    }

    pub fn ai_unit_pause(&self) -> Duration {
        Duration::from_millis(self.ai_unit_pause_ms)
    }

    pub fn terrain_batch_pause(&self) -> Duration {
        Duration::from_millis(self.terrain_batch_pause_ms)
    }

    pub fn notice_duration(&self) -> Duration {
        Duration::from_millis(self.notice_duration_ms)
    }
}

impl Default for GameSettings {
    fn default() -> Self {
        Self::new()
    }
}

/// Settings validation errors.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("Board must have at least one row and one column")]
    EmptyGrid,
    #[error("Board of {rows}x{cols} hexes is too large")]
    GridTooLarge { rows: u32, cols: u32 },
    #[error("Geographic bounds must have positive extent")]
    InvalidBounds,
    #[error("Terrain batch size must be positive")]
    ZeroBatchSize,
    #[error("No starting area for {0}")]
    MissingStartingArea(Faction),
    #[error("Starting area for {0} does not fit on the board")]
    AreaOutOfBounds(Faction),
    #[error("Could not parse settings: {0}")]
    Parse(String),
}
