//! Board setup: terrain ingestion and starting forces.
//!
//! Terrain elements carry a geographic position and are projected onto the board through the
//! configured bounding box. Higher-priority terrain overwrites lower (rock > forest > plain >
//! water) and rock evicts any unit standing on it. When no terrain source is available a small
//! random set of elements is generated instead.
//!
//! All randomness comes from the caller's RNG, so a seeded session always sets up the same board.

use crate::error::InitError;
use crate::events::{TerrainElement, TerrainProvider};
use crate::grid::Grid;
use crate::hex::HexCoord;
use crate::settings::{GameSettings, GeoBounds, SettingsError};
use crate::terrain::{NaturalTag, Terrain};
use crate::types::{Faction, FactionTable};
use crate::unit::{Unit, UnitType};
use rand::Rng;
use tracing::{debug, info, warn};

/// Project a geographic position onto a `rows` x `cols` board.
///
/// Returns `None` for positions outside `bounds`.
pub fn latlon_to_grid(bounds: &GeoBounds, rows: u32, cols: u32, lat: f64, lon: f64) -> Option<HexCoord> {
    if !bounds.contains(lat, lon) {
        return None;
    }
    let norm_lat = (bounds.max_lat - lat) / bounds.lat_range();
    let norm_lon = (lon - bounds.min_lon) / bounds.lon_range();
    let row = ((norm_lat * f64::from(rows)).floor() as i64).clamp(0, i64::from(rows) - 1);
    let col = ((norm_lon * f64::from(cols)).floor() as i64).clamp(0, i64::from(cols) - 1);
    Some(HexCoord::new(row as i32, col as i32))
}

/// Generate fallback terrain elements.
///
/// Rocks keep away from either the map centre or its corners, chosen per rock at random.
/// Forest and water are spread uniformly.
pub fn generate_default_terrain<R: Rng + ?Sized>(settings: &GameSettings, rng: &mut R) -> Vec<TerrainElement> {
    let b = settings.bounds;
    let counts = settings.default_terrain;
    let lat_margin = b.lat_range() * 0.2;
    let lon_margin = b.lon_range() * 0.2;
    let mut elements = Vec::with_capacity((counts.rocks + counts.forests + counts.waters) as usize);

    for _ in 0..counts.rocks {
        let (lat, lon) = if rng.gen_bool(0.5) {
            // Near an edge
            let lat = if rng.gen_bool(0.5) {
                b.min_lat + rng.gen::<f64>() * lat_margin * 2.0
            } else {
                b.max_lat - rng.gen::<f64>() * lat_margin * 2.0
            };
            let lon = if rng.gen_bool(0.5) {
                b.min_lon + rng.gen::<f64>() * lon_margin * 2.0
            } else {
                b.max_lon - rng.gen::<f64>() * lon_margin * 2.0
            };
            (lat, lon)
        } else {
            // Inside the inner box
            (
                b.min_lat + lat_margin + rng.gen::<f64>() * (b.lat_range() - 2.0 * lat_margin),
                b.min_lon + lon_margin + rng.gen::<f64>() * (b.lon_range() - 2.0 * lon_margin),
            )
        };
        elements.push(TerrainElement::new(lat, lon, NaturalTag::Rock));
    }

    let mut uniform = |tag: NaturalTag, n: u32, elements: &mut Vec<TerrainElement>| {
        for _ in 0..n {
            let lat = b.min_lat + rng.gen::<f64>() * b.lat_range();
            let lon = b.min_lon + rng.gen::<f64>() * b.lon_range();
            elements.push(TerrainElement::new(lat, lon, tag));
        }
    };
    uniform(NaturalTag::Wood, counts.forests, &mut elements);
    uniform(NaturalTag::Water, counts.waters, &mut elements);

    debug!(count = elements.len(), "generated default terrain");
    elements
}

/// Where the ingested terrain came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerrainSource {
    Provider,
    Generated,
}

/// Fetch terrain from `provider`, falling back to generated terrain on failure or an empty list.
pub fn resolve_terrain<P, R>(
    provider: &mut P,
    settings: &GameSettings,
    rng: &mut R,
) -> (Vec<TerrainElement>, TerrainSource)
where
    P: TerrainProvider + ?Sized,
    R: Rng + ?Sized,
{
    match provider.fetch() {
        Ok(elements) if !elements.is_empty() => {
            info!(count = elements.len(), "terrain loaded");
            (elements, TerrainSource::Provider)
        }
        Ok(_) => {
            warn!("terrain source returned no elements, using default terrain");
            (generate_default_terrain(settings, rng), TerrainSource::Generated)
        }
        Err(err) => {
            warn!(error = %err, "terrain source failed, using default terrain");
            (generate_default_terrain(settings, rng), TerrainSource::Generated)
        }
    }
}

/// Counts gathered while ingesting terrain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TerrainStats {
    /// Elements per resulting terrain type, in or out of bounds.
    pub rock: usize,
    pub forest: usize,
    pub water: usize,
    /// Elements outside the bounding box.
    pub ignored: usize,
    /// Hexes whose terrain changed.
    pub applied: usize,
    /// Units removed by rock.
    pub evicted: usize,
}

/// Incremental terrain ingestion over a board, one batch at a time.
#[derive(Debug)]
pub struct TerrainIngest {
    grid: Grid,
    bounds: GeoBounds,
    elements: Vec<TerrainElement>,
    cursor: usize,
    batch_size: usize,
    stats: TerrainStats,
    source: TerrainSource,
}

impl TerrainIngest {
    /// Start ingesting onto a fresh plain board sized by `settings`.
    pub fn new(settings: &GameSettings, elements: Vec<TerrainElement>, source: TerrainSource) -> Self {
        Self {
            grid: Grid::new(settings.rows, settings.cols),
            bounds: settings.bounds,
            elements,
            cursor: 0,
            batch_size: settings.terrain_batch_size.max(1),
            stats: TerrainStats::default(),
            source,
        }
    }

    /// Process the next batch. Returns the number of elements handled, or `None` when done.
    pub fn next_batch(&mut self) -> Option<usize> {
        if self.is_done() {
            return None;
        }
        let end = (self.cursor + self.batch_size).min(self.elements.len());
        for i in self.cursor..end {
            let element = self.elements[i];
            self.apply(element);
        }
        let handled = end - self.cursor;
        self.cursor = end;
        debug!(processed = self.cursor, total = self.elements.len(), "terrain batch done");
        Some(handled)
    }

    fn apply(&mut self, element: TerrainElement) {
        let terrain = element.natural.terrain();
        match terrain {
            Terrain::Rock => self.stats.rock += 1,
            Terrain::Forest => self.stats.forest += 1,
            Terrain::Water => self.stats.water += 1,
            Terrain::Plain => {}
        }
        let Some(coord) = latlon_to_grid(
            &self.bounds,
            self.grid.rows(),
            self.grid.cols(),
            element.lat,
            element.lon,
        ) else {
            self.stats.ignored += 1;
            return;
        };
        let update = self.grid.offer_terrain(&coord, terrain);
        if update.changed {
            self.stats.applied += 1;
        }
        if let Some(unit) = update.evicted {
            debug!(%coord, faction = %unit.faction, "rock evicted unit");
            self.stats.evicted += 1;
        }
    }

    pub fn is_done(&self) -> bool {
        self.cursor >= self.elements.len()
    }

    /// Elements processed so far and the total.
    pub fn progress(&self) -> (usize, usize) {
        (self.cursor, self.elements.len())
    }

    pub fn source(&self) -> TerrainSource {
        self.source
    }

    /// Process everything left.
    pub fn run_to_end(&mut self) {
        while self.next_batch().is_some() {}
    }

    /// Finish and hand back the board. Remaining elements are processed first.
    pub fn finish(mut self) -> (Grid, TerrainStats) {
        self.run_to_end();
        info!(
            rock = self.stats.rock,
            forest = self.stats.forest,
            water = self.stats.water,
            ignored = self.stats.ignored,
            "terrain ingested"
        );
        (self.grid, self.stats)
    }
}

/// Claim each faction's starting area and place its starting force at random free hexes in it.
///
/// Every faction gets `placement_attempts` random tries in total. A faction that ends up
/// with no units fails setup.
pub fn place_initial_units<R: Rng + ?Sized>(
    grid: &mut Grid,
    settings: &GameSettings,
    rng: &mut R,
) -> Result<FactionTable<usize>, InitError> {
    settings.validate()?;
    let force = settings.starting_force;
    let composition = [
        (UnitType::Infantry, force.infantry),
        (UnitType::Tank, force.tanks),
        (UnitType::Artillery, force.artillery),
    ];

    let mut placed = [0usize; Faction::COUNT];
    for faction in Faction::all() {
        let area = settings
            .starting_area(*faction)
            .ok_or(SettingsError::MissingStartingArea(*faction))?;
        for coord in area.coords() {
            grid.set_owner(&coord, Some(*faction));
        }

        let mut attempts = 0;
        for (unit_type, count) in composition {
            let mut placed_of_type = 0;
            while placed_of_type < count && attempts < settings.placement_attempts {
                attempts += 1;
                let coord = HexCoord::new(
                    rng.gen_range(area.row_min..=area.row_max),
                    rng.gen_range(area.col_min..=area.col_max),
                );
                if grid.place_unit(coord, Unit::new(unit_type, *faction)).is_ok() {
                    placed_of_type += 1;
                    placed[faction.index()] += 1;
                    debug!(%coord, %faction, %unit_type, "placed starting unit");
                }
            }
        }

        if placed[faction.index()] == 0 {
            return Err(InitError::NoUnitsPlaced(*faction));
        }
    }
    Ok(placed)
}
