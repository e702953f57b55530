//! The game board: a fixed rows x cols array of hexes.

use crate::hex::HexCoord;
use crate::terrain::Terrain;
use crate::types::{Faction, FactionTable};
use crate::unit::Unit;
use serde::{Deserialize, Serialize};

/// Reasons a unit cannot be put on a hex.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PlacementError {
    #[error("{0} is off the board")]
    OutOfBounds(HexCoord),
    #[error("{0} is impassable rock")]
    Impassable(HexCoord),
    #[error("{0} is already occupied")]
    Occupied(HexCoord),
    #[error("no unit at {0}")]
    NoUnit(HexCoord),
}

/// A single cell of the board.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hex {
    /// Position on the board.
    pub coord: HexCoord,
    /// Terrain type.
    pub terrain: Terrain,
    /// Controlling faction, `None` while neutral.
    pub owner: Option<Faction>,
    /// The unit standing here.
    pub unit: Option<Unit>,
}

impl Hex {
    /// Create an empty neutral plain hex.
    pub fn new(coord: HexCoord) -> Self {
        Self {
            coord,
            terrain: Terrain::Plain,
            owner: None,
            unit: None,
        }
    }

    /// Check if a unit could be placed here.
    pub fn is_vacant(&self) -> bool {
        self.unit.is_none() && self.terrain.is_passable()
    }
}

/// Result of offering a terrain type to a hex during ingestion.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TerrainUpdate {
    /// The hex terrain was overwritten.
    pub changed: bool,
    /// Unit removed because the hex became rock.
    pub evicted: Option<Unit>,
}

/// The board. Shape is fixed at creation; hexes are stored row-major.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Grid {
    rows: u32,
    cols: u32,
    hexes: Vec<Hex>,
}

impl Grid {
    /// Create a board of neutral, empty plain hexes.
    pub fn new(rows: u32, cols: u32) -> Self {
        let mut hexes = Vec::with_capacity((rows * cols) as usize);
        for row in 0..rows as i32 {
            for col in 0..cols as i32 {
                hexes.push(Hex::new(HexCoord::new(row, col)));
            }
        }
        Self { rows, cols, hexes }
    }

    /// Number of rows.
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> u32 {
        self.cols
    }

    /// Check if a coordinate lies on the board.
    pub fn in_bounds(&self, coord: &HexCoord) -> bool {
        coord.in_bounds(self.rows, self.cols)
    }

    fn index(&self, coord: &HexCoord) -> Option<usize> {
        self.in_bounds(coord)
            .then(|| coord.row as usize * self.cols as usize + coord.col as usize)
    }

    /// Get a hex.
    pub fn get(&self, coord: &HexCoord) -> Option<&Hex> {
        self.index(coord).map(|i| &self.hexes[i])
    }

    /// Get a mutable reference to a hex.
    pub fn get_mut(&mut self, coord: &HexCoord) -> Option<&mut Hex> {
        self.index(coord).map(move |i| &mut self.hexes[i])
    }

    /// Terrain at a coordinate. Off-board coordinates read as rock.
    pub fn terrain(&self, coord: &HexCoord) -> Terrain {
        self.get(coord).map_or(Terrain::Rock, |h| h.terrain)
    }

    /// The unit at a coordinate.
    pub fn unit(&self, coord: &HexCoord) -> Option<&Unit> {
        self.get(coord).and_then(|h| h.unit.as_ref())
    }

    /// Mutable access to the unit at a coordinate.
    pub fn unit_mut(&mut self, coord: &HexCoord) -> Option<&mut Unit> {
        self.get_mut(coord).and_then(|h| h.unit.as_mut())
    }

    /// On-board neighbours in scan order.
    pub fn neighbors(&self, coord: &HexCoord) -> Vec<HexCoord> {
        coord
            .neighbors()
            .into_iter()
            .filter(|c| self.in_bounds(c))
            .collect()
    }

    /// A hex followed by its on-board neighbours, in scan order.
    pub fn neighborhood(&self, coord: &HexCoord) -> Vec<HexCoord> {
        let mut area = Vec::with_capacity(7);
        if self.in_bounds(coord) {
            area.push(*coord);
        }
        area.extend(self.neighbors(coord));
        area
    }

    /// Put a unit on an empty, passable hex.
    pub fn place_unit(&mut self, coord: HexCoord, unit: Unit) -> Result<(), PlacementError> {
        let hex = self
            .get_mut(&coord)
            .ok_or(PlacementError::OutOfBounds(coord))?;
        if hex.terrain.is_rock() {
            return Err(PlacementError::Impassable(coord));
        }
        if hex.unit.is_some() {
            return Err(PlacementError::Occupied(coord));
        }
        hex.unit = Some(unit);
        Ok(())
    }

    /// Remove and return the unit at a coordinate.
    pub fn take_unit(&mut self, coord: &HexCoord) -> Option<Unit> {
        self.get_mut(coord).and_then(|h| h.unit.take())
    }

    /// Move a unit between hexes. The destination must be empty and passable.
    pub fn move_unit(&mut self, from: &HexCoord, to: &HexCoord) -> Result<(), PlacementError> {
        if self.unit(from).is_none() {
            return Err(PlacementError::NoUnit(*from));
        }
        match self.get(to) {
            None => return Err(PlacementError::OutOfBounds(*to)),
            Some(hex) if hex.terrain.is_rock() => return Err(PlacementError::Impassable(*to)),
            Some(hex) if hex.unit.is_some() => return Err(PlacementError::Occupied(*to)),
            Some(_) => {}
        }
        let unit = self.take_unit(from).ok_or(PlacementError::NoUnit(*from))?;
        self.place_unit(*to, unit)
    }

    /// Overwrite terrain only when `terrain` has strictly higher priority.
    ///
    /// Turning an occupied hex into rock evicts its unit.
    pub fn offer_terrain(&mut self, coord: &HexCoord, terrain: Terrain) -> TerrainUpdate {
        let Some(hex) = self.get_mut(coord) else {
            return TerrainUpdate::default();
        };
        if terrain.priority() <= hex.terrain.priority() {
            return TerrainUpdate::default();
        }
        hex.terrain = terrain;
        let evicted = if terrain.is_rock() { hex.unit.take() } else { None };
        TerrainUpdate {
            changed: true,
            evicted,
        }
    }

    /// Set the owner of a hex.
    pub fn set_owner(&mut self, coord: &HexCoord, owner: Option<Faction>) {
        if let Some(hex) = self.get_mut(coord) {
            hex.owner = owner;
        }
    }

    /// Iterate over all hexes in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &Hex> {
        self.hexes.iter()
    }

    /// Iterate over all hexes mutably in row-major order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Hex> {
        self.hexes.iter_mut()
    }

    /// Iterate over occupied hexes in row-major order.
    pub fn units(&self) -> impl Iterator<Item = (HexCoord, &Unit)> {
        self.hexes
            .iter()
            .filter_map(|h| h.unit.as_ref().map(|u| (h.coord, u)))
    }

    /// Live unit count per faction.
    pub fn unit_counts(&self) -> FactionTable<usize> {
        let mut counts = [0; Faction::COUNT];
        for (_, unit) in self.units() {
            counts[unit.faction.index()] += 1;
        }
        counts
    }

    /// Total number of units on the board.
    pub fn unit_total(&self) -> usize {
        self.units().count()
    }

    /// Whether a faction owns at least one hex.
    pub fn holds_territory(&self, faction: Faction) -> bool {
        self.hexes.iter().any(|h| h.owner == Some(faction))
    }

    /// Empty, passable on-board neighbours of a hex, in scan order.
    pub fn vacant_neighbors(&self, coord: &HexCoord) -> Vec<HexCoord> {
        self.neighbors(coord)
            .into_iter()
            .filter(|c| self.get(c).is_some_and(Hex::is_vacant))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::UnitType;

    fn infantry(faction: Faction) -> Unit {
        Unit::new(UnitType::Infantry, faction)
    }

    #[test]
    fn test_new_grid_is_plain_and_neutral() {
        let grid = Grid::new(10, 15);
        assert_eq!(grid.iter().count(), 150);
        assert!(grid
            .iter()
            .all(|h| h.terrain == Terrain::Plain && h.owner.is_none() && h.unit.is_none()));
    }

    #[test]
    fn test_storage_is_row_major() {
        let grid = Grid::new(3, 4);
        let coords: Vec<_> = grid.iter().map(|h| h.coord).take(5).collect();
        assert_eq!(coords[4], HexCoord::new(1, 0));
        assert_eq!(grid.get(&HexCoord::new(2, 3)).unwrap().coord, HexCoord::new(2, 3));
        assert!(grid.get(&HexCoord::new(3, 0)).is_none());
    }

    #[test]
    fn test_neighbors_clip_to_board() {
        let grid = Grid::new(10, 15);
        assert_eq!(
            grid.neighbors(&HexCoord::new(0, 0)),
            vec![HexCoord::new(0, 1), HexCoord::new(1, 0)]
        );
        assert_eq!(grid.neighbors(&HexCoord::new(5, 5)).len(), 6);
        assert_eq!(grid.neighborhood(&HexCoord::new(5, 5))[0], HexCoord::new(5, 5));
    }

    #[test]
    fn test_place_unit_rejects_rock_and_occupied() {
        let mut grid = Grid::new(5, 5);
        let rock = HexCoord::new(1, 1);
        grid.get_mut(&rock).unwrap().terrain = Terrain::Rock;

        assert_eq!(
            grid.place_unit(rock, infantry(Faction::Us)),
            Err(PlacementError::Impassable(rock))
        );

        let open = HexCoord::new(2, 2);
        grid.place_unit(open, infantry(Faction::Us)).unwrap();
        assert_eq!(
            grid.place_unit(open, infantry(Faction::Rok)),
            Err(PlacementError::Occupied(open))
        );
        assert_eq!(
            grid.place_unit(HexCoord::new(9, 9), infantry(Faction::Us)),
            Err(PlacementError::OutOfBounds(HexCoord::new(9, 9)))
        );
    }

    #[test]
    fn test_move_unit_transfers_ownership_of_unit() {
        let mut grid = Grid::new(5, 5);
        let from = HexCoord::new(0, 0);
        let to = HexCoord::new(0, 1);
        grid.place_unit(from, infantry(Faction::Us)).unwrap();

        grid.move_unit(&from, &to).unwrap();
        assert!(grid.unit(&from).is_none());
        assert_eq!(grid.unit(&to).unwrap().faction, Faction::Us);
        assert_eq!(grid.unit_total(), 1);
    }

    #[test]
    fn test_move_unit_failure_leaves_board_unchanged() {
        let mut grid = Grid::new(5, 5);
        let from = HexCoord::new(0, 0);
        let to = HexCoord::new(0, 1);
        grid.place_unit(from, infantry(Faction::Us)).unwrap();
        grid.place_unit(to, infantry(Faction::Rok)).unwrap();

        assert!(grid.move_unit(&from, &to).is_err());
        assert_eq!(grid.unit(&from).unwrap().faction, Faction::Us);
        assert_eq!(grid.unit(&to).unwrap().faction, Faction::Rok);
    }

    #[test]
    fn test_offer_terrain_respects_priority() {
        let mut grid = Grid::new(3, 3);
        let c = HexCoord::new(1, 1);

        assert!(!grid.offer_terrain(&c, Terrain::Water).changed);
        assert_eq!(grid.terrain(&c), Terrain::Plain);

        assert!(grid.offer_terrain(&c, Terrain::Forest).changed);
        assert!(!grid.offer_terrain(&c, Terrain::Forest).changed);
        assert!(grid.offer_terrain(&c, Terrain::Rock).changed);
        assert!(!grid.offer_terrain(&c, Terrain::Forest).changed);
        assert_eq!(grid.terrain(&c), Terrain::Rock);
    }

    #[test]
    fn test_rock_evicts_unit() {
        let mut grid = Grid::new(3, 3);
        let c = HexCoord::new(1, 1);
        grid.place_unit(c, infantry(Faction::Dprk)).unwrap();

        let update = grid.offer_terrain(&c, Terrain::Rock);
        assert!(update.changed);
        assert_eq!(update.evicted.unwrap().faction, Faction::Dprk);
        assert!(grid.unit(&c).is_none());
    }

    #[test]
    fn test_unit_counts_and_territory() {
        let mut grid = Grid::new(4, 4);
        grid.place_unit(HexCoord::new(0, 0), infantry(Faction::Us)).unwrap();
        grid.place_unit(HexCoord::new(0, 1), infantry(Faction::Us)).unwrap();
        grid.place_unit(HexCoord::new(3, 3), infantry(Faction::Pla)).unwrap();
        grid.set_owner(&HexCoord::new(2, 2), Some(Faction::Rok));

        assert_eq!(grid.unit_counts(), [2, 0, 0, 1]);
        assert!(grid.holds_territory(Faction::Rok));
        assert!(!grid.holds_territory(Faction::Us));
    }

    #[test]
    fn test_vacant_neighbors_skip_rock_and_units() {
        let mut grid = Grid::new(5, 5);
        let center = HexCoord::new(2, 2);
        grid.get_mut(&HexCoord::new(1, 2)).unwrap().terrain = Terrain::Rock;
        grid.place_unit(HexCoord::new(2, 3), infantry(Faction::Us)).unwrap();

        let vacant = grid.vacant_neighbors(&center);
        assert_eq!(vacant.len(), 4);
        assert!(!vacant.contains(&HexCoord::new(1, 2)));
        assert!(!vacant.contains(&HexCoord::new(2, 3)));
    }
}
