//! Hex coordinate system for the game board.
//!
//! The board is a rectangular offset grid addressed by `(row, col)`. Adjacency uses one fixed
//! offset table for every row, and distance is the larger of the row and column deltas. Both
//! choices shape game balance (attack ranges, merge neighbourhoods), so they are kept exactly
//! as the game defines them rather than replaced with cube-coordinate hex math.

use serde::{Deserialize, Serialize};

/// Neighbour offsets `(d_row, d_col)` in scan order: up, up-right, right, down, down-left, left.
///
/// The same table applies to even and odd rows.
pub const NEIGHBOR_OFFSETS: [(i32, i32); 6] = [(-1, 0), (-1, 1), (0, 1), (1, 0), (1, -1), (0, -1)];

/// A cell position on the board.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct HexCoord {
    /// Row index (0 is the northern edge).
    pub row: i32,
    /// Column index (0 is the western edge).
    pub col: i32,
}

impl PartialOrd for HexCoord {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HexCoord {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Row-major ordering, the same order a board scan visits cells
        (self.row, self.col).cmp(&(other.row, other.col))
    }
}

impl HexCoord {
    /// Create a new coordinate.
    #[inline]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// All six adjacent coordinates in scan order, without bounds filtering.
    pub fn neighbors(&self) -> [HexCoord; 6] {
        NEIGHBOR_OFFSETS.map(|(dr, dc)| HexCoord::new(self.row + dr, self.col + dc))
    }

    /// Board distance: `max(|d_row|, |d_col|)`.
    ///
    /// Used for attack range and scripted targeting.
    pub fn distance(&self, other: &HexCoord) -> u32 {
        let dr = (self.row - other.row).unsigned_abs();
        let dc = (self.col - other.col).unsigned_abs();
        dr.max(dc)
    }

    /// Sample the straight line from `self` to `other`, inclusive of both ends.
    ///
    /// Rows and columns are interpolated linearly over `distance` steps and rounded half up.
    /// A zero-length line yields just the start point.
    pub fn line_to(&self, other: &HexCoord) -> Vec<HexCoord> {
        let steps = self.distance(other);
        if steps == 0 {
            return vec![*self];
        }

        let d_row = f64::from(other.row - self.row);
        let d_col = f64::from(other.col - self.col);
        (0..=steps)
            .map(|i| {
                let t = f64::from(i) / f64::from(steps);
                HexCoord::new(
                    round_half_up(f64::from(self.row) + d_row * t),
                    round_half_up(f64::from(self.col) + d_col * t),
                )
            })
            .collect()
    }

    /// Check if this coordinate lies on a `rows` x `cols` board.
    pub fn in_bounds(&self, rows: u32, cols: u32) -> bool {
        self.row >= 0 && self.col >= 0 && (self.row as u32) < rows && (self.col as u32) < cols
    }
}

fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

impl std::fmt::Display for HexCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.row, self.col)
    }
}

impl From<(i32, i32)> for HexCoord {
    fn from((row, col): (i32, i32)) -> Self {
        Self::new(row, col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let coord = HexCoord::new(3, 5);
        assert_eq!(coord.row, 3);
        assert_eq!(coord.col, 5);
    }

    #[test]
    fn test_distance_same_hex() {
        let coord = HexCoord::new(5, 5);
        assert_eq!(coord.distance(&coord), 0);
    }

    #[test]
    fn test_distance_is_chebyshev() {
        let a = HexCoord::new(2, 3);
        assert_eq!(a.distance(&HexCoord::new(5, 4)), 3);
        assert_eq!(a.distance(&HexCoord::new(3, 9)), 6);
        assert_eq!(a.distance(&HexCoord::new(0, 1)), 2);
    }

    #[test]
    fn test_neighbors_follow_fixed_offsets() {
        let even = HexCoord::new(4, 4);
        let odd = HexCoord::new(5, 4);
        assert_eq!(
            even.neighbors(),
            [
                HexCoord::new(3, 4),
                HexCoord::new(3, 5),
                HexCoord::new(4, 5),
                HexCoord::new(5, 4),
                HexCoord::new(5, 3),
                HexCoord::new(4, 3),
            ]
        );
        // Odd rows use the same offsets
        assert_eq!(odd.neighbors()[1], HexCoord::new(4, 5));
    }

    #[test]
    fn test_neighbors_within_distance_one() {
        let coord = HexCoord::new(5, 5);
        for neighbor in coord.neighbors() {
            assert_eq!(coord.distance(&neighbor), 1);
        }
    }

    #[test]
    fn test_in_bounds() {
        let coord = HexCoord::new(5, 5);
        assert!(coord.in_bounds(10, 10));
        assert!(!coord.in_bounds(5, 5));
        assert!(!HexCoord::new(-1, 0).in_bounds(10, 10));
        assert!(!HexCoord::new(0, 15).in_bounds(10, 15));
    }

    #[test]
    fn test_line_straight() {
        let line = HexCoord::new(0, 0).line_to(&HexCoord::new(0, 3));
        assert_eq!(
            line,
            vec![
                HexCoord::new(0, 0),
                HexCoord::new(0, 1),
                HexCoord::new(0, 2),
                HexCoord::new(0, 3),
            ]
        );
    }

    #[test]
    fn test_line_rounds_half_up() {
        // (0,0) -> (1,2): midpoint row 0.5 rounds up to 1
        let line = HexCoord::new(0, 0).line_to(&HexCoord::new(1, 2));
        assert_eq!(
            line,
            vec![HexCoord::new(0, 0), HexCoord::new(1, 1), HexCoord::new(1, 2)]
        );

        // Going north, -0.5 rounds up to 0
        let line = HexCoord::new(1, 0).line_to(&HexCoord::new(0, 2));
        assert_eq!(line[1], HexCoord::new(1, 1));
    }

    #[test]
    fn test_line_zero_length() {
        let c = HexCoord::new(2, 2);
        assert_eq!(c.line_to(&c), vec![c]);
    }

    #[test]
    fn test_ordering_is_row_major() {
        let mut coords = vec![HexCoord::new(1, 0), HexCoord::new(0, 5), HexCoord::new(0, 1)];
        coords.sort();
        assert_eq!(
            coords,
            vec![HexCoord::new(0, 1), HexCoord::new(0, 5), HexCoord::new(1, 0)]
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", HexCoord::new(3, 7)), "[3, 7]");
    }
}
