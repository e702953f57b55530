//! Movement reachability on the board.
//!
//! Every passable hex costs one step. A unit reaches every hex within its movement stat that is
//! connected through non-rock, unoccupied hexes. A hex held by a friendly unit of the same type is
//! also reachable when moving there would complete a merge.

use crate::grid::Grid;
use crate::hex::HexCoord;
use crate::unit::Unit;
use std::collections::{BTreeSet, HashSet, VecDeque};

/// All hexes the unit at `origin` can move to this turn.
///
/// Returns an empty set if `origin` holds no unit. The origin itself is never included.
pub fn possible_moves(grid: &Grid, origin: HexCoord) -> BTreeSet<HexCoord> {
    let mut moves = BTreeSet::new();
    let Some(mover) = grid.unit(&origin) else {
        return moves;
    };
    let budget = mover.stats.movement;

    let mut visited: HashSet<HexCoord> = HashSet::new();
    let mut frontier: VecDeque<(HexCoord, u32)> = VecDeque::new();
    visited.insert(origin);
    frontier.push_back((origin, 0));

    while let Some((current, steps)) = frontier.pop_front() {
        if current != origin {
            moves.insert(current);
        }
        if steps >= budget {
            continue;
        }

        for neighbor in grid.neighbors(&current) {
            if visited.contains(&neighbor) {
                continue;
            }
            let Some(hex) = grid.get(&neighbor) else {
                continue;
            };
            if hex.terrain.is_rock() {
                continue;
            }
            if let Some(occupant) = &hex.unit {
                if !completes_merge(grid, origin, mover, occupant, neighbor) {
                    continue;
                }
            }
            visited.insert(neighbor);
            frontier.push_back((neighbor, steps + 1));
        }
    }

    moves
}

/// Whether moving `mover` from `origin` onto `target` (held by `occupant`) meets a merge threshold.
///
/// Counts same-faction, same-type units at `target` and its neighbours, with the mover counted
/// once wherever it currently stands.
pub fn completes_merge(
    grid: &Grid,
    origin: HexCoord,
    mover: &Unit,
    occupant: &Unit,
    target: HexCoord,
) -> bool {
    if !mover.is_merge_partner(occupant) {
        return false;
    }
    let Some(rule) = mover.unit_type.merge_rule() else {
        return false;
    };
    merge_count_after_move(grid, origin, mover, target) >= rule.threshold
}

/// Same-type friendly units around `target` once the mover has arrived there.
pub fn merge_count_after_move(grid: &Grid, origin: HexCoord, mover: &Unit, target: HexCoord) -> usize {
    let others = grid
        .neighborhood(&target)
        .into_iter()
        .filter(|c| *c != origin)
        .filter(|c| grid.unit(c).is_some_and(|u| mover.is_merge_partner(u)))
        .count();
    others + 1
}
