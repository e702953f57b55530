//! Decision procedure for scripted factions.
//!
//! Each unit acts greedily on its own: attack the weakest enemy it can hit, otherwise take one
//! step toward the nearest enemy, otherwise wait.

use crate::combat;
use crate::grid::Grid;
use crate::hex::HexCoord;
use crate::types::Faction;
use serde::{Deserialize, Serialize};

/// What a scripted unit decided to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AiAction {
    Attack { from: HexCoord, to: HexCoord },
    Advance { from: HexCoord, to: HexCoord },
    Idle { at: HexCoord },
}

/// Units of `faction` eligible to act, in row-major order.
pub fn eligible_units<'a>(
    grid: &'a Grid,
    faction: Faction,
    has_acted: impl Fn(&HexCoord) -> bool + 'a,
) -> impl Iterator<Item = HexCoord> + 'a {
    grid.units()
        .filter(move |(coord, unit)| {
            unit.faction == faction && !unit.newly_created && !has_acted(coord)
        })
        .map(|(coord, _)| coord)
}

/// Choose an action for the unit at `origin`.
pub fn choose_action(grid: &Grid, origin: HexCoord) -> AiAction {
    let Some(unit) = grid.unit(&origin) else {
        return AiAction::Idle { at: origin };
    };

    // Lowest health first; `min_by_key` keeps the earliest in scan order on ties
    let weakest = grid
        .units()
        .filter(|(coord, _)| combat::can_attack(grid, &origin, coord))
        .min_by_key(|(_, enemy)| enemy.health);
    if let Some((target, _)) = weakest {
        return AiAction::Attack {
            from: origin,
            to: target,
        };
    }

    let nearest = grid
        .units()
        .filter(|(_, other)| other.faction != unit.faction)
        .min_by_key(|(coord, _)| origin.distance(coord));
    if let Some((enemy, _)) = nearest {
        let line = origin.line_to(&enemy);
        if let Some(step) = line.get(1) {
            if grid.get(step).is_some_and(|h| h.is_vacant()) {
                return AiAction::Advance {
                    from: origin,
                    to: *step,
                };
            }
        }
    }

    AiAction::Idle { at: origin }
}
