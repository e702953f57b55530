//! Territory capture and neutral-capture reinforcements.

use crate::grid::Grid;
use crate::hex::HexCoord;
use crate::types::Faction;
use crate::unit::{Unit, UnitType};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

/// What happened when a unit entered a hex.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Capture {
    /// The hex already belonged to the mover's faction.
    Unchanged,
    /// Taken from another faction. No reinforcement.
    Taken { from: Faction },
    /// Taken while neutral. `spawned` is the hex of the new infantry, if there was room.
    Neutral { spawned: Option<HexCoord> },
}

impl Capture {
    /// Whether ownership changed.
    pub fn changed_owner(&self) -> bool {
        !matches!(self, Capture::Unchanged)
    }
}

/// Claim `coord` for `faction`.
///
/// Capturing a neutral hex places a newly created infantry on a random empty, non-rock
/// neighbour. If there is none the capture still succeeds.
pub fn capture<R: Rng + ?Sized>(
    grid: &mut Grid,
    coord: HexCoord,
    faction: Faction,
    rng: &mut R,
) -> Capture {
    let Some(hex) = grid.get_mut(&coord) else {
        return Capture::Unchanged;
    };
    let previous = hex.owner;
    if previous == Some(faction) {
        return Capture::Unchanged;
    }
    hex.owner = Some(faction);

    if let Some(from) = previous {
        debug!(%coord, %faction, %from, "hex taken");
        return Capture::Taken { from };
    }

    let spawned = grid.vacant_neighbors(&coord).choose(rng).copied();
    if let Some(at) = spawned {
        if let Err(err) = grid.place_unit(at, Unit::spawned(UnitType::Infantry, faction)) {
            debug!(%at, %err, "spawn rejected");
            return Capture::Neutral { spawned: None };
        }
    }
    debug!(%coord, %faction, ?spawned, "neutral hex captured");
    Capture::Neutral { spawned }
}
