//! Unit merging.
//!
//! Enough same-faction units of one type standing on a hex and its neighbours consolidate into a
//! single stronger unit on that hex: five infantry become a tank, three tanks become artillery.
//! A merge is planned in full before the board is touched, so it either happens completely or
//! not at all.

use crate::error::MergeError;
use crate::grid::Grid;
use crate::hex::HexCoord;
use crate::types::Faction;
use crate::unit::{Unit, UnitType};
use tracing::{debug, error, info};

/// A merge that has been checked against the board but not yet applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergePlan {
    pub center: HexCoord,
    pub faction: Faction,
    pub from: UnitType,
    pub to: UnitType,
    /// Hexes whose units are consumed, in consumption order.
    pub consumed: Vec<HexCoord>,
}

/// A completed merge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergeOutcome {
    pub center: HexCoord,
    pub faction: Faction,
    pub from: UnitType,
    pub to: UnitType,
    pub consumed: Vec<HexCoord>,
}

impl MergeOutcome {
    /// Player-facing summary.
    pub fn describe(&self) -> String {
        format!(
            "{} {}s near {} merged into 1 {} (acts next turn)",
            self.consumed.len(),
            self.from.name(),
            self.center,
            self.to.name()
        )
    }
}

fn validate_center(grid: &Grid, center: HexCoord) -> Result<(), MergeError> {
    match grid.get(&center) {
        Some(hex) if !hex.terrain.is_rock() => Ok(()),
        _ => Err(MergeError::InvalidCenter(center)),
    }
}

/// Plan consuming `threshold` units of `from` around `center`: the center first, then
/// neighbours in scan order.
pub fn plan_merge(grid: &Grid, center: HexCoord, from: UnitType) -> Result<MergePlan, MergeError> {
    validate_center(grid, center)?;
    let anchor = grid
        .unit(&center)
        .filter(|u| u.unit_type == from)
        .ok_or(MergeError::MissingUnit {
            coord: center,
            expected: from,
        })?;
    let rule = from.merge_rule().ok_or(MergeError::NoUpgrade(from))?;

    let found: Vec<HexCoord> = grid
        .neighborhood(&center)
        .into_iter()
        .filter(|c| grid.unit(c).is_some_and(|u| anchor.is_merge_partner(u)))
        .collect();
    if found.len() < rule.threshold {
        return Err(MergeError::InsufficientUnits {
            found: found.len(),
            required: rule.threshold,
        });
    }

    Ok(MergePlan {
        center,
        faction: anchor.faction,
        from,
        to: rule.upgrade,
        consumed: found.into_iter().take(rule.threshold).collect(),
    })
}

/// Plan a merge triggered by moving the unit at `origin` onto the friendly unit at `center`.
///
/// The mover is consumed first, then the unit at `center`, then neighbours of `center` in
/// scan order, so exactly `threshold` units are removed and the upgrade lands on `center`.
pub fn plan_merge_by_move(
    grid: &Grid,
    origin: HexCoord,
    center: HexCoord,
) -> Result<MergePlan, MergeError> {
    validate_center(grid, center)?;
    let mover = grid.unit(&origin).ok_or(MergeError::NoMover(origin))?;
    let from = mover.unit_type;
    let rule = from.merge_rule().ok_or(MergeError::NoUpgrade(from))?;
    if !grid.unit(&center).is_some_and(|u| mover.is_merge_partner(u)) {
        return Err(MergeError::MissingUnit {
            coord: center,
            expected: from,
        });
    }

    let mut consumed = vec![origin];
    consumed.extend(
        grid.neighborhood(&center)
            .into_iter()
            .filter(|c| *c != origin)
            .filter(|c| grid.unit(c).is_some_and(|u| mover.is_merge_partner(u))),
    );
    if consumed.len() < rule.threshold {
        return Err(MergeError::InsufficientUnits {
            found: consumed.len(),
            required: rule.threshold,
        });
    }
    consumed.truncate(rule.threshold);

    Ok(MergePlan {
        center,
        faction: mover.faction,
        from,
        to: rule.upgrade,
        consumed,
    })
}

/// Apply a plan: remove every consumed unit and place the upgraded unit on the center.
///
/// The board is re-checked first; if any planned unit is gone nothing is removed.
pub fn apply_merge(grid: &mut Grid, plan: MergePlan) -> Result<MergeOutcome, MergeError> {
    let present = plan
        .consumed
        .iter()
        .filter(|c| {
            grid.unit(c)
                .is_some_and(|u| u.faction == plan.faction && u.unit_type == plan.from)
        })
        .count();
    if present != plan.consumed.len() {
        error!(
            center = %plan.center,
            present,
            required = plan.consumed.len(),
            "merge aborted, planned units missing"
        );
        return Err(MergeError::InsufficientUnits {
            found: present,
            required: plan.consumed.len(),
        });
    }
    validate_center(grid, plan.center)?;

    for coord in &plan.consumed {
        grid.take_unit(coord);
        debug!(%coord, "merge consumed unit");
    }
    if let Some(hex) = grid.get_mut(&plan.center) {
        hex.unit = Some(Unit::spawned(plan.to, plan.faction));
    }
    info!(
        center = %plan.center,
        faction = %plan.faction,
        from = %plan.from,
        to = %plan.to,
        "units merged"
    );

    Ok(MergeOutcome {
        center: plan.center,
        faction: plan.faction,
        from: plan.from,
        to: plan.to,
        consumed: plan.consumed,
    })
}

/// Merge the unit of type `from` at `center` with its neighbours.
pub fn merge_units(grid: &mut Grid, center: HexCoord, from: UnitType) -> Result<MergeOutcome, MergeError> {
    let plan = plan_merge(grid, center, from)?;
    apply_merge(grid, plan)
}

/// After a unit arrives at `center`, merge it if enough partners stand around it.
///
/// Returns `Ok(None)` when there is no unit, the type does not upgrade, or the threshold
/// is not met.
pub fn check_and_merge(grid: &mut Grid, center: HexCoord) -> Result<Option<MergeOutcome>, MergeError> {
    let Some(unit) = grid.unit(&center) else {
        return Ok(None);
    };
    let Some(rule) = unit.unit_type.merge_rule() else {
        return Ok(None);
    };
    let count = grid
        .neighborhood(&center)
        .iter()
        .filter(|c| grid.unit(c).is_some_and(|u| unit.is_merge_partner(u)))
        .count();
    debug!(%center, unit_type = %unit.unit_type, count, "merge check");
    if count < rule.threshold {
        return Ok(None);
    }
    let from = unit.unit_type;
    merge_units(grid, center, from).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::Terrain;

    fn place(grid: &mut Grid, at: (i32, i32), unit_type: UnitType, faction: Faction) {
        grid.place_unit(HexCoord::from(at), Unit::new(unit_type, faction))
            .unwrap();
    }

    #[test]
    fn test_five_infantry_become_a_tank() {
        let mut grid = Grid::new(10, 15);
        let center = HexCoord::new(5, 5);
        place(&mut grid, (5, 5), UnitType::Infantry, Faction::Us);
        for n in center.neighbors().into_iter().take(4) {
            grid.place_unit(n, Unit::new(UnitType::Infantry, Faction::Us)).unwrap();
        }

        let outcome = check_and_merge(&mut grid, center).unwrap().unwrap();
        assert_eq!(outcome.consumed.len(), 5);
        assert_eq!(outcome.to, UnitType::Tank);
        assert_eq!(grid.unit_total(), 1);
        let tank = grid.unit(&center).unwrap();
        assert_eq!(tank.unit_type, UnitType::Tank);
        assert!(tank.newly_created);
    }

    #[test]
    fn test_consumes_center_then_scan_order() {
        let mut grid = Grid::new(10, 15);
        let center = HexCoord::new(5, 5);
        place(&mut grid, (5, 5), UnitType::Tank, Faction::Rok);
        // Neighbours in scan order: (4,5) (4,6) (5,6) (6,5) (6,4) (5,4)
        place(&mut grid, (5, 4), UnitType::Tank, Faction::Rok);
        place(&mut grid, (4, 6), UnitType::Tank, Faction::Rok);
        place(&mut grid, (6, 5), UnitType::Tank, Faction::Rok);

        let outcome = check_and_merge(&mut grid, center).unwrap().unwrap();
        assert_eq!(
            outcome.consumed,
            vec![HexCoord::new(5, 5), HexCoord::new(4, 6), HexCoord::new(6, 5)]
        );
        // The fourth tank survives
        assert_eq!(grid.unit(&HexCoord::new(5, 4)).unwrap().unit_type, UnitType::Tank);
        assert_eq!(grid.unit(&center).unwrap().unit_type, UnitType::Artillery);
        assert_eq!(grid.unit_total(), 2);
    }

    #[test]
    fn test_below_threshold_does_nothing() {
        let mut grid = Grid::new(10, 15);
        let center = HexCoord::new(5, 5);
        place(&mut grid, (5, 5), UnitType::Infantry, Faction::Us);
        for n in center.neighbors().into_iter().take(3) {
            grid.place_unit(n, Unit::new(UnitType::Infantry, Faction::Us)).unwrap();
        }
        assert_eq!(check_and_merge(&mut grid, center), Ok(None));
        assert_eq!(grid.unit_total(), 4);
    }

    #[test]
    fn test_other_factions_and_types_do_not_count() {
        let mut grid = Grid::new(10, 15);
        let center = HexCoord::new(5, 5);
        place(&mut grid, (5, 5), UnitType::Tank, Faction::Us);
        place(&mut grid, (4, 5), UnitType::Tank, Faction::Dprk);
        place(&mut grid, (4, 6), UnitType::Infantry, Faction::Us);
        place(&mut grid, (5, 6), UnitType::Tank, Faction::Us);
        assert_eq!(check_and_merge(&mut grid, center), Ok(None));
    }

    #[test]
    fn test_artillery_never_merges() {
        let mut grid = Grid::new(10, 15);
        let center = HexCoord::new(5, 5);
        for c in grid.neighborhood(&center) {
            grid.place_unit(c, Unit::new(UnitType::Artillery, Faction::Pla)).unwrap();
        }
        assert_eq!(check_and_merge(&mut grid, center), Ok(None));
        assert_eq!(
            merge_units(&mut grid, center, UnitType::Artillery),
            Err(MergeError::NoUpgrade(UnitType::Artillery))
        );
        assert_eq!(grid.unit_total(), 7);
    }

    #[test]
    fn test_precondition_failures_do_not_mutate() {
        let mut grid = Grid::new(10, 15);
        let center = HexCoord::new(5, 5);
        place(&mut grid, (4, 5), UnitType::Tank, Faction::Us);
        place(&mut grid, (4, 6), UnitType::Tank, Faction::Us);
        place(&mut grid, (5, 6), UnitType::Tank, Faction::Us);

        assert_eq!(
            merge_units(&mut grid, center, UnitType::Tank),
            Err(MergeError::MissingUnit {
                coord: center,
                expected: UnitType::Tank
            })
        );

        grid.get_mut(&center).unwrap().terrain = Terrain::Rock;
        assert_eq!(
            merge_units(&mut grid, center, UnitType::Tank),
            Err(MergeError::InvalidCenter(center))
        );
        assert_eq!(grid.unit_total(), 3);
    }

    #[test]
    fn test_stale_plan_is_rejected_whole() {
        let mut grid = Grid::new(10, 15);
        let center = HexCoord::new(5, 5);
        place(&mut grid, (5, 5), UnitType::Tank, Faction::Us);
        place(&mut grid, (4, 5), UnitType::Tank, Faction::Us);
        place(&mut grid, (4, 6), UnitType::Tank, Faction::Us);

        let plan = plan_merge(&grid, center, UnitType::Tank).unwrap();
        grid.take_unit(&HexCoord::new(4, 6));

        assert_eq!(
            apply_merge(&mut grid, plan),
            Err(MergeError::InsufficientUnits {
                found: 2,
                required: 3
            })
        );
        assert_eq!(grid.unit_total(), 2);
        assert_eq!(grid.unit(&center).unwrap().unit_type, UnitType::Tank);
    }

    #[test]
    fn test_merge_by_move_consumes_mover_first() {
        let mut grid = Grid::new(10, 15);
        let origin = HexCoord::new(5, 3);
        let center = HexCoord::new(5, 5);
        place(&mut grid, (5, 3), UnitType::Tank, Faction::Us);
        place(&mut grid, (5, 5), UnitType::Tank, Faction::Us);
        place(&mut grid, (4, 6), UnitType::Tank, Faction::Us);
        place(&mut grid, (6, 4), UnitType::Tank, Faction::Us);

        let plan = plan_merge_by_move(&grid, origin, center).unwrap();
        assert_eq!(
            plan.consumed,
            vec![origin, center, HexCoord::new(4, 6)]
        );

        let outcome = apply_merge(&mut grid, plan).unwrap();
        assert_eq!(outcome.to, UnitType::Artillery);
        assert!(grid.unit(&origin).is_none());
        assert_eq!(grid.unit(&center).unwrap().unit_type, UnitType::Artillery);
        assert_eq!(grid.unit(&HexCoord::new(6, 4)).unwrap().unit_type, UnitType::Tank);
        assert_eq!(grid.unit_total(), 2);
    }

    #[test]
    fn test_merge_by_move_needs_threshold() {
        let mut grid = Grid::new(10, 15);
        let origin = HexCoord::new(5, 3);
        let center = HexCoord::new(5, 5);
        place(&mut grid, (5, 3), UnitType::Tank, Faction::Us);
        place(&mut grid, (5, 5), UnitType::Tank, Faction::Us);

        assert_eq!(
            plan_merge_by_move(&grid, origin, center),
            Err(MergeError::InsufficientUnits {
                found: 2,
                required: 3
            })
        );
    }

    #[test]
    fn test_describe() {
        let outcome = MergeOutcome {
            center: HexCoord::new(2, 3),
            faction: Faction::Us,
            from: UnitType::Infantry,
            to: UnitType::Tank,
            consumed: vec![HexCoord::new(2, 3); 5],
        };
        assert_eq!(
            outcome.describe(),
            "5 Infantrys near [2, 3] merged into 1 Tank (acts next turn)"
        );
    }
}
