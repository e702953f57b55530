//! Combat system: attack range, line of sight and damage.
//!
//! Attacks are deterministic. Damage is the attacker's attack minus half the defender's defense
//! (at least 1), reduced by a fifth when the defender stands in forest. There is no counter-attack.

use crate::grid::Grid;
use crate::hex::HexCoord;
use crate::terrain::Terrain;
use crate::types::Faction;
use crate::unit::{Unit, UnitType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// Result of a resolved attack.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatResult {
    /// Attacker position.
    pub attacker: HexCoord,
    /// Defender position.
    pub defender: HexCoord,
    pub attacker_type: UnitType,
    pub attacker_faction: Faction,
    pub defender_type: UnitType,
    pub defender_faction: Faction,
    /// Damage dealt to the defender.
    pub damage: u32,
    /// Defender health after the attack.
    pub remaining_health: u32,
    /// Whether the defender was destroyed and removed.
    pub defender_destroyed: bool,
    /// Whether forest cover reduced the damage.
    pub cover: bool,
}

/// Context for a damage calculation. The defender's terrain is passed in explicitly.
#[derive(Clone, Copy, Debug)]
pub struct CombatContext<'a> {
    pub attacker: &'a Unit,
    pub defender: &'a Unit,
    pub defender_terrain: Terrain,
}

/// Damage an attack deals: `max(1, attack - floor(defense / 2))`, then `floor(x * 0.8)` in forest.
///
/// The result is never below 1.
pub fn calculate_damage(ctx: &CombatContext) -> u32 {
    let raw = ctx
        .attacker
        .stats
        .attack
        .saturating_sub(ctx.defender.stats.defense / 2)
        .max(1);
    if ctx.defender_terrain.gives_cover() {
        (raw * 4 / 5).max(1)
    } else {
        raw
    }
}

/// Check whether rock blocks the line from `from` to `to`.
///
/// Every sampled point after the start is checked, the target included.
pub fn is_attack_blocked(grid: &Grid, from: &HexCoord, to: &HexCoord) -> bool {
    from.line_to(to)
        .iter()
        .skip(1)
        .any(|c| grid.get(c).is_some_and(|h| h.terrain.is_rock()))
}

/// Check if the unit at `from` could attack `to` right now.
pub fn can_attack(grid: &Grid, from: &HexCoord, to: &HexCoord) -> bool {
    let (Some(attacker), Some(defender)) = (grid.unit(from), grid.unit(to)) else {
        return false;
    };
    from != to
        && attacker.faction != defender.faction
        && from.distance(to) <= attacker.stats.range
        && !is_attack_blocked(grid, from, to)
}

/// All enemy-held hexes the unit at `origin` can attack.
pub fn possible_attacks(grid: &Grid, origin: HexCoord) -> BTreeSet<HexCoord> {
    let Some(attacker) = grid.unit(&origin) else {
        return BTreeSet::new();
    };
    let range = attacker.stats.range as i32;

    let mut targets = BTreeSet::new();
    for row in origin.row - range..=origin.row + range {
        for col in origin.col - range..=origin.col + range {
            let target = HexCoord::new(row, col);
            if grid.in_bounds(&target) && can_attack(grid, &origin, &target) {
                targets.insert(target);
            }
        }
    }
    targets
}

/// Resolve an attack from `from` on `to`, removing the defender if destroyed.
///
/// Returns `None` without changing the board if either hex lacks a unit.
pub fn resolve_attack(grid: &mut Grid, from: HexCoord, to: HexCoord) -> Option<CombatResult> {
    let attacker = grid.unit(&from)?.clone();
    let defender_terrain = grid.terrain(&to);
    let defender = grid.unit_mut(&to)?;

    let damage = calculate_damage(&CombatContext {
        attacker: &attacker,
        defender: &*defender,
        defender_terrain,
    });
    let destroyed = defender.take_damage(damage);
    let result = CombatResult {
        attacker: from,
        defender: to,
        attacker_type: attacker.unit_type,
        attacker_faction: attacker.faction,
        defender_type: defender.unit_type,
        defender_faction: defender.faction,
        damage,
        remaining_health: defender.health,
        defender_destroyed: destroyed,
        cover: defender_terrain.gives_cover(),
    };

    if destroyed {
        grid.take_unit(&to);
    }
    debug!(
        attacker = %from,
        defender = %to,
        damage,
        destroyed,
        "attack resolved"
    );
    Some(result)
}
