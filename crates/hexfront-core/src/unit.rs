//! Unit catalog and unit instances.

use crate::types::Faction;
use serde::{Deserialize, Serialize};

/// Combat statistics for a unit type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitStats {
    /// Starting and maximum health.
    pub max_health: u32,
    /// Attack strength.
    pub attack: u32,
    /// Defense strength. Half of it (floored) is subtracted from incoming attacks.
    pub defense: u32,
    /// Maximum steps per move.
    pub movement: u32,
    /// Maximum attack distance.
    pub range: u32,
}

/// How a unit type consolidates into a stronger one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MergeRule {
    /// Units of the source type needed in a hex neighbourhood.
    pub threshold: usize,
    /// The resulting unit type.
    pub upgrade: UnitType,
}

/// Types of units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitType {
    Infantry,
    Tank,
    Artillery,
}

impl UnitType {
    /// Catalog stats for this unit type.
    pub const fn stats(&self) -> UnitStats {
        match self {
            UnitType::Infantry => UnitStats {
                max_health: 10,
                attack: 10,
                defense: 2,
                movement: 7,
                range: 1,
            },
            UnitType::Tank => UnitStats {
                max_health: 500,
                attack: 100,
                defense: 10,
                movement: 2,
                range: 3,
            },
            UnitType::Artillery => UnitStats {
                max_health: 20,
                attack: 500,
                defense: 5,
                movement: 1,
                range: 6,
            },
        }
    }

    /// Merge rule for this type, if it can upgrade.
    pub const fn merge_rule(&self) -> Option<MergeRule> {
        match self {
            UnitType::Infantry => Some(MergeRule {
                threshold: 5,
                upgrade: UnitType::Tank,
            }),
            UnitType::Tank => Some(MergeRule {
                threshold: 3,
                upgrade: UnitType::Artillery,
            }),
            UnitType::Artillery => None,
        }
    }

    /// Display name.
    pub const fn name(&self) -> &'static str {
        match self {
            UnitType::Infantry => "Infantry",
            UnitType::Tank => "Tank",
            UnitType::Artillery => "Artillery",
        }
    }

    /// Short label drawn on the board.
    pub const fn icon(&self) -> &'static str {
        match self {
            UnitType::Infantry => "Inf",
            UnitType::Tank => "Tnk",
            UnitType::Artillery => "Arty",
        }
    }

    /// Get all unit types.
    pub const fn all() -> &'static [UnitType] {
        &[UnitType::Infantry, UnitType::Tank, UnitType::Artillery]
    }
}

impl std::fmt::Display for UnitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A unit on the board. The hex holding it is its only owner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// Type of unit.
    pub unit_type: UnitType,
    /// Owning faction.
    pub faction: Faction,
    /// Stats copied from the catalog at creation.
    pub stats: UnitStats,
    /// Current health, in `0..=stats.max_health`.
    pub health: u32,
    /// Created this turn cycle; cannot be selected until the next turn boundary.
    pub newly_created: bool,
}

impl Unit {
    /// Create a full-health unit from the catalog.
    pub fn new(unit_type: UnitType, faction: Faction) -> Self {
        let stats = unit_type.stats();
        Self {
            unit_type,
            faction,
            stats,
            health: stats.max_health,
            newly_created: false,
        }
    }

    /// Create a unit produced mid-game by a spawn or merge.
    pub fn spawned(unit_type: UnitType, faction: Faction) -> Self {
        Self {
            newly_created: true,
            ..Self::new(unit_type, faction)
        }
    }

    /// Apply damage. Returns true if the unit was destroyed.
    pub fn take_damage(&mut self, amount: u32) -> bool {
        self.health = self.health.saturating_sub(amount);
        self.is_dead()
    }

    /// Check if the unit has no health left.
    pub fn is_dead(&self) -> bool {
        self.health == 0
    }

    /// Whether `other` could merge with this unit.
    pub fn is_merge_partner(&self, other: &Unit) -> bool {
        self.faction == other.faction && self.unit_type == other.unit_type
    }
}
