//! Turn and selection bookkeeping.

use crate::hex::HexCoord;
use crate::types::Faction;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Input phase within the active faction's turn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting for a unit to be selected.
    #[default]
    Select,
    /// A unit is selected; waiting for a destination or target.
    Move,
    /// An attack target has been chosen and is being resolved.
    Attack,
}

/// Who may drive the session right now.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControllerMode {
    /// Not started, or the game is over.
    #[default]
    Idle,
    /// A human faction is active and hex selections are accepted.
    AwaitingHumanInput,
    /// A scripted faction is acting.
    RunningAi,
}

/// Turn counter, active faction and per-turn actions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    /// Round number, starting at 1.
    pub number: u32,
    pub active: Faction,
    pub phase: Phase,
    /// Coordinates whose units have acted this turn.
    acted: BTreeSet<HexCoord>,
}

impl TurnState {
    /// First turn with `active` to play.
    pub fn new(active: Faction) -> Self {
        Self {
            number: 1,
            active,
            phase: Phase::Select,
            acted: BTreeSet::new(),
        }
    }

    /// Record that the unit at `coord` has acted. Recording twice has no effect.
    pub fn mark_acted(&mut self, coord: HexCoord) {
        self.acted.insert(coord);
    }

    pub fn has_acted(&self, coord: &HexCoord) -> bool {
        self.acted.contains(coord)
    }

    /// Coordinates that have acted, row-major.
    pub fn acted(&self) -> impl Iterator<Item = &HexCoord> {
        self.acted.iter()
    }

    /// Pass play to the next faction. Returns true if a new round started.
    pub fn advance(&mut self) -> bool {
        self.acted.clear();
        self.phase = Phase::Select;
        self.active = self.active.next();
        let wrapped = self.active == Faction::first();
        if wrapped {
            self.number += 1;
        }
        wrapped
    }
}

/// The currently selected unit and its options.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState {
    pub selected: Option<HexCoord>,
    pub possible_moves: BTreeSet<HexCoord>,
    pub possible_attacks: BTreeSet<HexCoord>,
    pub target: Option<HexCoord>,
}

impl SelectionState {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_none()
    }
}
