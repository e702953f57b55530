//! Elimination tracking and victory detection.
//!
//! A faction is out once it has no units left on the board. Territory it still holds is reported
//! but does not keep it in the game. The last faction with units wins; if the final units of every
//! remaining faction fall together the game is a draw.

use crate::grid::Grid;
use crate::types::{Faction, FactionTable};
use serde::{Deserialize, Serialize};
use tracing::info;

/// How thoroughly a faction has been eliminated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Elimination {
    /// No units remain, but the faction still owns territory.
    UnitsLost,
    /// No units and no territory.
    Complete,
}

/// How a finished game ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOutcome {
    Victory(Faction),
    Draw,
}

impl GameOutcome {
    /// The winning faction, `None` for a draw.
    pub fn winner(&self) -> Option<Faction> {
        match self {
            GameOutcome::Victory(faction) => Some(*faction),
            GameOutcome::Draw => None,
        }
    }
}

/// Changes found by one evaluation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VictoryReport {
    /// Eliminations recorded or upgraded by this evaluation.
    pub eliminated: Vec<(Faction, Elimination)>,
    /// Set when this evaluation ended the game.
    pub game_over: Option<GameOutcome>,
}

/// Tracks eliminations across a session and decides when the game ends.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct VictoryEvaluator {
    eliminations: FactionTable<Option<Elimination>>,
    outcome: Option<GameOutcome>,
}

impl VictoryEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded outcome, once the game is over.
    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    pub fn is_game_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// Recorded elimination state of a faction.
    pub fn elimination(&self, faction: Faction) -> Option<Elimination> {
        self.eliminations[faction.index()]
    }

    /// Count units per faction and record eliminations and game over.
    ///
    /// Does nothing once the game is over.
    pub fn evaluate(&mut self, grid: &Grid) -> VictoryReport {
        let mut report = VictoryReport::default();
        if self.outcome.is_some() {
            return report;
        }

        let counts = grid.unit_counts();
        let mut survivors = Vec::new();
        for faction in Faction::all() {
            if counts[faction.index()] > 0 {
                survivors.push(*faction);
                continue;
            }
            let has_territory = grid.holds_territory(*faction);
            let slot = &mut self.eliminations[faction.index()];
            let next = match (*slot, has_territory) {
                (None, true) => Some(Elimination::UnitsLost),
                (None, false) | (Some(Elimination::UnitsLost), false) => Some(Elimination::Complete),
                _ => None,
            };
            if let Some(level) = next {
                *slot = Some(level);
                info!(%faction, ?level, "faction eliminated");
                report.eliminated.push((*faction, level));
            }
        }

        let outcome = match survivors.as_slice() {
            [] => Some(GameOutcome::Draw),
            [winner] => Some(GameOutcome::Victory(*winner)),
            _ => None,
        };
        if let Some(outcome) = outcome {
            info!(?outcome, "game over");
            self.outcome = Some(outcome);
            report.game_over = Some(outcome);
        }
        report
    }
}
