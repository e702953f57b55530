//! Error types for game operations.

use crate::hex::HexCoord;
use crate::settings::SettingsError;
use crate::types::Faction;
use crate::unit::UnitType;

/// Convenience alias for results of session operations.
pub type GameResult<T> = Result<T, GameError>;

/// Why a hex could not be selected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionReason {
    /// The unit belongs to another faction.
    WrongFaction,
    /// The unit already moved or attacked this turn.
    AlreadyActed,
    /// The unit was created this turn cycle.
    NewlyCreated,
    /// The hex is rock.
    Impassable,
}

impl SelectionReason {
    /// Player-facing text.
    pub const fn message(&self) -> &'static str {
        match self {
            SelectionReason::WrongFaction => "Cannot select units of another faction",
            SelectionReason::AlreadyActed => "This unit has already acted this turn",
            SelectionReason::NewlyCreated => "Newly created units must wait until next turn to act",
            SelectionReason::Impassable => "Rocks are impassable",
        }
    }
}

impl std::fmt::Display for SelectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Errors returned by session operations. A rejected operation leaves the game unchanged.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("{0}")]
    InvalidSelection(SelectionReason),
    #[error("Cannot move or attack {0}")]
    IllegalDestination(HexCoord),
    #[error("Merge failed: {0}")]
    Merge(#[from] MergeError),
    #[error("AI is taking its turn, please wait...")]
    AiTurnInProgress,
    #[error("It is not a scripted faction's turn")]
    NotAiTurn,
    #[error("The game is over")]
    GameOver,
    #[error("The game has not started")]
    NotStarted,
    #[error("The game has already started")]
    AlreadyStarted,
    #[error("{0} is off the board")]
    OutOfBounds(HexCoord),
    #[error("Initialization failed: {0}")]
    Init(#[from] InitError),
}

/// Merge failures. None of them mutate the board.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MergeError {
    #[error("center position {0} is rock or invalid")]
    InvalidCenter(HexCoord),
    #[error("no {expected} at {coord}")]
    MissingUnit { coord: HexCoord, expected: UnitType },
    #[error("no unit at {0} to merge")]
    NoMover(HexCoord),
    #[error("{0} units do not merge further")]
    NoUpgrade(UnitType),
    #[error("internal error, found {found} of {required} units to consume")]
    InsufficientUnits { found: usize, required: usize },
}

/// Failures that abort starting a session.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InitError {
    #[error("invalid settings: {0}")]
    Settings(#[from] SettingsError),
    #[error("could not place any units for {0}")]
    NoUnitsPlaced(Faction),
    #[error("board is {found:?}, settings expect {expected:?}")]
    GridMismatch { expected: (u32, u32), found: (u32, u32) },
}

/// Terrain source failures. These are recovered by generating default terrain.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TerrainError {
    #[error("terrain source unavailable: {0}")]
    Unavailable(String),
    #[error("malformed terrain data: {0}")]
    Malformed(String),
}

impl From<SettingsError> for GameError {
    fn from(err: SettingsError) -> Self {
        GameError::Init(InitError::Settings(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_messages() {
        let err = GameError::InvalidSelection(SelectionReason::Impassable);
        assert_eq!(err.to_string(), "Rocks are impassable");
        let err = GameError::InvalidSelection(SelectionReason::NewlyCreated);
        assert!(err.to_string().contains("next turn"));
    }

    #[test]
    fn test_merge_error_converts() {
        let err: GameError = MergeError::InsufficientUnits {
            found: 2,
            required: 3,
        }
        .into();
        assert!(matches!(err, GameError::Merge(_)));
        assert!(err.to_string().starts_with("Merge failed"));
    }

    #[test]
    fn test_illegal_destination_message() {
        let err = GameError::IllegalDestination(HexCoord::new(4, 2));
        assert_eq!(err.to_string(), "Cannot move or attack [4, 2]");
    }
}
