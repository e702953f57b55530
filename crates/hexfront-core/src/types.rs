//! Core types shared throughout the crate.

use serde::{Deserialize, Serialize};

/// One of the four playable sides, in fixed turn order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Faction {
    Us,
    Rok,
    Dprk,
    Pla,
}

impl Faction {
    /// Number of factions in a session.
    pub const COUNT: usize = 4;

    /// All factions in turn order.
    pub const fn all() -> &'static [Faction; Faction::COUNT] {
        &[Faction::Us, Faction::Rok, Faction::Dprk, Faction::Pla]
    }

    /// Position of this faction in turn order (0-3).
    pub const fn index(&self) -> usize {
        match self {
            Faction::Us => 0,
            Faction::Rok => 1,
            Faction::Dprk => 2,
            Faction::Pla => 3,
        }
    }

    /// The faction that plays after this one, wrapping to the first.
    pub const fn next(&self) -> Faction {
        Faction::all()[(self.index() + 1) % Faction::COUNT]
    }

    /// The first faction in turn order. Rotation onto it starts a new turn number.
    pub const fn first() -> Faction {
        Faction::Us
    }

    /// Short display code.
    pub const fn code(&self) -> &'static str {
        match self {
            Faction::Us => "US",
            Faction::Rok => "ROK",
            Faction::Dprk => "DPRK",
            Faction::Pla => "PLA",
        }
    }
}

impl std::fmt::Display for Faction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Faction {
    type Err = UnknownFaction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Faction::all()
            .iter()
            .copied()
            .find(|f| f.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownFaction(s.to_string()))
    }
}

/// A faction code that does not name any playable side.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown faction: {0}")]
pub struct UnknownFaction(pub String);

/// Per-faction table indexed by turn order.
pub type FactionTable<T> = [T; Faction::COUNT];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_wraps() {
        assert_eq!(Faction::Us.next(), Faction::Rok);
        assert_eq!(Faction::Rok.next(), Faction::Dprk);
        assert_eq!(Faction::Dprk.next(), Faction::Pla);
        assert_eq!(Faction::Pla.next(), Faction::Us);
    }

    #[test]
    fn test_index_matches_order() {
        for (i, faction) in Faction::all().iter().enumerate() {
            assert_eq!(faction.index(), i);
        }
    }

    #[test]
    fn test_parse() {
        assert_eq!("dprk".parse::<Faction>(), Ok(Faction::Dprk));
        assert_eq!(" PLA ".parse::<Faction>(), Ok(Faction::Pla));
        assert!("NATO".parse::<Faction>().is_err());
    }

    #[test]
    fn test_serde_uses_codes() {
        let json = serde_json::to_string(&Faction::Rok).unwrap();
        assert_eq!(json, "\"ROK\"");
        let back: Faction = serde_json::from_str("\"DPRK\"").unwrap();
        assert_eq!(back, Faction::Dprk);
    }
}
