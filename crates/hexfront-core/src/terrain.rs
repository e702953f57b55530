//! Terrain types and the natural-feature tags they are ingested from.

use serde::{Deserialize, Serialize};

/// Terrain of a single hex.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terrain {
    #[default]
    Plain,
    Forest,
    Rock,
    Water,
}

impl Terrain {
    /// Overwrite priority during ingestion: rock(3) > forest(2) > plain(1) > water(0).
    pub const fn priority(&self) -> u8 {
        match self {
            Terrain::Rock => 3,
            Terrain::Forest => 2,
            Terrain::Plain => 1,
            Terrain::Water => 0,
        }
    }

    /// Rock blocks movement, occupation and line of sight.
    pub const fn is_rock(&self) -> bool {
        matches!(self, Terrain::Rock)
    }

    /// Whether a unit may stand here.
    pub const fn is_passable(&self) -> bool {
        !self.is_rock()
    }

    /// Defenders standing here take reduced damage.
    pub const fn gives_cover(&self) -> bool {
        matches!(self, Terrain::Forest)
    }

    /// One-character map glyph.
    pub const fn glyph(&self) -> char {
        match self {
            Terrain::Plain => '.',
            Terrain::Forest => '♣',
            Terrain::Rock => '▲',
            Terrain::Water => '~',
        }
    }

    /// Get all terrain variants.
    pub const fn all() -> &'static [Terrain] {
        &[Terrain::Plain, Terrain::Forest, Terrain::Rock, Terrain::Water]
    }
}

impl std::fmt::Display for Terrain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Terrain::Plain => "plain",
            Terrain::Forest => "forest",
            Terrain::Rock => "rock",
            Terrain::Water => "water",
        };
        f.write_str(name)
    }
}

/// The `natural` tag carried by a terrain source element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NaturalTag {
    Water,
    Wood,
    Forest,
    Rock,
    #[serde(other)]
    Other,
}

impl NaturalTag {
    /// The terrain this tag maps to. Unrecognised tags map to plain.
    pub const fn terrain(&self) -> Terrain {
        match self {
            NaturalTag::Water => Terrain::Water,
            NaturalTag::Wood | NaturalTag::Forest => Terrain::Forest,
            NaturalTag::Rock => Terrain::Rock,
            NaturalTag::Other => Terrain::Plain,
        }
    }
}
