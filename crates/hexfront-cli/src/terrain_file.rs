//! Terrain loaded from a JSON file.
//!
//! Two layouts are accepted: a plain list of `{lat, lon, natural}` elements, or an
//! Overpass-style document `{"elements": [{"type": "node", "lat", "lon", "tags": {...}}]}`
//! where `tags.natural` (`water`, `wood`, `rock`) or `tags.landuse = forest` picks the terrain.

use hexfront_core::{NaturalTag, TerrainElement, TerrainError, TerrainProvider};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

/// Reads terrain from a file each time it is fetched.
#[derive(Clone, Debug)]
pub struct JsonTerrainFile {
    path: PathBuf,
}

impl JsonTerrainFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TerrainProvider for JsonTerrainFile {
    fn fetch(&mut self) -> Result<Vec<TerrainElement>, TerrainError> {
        let text = std::fs::read_to_string(&self.path)
            .map_err(|e| TerrainError::Unavailable(format!("{}: {e}", self.path.display())))?;
        let elements = parse_terrain(&text)?;
        debug!(path = %self.path.display(), count = elements.len(), "terrain file read");
        Ok(elements)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TerrainDocument {
    List(Vec<TerrainElement>),
    Overpass { elements: Vec<OverpassElement> },
}

#[derive(Deserialize)]
struct OverpassElement {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

impl OverpassElement {
    fn natural(&self) -> NaturalTag {
        match self.tags.get("natural").map(String::as_str) {
            Some("water") => NaturalTag::Water,
            Some("wood") => NaturalTag::Wood,
            Some("rock") => NaturalTag::Rock,
            _ if self.tags.get("landuse").is_some_and(|l| l == "forest") => NaturalTag::Forest,
            _ => NaturalTag::Other,
        }
    }

    /// Only positioned nodes carry a usable location.
    fn into_element(self) -> Option<TerrainElement> {
        if self.kind.as_deref().is_some_and(|k| k != "node") {
            return None;
        }
        let natural = self.natural();
        Some(TerrainElement::new(self.lat?, self.lon?, natural))
    }
}

/// Parse either accepted layout into terrain elements.
pub fn parse_terrain(text: &str) -> Result<Vec<TerrainElement>, TerrainError> {
    let document: TerrainDocument =
        serde_json::from_str(text).map_err(|e| TerrainError::Malformed(e.to_string()))?;
    Ok(match document {
        TerrainDocument::List(elements) => elements,
        TerrainDocument::Overpass { elements } => elements
            .into_iter()
            .filter_map(OverpassElement::into_element)
            .collect(),
    })
}
