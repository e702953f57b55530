//! Settings file loading.

use anyhow::{Context, Result};
use hexfront_core::GameSettings;
use std::path::Path;

/// Load settings from a JSON file, or use the defaults when no path is given.
///
/// Missing keys take their default values. A seed given on the command line wins over the
/// file's.
pub fn load_settings(path: Option<&Path>, seed: Option<u64>) -> Result<GameSettings> {
    let mut settings = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading settings from {}", path.display()))?;
            GameSettings::from_json(&text)
                .with_context(|| format!("invalid settings in {}", path.display()))?
        }
        None => GameSettings::new(),
    };
    if seed.is_some() {
        settings.seed = seed;
    }
    settings.validate()?;
    Ok(settings)
}
