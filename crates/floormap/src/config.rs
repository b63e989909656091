//! JSON configuration for a mapping session.

use std::{fs, path::Path};

use floormap_classify::ClassifierSpec;
use floormap_grid::GridConfig;
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum ConfigIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Grid geometry plus the classifier to calibrate.
///
/// Every field is optional in the JSON file:
///
/// ```json
/// {
///   "grid": { "grid_size": 1000, "footprint": 30 },
///   "classifier": { "kind": "hue", "percentile": 95.0 }
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    pub grid: GridConfig,
    pub classifier: ClassifierSpec,
}

impl MapperConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
