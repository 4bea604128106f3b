use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::geometry::Axis;

/// Options for decoding binary meshes.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ParseConfig {
    /// Reject files with bytes left over after the last declared triangle.
    /// Off by default, trailing data is then silently ignored.
    pub strict_length: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SliceConfig {
    pub axis: Axis,
    /// Distance between consecutive slicing planes.
    pub layer_height: f32,
    /// Position of the first plane along `axis`. Defaults to the lower bound
    /// of the mesh.
    pub start: Option<f32>,
    /// Number of planes. Defaults to however many are needed to cover the
    /// mesh.
    pub layers: Option<u32>,
    pub parallel: bool,

    pub parse: ParseConfig,
}

impl SliceConfig {
    /// Loads a TOML config file. Missing keys fall back to their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let file = fs::read(path)
            .with_context(|| format!("Failed to read config file `{}`", path.display()))?;
        let string = String::from_utf8_lossy(&file);
        let config = toml::from_str(&string)
            .with_context(|| format!("Invalid config file `{}`", path.display()))?;
        info!("Loaded config from `{}`", path.display());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let string = toml::to_string(self)?;
        fs::write(path, string)?;
        Ok(())
    }
}

impl Default for SliceConfig {
    fn default() -> Self {
        Self {
            axis: Axis::Z,
            layer_height: 1.0,
            start: None,
            layers: None,
            parallel: false,
            parse: ParseConfig::default(),
        }
    }
}
