/// Occlusion configuration, loaded once at startup
use crate::occlusion::packed_box::RANGE_EXTREME;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid occlusion config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OcclusionConfig {
    /// Periodically write the occupancy raster to `raster_path`.
    pub debug_raster: bool,
    pub raster_path: PathBuf,
    /// Minimum time between two raster dumps.
    pub dump_interval_ms: u64,
    /// Coarsest box range the demo draws when occluding sub-boxes.
    pub default_range_limit: u8,
}

impl Default for OcclusionConfig {
    fn default() -> Self {
        Self {
            debug_raster: false,
            raster_path: PathBuf::from("occlusion_raster.png"),
            dump_interval_ms: 1000,
            default_range_limit: RANGE_EXTREME,
        }
    }
}

impl OcclusionConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }
}
