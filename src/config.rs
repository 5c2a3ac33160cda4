//! Run configuration, loaded from YAML
//!
//! ```yaml
//! output:
//!   largest_component: largest_component.wkt
//!   component_prefix: component_
//!   shifted: shifted.wkt
//!   isolated_points: false
//! graph:
//!   multilinestring: skip   # or: split
//! reproject:
//!   target_crs: EPSG:3857
//!   strict: false
//! ```
//!
//! Every key is optional.

use crate::builder::MultiLineStringPolicy;
use crate::reproject::DEFAULT_TARGET_CRS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

/// Output file naming and content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// File for the largest component
    pub largest_component: String,
    /// Other components are written to `<prefix><N>.wkt`, N from 1
    pub component_prefix: String,
    /// File for the origin-shifted largest component
    pub shifted: String,
    /// Also write nodes without edges as POINT lines
    pub isolated_points: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            largest_component: "largest_component.wkt".to_string(),
            component_prefix: "component_".to_string(),
            shifted: "shifted.wkt".to_string(),
            isolated_points: false,
        }
    }
}

impl OutputConfig {
    /// File name of the `n`th non-largest component (1-based)
    pub fn component_file(&self, n: usize) -> String {
        format!("{}{}.wkt", self.component_prefix, n)
    }
}

/// Graph construction settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub multilinestring: MultiLineStringPolicy,
}

/// Reprojection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReprojectConfig {
    pub target_crs: String,
    /// Fail on unsupported geometry types instead of writing empty lines
    pub strict: bool,
}

impl Default for ReprojectConfig {
    fn default() -> Self {
        Self {
            target_crs: DEFAULT_TARGET_CRS.to_string(),
            strict: false,
        }
    }
}

/// Full configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub output: OutputConfig,
    pub graph: GraphConfig,
    pub reproject: ReprojectConfig,
}

impl Config {
    pub fn from_yaml(text: &str, path: &Path) -> Result<Self, ConfigError> {
        serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text, path)
    }

    /// Load `explicit` if given, else the per-user config file if it
    /// exists, else defaults
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match default_config_path() {
            Some(path) if path.is_file() => {
                debug!(path = %path.display(), "using user config");
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }
}

/// The per-user config file (~/.config/wktgraph/config.yaml on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("wktgraph").join("config.yaml"))
}
