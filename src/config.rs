//! Configuration for depth-phase analysis and regional depth constraints
//!
//! Both sections deserialize with defaults for every missing key, so a file
//! only needs to list what it changes:
//!
//! ```
//! use quakedepth::config::EstimatorConfig;
//!
//! let config = EstimatorConfig::from_toml_str(r#"
//!     [depth_phases]
//!     phases = ["pP", "sP"]
//!     min_phase_count = 2
//!
//!     [region_depth]
//!     enabled = true
//!     regions = ["subduction_zone", "stable_craton"]
//! "#).unwrap();
//!
//! assert_eq!(config.depth_phases.min_phase_count, 2);
//! assert_eq!(config.depth_phases.max_depth, 700.0);
//! assert_eq!(config.region_depth.global_default_depth, 10.0);
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Configuration for depth-phase analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepthPhaseConfig {
    /// Depth phases to consider
    pub phases: Vec<String>,
    /// Shallowest depth searched (km)
    pub min_depth: f64,
    /// Deepest depth searched (km)
    pub max_depth: f64,
    /// Minimum epicentral distance for reliable depth phases (deg)
    pub min_distance: f64,
    /// Maximum epicentral distance for depth phases (deg)
    pub max_distance: f64,
    /// Maximum reference-phase residual for an observation to be used (s)
    pub max_residual: f64,
    /// Minimum number of valid observations needed to invert
    pub min_phase_count: usize,
    /// Weight of depth phases relative to P
    pub weight: f64,
    /// Search window before the reference pick, used by pick association (s)
    pub search_window_before: f64,
    /// Search window after the theoretical depth-phase time, used by pick association (s)
    pub search_window_after: f64,
}

impl Default for DepthPhaseConfig {
    fn default() -> Self {
        Self {
            phases: vec!["pP".to_string(), "sP".to_string(), "pwP".to_string()],
            min_depth: 15.0,
            max_depth: 700.0,
            min_distance: 30.0,
            max_distance: 90.0,
            max_residual: 3.0,
            min_phase_count: 3,
            weight: 1.5,
            search_window_before: 5.0,
            search_window_after: 10.0,
        }
    }
}

impl DepthPhaseConfig {
    /// Builder: set the depth range (km).
    pub fn with_depth_range(mut self, min_depth: f64, max_depth: f64) -> Self {
        self.min_depth = min_depth;
        self.max_depth = max_depth;
        self
    }

    /// Builder: set the distance range (deg).
    pub fn with_distance_range(mut self, min_distance: f64, max_distance: f64) -> Self {
        self.min_distance = min_distance;
        self.max_distance = max_distance;
        self
    }

    /// Builder: set the minimum number of valid observations.
    pub fn with_min_phase_count(mut self, min_phase_count: usize) -> Self {
        self.min_phase_count = min_phase_count;
        self
    }

    /// Builder: set the candidate phases.
    pub fn with_phases<I, S>(mut self, phases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.phases = phases.into_iter().map(Into::into).collect();
        self
    }

    /// Returns true if `phase` is one of the configured candidates.
    pub fn considers(&self, phase: &str) -> bool {
        self.phases.iter().any(|p| p == phase)
    }

    /// Returns true if `distance` (deg) lies in the admissible range.
    #[inline]
    pub fn accepts_distance(&self, distance: f64) -> bool {
        (self.min_distance..=self.max_distance).contains(&distance)
    }

    /// Checks the ranges. The analyzer itself does not enforce them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_depth <= self.max_depth) {
            return Err(ConfigError::Invalid(format!(
                "min_depth {} exceeds max_depth {}",
                self.min_depth, self.max_depth
            )));
        }
        if !(self.min_distance <= self.max_distance) {
            return Err(ConfigError::Invalid(format!(
                "min_distance {} exceeds max_distance {}",
                self.min_distance, self.max_distance
            )));
        }
        Ok(())
    }
}

/// Configuration for region-based depth constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionDepthConfig {
    /// Whether region-based constraints are used at all
    pub enabled: bool,
    /// Region names, checked in order; first match wins
    pub regions: Vec<String>,
    /// Default depth when no region matches (km)
    pub global_default_depth: f64,
    /// Maximum depth when no region matches (km)
    pub global_max_depth: f64,
}

impl Default for RegionDepthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            regions: Vec::new(),
            global_default_depth: 10.0,
            global_max_depth: 700.0,
        }
    }
}

impl RegionDepthConfig {
    /// Creates an enabled configuration for the given regions.
    pub fn enabled<I, S>(regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            enabled: true,
            regions: regions.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Builder: set the global fallback depths (km).
    pub fn with_global_depths(mut self, default_depth: f64, max_depth: f64) -> Self {
        self.global_default_depth = default_depth;
        self.global_max_depth = max_depth;
        self
    }
}

/// Both configuration sections, as loaded from one file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    pub depth_phases: DepthPhaseConfig,
    pub region_depth: RegionDepthConfig,
}

impl EstimatorConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Toml {
            path: None,
            source,
        })
    }

    /// Reads and parses a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Toml {
            path: Some(path.to_path_buf()),
            source,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse TOML {path:?}: {source}")]
    Toml {
        path: Option<PathBuf>,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
