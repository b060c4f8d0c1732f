//! Configuration for dataset assembly
//!
//! All tunable parameters (joint indices, thresholds, scale factors) are
//! explicit configuration passed into each pipeline stage; there is no
//! process-wide mutable state. A JSON config file can override the defaults
//! for fast iteration without recompilation.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Complete dataset-assembly configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub sync: SyncConfig,
    pub pose: PoseConfig,
    pub song: SongFilterConfig,
    /// Include the raw merged audio trace in the output bundle. This
    /// drastically increases output size.
    pub with_audio: bool,
    /// Assemble tracking features only; skip all song processing.
    pub skip_audio: bool,
}

/// Time-base alignment parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Threshold separating the trigger's low and high states. Samples at or
    /// above this value count as an active frame exposure.
    pub trigger_threshold: f64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            // Exposure trigger swings between 0V and ~3V; 1.5 splits the rails.
            trigger_threshold: 1.5,
        }
    }
}

/// Joint topology parameters for egocentric alignment and wing geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoseConfig {
    /// Index of the centroid joint (thorax).
    pub ctr_ind: usize,
    /// Index of the "forward" joint (head).
    pub fwd_ind: usize,
    /// Index of the left wing tip.
    pub left_wing_ind: usize,
    /// Index of the right wing tip.
    pub right_wing_ind: usize,
    /// Spatial scaling applied to coordinates after centering.
    pub scale_factor: f64,
}

impl Default for PoseConfig {
    fn default() -> Self {
        Self {
            ctr_ind: 1,
            fwd_ind: 0,
            left_wing_ind: 3,
            right_wing_ind: 4,
            scale_factor: 1.0,
        }
    }
}

/// Acoustic event filtering parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SongFilterConfig {
    /// Minimum wing angle (degrees) that must occur within a sine bout for
    /// it to be considered valid. Filters noisy sine predictions that are
    /// unaccompanied by wing extension.
    pub min_sine_wing_ang: f64,
}

impl Default for SongFilterConfig {
    fn default() -> Self {
        Self {
            min_sine_wing_ang: 30.0,
        }
    }
}

impl Default for DatasetConfig {
    /// Default configuration values (fallback if config file not found)
    fn default() -> Self {
        Self {
            sync: SyncConfig::default(),
            pose: PoseConfig::default(),
            song: SongFilterConfig::default(),
            with_audio: false,
            skip_audio: false,
        }
    }
}

impl DatasetConfig {
    /// Load configuration from a JSON file.
    ///
    /// Falls back to defaults if the file is missing or malformed; the
    /// fallback is logged, never fatal.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Could not read {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }
}
