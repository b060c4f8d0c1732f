// Courtship Features Core - behavioral feature extraction
//
// Converts raw two-animal courtship recordings (pose tracks, DAQ sync
// trigger, song segmentation) into a consolidated per-experiment dataset
// of kinematic and acoustic features. Pure, sequential, in-memory
// computation; container parsing and serialization live in thin external
// collaborators.

// Module declarations
pub mod config;
pub mod dataset;
pub mod error;
pub mod fill;
pub mod geometry;
pub mod intervals;
pub mod kinematics;
pub mod song;
pub mod sync;
pub mod types;

// Re-exports for convenience
pub use config::DatasetConfig;
pub use dataset::{assemble, ExperimentDataset, ExperimentInputs, FeatureData, TrackingData};
pub use error::ExtractError;
pub use sync::TimeBase;
pub use types::{Interval, Point, Trajectory, NODE_NAMES};
