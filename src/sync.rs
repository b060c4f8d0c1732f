// Time-base aligner - frame/sample maps from the exposure trigger
//
// The camera exposure trigger is recorded on the DAQ alongside the audio
// channels. Each maximal run of the high state is one frame exposure; the
// run midpoint is the DAQ sample assigned to that video frame. From the
// per-frame midpoints we also derive the inverse map, the nearest video
// frame for every DAQ sample.

use log::{debug, info};

use crate::error::ExtractError;
use crate::intervals::connected_components;

/// Bidirectional frame/sample index maps for one experiment.
///
/// Read-only after construction: built once from the trigger signal and
/// shared by every stage that crosses between the video-frame and
/// DAQ-sample timelines.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TimeBase {
    sample_at_frame: Vec<f64>,
    frame_at_sample: Vec<f64>,
}

impl TimeBase {
    /// Build the frame/sample maps from a raw trigger signal.
    ///
    /// The signal is binarized at `threshold` (below -> low, at/above ->
    /// high), maximal high runs become frame exposures, and each frame is
    /// assigned its run's midpoint sample, start + (len - 1) / 2. The
    /// inverse map assigns every DAQ sample the nearest frame by midpoint,
    /// extrapolating past the observed range with the boundary frames.
    ///
    /// # Arguments
    /// * `trigger` - Raw exposure trigger sampled at the DAQ rate
    /// * `threshold` - Binarization threshold (typically 1.5)
    /// * `expt_name` - Experiment identifier, used in diagnostics
    ///
    /// # Returns
    /// * `Err(ExtractError::MissingSyncSignal)` if no exposure runs exist
    pub fn from_trigger(
        trigger: &[f64],
        threshold: f64,
        expt_name: &str,
    ) -> Result<Self, ExtractError> {
        let mask: Vec<bool> = trigger.iter().map(|&v| v >= threshold).collect();
        let runs = connected_components(&mask);

        if runs.is_empty() {
            return Err(ExtractError::MissingSyncSignal {
                expt_name: expt_name.to_string(),
            });
        }

        let sample_at_frame: Vec<f64> = runs
            .iter()
            .map(|run| run.start as f64 + (run.len() as f64 - 1.0) / 2.0)
            .collect();

        // Nearest-neighbor inverse map over every DAQ sample. Midpoints and
        // sample indices both ascend, so a single forward sweep suffices;
        // ties at the exact midpoint keep the earlier frame.
        let mut frame_at_sample = Vec::with_capacity(trigger.len());
        let mut k = 0;
        for j in 0..trigger.len() {
            let s = j as f64;
            while k + 1 < sample_at_frame.len()
                && (sample_at_frame[k + 1] - s).abs() < (sample_at_frame[k] - s).abs()
            {
                k += 1;
            }
            frame_at_sample.push(k as f64);
        }

        info!(
            "[Sync] {} frame exposures detected over {} DAQ samples",
            sample_at_frame.len(),
            trigger.len()
        );
        debug!(
            "[Sync] first frame at sample {:.1}, last at {:.1}",
            sample_at_frame[0],
            sample_at_frame[sample_at_frame.len() - 1]
        );

        Ok(Self {
            sample_at_frame,
            frame_at_sample,
        })
    }

    /// Estimated DAQ sample index per video frame.
    pub fn sample_at_frame(&self) -> &[f64] {
        &self.sample_at_frame
    }

    /// Nearest video frame index per DAQ sample.
    pub fn frame_at_sample(&self) -> &[f64] {
        &self.frame_at_sample
    }

    /// Number of video frames detected in the trigger.
    pub fn n_frames(&self) -> usize {
        self.sample_at_frame.len()
    }

    /// Number of DAQ samples covered by the inverse map.
    pub fn n_samples(&self) -> usize {
        self.frame_at_sample.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_midpoints_match_worked_example() {
        // Two runs: [2, 5) of length 3 and [7, 9) of length 2.
        let trigger = [0.0, 0.0, 2.0, 2.0, 2.0, 0.0, 0.0, 2.0, 2.0, 0.0];
        let tb = TimeBase::from_trigger(&trigger, 1.5, "test").unwrap();
        assert_eq!(tb.sample_at_frame(), &[3.0, 7.5]);
        assert_eq!(tb.n_frames(), 2);
    }

    #[test]
    fn test_inverse_map_is_nearest_neighbor_with_extrapolation() {
        let trigger = [0.0, 0.0, 2.0, 2.0, 2.0, 0.0, 0.0, 2.0, 2.0, 0.0];
        let tb = TimeBase::from_trigger(&trigger, 1.5, "test").unwrap();
        // Midpoints at 3.0 and 7.5; samples 0..=5 are nearer frame 0
        // (5.25 is the switch point), samples 6..=9 nearer frame 1.
        assert_eq!(
            tb.frame_at_sample(),
            &[0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0]
        );
    }

    #[test]
    fn test_threshold_boundary_is_high() {
        let trigger = [0.0, 1.5, 1.5, 0.0];
        let tb = TimeBase::from_trigger(&trigger, 1.5, "test").unwrap();
        assert_eq!(tb.sample_at_frame(), &[1.5]);
    }

    #[test]
    fn test_no_runs_is_missing_sync_error() {
        let trigger = [0.0, 0.2, 0.4, 0.0];
        let err = TimeBase::from_trigger(&trigger, 1.5, "expt_42").unwrap_err();
        assert_eq!(
            err,
            ExtractError::MissingSyncSignal {
                expt_name: "expt_42".to_string()
            }
        );
    }

    #[test]
    fn test_single_sample_run() {
        let trigger = [0.0, 3.0, 0.0];
        let tb = TimeBase::from_trigger(&trigger, 1.5, "test").unwrap();
        assert_eq!(tb.sample_at_frame(), &[1.0]);
        assert_eq!(tb.frame_at_sample(), &[0.0, 0.0, 0.0]);
    }
}
