// Error types for the courtship feature extraction pipeline
//
// Structural failures (missing sync pulses, missing tracking data, a fully
// missing coordinate channel) abort the extraction before any output is
// written. Purely numerical degeneracies (zero-length heading vectors,
// NaN geometry) are NOT errors: they propagate as NaN through the feature
// arrays so the rest of the dataset stays usable.

use log::error;
use std::fmt;

/// Structural extraction errors.
///
/// Every variant carries enough context to produce a diagnostic naming the
/// missing input and the experiment it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractError {
    /// No frame-exposure runs were found in the trigger signal.
    MissingSyncSignal { expt_name: String },

    /// Tracking data for the experiment is absent or empty.
    ///
    /// Locating and parsing the tracking container is a loader concern, but
    /// the failure is surfaced through the same taxonomy so the run aborts
    /// with a uniform diagnostic.
    MissingTrackingData { expt_name: String, details: String },

    /// An entire coordinate channel has no valid samples, so gap filling
    /// has nothing to extend from.
    AllMissing { channel: String },
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractError::MissingSyncSignal { expt_name } => write!(
                f,
                "No frame exposure pulses detected in sync signal for experiment '{}'",
                expt_name
            ),
            ExtractError::MissingTrackingData { expt_name, details } => write!(
                f,
                "No usable tracking data for experiment '{}': {}",
                expt_name, details
            ),
            ExtractError::AllMissing { channel } => write!(
                f,
                "Channel '{}' has no valid samples; cannot fill missing values",
                channel
            ),
        }
    }
}

impl std::error::Error for ExtractError {}

/// Log an extraction error with structured context.
///
/// The logging is non-blocking and will not panic on failure.
pub fn log_extract_error(err: &ExtractError, context: &str) {
    error!("Extraction error in {}: {}", context, err);
}
