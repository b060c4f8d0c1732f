// Acoustic event filter - song interval extraction and quality gating
//
// Song segmentation arrives as three event-presence masks in the DAQ
// sample domain (slow pulse, fast pulse, sine tone) plus pre-computed bout
// boundaries per bout type. This stage extracts per-type event intervals,
// clips everything to the sample range covered by the video, and discards
// sine detections that are unaccompanied by male wing extension.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::intervals::connected_components;
use crate::sync::TimeBase;
use crate::types::Interval;

/// Song segmentation inputs, as produced by the segmentation loader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SongSegmentation {
    /// Slow-pulse presence per DAQ sample.
    pub pulse_slow: Vec<bool>,
    /// Fast-pulse presence per DAQ sample.
    pub pulse_fast: Vec<bool>,
    /// Sine-tone presence per DAQ sample.
    pub sine: Vec<bool>,
    /// Bout boundaries labeled "pulse" by the upstream segmenter.
    pub pulse_bouts: Vec<Interval>,
    /// Bout boundaries labeled "sine".
    pub sine_bouts: Vec<Interval>,
    /// Bout boundaries labeled "mixed".
    pub mix_bouts: Vec<Interval>,
    /// Merged audio trace, if the loader was asked for it.
    #[serde(default)]
    pub audio: Option<Vec<f64>>,
}

/// Binarize a numeric event signal at zero.
///
/// Loader-facing: segmentation containers store event channels as numeric
/// arrays, and loaders run them through here to build the boolean masks
/// [`SongSegmentation`] carries. The extraction core itself only ever sees
/// the boolean form.
pub fn event_mask(signal: &[f64]) -> Vec<bool> {
    signal.iter().map(|&v| v > 0.0).collect()
}

/// Filtered song intervals, all in the DAQ sample domain and clipped to
/// the sample range covered by the experiment's video frames.
///
/// Empty interval sets are a normal outcome (an experiment without sine
/// song, say), never an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilteredSong {
    pub pulse_slow_lims: Vec<Interval>,
    pub pulse_fast_lims: Vec<Interval>,
    pub sine_lims: Vec<Interval>,
    pub pulse_bouts: Vec<Interval>,
    pub sine_bouts: Vec<Interval>,
    pub mix_bouts: Vec<Interval>,
}

/// Extract, range-clip and quality-filter song event intervals.
///
/// # Arguments
/// * `seg` - Raw segmentation masks and bout boundaries
/// * `time_base` - Frame/sample maps for this experiment
/// * `n_track_frames` - Number of frames in the (cropped) tracking data
/// * `wing_ml` / `wing_mr` - Male wing angle features, frame domain
/// * `min_sine_wing_ang` - Wing-angle gate for sine intervals, degrees
pub fn filter_song(
    seg: &SongSegmentation,
    time_base: &TimeBase,
    n_track_frames: usize,
    wing_ml: &[f64],
    wing_mr: &[f64],
    min_sine_wing_ang: f64,
) -> FilteredSong {
    let sample_at_frame = time_base.sample_at_frame();

    // Sample span covered by the tracked video frames. The tracking is
    // cropped to its last finite frame, which may fall short of the full
    // trigger range.
    let s0 = sample_at_frame[0];
    let last = (n_track_frames.saturating_sub(1)).min(sample_at_frame.len() - 1);
    let s1 = sample_at_frame[last];

    let in_range = |iv: &Interval| iv.start as f64 >= s0 && iv.end as f64 <= s1;

    let pulse_slow_lims: Vec<Interval> = connected_components(&seg.pulse_slow)
        .into_iter()
        .filter(in_range)
        .collect();
    let pulse_fast_lims: Vec<Interval> = connected_components(&seg.pulse_fast)
        .into_iter()
        .filter(in_range)
        .collect();
    let sine_candidates: Vec<Interval> = connected_components(&seg.sine)
        .into_iter()
        .filter(in_range)
        .collect();

    let n_candidates = sine_candidates.len();
    let sine_lims: Vec<Interval> = sine_candidates
        .into_iter()
        .filter(|iv| {
            sine_has_wing_extension(iv, time_base, wing_ml, wing_mr, min_sine_wing_ang)
        })
        .collect();
    if n_candidates > sine_lims.len() {
        info!(
            "[Song] dropped {} of {} sine intervals below {:.0} degree wing angle",
            n_candidates - sine_lims.len(),
            n_candidates,
            min_sine_wing_ang
        );
    }

    let filtered = FilteredSong {
        pulse_slow_lims,
        pulse_fast_lims,
        sine_lims,
        pulse_bouts: seg.pulse_bouts.iter().copied().filter(|iv| in_range(iv)).collect(),
        sine_bouts: seg.sine_bouts.iter().copied().filter(|iv| in_range(iv)).collect(),
        mix_bouts: seg.mix_bouts.iter().copied().filter(|iv| in_range(iv)).collect(),
    };
    debug!(
        "[Song] {} slow pulse, {} fast pulse, {} sine intervals retained",
        filtered.pulse_slow_lims.len(),
        filtered.pulse_fast_lims.len(),
        filtered.sine_lims.len()
    );
    filtered
}

/// True if the mapped frame range of a sine interval contains at least one
/// finite wing-angle sample whose value exceeds the threshold.
fn sine_has_wing_extension(
    iv: &Interval,
    time_base: &TimeBase,
    wing_ml: &[f64],
    wing_mr: &[f64],
    min_sine_wing_ang: f64,
) -> bool {
    let frame_at_sample = time_base.frame_at_sample();
    let clamp = |s: usize| s.min(frame_at_sample.len().saturating_sub(1));
    let f0 = frame_at_sample[clamp(iv.start)] as usize;
    let f1 = frame_at_sample[clamp(iv.end)] as usize;

    let max_ang = wing_ml[f0.min(wing_ml.len())..f1.min(wing_ml.len())]
        .iter()
        .chain(&wing_mr[f0.min(wing_mr.len())..f1.min(wing_mr.len())])
        .copied()
        .filter(|a| a.is_finite())
        .fold(f64::NEG_INFINITY, f64::max);

    max_ang.is_finite() && max_ang > min_sine_wing_ang
}

/// A song event located in the video-frame domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongEvent {
    pub kind: SongEventKind,
    /// Video frame of the event's first sample.
    pub frame: usize,
}

/// Event-type indicator, in the (pfast, pslow, sine) order of the source
/// datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SongEventKind {
    PulseFast,
    PulseSlow,
    Sine,
}

/// Locate song events as video-frame indices.
///
/// Auxiliary lookup over an assembled dataset: each interval's start sample
/// is mapped through `frame_at_sample`. When `window` is given as a
/// (lo, hi) pair of frame offsets, events are kept only if the whole offset
/// window around their frame lies inside [0, n_frames), which excludes song
/// at the very start and end of the experiment.
pub fn find_song_frames(
    pulse_fast_lims: &[Interval],
    pulse_slow_lims: &[Interval],
    sine_lims: &[Interval],
    frame_at_sample: &[f64],
    n_frames: usize,
    window: Option<(i64, i64)>,
) -> Vec<SongEvent> {
    let typed = [
        (SongEventKind::PulseFast, pulse_fast_lims),
        (SongEventKind::PulseSlow, pulse_slow_lims),
        (SongEventKind::Sine, sine_lims),
    ];

    let mut events = Vec::new();
    for (kind, lims) in typed {
        for iv in lims {
            let s = iv.start.min(frame_at_sample.len().saturating_sub(1));
            let frame = frame_at_sample[s] as usize;
            if let Some((lo, hi)) = window {
                let f = frame as i64;
                if f + lo < 0 || f + hi >= n_frames as i64 {
                    continue;
                }
            }
            events.push(SongEvent { kind, frame });
        }
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Trigger with one exposure every 4 samples, 10 frames total.
    fn test_time_base() -> TimeBase {
        let mut trigger = vec![0.0; 40];
        for f in 0..10 {
            trigger[f * 4] = 3.0;
            trigger[f * 4 + 1] = 3.0;
        }
        TimeBase::from_trigger(&trigger, 1.5, "test").unwrap()
    }

    fn seg_with_sine(sine: Vec<bool>) -> SongSegmentation {
        let n = sine.len();
        SongSegmentation {
            pulse_slow: vec![false; n],
            pulse_fast: vec![false; n],
            sine,
            pulse_bouts: vec![],
            sine_bouts: vec![],
            mix_bouts: vec![],
            audio: None,
        }
    }

    #[test]
    fn test_sine_below_wing_threshold_is_discarded() {
        let tb = test_time_base();
        let mut sine = vec![false; 40];
        for s in 8..20 {
            sine[s] = true;
        }
        let seg = seg_with_sine(sine);
        let wings = vec![10.0; 10];

        let filtered = filter_song(&seg, &tb, 10, &wings, &wings, 30.0);
        assert!(filtered.sine_lims.is_empty());
    }

    #[test]
    fn test_sine_with_wing_extension_is_retained() {
        let tb = test_time_base();
        let mut sine = vec![false; 40];
        for s in 8..20 {
            sine[s] = true;
        }
        let seg = seg_with_sine(sine);
        let mut wing_ml = vec![10.0; 10];
        wing_ml[3] = 45.0; // inside the mapped frame range of [8, 20)
        let wing_mr = vec![f64::NAN; 10];

        let filtered = filter_song(&seg, &tb, 10, &wing_ml, &wing_mr, 30.0);
        assert_eq!(filtered.sine_lims, vec![Interval::new(8, 20)]);
    }

    #[test]
    fn test_sine_with_no_finite_wing_samples_is_discarded() {
        let tb = test_time_base();
        let mut sine = vec![false; 40];
        for s in 8..20 {
            sine[s] = true;
        }
        let seg = seg_with_sine(sine);
        let nan_wings = vec![f64::NAN; 10];

        let filtered = filter_song(&seg, &tb, 10, &nan_wings, &nan_wings, 30.0);
        assert!(filtered.sine_lims.is_empty());
    }

    #[test]
    fn test_intervals_outside_video_range_are_clipped() {
        let tb = test_time_base();
        // First exposure midpoint is at sample 0.5; an interval starting at
        // sample 0 precedes the video range and must be dropped.
        let mut pfast = vec![false; 40];
        pfast[0] = true;
        for s in 10..14 {
            pfast[s] = true;
        }
        let mut seg = seg_with_sine(vec![false; 40]);
        seg.pulse_fast = pfast;
        let wings = vec![40.0; 10];

        let filtered = filter_song(&seg, &tb, 10, &wings, &wings, 30.0);
        assert_eq!(filtered.pulse_fast_lims, vec![Interval::new(10, 14)]);
    }

    #[test]
    fn test_bout_boundaries_are_range_clipped_but_not_gated() {
        let tb = test_time_base();
        let mut seg = seg_with_sine(vec![false; 40]);
        seg.sine_bouts = vec![Interval::new(0, 2), Interval::new(10, 14)];
        let wings = vec![0.0; 10]; // below any gate; bouts pass regardless

        let filtered = filter_song(&seg, &tb, 10, &wings, &wings, 30.0);
        assert_eq!(filtered.sine_bouts, vec![Interval::new(10, 14)]);
    }

    #[test]
    fn test_empty_masks_give_empty_sets() {
        let tb = test_time_base();
        let seg = seg_with_sine(vec![false; 40]);
        let wings = vec![40.0; 10];
        let filtered = filter_song(&seg, &tb, 10, &wings, &wings, 30.0);
        assert!(filtered.pulse_slow_lims.is_empty());
        assert!(filtered.pulse_fast_lims.is_empty());
        assert!(filtered.sine_lims.is_empty());
    }

    #[test]
    fn test_event_mask_binarizes_at_zero() {
        assert_eq!(
            event_mask(&[-1.0, 0.0, 0.5, 2.0]),
            vec![false, false, true, true]
        );
    }

    #[test]
    fn test_find_song_frames_maps_and_windows() {
        let tb = test_time_base();
        let pfast = vec![Interval::new(8, 12)];
        let sine = vec![Interval::new(36, 38)];
        let events = find_song_frames(&pfast, &[], &sine, tb.frame_at_sample(), 10, None);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, SongEventKind::PulseFast);
        assert_eq!(events[0].frame, 2);

        // A window reaching 2 frames past the event excludes the late sine
        // event near the end of the recording.
        let windowed = find_song_frames(
            &pfast,
            &[],
            &sine,
            tb.frame_at_sample(),
            10,
            Some((-2, 2)),
        );
        assert_eq!(windowed.len(), 1);
        assert_eq!(windowed[0].kind, SongEventKind::PulseFast);
    }
}
