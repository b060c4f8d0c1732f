// End-to-end pipeline tests over synthetic experiments
//
// Builds fully synthetic experiment inputs (walking actors, a pulsed
// exposure trigger, hand-placed song masks) and checks the assembled
// dataset against the documented contracts: time-base worked example,
// constant-velocity kinematics, wing-angle gating of sine intervals, and
// determinism of the flattened bundle.

use courtship_features::config::DatasetConfig;
use courtship_features::dataset::{assemble, ExperimentInputs, TrackingData};
use courtship_features::song::SongSegmentation;
use courtship_features::sync::TimeBase;
use courtship_features::types::{Interval, Point, Trajectory, NODE_NAMES};

const N_FRAMES: usize = 20;
const SAMPLES_PER_FRAME: usize = 10;

/// Exposure trigger with one two-sample pulse per frame.
fn make_trigger() -> Vec<f64> {
    let mut trigger = vec![0.0; N_FRAMES * SAMPLES_PER_FRAME];
    for f in 0..N_FRAMES {
        trigger[f * SAMPLES_PER_FRAME] = 3.0;
        trigger[f * SAMPLES_PER_FRAME + 1] = 3.0;
    }
    trigger
}

/// A 13-joint actor walking in a straight line with an optional wing
/// extension angle (degrees) applied symmetrically from `wing_from_frame`.
fn walking_actor(
    origin: Point,
    step: Point,
    wing_ext_deg: f64,
    wing_from_frame: usize,
) -> Trajectory {
    let frames = (0..N_FRAMES)
        .map(|t| {
            let thorax = Point::new(
                origin.x + step.x * t as f64,
                origin.y + step.y * t as f64,
            );
            let heading = step.y.atan2(step.x);
            let fwd = Point::new(heading.cos(), heading.sin());

            // Wings fold along -heading, rotated out by the extension angle
            // (left wing toward -y in the egocentric frame, right toward +y).
            let ext = if t >= wing_from_frame { wing_ext_deg } else { 0.0 };
            let wing_l_ang = heading + std::f64::consts::PI + ext.to_radians();
            let wing_r_ang = heading + std::f64::consts::PI - ext.to_radians();

            let mut pose = vec![Point::nan(); NODE_NAMES.len()];
            pose[0] = thorax + fwd; // head
            pose[1] = thorax;
            pose[2] = thorax - fwd; // abdomen
            pose[3] = thorax + Point::new(wing_l_ang.cos(), wing_l_ang.sin()); // wingL
            pose[4] = thorax + Point::new(wing_r_ang.cos(), wing_r_ang.sin()); // wingR
            for j in 5..NODE_NAMES.len() {
                pose[j] = thorax;
            }
            pose
        })
        .collect();
    Trajectory::from_frames(frames, NODE_NAMES.len())
}

fn make_inputs(male_wing_ext: f64, sine_span: Option<(usize, usize)>) -> ExperimentInputs {
    let female = walking_actor(Point::new(20.0, 0.0), Point::new(0.0, 0.5), 0.0, 0);
    let male = walking_actor(Point::new(0.0, 0.0), Point::new(1.0, 0.0), male_wing_ext, 0);

    let n_samples = N_FRAMES * SAMPLES_PER_FRAME;
    let song = sine_span.map(|(s0, s1)| {
        let mut sine = vec![false; n_samples];
        for s in s0..s1 {
            sine[s] = true;
        }
        SongSegmentation {
            pulse_slow: vec![false; n_samples],
            pulse_fast: vec![false; n_samples],
            sine,
            pulse_bouts: vec![],
            sine_bouts: vec![Interval::new(s0, s1)],
            mix_bouts: vec![],
            audio: None,
        }
    });

    ExperimentInputs {
        expt_name: "synthetic_expt".to_string(),
        expt_folder: "/data/synthetic_expt".to_string(),
        trigger: make_trigger(),
        tracking: TrackingData {
            female,
            male,
            node_names: NODE_NAMES.iter().map(|s| s.to_string()).collect(),
        },
        song,
    }
}

#[test]
fn test_time_base_worked_example() {
    let trigger = [0.0, 0.0, 2.0, 2.0, 2.0, 0.0, 0.0, 2.0, 2.0, 0.0];
    let tb = TimeBase::from_trigger(&trigger, 1.5, "worked_example").unwrap();
    assert_eq!(tb.sample_at_frame(), &[3.0, 7.5]);
    assert_eq!(tb.frame_at_sample().len(), 10);
    // Nearest-neighbor extrapolation covers every sample with a frame index.
    assert!(tb.frame_at_sample().iter().all(|&f| f == 0.0 || f == 1.0));
}

#[test]
fn test_constant_velocity_male_features() {
    let inputs = make_inputs(0.0, None);
    let ds = assemble(&inputs, &DatasetConfig::default()).unwrap();

    for t in 0..N_FRAMES {
        assert!(
            (ds.kinematics.male.forward_velocity[t] - 1.0).abs() < 1e-9,
            "mFV at {}: {}",
            t,
            ds.kinematics.male.forward_velocity[t]
        );
        assert!(ds.kinematics.male.lateral_velocity[t].abs() < 1e-9);
        assert!(ds.kinematics.male.rotational_speed[t].abs() < 0.02);
    }
}

#[test]
fn test_wing_angles_reflect_extension() {
    // 40 degree symmetric wing extension: both wing angles come out
    // positive and near 40 in the egocentric frame.
    let inputs = make_inputs(40.0, None);
    let ds = assemble(&inputs, &DatasetConfig::default()).unwrap();
    for t in 0..N_FRAMES {
        assert!(
            (ds.wing_ml[t] - 40.0).abs() < 1e-6,
            "wingML at {}: {}",
            t,
            ds.wing_ml[t]
        );
        assert!((ds.wing_mr[t] - 40.0).abs() < 1e-6);
        assert!((-180.0..=180.0).contains(&ds.wing_fl[t]));
    }
}

#[test]
fn test_sine_gating_drops_quiet_wings() {
    // Max male wing angle is 10 degrees: the sine interval must be dropped.
    let inputs = make_inputs(10.0, Some((50, 90)));
    let ds = assemble(&inputs, &DatasetConfig::default()).unwrap();
    let song = ds.song.as_ref().unwrap();
    assert!(song.sine_lims.is_empty());
    // The upstream sine bout boundaries pass through un-gated.
    assert_eq!(song.sine_bouts, vec![Interval::new(50, 90)]);
}

#[test]
fn test_sine_gating_keeps_extended_wings() {
    // 45 degrees clears the default 30 degree gate.
    let inputs = make_inputs(45.0, Some((50, 90)));
    let ds = assemble(&inputs, &DatasetConfig::default()).unwrap();
    let song = ds.song.as_ref().unwrap();
    assert_eq!(song.sine_lims, vec![Interval::new(50, 90)]);
}

#[test]
fn test_pipeline_is_pure_and_deterministic() {
    let inputs = make_inputs(45.0, Some((50, 90)));
    let config = DatasetConfig::default();
    let a = serde_json::to_vec(&assemble(&inputs, &config).unwrap().to_feature_map()).unwrap();
    let b = serde_json::to_vec(&assemble(&inputs, &config).unwrap().to_feature_map()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_feature_lengths_match_frame_count() {
    let inputs = make_inputs(0.0, Some((50, 90)));
    let ds = assemble(&inputs, &DatasetConfig::default()).unwrap();
    assert_eq!(ds.wing_ml.len(), N_FRAMES);
    assert_eq!(ds.arc_theta_l.len(), N_FRAMES);
    assert_eq!(ds.kinematics.thorax_distance.len(), N_FRAMES);
    assert_eq!(ds.kinematics.female_to_male.subtended_angle.len(), N_FRAMES);
    assert_eq!(ds.ego_f.len(), N_FRAMES);
    assert_eq!(ds.time_base.n_frames(), N_FRAMES);
}

#[test]
fn test_egocentric_forward_on_axis_for_assembled_dataset() {
    let inputs = make_inputs(0.0, None);
    let ds = assemble(&inputs, &DatasetConfig::default()).unwrap();
    for t in 0..N_FRAMES {
        let head = ds.ego_m.get(t, 0);
        assert!(head.x > 0.0);
        assert!(head.y.abs() < 1e-9);
    }
}
