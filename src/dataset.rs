// Dataset assembler - orchestrates the full extraction pipeline
//
// Runs the stages strictly in dependency order: time base -> egocentric
// alignment -> wing/arc angles -> kinematics -> song filtering, then packs
// everything into an immutable ExperimentDataset. The dataset flattens to a
// string-keyed feature map only at the serialization boundary, using the
// key names of the established dataset layout (trxF, egoMrF, mFV, ...).

use std::collections::BTreeMap;

use log::info;
use serde::{Deserialize, Serialize};

use crate::config::DatasetConfig;
use crate::error::ExtractError;
use crate::geometry::{
    normalize_to_egocentric, wing_angles, wing_arc_angles, EgocentricParams,
};
use crate::geometry::angles::WingArcJoints;
use crate::kinematics::{compute_kinematics, KinematicFeatures};
use crate::song::{filter_song, FilteredSong, SongSegmentation};
use crate::sync::TimeBase;
use crate::types::{Interval, Trajectory};

/// Tracking data for one experiment, as produced by the trajectory loader:
/// cropped to the last frame with any finite coordinate, actors ordered
/// (female, male), joint ordering shared between actors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingData {
    pub female: Trajectory,
    pub male: Trajectory,
    pub node_names: Vec<String>,
}

/// Everything the assembler consumes, gathered by the I/O collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentInputs {
    pub expt_name: String,
    pub expt_folder: String,
    /// Raw exposure trigger in the DAQ sample domain.
    pub trigger: Vec<f64>,
    pub tracking: TrackingData,
    /// Song segmentation; may be absent when only tracking features are
    /// wanted.
    #[serde(default)]
    pub song: Option<SongSegmentation>,
}

/// The consolidated per-experiment feature set.
///
/// Created once by [`assemble`], immutable afterward, handed to the
/// external writer via [`ExperimentDataset::to_feature_map`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentDataset {
    pub expt_name: String,
    pub expt_folder: String,
    pub node_names: Vec<String>,
    pub time_base: TimeBase,
    pub trx_f: Trajectory,
    pub trx_m: Trajectory,
    pub ego_f: Trajectory,
    pub ego_m: Trajectory,
    /// Female pose in the male's reference frame.
    pub ego_f_rel_m: Trajectory,
    /// Male pose in the female's reference frame.
    pub ego_m_rel_f: Trajectory,
    pub wing_fl: Vec<f64>,
    pub wing_fr: Vec<f64>,
    pub wing_ml: Vec<f64>,
    pub wing_mr: Vec<f64>,
    pub arc_theta_l: Vec<f64>,
    pub arc_theta_r: Vec<f64>,
    pub kinematics: KinematicFeatures,
    pub song: Option<FilteredSong>,
    pub audio: Option<Vec<f64>>,
}

/// A single entry of the flattened feature bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FeatureData {
    /// Per-frame (or per-sample) scalar sequence.
    Series(Vec<f64>),
    /// Pose track shaped (frame, joint, 2).
    Tracks(Trajectory),
    /// Event intervals, (n, 2) start/end pairs.
    Intervals(Vec<Interval>),
    Text(String),
    TextList(Vec<String>),
}

/// Run the full extraction pipeline over one experiment's inputs.
///
/// Structural failures (no sync pulses, empty tracking, an all-missing
/// channel) abort before any output exists; numerical degeneracies come
/// through as NaN in the affected feature frames.
pub fn assemble(
    inputs: &ExperimentInputs,
    config: &DatasetConfig,
) -> Result<ExperimentDataset, ExtractError> {
    info!("[Dataset] assembling features for '{}'", inputs.expt_name);

    let tracking = &inputs.tracking;
    if tracking.female.is_empty() || tracking.male.is_empty() {
        return Err(ExtractError::MissingTrackingData {
            expt_name: inputs.expt_name.clone(),
            details: "tracking trajectories are empty".to_string(),
        });
    }

    let time_base =
        TimeBase::from_trigger(&inputs.trigger, config.sync.trigger_threshold, &inputs.expt_name)?;

    let ego_params = EgocentricParams {
        ctr_ind: config.pose.ctr_ind,
        fwd_ind: config.pose.fwd_ind,
        scale_factor: config.pose.scale_factor,
        fill: true,
    };
    let trx_f = &tracking.female;
    let trx_m = &tracking.male;

    let ego_f = normalize_to_egocentric(trx_f, None, &ego_params)?;
    let ego_m = normalize_to_egocentric(trx_m, None, &ego_params)?;
    let ego_f_rel_m = normalize_to_egocentric(trx_f, Some(trx_m), &ego_params)?;
    let ego_m_rel_f = normalize_to_egocentric(trx_m, Some(trx_f), &ego_params)?;

    let (wing_fl, wing_fr) =
        wing_angles(&ego_f, config.pose.left_wing_ind, config.pose.right_wing_ind);
    let (wing_ml, wing_mr) =
        wing_angles(&ego_m, config.pose.left_wing_ind, config.pose.right_wing_ind);

    let arc_joints = WingArcJoints {
        thorax_ind: config.pose.ctr_ind,
        head_ind: config.pose.fwd_ind,
        left_wing_ind: config.pose.left_wing_ind,
        right_wing_ind: config.pose.right_wing_ind,
    };
    let (arc_theta_l, arc_theta_r) = wing_arc_angles(trx_m, trx_f, &arc_joints)?;

    let kinematics = compute_kinematics(
        &trx_f.joint_track(config.pose.ctr_ind),
        &trx_m.joint_track(config.pose.ctr_ind),
        &trx_f.joint_track(config.pose.fwd_ind),
        &trx_m.joint_track(config.pose.fwd_ind),
    )?;
    info!("[Dataset] kinematic features computed over {} frames", trx_f.len());

    let (song, audio) = if config.skip_audio {
        (None, None)
    } else {
        match &inputs.song {
            Some(seg) => {
                let filtered = filter_song(
                    seg,
                    &time_base,
                    trx_f.len(),
                    &wing_ml,
                    &wing_mr,
                    config.song.min_sine_wing_ang,
                );
                let audio = if config.with_audio {
                    seg.audio.clone()
                } else {
                    None
                };
                (Some(filtered), audio)
            }
            None => (None, None),
        }
    };

    Ok(ExperimentDataset {
        expt_name: inputs.expt_name.clone(),
        expt_folder: inputs.expt_folder.clone(),
        node_names: tracking.node_names.clone(),
        time_base,
        trx_f: trx_f.clone(),
        trx_m: trx_m.clone(),
        ego_f,
        ego_m,
        ego_f_rel_m,
        ego_m_rel_f,
        wing_fl,
        wing_fr,
        wing_ml,
        wing_mr,
        arc_theta_l,
        arc_theta_r,
        kinematics,
        song,
        audio,
    })
}

impl ExperimentDataset {
    /// Flatten the dataset into the string-keyed map consumed by the
    /// container writer.
    ///
    /// Key names mirror the established dataset layout so downstream
    /// analysis code keeps working unchanged.
    pub fn to_feature_map(&self) -> BTreeMap<String, FeatureData> {
        let mut map = BTreeMap::new();
        let mut put = |k: &str, v: FeatureData| {
            map.insert(k.to_string(), v);
        };

        put("expt_name", FeatureData::Text(self.expt_name.clone()));
        put("expt_folder", FeatureData::Text(self.expt_folder.clone()));
        put("node_names", FeatureData::TextList(self.node_names.clone()));

        put(
            "sample_at_frame",
            FeatureData::Series(self.time_base.sample_at_frame().to_vec()),
        );
        put(
            "frame_at_sample",
            FeatureData::Series(self.time_base.frame_at_sample().to_vec()),
        );

        put("trxF", FeatureData::Tracks(self.trx_f.clone()));
        put("trxM", FeatureData::Tracks(self.trx_m.clone()));
        put("egoF", FeatureData::Tracks(self.ego_f.clone()));
        put("egoM", FeatureData::Tracks(self.ego_m.clone()));
        put("egoFrM", FeatureData::Tracks(self.ego_f_rel_m.clone()));
        put("egoMrF", FeatureData::Tracks(self.ego_m_rel_f.clone()));

        put("wingFL", FeatureData::Series(self.wing_fl.clone()));
        put("wingFR", FeatureData::Series(self.wing_fr.clone()));
        put("wingML", FeatureData::Series(self.wing_ml.clone()));
        put("wingMR", FeatureData::Series(self.wing_mr.clone()));
        put("arcThetaL", FeatureData::Series(self.arc_theta_l.clone()));
        put("arcThetaR", FeatureData::Series(self.arc_theta_r.clone()));

        let k = &self.kinematics;
        put("mfDist", FeatureData::Series(k.thorax_distance.clone()));
        put("mFV", FeatureData::Series(k.male.forward_velocity.clone()));
        put("fFV", FeatureData::Series(k.female.forward_velocity.clone()));
        put("mFA", FeatureData::Series(k.male.forward_acceleration.clone()));
        put("fFA", FeatureData::Series(k.female.forward_acceleration.clone()));
        put("mLV", FeatureData::Series(k.male.lateral_velocity.clone()));
        put("fLV", FeatureData::Series(k.female.lateral_velocity.clone()));
        put("mLS", FeatureData::Series(k.male.lateral_speed.clone()));
        put("fLS", FeatureData::Series(k.female.lateral_speed.clone()));
        put("mLA", FeatureData::Series(k.male.lateral_acceleration.clone()));
        put("fLA", FeatureData::Series(k.female.lateral_acceleration.clone()));
        put("mRS", FeatureData::Series(k.male.rotational_speed.clone()));
        put("fRS", FeatureData::Series(k.female.rotational_speed.clone()));
        put("mfAng", FeatureData::Series(k.male_to_female.subtended_angle.clone()));
        put("fmAng", FeatureData::Series(k.female_to_male.subtended_angle.clone()));
        put("mfFV", FeatureData::Series(k.male_to_female.forward_velocity.clone()));
        put("fmFV", FeatureData::Series(k.female_to_male.forward_velocity.clone()));
        put("mfLS", FeatureData::Series(k.male_to_female.lateral_speed.clone()));
        put("fmLS", FeatureData::Series(k.female_to_male.lateral_speed.clone()));

        if let Some(song) = &self.song {
            put("pslow_lims", FeatureData::Intervals(song.pulse_slow_lims.clone()));
            put("pfast_lims", FeatureData::Intervals(song.pulse_fast_lims.clone()));
            put("sine_lims", FeatureData::Intervals(song.sine_lims.clone()));
            put("pulse_bouts", FeatureData::Intervals(song.pulse_bouts.clone()));
            put("sine_bouts", FeatureData::Intervals(song.sine_bouts.clone()));
            put("mix_bouts", FeatureData::Intervals(song.mix_bouts.clone()));
        }
        if let Some(audio) = &self.audio {
            put("audio", FeatureData::Series(audio.clone()));
        }

        map
    }
}
