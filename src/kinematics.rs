// Kinematics engine - per-actor and inter-actor movement features
//
// Derives the classical courtship feature set from thorax (centroid) and
// head (forward) coordinate tracks of both actors. Every output sequence
// has exactly the input length: difference operations are edge-padded by
// repeating the boundary value, never zero-filled and never shortened.
//
// Degenerate geometry (a zero-length heading or actor-to-actor vector)
// propagates NaN through the affected frames instead of aborting.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::ExtractError;
use crate::fill::fill_missing_track;
use crate::geometry::signed_angle;
use crate::types::Point;

/// Movement features of a single actor, all per-frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorKinematics {
    /// Velocity component along the heading (thorax to head) direction.
    pub forward_velocity: Vec<f64>,
    /// First difference of forward velocity, edge-padded.
    pub forward_acceleration: Vec<f64>,
    /// Signed velocity component perpendicular to the heading.
    pub lateral_velocity: Vec<f64>,
    /// Absolute lateral velocity.
    pub lateral_speed: Vec<f64>,
    /// First difference of lateral velocity, edge-padded.
    pub lateral_acceleration: Vec<f64>,
    /// Signed frame-to-frame change in heading, degrees.
    pub rotational_speed: Vec<f64>,
}

/// Features of one actor directed at the other.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectedKinematics {
    /// Signed angle between own heading and the direction to the other
    /// actor (own head to other's thorax).
    pub subtended_angle: Vec<f64>,
    /// Velocity component toward the other actor.
    pub forward_velocity: Vec<f64>,
    /// Absolute velocity component across the direction to the other actor.
    pub lateral_speed: Vec<f64>,
}

/// Complete kinematic feature set for a two-actor experiment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KinematicFeatures {
    /// Euclidean distance between the two thorax points.
    pub thorax_distance: Vec<f64>,
    pub female: ActorKinematics,
    pub male: ActorKinematics,
    pub male_to_female: DirectedKinematics,
    pub female_to_male: DirectedKinematics,
}

/// Compute the full kinematic feature set.
///
/// All four input tracks are gap-filled first; a track with no valid
/// sample at all aborts with `ExtractError::AllMissing`.
///
/// # Arguments
/// * `f_thorax` / `m_thorax` - Female and male centroid tracks
/// * `f_head` / `m_head` - Female and male forward-joint tracks
pub fn compute_kinematics(
    f_thorax: &[Point],
    m_thorax: &[Point],
    f_head: &[Point],
    m_head: &[Point],
) -> Result<KinematicFeatures, ExtractError> {
    let f_thx = fill_missing_track(f_thorax, "female thorax")?;
    let m_thx = fill_missing_track(m_thorax, "male thorax")?;
    let f_hd = fill_missing_track(f_head, "female head")?;
    let m_hd = fill_missing_track(m_head, "male head")?;

    let n = f_thx.len();
    debug!("[Kinematics] computing features over {} frames", n);

    let thorax_distance: Vec<f64> = f_thx
        .iter()
        .zip(&m_thx)
        .map(|(&f, &m)| (f - m).norm())
        .collect();

    // Per-frame velocity vectors, edge-padded at the tail.
    let m_vel = diff_padded(&m_thx);
    let f_vel = diff_padded(&f_thx);

    // Heading vectors, thorax to head.
    let m_dir: Vec<Point> = m_hd.iter().zip(&m_thx).map(|(&h, &t)| h - t).collect();
    let f_dir: Vec<Point> = f_hd.iter().zip(&f_thx).map(|(&h, &t)| h - t).collect();

    let male = actor_kinematics(&m_vel, &m_dir);
    let female = actor_kinematics(&f_vel, &f_dir);

    // Direction from one actor's head to the other's thorax.
    let mf_dir: Vec<Point> = f_thx.iter().zip(&m_hd).map(|(&f, &m)| f - m).collect();
    let fm_dir: Vec<Point> = m_thx.iter().zip(&f_hd).map(|(&m, &f)| m - f).collect();

    let male_to_female = directed_kinematics(&m_vel, &m_dir, &mf_dir);
    let female_to_male = directed_kinematics(&f_vel, &f_dir, &fm_dir);

    Ok(KinematicFeatures {
        thorax_distance,
        female,
        male,
        male_to_female,
        female_to_male,
    })
}

fn actor_kinematics(vel: &[Point], dir: &[Point]) -> ActorKinematics {
    let dir_unit: Vec<Point> = dir.iter().map(|d| d.unit()).collect();

    let forward_velocity: Vec<f64> = vel
        .iter()
        .zip(&dir_unit)
        .map(|(&v, &u)| v.dot(u))
        .collect();
    let forward_acceleration = diff_padded_scalar(&forward_velocity);

    let lateral_velocity: Vec<f64> = vel
        .iter()
        .zip(&dir_unit)
        .map(|(&v, &u)| v.dot(u.perp()))
        .collect();
    let lateral_speed: Vec<f64> = lateral_velocity.iter().map(|v| v.abs()).collect();
    let lateral_acceleration = diff_padded_scalar(&lateral_velocity);

    ActorKinematics {
        forward_velocity,
        forward_acceleration,
        lateral_velocity,
        lateral_speed,
        lateral_acceleration,
        rotational_speed: rotational_speed(dir),
    }
}

fn directed_kinematics(vel: &[Point], dir: &[Point], other_dir: &[Point]) -> DirectedKinematics {
    let other_unit: Vec<Point> = other_dir.iter().map(|d| d.unit()).collect();

    let subtended_angle: Vec<f64> = dir
        .iter()
        .zip(other_dir)
        .map(|(&d, &o)| signed_angle(d, o))
        .collect();
    let forward_velocity: Vec<f64> = vel
        .iter()
        .zip(&other_unit)
        .map(|(&v, &u)| v.dot(u))
        .collect();
    let lateral_speed: Vec<f64> = vel
        .iter()
        .zip(&other_unit)
        .map(|(&v, &u)| v.dot(u.perp()).abs())
        .collect();

    DirectedKinematics {
        subtended_angle,
        forward_velocity,
        lateral_speed,
    }
}

/// First difference of a point sequence with the last value edge-repeated,
/// preserving length.
fn diff_padded(points: &[Point]) -> Vec<Point> {
    let n = points.len();
    let mut out = Vec::with_capacity(n);
    for t in 0..n.saturating_sub(1) {
        out.push(points[t + 1] - points[t]);
    }
    if let Some(&last) = out.last() {
        out.push(last);
    } else if n > 0 {
        out.push(Point::nan());
    }
    out
}

/// First difference of a scalar sequence with the last value edge-repeated.
fn diff_padded_scalar(series: &[f64]) -> Vec<f64> {
    let n = series.len();
    let mut out = Vec::with_capacity(n);
    for t in 0..n.saturating_sub(1) {
        out.push(series[t + 1] - series[t]);
    }
    if let Some(&last) = out.last() {
        out.push(last);
    } else if n > 0 {
        out.push(f64::NAN);
    }
    out
}

/// Signed heading change between consecutive frames, degrees.
///
/// The core values cover frame pairs (t, t+1) for t in 0..n-2 and land at
/// output indices 1..n-1; both ends are edge-padded so the sequence keeps
/// the input length.
fn rotational_speed(dir: &[Point]) -> Vec<f64> {
    let n = dir.len();
    if n < 3 {
        return vec![f64::NAN; n];
    }

    let core: Vec<f64> = (0..n - 2)
        .map(|t| signed_angle(dir[t], dir[t + 1]))
        .collect();

    let mut out = Vec::with_capacity(n);
    out.push(core[0]);
    out.extend_from_slice(&core);
    out.push(core[core.len() - 1]);
    out
}
