// Egocentric transform - body-centered pose normalization
//
// Re-expresses a pose sequence in a reference frame defined by a centroid
// joint and a forward joint: translate so the centroid sits at the origin,
// scale, then rotate by the negative heading angle so the forward direction
// lies on the positive x axis. The reference frame may come from the other
// actor, which yields "pose of A as seen from B" coordinates.

use crate::error::ExtractError;
use crate::fill::fill_missing_track;
use crate::types::{Point, Trajectory};

/// Parameters for egocentric normalization.
#[derive(Debug, Clone, Copy)]
pub struct EgocentricParams {
    /// Index of the centroid joint.
    pub ctr_ind: usize,
    /// Index of the "forward" joint (e.g., head).
    pub fwd_ind: usize,
    /// Spatial scaling applied to coordinates after centering.
    pub scale_factor: f64,
    /// Interpolate missing centroid/forward coordinates before computing
    /// headings. If false, timesteps with missing reference coordinates
    /// come out all-NaN.
    pub fill: bool,
}

impl Default for EgocentricParams {
    fn default() -> Self {
        Self {
            ctr_ind: 1,
            fwd_ind: 0,
            scale_factor: 1.0,
            fill: true,
        }
    }
}

/// Normalize a pose trajectory to egocentric coordinates.
///
/// `rel_to` is the trajectory defining the reference frame; pass `None` to
/// align each pose to its own body axis.
pub fn normalize_to_egocentric(
    x: &Trajectory,
    rel_to: Option<&Trajectory>,
    params: &EgocentricParams,
) -> Result<Trajectory, ExtractError> {
    normalize_to_egocentric_with_angles(x, rel_to, params).map(|(ego, _)| ego)
}

/// Normalize a pose trajectory and also return the per-frame heading angles
/// (radians, from atan2) of the reference frame.
///
/// A zero-length centroid-to-forward vector makes the heading NaN for that
/// frame; the NaN propagates through the rotated coordinates rather than
/// raising an error.
pub fn normalize_to_egocentric_with_angles(
    x: &Trajectory,
    rel_to: Option<&Trajectory>,
    params: &EgocentricParams,
) -> Result<(Trajectory, Vec<f64>), ExtractError> {
    let rel_to = rel_to.unwrap_or(x);
    let n_frames = x.len();
    let n_joints = x.n_joints();

    let mut ctr = rel_to.joint_track(params.ctr_ind);
    let mut fwd = rel_to.joint_track(params.fwd_ind);
    if params.fill {
        ctr = fill_missing_track(&ctr, "reference centroid")?;
        fwd = fill_missing_track(&fwd, "reference forward")?;
    }

    let mut ego = Trajectory::filled_nan(n_frames, n_joints);
    let mut angles = Vec::with_capacity(n_frames);

    for f in 0..n_frames {
        let ego_fwd = fwd[f] - ctr[f];
        let ang = ego_fwd.y.atan2(ego_fwd.x);
        angles.push(ang);

        let (ca, sa) = (ang.cos(), ang.sin());
        for j in 0..n_joints {
            let p = (x.get(f, j) - ctr[f]).scaled_down(params.scale_factor);
            // Rotation by -ang aligns the forward direction with +x.
            ego.set(f, j, Point::new(p.x * ca + p.y * sa, -p.x * sa + p.y * ca));
        }
    }

    Ok((ego, angles))
}

/// Normalize a single pose (one frame) to egocentric coordinates.
///
/// Convenience wrapper over the trajectory form; shape is preserved.
pub fn normalize_pose(
    pose: &[Point],
    rel_to: Option<&[Point]>,
    params: &EgocentricParams,
) -> Result<(Vec<Point>, f64), ExtractError> {
    let n_joints = pose.len();
    let x = Trajectory::from_frames(vec![pose.to_vec()], n_joints);
    let rel = rel_to.map(|r| Trajectory::from_frames(vec![r.to_vec()], r.len()));
    let (ego, angles) = normalize_to_egocentric_with_angles(&x, rel.as_ref(), params)?;
    Ok((ego.frame(0).to_vec(), angles[0]))
}
