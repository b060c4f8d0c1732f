// Angle primitives - wing angles, wing-arc angles, signed angles
//
// Conventions, reproduced exactly because downstream feature semantics
// depend on them:
// - Wing angles are degrees in [-180, 180], 0 on the thorax-to-head
//   midline, with the right wing negated so positive means outward
//   extension on both sides.
// - signed_angle(a, b) is positive when a rotates clockwise to align with
//   b (cross >= 0 -> negative, cross < 0 -> positive), with the normalized
//   dot rounded to 4 decimals before arccos to dodge floating-point
//   domain overshoot.
// - Wing-arc angles are unsigned degrees in [0, 180] from a clamped
//   arccos.

use crate::error::ExtractError;
use crate::fill::fill_missing_track;
use crate::types::{Point, Trajectory};

/// Indices of the joints used by the wing-arc computation.
#[derive(Debug, Clone, Copy)]
pub struct WingArcJoints {
    pub thorax_ind: usize,
    pub head_ind: usize,
    pub left_wing_ind: usize,
    pub right_wing_ind: usize,
}

impl Default for WingArcJoints {
    fn default() -> Self {
        Self {
            thorax_ind: 1,
            head_ind: 0,
            left_wing_ind: 3,
            right_wing_ind: 4,
        }
    }
}

/// Signed angle in degrees between two 2D vectors.
///
/// Positive if `a` is rotated clockwise to align with `b`, negative for
/// counter-clockwise. NaN inputs and zero-length vectors propagate NaN.
pub fn signed_angle(a: Point, b: Point) -> f64 {
    let a = a.unit();
    let b = b.unit();
    // Rounding keeps |dot| <= 1 when normalization overshoots by an ulp.
    let dot = (a.dot(b) * 1e4).round() / 1e4;
    let theta = dot.acos().to_degrees();
    if a.cross(b) >= 0.0 {
        -theta
    } else {
        theta
    }
}

/// Element-wise [`signed_angle`] over two equal-length vector sequences.
pub fn signed_angle_seq(a: &[Point], b: &[Point]) -> Vec<f64> {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(&va, &vb)| signed_angle(va, vb)).collect()
}

/// Wing angles in degrees from an egocentrically normalized pose.
///
/// Both outputs are in [-180, 180], where 0 means the wing lies exactly on
/// the midline. Positive values denote extension away from the midline in
/// the direction of that wing, so a right wing extension has thetaR > 0.
///
/// # Arguments
/// * `ego` - Egocentric trajectory (see geometry::egocentric)
/// * `left_ind` / `right_ind` - Wing tip joint indices
///
/// # Returns
/// Tuple of (thetaL, thetaR) per-frame sequences.
pub fn wing_angles(ego: &Trajectory, left_ind: usize, right_ind: usize) -> (Vec<f64>, Vec<f64>) {
    let mut theta_l = Vec::with_capacity(ego.len());
    let mut theta_r = Vec::with_capacity(ego.len());

    for f in 0..ego.len() {
        let l = ego.get(f, left_ind);
        let r = ego.get(f, right_ind);
        theta_l.push(midline_angle(l));
        theta_r.push(-midline_angle(r));
    }

    (theta_l, theta_r)
}

/// Polar angle shifted to [-180, 180] about the midline (the -x axis in the
/// egocentric frame, since wings trail behind the thorax).
fn midline_angle(p: Point) -> f64 {
    let mut theta = p.y.atan2(p.x).to_degrees() + 180.0;
    if theta.is_finite() && theta > 180.0 {
        theta -= 360.0;
    }
    theta
}

/// Angle between each of the male's wing normals and the female's head,
/// from raw (non-egocentric) trajectories.
///
/// For each wing: take the midpoint between thorax and wing tip, rotate the
/// midpoint-to-tip bearing by -90 degrees (right wing) or +90 degrees (left
/// wing) to get the wing's normal direction, and measure the unsigned angle
/// between that normal and the vector from the midpoint to the other
/// actor's head. The closer to 0, the more squarely the wing faces the
/// female's head.
///
/// # Returns
/// Tuple of (arcThetaL, arcThetaR), both per-frame degrees in [0, 180].
pub fn wing_arc_angles(
    trx_m: &Trajectory,
    trx_f: &Trajectory,
    joints: &WingArcJoints,
) -> Result<(Vec<f64>, Vec<f64>), ExtractError> {
    let m_thorax = fill_missing_track(&trx_m.joint_track(joints.thorax_ind), "male thorax")?;
    let m_wing_l = fill_missing_track(&trx_m.joint_track(joints.left_wing_ind), "male wingL")?;
    let m_wing_r = fill_missing_track(&trx_m.joint_track(joints.right_wing_ind), "male wingR")?;
    let f_head = fill_missing_track(&trx_f.joint_track(joints.head_ind), "female head")?;

    let n = trx_m.len();
    let mut arc_l = Vec::with_capacity(n);
    let mut arc_r = Vec::with_capacity(n);

    for f in 0..n {
        arc_r.push(arc_angle(m_thorax[f], m_wing_r[f], f_head[f], -90.0));
        arc_l.push(arc_angle(m_thorax[f], m_wing_l[f], f_head[f], 90.0));
    }

    Ok((arc_l, arc_r))
}

/// Unsigned arc angle for one wing at one frame.
fn arc_angle(thorax: Point, wing: Point, other_head: Point, normal_offset_deg: f64) -> f64 {
    let mid = thorax.midpoint(wing);
    let mid_to_tip = wing - mid;
    let bearing = mid_to_tip.y.atan2(mid_to_tip.x).to_degrees().rem_euclid(360.0);

    let normal_rad = (bearing + normal_offset_deg).to_radians();
    let normal = Point::new(normal_rad.cos(), normal_rad.sin());
    let to_head = other_head - mid;

    let cos_angle = to_head.dot(normal) / (to_head.norm() * normal.norm());
    cos_angle.clamp(-1.0, 1.0).acos().to_degrees()
}
