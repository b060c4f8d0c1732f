// Geometry module - egocentric alignment and angle primitives
//
// Pipeline:
// - egocentric: rotate/translate/scale poses into a body-centered frame
// - angles: wing angles, wing-arc angles and the signed-angle primitive
//   shared with the kinematics engine

pub mod angles;
pub mod egocentric;

pub use angles::{signed_angle, signed_angle_seq, wing_angles, wing_arc_angles};
pub use egocentric::{
    normalize_pose, normalize_to_egocentric, normalize_to_egocentric_with_angles, EgocentricParams,
};
