// Types module - Core data structures for the extraction pipeline
//
// This module defines the shared data model used throughout feature
// extraction: 2D points with NaN-encoded missing samples, per-actor
// trajectories over a fixed joint topology, and half-open index intervals.

use serde::{Deserialize, Serialize};

/// Canonical joint ordering shared by both actors.
///
/// Index 1 (thorax) is the default centroid joint and index 0 (head) the
/// default forward joint for egocentric alignment. Indices 3 and 4 are the
/// left and right wing tips.
pub const NODE_NAMES: [&str; 13] = [
    "head",
    "thorax",
    "abdomen",
    "wingL",
    "wingR",
    "forelegL4",
    "forelegR4",
    "midlegL4",
    "midlegR4",
    "hindlegL4",
    "hindlegR4",
    "eyeL",
    "eyeR",
];

/// A 2D coordinate sample.
///
/// Missing samples are encoded as NaN components rather than dropped, so
/// every trajectory stays aligned to the video frame index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// A fully missing sample.
    pub fn nan() -> Self {
        Self {
            x: f64::NAN,
            y: f64::NAN,
        }
    }

    /// True if both coordinates are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Dot product with another point interpreted as a vector.
    pub fn dot(&self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// 2D cross product (z-component of the 3D cross).
    pub fn cross(&self, other: Point) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// Euclidean norm.
    pub fn norm(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Unit vector in the same direction.
    ///
    /// A zero-length vector divides to NaN components; callers rely on NaN
    /// propagation for degenerate geometry rather than an error.
    pub fn unit(&self) -> Point {
        let n = self.norm();
        Point::new(self.x / n, self.y / n)
    }

    /// Perpendicular vector, rotated +90 degrees: (x, y) -> (-y, x).
    pub fn perp(&self) -> Point {
        Point::new(-self.y, self.x)
    }

    /// Midpoint between two points.
    pub fn midpoint(&self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Scale both coordinates by 1/factor.
    pub fn scaled_down(&self, factor: f64) -> Point {
        Point::new(self.x / factor, self.y / factor)
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

/// Pose track for a single actor, shaped (frame, joint).
///
/// Stored flat in frame-major order. The joint ordering is fixed and shared
/// across actors (see [`NODE_NAMES`]); missing samples are NaN, never removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    points: Vec<Point>,
    n_joints: usize,
}

impl Trajectory {
    /// Create a trajectory of the given shape with every sample missing.
    pub fn filled_nan(n_frames: usize, n_joints: usize) -> Self {
        Self {
            points: vec![Point::nan(); n_frames * n_joints],
            n_joints,
        }
    }

    /// Build from per-frame poses. Every frame must have `n_joints` joints.
    pub fn from_frames(frames: Vec<Vec<Point>>, n_joints: usize) -> Self {
        debug_assert!(frames.iter().all(|f| f.len() == n_joints));
        Self {
            points: frames.into_iter().flatten().collect(),
            n_joints,
        }
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        if self.n_joints == 0 {
            0
        } else {
            self.points.len() / self.n_joints
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn n_joints(&self) -> usize {
        self.n_joints
    }

    /// Pose at a single frame.
    pub fn frame(&self, frame: usize) -> &[Point] {
        let i = frame * self.n_joints;
        &self.points[i..i + self.n_joints]
    }

    pub fn get(&self, frame: usize, joint: usize) -> Point {
        self.points[frame * self.n_joints + joint]
    }

    pub fn set(&mut self, frame: usize, joint: usize, p: Point) {
        self.points[frame * self.n_joints + joint] = p;
    }

    /// Copy of the time series for a single joint.
    pub fn joint_track(&self, joint: usize) -> Vec<Point> {
        (0..self.len()).map(|f| self.get(f, joint)).collect()
    }
}

/// A half-open [start, end) index interval into a 1D timeline.
///
/// Invariant: start < end. Interval tracks produced by connected-component
/// extraction are disjoint and sorted ascending by start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub start: usize,
    pub end: usize,
}

impl Interval {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start < end);
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_unit_of_zero_vector_is_nan() {
        let u = Point::new(0.0, 0.0).unit();
        assert!(u.x.is_nan());
        assert!(u.y.is_nan());
    }

    #[test]
    fn test_point_perp_rotates_counterclockwise() {
        let p = Point::new(1.0, 0.0).perp();
        assert_eq!(p, Point::new(0.0, 1.0));
    }

    #[test]
    fn test_trajectory_shape_roundtrip() {
        let frames = vec![
            vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)],
            vec![Point::new(2.0, 2.0), Point::new(3.0, 3.0)],
        ];
        let trx = Trajectory::from_frames(frames, 2);
        assert_eq!(trx.len(), 2);
        assert_eq!(trx.n_joints(), 2);
        assert_eq!(trx.get(1, 0), Point::new(2.0, 2.0));
        assert_eq!(trx.joint_track(1), vec![Point::new(1.0, 1.0), Point::new(3.0, 3.0)]);
    }
}
