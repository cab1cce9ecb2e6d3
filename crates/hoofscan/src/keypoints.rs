//! Four-point hoof/pastern landmark set.
//!
//! The detector emits exactly four landmarks with positional roles:
//!
//! | index | role            |
//! |-------|-----------------|
//! | 0     | pastern top     |
//! | 1     | pastern bottom  |
//! | 2     | hoof-wall top   |
//! | 3     | toe tip         |
//!
//! Swapping indices silently corrupts every downstream angle, so the set is
//! only reachable through role-named accessors and is never iterated as a
//! generic map.

use nalgebra::{Point2, Vector2};

/// Number of landmarks produced per detection.
pub const KEYPOINT_COUNT: usize = 4;

/// Per-keypoint confidence scores, parallel to [`KeypointSet`].
pub type Confidence = [f32; KEYPOINT_COUNT];

/// Immutable set of the four anatomical landmarks in image pixels
/// (x to the right, y downward).
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct KeypointSet {
    points: [[f64; 2]; KEYPOINT_COUNT],
}

impl KeypointSet {
    /// Build a set from points listed in role order
    /// (pastern top, pastern bottom, hoof-wall top, toe tip).
    pub fn new(
        pastern_top: [f64; 2],
        pastern_bottom: [f64; 2],
        hoof_top: [f64; 2],
        toe_tip: [f64; 2],
    ) -> Self {
        Self {
            points: [pastern_top, pastern_bottom, hoof_top, toe_tip],
        }
    }

    /// Build from a raw role-ordered array.
    pub fn from_array(points: [[f64; 2]; KEYPOINT_COUNT]) -> Self {
        Self { points }
    }

    /// Role-ordered raw coordinates.
    pub fn to_array(&self) -> [[f64; 2]; KEYPOINT_COUNT] {
        self.points
    }

    pub fn pastern_top(&self) -> Point2<f64> {
        self.point(0)
    }

    pub fn pastern_bottom(&self) -> Point2<f64> {
        self.point(1)
    }

    pub fn hoof_top(&self) -> Point2<f64> {
        self.point(2)
    }

    pub fn toe_tip(&self) -> Point2<f64> {
        self.point(3)
    }

    /// Pastern axis, pointing from the bottom marker to the top marker.
    pub fn pastern_vector(&self) -> Vector2<f64> {
        self.pastern_top() - self.pastern_bottom()
    }

    /// Hoof-wall axis, pointing from the toe tip to the wall top.
    pub fn hoof_vector(&self) -> Vector2<f64> {
        self.hoof_top() - self.toe_tip()
    }

    /// True when every coordinate is finite.
    pub fn is_finite(&self) -> bool {
        self.points
            .iter()
            .all(|p| p[0].is_finite() && p[1].is_finite())
    }

    /// Return a copy with every x coordinate transformed by `f`.
    pub(crate) fn map_x(&self, f: impl Fn(usize, f64) -> f64) -> Self {
        let mut points = self.points;
        for (i, p) in points.iter_mut().enumerate() {
            p[0] = f(i, p[0]);
        }
        Self { points }
    }

    fn point(&self, idx: usize) -> Point2<f64> {
        let [x, y] = self.points[idx];
        Point2::new(x, y)
    }
}

/// Arithmetic mean of the four confidences.
pub fn mean_confidence(confidence: &Confidence) -> f64 {
    confidence.iter().map(|&c| c as f64).sum::<f64>() / KEYPOINT_COUNT as f64
}
