//! Angle utilities for the pastern and hoof-wall axes.
//!
//! Image convention: x grows to the right, y grows downward, so the vector
//! `(0, -1)` points toward the top of the image. Signed angles are measured
//! against that axis; clinical angles are measured from the ground.

use nalgebra::Vector2;

use crate::keypoints::KeypointSet;

/// Signed angle in degrees, in `(-180, 180]`, between `v` and the image's
/// up-axis `(0, -1)`.
#[inline]
pub fn angle_from_vertical(v: &Vector2<f64>) -> f64 {
    let vertical = Vector2::new(0.0, -1.0);
    let cross = v.perp(&vertical);
    let dot = v.dot(&vertical);
    let a = cross.atan2(dot).to_degrees();
    // atan2(-0.0, x < 0) is -180; keep the half-open range.
    if a <= -180.0 {
        a + 360.0
    } else {
        a
    }
}

/// Fold a signed angle-from-vertical into a ground-referenced angle in
/// `[0, 90]`: 0 is a horizontal limb segment, 90 is perfectly upright.
///
/// Antipodal directions map to the same value, so the result does not
/// depend on which end of a segment the vector starts from.
#[inline]
pub fn clinical_angle(image_angle_deg: f64) -> f64 {
    let mut folded = image_angle_deg.abs() % 180.0;
    if folded > 90.0 {
        folded = 180.0 - folded;
    }
    90.0 - folded
}

/// Clinical angle of an arbitrary segment direction.
#[inline]
pub fn segment_clinical_angle(v: &Vector2<f64>) -> f64 {
    clinical_angle(angle_from_vertical(v))
}

/// Hoof-pastern measurement for one leg.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LegMeasurement {
    /// Pastern axis angle from ground, degrees in `[0, 90]`.
    pub pastern_angle: f64,
    /// Hoof-wall angle from ground, degrees in `[0, 90]`.
    pub hoof_angle: f64,
    /// `|pastern_angle - hoof_angle|`.
    pub deviation: f64,
    /// Mean detector confidence over the four keypoints, in `[0, 1]`.
    pub mean_confidence: f64,
}

impl LegMeasurement {
    /// Measure both axes of an already normalized keypoint set.
    pub fn from_keypoints(keypoints: &KeypointSet, mean_confidence: f64) -> Self {
        let pastern_angle = segment_clinical_angle(&keypoints.pastern_vector());
        let hoof_angle = segment_clinical_angle(&keypoints.hoof_vector());
        Self {
            pastern_angle,
            hoof_angle,
            deviation: (pastern_angle - hoof_angle).abs(),
            mean_confidence: mean_confidence.clamp(0.0, 1.0),
        }
    }

    /// Signed `pastern_angle - hoof_angle`; positive when the pastern is
    /// steeper than the hoof wall.
    pub fn signed_difference(&self) -> f64 {
        self.pastern_angle - self.hoof_angle
    }

    /// The measurement as reported: angles, deviation and confidence
    /// rounded to two decimals (ties to even). Scores are computed from
    /// these values.
    pub fn rounded(&self) -> Self {
        Self {
            pastern_angle: round_two_decimals(self.pastern_angle),
            hoof_angle: round_two_decimals(self.hoof_angle),
            deviation: round_two_decimals(self.deviation),
            mean_confidence: round_two_decimals(self.mean_confidence),
        }
    }
}

/// Round to two decimals, ties to even.
pub(crate) fn round_two_decimals(x: f64) -> f64 {
    (x * 100.0).round_ties_even() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn upright_vector_is_zero_from_vertical() {
        assert_abs_diff_eq!(angle_from_vertical(&Vector2::new(0.0, -5.0)), 0.0);
        assert_abs_diff_eq!(clinical_angle(0.0), 90.0);
    }

    #[test]
    fn horizontal_vector_is_flat() {
        let a = angle_from_vertical(&Vector2::new(10.0, 0.0));
        assert_abs_diff_eq!(a, -90.0, epsilon = 1e-12);
        assert_abs_diff_eq!(clinical_angle(a), 0.0, epsilon = 1e-12);
        let b = angle_from_vertical(&Vector2::new(-10.0, 0.0));
        assert_abs_diff_eq!(b, 90.0, epsilon = 1e-12);
    }

    #[test]
    fn downward_vector_wraps_to_180() {
        let a = angle_from_vertical(&Vector2::new(0.0, 3.0));
        assert_abs_diff_eq!(a, 180.0, epsilon = 1e-12);
        assert_abs_diff_eq!(clinical_angle(a), 90.0, epsilon = 1e-12);
        let b = angle_from_vertical(&Vector2::new(-0.0, 3.0));
        assert_eq!(b, 180.0);
    }

    #[test]
    fn angles_stay_in_half_open_range() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..500 {
            let v = Vector2::new(rng.gen_range(-1.0..1.0), rng.gen_range(0.0..100.0));
            let a = angle_from_vertical(&v);
            assert!(a > -180.0 && a <= 180.0, "{a} out of range for {v:?}");
        }
    }

    #[test]
    fn rounded_measurement_uses_two_decimals() {
        let m = LegMeasurement {
            pastern_angle: 50.504,
            hoof_angle: 50.0,
            deviation: 0.504,
            mean_confidence: 0.254,
        };
        let r = m.rounded();
        assert_eq!(r.pastern_angle, 50.5);
        assert_eq!(r.hoof_angle, 50.0);
        assert_eq!(r.deviation, 0.5);
        assert_eq!(r.mean_confidence, 0.25);
    }

    #[test]
    fn forty_five_degree_lean() {
        let a = angle_from_vertical(&Vector2::new(1.0, -1.0));
        assert_abs_diff_eq!(a, -45.0, epsilon = 1e-12);
        assert_abs_diff_eq!(clinical_angle(a), 45.0, epsilon = 1e-12);
    }

    #[test]
    fn clinical_angle_folds_obtuse_inputs() {
        assert_abs_diff_eq!(clinical_angle(120.0), 30.0, epsilon = 1e-12);
        assert_abs_diff_eq!(clinical_angle(-150.0), 60.0, epsilon = 1e-12);
        assert_abs_diff_eq!(clinical_angle(270.0), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn clinical_angle_is_invariant_under_half_turn() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let v = Vector2::new(rng.gen_range(-100.0..100.0), rng.gen_range(-100.0..100.0));
            if v.norm() < 1e-6 {
                continue;
            }
            let a = segment_clinical_angle(&v);
            let b = segment_clinical_angle(&(-v));
            assert_abs_diff_eq!(a, b, epsilon = 1e-9);
            assert!((0.0..=90.0).contains(&a));
        }
    }

    #[test]
    fn measurement_reports_absolute_deviation() {
        // Pastern leaning 45 deg, hoof wall leaning ~63.4 deg from vertical.
        let kp = KeypointSet::new([110.0, 0.0], [100.0, 10.0], [100.0, 20.0], [120.0, 30.0]);
        let m = LegMeasurement::from_keypoints(&kp, 0.8);
        assert_abs_diff_eq!(m.pastern_angle, 45.0, epsilon = 1e-9);
        let expected_hoof = 90.0 - (20.0f64).atan2(10.0).to_degrees();
        assert_abs_diff_eq!(m.hoof_angle, expected_hoof, epsilon = 1e-9);
        assert_abs_diff_eq!(m.deviation, (45.0 - expected_hoof).abs(), epsilon = 1e-9);
        assert!(m.signed_difference() > 0.0);
    }
}
