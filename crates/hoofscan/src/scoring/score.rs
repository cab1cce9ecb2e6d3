//! Per-leg alignment score.
//!
//! The score starts at 10 and loses half a point per penalty step. A step is
//! one degree when the pastern is steeper than the hoof wall (broken-forward
//! axis) and 1.5 degrees when it is flatter (broken-back axis), so the signed
//! difference is penalized asymmetrically. Scores are quantized to half
//! points and clamped to `[1, 10]`.

/// Best possible score.
pub const MAX_SCORE: f64 = 10.0;
/// Worst possible score.
pub const MIN_SCORE: f64 = 1.0;
/// Score lost per penalty step.
pub const PENALTY_PER_STEP: f64 = 0.5;
/// Degrees of pastern-steeper-than-hoof per penalty step.
pub const OVER_ROTATION_DEG_PER_STEP: f64 = 1.0;
/// Degrees of pastern-flatter-than-hoof per penalty step.
pub const UNDER_ROTATION_DEG_PER_STEP: f64 = 1.5;

/// Round to the nearest half point, ties to even (18.5 half-steps → 9.0).
#[inline]
pub fn quantize_half_point(score: f64) -> f64 {
    (score * 2.0).round_ties_even() / 2.0
}

/// Number of penalty steps for a signed `pastern - hoof` difference.
#[inline]
pub fn penalty_steps(signed_diff_deg: f64) -> f64 {
    if signed_diff_deg >= 0.0 {
        signed_diff_deg / OVER_ROTATION_DEG_PER_STEP
    } else {
        signed_diff_deg.abs() / UNDER_ROTATION_DEG_PER_STEP
    }
}

/// Score one leg from its clinical angles (degrees from ground).
pub fn leg_score(pastern_angle: f64, hoof_angle: f64) -> f64 {
    let diff = pastern_angle - hoof_angle;
    let raw = MAX_SCORE - penalty_steps(diff) * PENALTY_PER_STEP;
    quantize_half_point(raw).clamp(MIN_SCORE, MAX_SCORE)
}
