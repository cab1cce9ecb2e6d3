//! Clinical scoring policy.
//!
//! - [`leg_score`]: signed-deviation score on the half-point grid
//! - [`LegAssessment`]: condition, note, recommendation and quality grade
//! - [`aggregate_scan`]: scan-level score and narrative

mod aggregate;
mod clinical;
mod score;

pub use aggregate::{aggregate_scan, ScanSummary, ScanVerdict, NO_LEGS_NOTE};
#[allow(deprecated)]
pub use clinical::legacy_leg_note;
pub use clinical::{quality_grade, Condition, LegAssessment};
pub use score::{
    leg_score, penalty_steps, quantize_half_point, MAX_SCORE, MIN_SCORE,
    OVER_ROTATION_DEG_PER_STEP, PENALTY_PER_STEP, UNDER_ROTATION_DEG_PER_STEP,
};
