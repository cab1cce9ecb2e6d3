//! hoofscan: hoof–pastern alignment scoring from leg photographs.
//!
//! A keypoint oracle locates four landmarks on a leg photograph; everything
//! after that is deterministic. The pipeline stages are:
//!
//! 1. **Zones** – probe four fixed crop windows, score each answer with a
//!    sanity heuristic, keep the best (ties go to the earliest zone).
//! 2. **Gate** – reject the leg unless every keypoint confidence exceeds
//!    the threshold.
//! 3. **Normalize** – facing-direction offset, then mirroring into one
//!    canonical orientation.
//! 4. **Geometry** – pastern and hoof-wall angles from ground, and their
//!    deviation.
//! 5. **Scoring** – asymmetric 1–10 leg score, clinical wording, quality
//!    grade, and a scan-level verdict over up to four legs.
//!
//! # Public API
//! - [`Scanner`] as the primary entry point
//! - [`KeypointOracle`] and its adapters ([`OracleFn`], [`Serialized`],
//!   [`AnnotationOracle`])
//! - [`AnalyzeConfig`] for tuning the detection heuristics
//! - result structures ([`ScanResult`], [`ScanReport`], [`LegAnalysis`])

mod api;
mod detector;
mod error;
mod evaluate;
mod geometry;
mod keypoints;
mod normalize;
mod oracle;
mod overlay;
mod pipeline;
mod scoring;

#[cfg(test)]
pub(crate) mod test_utils;

pub use api::Scanner;
pub use detector::{
    aggregate_quality, is_sane, select_zone, zones_for_height, AnalyzeConfig, ConfidenceGate,
    ConfigError, DetectionResult, ScanParams, Zone, ZoneKind, ZoneSelectConfig, ZoneSelection,
    MODEL_ASPECT_RATIO,
};
pub use error::{decode_leg_image, AnalyzeError};
pub use evaluate::{
    compare_keypoints, evaluate, AccuracyReport, SampleAccuracy, DEFAULT_TOLERANCE_DEG,
};
pub use geometry::{angle_from_vertical, clinical_angle, segment_clinical_angle, LegMeasurement};
pub use keypoints::{mean_confidence, Confidence, KeypointSet, KEYPOINT_COUNT};
pub use normalize::{
    apply_facing_offset, canonicalize_orientation, mirror_about, normalize, Facing,
    NormalizeConfig,
};
pub use oracle::{
    AnnotatedImage, AnnotationError, AnnotationOracle, AnnotationSet, BoundingBox,
    KeypointOracle, LegImage, OracleError, OracleFn, OracleOutput, Serialized,
};
pub use overlay::{render_overlay, ALIGNED_DEVIATION_DEG, KEYPOINT_COLORS};
pub use pipeline::{
    analyze_leg, measure_keypoints, run_leg, scan, Leg, LegAnalysis, LegInput, LegOutcome,
    LegReport, ScanReport, ScanRequest, ScanResult,
};
#[allow(deprecated)]
pub use scoring::legacy_leg_note;
pub use scoring::{
    aggregate_scan, leg_score, penalty_steps, quality_grade, quantize_half_point, Condition,
    LegAssessment, ScanSummary, ScanVerdict, MAX_SCORE, MIN_SCORE, NO_LEGS_NOTE,
    OVER_ROTATION_DEG_PER_STEP, PENALTY_PER_STEP, UNDER_ROTATION_DEG_PER_STEP,
};
