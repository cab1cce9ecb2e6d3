//! Clinical wording and quality grade for a scored leg.

use crate::geometry::LegMeasurement;

use super::score::leg_score;

/// Alignment band of a per-leg score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Condition {
    #[serde(rename = "Optimal Alignment")]
    Optimal,
    #[serde(rename = "Acceptable Alignment")]
    Acceptable,
    #[serde(rename = "Poor Alignment")]
    Poor,
    #[serde(rename = "Critical Misalignment")]
    Critical,
}

impl Condition {
    /// Band a score: `>= 9` optimal, `>= 6` acceptable, `>= 2` poor,
    /// otherwise critical. Half points fall to the lower band.
    pub fn from_score(score: f64) -> Self {
        if score >= 9.0 {
            Self::Optimal
        } else if score >= 6.0 {
            Self::Acceptable
        } else if score >= 2.0 {
            Self::Poor
        } else {
            Self::Critical
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Optimal => "Optimal Alignment",
            Self::Acceptable => "Acceptable Alignment",
            Self::Poor => "Poor Alignment",
            Self::Critical => "Critical Misalignment",
        }
    }

    pub fn note(self) -> &'static str {
        match self {
            Self::Optimal => "Hoof and pastern angles well aligned.",
            Self::Acceptable => "Minor deviation. Generally functional mechanics.",
            Self::Poor => "Noticeable angle deviation. Uneven load on limb.",
            Self::Critical => "Severe hoof–pastern angle mismatch. High limb stress.",
        }
    }

    pub fn recommendation(self) -> &'static str {
        match self {
            Self::Optimal => "No action needed. Continue current hoof care routine.",
            Self::Acceptable => "Maintain regular trimming. Recheck after next shoeing cycle.",
            Self::Poor => "Schedule corrective trimming soon. Monitor closely for discomfort.",
            Self::Critical => {
                "Urgent farrier and veterinary evaluation advised. Limit work until corrected."
            }
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Photo quality grade in `1..=10` from mean keypoint confidence.
pub fn quality_grade(mean_confidence: f64) -> u8 {
    let q = (mean_confidence * 10.0).round_ties_even();
    if q.is_nan() {
        return 1;
    }
    q.clamp(1.0, 10.0) as u8
}

/// Clinical verdict for one leg.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct LegAssessment {
    /// Alignment score on the half-point grid in `[1, 10]`.
    pub score: f64,
    /// Detection quality grade in `1..=10`.
    pub quality: u8,
    pub condition: Condition,
    pub note: &'static str,
    pub recommendation: &'static str,
}

impl LegAssessment {
    /// Assess a score with a given detection confidence.
    pub fn from_score(score: f64, mean_confidence: f64) -> Self {
        let condition = Condition::from_score(score);
        Self {
            score,
            quality: quality_grade(mean_confidence),
            condition,
            note: condition.note(),
            recommendation: condition.recommendation(),
        }
    }

    /// Score and assess a measurement, after rounding it to the reported
    /// two decimals.
    pub fn from_measurement(m: &LegMeasurement) -> Self {
        let r = m.rounded();
        Self::from_score(leg_score(r.pastern_angle, r.hoof_angle), r.mean_confidence)
    }
}

/// Older per-leg note table keyed on different thresholds.
///
/// Kept only for comparison with reports produced by earlier releases; the
/// two tables disagree (for example on 5.0 and 7.0) and this one is not used
/// by any scoring path.
#[deprecated(note = "superseded by `Condition::note`; the two note tables disagree")]
pub fn legacy_leg_note(score: f64) -> &'static str {
    if score > 7.0 {
        "Horse seems HEALTHY!"
    } else if score >= 5.0 {
        "No immediate concern on this leg"
    } else if score >= 3.0 {
        "Need a regular checkup on this leg"
    } else {
        "Immediate checkup required"
    }
}
