//! Scan-level verdict across up to four scored legs.
//!
//! The narrative follows the worst leg, the number follows the mean:
//!
//! 1. any leg at the minimum score → critical
//! 2. any leg at 5 or below → concern
//! 3. every leg at 9 or above → optimal
//! 4. otherwise → acceptable
//!
//! Legs that were rejected or failed are not passed in at all; they are
//! never counted as zero.

use super::score::MIN_SCORE;

/// Notes reported when no leg produced a score.
pub const NO_LEGS_NOTE: &str = "No legs analyzed.";

/// Priority band of the whole scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanVerdict {
    Critical,
    Concern,
    Optimal,
    Acceptable,
}

impl ScanVerdict {
    /// Band by the minimum leg score.
    pub fn from_min_score(min_score: f64) -> Self {
        if min_score <= MIN_SCORE {
            Self::Critical
        } else if min_score <= 5.0 {
            Self::Concern
        } else if min_score >= 9.0 {
            Self::Optimal
        } else {
            Self::Acceptable
        }
    }

    pub fn narrative(self) -> &'static str {
        match self {
            Self::Critical => {
                "Severe issue detected in at least one leg. Immediate veterinary and farrier evaluation recommended."
            }
            Self::Concern => {
                "Overall leg health is fair, but one or more legs show concerning misalignment. Corrective hoof care is advised. Veterinary review recommended if discomfort is present."
            }
            Self::Optimal => {
                "Excellent overall hoof–pastern alignment across all legs. No action needed beyond routine maintenance."
            }
            Self::Acceptable => {
                "Overall leg alignment is acceptable. Continue regular hoof care and routine monitoring."
            }
        }
    }
}

/// Aggregate result of one scan.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSummary {
    /// Mean leg score rounded to one decimal, `None` when no leg scored.
    pub scan_score: Option<f64>,
    pub notes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<ScanVerdict>,
}

impl ScanSummary {
    fn empty() -> Self {
        Self {
            scan_score: None,
            notes: NO_LEGS_NOTE.to_string(),
            verdict: None,
        }
    }
}

/// Round to one decimal, ties to even.
fn round_one_decimal(x: f64) -> f64 {
    (x * 10.0).round_ties_even() / 10.0
}

/// Combine the scores of the legs that were successfully analyzed.
pub fn aggregate_scan(leg_scores: &[f64]) -> ScanSummary {
    if leg_scores.is_empty() {
        return ScanSummary::empty();
    }

    let min_score = leg_scores.iter().copied().fold(f64::INFINITY, f64::min);
    let mean = leg_scores.iter().sum::<f64>() / leg_scores.len() as f64;
    let verdict = ScanVerdict::from_min_score(min_score);

    ScanSummary {
        scan_score: Some(round_one_decimal(mean)),
        notes: verdict.narrative().to_string(),
        verdict: Some(verdict),
    }
}
