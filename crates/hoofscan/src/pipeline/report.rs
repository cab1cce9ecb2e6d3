//! Flattened per-leg report consumed by presentation layers.
//!
//! Shape (keys in this order):
//!
//! ```text
//! frontLeftScanScore, frontLeftNotes, frontLeftCondition,
//! frontLeftRecommendation, frontLeftQuality, ... (four legs),
//! scanScore, notes
//! ```
//!
//! Legs without a score carry `null` everywhere except `Notes`, which
//! explains why the leg was not scored.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::AnalyzeError;
use crate::scoring::ScanSummary;

use super::scan::{Leg, LegOutcome, ScanResult};

/// Boundary fields of one leg.
///
/// A leg rejected by the confidence gate is noted as `Detection rejected:
/// ...` rather than the older `Inference failed: ...` wording, which is now
/// reserved for oracle errors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegReport {
    pub scan_score: Option<f64>,
    pub notes: Option<String>,
    pub condition: Option<String>,
    pub recommendation: Option<String>,
    pub quality: Option<u8>,
}

impl LegReport {
    pub fn from_outcome(outcome: &LegOutcome) -> Self {
        match outcome {
            LegOutcome::Missing => Self::default(),
            LegOutcome::Scored { assessment, .. } => Self {
                scan_score: Some(assessment.score),
                notes: Some(assessment.note.to_string()),
                condition: Some(assessment.condition.label().to_string()),
                recommendation: Some(assessment.recommendation.to_string()),
                quality: Some(assessment.quality),
            },
            LegOutcome::Rejected { analysis } => Self::with_notes(format!(
                "Detection rejected: low keypoint confidence (best zone: {})",
                analysis.best_zone
            )),
            LegOutcome::Failed { error } => Self::with_notes(failure_note(error)),
        }
    }

    fn with_notes(notes: String) -> Self {
        Self {
            notes: Some(notes),
            ..Self::default()
        }
    }
}

fn failure_note(error: &AnalyzeError) -> String {
    match error {
        AnalyzeError::EmptyBuffer => "Decode failed: empty image buffer".to_string(),
        AnalyzeError::Decode(e) => format!("Decode failed: {e}"),
        AnalyzeError::Oracle(e) => format!("Inference failed: {e}"),
    }
}

/// Boundary JSON of one scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanReport {
    pub legs: Vec<(Leg, LegReport)>,
    pub scan_score: Option<f64>,
    pub notes: String,
}

impl ScanReport {
    pub fn from_result(result: &ScanResult) -> Self {
        let legs = Leg::ALL
            .iter()
            .map(|&leg| (leg, LegReport::from_outcome(result.outcome(leg))))
            .collect();
        let ScanSummary {
            scan_score, notes, ..
        } = &result.summary;
        Self {
            legs,
            scan_score: *scan_score,
            notes: notes.clone(),
        }
    }

    pub fn leg(&self, leg: Leg) -> Option<&LegReport> {
        self.legs.iter().find(|(l, _)| *l == leg).map(|(_, r)| r)
    }
}

impl Serialize for ScanReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.legs.len() * 5 + 2))?;
        for (leg, r) in &self.legs {
            let key = leg.key();
            map.serialize_entry(&format!("{key}ScanScore"), &r.scan_score)?;
            map.serialize_entry(&format!("{key}Notes"), &r.notes)?;
            map.serialize_entry(&format!("{key}Condition"), &r.condition)?;
            map.serialize_entry(&format!("{key}Recommendation"), &r.recommendation)?;
            map.serialize_entry(&format!("{key}Quality"), &r.quality)?;
        }
        map.serialize_entry("scanScore", &self.scan_score)?;
        map.serialize_entry("notes", &self.notes)?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::AnalyzeConfig;
    use crate::oracle::{BoundingBox, LegImage, OracleError, OracleFn, OracleOutput};
    use crate::pipeline::scan::{scan, LegInput, ScanRequest};
    use crate::test_utils::{blank_leg, sane_keypoints};

    fn mixed_scan() -> ScanResult {
        let oracle = OracleFn(|img: &LegImage, _: BoundingBox| match img.id.as_str() {
            "weak.png" => Ok(OracleOutput {
                keypoints: sane_keypoints(),
                confidence: [0.9, 0.9, 0.9, 0.02],
            }),
            "broken.png" => Err(OracleError::Failed("model crashed".into())),
            _ => Ok(OracleOutput {
                keypoints: sane_keypoints(),
                confidence: [0.9; 4],
            }),
        });
        let leg = |id: &str| {
            let mut img = blank_leg(400, 500);
            img.id = id.to_string();
            LegInput::Decoded(img)
        };
        let request = ScanRequest::new()
            .with_leg(Leg::FrontLeft, leg("good.png"))
            .with_leg(Leg::FrontRight, leg("weak.png"))
            .with_leg(Leg::BackLeft, leg("broken.png"));
        scan(&oracle, request, &AnalyzeConfig::default())
    }

    #[test]
    fn report_has_every_boundary_key() {
        let json = serde_json::to_value(mixed_scan().report()).expect("serialize");
        let obj = json.as_object().expect("object");
        assert_eq!(obj.len(), 22);
        for leg in Leg::ALL {
            for field in ["ScanScore", "Notes", "Condition", "Recommendation", "Quality"] {
                assert!(obj.contains_key(&format!("{leg}{field}")), "{leg}{field}");
            }
        }
        assert!(obj.contains_key("scanScore"));
        assert!(obj.contains_key("notes"));
    }

    #[test]
    fn non_scored_legs_explain_themselves() {
        let json = serde_json::to_value(mixed_scan().report()).expect("serialize");

        assert!(json["frontLeftScanScore"].is_number());
        assert!(json["frontLeftQuality"].is_u64());

        assert!(json["frontRightScanScore"].is_null());
        assert_eq!(
            json["frontRightNotes"],
            "Detection rejected: low keypoint confidence (best zone: Floor-Scan)"
        );
        assert!(json["frontRightCondition"].is_null());

        let notes = json["backLeftNotes"].as_str().expect("notes");
        assert!(notes.starts_with("Inference failed:"), "{notes}");
        assert!(notes.contains("model crashed"));

        assert!(json["backRightNotes"].is_null());
        assert!(json["backRightScanScore"].is_null());

        assert_eq!(json["scanScore"], json["frontLeftScanScore"]);
    }

    #[test]
    fn decode_failures_are_labelled() {
        assert_eq!(
            failure_note(&AnalyzeError::EmptyBuffer),
            "Decode failed: empty image buffer"
        );
    }
}
