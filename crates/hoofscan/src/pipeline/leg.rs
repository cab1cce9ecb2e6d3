use crate::detector::{select_zone, AnalyzeConfig, DetectionResult, ZoneKind};
use crate::geometry::LegMeasurement;
use crate::keypoints::KeypointSet;
use crate::normalize::{normalize, NormalizeConfig};
use crate::oracle::{KeypointOracle, LegImage, OracleError};

/// Per-leg detail record.
///
/// Angles are `None` when the confidence gate rejected the detection. The
/// winning zone and every zone candidate are kept either way.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LegAnalysis {
    pub success: bool,
    pub best_zone: ZoneKind,
    #[serde(with = "two_decimals")]
    pub pastern_angle: Option<f64>,
    #[serde(with = "two_decimals")]
    pub hoof_angle: Option<f64>,
    /// Absolute hoof-pastern deviation in degrees.
    #[serde(with = "two_decimals")]
    pub hpa_dev: Option<f64>,
    /// Mean keypoint confidence of the winning detection.
    #[serde(with = "two_decimals")]
    pub model_confidence: Option<f64>,
    /// Raw (un-normalized) winning detection.
    pub detection: DetectionResult,
    /// Every probed zone, in evaluation order.
    pub candidates: Vec<DetectionResult>,
}

impl LegAnalysis {
    /// The full-precision measurement of a successful analysis. Scoring
    /// uses its [`LegMeasurement::rounded`] form.
    pub fn measurement(&self) -> Option<LegMeasurement> {
        match (self.pastern_angle, self.hoof_angle, self.hpa_dev, self.model_confidence) {
            (Some(pastern_angle), Some(hoof_angle), Some(deviation), Some(mean_confidence))
                if self.success =>
            {
                Some(LegMeasurement {
                    pastern_angle,
                    hoof_angle,
                    deviation,
                    mean_confidence,
                })
            }
            _ => None,
        }
    }
}

/// Normalize already-known keypoints and measure both axes.
///
/// `keypoints` are raw image coordinates; `image_width` drives the facing
/// offset.
pub fn measure_keypoints(
    keypoints: &KeypointSet,
    image_width: u32,
    config: &NormalizeConfig,
    mean_confidence: f64,
) -> LegMeasurement {
    let canonical = normalize(keypoints, image_width, config);
    LegMeasurement::from_keypoints(&canonical, mean_confidence)
}

/// Zone selection, confidence gate, normalization and geometry for one leg.
///
/// A gate rejection is a normal outcome (`success == false`); only oracle
/// failures are returned as errors.
pub fn analyze_leg<O: KeypointOracle + ?Sized>(
    oracle: &O,
    image: &LegImage,
    config: &AnalyzeConfig,
) -> Result<LegAnalysis, OracleError> {
    let selection = select_zone(oracle, image, &config.zones)?;
    let best = selection.best;

    if !config.gate.passes(&best.confidence) {
        tracing::warn!(
            "{}: detection rejected, keypoint confidences {:?} (best zone {})",
            image.id,
            best.confidence,
            best.zone.kind
        );
        return Ok(LegAnalysis {
            success: false,
            best_zone: best.zone.kind,
            pastern_angle: None,
            hoof_angle: None,
            hpa_dev: None,
            model_confidence: None,
            detection: best,
            candidates: selection.candidates,
        });
    }

    let m = measure_keypoints(
        &best.keypoints,
        image.width(),
        &config.normalize,
        best.mean_confidence(),
    );
    tracing::info!(
        "{}: zone {} pastern={:.2} hoof={:.2} dev={:.2}",
        image.id,
        best.zone.kind,
        m.pastern_angle,
        m.hoof_angle,
        m.deviation
    );

    Ok(LegAnalysis {
        success: true,
        best_zone: best.zone.kind,
        pastern_angle: Some(m.pastern_angle),
        hoof_angle: Some(m.hoof_angle),
        hpa_dev: Some(m.deviation),
        model_confidence: Some(m.mean_confidence),
        detection: best,
        candidates: selection.candidates,
    })
}

mod two_decimals {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &Option<f64>, s: S) -> Result<S::Ok, S::Error> {
        match v {
            Some(x) => s.serialize_some(&crate::geometry::round_two_decimals(*x)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Option::<f64>::deserialize(d)
    }
}
