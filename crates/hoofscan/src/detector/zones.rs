//! Multi-zone keypoint probing.
//!
//! A leg photograph is probed with four fixed crop windows that cover
//! different vertical bands of the frame. Each window is sent to the oracle
//! once; every answer is scored with a sanity heuristic and the best one
//! becomes the image's canonical detection.
//!
//! Ties keep the earliest zone in [`ZoneKind::ALL`] order, so a hoof that
//! fills the bottom of the frame is reported as `Floor-Scan` even when the
//! global window scores the same.

use crate::keypoints::{mean_confidence, Confidence, KeypointSet};
use crate::oracle::{BoundingBox, KeypointOracle, LegImage, OracleError};

/// Model input aspect ratio (width / height) of the keypoint network.
pub const MODEL_ASPECT_RATIO: f64 = 192.0 / 256.0;

/// The four candidate crop windows, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ZoneKind {
    #[serde(rename = "Floor-Scan")]
    FloorScan,
    #[serde(rename = "Anatomy-Scan")]
    AnatomyScan,
    #[serde(rename = "Top-Anatomy")]
    TopAnatomy,
    #[serde(rename = "Global-Scan")]
    GlobalScan,
}

impl ZoneKind {
    /// Evaluation order. Earlier zones win ties.
    pub const ALL: [ZoneKind; 4] = [
        ZoneKind::FloorScan,
        ZoneKind::AnatomyScan,
        ZoneKind::TopAnatomy,
        ZoneKind::GlobalScan,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::FloorScan => "Floor-Scan",
            Self::AnatomyScan => "Anatomy-Scan",
            Self::TopAnatomy => "Top-Anatomy",
            Self::GlobalScan => "Global-Scan",
        }
    }

    /// Vertical extent as fractions of image height.
    pub fn row_fractions(self) -> (f64, f64) {
        match self {
            Self::FloorScan => (0.4, 1.0),
            Self::AnatomyScan => (0.2, 0.8),
            Self::TopAnatomy => (0.0, 0.6),
            Self::GlobalScan => (0.0, 1.0),
        }
    }
}

impl std::fmt::Display for ZoneKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A zone resolved against a concrete image height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Zone {
    pub kind: ZoneKind,
    /// First pixel row (inclusive).
    pub y1: u32,
    /// Last pixel row (exclusive).
    pub y2: u32,
}

impl Zone {
    /// Resolve `kind` for an image of the given height. Rows are truncated
    /// toward zero; a full-height bound stays exactly `height`.
    pub fn for_height(kind: ZoneKind, height: u32) -> Self {
        let (lo, hi) = kind.row_fractions();
        let row = |frac: f64| {
            if frac >= 1.0 {
                height
            } else {
                (height as f64 * frac) as u32
            }
        };
        Self {
            kind,
            y1: row(lo),
            y2: row(hi),
        }
    }

    /// Crop window of the zone: full zone height, width from the model
    /// aspect ratio, horizontally centered and clamped to the image.
    pub fn crop_window(&self, image_width: u32, aspect_ratio: f64) -> BoundingBox {
        let zone_h = (self.y2 - self.y1) as f64;
        let zone_w = zone_h * aspect_ratio;
        let w = image_width as f64;
        let x1 = ((w - zone_w) / 2.0).max(0.0);
        let x2 = (x1 + zone_w).min(w);
        BoundingBox {
            x1,
            y1: self.y1 as f64,
            x2,
            y2: self.y2 as f64,
        }
    }
}

/// The four zones of an image, in evaluation order.
pub fn zones_for_height(height: u32) -> [Zone; 4] {
    ZoneKind::ALL.map(|kind| Zone::for_height(kind, height))
}

/// Tuning of the per-zone sanity heuristic.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ZoneSelectConfig {
    /// Crop width / height passed to the oracle.
    pub aspect_ratio: f64,
    /// Pastern top must sit at least this many rows above the hoof-wall top.
    pub sanity_margin_px: f64,
    /// Quality penalty applied to detections failing the sanity check.
    pub insane_penalty: f64,
}

impl Default for ZoneSelectConfig {
    fn default() -> Self {
        Self {
            aspect_ratio: MODEL_ASPECT_RATIO,
            sanity_margin_px: 10.0,
            insane_penalty: 8.0,
        }
    }
}

/// Oracle answer for one zone, with its aggregate quality.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DetectionResult {
    pub zone: Zone,
    pub bbox: BoundingBox,
    pub keypoints: KeypointSet,
    pub confidence: Confidence,
    /// Whether the vertical landmark ordering is plausible.
    pub sane: bool,
    /// `mean(confidence) * 10`, minus the insanity penalty.
    pub aggregate_quality: f64,
}

impl DetectionResult {
    pub fn mean_confidence(&self) -> f64 {
        mean_confidence(&self.confidence)
    }
}

/// Outcome of probing every zone of one image.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ZoneSelection {
    pub best: DetectionResult,
    /// Every probed zone, in evaluation order.
    pub candidates: Vec<DetectionResult>,
}

/// Pastern top must lie meaningfully above the hoof-wall top
/// (smaller row index, image y grows downward).
pub fn is_sane(keypoints: &KeypointSet, margin_px: f64) -> bool {
    keypoints.pastern_top().y <= keypoints.hoof_top().y - margin_px
}

/// Aggregate quality of one detection.
pub fn aggregate_quality(confidence: &Confidence, sane: bool, config: &ZoneSelectConfig) -> f64 {
    let base = mean_confidence(confidence) * 10.0;
    if sane {
        base
    } else {
        base - config.insane_penalty
    }
}

/// Probe every zone of `image` and keep the best detection.
///
/// A later zone replaces the running best only when its aggregate quality
/// is strictly higher. Any oracle failure aborts the whole selection.
pub fn select_zone<O: KeypointOracle + ?Sized>(
    oracle: &O,
    image: &LegImage,
    config: &ZoneSelectConfig,
) -> Result<ZoneSelection, OracleError> {
    let mut candidates = Vec::with_capacity(ZoneKind::ALL.len());
    let mut best: Option<DetectionResult> = None;

    for zone in zones_for_height(image.height()) {
        let bbox = zone.crop_window(image.width(), config.aspect_ratio);
        let out = oracle.infer(image, bbox)?.validate()?;
        let sane = is_sane(&out.keypoints, config.sanity_margin_px);
        let quality = aggregate_quality(&out.confidence, sane, config);

        tracing::debug!(
            "{}: zone {} bbox=[{:.1}, {:.1}, {:.1}, {:.1}] quality={:.3} sane={}",
            image.id,
            zone.kind,
            bbox.x1,
            bbox.y1,
            bbox.x2,
            bbox.y2,
            quality,
            sane,
        );

        let candidate = DetectionResult {
            zone,
            bbox,
            keypoints: out.keypoints,
            confidence: out.confidence,
            sane,
            aggregate_quality: quality,
        };
        match best {
            Some(ref b) if candidate.aggregate_quality <= b.aggregate_quality => {}
            _ => best = Some(candidate),
        }
        candidates.push(candidate);
    }

    let best = best.ok_or_else(|| OracleError::Failed("no zones evaluated".to_string()))?;
    tracing::info!(
        "{}: best zone {} (quality {:.3})",
        image.id,
        best.zone.kind,
        best.aggregate_quality
    );
    Ok(ZoneSelection { best, candidates })
}
