//! Angle accuracy of predicted keypoints against ground truth.
//!
//! Both sides are orientation-normalized (mirror step only, no facing
//! offset) and measured with the same geometry, so the comparison isolates
//! keypoint placement error.

use crate::geometry::LegMeasurement;
use crate::keypoints::KeypointSet;
use crate::normalize::canonicalize_orientation;
use crate::oracle::AnnotationSet;

/// Default success tolerance on the deviation error, in degrees.
pub const DEFAULT_TOLERANCE_DEG: f64 = 3.0;

/// Angle comparison for one image.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SampleAccuracy {
    pub image: String,
    pub ground_truth: LegMeasurement,
    pub predicted: LegMeasurement,
    pub pastern_error: f64,
    pub hoof_error: f64,
    pub deviation_error: f64,
}

/// Accuracy summary over all matched images.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct AccuracyReport {
    pub tolerance_deg: f64,
    pub sample_count: usize,
    /// Images present in only one of the two sets.
    pub unmatched: usize,
    pub mean_pastern_error: Option<f64>,
    pub mean_hoof_error: Option<f64>,
    /// Percentage of samples whose deviation error is within tolerance.
    pub success_rate: Option<f64>,
    pub samples: Vec<SampleAccuracy>,
}

fn measure_canonical(keypoints: &KeypointSet) -> LegMeasurement {
    LegMeasurement::from_keypoints(&canonicalize_orientation(keypoints), 1.0)
}

/// Compare one keypoint pair.
pub fn compare_keypoints(
    image: &str,
    ground_truth: &KeypointSet,
    predicted: &KeypointSet,
) -> SampleAccuracy {
    let gt = measure_canonical(ground_truth);
    let pred = measure_canonical(predicted);
    SampleAccuracy {
        image: image.to_string(),
        ground_truth: gt,
        predicted: pred,
        pastern_error: (gt.pastern_angle - pred.pastern_angle).abs(),
        hoof_error: (gt.hoof_angle - pred.hoof_angle).abs(),
        deviation_error: (gt.deviation - pred.deviation).abs(),
    }
}

/// Compare two annotation sets image by image (matched by file name).
pub fn evaluate(
    ground_truth: &AnnotationSet,
    predictions: &AnnotationSet,
    tolerance_deg: f64,
) -> AccuracyReport {
    let mut samples = Vec::new();
    let mut unmatched = 0usize;

    for gt in ground_truth.iter() {
        match predictions.get(&gt.file_name) {
            Some(pred) => samples.push(compare_keypoints(
                &gt.file_name,
                &gt.keypoints,
                &pred.keypoints,
            )),
            None => {
                tracing::debug!("{}: no prediction", gt.file_name);
                unmatched += 1;
            }
        }
    }
    unmatched += predictions
        .iter()
        .filter(|p| ground_truth.get(&p.file_name).is_none())
        .count();

    let n = samples.len();
    let mean = |f: fn(&SampleAccuracy) -> f64| -> Option<f64> {
        (n > 0).then(|| samples.iter().map(f).sum::<f64>() / n as f64)
    };
    let mean_pastern_error = mean(|s| s.pastern_error);
    let mean_hoof_error = mean(|s| s.hoof_error);
    let success_rate = (n > 0).then(|| {
        let ok = samples
            .iter()
            .filter(|s| s.deviation_error <= tolerance_deg)
            .count();
        ok as f64 / n as f64 * 100.0
    });

    tracing::info!(
        "evaluated {} sample(s), {} unmatched, success rate {:?}",
        n,
        unmatched,
        success_rate
    );

    AccuracyReport {
        tolerance_deg,
        sample_count: n,
        unmatched,
        mean_pastern_error,
        mean_hoof_error,
        success_rate,
        samples,
    }
}
