//! COCO keypoint annotations and a replay oracle built on them.
//!
//! The loader accepts the COCO keypoint export produced by CVAT: an `images`
//! table (`id`, `file_name`, optional `width`/`height`) and an `annotations`
//! table whose `keypoints` field is a flat `[x, y, v] * 4` array in role
//! order. Annotations pointing at unknown image ids are skipped.

use std::collections::BTreeMap;
use std::path::Path;

use super::{BoundingBox, KeypointOracle, LegImage, OracleError, OracleOutput};
use crate::keypoints::{Confidence, KeypointSet, KEYPOINT_COUNT};

/// Errors while reading an annotation file.
#[derive(Debug, thiserror::Error)]
pub enum AnnotationError {
    #[error("failed to read annotations {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid annotation JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected {expected} keypoint values for image_id {image_id}, got {got}")]
    KeypointCount {
        image_id: u64,
        expected: usize,
        got: usize,
    },
}

#[derive(Debug, serde::Deserialize)]
struct CocoFile {
    #[serde(default)]
    images: Vec<CocoImage>,
    #[serde(default)]
    annotations: Vec<CocoAnnotation>,
}

#[derive(Debug, serde::Deserialize)]
struct CocoImage {
    id: u64,
    file_name: String,
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
}

#[derive(Debug, serde::Deserialize)]
struct CocoAnnotation {
    image_id: u64,
    #[serde(default)]
    keypoints: Vec<f64>,
}

/// Keypoints labelled on one image.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct AnnotatedImage {
    pub file_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    pub keypoints: KeypointSet,
    /// Per-keypoint visibility flag (`v` in COCO) mapped to 1.0 / 0.0.
    pub confidence: Confidence,
}

/// Annotated images keyed by file name.
#[derive(Debug, Clone, Default)]
pub struct AnnotationSet {
    images: BTreeMap<String, AnnotatedImage>,
}

impl AnnotationSet {
    /// Load a COCO keypoint JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, AnnotationError> {
        let data = std::fs::read_to_string(path).map_err(|source| AnnotationError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&data)
    }

    pub fn from_json_str(data: &str) -> Result<Self, AnnotationError> {
        let file: CocoFile = serde_json::from_str(data)?;
        let by_id: BTreeMap<u64, &CocoImage> = file.images.iter().map(|i| (i.id, i)).collect();

        let mut images = BTreeMap::new();
        for ann in &file.annotations {
            let expected = KEYPOINT_COUNT * 3;
            if ann.keypoints.len() != expected {
                return Err(AnnotationError::KeypointCount {
                    image_id: ann.image_id,
                    expected,
                    got: ann.keypoints.len(),
                });
            }
            let Some(img) = by_id.get(&ann.image_id) else {
                tracing::debug!("skipping annotation for unknown image_id {}", ann.image_id);
                continue;
            };

            let mut points = [[0.0; 2]; KEYPOINT_COUNT];
            let mut confidence = [0.0f32; KEYPOINT_COUNT];
            for (i, chunk) in ann.keypoints.chunks_exact(3).enumerate() {
                points[i] = [chunk[0], chunk[1]];
                confidence[i] = if chunk[2] > 0.0 { 1.0 } else { 0.0 };
            }

            images.insert(
                img.file_name.clone(),
                AnnotatedImage {
                    file_name: img.file_name.clone(),
                    width: img.width,
                    height: img.height,
                    keypoints: KeypointSet::from_array(points),
                    confidence,
                },
            );
        }
        Ok(Self { images })
    }

    pub fn insert(&mut self, image: AnnotatedImage) {
        self.images.insert(image.file_name.clone(), image);
    }

    pub fn get(&self, file_name: &str) -> Option<&AnnotatedImage> {
        self.images.get(file_name)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Images in file-name order.
    pub fn iter(&self) -> impl Iterator<Item = &AnnotatedImage> + '_ {
        self.images.values()
    }
}

/// Replays labelled keypoints as if they were detections.
///
/// Lookup is by [`LegImage::id`], falling back to the file-name component
/// when the id is a path. The crop window is ignored, so every zone sees
/// the same answer.
#[derive(Debug, Clone)]
pub struct AnnotationOracle {
    annotations: AnnotationSet,
}

impl AnnotationOracle {
    pub fn new(annotations: AnnotationSet) -> Self {
        Self { annotations }
    }

    pub fn annotations(&self) -> &AnnotationSet {
        &self.annotations
    }

    fn lookup(&self, id: &str) -> Option<&AnnotatedImage> {
        self.annotations.get(id).or_else(|| {
            let name = Path::new(id).file_name()?.to_str()?;
            self.annotations.get(name)
        })
    }
}

impl KeypointOracle for AnnotationOracle {
    fn infer(&self, image: &LegImage, _bbox: BoundingBox) -> Result<OracleOutput, OracleError> {
        let ann = self.lookup(&image.id).ok_or_else(|| {
            OracleError::Unavailable(format!("no keypoint annotation for '{}'", image.id))
        })?;
        OracleOutput {
            keypoints: ann.keypoints,
            confidence: ann.confidence,
        }
        .validate()
    }
}
