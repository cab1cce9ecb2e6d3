//! Keypoint oracle interface.
//!
//! The keypoint network is an external collaborator: given a photograph and
//! a crop window it returns four landmarks and four confidences. Analyzers
//! receive an oracle handle at construction; nothing here loads weights or
//! keeps process-wide state.

mod annotation;

use std::sync::Mutex;

use image::RgbImage;

use crate::keypoints::{Confidence, KeypointSet};

pub use annotation::{AnnotatedImage, AnnotationError, AnnotationOracle, AnnotationSet};

/// One decoded leg photograph.
#[derive(Debug, Clone)]
pub struct LegImage {
    /// Caller-chosen identifier, usually the source file name.
    pub id: String,
    pub pixels: RgbImage,
}

impl LegImage {
    pub fn new(id: impl Into<String>, pixels: RgbImage) -> Self {
        Self {
            id: id.into(),
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

/// Axis-aligned crop window `(x1, y1) – (x2, y2)` in image pixels.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BoundingBox {
    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x1 && x <= self.x2 && y >= self.y1 && y <= self.y2
    }
}

/// Raw oracle answer for one crop window.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OracleOutput {
    pub keypoints: KeypointSet,
    pub confidence: Confidence,
}

impl OracleOutput {
    /// Reject degenerate answers: non-finite coordinates or confidences
    /// outside `[0, 1]`.
    pub fn validate(self) -> Result<Self, OracleError> {
        if !self.keypoints.is_finite() {
            return Err(OracleError::Degenerate(
                "keypoint coordinates must be finite".to_string(),
            ));
        }
        if let Some(c) = self
            .confidence
            .iter()
            .find(|c| !c.is_finite() || **c < 0.0 || **c > 1.0)
        {
            return Err(OracleError::Degenerate(format!(
                "keypoint confidence {c} outside [0, 1]"
            )));
        }
        Ok(self)
    }
}

/// Failures raised by an oracle implementation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OracleError {
    /// The oracle has no answer for this image at all.
    #[error("keypoint oracle unavailable: {0}")]
    Unavailable(String),
    /// The oracle answered with points that cannot be measured.
    #[error("degenerate keypoint detection: {0}")]
    Degenerate(String),
    /// Any other inference failure.
    #[error("keypoint inference failed: {0}")]
    Failed(String),
}

/// Source of four-point landmark detections.
pub trait KeypointOracle {
    /// Detect the four landmarks of `image` inside `bbox`.
    ///
    /// Implementations must fail explicitly rather than return placeholder
    /// points when no detection is possible.
    fn infer(&self, image: &LegImage, bbox: BoundingBox) -> Result<OracleOutput, OracleError>;
}

impl<O: KeypointOracle + ?Sized> KeypointOracle for &O {
    fn infer(&self, image: &LegImage, bbox: BoundingBox) -> Result<OracleOutput, OracleError> {
        (**self).infer(image, bbox)
    }
}

impl<O: KeypointOracle + ?Sized> KeypointOracle for Box<O> {
    fn infer(&self, image: &LegImage, bbox: BoundingBox) -> Result<OracleOutput, OracleError> {
        (**self).infer(image, bbox)
    }
}

/// Adapter turning a closure into an oracle.
///
/// ```
/// use hoofscan::{BoundingBox, KeypointOracle, KeypointSet, LegImage, OracleError, OracleFn, OracleOutput};
///
/// let oracle = OracleFn(|_img: &LegImage, _bbox: BoundingBox| {
///     Ok::<_, OracleError>(OracleOutput {
///         keypoints: KeypointSet::new([10.0, 0.0], [12.0, 40.0], [14.0, 60.0], [40.0, 90.0]),
///         confidence: [0.9; 4],
///     })
/// });
/// let img = LegImage::new("leg", image::RgbImage::new(64, 64));
/// let bbox = BoundingBox { x1: 0.0, y1: 0.0, x2: 48.0, y2: 64.0 };
/// assert!(oracle.infer(&img, bbox).is_ok());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct OracleFn<F>(pub F);

impl<F> KeypointOracle for OracleFn<F>
where
    F: Fn(&LegImage, BoundingBox) -> Result<OracleOutput, OracleError>,
{
    fn infer(&self, image: &LegImage, bbox: BoundingBox) -> Result<OracleOutput, OracleError> {
        (self.0)(image, bbox)
    }
}

/// Serializes every call to a non-reentrant oracle through one lock.
///
/// The wrapper is `Sync` whenever the inner oracle is `Send`, so it can be
/// shared by the parallel scan driver.
#[derive(Debug)]
pub struct Serialized<O> {
    inner: Mutex<O>,
}

impl<O> Serialized<O> {
    pub fn new(oracle: O) -> Self {
        Self {
            inner: Mutex::new(oracle),
        }
    }

    pub fn into_inner(self) -> O {
        match self.inner.into_inner() {
            Ok(o) => o,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<O: KeypointOracle> KeypointOracle for Serialized<O> {
    fn infer(&self, image: &LegImage, bbox: BoundingBox) -> Result<OracleOutput, OracleError> {
        let guard = self
            .inner
            .lock()
            .map_err(|_| OracleError::Failed("oracle lock poisoned by a panicked call".into()))?;
        guard.infer(image, bbox)
    }
}
