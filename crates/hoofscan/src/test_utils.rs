//! Shared builders and stub oracles for unit tests.

use image::RgbImage;

use crate::keypoints::KeypointSet;
use crate::oracle::{BoundingBox, LegImage, OracleError, OracleFn, OracleOutput};

/// Black leg photograph of the given size.
pub(crate) fn blank_leg(w: u32, h: u32) -> LegImage {
    LegImage::new("leg.png", RgbImage::new(w, h))
}

/// Right-facing leg with plausible vertical landmark ordering and a
/// pastern roughly parallel to the hoof wall.
pub(crate) fn sane_keypoints() -> KeypointSet {
    KeypointSet::new([48.0, 50.0], [110.0, 150.0], [120.0, 180.0], [170.0, 260.0])
}

/// Oracle answering every crop window with the same detection.
pub(crate) fn constant_oracle(
    keypoints: KeypointSet,
    confidence: [f32; 4],
) -> OracleFn<impl Fn(&LegImage, BoundingBox) -> Result<OracleOutput, OracleError>> {
    OracleFn(move |_: &LegImage, _: BoundingBox| {
        Ok(OracleOutput {
            keypoints,
            confidence,
        })
    })
}
