//! Anatomical correction and orientation normalization of a raw detection.
//!
//! Two steps, applied in this order:
//!
//! 1. **Facing offset** – the top-of-pastern marker sits systematically off
//!    the limb's flexion axis. The shift direction depends on which way the
//!    animal faces in the photo, so it must be computed on the raw
//!    (pre-mirror) coordinates.
//! 2. **Orientation** – if the toe is left of the pastern top, every x is
//!    mirrored about their midpoint so angle computation always sees one
//!    canonical left-to-right frame.
//!
//! Both steps return new [`KeypointSet`] values; inputs are never mutated.

use crate::keypoints::KeypointSet;

/// Parameters of the facing-direction offset.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Limb width estimate as a fraction of image width.
    pub width_fraction: f64,
    /// Shift of the pastern-top marker, in limb widths.
    pub pastern_top_shift: f64,
    /// Shift of the pastern-bottom marker, in limb widths.
    pub pastern_bottom_shift: f64,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            width_fraction: 0.05,
            pastern_top_shift: 0.25,
            pastern_bottom_shift: 0.10,
        }
    }
}

/// Which way the limb faces in the photograph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    /// Infer facing from the raw keypoints: the hoof-wall top lying left of
    /// the pastern bottom means the animal faces left.
    pub fn infer(keypoints: &KeypointSet) -> Self {
        if keypoints.hoof_top().x < keypoints.pastern_bottom().x {
            Self::Left
        } else {
            Self::Right
        }
    }

    fn sign(self) -> f64 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }
}

/// Step A: shift the pastern markers toward the facing direction.
pub fn apply_facing_offset(
    keypoints: &KeypointSet,
    image_width: u32,
    config: &NormalizeConfig,
) -> KeypointSet {
    let direction = Facing::infer(keypoints).sign();
    let width_estimate = image_width as f64 * config.width_fraction;
    let top_shift = direction * width_estimate * config.pastern_top_shift;
    let bottom_shift = direction * width_estimate * config.pastern_bottom_shift;
    keypoints.map_x(|idx, x| match idx {
        0 => x + top_shift,
        1 => x + bottom_shift,
        _ => x,
    })
}

/// Reflect every x coordinate about the vertical line `x = cx`.
pub fn mirror_about(keypoints: &KeypointSet, cx: f64) -> KeypointSet {
    keypoints.map_x(|_, x| 2.0 * cx - x)
}

/// Step B: mirror into the canonical frame when the toe lies left of the
/// pastern top. Sets already in canonical orientation are returned as-is.
pub fn canonicalize_orientation(keypoints: &KeypointSet) -> KeypointSet {
    let top_x = keypoints.pastern_top().x;
    let toe_x = keypoints.toe_tip().x;
    if toe_x < top_x {
        mirror_about(keypoints, (top_x + toe_x) / 2.0)
    } else {
        *keypoints
    }
}

/// Full normalization: facing offset first, then orientation.
pub fn normalize(keypoints: &KeypointSet, image_width: u32, config: &NormalizeConfig) -> KeypointSet {
    let offset = apply_facing_offset(keypoints, image_width, config);
    canonicalize_orientation(&offset)
}
