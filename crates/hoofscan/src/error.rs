use crate::oracle::{LegImage, OracleError};

/// Leg-scoped analysis failure.
///
/// A scan captures these per leg; one failing leg never aborts the others.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    #[error("empty image buffer")]
    EmptyBuffer,
    #[error("image decode failed: {0}")]
    Decode(#[from] image::ImageError),
    #[error(transparent)]
    Oracle(#[from] OracleError),
}

/// Decode an encoded photograph (PNG/JPEG) into an RGB leg image.
pub fn decode_leg_image(id: impl Into<String>, bytes: &[u8]) -> Result<LegImage, AnalyzeError> {
    if bytes.is_empty() {
        return Err(AnalyzeError::EmptyBuffer);
    }
    let decoded = image::load_from_memory(bytes)?;
    Ok(LegImage::new(id, decoded.to_rgb8()))
}
