use std::path::Path;

use crate::normalize::NormalizeConfig;

use super::zones::ZoneSelectConfig;

/// Confidence gate applied to the winning detection.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ConfidenceGate {
    /// Every keypoint confidence must be strictly above this value.
    pub min_keypoint_confidence: f32,
}

impl Default for ConfidenceGate {
    fn default() -> Self {
        Self {
            min_keypoint_confidence: 0.10,
        }
    }
}

impl ConfidenceGate {
    /// True when all four confidences pass the gate.
    pub fn passes(&self, confidence: &[f32; 4]) -> bool {
        confidence.iter().all(|&c| c > self.min_keypoint_confidence)
    }
}

/// Scan-level scheduling controls.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ScanParams {
    /// Upper bound on legs analyzed concurrently.
    pub max_parallel_legs: usize,
}

impl Default for ScanParams {
    fn default() -> Self {
        Self {
            max_parallel_legs: 4,
        }
    }
}

/// Errors while loading or validating an [`AnalyzeConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level analysis configuration.
///
/// Zone windows and the scoring policy are fixed; this only carries the
/// detection heuristics and scheduling knobs.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyzeConfig {
    pub zones: ZoneSelectConfig,
    pub gate: ConfidenceGate,
    pub normalize: NormalizeConfig,
    pub scan: ScanParams,
}

impl AnalyzeConfig {
    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&data)
    }

    pub fn from_json_str(data: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(data)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        let z = &self.zones;
        if !z.aspect_ratio.is_finite() || z.aspect_ratio <= 0.0 {
            return invalid("zones.aspect_ratio must be finite and > 0");
        }
        if !z.sanity_margin_px.is_finite() {
            return invalid("zones.sanity_margin_px must be finite");
        }
        if !z.insane_penalty.is_finite() || z.insane_penalty < 0.0 {
            return invalid("zones.insane_penalty must be finite and >= 0");
        }

        let g = self.gate.min_keypoint_confidence;
        if !g.is_finite() || !(0.0..1.0).contains(&g) {
            return invalid("gate.min_keypoint_confidence must be in [0, 1)");
        }

        let n = &self.normalize;
        for (name, v) in [
            ("normalize.width_fraction", n.width_fraction),
            ("normalize.pastern_top_shift", n.pastern_top_shift),
            ("normalize.pastern_bottom_shift", n.pastern_bottom_shift),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be finite and >= 0"
                )));
            }
        }

        if self.scan.max_parallel_legs == 0 {
            return invalid("scan.max_parallel_legs must be >= 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_stable() {
        let cfg = AnalyzeConfig::default();
        assert!((cfg.zones.aspect_ratio - 0.75).abs() < 1e-12);
        assert_eq!(cfg.zones.sanity_margin_px, 10.0);
        assert_eq!(cfg.zones.insane_penalty, 8.0);
        assert!((cfg.gate.min_keypoint_confidence - 0.10).abs() < 1e-7);
        assert_eq!(cfg.normalize.width_fraction, 0.05);
        assert_eq!(cfg.scan.max_parallel_legs, 4);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn gate_is_strict() {
        let gate = ConfidenceGate::default();
        assert!(!gate.passes(&[0.5, 0.5, 0.5, 0.05]));
        assert!(gate.passes(&[0.11, 0.11, 0.11, 0.11]));
        assert!(!gate.passes(&[0.10, 0.9, 0.9, 0.9]));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg = AnalyzeConfig::from_json_str(r#"{"scan": {"max_parallel_legs": 2}}"#)
            .expect("valid");
        assert_eq!(cfg.scan.max_parallel_legs, 2);
        assert_eq!(cfg.zones, ZoneSelectConfig::default());
    }

    #[test]
    fn rejects_unknown_sections() {
        assert!(AnalyzeConfig::from_json_str(r#"{"scoring": {}}"#).is_err());
    }

    #[test]
    fn rejects_zero_workers_and_bad_gate() {
        let err = AnalyzeConfig::from_json_str(r#"{"scan": {"max_parallel_legs": 0}}"#)
            .expect_err("zero workers");
        assert!(matches!(err, ConfigError::Invalid(_)));
        let err = AnalyzeConfig::from_json_str(r#"{"gate": {"min_keypoint_confidence": 1.5}}"#)
            .expect_err("gate out of range");
        assert!(err.to_string().contains("min_keypoint_confidence"));
    }

    #[test]
    fn rejects_non_positive_aspect_ratio() {
        let mut cfg = AnalyzeConfig::default();
        cfg.zones.aspect_ratio = 0.0;
        assert!(cfg.validate().is_err());
    }
}
