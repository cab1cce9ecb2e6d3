//! Detection stage: zone probing, sanity scoring and the confidence gate.
//!
//! The `pipeline` module owns the per-leg call order. This module provides
//! the zone-selection primitive and the detection-side configuration.

pub(crate) mod config;
pub(crate) mod zones;

pub use config::{AnalyzeConfig, ConfidenceGate, ConfigError, ScanParams};
pub use zones::{
    aggregate_quality, is_sane, select_zone, zones_for_height, DetectionResult, Zone, ZoneKind,
    ZoneSelectConfig, ZoneSelection, MODEL_ASPECT_RATIO,
};
