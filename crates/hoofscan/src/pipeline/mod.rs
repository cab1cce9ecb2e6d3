//! Per-leg and per-scan orchestration.
//!
//! Call order for one leg: zone selection -> confidence gate ->
//! normalization -> geometry -> scoring. A scan runs that chain for up to
//! four legs and aggregates the scores of the legs that passed the gate.
//!
//! Algorithmic primitives live in `crate::detector`, `crate::normalize`,
//! `crate::geometry` and `crate::scoring`; this layer owns data flow and
//! failure capture.

mod leg;
mod report;
mod scan;

pub use leg::{analyze_leg, measure_keypoints, LegAnalysis};
pub use report::{LegReport, ScanReport};
pub use scan::{run_leg, scan, Leg, LegInput, LegOutcome, ScanRequest, ScanResult};
pub(crate) use scan::{scan_on, LegPool};
