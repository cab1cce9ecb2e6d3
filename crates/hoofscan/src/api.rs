//! High-level analysis API.
//!
//! [`Scanner`] is the primary entry point. It owns a keypoint oracle and an
//! [`AnalyzeConfig`] and exposes per-leg analysis and full four-leg scans.

use std::sync::OnceLock;

use crate::detector::AnalyzeConfig;
use crate::oracle::{KeypointOracle, LegImage, OracleError};
use crate::pipeline::{self, LegAnalysis, LegPool, ScanRequest, ScanResult};

/// Primary analysis interface.
///
/// Create once with an oracle handle, analyze many photographs. Results
/// never depend on earlier calls; the leg worker pool is started on the
/// first scan and reused until the configuration is changed.
///
/// # Examples
///
/// ```
/// use hoofscan::{
///     BoundingBox, KeypointSet, Leg, LegImage, LegInput, OracleError, OracleFn, OracleOutput,
///     ScanRequest, Scanner,
/// };
///
/// let oracle = OracleFn(|_: &LegImage, _: BoundingBox| {
///     Ok::<_, OracleError>(OracleOutput {
///         keypoints: KeypointSet::new([48.0, 50.0], [110.0, 150.0], [120.0, 180.0], [170.0, 260.0]),
///         confidence: [0.9; 4],
///     })
/// });
/// let scanner = Scanner::new(oracle);
/// let image = LegImage::new("front_left.png", image::RgbImage::new(400, 500));
/// let result = scanner.scan(ScanRequest::new().with_leg(Leg::FrontLeft, LegInput::Decoded(image)));
/// assert!(result.summary.scan_score.is_some());
/// ```
pub struct Scanner<O> {
    oracle: O,
    config: AnalyzeConfig,
    pool: OnceLock<LegPool>,
}

impl<O: KeypointOracle> Scanner<O> {
    /// Create a scanner with default configuration.
    pub fn new(oracle: O) -> Self {
        Self::with_config(oracle, AnalyzeConfig::default())
    }

    /// Create with full config control.
    pub fn with_config(oracle: O, config: AnalyzeConfig) -> Self {
        Self {
            oracle,
            config,
            pool: OnceLock::new(),
        }
    }

    /// Access the current configuration.
    pub fn config(&self) -> &AnalyzeConfig {
        &self.config
    }

    /// Mutable access to configuration for post-construction tuning.
    /// Drops the worker pool so the next scan picks up the new size.
    pub fn config_mut(&mut self) -> &mut AnalyzeConfig {
        self.pool = OnceLock::new();
        &mut self.config
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Consume the scanner and hand back its oracle.
    pub fn into_oracle(self) -> O {
        self.oracle
    }

    /// Analyze one leg photograph (no scoring).
    pub fn analyze_leg(&self, image: &LegImage) -> Result<LegAnalysis, OracleError> {
        pipeline::analyze_leg(&self.oracle, image, &self.config)
    }
}

impl<O: KeypointOracle + Sync> Scanner<O> {
    /// Analyze, score and aggregate up to four legs.
    pub fn scan(&self, request: ScanRequest) -> ScanResult {
        let pool = self
            .pool
            .get_or_init(|| LegPool::new(self.config.scan.max_parallel_legs));
        pipeline::scan_on(&self.oracle, request, &self.config, pool)
    }
}
