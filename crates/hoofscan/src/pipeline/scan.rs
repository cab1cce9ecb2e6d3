use std::collections::BTreeMap;

use crate::detector::AnalyzeConfig;
use crate::error::{decode_leg_image, AnalyzeError};
use crate::oracle::{KeypointOracle, LegImage};
use crate::scoring::{aggregate_scan, LegAssessment, ScanSummary};

use super::leg::{analyze_leg, LegAnalysis};
use super::report::ScanReport;

/// Anatomical position of one leg photograph.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum Leg {
    FrontLeft,
    FrontRight,
    BackLeft,
    BackRight,
}

impl Leg {
    pub const ALL: [Leg; 4] = [Leg::FrontLeft, Leg::FrontRight, Leg::BackLeft, Leg::BackRight];

    /// Key prefix used in the boundary JSON.
    pub fn key(self) -> &'static str {
        match self {
            Self::FrontLeft => "frontLeft",
            Self::FrontRight => "frontRight",
            Self::BackLeft => "backLeft",
            Self::BackRight => "backRight",
        }
    }
}

impl std::fmt::Display for Leg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Photograph supplied for one leg.
#[derive(Debug)]
pub enum LegInput {
    /// Encoded PNG/JPEG bytes, decoded inside the scan.
    Encoded { id: String, bytes: Vec<u8> },
    /// Already decoded pixels.
    Decoded(LegImage),
    /// The photograph could not be acquired; reported as a failed leg.
    Unavailable(AnalyzeError),
}

/// Up to four leg photographs.
#[derive(Debug, Default)]
pub struct ScanRequest {
    legs: BTreeMap<Leg, LegInput>,
}

impl ScanRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`ScanRequest::insert`].
    pub fn with_leg(mut self, leg: Leg, input: LegInput) -> Self {
        self.insert(leg, input);
        self
    }

    /// Set the photograph of `leg`, replacing any previous one.
    pub fn insert(&mut self, leg: Leg, input: LegInput) {
        self.legs.insert(leg, input);
    }

    pub fn len(&self) -> usize {
        self.legs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }
}

/// Terminal state of one leg.
#[derive(Debug, serde::Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LegOutcome {
    /// No photograph was supplied.
    Missing,
    Scored {
        analysis: LegAnalysis,
        assessment: LegAssessment,
    },
    /// The confidence gate rejected the winning detection.
    Rejected { analysis: LegAnalysis },
    Failed {
        #[serde(serialize_with = "serialize_display")]
        error: AnalyzeError,
    },
}

impl LegOutcome {
    pub fn assessment(&self) -> Option<&LegAssessment> {
        match self {
            Self::Scored { assessment, .. } => Some(assessment),
            _ => None,
        }
    }

    pub fn analysis(&self) -> Option<&LegAnalysis> {
        match self {
            Self::Scored { analysis, .. } | Self::Rejected { analysis } => Some(analysis),
            _ => None,
        }
    }

    pub fn is_scored(&self) -> bool {
        matches!(self, Self::Scored { .. })
    }
}

fn serialize_display<S: serde::Serializer>(
    err: &AnalyzeError,
    s: S,
) -> Result<S::Ok, S::Error> {
    s.collect_str(err)
}

/// Outcome of every leg plus the scan-level verdict.
#[derive(Debug, serde::Serialize)]
pub struct ScanResult {
    /// Always holds all four legs; legs without input are `Missing`.
    pub legs: BTreeMap<Leg, LegOutcome>,
    pub summary: ScanSummary,
}

impl ScanResult {
    pub fn outcome(&self, leg: Leg) -> &LegOutcome {
        self.legs.get(&leg).unwrap_or(&LegOutcome::Missing)
    }

    /// Scores of the scored legs, in [`Leg::ALL`] order.
    pub fn leg_scores(&self) -> Vec<f64> {
        Leg::ALL
            .iter()
            .filter_map(|leg| self.outcome(*leg).assessment().map(|a| a.score))
            .collect()
    }

    /// Flattened boundary report.
    pub fn report(&self) -> ScanReport {
        ScanReport::from_result(self)
    }
}

/// Decode, analyze and score one leg. Never fails: every error is captured
/// into the outcome.
pub fn run_leg<O: KeypointOracle + ?Sized>(
    oracle: &O,
    leg: Leg,
    input: LegInput,
    config: &AnalyzeConfig,
) -> LegOutcome {
    let image = match input {
        LegInput::Decoded(image) => image,
        LegInput::Encoded { id, bytes } => match decode_leg_image(id, &bytes) {
            Ok(image) => image,
            Err(error) => return failed(leg, error),
        },
        LegInput::Unavailable(error) => return failed(leg, error),
    };

    let analysis = match analyze_leg(oracle, &image, config) {
        Ok(analysis) => analysis,
        Err(error) => return failed(leg, error.into()),
    };

    match analysis.measurement() {
        Some(m) => {
            let assessment = LegAssessment::from_measurement(&m);
            tracing::info!(
                "{leg}: score {:.1} ({}), quality {}",
                assessment.score,
                assessment.condition,
                assessment.quality
            );
            LegOutcome::Scored {
                analysis,
                assessment,
            }
        }
        None => LegOutcome::Rejected { analysis },
    }
}

fn failed(leg: Leg, error: AnalyzeError) -> LegOutcome {
    tracing::warn!("{leg}: analysis failed: {error}");
    LegOutcome::Failed { error }
}

/// Worker pool for leg-level parallelism. Empty when legs run
/// sequentially.
#[derive(Debug, Default)]
pub(crate) struct LegPool {
    #[cfg(feature = "parallel")]
    pool: Option<rayon::ThreadPool>,
}

impl LegPool {
    /// Start a pool of `threads` workers; falls back to sequential on
    /// failure.
    #[cfg(feature = "parallel")]
    pub(crate) fn new(threads: usize) -> Self {
        match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => Self { pool: Some(pool) },
            Err(e) => {
                tracing::warn!("leg worker pool unavailable ({e}); analyzing legs sequentially");
                Self { pool: None }
            }
        }
    }

    #[cfg(not(feature = "parallel"))]
    pub(crate) fn new(_threads: usize) -> Self {
        Self {}
    }

    #[cfg(all(test, feature = "parallel"))]
    pub(crate) fn threads(&self) -> Option<usize> {
        self.pool.as_ref().map(rayon::ThreadPool::current_num_threads)
    }
}

/// Analyze every supplied leg and aggregate the scores.
///
/// Legs are independent: a failure or rejection on one leg never affects
/// the others. With the `parallel` feature legs run on a rayon pool of
/// `config.scan.max_parallel_legs` threads, started for this call;
/// [`Scanner`](crate::Scanner) keeps one pool across scans. Results do not
/// depend on scheduling order.
pub fn scan<O: KeypointOracle + Sync + ?Sized>(
    oracle: &O,
    request: ScanRequest,
    config: &AnalyzeConfig,
) -> ScanResult {
    let pool = if request.len() > 1 {
        LegPool::new(config.scan.max_parallel_legs.min(request.len()))
    } else {
        LegPool::default()
    };
    scan_on(oracle, request, config, &pool)
}

/// [`scan`] on an existing worker pool.
pub(crate) fn scan_on<O: KeypointOracle + Sync + ?Sized>(
    oracle: &O,
    request: ScanRequest,
    config: &AnalyzeConfig,
    pool: &LegPool,
) -> ScanResult {
    let jobs: Vec<(Leg, LegInput)> = request.legs.into_iter().collect();
    tracing::info!("scanning {} leg(s)", jobs.len());

    let outcomes = run_jobs(oracle, jobs, config, pool);

    let mut legs: BTreeMap<Leg, LegOutcome> =
        Leg::ALL.iter().map(|&leg| (leg, LegOutcome::Missing)).collect();
    legs.extend(outcomes);

    let scores: Vec<f64> = Leg::ALL
        .iter()
        .filter_map(|leg| legs.get(leg).and_then(LegOutcome::assessment))
        .map(|a| a.score)
        .collect();
    let summary = aggregate_scan(&scores);
    tracing::info!(
        "scan score {:?} from {} scored leg(s)",
        summary.scan_score,
        scores.len()
    );

    ScanResult { legs, summary }
}

#[cfg(feature = "parallel")]
fn run_jobs<O: KeypointOracle + Sync + ?Sized>(
    oracle: &O,
    jobs: Vec<(Leg, LegInput)>,
    config: &AnalyzeConfig,
    pool: &LegPool,
) -> Vec<(Leg, LegOutcome)> {
    use rayon::prelude::*;

    match &pool.pool {
        Some(pool) if jobs.len() > 1 => pool.install(|| {
            jobs.into_par_iter()
                .map(|(leg, input)| (leg, run_leg(oracle, leg, input, config)))
                .collect()
        }),
        _ => run_jobs_sequential(oracle, jobs, config),
    }
}

#[cfg(not(feature = "parallel"))]
fn run_jobs<O: KeypointOracle + Sync + ?Sized>(
    oracle: &O,
    jobs: Vec<(Leg, LegInput)>,
    config: &AnalyzeConfig,
    _pool: &LegPool,
) -> Vec<(Leg, LegOutcome)> {
    run_jobs_sequential(oracle, jobs, config)
}

fn run_jobs_sequential<O: KeypointOracle + ?Sized>(
    oracle: &O,
    jobs: Vec<(Leg, LegInput)>,
    config: &AnalyzeConfig,
) -> Vec<(Leg, LegOutcome)> {
    jobs.into_iter()
        .map(|(leg, input)| (leg, run_leg(oracle, leg, input, config)))
        .collect()
}
