use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hoofscan::{
    analyze_leg, leg_score, measure_keypoints, scan, select_zone, AnalyzeConfig, BoundingBox,
    KeypointSet, Leg, LegAssessment, LegImage, LegInput, NormalizeConfig, OracleError, OracleFn,
    OracleOutput, ScanRequest, ZoneSelectConfig,
};
use image::RgbImage;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn make_keypoint_fixture(n: usize, seed: u64) -> Vec<KeypointSet> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let x0 = rng.gen_range(100.0..900.0);
            let lean = rng.gen_range(-40.0..40.0);
            let toe = rng.gen_range(-80.0..80.0);
            KeypointSet::new(
                [x0, rng.gen_range(50.0..200.0)],
                [x0 + lean, rng.gen_range(300.0..400.0)],
                [x0 + lean + 10.0, rng.gen_range(420.0..500.0)],
                [x0 + lean + toe, rng.gen_range(600.0..700.0)],
            )
        })
        .collect()
}

/// Oracle whose confidence varies with the crop window, so zone selection
/// has to compare every candidate.
fn zone_sensitive_oracle(
    keypoints: KeypointSet,
) -> OracleFn<impl Fn(&LegImage, BoundingBox) -> Result<OracleOutput, OracleError> + Sync> {
    OracleFn(move |_: &LegImage, bbox: BoundingBox| {
        let c = (0.5 + bbox.height() / 4000.0) as f32;
        Ok(OracleOutput {
            keypoints,
            confidence: [c.min(0.99); 4],
        })
    })
}

fn bench_zone_selection(c: &mut Criterion) {
    let img = LegImage::new("leg.png", RgbImage::new(1280, 1024));
    let oracle = zone_sensitive_oracle(make_keypoint_fixture(1, 3)[0]);
    let cfg = ZoneSelectConfig::default();

    c.bench_function("select_zone_1280x1024", |b| {
        b.iter(|| {
            let sel = select_zone(black_box(&oracle), black_box(&img), black_box(&cfg));
            black_box(sel.map(|s| s.best.aggregate_quality))
        })
    });
}

fn bench_measure_and_score(c: &mut Criterion) {
    let fixtures = make_keypoint_fixture(256, 7);
    let cfg = NormalizeConfig::default();

    c.bench_function("measure_score_256_legs", |b| {
        b.iter(|| {
            let mut total = 0.0;
            for kp in &fixtures {
                let m = measure_keypoints(black_box(kp), 1280, &cfg, 0.9);
                total += leg_score(m.pastern_angle, m.hoof_angle);
                total += LegAssessment::from_measurement(&m).quality as f64;
            }
            black_box(total)
        })
    });
}

fn bench_leg_pipeline(c: &mut Criterion) {
    let img = LegImage::new("leg.png", RgbImage::new(1280, 1024));
    let oracle = zone_sensitive_oracle(make_keypoint_fixture(1, 5)[0]);
    let cfg = AnalyzeConfig::default();

    c.bench_function("analyze_leg_1280x1024", |b| {
        b.iter(|| black_box(analyze_leg(&oracle, black_box(&img), &cfg).map(|a| a.success)))
    });

    c.bench_function("scan_4_legs_1280x1024", |b| {
        b.iter(|| {
            let mut request = ScanRequest::new();
            for leg in Leg::ALL {
                request.insert(leg, LegInput::Decoded(img.clone()));
            }
            black_box(scan(&oracle, request, &cfg).summary.scan_score)
        })
    });
}

criterion_group!(
    hotpaths,
    bench_zone_selection,
    bench_measure_and_score,
    bench_leg_pipeline
);
criterion_main!(hotpaths);
