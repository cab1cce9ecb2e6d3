use std::cell::Cell;
use std::io::Cursor;

use approx::assert_abs_diff_eq;
use hoofscan::{
    AnnotationOracle, AnnotationSet, BoundingBox, Condition, KeypointOracle, KeypointSet, Leg,
    LegImage, LegInput, LegOutcome, OracleError, OracleFn, OracleOutput, ScanRequest, ScanVerdict,
    Scanner, Serialized, ZoneKind,
};
use image::{DynamicImage, ImageFormat, RgbImage};

/// Pastern and hoof wall close to parallel on a 400 px wide photograph.
fn aligned() -> KeypointSet {
    KeypointSet::new([48.0, 50.0], [110.0, 150.0], [120.0, 180.0], [170.0, 260.0])
}

fn png_bytes(w: u32, h: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::new(w, h))
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("encode png");
    buf
}

fn decoded(id: &str) -> LegInput {
    LegInput::Decoded(LegImage::new(id, RgbImage::new(400, 500)))
}

#[test]
fn four_aligned_legs_score_optimal() {
    let scanner = Scanner::new(OracleFn(|_: &LegImage, _: BoundingBox| {
        Ok::<_, OracleError>(OracleOutput {
            keypoints: aligned(),
            confidence: [0.92; 4],
        })
    }));
    let mut request = ScanRequest::new();
    for leg in Leg::ALL {
        request.insert(leg, decoded(&format!("{leg}.png")));
    }
    let result = scanner.scan(request);

    for leg in Leg::ALL {
        let a = result.outcome(leg).assessment().expect("scored");
        assert_eq!(a.score, 9.5);
        assert_eq!(a.condition, Condition::Optimal);
        assert_eq!(a.quality, 9);
    }
    assert_eq!(result.summary.scan_score, Some(9.5));
    assert_eq!(result.summary.verdict, Some(ScanVerdict::Optimal));
}

#[test]
fn left_and_right_facing_photos_score_the_same() {
    let mirrored = KeypointSet::from_array(aligned().to_array().map(|[x, y]| [400.0 - x, y]));
    let oracle = OracleFn(move |img: &LegImage, _: BoundingBox| {
        let keypoints = if img.id == "left.png" {
            mirrored
        } else {
            aligned()
        };
        Ok::<_, OracleError>(OracleOutput {
            keypoints,
            confidence: [0.9; 4],
        })
    });
    let scanner = Scanner::new(oracle);
    let l = scanner
        .analyze_leg(&LegImage::new("left.png", RgbImage::new(400, 500)))
        .expect("left");
    let r = scanner
        .analyze_leg(&LegImage::new("right.png", RgbImage::new(400, 500)))
        .expect("right");
    let (l, r) = (
        l.measurement().expect("left measured"),
        r.measurement().expect("right measured"),
    );
    assert_abs_diff_eq!(l.pastern_angle, r.pastern_angle, epsilon = 1e-9);
    assert_abs_diff_eq!(l.hoof_angle, r.hoof_angle, epsilon = 1e-9);
}

#[test]
fn non_reentrant_oracle_is_shared_through_a_lock() {
    struct Counting {
        calls: Cell<usize>,
    }
    impl KeypointOracle for Counting {
        fn infer(&self, _: &LegImage, _: BoundingBox) -> Result<OracleOutput, OracleError> {
            self.calls.set(self.calls.get() + 1);
            Ok(OracleOutput {
                keypoints: aligned(),
                confidence: [0.8; 4],
            })
        }
    }

    let scanner = Scanner::new(Serialized::new(Counting {
        calls: Cell::new(0),
    }));
    let request = ScanRequest::new()
        .with_leg(Leg::FrontLeft, decoded("a.png"))
        .with_leg(Leg::FrontRight, decoded("b.png"))
        .with_leg(Leg::BackLeft, decoded("c.png"));
    let result = scanner.scan(request);
    assert_eq!(result.leg_scores().len(), 3);
    // Four zone probes per leg.
    assert_eq!(scanner.into_oracle().into_inner().calls.get(), 12);
}

#[test]
fn annotation_replay_scan_from_encoded_bytes() {
    let annotations = AnnotationSet::from_json_str(
        r#"{
            "images": [
                {"id": 1, "file_name": "fl.png"},
                {"id": 2, "file_name": "br.png"}
            ],
            "annotations": [
                {"image_id": 1, "keypoints": [48, 50, 2, 110, 150, 2, 120, 180, 2, 170, 260, 2]},
                {"image_id": 2, "keypoints": [48, 50, 2, 110, 150, 2, 120, 180, 0, 170, 260, 2]}
            ]
        }"#,
    )
    .expect("annotations");
    let scanner = Scanner::new(AnnotationOracle::new(annotations));

    let request = ScanRequest::new()
        .with_leg(
            Leg::FrontLeft,
            LegInput::Encoded {
                id: "fl.png".into(),
                bytes: png_bytes(400, 500),
            },
        )
        .with_leg(
            Leg::BackRight,
            LegInput::Encoded {
                id: "br.png".into(),
                bytes: png_bytes(400, 500),
            },
        )
        .with_leg(
            Leg::FrontRight,
            LegInput::Encoded {
                id: "unlabelled.png".into(),
                bytes: png_bytes(400, 500),
            },
        );
    let result = scanner.scan(request);

    // All zones tie on replayed annotations, so the first zone wins.
    let fl = result.outcome(Leg::FrontLeft);
    assert!(fl.is_scored());
    assert_eq!(fl.analysis().expect("analysis").best_zone, ZoneKind::FloorScan);

    // Hidden hoof-wall top: confidence 0 fails the gate.
    assert!(matches!(
        result.outcome(Leg::BackRight),
        LegOutcome::Rejected { .. }
    ));
    assert!(matches!(
        result.outcome(Leg::FrontRight),
        LegOutcome::Failed { .. }
    ));

    let report = serde_json::to_value(result.report()).expect("serialize");
    assert_eq!(report["frontLeftCondition"], "Optimal Alignment");
    assert_eq!(report["frontLeftQuality"], 10);
    assert!(report["frontRightNotes"]
        .as_str()
        .is_some_and(|n| n.starts_with("Inference failed:")));
    assert_eq!(report["scanScore"], report["frontLeftScanScore"]);
}

#[test]
fn corrupt_image_fails_only_its_leg() {
    let scanner = Scanner::new(OracleFn(|_: &LegImage, _: BoundingBox| {
        Ok::<_, OracleError>(OracleOutput {
            keypoints: aligned(),
            confidence: [0.9; 4],
        })
    }));
    let request = ScanRequest::new()
        .with_leg(
            Leg::BackLeft,
            LegInput::Encoded {
                id: "broken.jpg".into(),
                bytes: b"\xff\xd8 definitely not a jpeg".to_vec(),
            },
        )
        .with_leg(Leg::BackRight, decoded("ok.png"));
    let result = scanner.scan(request);

    assert!(matches!(
        result.outcome(Leg::BackLeft),
        LegOutcome::Failed { .. }
    ));
    assert!(result.outcome(Leg::BackRight).is_scored());
    let report = serde_json::to_value(result.report()).expect("serialize");
    assert!(report["backLeftNotes"]
        .as_str()
        .is_some_and(|n| n.starts_with("Decode failed:")));
    assert!(report["backLeftScanScore"].is_null());
    assert!(report["scanScore"].is_number());
}
