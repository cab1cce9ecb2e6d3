use hoofscan::{AnnotationOracle, AnnotationSet, Leg, LegInput, ScanRequest, Scanner};
use std::error::Error;
use std::path::Path;

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!(
            "Usage: {} <keypoints.json> <front_left.jpg> [front_right.jpg] [back_left.jpg] [back_right.jpg]",
            args[0]
        );
        std::process::exit(2);
    }

    let annotations = AnnotationSet::from_json_file(Path::new(&args[1]))?;
    let scanner = Scanner::new(AnnotationOracle::new(annotations));

    let mut request = ScanRequest::new();
    for (leg, path) in Leg::ALL.iter().zip(&args[2..]) {
        request.insert(
            *leg,
            LegInput::Encoded {
                id: path.clone(),
                bytes: std::fs::read(path)?,
            },
        );
    }

    let result = scanner.scan(request);
    println!("{}", serde_json::to_string_pretty(&result.report())?);
    Ok(())
}
