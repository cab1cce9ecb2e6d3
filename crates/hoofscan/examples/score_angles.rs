use hoofscan::{leg_score, LegAssessment};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <pastern_deg> <hoof_deg> [confidence]", args[0]);
        std::process::exit(2);
    }

    let pastern: f64 = args[1].parse()?;
    let hoof: f64 = args[2].parse()?;
    let confidence: f64 = match args.get(3) {
        Some(c) => c.parse()?,
        None => 1.0,
    };

    let score = leg_score(pastern, hoof);
    let assessment = LegAssessment::from_score(score, confidence);
    println!(
        "pastern {pastern:.2} / hoof {hoof:.2} -> score {score:.1}: {}",
        assessment.condition
    );
    println!("{}", serde_json::to_string_pretty(&assessment)?);
    Ok(())
}
