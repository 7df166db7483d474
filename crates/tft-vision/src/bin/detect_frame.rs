//! CLI tool to run the unit detector on a saved TFT screenshot.
//! Usage: cargo run -p tft-vision --features cli --bin detect_frame -- <screenshot.png> <detect_units.py> [python]

use std::path::PathBuf;
use tft_vision::{lobby_from_detections, ScriptDetector};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <screenshot.png> <detect_units.py> [python]", args[0]);
        std::process::exit(1);
    }

    let input_path = PathBuf::from(&args[1]);
    let mut detector = ScriptDetector::new(&args[2]);
    if let Some(python) = args.get(3) {
        detector = detector.with_interpreter(python.as_str());
    }

    println!("Detecting units in {}", input_path.display());
    let detections = match detector.detect_path(&input_path) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Detection failed: {}", e);
            std::process::exit(1);
        }
    };

    println!("\n=== Detections ({}) ===", detections.len());
    for d in &detections {
        println!("  {:<16} x={:<5} y={:<5} conf={:.2}", d.champ, d.x, d.y, d.conf);
    }

    let lobby = lobby_from_detections(&detections);
    println!("\nOwned units: {}", lobby.my_units.join(", "));
}
