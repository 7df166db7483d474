//! Feed maintenance and lobby scoring from the command line.
//! Usage:
//!   cargo run -p tft-advisor --features cli --bin meta_tool -- write-demo <meta.json>
//!   cargo run -p tft-advisor --features cli --bin meta_tool -- best [meta.json] [weighted|lobby] [limit] < lobby.json

use anyhow::{bail, Context, Result};
use std::io::Read;
use std::path::Path;
use tft_advisor::{best_comps, ScorerKind};
use tft_data::demo::{demo_compositions, write_demo_meta};
use tft_data::MetaDocument;

const USAGE: &str = "Usage: meta_tool write-demo <meta.json>\n       meta_tool best [meta.json|demo] [weighted|lobby] [limit] < lobby.json";

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(e) = run(&args) {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: &[String]) -> Result<()> {
    match args.first().map(String::as_str) {
        Some("write-demo") => {
            let path = args.get(1).context(USAGE)?;
            write_demo_meta(Path::new(path))
        }
        Some("best") => {
            let comps = match args.get(1).map(String::as_str) {
                None | Some("demo") => demo_compositions(),
                Some(path) => {
                    let content = std::fs::read_to_string(path)
                        .with_context(|| format!("Failed to read {}", path))?;
                    MetaDocument::from_json(&content)
                        .with_context(|| format!("Failed to parse {}", path))?
                        .compositions
                }
            };
            let scorer = match args.get(2) {
                None => ScorerKind::default(),
                Some(raw) => ScorerKind::parse(raw).with_context(|| format!("Unknown scorer {:?}", raw))?,
            };
            let limit = match args.get(3) {
                None => 3,
                Some(raw) => raw.parse::<usize>().with_context(|| format!("Bad limit {:?}", raw))?,
            };

            let mut lobby_json = String::new();
            std::io::stdin()
                .read_to_string(&mut lobby_json)
                .context("Failed to read lobby JSON from stdin")?;

            let best = best_comps(&lobby_json, &comps, scorer.build().as_ref(), limit)?;
            println!("{}", serde_json::to_string_pretty(&best)?);
            Ok(())
        }
        _ => bail!(USAGE),
    }
}
