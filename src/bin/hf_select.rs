//! # D0 Candidate Selection CLI
//!
//! Run the D0 → π K selector over one event file and write the statuses.
//!
//! ## Usage
//!
//! ```bash
//! # Select with the built-in cut table
//! cargo run --bin hf_select -- --input event.json
//!
//! # Custom configuration, results to a file
//! cargo run --bin hf_select -- --config selector.json --input event.json --output statuses.json
//!
//! # Print the default configuration as a starting point
//! cargo run --bin hf_select -- --dump-config > selector.json
//! ```
//!
//! The event file holds `{"tracks": [...], "candidates": [...]}`; candidates
//! refer to tracks by their position in `tracks`.

use clap::Parser;
use hf_selector::{Candidate, D0Selector, SelectorConfig, TrackTable};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

/// D0 candidate selector
#[derive(Parser, Debug)]
#[command(name = "hf_select")]
#[command(about = "Select D0 → π K candidates under both charge-conjugate hypotheses")]
struct Args {
    /// JSON selector configuration (defaults when omitted)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// JSON event with tracks and candidates
    #[arg(long, short = 'i', required_unless_present = "dump_config")]
    input: Option<PathBuf>,

    /// Where to write the statuses (stdout when omitted)
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Evaluate candidates on one thread
    #[arg(long)]
    sequential: bool,

    /// Print the configuration as JSON and exit
    #[arg(long)]
    dump_config: bool,
}

#[derive(Debug, Deserialize)]
struct Event {
    tracks: TrackTable,
    candidates: Vec<Candidate>,
}

/// Configuration file (or defaults) with command-line overrides applied
fn effective_config(args: &Args) -> Result<SelectorConfig, Box<dyn std::error::Error>> {
    let mut config = match args.config {
        Some(ref path) => SelectorConfig::load(path)?,
        None => SelectorConfig::default(),
    };
    if args.sequential {
        config.parallel = false;
    }
    Ok(config)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = effective_config(&args)?;

    if args.dump_config {
        println!("{}", config.to_json()?);
        return Ok(());
    }

    let input = args
        .input
        .ok_or("an input event is required (--input)")?;
    let contents = fs::read_to_string(&input)
        .map_err(|e| format!("Failed to read event {:?}: {}", input, e))?;
    let event: Event = serde_json::from_str(&contents)?;
    log::info!(
        "Loaded {} candidates and {} tracks from {:?}",
        event.candidates.len(),
        event.tracks.len(),
        input
    );

    let selector = D0Selector::new(config)?;
    let (outputs, cut_flow) = selector.select_with_cut_flow(&event.candidates, &event.tracks);
    log::info!("{}", cut_flow.summary());

    let json = serde_json::to_string_pretty(&outputs)?;
    match args.output {
        Some(path) => {
            fs::write(&path, json)
                .map_err(|e| format!("Failed to write statuses {:?}: {}", path, e))?;
            log::info!("Wrote {} statuses to {:?}", outputs.len(), path);
        }
        None => println!("{}", json),
    }

    Ok(())
}
