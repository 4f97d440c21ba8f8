//! # Warren Main Entry Point
//!
//! Generates one floor from the command line and prints its text rendering.

use clap::Parser;
use env_logger::Env;
use log::info;
use std::path::PathBuf;
use warren::{FloorGenerator, GenerationConfig, WarrenResult};

/// Command line arguments for the Warren floor generator.
#[derive(Parser, Debug)]
#[command(name = "warren")]
#[command(about = "Procedural dungeon floor generator on a 32x32 grid")]
#[command(version)]
struct Args {
    /// Random seed for floor generation
    #[arg(short, long)]
    seed: Option<u64>,

    /// Floor number recorded on the generated rooms
    #[arg(short, long, default_value_t = 1)]
    floor: u32,

    /// JSON file overriding generation settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Attempts before giving up, each with a fresh seed
    #[arg(short, long, default_value_t = 1)]
    retries: u32,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> WarrenResult<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(Env::default().default_filter_or(args.log_level.as_str())).init();

    info!("Starting Warren v{}", warren::VERSION);

    let config = match &args.config {
        Some(path) => {
            info!("Loading generation config from {}", path.display());
            GenerationConfig::from_json_file(path)?
        }
        None => GenerationConfig::default(),
    };

    let seed = args.seed.unwrap_or_else(rand::random);
    info!("Using seed {}", seed);

    let generator = FloorGenerator::new(config)?;
    let floor = generator.generate_with_retries(args.floor, seed, args.retries)?;

    print!("{floor}");
    println!(
        "floor {}: {} rooms, {} room tiles, {} corridor tiles",
        floor.floor_number,
        floor.rooms().len(),
        floor.room_tile_count(),
        floor.corridor_tile_count()
    );
    Ok(())
}
