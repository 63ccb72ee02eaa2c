//! Headless tile-grid runner.
//!
//! Runs scenarios without a window. Frames go to stdout, logs to stderr.
//!
//! # Usage
//!
//! ```bash
//! # Default scenario, last frame only
//! cargo run -p tilerts_headless -- run
//!
//! # Scenario file, JSON lines every 30 frames
//! cargo run -p tilerts_headless -- run --scenario scenarios/crossing.ron --every 30 --json
//!
//! # Inspect one search
//! cargo run -p tilerts_headless -- path --from 2,7 --to 17,7 --blocked 10,7
//!
//! # Determinism check
//! cargo run -p tilerts_headless -- verify --scenario scenarios/open_field.ron --runs 10
//! ```

use std::io;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tilerts_core::grid::{Grid, TilePos};
use tilerts_core::pathfinding::{find_path_traced, SearchTrace};
use tilerts_headless::{
    parse_tile, verify_determinism, write_search, OutputFormat, RunConfig, Scenario,
    ScenarioRunner,
};

#[derive(Parser)]
#[command(name = "tilerts_headless")]
#[command(about = "Headless tile-grid runner for scenario testing and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario and print frames
    Run {
        /// Scenario file to load
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Frames to simulate (defaults to the scenario's value)
        #[arg(short, long)]
        frames: Option<u64>,

        /// Print every Nth frame (0 = last frame only)
        #[arg(long, default_value = "0")]
        every: u64,

        /// Overlay the last A* search on the map
        #[arg(long)]
        overlay: bool,

        /// Write JSON lines instead of ASCII
        #[arg(long)]
        json: bool,
    },

    /// Run one search on the default map and print its overlay
    Path {
        /// Start tile as X,Y
        #[arg(long, value_parser = parse_tile)]
        from: TilePos,

        /// Goal tile as X,Y
        #[arg(long, value_parser = parse_tile)]
        to: TilePos,

        /// Blocked tile as X,Y (repeatable)
        #[arg(long, value_parser = parse_tile)]
        blocked: Vec<TilePos>,
    },

    /// Verify determinism by running the same scenario several times
    Verify {
        /// Scenario file to test
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Number of verification runs
        #[arg(short, long, default_value = "5")]
        runs: u32,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for frames)
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    match cli.command {
        Some(Commands::Run {
            scenario,
            frames,
            every,
            overlay,
            json,
        }) => {
            cmd_run(scenario, frames, every, overlay, json);
        }
        Some(Commands::Path { from, to, blocked }) => {
            cmd_path(from, to, &blocked);
        }
        Some(Commands::Verify { scenario, runs }) => {
            cmd_verify(scenario, runs);
        }
        None => {
            cmd_run(None, None, 0, false, false);
        }
    }
}

/// Load a scenario or exit with a message.
fn load_scenario(path: Option<PathBuf>) -> Scenario {
    let Some(path) = path else {
        return Scenario::default();
    };
    match Scenario::load(&path) {
        Ok(scenario) => scenario,
        Err(e) => {
            eprintln!("Failed to load scenario {}: {}", path.display(), e);
            std::process::exit(1);
        }
    }
}

/// Run a scenario
fn cmd_run(scenario: Option<PathBuf>, frames: Option<u64>, every: u64, overlay: bool, json: bool) {
    let scenario = load_scenario(scenario);
    tracing::info!("Running scenario: {}", scenario.name);

    let config = RunConfig {
        frames: frames.unwrap_or(scenario.frames),
        every,
        overlay,
        format: if json {
            OutputFormat::Json
        } else {
            OutputFormat::Ascii
        },
    };

    let mut runner = match ScenarioRunner::new(&scenario) {
        Ok(runner) => runner,
        Err(e) => {
            eprintln!("Failed to set up scenario: {}", e);
            std::process::exit(1);
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match runner.run(&config, &mut out) {
        Ok(summary) => {
            eprintln!(
                "Ran {} frames: {} orders issued, {} rejected, {} steps, hash {:016x}",
                summary.frames, summary.issued, summary.rejected, summary.arrivals, summary.final_hash
            );
        }
        Err(e) => {
            eprintln!("Failed to write output: {}", e);
            std::process::exit(1);
        }
    }
}

/// Run one search and print it
fn cmd_path(from: TilePos, to: TilePos, blocked: &[TilePos]) {
    let mut grid = Grid::default();
    for &tile in blocked {
        if !grid.set_walkable(tile, false) {
            tracing::warn!("Ignoring blocked tile {} outside the map", tile);
        }
    }

    let mut trace = SearchTrace::new(&grid);
    let result = find_path_traced(&grid, from, to, &mut trace);

    let mut out = io::stdout().lock();
    if let Err(e) = write_search(&mut out, &grid, from, to, &result, &trace) {
        eprintln!("Failed to write output: {}", e);
        std::process::exit(1);
    }
}

/// Verify determinism
fn cmd_verify(scenario: Option<PathBuf>, runs: u32) {
    let scenario = load_scenario(scenario);
    tracing::info!(
        "Verifying determinism: {} ({} frames, {} runs)",
        scenario.name,
        scenario.frames,
        runs
    );

    match verify_determinism(&scenario, scenario.frames, runs) {
        Ok(report) if report.is_deterministic() => {
            eprintln!("PASS: All {} runs produced identical results", runs);
        }
        Ok(report) => {
            eprintln!("FAIL: Non-determinism detected!");
            eprintln!("  Hashes: {:016x?}", report.hashes);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Failed to set up scenario: {}", e);
            std::process::exit(1);
        }
    }
}
