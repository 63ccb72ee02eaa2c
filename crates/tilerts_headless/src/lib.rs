//! Headless runner for tile-grid scenarios.
//!
//! Stands in for the window, mouse and renderer so the simulation core can
//! be driven from CI:
//!
//! - **Input**: scripted pixel clicks from a RON [`scenario`]
//! - **Render**: ASCII frames with an optional A* overlay, or JSON lines
//! - **Verification**: repeated runs compared by state hash
//!
//! # Example
//!
//! ```bash
//! # Run the wall scenario and print every 60th frame with the search overlay
//! cargo run -p tilerts_headless -- run --scenario scenarios/wall_detour.ron --every 60 --overlay
//!
//! # One search on the default map
//! cargo run -p tilerts_headless -- path --from 0,0 --to 8,3 --blocked 4,0 --blocked 4,1
//! ```

pub mod ascii;
pub mod input;
pub mod runner;
pub mod scenario;

pub use ascii::{render_ascii, render_grid, write_search, AsciiConfig};
pub use input::{apply_click, parse_tile, pick_tile, ClickOutcome};
pub use runner::{
    verify_determinism, DeterminismReport, FrameRecord, OutputFormat, RunConfig, RunSummary,
    ScenarioRunner,
};
pub use scenario::{Click, Scenario, ScenarioError};
