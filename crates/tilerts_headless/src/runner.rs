//! Headless frame loop.
//!
//! Each frame applies the clicks scripted for it, then advances the game
//! by one reference frame. Output goes to any [`Write`], either as ASCII
//! frames or as one JSON object per line.

use std::io::{self, Write};

use serde::Serialize;
use tilerts_core::config::frame_dt;
use tilerts_core::game::{Arrival, GameState, StateSnapshot};

use crate::ascii::{render_ascii, AsciiConfig};
use crate::input::{apply_click, ClickOutcome};
use crate::scenario::{Click, Scenario, ScenarioError};

/// How frames are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable map.
    #[default]
    Ascii,
    /// One [`FrameRecord`] per line.
    Json,
}

/// Run options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    /// Frames to simulate.
    pub frames: u64,
    /// Write every Nth frame; 0 writes only the last one.
    pub every: u64,
    /// Draw the last search in ASCII output.
    pub overlay: bool,
    /// Output format.
    pub format: OutputFormat,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            frames: 600,
            every: 0,
            overlay: false,
            format: OutputFormat::Ascii,
        }
    }
}

/// Everything that happened in one frame.
#[derive(Debug, Clone, Serialize)]
pub struct FrameRecord {
    /// Frames completed, starting at 1.
    pub frame: u64,
    /// Clicks applied before the update.
    pub clicks: Vec<ClickOutcome>,
    /// Steps committed during the update.
    pub arrivals: Vec<Arrival>,
    /// State after the update.
    pub state: StateSnapshot,
}

/// Totals for a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    /// Frames simulated.
    pub frames: u64,
    /// Orders accepted.
    pub issued: usize,
    /// Orders refused by the core.
    pub rejected: usize,
    /// Tiles committed across all units.
    pub arrivals: usize,
    /// State hash after the last frame.
    pub final_hash: u64,
}

/// Drives a [`GameState`] through a scenario's click script.
pub struct ScenarioRunner {
    game: GameState,
    clicks: Vec<Click>,
    next_click: usize,
    frame: u64,
}

impl ScenarioRunner {
    /// Build the scenario's game state and sort its clicks by frame.
    pub fn new(scenario: &Scenario) -> Result<Self, ScenarioError> {
        let game = scenario.build()?;
        let mut clicks = scenario.clicks.clone();
        clicks.sort_by_key(|click| click.frame);
        Ok(Self {
            game,
            clicks,
            next_click: 0,
            frame: 0,
        })
    }

    /// Current game state.
    #[must_use]
    pub fn game(&self) -> &GameState {
        &self.game
    }

    /// Frames completed.
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// Apply due clicks and advance one frame.
    pub fn step(&mut self) -> FrameRecord {
        let mut clicks = Vec::new();
        while let Some(click) = self
            .clicks
            .get(self.next_click)
            .copied()
            .filter(|click| click.frame <= self.frame)
        {
            clicks.push(apply_click(&mut self.game, &click));
            self.next_click += 1;
        }

        let events = self.game.update(frame_dt());
        self.frame += 1;

        FrameRecord {
            frame: self.frame,
            clicks,
            arrivals: events.arrivals,
            state: self.game.snapshot(),
        }
    }

    /// Run `config.frames` frames, writing frames to `out` as configured.
    pub fn run<W: Write>(&mut self, config: &RunConfig, out: &mut W) -> io::Result<RunSummary> {
        let ascii = AsciiConfig {
            overlay: config.overlay,
            show_legend: true,
        };
        let mut summary = RunSummary::default();

        for _ in 0..config.frames {
            let record = self.step();

            for outcome in &record.clicks {
                match outcome {
                    ClickOutcome::Issued { .. } => summary.issued += 1,
                    ClickOutcome::Rejected { .. } => summary.rejected += 1,
                    ClickOutcome::OffMap { .. } => {}
                }
            }
            summary.arrivals += record.arrivals.len();

            let last = record.frame == config.frames;
            let due = config.every > 0 && record.frame % config.every == 0;
            if !(due || last) {
                continue;
            }

            match config.format {
                OutputFormat::Ascii => {
                    writeln!(out, "{}", render_ascii(&self.game, &ascii))?;
                }
                OutputFormat::Json => {
                    serde_json::to_writer(&mut *out, &record)?;
                    writeln!(out)?;
                }
            }
        }

        summary.frames = self.frame;
        summary.final_hash = self.game.state_hash();
        tracing::info!(
            frames = summary.frames,
            issued = summary.issued,
            rejected = summary.rejected,
            arrivals = summary.arrivals,
            "run finished"
        );
        Ok(summary)
    }
}

/// Final hashes from repeated runs of one scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismReport {
    /// Frames per run.
    pub frames: u64,
    /// One hash per run.
    pub hashes: Vec<u64>,
}

impl DeterminismReport {
    /// True when every run ended in the same state.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }
}

/// Run a scenario `runs` times and collect the final state hashes.
pub fn verify_determinism(
    scenario: &Scenario,
    frames: u64,
    runs: u32,
) -> Result<DeterminismReport, ScenarioError> {
    let mut hashes = Vec::with_capacity(runs as usize);
    for run in 0..runs {
        let mut runner = ScenarioRunner::new(scenario)?;
        for _ in 0..frames {
            runner.step();
        }
        let hash = runner.game().state_hash();
        tracing::debug!(run, hash = format_args!("{hash:016x}"), "verification run");
        hashes.push(hash);
    }
    Ok(DeterminismReport { frames, hashes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilerts_core::grid::TilePos;

    #[test]
    fn test_wall_detour_arrives() {
        let scenario = Scenario::wall_detour();
        let mut runner = ScenarioRunner::new(&scenario).unwrap();
        let mut sink = Vec::new();
        let config = RunConfig {
            frames: scenario.frames,
            ..RunConfig::default()
        };

        let summary = runner.run(&config, &mut sink).unwrap();
        assert_eq!(summary.issued, 1);
        assert_eq!(summary.arrivals, 29);
        assert_eq!(runner.game().units()[0].tile(), TilePos::new(17, 7));

        let output = String::from_utf8(sink).unwrap();
        assert_eq!(output.matches("== Tick:").count(), 1);
    }

    #[test]
    fn test_clicks_applied_on_their_frame() {
        let scenario = Scenario {
            clicks: vec![Click {
                frame: 3,
                unit: 1,
                x: 7 * 32,
                y: 5 * 32,
            }],
            ..Scenario::default()
        };
        let mut runner = ScenarioRunner::new(&scenario).unwrap();

        for _ in 0..3 {
            assert!(runner.step().clicks.is_empty());
        }
        let record = runner.step();
        assert_eq!(record.frame, 4);
        assert!(matches!(record.clicks[..], [ClickOutcome::Issued { steps: 2, .. }]));
    }

    #[test]
    fn test_json_lines_output() {
        let mut runner = ScenarioRunner::new(&Scenario::default()).unwrap();
        let config = RunConfig {
            frames: 10,
            every: 5,
            format: OutputFormat::Json,
            ..RunConfig::default()
        };
        let mut sink = Vec::new();
        runner.run(&config, &mut sink).unwrap();

        let output = String::from_utf8(sink).unwrap();
        let lines: Vec<serde_json::Value> = output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["frame"], 5);
        assert_eq!(lines[1]["state"]["tick"], 10);
        assert_eq!(lines[1]["state"]["units"][0]["tile"]["x"], 5);
    }

    #[test]
    fn test_rejected_click_counted() {
        let scenario = Scenario {
            blocked: vec![(0, 0)],
            clicks: vec![Click {
                frame: 0,
                unit: 1,
                x: 1,
                y: 1,
            }],
            ..Scenario::default()
        };
        let mut runner = ScenarioRunner::new(&scenario).unwrap();
        let summary = runner
            .run(&RunConfig { frames: 2, ..RunConfig::default() }, &mut io::sink())
            .unwrap();
        assert_eq!(summary.rejected, 1);
        assert_eq!(summary.arrivals, 0);
    }

    #[test]
    fn test_bundled_scenario_is_deterministic() {
        let scenario = Scenario::from_ron_str(include_str!("../scenarios/crossing.ron")).unwrap();
        let report = verify_determinism(&scenario, scenario.frames, 3).unwrap();
        assert_eq!(report.hashes.len(), 3);
        assert!(report.is_deterministic());
    }
}
