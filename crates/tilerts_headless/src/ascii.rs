//! ASCII map renderer.
//!
//! One character per tile: `.` open, `#` blocked, `@` unit. With the
//! search overlay on, tiles from the last A* run show as `o` (opened),
//! `x` (closed) and `*` (on the path).

use std::fmt::Write;
use std::io;

use tilerts_core::error::PathError;
use tilerts_core::game::GameState;
use tilerts_core::grid::{Grid, TilePos};
use tilerts_core::pathfinding::{Path, SearchTrace};

/// ASCII rendering options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AsciiConfig {
    /// Draw the last search on top of the terrain.
    pub overlay: bool,
    /// Print a symbol key under the map.
    pub show_legend: bool,
}

impl Default for AsciiConfig {
    fn default() -> Self {
        Self {
            overlay: false,
            show_legend: true,
        }
    }
}

fn tile_char(grid: &Grid, tile: TilePos, units: &[TilePos], trace: Option<&SearchTrace>) -> char {
    if units.contains(&tile) {
        return '@';
    }
    if !grid.is_walkable(tile) {
        return '#';
    }
    match trace {
        Some(trace) if trace.is_in_path(tile) => '*',
        Some(trace) if trace.is_closed(tile) => 'x',
        Some(trace) if trace.is_opened(tile) => 'o',
        _ => '.',
    }
}

/// Render the map rows only.
#[must_use]
pub fn render_grid(grid: &Grid, units: &[TilePos], trace: Option<&SearchTrace>) -> String {
    let mut output = String::with_capacity(grid.cell_count() + grid.height() as usize);
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            output.push(tile_char(grid, TilePos::new(x, y), units, trace));
        }
        output.push('\n');
    }
    output
}

/// Write one traced search: the overlaid map, then a summary line.
pub fn write_search<W: io::Write>(
    out: &mut W,
    grid: &Grid,
    from: TilePos,
    to: TilePos,
    result: &Result<Path, PathError>,
    trace: &SearchTrace,
) -> io::Result<()> {
    out.write_all(render_grid(grid, &[], Some(trace)).as_bytes())?;
    match result {
        Ok(path) => writeln!(
            out,
            "path {} -> {}: {} tiles, {} nodes expanded",
            from,
            to,
            path.len(),
            trace.expanded()
        ),
        Err(e) => writeln!(out, "no path: {} ({} nodes expanded)", e, trace.expanded()),
    }
}

/// Render a full frame: header, map and optional legend.
#[must_use]
pub fn render_ascii(game: &GameState, config: &AsciiConfig) -> String {
    let units: Vec<TilePos> = game.units().iter().map(|u| u.tile()).collect();
    let trace = config.overlay.then(|| game.last_search());

    let mut output = String::new();
    let _ = writeln!(
        output,
        "== Tick: {} | Time: {:.2}s ==",
        game.tick(),
        game.time().to_num::<f64>()
    );
    output.push_str(&render_grid(game.grid(), &units, trace));

    for unit in game.units() {
        let _ = writeln!(
            output,
            "unit {} at {} -> {} ({} steps left{})",
            unit.id(),
            unit.tile(),
            unit.target(),
            unit.queue().remaining().len(),
            if unit.is_moving() { ", moving" } else { "" }
        );
    }

    if config.show_legend {
        output.push_str(if config.overlay {
            ". open  # blocked  @ unit  o opened  x closed  * path\n"
        } else {
            ". open  # blocked  @ unit\n"
        });
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilerts_core::pathfinding::find_path_traced;

    #[test]
    fn test_render_grid_symbols() {
        let mut grid = Grid::new(4, 2, 32);
        grid.set_walkable(TilePos::new(2, 0), false);
        let rendered = render_grid(&grid, &[TilePos::new(0, 1)], None);
        assert_eq!(rendered, "..#.\n@...\n");
    }

    #[test]
    fn test_overlay_marks_path() {
        let grid = Grid::new(4, 1, 32);
        let mut trace = SearchTrace::new(&grid);
        find_path_traced(&grid, TilePos::new(0, 0), TilePos::new(2, 0), &mut trace).unwrap();

        let rendered = render_grid(&grid, &[], Some(&trace));
        assert_eq!(rendered, "***.\n");
    }

    struct ClosedPipe;

    impl io::Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_search_report() {
        let grid = Grid::new(4, 1, 32);
        let mut trace = SearchTrace::new(&grid);
        let (from, to) = (TilePos::new(0, 0), TilePos::new(2, 0));
        let result = find_path_traced(&grid, from, to, &mut trace);

        let mut out = Vec::new();
        write_search(&mut out, &grid, from, to, &result, &trace).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("***."));
        assert!(lines.next().unwrap().starts_with("path (0, 0) -> (2, 0): 3 tiles"));
    }

    #[test]
    fn test_write_search_propagates_write_errors() {
        let mut grid = Grid::new(3, 1, 32);
        grid.set_walkable(TilePos::new(1, 0), false);
        let mut trace = SearchTrace::new(&grid);
        let (from, to) = (TilePos::new(0, 0), TilePos::new(2, 0));
        let result = find_path_traced(&grid, from, to, &mut trace);
        assert!(result.is_err());

        let err = write_search(&mut ClosedPipe, &grid, from, to, &result, &trace).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_render_ascii_frame() {
        let mut game = GameState::default();
        let id = game.spawn_unit(TilePos::new(1, 1)).unwrap();
        game.issue_move(id, TilePos::new(3, 1)).unwrap();

        let frame = render_ascii(&game, &AsciiConfig::default());
        let lines: Vec<&str> = frame.lines().collect();
        assert_eq!(lines[0], "== Tick: 0 | Time: 0.00s ==");
        assert_eq!(lines[2], ".@..................");
        assert_eq!(lines[16], "unit 1 at (1, 1) -> (1, 1) (2 steps left)");
        assert_eq!(lines.last(), Some(&". open  # blocked  @ unit"));
    }

    #[test]
    fn test_overlay_shows_last_search() {
        let mut game = GameState::default();
        let id = game.spawn_unit(TilePos::new(0, 0)).unwrap();
        game.issue_move(id, TilePos::new(2, 0)).unwrap();

        let config = AsciiConfig {
            overlay: true,
            show_legend: false,
        };
        let frame = render_ascii(&game, &config);
        assert!(frame.lines().nth(1).unwrap().starts_with("@**"));
    }
}
