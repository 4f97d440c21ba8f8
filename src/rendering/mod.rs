//! # Rendering Module
//!
//! Plain-text rendering of a generated floor for debugging and the CLI.
//!
//! Each cell becomes a two-character glyph so the 32x32 grid prints roughly
//! square in a terminal. Rows run from `y = 0` at the top.

use crate::{Floor, Tile};
use std::fmt;

/// Glyph for a corridor connector tile.
pub const CORRIDOR_GLYPH: &str = "O ";
/// Glyph for a tile owned by a room.
pub const ROOM_GLYPH: &str = "X ";
/// Glyph for an empty cell.
pub const EMPTY_GLYPH: &str = "- ";

/// Gets the display glyph for the contents of a cell.
pub fn cell_glyph(tile: Option<&Tile>) -> &'static str {
    match tile {
        Some(tile) if tile.room_id.is_some() => ROOM_GLYPH,
        Some(_) => CORRIDOR_GLYPH,
        None => EMPTY_GLYPH,
    }
}

/// Renders the floor one grid row per line.
///
/// # Examples
///
/// ```
/// use warren::{debug_dump, Floor};
///
/// let dump = debug_dump(&Floor::new(1));
/// assert_eq!(dump.lines().count(), 32);
/// assert!(dump.lines().all(|line| line == "- ".repeat(32)));
/// ```
pub fn debug_dump(floor: &Floor) -> String {
    let grid = floor.grid();
    let mut out = String::with_capacity((grid.width() as usize * 2 + 1) * grid.height() as usize);
    for row in grid.rows() {
        for &cell in row {
            out.push_str(cell_glyph(cell.and_then(|id| floor.tile(id))));
        }
        out.push('\n');
    }
    out
}

impl fmt::Display for Floor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&debug_dump(self))
    }
}
