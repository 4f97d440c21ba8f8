//! # Grid
//!
//! The fixed 32x32 array of cell references.

use crate::config::GRID_SIZE;
use crate::{Position, TileId, WarrenError, WarrenResult};
use serde::{Deserialize, Serialize};

/// A square grid of cells, each empty or referencing the tile that occupies it.
///
/// Cell access is O(1). Any coordinate outside `[0, 31]` on either axis is a
/// boundary violation and fails with [`WarrenError::OutOfBounds`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    cells: Vec<Option<TileId>>,
}

impl Grid {
    /// Allocates a grid of empty cells.
    pub fn new() -> Self {
        Self {
            cells: vec![None; (GRID_SIZE * GRID_SIZE) as usize],
        }
    }

    /// Number of columns.
    pub fn width(&self) -> i32 {
        GRID_SIZE
    }

    /// Number of rows.
    pub fn height(&self) -> i32 {
        GRID_SIZE
    }

    fn index(pos: Position) -> WarrenResult<usize> {
        if !pos.in_grid() {
            return Err(WarrenError::OutOfBounds { position: pos });
        }
        Ok((pos.y * GRID_SIZE + pos.x) as usize)
    }

    /// The tile id stored at `pos`.
    pub fn get(&self, pos: Position) -> WarrenResult<Option<TileId>> {
        Ok(self.cells[Self::index(pos)?])
    }

    /// Stores `tile` at `pos`, replacing whatever was there.
    pub fn set(&mut self, pos: Position, tile: Option<TileId>) -> WarrenResult<()> {
        let index = Self::index(pos)?;
        self.cells[index] = tile;
        Ok(())
    }

    /// Whether the cell at `pos` is empty.
    pub fn is_empty_at(&self, pos: Position) -> WarrenResult<bool> {
        Ok(self.get(pos)?.is_none())
    }

    /// Rows of cells from top (y = 0) to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Option<TileId>]> {
        self.cells.chunks(GRID_SIZE as usize)
    }

    /// Every occupied cell with its tile id, row by row.
    pub fn occupied(&self) -> impl Iterator<Item = (Position, TileId)> + '_ {
        self.cells.iter().enumerate().filter_map(|(index, cell)| {
            let index = index as i32;
            cell.map(|id| (Position::new(index % GRID_SIZE, index / GRID_SIZE), id))
        })
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}
