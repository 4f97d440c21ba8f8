//! # Floor Module
//!
//! The grid, tile and room model shared by every generation stage.
//!
//! This module contains the fundamental building blocks of a generated floor:
//! - The fixed-size coordinate space and its cell references
//! - Tile records, owned by a room or laid down as corridor connectors
//! - Room records with their occupied coordinates and connection state
//! - The [`Floor`] generation context that keeps all three consistent

pub mod grid;
pub mod room;
pub mod tile;

pub use grid::*;
pub use room::*;
pub use tile::*;

use crate::config::GRID_SIZE;
use crate::{WarrenError, WarrenResult};
use pathfinding::directed::bfs::bfs_reach;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Represents a 2D coordinate on the floor grid.
///
/// # Examples
///
/// ```
/// use warren::Position;
///
/// let pos = Position::new(10, 5);
/// assert_eq!(pos.x, 10);
/// assert_eq!(pos.y, 5);
/// assert_eq!(pos.cardinal_neighbors().len(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Creates a new position with the given coordinates.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Calculates the Manhattan distance to another position.
    ///
    /// # Examples
    ///
    /// ```
    /// use warren::Position;
    ///
    /// let pos1 = Position::new(0, 0);
    /// let pos2 = Position::new(3, 4);
    /// assert_eq!(pos1.manhattan_distance(pos2), 7);
    /// ```
    pub fn manhattan_distance(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Squared Euclidean distance, exact in integers.
    pub fn distance_squared(self, other: Position) -> i64 {
        let dx = i64::from(self.x - other.x);
        let dy = i64::from(self.y - other.y);
        dx * dx + dy * dy
    }

    /// Calculates the Euclidean distance to another position.
    pub fn euclidean_distance(self, other: Position) -> f64 {
        (self.distance_squared(other) as f64).sqrt()
    }

    /// Returns the 4 cardinal neighbors (north, west, east, south), unchecked.
    pub fn cardinal_neighbors(self) -> [Position; 4] {
        [
            Position::new(self.x, self.y - 1),
            Position::new(self.x - 1, self.y),
            Position::new(self.x + 1, self.y),
            Position::new(self.x, self.y + 1),
        ]
    }

    /// Whether this position lies inside the floor grid.
    pub fn in_grid(self) -> bool {
        (0..GRID_SIZE).contains(&self.x) && (0..GRID_SIZE).contains(&self.y)
    }
}

/// The single generation context for one floor.
///
/// Owns the grid, the room registry and the tile registry. Every mutation goes
/// through this type so that a cell, its tile record and the owning room's
/// occupied list never disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Floor {
    /// Floor index this floor was generated for
    pub floor_number: u32,
    grid: Grid,
    rooms: Vec<Room>,
    tiles: Vec<Option<Tile>>,
}

impl Floor {
    /// Creates an empty floor.
    ///
    /// # Examples
    ///
    /// ```
    /// use warren::Floor;
    ///
    /// let floor = Floor::new(3);
    /// assert_eq!(floor.floor_number, 3);
    /// assert!(floor.rooms().is_empty());
    /// assert_eq!(floor.grid().width(), 32);
    /// ```
    pub fn new(floor_number: u32) -> Self {
        Self {
            floor_number,
            grid: Grid::new(),
            rooms: Vec::new(),
            tiles: Vec::new(),
        }
    }

    /// The cell grid.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// All rooms, in creation order.
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Looks up a room by id.
    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(id.index())
    }

    pub(crate) fn room_mut(&mut self, id: RoomId) -> WarrenResult<&mut Room> {
        self.rooms.get_mut(id.index()).ok_or(WarrenError::UnknownRoom(id))
    }

    /// Looks up a live tile by id.
    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(id.index()).and_then(Option::as_ref)
    }

    /// Iterates over every live tile.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter().flatten()
    }

    /// The tile occupying `pos`, if any.
    pub fn tile_at(&self, pos: Position) -> WarrenResult<Option<&Tile>> {
        Ok(self.grid.get(pos)?.and_then(|id| self.tile(id)))
    }

    /// The room owning the tile at `pos`, if any.
    pub fn room_at(&self, pos: Position) -> WarrenResult<Option<RoomId>> {
        Ok(self.tile_at(pos)?.and_then(|tile| tile.room_id))
    }

    /// Commits a new room and one tile per coordinate.
    ///
    /// `cells` pairs each coordinate with its alcove flag. All coordinates must
    /// be inside the grid and currently empty.
    pub(crate) fn add_room(&mut self, cells: &[(Position, bool)]) -> WarrenResult<RoomId> {
        for &(pos, _) in cells {
            if self.grid.get(pos)?.is_some() {
                return Err(WarrenError::CellOccupied { position: pos });
            }
        }

        let room_id = RoomId::new(self.rooms.len());
        let mut occupied = Vec::with_capacity(cells.len());
        for &(pos, is_alcove) in cells {
            let tile_id = TileId::new(self.tiles.len());
            self.grid.set(pos, Some(tile_id))?;
            self.tiles
                .push(Some(Tile::room(tile_id, pos, room_id, is_alcove)));
            occupied.push(pos);
        }

        self.rooms
            .push(Room::new(room_id, self.floor_number, occupied));
        Ok(room_id)
    }

    /// Lays a corridor connector tile on an empty cell.
    pub(crate) fn add_corridor_tile(&mut self, pos: Position) -> WarrenResult<TileId> {
        if self.grid.get(pos)?.is_some() {
            return Err(WarrenError::CellOccupied { position: pos });
        }
        let tile_id = TileId::new(self.tiles.len());
        self.grid.set(pos, Some(tile_id))?;
        self.tiles.push(Some(Tile::connector(tile_id, pos)));
        Ok(tile_id)
    }

    /// Removes the tile at `pos` from `room_id`.
    ///
    /// Clears the cell, deletes the tile record and drops the coordinate from
    /// the room. Returns `false` without touching anything when the cell does
    /// not hold a tile of that room.
    pub(crate) fn remove_room_tile(&mut self, room_id: RoomId, pos: Position) -> WarrenResult<bool> {
        let Some(tile_id) = self.grid.get(pos)? else {
            return Ok(false);
        };
        let owned = self
            .tile(tile_id)
            .is_some_and(|tile| tile.room_id == Some(room_id));
        if !owned {
            return Ok(false);
        }

        self.room_mut(room_id)?.remove_tile(pos);
        self.grid.set(pos, None)?;
        self.tiles[tile_id.index()] = None;
        Ok(true)
    }

    /// Number of live corridor tiles.
    pub fn corridor_tile_count(&self) -> usize {
        self.tiles().filter(|tile| tile.is_connector).count()
    }

    /// Number of live tiles owned by rooms.
    pub fn room_tile_count(&self) -> usize {
        self.tiles().filter(|tile| tile.room_id.is_some()).count()
    }

    /// Whether every room has joined the connected component.
    pub fn all_rooms_connected(&self) -> bool {
        self.rooms.iter().all(|room| room.is_connected)
    }

    /// Every occupied cell reachable from `start` by 4-neighbor steps over occupied cells.
    ///
    /// Returns an empty set when `start` is empty or outside the grid.
    pub fn reachable_from(&self, start: Position) -> HashSet<Position> {
        if !matches!(self.grid.get(start), Ok(Some(_))) {
            return HashSet::new();
        }

        bfs_reach(start, |pos: &Position| {
            pos.cardinal_neighbors()
                .into_iter()
                .filter(|next| matches!(self.grid.get(*next), Ok(Some(_))))
                .collect::<Vec<_>>()
        })
        .collect()
    }

    /// Checks the cross-registry invariants.
    ///
    /// Every occupied cell must map to a live tile at that coordinate, and every
    /// coordinate a room lists must hold one of that room's tiles.
    pub fn check_consistency(&self) -> WarrenResult<()> {
        for (pos, tile_id) in self.grid.occupied() {
            let tile = self.tile(tile_id).ok_or_else(|| {
                WarrenError::Inconsistent(format!(
                    "cell ({}, {}) references a deleted tile",
                    pos.x, pos.y
                ))
            })?;
            if tile.position != pos {
                return Err(WarrenError::Inconsistent(format!(
                    "tile at ({}, {}) records position ({}, {})",
                    pos.x, pos.y, tile.position.x, tile.position.y
                )));
            }
        }

        for room in &self.rooms {
            for &pos in room.occupied_tiles() {
                if self.room_at(pos)? != Some(room.id) {
                    return Err(WarrenError::Inconsistent(format!(
                        "room {} lists ({}, {}) but does not own its tile",
                        room.id, pos.x, pos.y
                    )));
                }
            }
        }

        Ok(())
    }
}
