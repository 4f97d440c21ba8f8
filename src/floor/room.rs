//! # Rooms
//!
//! Room records and their bounding boxes.

use crate::Position;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Arena index of a room; rooms are numbered in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoomId(u32);

impl RoomId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    /// Position of this room in the registry.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A room placed on a floor.
///
/// Rooms are created with their full tile set and only ever shrink afterwards.
/// A room is never deleted once placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Unique identifier for this room
    pub id: RoomId,
    /// Floor this room was generated on
    pub floor_number: u32,
    occupied_tiles: Vec<Position>,
    /// Whether the room belongs to the component rooted at the first room
    pub is_connected: bool,
    /// Whether the room was exempted from carving
    pub is_expansive: bool,
}

impl Room {
    /// Creates a new room owning the given coordinates.
    pub fn new(id: RoomId, floor_number: u32, occupied_tiles: Vec<Position>) -> Self {
        Self {
            id,
            floor_number,
            occupied_tiles,
            is_connected: false,
            is_expansive: false,
        }
    }

    /// Coordinates of every tile this room owns, in creation order.
    pub fn occupied_tiles(&self) -> &[Position] {
        &self.occupied_tiles
    }

    /// Number of tiles this room owns.
    pub fn tile_count(&self) -> usize {
        self.occupied_tiles.len()
    }

    /// Checks if this room owns the tile at `pos`.
    pub fn contains(&self, pos: Position) -> bool {
        self.occupied_tiles.contains(&pos)
    }

    pub(crate) fn remove_tile(&mut self, pos: Position) -> bool {
        match self.occupied_tiles.iter().position(|&tile| tile == pos) {
            Some(index) => {
                self.occupied_tiles.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.is_connected = connected;
    }

    pub fn set_expansive(&mut self, expansive: bool) {
        self.is_expansive = expansive;
    }

    /// Axis-aligned bounding box of the current tile set.
    pub fn bounds(&self) -> Option<Bounds> {
        let first = *self.occupied_tiles.first()?;
        let mut bounds = Bounds {
            min_x: first.x,
            max_x: first.x,
            min_y: first.y,
            max_y: first.y,
        };
        for pos in &self.occupied_tiles[1..] {
            bounds.min_x = bounds.min_x.min(pos.x);
            bounds.max_x = bounds.max_x.max(pos.x);
            bounds.min_y = bounds.min_y.min(pos.y);
            bounds.max_y = bounds.max_y.max(pos.y);
        }
        Some(bounds)
    }
}

/// Inclusive bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
}

impl Bounds {
    pub fn width(&self) -> i32 {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> i32 {
        self.max_y - self.min_y + 1
    }

    /// Checks if a position lies on the outer edge of the box.
    pub fn is_border(&self, pos: Position) -> bool {
        pos.x == self.min_x || pos.x == self.max_x || pos.y == self.min_y || pos.y == self.max_y
    }
}
