//! # Tiles
//!
//! Tile records stored in the floor's tile registry.

use crate::{Position, RoomId};
use serde::{Deserialize, Serialize};

/// Arena index of a tile in its floor's registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(u32);

impl TileId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    /// Position of this tile in the registry.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Movement capabilities of a tile.
///
/// Reserved for traversal rules layered on top of a generated floor; the
/// generator leaves every flag unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementFlags {
    pub north: bool,
    pub south: bool,
    pub east: bool,
    pub west: bool,
    pub up: bool,
    pub down: bool,
}

/// A single occupied cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Unique identifier for this tile
    pub id: TileId,
    /// Cell this tile occupies
    pub position: Position,
    /// Owning room; `None` for corridor tiles
    pub room_id: Option<RoomId>,
    /// Whether the tile is part of a room's alcove
    pub is_alcove: bool,
    /// Whether the tile is a corridor connector belonging to no room
    pub is_connector: bool,
    /// Movement capabilities
    pub movement: MovementFlags,
}

impl Tile {
    /// Creates a tile owned by a room.
    pub fn room(id: TileId, position: Position, room_id: RoomId, is_alcove: bool) -> Self {
        Self {
            id,
            position,
            room_id: Some(room_id),
            is_alcove,
            is_connector: false,
            movement: MovementFlags::default(),
        }
    }

    /// Creates a corridor connector tile.
    pub fn connector(id: TileId, position: Position) -> Self {
        Self {
            id,
            position,
            room_id: None,
            is_alcove: false,
            is_connector: true,
            movement: MovementFlags::default(),
        }
    }
}
