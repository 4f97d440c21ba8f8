//! # Warren
//!
//! Procedural generation of a single dungeon floor on a fixed 32x32 tile grid.
//!
//! ## Architecture Overview
//!
//! A floor is produced by a three-stage pipeline that mutates one exclusively
//! owned [`Floor`] value:
//!
//! - **Placement**: rolls a room count and commits non-touching rectangles,
//!   some of them with a one or two tile alcove
//! - **Carving**: removes a fraction of the tiles of large rooms using an
//!   L-shape, fixed-block or random-scatter strategy
//! - **Connection**: joins every room into one component with straight
//!   corridors that reroute through any room met along the way
//!
//! All randomness flows through a caller-supplied [`rand::Rng`], so a fixed
//! seed and configuration always reproduce the same floor.
//!
//! ```
//! use warren::{FloorGenerator, GenerationConfig};
//!
//! let generator = FloorGenerator::new(GenerationConfig::default()).unwrap();
//! let floor = generator.generate_with_retries(1, 42, 5).unwrap();
//! assert!(floor.all_rooms_connected());
//! ```

pub mod floor;
pub mod generation;
pub mod rendering;

pub use floor::*;
pub use generation::*;
pub use rendering::*;

/// Core error type for floor generation.
#[derive(thiserror::Error, Debug)]
pub enum WarrenError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// A coordinate outside the grid was accessed
    #[error("Position ({}, {}) is outside the {size}x{size} grid", .position.x, .position.y, size = config::GRID_SIZE)]
    OutOfBounds { position: Position },

    /// A tile was written over an occupied cell
    #[error("Cell ({}, {}) is already occupied", .position.x, .position.y)]
    CellOccupied { position: Position },

    /// Grid, tile and room registries disagree
    #[error("Inconsistent floor state: {0}")]
    Inconsistent(String),

    /// A room id did not resolve to a room on this floor
    #[error("Unknown room {0}")]
    UnknownRoom(RoomId),

    /// Corridor carving was asked to start from a room outside the connected component
    #[error("Room {} is not connected; cannot route a corridor to room {}", .0.origin, .0.target)]
    UnconnectedOrigin(Box<ConnectionDiagnostics>),

    /// Corridor carving kept handing off between rooms without reaching its target
    #[error("Exceeded {} reroutes while connecting room {} to room {}", .0.hops, .0.origin, .0.target)]
    RerouteLimitExceeded(Box<ConnectionDiagnostics>),

    /// A room was still outside the connected component after connection finished
    #[error("Room {0} was left unconnected")]
    DisconnectedRoom(RoomId),

    /// Placement could not put a single room on the floor
    #[error("No rooms could be placed on floor {floor_number}")]
    NoRoomsPlaced { floor_number: u32 },

    /// Configuration values are out of range or inconsistent
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type used throughout the Warren codebase.
pub type WarrenResult<T> = Result<T, WarrenError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Generation constants.
pub mod config {
    /// Edge length of the square floor grid
    pub const GRID_SIZE: i32 = 32;

    /// Number of cells on the floor grid
    pub const GRID_AREA: i32 = GRID_SIZE * GRID_SIZE;

    /// Default inclusive room count range
    pub const DEFAULT_MIN_ROOMS: u32 = 10;
    pub const DEFAULT_MAX_ROOMS: u32 = 18;

    /// Default inclusive room edge length range
    pub const DEFAULT_MIN_ROOM_SIZE: i32 = 2;
    pub const DEFAULT_MAX_ROOM_SIZE: i32 = 8;

    /// Random top-left candidates tried before the exhaustive scan
    pub const DEFAULT_PLACEMENT_ATTEMPTS: u32 = 25;

    /// Rooms with at least this many tiles are eligible for carving
    pub const DEFAULT_CARVE_THRESHOLD: usize = 20;

    /// Rooms below this tile count only ever use the L-shape strategy
    pub const DEFAULT_SMALL_ROOM_THRESHOLD: usize = 31;

    /// Fixed-block carving uses a 3x3 block below this tile count, 4x4 otherwise
    pub const DEFAULT_FIXED_BLOCK_SMALL_THRESHOLD: usize = 16;
}
