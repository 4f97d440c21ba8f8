//! # Room Carving
//!
//! Breaks up large rectangular rooms by deleting a share of their tiles.
//!
//! Every room with at least `carve_threshold` tiles is either marked
//! expansive and left whole, or carved once with one of three strategies:
//!
//! 1. **L-shape**: cut a square block out of one corner
//! 2. **Fixed block**: cut a 3x3 or 4x4 block near a corner
//! 3. **Scatter**: delete random interior tiles, then sweep away any tile
//!    left with no occupied neighbor
//!
//! Alcove tiles are always stripped first so strategies work on a plain
//! rectangle.

use crate::config::GRID_SIZE;
use crate::{
    Bounds, Floor, GenerationConfig, IsolatedSweep, Position, RoomId, WarrenError, WarrenResult,
};
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Tile-removal strategy applied to a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CarveStrategy {
    LShape,
    FixedBlock,
    Scatter,
}

/// Summary of one carved room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarveReport {
    pub room_id: RoomId,
    pub strategy: CarveStrategy,
    /// Tile count before carving
    pub original_tiles: usize,
    /// Tiles the carve percentage asked for, before alcove stripping
    pub requested: usize,
    /// Alcove tiles stripped
    pub alcoves_removed: usize,
    /// Tiles removed by the strategy itself
    pub strategy_removed: usize,
    /// Tiles removed by the isolated-tile sweep
    pub isolated_removed: usize,
}

impl CarveReport {
    /// Every tile the room lost.
    pub fn total_removed(&self) -> usize {
        self.alcoves_removed + self.strategy_removed + self.isolated_removed
    }
}

/// Carves or marks expansive every room at or above the carve threshold.
///
/// Rooms are visited in creation order. Returns a report for each carved room.
pub fn carve_rooms<R: Rng + ?Sized>(
    floor: &mut Floor,
    config: &GenerationConfig,
    rng: &mut R,
) -> WarrenResult<Vec<CarveReport>> {
    let room_ids: Vec<RoomId> = floor.rooms().iter().map(|room| room.id).collect();
    let mut reports = Vec::new();

    for room_id in room_ids {
        let tile_count = floor
            .room(room_id)
            .map(|room| room.tile_count())
            .unwrap_or_default();
        if tile_count < config.carve_threshold {
            continue;
        }

        if rng.gen_bool(config.expansive_chance) {
            floor.room_mut(room_id)?.set_expansive(true);
            debug!("Room {} ({} tiles) left expansive", room_id, tile_count);
            continue;
        }

        reports.push(carve_room(floor, room_id, config, rng)?);
    }

    Ok(reports)
}

/// Carves one room, choosing the strategy at random.
pub fn carve_room<R: Rng + ?Sized>(
    floor: &mut Floor,
    room_id: RoomId,
    config: &GenerationConfig,
    rng: &mut R,
) -> WarrenResult<CarveReport> {
    carve_room_with(floor, room_id, None, config, rng)
}

/// Carves one room with the given strategy, or a random one when `None`.
///
/// Rooms below `small_room_threshold` tiles always use the L-shape strategy.
pub fn carve_room_with<R: Rng + ?Sized>(
    floor: &mut Floor,
    room_id: RoomId,
    strategy: Option<CarveStrategy>,
    config: &GenerationConfig,
    rng: &mut R,
) -> WarrenResult<CarveReport> {
    let original_tiles = floor
        .room(room_id)
        .ok_or(WarrenError::UnknownRoom(room_id))?
        .tile_count();

    let percent = rng.gen_range(config.min_carve_percent..=config.max_carve_percent) as usize;
    let requested = (original_tiles * percent).div_ceil(100);
    let alcoves_removed = strip_alcoves(floor, room_id)?;
    let tiles_to_remove = requested as i64 - alcoves_removed as i64;

    let mut report = CarveReport {
        room_id,
        strategy: CarveStrategy::LShape,
        original_tiles,
        requested,
        alcoves_removed,
        strategy_removed: 0,
        isolated_removed: 0,
    };

    let room = floor.room(room_id).ok_or(WarrenError::UnknownRoom(room_id))?;
    let Some(bounds) = room.bounds() else {
        return Ok(report);
    };
    let tile_count = room.tile_count();

    let selector = rng.gen_range(0..=98);
    let chosen = if tile_count < config.small_room_threshold {
        CarveStrategy::LShape
    } else if let Some(strategy) = strategy {
        strategy
    } else if selector < 33 {
        CarveStrategy::LShape
    } else if selector < 66 {
        CarveStrategy::FixedBlock
    } else {
        CarveStrategy::Scatter
    };
    report.strategy = chosen;

    match chosen {
        CarveStrategy::LShape => {
            report.strategy_removed = carve_l_shape(floor, room_id, bounds, tiles_to_remove, rng)?;
        }
        CarveStrategy::FixedBlock => {
            let edge = if tile_count < config.fixed_block_small_threshold { 3 } else { 4 };
            report.strategy_removed = carve_fixed_block(floor, room_id, bounds, edge, rng)?;
        }
        CarveStrategy::Scatter => {
            report.strategy_removed = carve_scatter(floor, room_id, bounds, tiles_to_remove, rng)?;
            report.isolated_removed = sweep_isolated(floor, room_id, config.isolated_sweep)?;
        }
    }

    debug!(
        "Carved room {} with {:?}: {} of {} tiles removed",
        room_id,
        chosen,
        report.total_removed(),
        original_tiles
    );
    Ok(report)
}

fn strip_alcoves(floor: &mut Floor, room_id: RoomId) -> WarrenResult<usize> {
    let mut alcoves = Vec::new();
    for tile in floor.tiles() {
        if tile.is_alcove && tile.room_id == Some(room_id) {
            alcoves.push(tile.position);
        }
    }

    let mut removed = 0;
    for pos in alcoves {
        if floor.remove_room_tile(room_id, pos)? {
            removed += 1;
        }
    }
    Ok(removed)
}

/// Cuts a square block with edge `floor(sqrt(n))` from the top-left or
/// bottom-right corner, plus a partial strip for the non-square remainder.
fn carve_l_shape<R: Rng + ?Sized>(
    floor: &mut Floor,
    room_id: RoomId,
    bounds: Bounds,
    tiles_to_remove: i64,
    rng: &mut R,
) -> WarrenResult<usize> {
    if tiles_to_remove <= 0 {
        return Ok(0);
    }

    let root = (tiles_to_remove as f64).sqrt();
    let edge = root.floor() as i32;
    let remainder = (root % f64::from(edge)).ceil() as i32;
    let reverse = rng.gen_bool(0.5);

    let (corner_x, corner_y, step) = if reverse {
        (bounds.max_x, bounds.max_y, -1)
    } else {
        (bounds.min_x, bounds.min_y, 1)
    };
    let at = |major: i32, minor: i32, wide: bool| {
        if wide {
            Position::new(corner_x + major * step, corner_y + minor * step)
        } else {
            Position::new(corner_x + minor * step, corner_y + major * step)
        }
    };

    // Wide rooms are cut column by column, tall rooms row by row
    let wide = bounds.max_x - bounds.min_x > bounds.max_y - bounds.min_y;
    let mut removed = 0;
    for major in 0..edge {
        for minor in 0..edge {
            let pos = at(major, minor, wide);
            if pos.in_grid() && floor.remove_room_tile(room_id, pos)? {
                removed += 1;
            }
        }
    }
    for minor in 0..remainder {
        let pos = at(edge, minor, wide);
        if pos.in_grid() && floor.remove_room_tile(room_id, pos)? {
            removed += 1;
        }
    }

    Ok(removed)
}

/// Cuts an `edge` x `edge` block anchored at a random bounding-box corner.
///
/// The block may shift one cell inward along an axis, but only when the room
/// has slack on both axes so the cut never spans a full row or column.
fn carve_fixed_block<R: Rng + ?Sized>(
    floor: &mut Floor,
    room_id: RoomId,
    bounds: Bounds,
    edge: i32,
    rng: &mut R,
) -> WarrenResult<usize> {
    let slack_x = bounds.width() - edge;
    let slack_y = bounds.height() - edge;
    if slack_x < 0 || slack_y < 0 {
        return Ok(0);
    }

    let from_right = rng.gen_bool(0.5);
    let from_bottom = rng.gen_bool(0.5);
    let mut start_x = if from_right { bounds.max_x + 1 - edge } else { bounds.min_x };
    let mut start_y = if from_bottom { bounds.max_y + 1 - edge } else { bounds.min_y };

    if slack_x >= 1 && slack_y >= 1 {
        let inward_x = rng.gen_range(0..=1);
        let inward_y = rng.gen_range(0..=1);
        start_x += if from_right { -inward_x } else { inward_x };
        start_y += if from_bottom { -inward_y } else { inward_y };
    }

    let mut removed = 0;
    for x in start_x..start_x + edge {
        for y in start_y..start_y + edge {
            if floor.remove_room_tile(room_id, Position::new(x, y))? {
                removed += 1;
            }
        }
    }
    Ok(removed)
}

/// Deletes uniformly chosen non-border tiles until `tiles_to_remove` is spent.
fn carve_scatter<R: Rng + ?Sized>(
    floor: &mut Floor,
    room_id: RoomId,
    bounds: Bounds,
    tiles_to_remove: i64,
    rng: &mut R,
) -> WarrenResult<usize> {
    let mut remaining = tiles_to_remove;
    let mut removed = 0;

    while remaining > 0 {
        let interior: Vec<Position> = floor
            .room(room_id)
            .ok_or(WarrenError::UnknownRoom(room_id))?
            .occupied_tiles()
            .iter()
            .copied()
            .filter(|&pos| !bounds.is_border(pos))
            .collect();
        if interior.is_empty() {
            break;
        }

        let pos = interior[rng.gen_range(0..interior.len())];
        if floor.remove_room_tile(room_id, pos)? {
            removed += 1;
        }
        remaining -= 1;
    }

    Ok(removed)
}

/// Removes room tiles whose cardinal neighbors are all empty.
fn sweep_isolated(floor: &mut Floor, room_id: RoomId, rule: IsolatedSweep) -> WarrenResult<usize> {
    let tiles = floor
        .room(room_id)
        .ok_or(WarrenError::UnknownRoom(room_id))?
        .occupied_tiles()
        .to_vec();

    let mut removed = 0;
    for pos in tiles {
        if is_isolated(floor, pos, rule)? && floor.remove_room_tile(room_id, pos)? {
            removed += 1;
        }
    }
    Ok(removed)
}

fn is_isolated(floor: &Floor, pos: Position, rule: IsolatedSweep) -> WarrenResult<bool> {
    let grid = floor.grid();
    match rule {
        IsolatedSweep::InGrid => {
            for neighbor in pos.cardinal_neighbors() {
                if neighbor.in_grid() && !grid.is_empty_at(neighbor)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        IsolatedSweep::Legacy => {
            let empty_or_past_edge = |neighbor: Position| -> WarrenResult<bool> {
                if neighbor.x == GRID_SIZE || neighbor.y == GRID_SIZE {
                    return Ok(true);
                }
                grid.is_empty_at(neighbor)
            };
            Ok(pos.x - 1 > 0
                && pos.y - 1 > 0
                && empty_or_past_edge(Position::new(pos.x + 1, pos.y))?
                && grid.is_empty_at(Position::new(pos.x - 1, pos.y))?
                && empty_or_past_edge(Position::new(pos.x, pos.y + 1))?
                && grid.is_empty_at(Position::new(pos.x, pos.y - 1))?)
        }
    }
}
