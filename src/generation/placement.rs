//! # Room Placement
//!
//! Rolls the room count and commits non-touching rectangles to the grid.
//!
//! Each room slot draws a width, height and optional alcove, searches for a
//! legal top-left corner, and commits the room when one is found. Any two
//! rooms keep at least one empty cell between them at placement time.

use crate::config::GRID_SIZE;
use crate::{Floor, GenerationConfig, Position, RoomId, WarrenResult};
use log::{debug, warn};
use rand::Rng;

/// Which side of the base rectangle an alcove extends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlcoveSide {
    /// One extra column to the right of the room
    Right,
    /// One extra row below the room
    Below,
}

/// A successful placement search result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Top-left corner of the base rectangle
    pub origin: Position,
    pub width: i32,
    pub height: i32,
    /// Alcove side and length, if the room has one
    pub alcove: Option<(AlcoveSide, i32)>,
}

impl Placement {
    /// Width and height including the cell reserved for the alcove.
    pub fn effective_size(&self) -> (i32, i32) {
        match self.alcove {
            Some((AlcoveSide::Right, _)) => (self.width + 1, self.height),
            Some((AlcoveSide::Below, _)) => (self.width, self.height + 1),
            None => (self.width, self.height),
        }
    }
}

/// Rolls the room count and places as many rooms as fit.
///
/// Returns the number of rooms committed. Slots whose area exceeds the
/// remaining budget, or that fit nowhere on the grid, are skipped.
pub fn place_rooms<R: Rng + ?Sized>(
    floor: &mut Floor,
    config: &GenerationConfig,
    rng: &mut R,
) -> WarrenResult<usize> {
    let room_count = rng.gen_range(config.min_rooms..=config.max_rooms);
    let mut remaining_area = config.area_budget();
    let mut placed = 0;

    for slot in 0..room_count {
        let width = rng.gen_range(config.min_room_size..=config.max_room_size);
        let height = rng.gen_range(config.min_room_size..=config.max_room_size);
        let alcove_size = if rng.gen_bool(config.alcove_chance) {
            rng.gen_range(1..=config.max_alcove_size)
        } else {
            0
        };

        let room_area = i64::from(width * height + alcove_size);
        if room_area > remaining_area {
            debug!(
                "Skipping room slot {} on floor {}: area {} exceeds remaining budget {}",
                slot, floor.floor_number, room_area, remaining_area
            );
            continue;
        }

        match find_placement(floor, width, height, alcove_size, config, rng)? {
            Some(placement) => {
                commit_room(floor, &placement, rng)?;
                remaining_area -= room_area;
                placed += 1;
            }
            None => {
                warn!(
                    "Unable to place room with dimensions ({}, {}) on floor {}",
                    width, height, floor.floor_number
                );
            }
        }
    }

    Ok(placed)
}

/// Searches for a legal top-left corner for a room.
///
/// Tries `config.placement_attempts` random corners against the effective
/// footprint, then scans every corner column by column. Returns `Ok(None)`
/// when the room fits nowhere.
pub fn find_placement<R: Rng + ?Sized>(
    floor: &Floor,
    width: i32,
    height: i32,
    alcove_size: i32,
    config: &GenerationConfig,
    rng: &mut R,
) -> WarrenResult<Option<Placement>> {
    let alcove = (alcove_size > 0).then(|| {
        let side = if rng.gen_bool(0.5) {
            AlcoveSide::Right
        } else {
            AlcoveSide::Below
        };
        (side, alcove_size)
    });
    let mut placement = Placement {
        origin: Position::new(0, 0),
        width,
        height,
        alcove,
    };
    let (effective_width, effective_height) = placement.effective_size();

    for _ in 0..config.placement_attempts {
        let x = rng.gen_range(0..=GRID_SIZE - 1 - effective_width);
        let y = rng.gen_range(0..=GRID_SIZE - 1 - effective_height);
        placement.origin = Position::new(x, y);
        if footprint_is_clear(floor, placement.origin, effective_width, effective_height)? {
            return Ok(Some(placement));
        }
    }

    for x in 0..GRID_SIZE - width {
        for y in 0..GRID_SIZE - height {
            placement.origin = Position::new(x, y);
            if footprint_is_clear(floor, placement.origin, effective_width, effective_height)? {
                return Ok(Some(placement));
            }
        }
    }

    Ok(None)
}

/// Checks whether a `width` x `height` footprint at `origin` may be occupied.
///
/// Every cell must be inside the grid and empty, and every cell on the
/// footprint's border must have only empty in-grid cardinal neighbors.
pub fn footprint_is_clear(
    floor: &Floor,
    origin: Position,
    width: i32,
    height: i32,
) -> WarrenResult<bool> {
    let right = origin.x + width - 1;
    let bottom = origin.y + height - 1;
    if !origin.in_grid() || !Position::new(right, bottom).in_grid() {
        return Ok(false);
    }

    let grid = floor.grid();
    for x in origin.x..=right {
        for y in origin.y..=bottom {
            let pos = Position::new(x, y);
            if !grid.is_empty_at(pos)? {
                return Ok(false);
            }

            let on_border = x == origin.x || y == origin.y || x == right || y == bottom;
            if !on_border {
                continue;
            }
            for neighbor in pos.cardinal_neighbors() {
                if neighbor.in_grid() && !grid.is_empty_at(neighbor)? {
                    return Ok(false);
                }
            }
        }
    }

    Ok(true)
}

/// Commits a placed room: base rectangle first, then alcove cells.
pub fn commit_room<R: Rng + ?Sized>(
    floor: &mut Floor,
    placement: &Placement,
    rng: &mut R,
) -> WarrenResult<RoomId> {
    let Placement {
        origin,
        width,
        height,
        alcove,
    } = *placement;

    let mut cells = Vec::new();
    for x in origin.x..origin.x + width {
        for y in origin.y..origin.y + height {
            cells.push((Position::new(x, y), false));
        }
    }

    match alcove {
        Some((AlcoveSide::Right, size)) => {
            let alcove_x = origin.x + width;
            let alcove_y = rng.gen_range(origin.y..=origin.y + height - size);
            for y in alcove_y..alcove_y + size {
                cells.push((Position::new(alcove_x, y), true));
            }
        }
        Some((AlcoveSide::Below, size)) => {
            let alcove_x = rng.gen_range(origin.x..=origin.x + width - size);
            let alcove_y = origin.y + height;
            for x in alcove_x..alcove_x + size {
                cells.push((Position::new(x, alcove_y), true));
            }
        }
        None => {}
    }

    let room_id = floor.add_room(&cells)?;
    debug!(
        "Placed room {} with size ({}, {}) at ({}, {}) with alcove {:?} on floor {}",
        room_id, width, height, origin.x, origin.y, alcove, floor.floor_number
    );
    Ok(room_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn room_cells(floor: &Floor) -> Vec<(Position, RoomId)> {
        floor
            .rooms()
            .iter()
            .flat_map(|room| room.occupied_tiles().iter().map(move |&pos| (pos, room.id)))
            .collect()
    }

    #[test]
    fn test_footprint_rejects_touching_rooms() -> WarrenResult<()> {
        let mut floor = Floor::new(1);
        let mut rng = StdRng::seed_from_u64(1);
        let placement = Placement {
            origin: Position::new(5, 5),
            width: 3,
            height: 3,
            alcove: None,
        };
        commit_room(&mut floor, &placement, &mut rng)?;

        // Overlapping, touching on the right edge, touching from below
        assert!(!footprint_is_clear(&floor, Position::new(6, 6), 3, 3)?);
        assert!(!footprint_is_clear(&floor, Position::new(8, 5), 2, 2)?);
        assert!(!footprint_is_clear(&floor, Position::new(5, 8), 2, 2)?);
        // One empty column between rooms is enough
        assert!(footprint_is_clear(&floor, Position::new(9, 5), 2, 2)?);
        // Diagonal corner contact is allowed
        assert!(footprint_is_clear(&floor, Position::new(8, 8), 2, 2)?);
        Ok(())
    }

    #[test]
    fn test_footprint_must_stay_in_grid() -> WarrenResult<()> {
        let floor = Floor::new(1);
        assert!(footprint_is_clear(&floor, Position::new(0, 0), 32, 32)?);
        assert!(!footprint_is_clear(&floor, Position::new(30, 0), 3, 2)?);
        assert!(!footprint_is_clear(&floor, Position::new(-1, 0), 2, 2)?);
        Ok(())
    }

    #[test]
    fn test_commit_room_with_alcove() -> WarrenResult<()> {
        let mut floor = Floor::new(1);
        let mut rng = StdRng::seed_from_u64(3);
        let placement = Placement {
            origin: Position::new(2, 2),
            width: 4,
            height: 3,
            alcove: Some((AlcoveSide::Right, 2)),
        };
        let room_id = commit_room(&mut floor, &placement, &mut rng)?;
        let room = floor.room(room_id).unwrap();
        assert_eq!(room.tile_count(), 14);

        let alcoves: Vec<_> = floor.tiles().filter(|tile| tile.is_alcove).collect();
        assert_eq!(alcoves.len(), 2);
        for tile in alcoves {
            assert_eq!(tile.position.x, 6);
            assert!((2..=4).contains(&tile.position.y));
        }
        Ok(())
    }

    #[test]
    fn test_find_placement_scans_column_by_column() -> WarrenResult<()> {
        let mut floor = Floor::new(1);
        let mut rng = StdRng::seed_from_u64(11);
        let blocker = Placement {
            origin: Position::new(0, 0),
            width: 3,
            height: 3,
            alcove: None,
        };
        commit_room(&mut floor, &blocker, &mut rng)?;

        let config = GenerationConfig {
            placement_attempts: 0,
            ..GenerationConfig::new()
        };
        let found = find_placement(&floor, 2, 2, 0, &config, &mut rng)?;
        assert_eq!(found.map(|p| p.origin), Some(Position::new(0, 4)));
        Ok(())
    }

    #[test]
    fn test_find_placement_reports_unsatisfiable() -> WarrenResult<()> {
        let mut floor = Floor::new(1);
        let mut rng = StdRng::seed_from_u64(5);
        let blocker = Placement {
            origin: Position::new(10, 10),
            width: 8,
            height: 8,
            alcove: None,
        };
        commit_room(&mut floor, &blocker, &mut rng)?;

        let config = GenerationConfig::new();
        assert!(find_placement(&floor, 25, 25, 0, &config, &mut rng)?.is_none());
        Ok(())
    }

    #[test]
    fn test_place_rooms_keeps_rooms_apart() -> WarrenResult<()> {
        let config = GenerationConfig::new();
        for seed in 0..10 {
            let mut floor = Floor::new(1);
            let mut rng = StdRng::seed_from_u64(seed);
            let placed = place_rooms(&mut floor, &config, &mut rng)?;
            assert_eq!(placed, floor.rooms().len());
            assert!(placed >= 1);
            assert!(placed <= config.max_rooms as usize);

            let used: i64 = floor.rooms().iter().map(|room| room.tile_count() as i64).sum();
            assert!(used <= config.area_budget());

            for (pos, room_id) in room_cells(&floor) {
                assert_eq!(floor.room_at(pos)?, Some(room_id));
                for neighbor in pos.cardinal_neighbors() {
                    if let Some(other) = floor.room_at(neighbor).ok().flatten() {
                        assert_eq!(other, room_id, "rooms touch at {pos:?}/{neighbor:?}");
                    }
                }
            }
            floor.check_consistency()?;
        }
        Ok(())
    }

    #[test]
    fn test_place_rooms_is_deterministic() -> WarrenResult<()> {
        let config = GenerationConfig::new();
        let mut first = Floor::new(1);
        let mut second = Floor::new(1);
        place_rooms(&mut first, &config, &mut StdRng::seed_from_u64(42))?;
        place_rooms(&mut second, &config, &mut StdRng::seed_from_u64(42))?;
        assert_eq!(first, second);
        Ok(())
    }
}
