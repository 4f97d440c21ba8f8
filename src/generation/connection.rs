//! # Corridor Connection
//!
//! Joins every room into one component rooted at the first room.
//!
//! Each connection finds the nearest pair of tiles between a connected
//! origin room and a target room, then walks an L-shaped corridor: along the
//! x-axis at the start row, then along the y-axis at the end column. Running
//! into another room hands the connection off to that room, which becomes the
//! new origin. Hand-offs are bounded by the room count.

use crate::rendering::debug_dump;
use crate::{Floor, GenerationConfig, Position, RoomId, VerticalReroute, WarrenError, WarrenResult};
use log::{debug, error, trace};

/// State captured when a connection attempt fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionDiagnostics {
    /// Room the failing connection started from
    pub origin: RoomId,
    /// Room the connection was trying to reach
    pub target: RoomId,
    /// Hand-offs taken before failing
    pub hops: usize,
    /// Start and end tiles of every corridor attempted, in order
    pub paths: Vec<(Position, Position)>,
    /// Text rendering of the floor at the point of failure
    pub dump: String,
}

enum SweepOutcome {
    /// Reached the end tile without meeting another room
    Finished,
    /// Handed off to a room met along the way
    Reroute(RoomId),
}

enum CellVisit {
    OwnRoom,
    Foreign(RoomId),
    Passable,
}

/// Marks the first room connected and connects each room to its predecessor.
pub fn connect_all_rooms(floor: &mut Floor, config: &GenerationConfig) -> WarrenResult<()> {
    let room_count = floor.rooms().len();
    if room_count == 0 {
        return Ok(());
    }

    floor.room_mut(RoomId::new(0))?.set_connected(true);
    for index in 1..room_count {
        connect(floor, RoomId::new(index - 1), RoomId::new(index), config)?;
    }

    debug!(
        "Connected {} rooms on floor {} with {} corridor tiles",
        room_count,
        floor.floor_number,
        floor.corridor_tile_count()
    );
    Ok(())
}

/// Connects `target` to the component containing `origin`.
///
/// Does nothing when both ids name the same room or `target` is already
/// connected. `origin` must already be connected.
pub fn connect(
    floor: &mut Floor,
    origin: RoomId,
    target: RoomId,
    config: &GenerationConfig,
) -> WarrenResult<()> {
    let hop_limit = floor.rooms().len();
    let mut current = origin;
    let mut hops = 0;
    let mut paths = Vec::new();

    loop {
        if current == target {
            return Ok(());
        }

        let current_room = floor.room(current).ok_or(WarrenError::UnknownRoom(current))?;
        if !current_room.is_connected {
            let diagnostics = diagnostics(floor, current, target, hops, paths);
            error!(
                "Room {} is not connected; attempted corridors {:?}\n{}",
                current, diagnostics.paths, diagnostics.dump
            );
            return Err(WarrenError::UnconnectedOrigin(Box::new(diagnostics)));
        }

        let target_room = floor.room(target).ok_or(WarrenError::UnknownRoom(target))?;
        if target_room.is_connected {
            return Ok(());
        }

        let (start, end) = nearest_tiles(floor, current, target)?.ok_or_else(|| {
            WarrenError::Inconsistent(format!("room {current} or {target} has no tiles left"))
        })?;
        paths.push((start, end));

        match sweep(floor, current, start, end, config.vertical_reroute)? {
            SweepOutcome::Finished => return Ok(()),
            SweepOutcome::Reroute(next) => {
                hops += 1;
                if hops > hop_limit {
                    let diagnostics = diagnostics(floor, origin, target, hops, paths);
                    error!(
                        "Gave up connecting room {} to room {} after {} reroutes\n{}",
                        origin, target, hops, diagnostics.dump
                    );
                    return Err(WarrenError::RerouteLimitExceeded(Box::new(diagnostics)));
                }
                trace!("Rerouting connection to room {} through room {}", target, next);
                current = next;
            }
        }
    }
}

/// Closest pair of tiles between two rooms, first pair wins on ties.
///
/// Returns `None` when either room has no tiles.
pub fn nearest_tiles(
    floor: &Floor,
    from: RoomId,
    to: RoomId,
) -> WarrenResult<Option<(Position, Position)>> {
    let from_room = floor.room(from).ok_or(WarrenError::UnknownRoom(from))?;
    let to_room = floor.room(to).ok_or(WarrenError::UnknownRoom(to))?;

    let mut best: Option<(i64, Position, Position)> = None;
    for &a in from_room.occupied_tiles() {
        for &b in to_room.occupied_tiles() {
            let distance = a.distance_squared(b);
            if best.map_or(true, |(shortest, _, _)| distance < shortest) {
                best = Some((distance, a, b));
            }
        }
    }

    Ok(best.map(|(_, a, b)| (a, b)))
}

fn sweep(
    floor: &mut Floor,
    current: RoomId,
    start: Position,
    end: Position,
    vertical_reroute: VerticalReroute,
) -> WarrenResult<SweepOutcome> {
    let step = if start.x < end.x { 1 } else { -1 };
    let mut x = start.x;
    while x != end.x {
        x += step;
        let cell = Position::new(x, start.y);
        match visit_cell(floor, current, cell)? {
            CellVisit::OwnRoom => continue,
            CellVisit::Foreign(room) => return Ok(SweepOutcome::Reroute(room)),
            CellVisit::Passable => {}
        }

        for neighbor in [Position::new(x, start.y - 1), Position::new(x, start.y + 1)] {
            if let Some(room) = bordering_room(floor, current, neighbor)? {
                if cell.distance_squared(end) > neighbor.distance_squared(end) {
                    return Ok(SweepOutcome::Reroute(room));
                }
            }
        }
    }

    let step = if start.y < end.y { 1 } else { -1 };
    let mut y = start.y;
    while y != end.y {
        y += step;
        let cell = Position::new(end.x, y);
        match visit_cell(floor, current, cell)? {
            CellVisit::OwnRoom => continue,
            CellVisit::Foreign(room) => return Ok(SweepOutcome::Reroute(room)),
            CellVisit::Passable => {}
        }

        for neighbor in [Position::new(end.x - 1, y), Position::new(end.x + 1, y)] {
            if let Some(room) = bordering_room(floor, current, neighbor)? {
                if vertical_reroute == VerticalReroute::Always {
                    return Ok(SweepOutcome::Reroute(room));
                }
            }
        }
    }

    Ok(SweepOutcome::Finished)
}

/// Steps onto a corridor cell, laying a connector if it is empty.
///
/// Another room's tile is marked connected and reported.
fn visit_cell(floor: &mut Floor, current: RoomId, cell: Position) -> WarrenResult<CellVisit> {
    match floor.tile_at(cell)?.map(|tile| tile.room_id) {
        None => {
            floor.add_corridor_tile(cell)?;
            Ok(CellVisit::Passable)
        }
        Some(None) => Ok(CellVisit::Passable),
        Some(Some(room)) if room == current => Ok(CellVisit::OwnRoom),
        Some(Some(room)) => {
            floor.room_mut(room)?.set_connected(true);
            Ok(CellVisit::Foreign(room))
        }
    }
}

/// Marks and returns the room beside the corridor at `neighbor`, if it is
/// not the current room.
fn bordering_room(
    floor: &mut Floor,
    current: RoomId,
    neighbor: Position,
) -> WarrenResult<Option<RoomId>> {
    if !neighbor.in_grid() {
        return Ok(None);
    }
    match floor.room_at(neighbor)? {
        Some(room) if room != current => {
            floor.room_mut(room)?.set_connected(true);
            Ok(Some(room))
        }
        _ => Ok(None),
    }
}

fn diagnostics(
    floor: &Floor,
    origin: RoomId,
    target: RoomId,
    hops: usize,
    paths: Vec<(Position, Position)>,
) -> ConnectionDiagnostics {
    ConnectionDiagnostics {
        origin,
        target,
        hops,
        paths,
        dump: debug_dump(floor),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(floor: &mut Floor, x: i32, y: i32, size: i32) -> RoomId {
        let mut cells = Vec::new();
        for cx in x..x + size {
            for cy in y..y + size {
                cells.push((Position::new(cx, cy), false));
            }
        }
        floor.add_room(&cells).unwrap()
    }

    fn config(vertical_reroute: VerticalReroute) -> GenerationConfig {
        GenerationConfig {
            vertical_reroute,
            ..GenerationConfig::new()
        }
    }

    #[test]
    fn test_opposite_corners_get_an_l_corridor() -> WarrenResult<()> {
        let mut floor = Floor::new(1);
        let first = square(&mut floor, 0, 0, 2);
        let second = square(&mut floor, 30, 30, 2);

        assert_eq!(
            nearest_tiles(&floor, first, second)?,
            Some((Position::new(1, 1), Position::new(30, 30)))
        );
        connect_all_rooms(&mut floor, &GenerationConfig::new())?;

        // Every cell strictly between the two nearest tiles
        let manhattan = Position::new(1, 1).manhattan_distance(Position::new(30, 30));
        assert_eq!(floor.corridor_tile_count(), manhattan as usize - 1);
        assert!(floor.tile_at(Position::new(30, 1))?.unwrap().is_connector);
        assert!(floor.tile_at(Position::new(30, 29))?.unwrap().is_connector);
        assert!(floor.all_rooms_connected());
        assert_eq!(floor.reachable_from(Position::new(0, 0)).len(), 8 + 57);
        floor.check_consistency()
    }

    #[test]
    fn test_nearest_tiles_keeps_first_tie() -> WarrenResult<()> {
        let mut floor = Floor::new(1);
        let first = square(&mut floor, 0, 10, 2);
        let second = square(&mut floor, 20, 10, 2);
        assert_eq!(
            nearest_tiles(&floor, first, second)?,
            Some((Position::new(1, 10), Position::new(20, 10)))
        );
        Ok(())
    }

    #[test]
    fn test_unconnected_origin_fails_with_diagnostics() {
        let mut floor = Floor::new(1);
        let first = square(&mut floor, 0, 0, 2);
        let second = square(&mut floor, 10, 10, 2);

        match connect(&mut floor, first, second, &GenerationConfig::new()) {
            Err(WarrenError::UnconnectedOrigin(diagnostics)) => {
                assert_eq!(diagnostics.origin, first);
                assert_eq!(diagnostics.target, second);
                assert!(diagnostics.paths.is_empty());
                assert!(diagnostics.dump.contains('X'));
            }
            other => panic!("expected UnconnectedOrigin, got {other:?}"),
        }
        assert_eq!(floor.corridor_tile_count(), 0);
    }

    #[test]
    fn test_same_room_is_a_no_op() -> WarrenResult<()> {
        let mut floor = Floor::new(1);
        let room = square(&mut floor, 4, 4, 2);
        connect(&mut floor, room, room, &GenerationConfig::new())?;
        assert!(!floor.room(room).unwrap().is_connected);
        assert_eq!(floor.corridor_tile_count(), 0);
        Ok(())
    }

    #[test]
    fn test_connected_target_is_a_no_op() -> WarrenResult<()> {
        let mut floor = Floor::new(1);
        let first = square(&mut floor, 0, 0, 2);
        let second = square(&mut floor, 10, 10, 2);
        floor.room_mut(first)?.set_connected(true);
        floor.room_mut(second)?.set_connected(true);

        connect(&mut floor, first, second, &GenerationConfig::new())?;
        assert_eq!(floor.corridor_tile_count(), 0);
        Ok(())
    }

    #[test]
    fn test_corridor_reroutes_through_room_in_path() -> WarrenResult<()> {
        let mut floor = Floor::new(1);
        square(&mut floor, 0, 10, 2);
        let target = square(&mut floor, 20, 10, 2);
        let middle = square(&mut floor, 10, 10, 2);

        connect_all_rooms(&mut floor, &GenerationConfig::new())?;

        // x = 2..=9 into the middle room, then x = 12..=19 out of it
        assert_eq!(floor.corridor_tile_count(), 16);
        assert!(floor.room(middle).unwrap().is_connected);
        assert!(floor.room(target).unwrap().is_connected);
        assert!(floor.tile_at(Position::new(12, 10))?.unwrap().is_connector);
        assert!(floor.tile_at(Position::new(11, 11))?.unwrap().room_id.is_some());
        Ok(())
    }

    #[test]
    fn test_horizontal_sweep_reroutes_to_closer_neighbor() -> WarrenResult<()> {
        let mut floor = Floor::new(1);
        square(&mut floor, 0, 0, 2);
        let target = square(&mut floor, 20, 4, 2);
        let beside = square(&mut floor, 10, 2, 2);

        connect_all_rooms(&mut floor, &GenerationConfig::new())?;

        // x = 2..=10 on row 1, then x = 12..=20 on row 3
        assert_eq!(floor.corridor_tile_count(), 18);
        assert!(floor.room(beside).unwrap().is_connected);
        assert!(floor.room(target).unwrap().is_connected);
        assert!(floor.tile_at(Position::new(11, 1))?.is_none());
        assert!(floor.tile_at(Position::new(20, 3))?.unwrap().is_connector);
        Ok(())
    }

    #[test]
    fn test_vertical_reroute_rule() -> WarrenResult<()> {
        let build = || {
            let mut floor = Floor::new(1);
            square(&mut floor, 0, 0, 2);
            square(&mut floor, 4, 20, 2);
            let beside = square(&mut floor, 5, 10, 2);
            (floor, beside)
        };

        let (mut floor, beside) = build();
        connect_all_rooms(&mut floor, &config(VerticalReroute::Never))?;
        assert_eq!(floor.corridor_tile_count(), 3 + 18);
        assert!(floor.room(beside).unwrap().is_connected);
        assert!(floor.all_rooms_connected());

        let (mut floor, beside) = build();
        connect_all_rooms(&mut floor, &config(VerticalReroute::Always))?;
        assert_eq!(floor.corridor_tile_count(), 3 + 9 + 8);
        assert!(floor.room(beside).unwrap().is_connected);
        assert!(floor.tile_at(Position::new(5, 12))?.unwrap().is_connector);
        assert!(floor.all_rooms_connected());
        Ok(())
    }
}
