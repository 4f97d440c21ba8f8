//! # Generation Module
//!
//! The floor generation pipeline: placement, carving and connection.
//!
//! [`FloorGenerator`] runs the three stages over a single [`Floor`] in order.
//! Each stage lives in its own submodule and can be driven directly for tests
//! or custom pipelines.

pub mod carving;
pub mod connection;
pub mod placement;

pub use carving::{CarveReport, CarveStrategy};
pub use connection::ConnectionDiagnostics;
pub use placement::{AlcoveSide, Placement};

use crate::config::{self, GRID_SIZE};
use crate::{Floor, WarrenError, WarrenResult};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How the vertical corridor sweep treats a foreign room beside its path.
///
/// The horizontal sweep hands off to a bordering room whenever that room's
/// cell is strictly closer to the target. The vertical sweep already runs
/// along the target column, so the same distance test can never pick the
/// neighbor; [`VerticalReroute::Never`] keeps that behavior, while
/// [`VerticalReroute::Always`] hands off to every bordering room it meets.
/// Bordering rooms are marked connected under both rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerticalReroute {
    #[default]
    Never,
    Always,
}

/// Neighbor test used when sweeping away tiles stranded by scatter carving.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IsolatedSweep {
    /// A tile is isolated when every in-grid cardinal neighbor is empty
    #[default]
    InGrid,
    /// Legacy bounds: tiles in the first two columns or rows are never
    /// removed, and a missing neighbor past the far edge counts as empty
    Legacy,
}

/// Configuration for floor generation.
///
/// Every constant of the generation rules is exposed here. Missing fields
/// fall back to their defaults when deserialized, so a JSON override only
/// needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Minimum number of room slots rolled per floor
    pub min_rooms: u32,
    /// Maximum number of room slots rolled per floor
    pub max_rooms: u32,
    /// Minimum room edge length
    pub min_room_size: i32,
    /// Maximum room edge length
    pub max_room_size: i32,
    /// Fraction of the grid area rooms may consume (0.0 to 1.0)
    pub area_budget_fraction: f64,
    /// Probability that a room gets an alcove (0.0 to 1.0)
    pub alcove_chance: f64,
    /// Largest alcove length
    pub max_alcove_size: i32,
    /// Random candidates tried before the exhaustive scan
    pub placement_attempts: u32,
    /// Rooms with at least this many tiles are carved or marked expansive
    pub carve_threshold: usize,
    /// Probability that a qualifying room is left whole (0.0 to 1.0)
    pub expansive_chance: f64,
    /// Lower bound of the carve percentage
    pub min_carve_percent: u32,
    /// Upper bound of the carve percentage
    pub max_carve_percent: u32,
    /// Rooms under this tile count only use the L-shape strategy
    pub small_room_threshold: usize,
    /// Fixed-block carving cuts 3x3 under this tile count, 4x4 otherwise
    pub fixed_block_small_threshold: usize,
    /// Vertical sweep neighbor rule
    pub vertical_reroute: VerticalReroute,
    /// Isolated-tile cleanup rule after scatter carving
    pub isolated_sweep: IsolatedSweep,
}

impl GenerationConfig {
    /// Creates the default generation configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use warren::GenerationConfig;
    ///
    /// let config = GenerationConfig::new();
    /// assert_eq!(config.min_rooms, 10);
    /// assert_eq!(config.max_rooms, 18);
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn new() -> Self {
        Self {
            min_rooms: config::DEFAULT_MIN_ROOMS,
            max_rooms: config::DEFAULT_MAX_ROOMS,
            min_room_size: config::DEFAULT_MIN_ROOM_SIZE,
            max_room_size: config::DEFAULT_MAX_ROOM_SIZE,
            area_budget_fraction: 0.75,
            alcove_chance: 0.25,
            max_alcove_size: 2,
            placement_attempts: config::DEFAULT_PLACEMENT_ATTEMPTS,
            carve_threshold: config::DEFAULT_CARVE_THRESHOLD,
            expansive_chance: 0.15,
            min_carve_percent: 15,
            max_carve_percent: 30,
            small_room_threshold: config::DEFAULT_SMALL_ROOM_THRESHOLD,
            fixed_block_small_threshold: config::DEFAULT_FIXED_BLOCK_SMALL_THRESHOLD,
            vertical_reroute: VerticalReroute::Never,
            isolated_sweep: IsolatedSweep::InGrid,
        }
    }

    /// Creates a configuration for testing with fewer rooms.
    pub fn for_testing() -> Self {
        Self {
            min_rooms: 3,
            max_rooms: 6,
            ..Self::new()
        }
    }

    /// Creates a configuration that always rolls exactly `count` room slots.
    pub fn with_room_count(count: u32) -> Self {
        Self {
            min_rooms: count,
            max_rooms: count,
            ..Self::new()
        }
    }

    /// Loads a configuration from JSON, defaulting any missing field.
    pub fn from_json_str(json: &str) -> WarrenResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> WarrenResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Room-area budget in tiles.
    pub fn area_budget(&self) -> i64 {
        (f64::from(config::GRID_AREA) * self.area_budget_fraction) as i64
    }

    /// Checks ranges and probabilities.
    pub fn validate(&self) -> WarrenResult<()> {
        let invalid = |message: String| Err(WarrenError::InvalidConfig(message));

        if self.min_rooms == 0 || self.min_rooms > self.max_rooms {
            return invalid(format!(
                "room count range {}..={} must be non-empty and start at 1 or more",
                self.min_rooms, self.max_rooms
            ));
        }
        if self.min_room_size < 1 || self.min_room_size > self.max_room_size {
            return invalid(format!(
                "room size range {}..={} must be non-empty and start at 1 or more",
                self.min_room_size, self.max_room_size
            ));
        }
        if self.max_room_size + self.max_alcove_size.min(1) > GRID_SIZE - 1 {
            return invalid(format!(
                "rooms up to {} tiles wide do not fit the {GRID_SIZE}x{GRID_SIZE} grid",
                self.max_room_size
            ));
        }
        if self.max_alcove_size < 1 || self.max_alcove_size > self.min_room_size {
            return invalid(format!(
                "alcove size {} must be between 1 and the minimum room size {}",
                self.max_alcove_size, self.min_room_size
            ));
        }
        if !(self.area_budget_fraction > 0.0 && self.area_budget_fraction <= 1.0) {
            return invalid(format!(
                "area budget fraction {} must be in (0, 1]",
                self.area_budget_fraction
            ));
        }
        for (name, chance) in [
            ("alcove_chance", self.alcove_chance),
            ("expansive_chance", self.expansive_chance),
        ] {
            if !(0.0..=1.0).contains(&chance) {
                return invalid(format!("{name} {chance} must be in [0, 1]"));
            }
        }
        if self.min_carve_percent > self.max_carve_percent || self.max_carve_percent > 100 {
            return invalid(format!(
                "carve percentage band {}..={} must be non-empty and at most 100",
                self.min_carve_percent, self.max_carve_percent
            ));
        }

        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Trait for procedural generators.
pub trait Generator<T> {
    /// Generates content from the given random number generator.
    fn generate_with_rng<R: Rng + ?Sized>(&self, floor_number: u32, rng: &mut R) -> WarrenResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T) -> WarrenResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// Runs placement, carving and connection to produce one floor.
#[derive(Debug, Clone)]
pub struct FloorGenerator {
    config: GenerationConfig,
}

impl FloorGenerator {
    /// Creates a generator after validating the configuration.
    pub fn new(config: GenerationConfig) -> WarrenResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Generates a floor from a seed.
    ///
    /// The same seed and configuration always produce the same floor.
    ///
    /// # Examples
    ///
    /// ```
    /// use warren::{FloorGenerator, GenerationConfig};
    ///
    /// let generator = FloorGenerator::new(GenerationConfig::with_room_count(1)).unwrap();
    /// let floor = generator.generate(1, 7).unwrap();
    /// assert_eq!(floor.rooms().len(), 1);
    /// assert_eq!(floor.corridor_tile_count(), 0);
    /// ```
    pub fn generate(&self, floor_number: u32, seed: u64) -> WarrenResult<Floor> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.generate_with_rng(floor_number, &mut rng)
    }

    /// Generates a floor, retrying failed attempts with fresh seeds.
    ///
    /// Attempt `n` uses a seed derived from `seed` and `n`; the first attempt
    /// uses `seed` itself. Returns the last error when every attempt fails.
    pub fn generate_with_retries(
        &self,
        floor_number: u32,
        seed: u64,
        attempts: u32,
    ) -> WarrenResult<Floor> {
        let mut last_error = None;
        for attempt in 0..attempts.max(1) {
            let attempt_seed = retry_seed(seed, attempt);
            match self.generate(floor_number, attempt_seed) {
                Ok(floor) => return Ok(floor),
                Err(error) => {
                    warn!(
                        "Floor {} attempt {} (seed {}) failed: {}",
                        floor_number,
                        attempt + 1,
                        attempt_seed,
                        error
                    );
                    last_error = Some(error);
                }
            }
        }
        Err(last_error.unwrap_or(WarrenError::NoRoomsPlaced { floor_number }))
    }
}

fn retry_seed(seed: u64, attempt: u32) -> u64 {
    seed.wrapping_add(u64::from(attempt).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

impl Generator<Floor> for FloorGenerator {
    fn generate_with_rng<R: Rng + ?Sized>(
        &self,
        floor_number: u32,
        rng: &mut R,
    ) -> WarrenResult<Floor> {
        let mut floor = Floor::new(floor_number);

        let placed = placement::place_rooms(&mut floor, &self.config, rng)?;
        if placed == 0 {
            return Err(WarrenError::NoRoomsPlaced { floor_number });
        }

        carving::carve_rooms(&mut floor, &self.config, rng)?;
        connection::connect_all_rooms(&mut floor, &self.config)?;

        self.validate(&floor)?;

        if let Some(root) = floor.rooms().first().and_then(|room| room.occupied_tiles().first()) {
            let reachable = floor.reachable_from(*root).len();
            let total = floor.tiles().count();
            if reachable < total {
                debug!(
                    "Floor {}: {} of {} tiles are not reachable tile-by-tile from the first room",
                    floor_number,
                    total - reachable,
                    total
                );
            }
        }

        info!(
            "Generated floor {} with {} rooms, {} room tiles and {} corridor tiles",
            floor_number,
            floor.rooms().len(),
            floor.room_tile_count(),
            floor.corridor_tile_count()
        );
        Ok(floor)
    }

    fn validate(&self, floor: &Floor) -> WarrenResult<()> {
        floor.check_consistency()?;
        match floor.rooms().iter().find(|room| !room.is_connected) {
            Some(room) => Err(WarrenError::DisconnectedRoom(room.id)),
            None => Ok(()),
        }
    }

    fn generator_type(&self) -> &'static str {
        "FloorGenerator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_config_defaults() {
        let config = GenerationConfig::new();
        assert_eq!(config.area_budget(), 768);
        assert_eq!(config.placement_attempts, 25);
        assert_eq!(config.carve_threshold, 20);
        assert_eq!(config.vertical_reroute, VerticalReroute::Never);
        assert_eq!(config.isolated_sweep, IsolatedSweep::InGrid);
        assert!(config.validate().is_ok());
        assert!(GenerationConfig::for_testing().validate().is_ok());
    }

    #[test]
    fn test_config_validation_rejects_bad_ranges() {
        let cases = [
            GenerationConfig { min_rooms: 0, ..GenerationConfig::new() },
            GenerationConfig { min_rooms: 5, max_rooms: 4, ..GenerationConfig::new() },
            GenerationConfig { min_room_size: 9, ..GenerationConfig::new() },
            GenerationConfig { max_room_size: 31, ..GenerationConfig::new() },
            GenerationConfig { max_alcove_size: 3, ..GenerationConfig::new() },
            GenerationConfig { area_budget_fraction: 0.0, ..GenerationConfig::new() },
            GenerationConfig { alcove_chance: 1.5, ..GenerationConfig::new() },
            GenerationConfig { expansive_chance: -0.1, ..GenerationConfig::new() },
            GenerationConfig { min_carve_percent: 40, ..GenerationConfig::new() },
        ];
        for config in cases {
            assert!(
                matches!(config.validate(), Err(WarrenError::InvalidConfig(_))),
                "expected {config:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_config_json_overrides() -> WarrenResult<()> {
        let config = GenerationConfig::from_json_str(
            r#"{ "min_rooms": 2, "max_rooms": 4, "vertical_reroute": "always" }"#,
        )?;
        assert_eq!(config.min_rooms, 2);
        assert_eq!(config.max_rooms, 4);
        assert_eq!(config.vertical_reroute, VerticalReroute::Always);
        assert_eq!(config.alcove_chance, 0.25);

        assert!(GenerationConfig::from_json_str(r#"{ "min_rooms": 0 }"#).is_err());
        assert!(matches!(
            GenerationConfig::from_json_str("not json"),
            Err(WarrenError::Serde(_))
        ));
        Ok(())
    }

    #[test]
    fn test_generator_rejects_invalid_config() {
        let config = GenerationConfig { max_rooms: 0, ..GenerationConfig::new() };
        assert!(FloorGenerator::new(config).is_err());
    }

    #[test]
    fn test_same_seed_same_floor() -> WarrenResult<()> {
        let generator = FloorGenerator::new(GenerationConfig::new())?;
        let first = generator.generate_with_retries(1, 12345, 5)?;
        let second = generator.generate_with_retries(1, 12345, 5)?;
        assert_eq!(first, second);
        assert_eq!(generator.generator_type(), "FloorGenerator");
        Ok(())
    }

    #[test]
    fn test_generated_floor_is_valid() -> WarrenResult<()> {
        let generator = FloorGenerator::new(GenerationConfig::new())?;
        let mut generated = 0;
        for seed in 0..20 {
            let floor = match generator.generate(2, seed) {
                Ok(floor) => floor,
                Err(WarrenError::RerouteLimitExceeded(_)) => continue,
                Err(error) => return Err(error),
            };
            assert!(!floor.rooms().is_empty());
            assert!(floor.all_rooms_connected());
            assert!(floor.rooms().iter().all(|room| room.floor_number == 2));
            generator.validate(&floor)?;
            generated += 1;
        }
        assert!(generated > 0, "every seed hit the reroute limit");
        Ok(())
    }

    #[test]
    fn test_retry_seeds_differ_per_attempt() {
        assert_eq!(retry_seed(99, 0), 99);
        assert_ne!(retry_seed(99, 1), retry_seed(99, 2));
    }

    #[test]
    fn test_generate_with_retries_succeeds() -> WarrenResult<()> {
        let generator = FloorGenerator::new(GenerationConfig::for_testing())?;
        let floor = generator.generate_with_retries(4, 77, 3)?;
        assert!(floor.all_rooms_connected());
        assert_eq!(floor.floor_number, 4);
        Ok(())
    }
}
