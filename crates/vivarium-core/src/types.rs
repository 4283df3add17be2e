//! Core type definitions for the simulation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an organism instance.
///
/// Issued once by the environment's allocator and never reused, so ordering by
/// id is also ordering by creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrganismId(pub u64);

impl fmt::Display for OrganismId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 2D position on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn add(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    pub fn offset(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.to_delta();
        self.add(dx, dy)
    }

    /// Whether the position lies inside a `width` x `height` grid
    pub fn in_bounds(&self, width: i32, height: i32) -> bool {
        self.x >= 0 && self.y >= 0 && self.x < width && self.y < height
    }

    /// Chebyshev (king-move) distance, the metric used for every range check
    pub fn chebyshev_distance(&self, other: &Position) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// The single king-move step from `self` that closes the distance to `target`
    pub fn step_toward(&self, target: &Position) -> Position {
        Position::new(
            self.x + (target.x - self.x).signum(),
            self.y + (target.y - self.y).signum(),
        )
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Direction for movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl Direction {
    pub fn to_delta(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
            Direction::NorthEast => (1, -1),
            Direction::NorthWest => (-1, -1),
            Direction::SouthEast => (1, 1),
            Direction::SouthWest => (-1, 1),
        }
    }

    pub fn all() -> [Direction; 8] {
        [
            Direction::North,
            Direction::South,
            Direction::East,
            Direction::West,
            Direction::NorthEast,
            Direction::NorthWest,
            Direction::SouthEast,
            Direction::SouthWest,
        ]
    }
}

/// The two organism kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    Plant,
    Insect,
}

/// Insect sex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
    Hermaphrodite,
}

impl Sex {
    /// Hermaphrodites pair with anyone; otherwise only opposite sexes pair.
    pub fn is_compatible_with(&self, other: Sex) -> bool {
        match (self, other) {
            (Sex::Hermaphrodite, _) | (_, Sex::Hermaphrodite) => true,
            (Sex::Male, Sex::Female) | (Sex::Female, Sex::Male) => true,
            _ => false,
        }
    }
}

/// Lifecycle status shared by every organism
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifeStatus {
    Alive,
    Dying,
    Dead,
}

/// Result of a fight, carried only while an insect is fighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatOutcome {
    Winner,
    Loser,
}

/// Hunger derived from an insect's energy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HungerLevel {
    Sated,
    Hungry,
    Starving,
}

/// How a mature plant spreads onto nearby cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReproductionMode {
    /// Creeping stems rooting next to the parent
    Runners,
    Seeds,
    Spores,
}

impl ReproductionMode {
    /// Chebyshev radius in which offspring may take root
    pub fn spread_radius(&self) -> i32 {
        match self {
            ReproductionMode::Runners => 1,
            ReproductionMode::Seeds => 2,
            ReproductionMode::Spores => 3,
        }
    }
}

/// When a plant is able to grow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrowthLight {
    Day,
    Night,
    Any,
}

impl GrowthLight {
    pub fn allows(&self, daylight: bool) -> bool {
        match self {
            GrowthLight::Day => daylight,
            GrowthLight::Night => !daylight,
            GrowthLight::Any => true,
        }
    }
}

/// Shared weather state, recomputed from the hour every tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Climate {
    /// Degrees Celsius
    pub temperature: f32,
    /// Relative humidity (0.0 to 1.0)
    pub humidity: f32,
    pub daylight: bool,
}

impl Climate {
    pub const DAWN: u32 = 6;
    pub const DUSK: u32 = 20;

    /// Daily cycle: warmest mid-afternoon, most humid just before dawn
    pub fn at_hour(hour: u32) -> Self {
        let phase = (hour as f32 - 9.0) / 24.0 * std::f32::consts::TAU;
        let swing = phase.sin();
        Self {
            temperature: 17.0 + 7.0 * swing,
            humidity: (0.6 - 0.25 * swing).clamp(0.0, 1.0),
            daylight: (Self::DAWN..Self::DUSK).contains(&hour),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_bounds() {
        assert!(Position::new(0, 0).in_bounds(10, 10));
        assert!(Position::new(9, 9).in_bounds(10, 10));
        assert!(!Position::new(-1, 0).in_bounds(10, 10));
        assert!(!Position::new(10, 3).in_bounds(10, 10));
    }

    #[test]
    fn test_distances() {
        let a = Position::new(0, 0);
        let b = Position::new(3, 4);
        assert_eq!(a.chebyshev_distance(&b), 4);
    }

    #[test]
    fn test_step_toward() {
        let a = Position::new(2, 2);
        assert_eq!(a.step_toward(&Position::new(5, 2)), Position::new(3, 2));
        assert_eq!(a.step_toward(&Position::new(0, 0)), Position::new(1, 1));
        assert_eq!(a.step_toward(&a), a);
    }

    #[test]
    fn test_direction_delta() {
        assert_eq!(Direction::North.to_delta(), (0, -1));
        assert_eq!(Direction::South.to_delta(), (0, 1));
        assert_eq!(Direction::East.to_delta(), (1, 0));
        assert_eq!(Direction::West.to_delta(), (-1, 0));
        assert_eq!(Position::new(1, 1).offset(Direction::SouthWest), Position::new(0, 2));
    }

    #[test]
    fn test_sex_compatibility() {
        assert!(Sex::Male.is_compatible_with(Sex::Female));
        assert!(Sex::Female.is_compatible_with(Sex::Male));
        assert!(!Sex::Male.is_compatible_with(Sex::Male));
        assert!(!Sex::Female.is_compatible_with(Sex::Female));
        for other in [Sex::Male, Sex::Female, Sex::Hermaphrodite] {
            assert!(Sex::Hermaphrodite.is_compatible_with(other));
            assert!(other.is_compatible_with(Sex::Hermaphrodite));
        }
    }

    #[test]
    fn test_climate_cycle() {
        assert!(!Climate::at_hour(0).daylight);
        assert!(Climate::at_hour(12).daylight);
        assert!(!Climate::at_hour(20).daylight);
        assert!(Climate::at_hour(15).temperature > Climate::at_hour(3).temperature);
    }
}
