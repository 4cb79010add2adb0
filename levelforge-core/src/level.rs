//! Creature levels and the ranges a scorer can represent.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Highest level printed in the bestiaries before creatures are folded together.
const EPIC_THRESHOLD: i32 = 20;

/// A creature's difficulty level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Level(pub i32);

impl Level {
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    pub const fn get(self) -> i32 {
        self.0
    }

    /// Fold every level above 20 into a single level 21 bucket.
    ///
    /// Very few creatures exist above level 20, so the training data treats them as one class.
    pub fn fold_epic(self) -> Self {
        if self.0 > EPIC_THRESHOLD {
            Self(EPIC_THRESHOLD + 1)
        } else {
            self
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for Level {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

/// Inclusive range of levels.
///
/// Deserialisation rejects a range whose `min` exceeds its `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLevelRange")]
pub struct LevelRange {
    pub min: Level,
    pub max: Level,
}

#[derive(Deserialize)]
struct RawLevelRange {
    min: Level,
    max: Level,
}

impl TryFrom<RawLevelRange> for LevelRange {
    type Error = String;

    fn try_from(bounds: RawLevelRange) -> Result<Self, Self::Error> {
        let range = LevelRange {
            min: bounds.min,
            max: bounds.max,
        };
        if range.is_ordered() {
            Ok(range)
        } else {
            Err(format!("level range {range} has min above max"))
        }
    }
}

impl LevelRange {
    /// Levels -1 through 21, after epic folding.
    pub const PATHFINDER: LevelRange = LevelRange {
        min: Level(-1),
        max: Level(EPIC_THRESHOLD + 1),
    };

    /// Build a range, swapping the bounds if given in reverse.
    pub fn new(a: Level, b: Level) -> Self {
        if a <= b {
            Self { min: a, max: b }
        } else {
            Self { min: b, max: a }
        }
    }

    /// False for a hand-built range whose `min` exceeds its `max`.
    pub fn is_ordered(&self) -> bool {
        self.min <= self.max
    }

    pub fn contains(&self, level: Level) -> bool {
        self.min <= level && level <= self.max
    }

    pub fn clamp(&self, level: Level) -> Level {
        level.clamp(self.min, self.max)
    }
}

impl Default for LevelRange {
    fn default() -> Self {
        Self::PATHFINDER
    }
}

impl fmt::Display for LevelRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}
