use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, FRAC_PI_8, PI};
use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

// ============================================================================
// COMPASS DIRECTIONS
// ============================================================================

/// One of the eight compass headings a character can face or move in.
///
/// Screen coordinates: north is negative y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::N,
        Direction::NE,
        Direction::E,
        Direction::SE,
        Direction::S,
        Direction::SW,
        Direction::W,
        Direction::NW,
    ];

    /// Unit vector pointing in this direction.
    pub fn to_vector(self) -> Vec2 {
        let raw = match self {
            Direction::N => Vec2::new(0.0, -1.0),
            Direction::NE => Vec2::new(1.0, -1.0),
            Direction::E => Vec2::new(1.0, 0.0),
            Direction::SE => Vec2::new(1.0, 1.0),
            Direction::S => Vec2::new(0.0, 1.0),
            Direction::SW => Vec2::new(-1.0, 1.0),
            Direction::W => Vec2::new(-1.0, 0.0),
            Direction::NW => Vec2::new(-1.0, -1.0),
        };
        raw.normalize()
    }

    /// Heading angle in radians, measured like `atan2(y, x)`.
    pub fn angle(self) -> f32 {
        let v = self.to_vector();
        v.y.atan2(v.x)
    }

    /// Discretize a continuous bearing into one of eight headings.
    ///
    /// Sectors are π/4 wide; the π/8 offset puts sector boundaries at octant
    /// midpoints so that e.g. anything within ±π/8 of east is `E`.
    pub fn from_angle(angle: f32) -> Direction {
        let angle = angle + FRAC_PI_8;
        if angle >= 0.0 {
            if angle < FRAC_PI_4 {
                Direction::E
            } else if angle < FRAC_PI_2 {
                Direction::SE
            } else if angle < 3.0 * FRAC_PI_4 {
                Direction::S
            } else if angle < PI {
                Direction::SW
            } else {
                Direction::W
            }
        } else if angle > -FRAC_PI_4 {
            Direction::NE
        } else if angle > -FRAC_PI_2 {
            Direction::N
        } else if angle > -3.0 * FRAC_PI_4 {
            Direction::NW
        } else {
            Direction::W
        }
    }

    /// Heading from `origin` toward `target`.
    pub fn toward(origin: Vec2, target: Vec2) -> Direction {
        let delta = target - origin;
        Direction::from_angle(delta.y.atan2(delta.x))
    }
}

// ============================================================================
// CHARACTER TYPES
// ============================================================================

/// Every kind of character the zone knows how to simulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacterType {
    Pigsassin,
    ShadowGuardian,
    DroidAssassin,
}

impl CharacterType {
    pub const ALL: [CharacterType; 3] = [
        CharacterType::Pigsassin,
        CharacterType::ShadowGuardian,
        CharacterType::DroidAssassin,
    ];

    /// Name used for data files, e.g. `characters/shadow_guardian.toml`.
    pub fn short_name(self) -> &'static str {
        match self {
            CharacterType::Pigsassin => "pigsassin",
            CharacterType::ShadowGuardian => "shadow_guardian",
            CharacterType::DroidAssassin => "droid_assassin",
        }
    }
}

impl fmt::Display for CharacterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}
