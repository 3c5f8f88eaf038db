use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

pub mod connectivity;
pub mod dungeon;
pub mod endpoints;
pub mod generator;
pub mod geometry;
pub mod main_path;
pub mod map;
pub mod navigation;
pub mod path_length;
pub mod player;
pub mod save;

pub use dungeon::{Dungeon, Level, LevelId, Room, Violation};
pub use generator::{GenerationError, GeneratorConfig, LayoutGenerator, generate_layout};

/// A cell position on the dungeon grid, 0-indexed from the top-left corner.
///
/// Serialized as a two-element array `[x, y]`; its canonical key form is `"x,y"`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(from = "(usize, usize)", into = "(usize, usize)")]
pub struct Coordinate {
    pub x: usize,
    pub y: usize,
}

impl Coordinate {
    pub const fn new(x: usize, y: usize) -> Self {
        Coordinate { x, y }
    }

    /// Moves one cell in `direction`, returning `None` if that leaves the
    /// `width` x `height` grid.
    pub fn step(self, direction: Direction, width: usize, height: usize) -> Option<Coordinate> {
        let (dx, dy) = direction.delta();
        let x = self.x.checked_add_signed(dx)?;
        let y = self.y.checked_add_signed(dy)?;
        (x < width && y < height).then_some(Coordinate { x, y })
    }
}

impl From<(usize, usize)> for Coordinate {
    fn from((x, y): (usize, usize)) -> Self {
        Coordinate { x, y }
    }
}

impl From<Coordinate> for (usize, usize) {
    fn from(c: Coordinate) -> Self {
        (c.x, c.y)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// Error returned when a string is not of the form `"x,y"`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid coordinate key {0:?}, expected \"x,y\"")]
pub struct ParseCoordinateError(pub String);

impl FromStr for Coordinate {
    type Err = ParseCoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseCoordinateError(s.to_string());
        let (x, y) = s.split_once(',').ok_or_else(err)?;
        Ok(Coordinate {
            x: x.trim().parse().map_err(|_| err())?,
            y: y.trim().parse().map_err(|_| err())?,
        })
    }
}

/// One of the four cardinal directions a room can connect through.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// All directions, in the order neighbours are enumerated.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// Unit vector `(dx, dy)`; y grows southwards.
    pub const fn delta(self) -> (isize, isize) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }

    pub const fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
