//! Cell coordinates and the ten movement directions
//!
//! x grows east, y grows south, z grows up.

use serde::{Deserialize, Serialize};

/// Integer cell coordinate on the battlefield
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Position {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn offset(&self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// Neighbouring cell in the given direction
    pub fn step(&self, direction: Direction) -> Self {
        let (dx, dy, dz) = direction.vector();
        self.offset(dx, dy, dz)
    }

    pub fn above(&self) -> Self {
        self.offset(0, 0, 1)
    }

    pub fn below(&self) -> Self {
        self.offset(0, 0, -1)
    }

    /// Horizontal Chebyshev distance (diagonals count as one step)
    pub fn chebyshev_distance(&self, other: &Self) -> u32 {
        let dx = (self.x - other.x).unsigned_abs();
        let dy = (self.y - other.y).unsigned_abs();
        dx.max(dy)
    }
}

impl std::ops::Add for Position {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Movement direction: eight compass points plus up and down
///
/// Declaration order is clockwise from north, which the facing
/// arithmetic relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Direction {
    #[default]
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
    Up,
    Down,
}

impl Direction {
    /// All ten directions in search order
    pub const ALL: [Direction; 10] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
        Direction::Up,
        Direction::Down,
    ];

    /// The eight compass directions
    pub const HORIZONTAL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    pub fn index(&self) -> u8 {
        *self as u8
    }

    /// Cell offset for one step in this direction
    pub fn vector(&self) -> (i32, i32, i32) {
        match self {
            Direction::North => (0, -1, 0),
            Direction::NorthEast => (1, -1, 0),
            Direction::East => (1, 0, 0),
            Direction::SouthEast => (1, 1, 0),
            Direction::South => (0, 1, 0),
            Direction::SouthWest => (-1, 1, 0),
            Direction::West => (-1, 0, 0),
            Direction::NorthWest => (-1, -1, 0),
            Direction::Up => (0, 0, 1),
            Direction::Down => (0, 0, -1),
        }
    }

    /// Compass direction for a horizontal offset of at most one cell per axis
    pub fn from_offset(dx: i32, dy: i32) -> Option<Self> {
        Self::HORIZONTAL
            .into_iter()
            .find(|d| {
                let (vx, vy, _) = d.vector();
                vx == dx && vy == dy
            })
    }

    pub fn is_vertical(&self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }

    pub fn is_diagonal(&self) -> bool {
        !self.is_vertical() && self.index() % 2 == 1
    }

    pub fn opposite(&self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            _ => Self::HORIZONTAL[(self.index() as usize + 4) % 8],
        }
    }

    /// Number of 45-degree turns between two compass directions (0..=4)
    ///
    /// Vertical directions have no bearing and count as aligned.
    pub fn angular_distance(&self, other: Direction) -> u32 {
        if self.is_vertical() || other.is_vertical() {
            return 0;
        }
        let diff = (self.index() as i32 - other.index() as i32).rem_euclid(8) as u32;
        diff.min(8 - diff)
    }

    /// Whether `other` runs along this direction's axis (same or reverse)
    pub fn is_collinear(&self, other: Direction) -> bool {
        other == *self || other == self.opposite()
    }
}
