//! Grid coordinates and cardinal directions

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// A cell on the map lattice
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct GridCoord {
    pub x: i32,
    pub y: i32,
}

impl GridCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset by (dx, dy)
    #[inline]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Step `n` cells in a direction
    #[inline]
    pub const fn step(self, dir: Direction, n: i32) -> Self {
        let (dx, dy) = dir.delta();
        self.offset(dx * n, dy * n)
    }

    /// Chebyshev (king-move) distance
    pub fn chebyshev(self, other: GridCoord) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// Both coordinates odd: a carve-graph node
    #[inline]
    pub const fn is_odd_node(self) -> bool {
        self.x & 1 == 1 && self.y & 1 == 1
    }

    /// The four cardinal neighbours, in N, E, S, W order
    pub fn cardinal_neighbors(self) -> [GridCoord; 4] {
        Direction::ALL.map(|d| self.step(d, 1))
    }

    /// The eight surrounding cells
    pub fn ring(self) -> impl Iterator<Item = GridCoord> {
        (-1..=1).flat_map(move |dy| {
            (-1..=1)
                .filter(move |&dx| dx != 0 || dy != 0)
                .map(move |dx| self.offset(dx, dy))
        })
    }
}

impl From<(i32, i32)> for GridCoord {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl core::fmt::Display for GridCoord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Cardinal direction; north is -y (screen coordinates)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumIter,
)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }

    pub const fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    /// True for east/west
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Direction::East | Direction::West)
    }
}
