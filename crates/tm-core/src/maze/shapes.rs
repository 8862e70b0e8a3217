//! Obstacle shape catalog
//!
//! Obstacles are only ever placed as whole catalog shapes, never as single
//! cells. Each shape is stored as offsets from an anchor cell at (0, 0) and
//! expands to eight variants (four rotations, each optionally mirrored).
//! Every variant keeps the anchor at (0, 0), so a variant can be dropped
//! straight onto a wall candidate.

use strum::{Display, EnumIter};

use crate::grid::GridCoord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum ShapeKind {
    /// Four cells in a row
    Row4,
    /// Three cells in a column
    Column3,
    /// Two cells, down-right diagonal
    DiagonalDown,
    /// Two cells, up-right diagonal
    DiagonalUp,
    /// Three-cell L
    Ell,
}

/// Rotations times reflections
pub const VARIANT_COUNT: usize = 8;

impl ShapeKind {
    pub const ALL: [ShapeKind; 5] = [
        ShapeKind::Row4,
        ShapeKind::Column3,
        ShapeKind::DiagonalDown,
        ShapeKind::DiagonalUp,
        ShapeKind::Ell,
    ];

    /// Offsets of the base orientation
    pub const fn offsets(self) -> &'static [(i32, i32)] {
        match self {
            ShapeKind::Row4 => &[(0, 0), (1, 0), (2, 0), (3, 0)],
            ShapeKind::Column3 => &[(0, 0), (0, 1), (0, 2)],
            ShapeKind::DiagonalDown => &[(0, 0), (1, 1)],
            ShapeKind::DiagonalUp => &[(0, 0), (1, -1)],
            ShapeKind::Ell => &[(0, 0), (0, 1), (1, 1)],
        }
    }

    /// Offsets of variant `index` (0..8)
    pub fn variant(self, index: usize) -> Vec<(i32, i32)> {
        let rotation = index % 4;
        let mirrored = index >= 4;
        self.offsets()
            .iter()
            .map(|&(x, y)| {
                let x = if mirrored { -x } else { x };
                rotate(x, y, rotation)
            })
            .collect()
    }

    /// Cells of variant `index` anchored at `anchor`
    pub fn cells_at(self, index: usize, anchor: GridCoord) -> Vec<GridCoord> {
        self.variant(index)
            .into_iter()
            .map(|(dx, dy)| anchor.offset(dx, dy))
            .collect()
    }
}

/// Quarter turns clockwise (screen coordinates)
fn rotate(x: i32, y: i32, quarter_turns: usize) -> (i32, i32) {
    match quarter_turns % 4 {
        0 => (x, y),
        1 => (-y, x),
        2 => (-x, -y),
        _ => (y, -x),
    }
}
