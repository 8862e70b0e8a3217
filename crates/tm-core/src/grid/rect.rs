//! Inclusive cell rectangles
//!
//! Used for interior bounds, the obstacle safe zone, building door clearance
//! and terrain zone footprints.

use serde::{Deserialize, Serialize};

use super::GridCoord;

/// A rectangle of grid cells, inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridRect {
    /// Left x coordinate
    pub lx: i32,
    /// Top y coordinate
    pub ly: i32,
    /// Right x coordinate
    pub hx: i32,
    /// Bottom y coordinate
    pub hy: i32,
}

impl GridRect {
    pub const fn new(lx: i32, ly: i32, hx: i32, hy: i32) -> Self {
        Self { lx, ly, hx, hy }
    }

    /// Rectangle from an origin cell and a size in cells
    pub const fn from_origin(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self::new(x, y, x + w - 1, y + h - 1)
    }

    pub fn width(&self) -> i32 {
        (self.hx - self.lx + 1).max(0)
    }

    pub fn height(&self) -> i32 {
        (self.hy - self.ly + 1).max(0)
    }

    pub fn area(&self) -> usize {
        self.width() as usize * self.height() as usize
    }

    /// Check if the rectangle has positive area
    pub fn is_valid(&self) -> bool {
        self.hx >= self.lx && self.hy >= self.ly
    }

    pub fn contains(&self, c: GridCoord) -> bool {
        c.x >= self.lx && c.x <= self.hx && c.y >= self.ly && c.y <= self.hy
    }

    /// Shrink by `n` cells on every side
    pub fn inset(&self, n: i32) -> GridRect {
        GridRect::new(self.lx + n, self.ly + n, self.hx - n, self.hy - n)
    }

    /// Center cell (rounded toward the top-left)
    pub fn center(&self) -> GridCoord {
        GridCoord::new((self.lx + self.hx) / 2, (self.ly + self.hy) / 2)
    }

    /// Clamp a coordinate into the rectangle
    pub fn clamp(&self, c: GridCoord) -> GridCoord {
        GridCoord::new(c.x.clamp(self.lx, self.hx), c.y.clamp(self.ly, self.hy))
    }

    /// All cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = GridCoord> + '_ {
        let (lx, hx) = (self.lx, self.hx);
        (self.ly..=self.hy).flat_map(move |y| (lx..=hx).map(move |x| GridCoord::new(x, y)))
    }

    /// Border cells, clockwise from the top-left corner, each listed once
    pub fn border(&self) -> Vec<GridCoord> {
        let mut out = Vec::new();
        if !self.is_valid() {
            return out;
        }
        for x in self.lx..=self.hx {
            out.push(GridCoord::new(x, self.ly));
        }
        for y in self.ly + 1..=self.hy {
            out.push(GridCoord::new(self.hx, y));
        }
        if self.hy > self.ly {
            for x in (self.lx..self.hx).rev() {
                out.push(GridCoord::new(x, self.hy));
            }
        }
        if self.hx > self.lx {
            for y in (self.ly + 1..self.hy).rev() {
                out.push(GridCoord::new(self.lx, y));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_dimensions() {
        let r = GridRect::new(10, 20, 15, 25);
        assert_eq!(r.width(), 6);
        assert_eq!(r.height(), 6);
        assert_eq!(r.area(), 36);
        assert_eq!(GridRect::from_origin(2, 3, 4, 2), GridRect::new(2, 3, 5, 4));
    }

    #[test]
    fn test_degenerate_rect() {
        let r = GridRect::new(5, 5, 4, 9);
        assert!(!r.is_valid());
        assert_eq!(r.area(), 0);
        assert_eq!(r.cells().count(), 0);
        assert!(r.border().is_empty());
    }

    #[test]
    fn test_border_lists_each_cell_once() {
        let r = GridRect::new(1, 1, 4, 3);
        let border = r.border();
        assert_eq!(border.len(), 10);
        let mut dedup = border.clone();
        dedup.sort();
        dedup.dedup();
        assert_eq!(dedup.len(), border.len());
        assert_eq!(border[0], GridCoord::new(1, 1));

        assert_eq!(GridRect::new(2, 2, 2, 2).border(), vec![GridCoord::new(2, 2)]);
        assert_eq!(GridRect::new(0, 0, 2, 0).border().len(), 3);
    }

    #[test]
    fn test_cells_row_major() {
        let cells: Vec<_> = GridRect::new(0, 0, 1, 1).cells().collect();
        assert_eq!(
            cells,
            vec![
                GridCoord::new(0, 0),
                GridCoord::new(1, 0),
                GridCoord::new(0, 1),
                GridCoord::new(1, 1)
            ]
        );
    }
}
