//! Occupancy grid for one map
//!
//! The grid knows its size in cells and the set of blocked cells. The outer
//! one-cell ring is always reserved for the map boundary, so only the
//! interior `[1, width-2] x [1, height-2]` can ever be available.
//!
//! Callers query speculatively, so nothing here fails: out-of-range cells are
//! simply unavailable and occupying them is a no-op.

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use super::{GridCoord, GridRect};

/// Per-map occupancy set over a bounded lattice
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GridModel {
    /// Map width in cells
    width: i32,
    /// Map height in cells
    height: i32,
    /// World units per cell
    cell_size: u32,
    /// Blocked cells
    occupied: HashSet<GridCoord>,
}

impl GridModel {
    /// Create a grid for a map of the given pixel dimensions.
    pub fn new(map_px: (u32, u32), cell_size: u32) -> Self {
        let mut grid = Self::default();
        grid.initialize(map_px, cell_size);
        grid
    }

    /// Reset dimensions and clear all occupancy.
    pub fn initialize(&mut self, (width_px, height_px): (u32, u32), cell_size: u32) {
        let cell_size = cell_size.max(1);
        self.cell_size = cell_size;
        self.width = (width_px / cell_size) as i32;
        self.height = (height_px / cell_size) as i32;
        self.occupied.clear();
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    /// Whole-map rectangle, boundary included
    pub fn bounds(&self) -> GridRect {
        GridRect::new(0, 0, self.width - 1, self.height - 1)
    }

    /// Interior rectangle, or `None` if the map has no interior
    pub fn interior(&self) -> Option<GridRect> {
        let r = self.bounds().inset(1);
        r.is_valid().then_some(r)
    }

    pub fn in_bounds(&self, c: GridCoord) -> bool {
        c.x >= 0 && c.y >= 0 && c.x < self.width && c.y < self.height
    }

    pub fn in_interior(&self, c: GridCoord) -> bool {
        c.x >= 1 && c.y >= 1 && c.x <= self.width - 2 && c.y <= self.height - 2
    }

    pub fn is_occupied(&self, c: GridCoord) -> bool {
        self.occupied.contains(&c)
    }

    /// Inside the interior and not blocked
    pub fn is_available(&self, x: i32, y: i32) -> bool {
        let c = GridCoord::new(x, y);
        self.in_interior(c) && !self.occupied.contains(&c)
    }

    /// Mark a cell blocked. Returns true if the cell was newly occupied.
    pub fn occupy(&mut self, x: i32, y: i32) -> bool {
        let c = GridCoord::new(x, y);
        if !self.in_interior(c) {
            return false;
        }
        self.occupied.insert(c)
    }

    /// Release a cell (e.g. an item was picked up)
    pub fn release(&mut self, x: i32, y: i32) -> bool {
        self.occupied.remove(&GridCoord::new(x, y))
    }

    pub fn occupied_count(&self) -> usize {
        self.occupied.len()
    }

    /// Center of a cell in world units
    pub fn grid_to_world(&self, x: i32, y: i32) -> (f32, f32) {
        let cs = self.cell_size as f32;
        (x as f32 * cs + cs / 2.0, y as f32 * cs + cs / 2.0)
    }

    /// Cell containing a world position
    pub fn world_to_grid(&self, px: f32, py: f32) -> (i32, i32) {
        let cs = self.cell_size.max(1) as f32;
        ((px / cs).floor() as i32, (py / cs).floor() as i32)
    }

    /// Available cells not in `exclude`, row-major.
    pub fn free_cells(&self, exclude: &HashSet<GridCoord>) -> Vec<GridCoord> {
        let Some(interior) = self.interior() else {
            return Vec::new();
        };
        interior
            .cells()
            .filter(|c| !self.occupied.contains(c) && !exclude.contains(c))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_initialize_sets_dimensions() {
        let grid = GridModel::new((352, 256), 16);
        assert_eq!(grid.width(), 22);
        assert_eq!(grid.height(), 16);
        assert_eq!(grid.interior(), Some(GridRect::new(1, 1, 20, 14)));
    }

    #[test]
    fn test_reinitialize_clears_occupancy() {
        let mut grid = GridModel::new((160, 160), 16);
        assert!(grid.occupy(3, 3));
        assert_eq!(grid.occupied_count(), 1);
        grid.initialize((320, 160), 16);
        assert_eq!(grid.occupied_count(), 0);
        assert_eq!(grid.width(), 20);
        assert!(grid.is_available(3, 3));
    }

    #[test]
    fn test_boundary_is_never_available() {
        let mut grid = GridModel::new((160, 160), 16);
        assert!(!grid.is_available(0, 5));
        assert!(!grid.is_available(9, 5));
        assert!(!grid.is_available(5, 0));
        assert!(!grid.is_available(5, 9));
        assert!(!grid.is_available(-3, 40));
        assert!(!grid.occupy(0, 0));
        assert_eq!(grid.occupied_count(), 0);
        assert!(grid.is_available(1, 1));
        assert!(grid.is_available(8, 8));
    }

    #[test]
    fn test_occupy_is_idempotent() {
        let mut grid = GridModel::new((160, 160), 16);
        assert!(grid.occupy(4, 4));
        assert!(!grid.occupy(4, 4));
        assert_eq!(grid.occupied_count(), 1);
        assert!(!grid.is_available(4, 4));
        assert!(grid.release(4, 4));
        assert!(grid.is_available(4, 4));
    }

    #[test]
    fn test_tiny_map_has_no_interior() {
        let grid = GridModel::new((32, 32), 16);
        assert_eq!(grid.interior(), None);
        assert!(grid.free_cells(&HashSet::new()).is_empty());
    }

    #[test]
    fn test_zero_cell_size_is_floored() {
        let grid = GridModel::new((10, 10), 0);
        assert_eq!(grid.cell_size(), 1);
        assert_eq!(grid.width(), 10);
    }

    #[test]
    fn test_free_cells_respects_exclusions() {
        let mut grid = GridModel::new((80, 80), 16);
        grid.occupy(1, 1);
        let mut exclude = HashSet::new();
        exclude.insert(GridCoord::new(2, 1));
        let free = grid.free_cells(&exclude);
        assert_eq!(free.len(), 9 - 2);
        assert_eq!(free[0], GridCoord::new(3, 1));
    }

    proptest! {
        #[test]
        fn prop_coordinate_round_trip(w in 3u32..64, h in 3u32..64, cs in 1u32..48, fx in 0.0f64..1.0, fy in 0.0f64..1.0) {
            let grid = GridModel::new((w * cs, h * cs), cs);
            let interior = grid.interior().unwrap();
            let x = interior.lx + ((interior.width() - 1) as f64 * fx) as i32;
            let y = interior.ly + ((interior.height() - 1) as f64 * fy) as i32;
            let (px, py) = grid.grid_to_world(x, y);
            prop_assert_eq!(grid.world_to_grid(px, py), (x, y));
        }
    }
}
