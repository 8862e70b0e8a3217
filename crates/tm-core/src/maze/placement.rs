//! Wall candidates, shape placement and the fallback cluster

use hashbrown::HashSet;
use tm_rng::RngStream;

use super::carve::Carving;
use super::shapes::{ShapeKind, VARIANT_COUNT};
use crate::grid::{Direction, GridCoord, GridModel, GridRect};

/// A non-carved cell next to the corridor skeleton
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallCandidate {
    pub cell: GridCoord,
    /// Number of carved cardinal neighbours (1..=4)
    pub adjacency: u8,
}

/// Every free, uncarved interior cell touching the skeleton, in row-major
/// order and then shuffled.
pub fn enumerate_candidates(
    grid: &GridModel,
    interior: &GridRect,
    carving: &Carving,
    rng: &mut RngStream,
) -> Vec<WallCandidate> {
    let mut candidates: Vec<WallCandidate> = interior
        .cells()
        .filter(|&c| !carving.contains(c) && !grid.is_occupied(c))
        .filter_map(|c| {
            let adjacency = c
                .cardinal_neighbors()
                .iter()
                .filter(|n| carving.contains(**n))
                .count() as u8;
            (adjacency > 0).then_some(WallCandidate { cell: c, adjacency })
        })
        .collect();
    rng.shuffle(&mut candidates);
    candidates
}

/// Offsets of the fallback plus: center, arms, arm extensions
const PLUS: [(i32, i32); 9] = [
    (0, 0),
    (0, -1),
    (1, 0),
    (0, 1),
    (-1, 0),
    (0, -2),
    (2, 0),
    (0, 2),
    (-2, 0),
];

/// Running state of one placement pass
pub struct Placement<'a> {
    grid: &'a mut GridModel,
    carving: &'a Carving,
    blocked: &'a HashSet<GridCoord>,
    /// Obstacles stay inside this rectangle
    safe: GridRect,
    walls: Vec<GridCoord>,
    wall_set: HashSet<GridCoord>,
}

impl<'a> Placement<'a> {
    pub fn new(
        grid: &'a mut GridModel,
        carving: &'a Carving,
        blocked: &'a HashSet<GridCoord>,
        safe_margin: i32,
    ) -> Self {
        let safe = grid.bounds().inset(safe_margin);
        Self {
            grid,
            carving,
            blocked,
            safe,
            walls: Vec::new(),
            wall_set: HashSet::new(),
        }
    }

    pub fn wall_count(&self) -> usize {
        self.walls.len()
    }

    pub fn is_wall(&self, c: GridCoord) -> bool {
        self.wall_set.contains(&c)
    }

    /// Placed walls in placement order
    pub fn into_walls(self) -> Vec<GridCoord> {
        self.walls
    }

    /// A single cell may hold an obstacle
    fn cell_ok(&self, c: GridCoord) -> bool {
        self.safe.contains(c)
            && !self.grid.is_occupied(c)
            && !self.carving.contains(c)
            && !self.blocked.contains(&c)
            && !self.wall_set.contains(&c)
    }

    /// Some shape cell is 8-adjacent to a placed wall
    fn touches_wall(&self, cells: &[GridCoord]) -> bool {
        cells.iter().any(|c| c.ring().any(|n| self.wall_set.contains(&n)))
    }

    /// No placed wall within two cells of any shape cell
    fn keeps_buffer(&self, cells: &[GridCoord]) -> bool {
        cells.iter().all(|c| {
            (-2..=2).all(|dy| (-2..=2).all(|dx| !self.wall_set.contains(&c.offset(dx, dy))))
        })
    }

    /// Walling `cells` would squeeze a carved corridor to one cell.
    ///
    /// For every shape cell and cardinal direction: if the next cell is
    /// carved and still open, the cell after it must stay open as well.
    fn pinches(&self, cells: &[GridCoord]) -> bool {
        cells.iter().any(|&s| {
            Direction::ALL.iter().any(|&d| {
                let c1 = s.step(d, 1);
                let open = self.carving.contains(c1)
                    && !self.grid.is_occupied(c1)
                    && !self.wall_set.contains(&c1)
                    && !cells.contains(&c1);
                if !open {
                    return false;
                }
                let c2 = s.step(d, 2);
                self.wall_set.contains(&c2)
                    || cells.contains(&c2)
                    || self.grid.is_occupied(c2)
                    || !self.grid.in_interior(c2)
            })
        })
    }

    /// Whether a whole shape may be stamped
    pub fn accepts(&self, cells: &[GridCoord]) -> bool {
        cells.iter().all(|&c| self.cell_ok(c))
            && (self.touches_wall(cells) || self.keeps_buffer(cells))
            && !self.pinches(cells)
    }

    fn stamp(&mut self, cells: &[GridCoord]) {
        for &c in cells {
            self.grid.occupy(c.x, c.y);
            if self.wall_set.insert(c) {
                self.walls.push(c);
            }
        }
    }
}

/// Stamp catalog shapes onto candidates until `target` walls are placed or
/// `max_attempts` candidates have been tried. Candidates are cycled.
pub fn place_shapes(
    placement: &mut Placement<'_>,
    candidates: &[WallCandidate],
    target: usize,
    max_attempts: usize,
    rng: &mut RngStream,
) {
    if candidates.is_empty() {
        return;
    }

    let mut order: [usize; VARIANT_COUNT] = core::array::from_fn(|i| i);
    for attempt in 0..max_attempts {
        if placement.wall_count() >= target {
            break;
        }
        let anchor = candidates[attempt % candidates.len()].cell;
        if !placement.cell_ok(anchor) {
            continue;
        }

        let shape = ShapeKind::ALL[rng.below(ShapeKind::ALL.len() as u32) as usize];
        rng.shuffle(&mut order);
        for &variant in &order {
            let cells = shape.cells_at(variant, anchor);
            if placement.accepts(&cells) {
                placement.stamp(&cells);
                break;
            }
        }
    }
}

/// Anchors within `radius` of `center`, ring by ring, row-major in a ring
fn spiral(center: GridCoord, radius: i32) -> impl Iterator<Item = GridCoord> {
    (0..=radius).flat_map(move |r| {
        (-r..=r).flat_map(move |dy| {
            (-r..=r)
                .filter(move |&dx| dx.abs() == r || dy.abs() == r)
                .map(move |dx| center.offset(dx, dy))
        })
    })
}

/// Force plus-shaped clusters near `center` until `floor` walls exist.
///
/// Only occupied, carved, blocked or out-of-bounds cells are skipped; the
/// buffer and corridor-width rules do not apply here. A cluster may come out
/// partial.
pub fn place_fallback(placement: &mut Placement<'_>, center: GridCoord, floor: usize, radius: i32) {
    for anchor in spiral(center, radius) {
        if placement.wall_count() >= floor {
            break;
        }
        for (dx, dy) in PLUS {
            let cell = anchor.offset(dx, dy);
            if placement.cell_ok(cell) {
                placement.stamp(&[cell]);
            }
        }
    }
}
