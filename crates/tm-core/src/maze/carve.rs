//! Corridor carving
//!
//! Randomized Prim's algorithm over the odd-parity lattice: only cells with
//! both coordinates odd are graph nodes, and edges join nodes two cells apart
//! in a cardinal direction. Carving an edge carves its midpoint too, so the
//! result is a connected, loop-free corridor skeleton with a wall-eligible
//! cell between any two parallel corridors.

use hashbrown::HashSet;
use tm_rng::RngStream;

use crate::door::ResolvedDoor;
use crate::grid::{Direction, GridCoord, GridModel, GridRect};

/// Snap `v` to the nearest odd value in `[lo, hi]`.
///
/// Even values round down when that stays in range, otherwise up; the result
/// never exceeds the largest odd value not above `hi`.
pub fn snap_odd(v: i32, lo: i32, hi: i32) -> i32 {
    let top = if hi & 1 == 1 { hi } else { hi - 1 };
    let snapped = if v & 1 == 1 {
        v
    } else if v - 1 >= lo {
        v - 1
    } else {
        v + 1
    };
    snapped.min(top)
}

/// Nearest carve node to `c` inside `interior`
pub fn snap_to_node(c: GridCoord, interior: &GridRect) -> GridCoord {
    let c = interior.clamp(c);
    GridCoord::new(
        snap_odd(c.x, interior.lx, interior.hx),
        snap_odd(c.y, interior.ly, interior.hy),
    )
}

/// Carved corridor skeleton of one map
#[derive(Debug, Clone, Default)]
pub struct Carving {
    pub cells: HashSet<GridCoord>,
    /// Carve nodes the skeleton grew from, in door order
    pub roots: Vec<GridCoord>,
}

impl Carving {
    pub fn contains(&self, c: GridCoord) -> bool {
        self.cells.contains(&c)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn carve(&mut self, grid: &GridModel, c: GridCoord) {
        if !grid.is_occupied(c) {
            self.cells.insert(c);
        }
    }
}

/// Seed the skeleton from every door, then grow it with Prim's algorithm.
///
/// With no doors the skeleton grows from the interior center.
pub fn carve(
    grid: &GridModel,
    interior: &GridRect,
    doors: &[ResolvedDoor],
    rng: &mut RngStream,
) -> Carving {
    let mut carving = Carving::default();

    for door in doors {
        let inward = interior.clamp(door.inward_cell());
        let node = snap_to_node(inward, interior);
        // Stub from the doorway to its node: inward cell, corner, node
        carving.carve(grid, inward);
        carving.carve(grid, GridCoord::new(node.x, inward.y));
        carving.carve(grid, node);
        // A blocked node cannot grow anything
        if carving.contains(node) && !carving.roots.contains(&node) {
            carving.roots.push(node);
        }
    }

    if carving.roots.is_empty() {
        let node = snap_to_node(interior.center(), interior);
        carving.carve(grid, node);
        if carving.contains(node) {
            carving.roots.push(node);
        }
    }

    let mut frontier: Vec<(GridCoord, GridCoord)> = Vec::new();
    for root in carving.roots.clone() {
        push_edges(&mut frontier, grid, interior, &carving, root);
    }

    while !frontier.is_empty() {
        let idx = rng.below(frontier.len() as u32) as usize;
        let (from, to) = frontier.swap_remove(idx);
        if carving.contains(to) {
            continue;
        }
        let mid = GridCoord::new((from.x + to.x) / 2, (from.y + to.y) / 2);
        if grid.is_occupied(mid) || grid.is_occupied(to) {
            continue;
        }
        carving.cells.insert(mid);
        carving.cells.insert(to);
        push_edges(&mut frontier, grid, interior, &carving, to);
    }

    carving
}

fn push_edges(
    frontier: &mut Vec<(GridCoord, GridCoord)>,
    grid: &GridModel,
    interior: &GridRect,
    carving: &Carving,
    from: GridCoord,
) {
    for dir in Direction::ALL {
        let to = from.step(dir, 2);
        if interior.contains(to) && !carving.contains(to) && !grid.is_occupied(to) {
            frontier.push((from, to));
        }
    }
}
