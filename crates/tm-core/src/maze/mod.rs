//! Maze and obstacle generation
//!
//! A generation pass runs as a fixed sequence of stages, each a plain
//! function over explicit inputs:
//!
//! 1. bounds check ([`MazeGenerator::interior_for`])
//! 2. seeding and carving ([`carve::carve`])
//! 3. wall candidates ([`placement::enumerate_candidates`])
//! 4. door clearance, taken from the resolved [`DoorLayout`]
//! 5. shape placement ([`placement::place_shapes`])
//! 6. fallback cluster ([`placement::place_fallback`])
//!
//! Caching and replay live in [`cache::LayoutCache`]; the
//! [`crate::WorldGenContext`] decides which of the two paths a visit takes.
//!
//! All draws come from the `maze` stream of the map, so a fresh pass over the
//! same grid and doors is fully reproducible.

pub mod cache;
pub mod carve;
pub mod placement;
pub mod shapes;
pub mod style;

use serde::{Deserialize, Serialize};
use tm_rng::RngStream;

use crate::consts::{FALLBACK_SEARCH_RADIUS, NS_MAZE};
use crate::door::{DoorLayout, MapId};
use crate::grid::{GridCoord, GridModel, GridRect};
use crate::options::GenOptions;

pub use cache::LayoutCache;
pub use style::{BiomeHint, ObstacleKind, StyleHint, Styler};

use placement::Placement;

/// One obstacle cell handed to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MazeCell {
    pub cell: GridCoord,
    pub style: StyleHint,
}

/// Obstacle layout of one map, in placement order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MazeLayout {
    pub map_id: MapId,
    pub cells: Vec<MazeCell>,
    /// True if the layout came from the cache rather than a fresh pass
    #[serde(default)]
    pub replayed: bool,
}

impl MazeLayout {
    /// Attach styles to a list of wall cells
    pub fn styled(map_id: MapId, walls: &[GridCoord], styler: &Styler, replayed: bool) -> Self {
        Self {
            map_id,
            cells: walls
                .iter()
                .map(|&cell| MazeCell {
                    cell,
                    style: styler.style(cell),
                })
                .collect(),
            replayed,
        }
    }

    pub fn coords(&self) -> Vec<GridCoord> {
        self.cells.iter().map(|c| c.cell).collect()
    }

    pub fn contains(&self, c: GridCoord) -> bool {
        self.cells.iter().any(|m| m.cell == c)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Runs fresh generation passes for one world
#[derive(Debug, Clone, Copy)]
pub struct MazeGenerator<'a> {
    world_seed: u32,
    options: &'a GenOptions,
}

impl<'a> MazeGenerator<'a> {
    pub fn new(world_seed: u32, options: &'a GenOptions) -> Self {
        Self {
            world_seed,
            options,
        }
    }

    /// Interior to carve, or `None` if it is too small
    pub fn interior_for(&self, grid: &GridModel) -> Option<GridRect> {
        let interior = grid.interior()?;
        let min = self.options.min_interior;
        (interior.width() >= min && interior.height() >= min).then_some(interior)
    }

    /// Generate walls for the map described by `doors` and stamp them into
    /// `grid`. Returns the walls in placement order.
    pub fn generate(&self, grid: &mut GridModel, doors: &DoorLayout) -> Vec<GridCoord> {
        let Some(interior) = self.interior_for(grid) else {
            log::debug!(
                "{}: interior of {}x{} too small, no obstacles",
                doors.map_id,
                grid.width(),
                grid.height()
            );
            return Vec::new();
        };

        let mut rng = RngStream::stream_for(self.world_seed, NS_MAZE, doors.map_id.as_str());

        let carving = carve::carve(grid, &interior, &doors.doors, &mut rng);
        let candidates: Vec<_> = placement::enumerate_candidates(grid, &interior, &carving, &mut rng)
            .into_iter()
            .filter(|c| !doors.clearance.contains(&c.cell))
            .collect();

        let target = self.options.wall_target(interior.area());
        let max_attempts = candidates.len() * self.options.attempt_factor;

        let mut placement = Placement::new(grid, &carving, &doors.clearance, self.options.safe_margin);
        placement::place_shapes(&mut placement, &candidates, target, max_attempts, &mut rng);
        let shaped = placement.wall_count();

        if self.options.fallback && placement.wall_count() < self.options.fallback_floor {
            placement::place_fallback(
                &mut placement,
                interior.center(),
                self.options.fallback_floor,
                FALLBACK_SEARCH_RADIUS,
            );
        }

        let walls = placement.into_walls();
        log::debug!(
            "{}: carved {} cells, {} candidates, {}/{} walls ({} from fallback), {} draws",
            doors.map_id,
            carving.len(),
            candidates.len(),
            walls.len(),
            target,
            walls.len() - shaped,
            rng.draw_count()
        );
        walls
    }
}
