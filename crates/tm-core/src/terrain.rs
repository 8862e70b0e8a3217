//! Terrain zones
//!
//! Terrain is a property layer on top of the occupancy grid: zone cells stay
//! walkable and are never occupied, they only slow movement down (or, for
//! decorative zones, just look different).

use hashbrown::HashSet;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::grid::{Direction, GridCoord, GridModel, GridRect};

/// Terrain kind
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TerrainKind {
    Marsh,
    Quicksand,
    /// Visual only, never slows movement
    Decorative,
}

/// Footprint requested for a zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneShape {
    Rect(GridRect),
    Cells(Vec<GridCoord>),
    /// Rectangle with a few random tails sticking out of its border
    OrganicRect(GridRect),
}

/// A placed terrain zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainZone {
    pub kind: TerrainKind,
    /// Movement multiplier in (0, 1]
    pub slow_factor: f32,
    /// Every cell of the zone, tails included
    pub cells: Vec<GridCoord>,
    /// Tail cells added to an organic rectangle
    #[serde(default)]
    pub tails: Vec<GridCoord>,
}

impl TerrainZone {
    pub fn contains(&self, c: GridCoord) -> bool {
        self.cells.contains(&c)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Purely visual scatter on free ground
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decoration {
    pub cell: GridCoord,
    pub variant: u8,
}

/// Checks and builds terrain zones for the current map
pub struct TerrainZonePlacer<'a> {
    grid: &'a GridModel,
    clearance: &'a HashSet<GridCoord>,
    zones: &'a [TerrainZone],
    max_tails: u32,
}

impl<'a> TerrainZonePlacer<'a> {
    pub fn new(
        grid: &'a GridModel,
        clearance: &'a HashSet<GridCoord>,
        zones: &'a [TerrainZone],
        max_tails: u32,
    ) -> Self {
        Self {
            grid,
            clearance,
            zones,
            max_tails,
        }
    }

    /// Free, outside door clearance and not part of another zone
    pub fn cell_ok(&self, c: GridCoord) -> bool {
        self.grid.is_available(c.x, c.y)
            && !self.clearance.contains(&c)
            && !self.zones.iter().any(|z| z.contains(c))
    }

    /// Build a zone, or `None` if any requested cell is unusable.
    ///
    /// Decorative zones always get a slow factor of 1.0; otherwise the factor
    /// must lie in (0, 1].
    pub fn place<R: Rng>(
        &self,
        shape: &ZoneShape,
        kind: TerrainKind,
        slow_factor: f32,
        rng: &mut R,
    ) -> Option<TerrainZone> {
        let slow_factor = if kind == TerrainKind::Decorative {
            1.0
        } else {
            slow_factor
        };
        if !(slow_factor > 0.0 && slow_factor <= 1.0) {
            return None;
        }

        let mut cells: Vec<GridCoord> = match shape {
            ZoneShape::Rect(rect) | ZoneShape::OrganicRect(rect) => rect.cells().collect(),
            ZoneShape::Cells(cells) => {
                let mut seen = HashSet::new();
                cells.iter().copied().filter(|c| seen.insert(*c)).collect()
            }
        };
        if cells.is_empty() || !cells.iter().all(|&c| self.cell_ok(c)) {
            return None;
        }

        let mut tails = Vec::new();
        if let ZoneShape::OrganicRect(rect) = shape {
            tails = self.grow_tails(rect, rng);
            cells.extend_from_slice(&tails);
        }

        Some(TerrainZone {
            kind,
            slow_factor,
            cells,
            tails,
        })
    }

    /// Attach 1..=max_tails tail cells in runs of one or two, growing outward
    /// from the border.
    fn grow_tails<R: Rng>(&self, rect: &GridRect, rng: &mut R) -> Vec<GridCoord> {
        let border = rect.border();
        let mut tails: Vec<GridCoord> = Vec::new();
        let wanted = rng.gen_range(1..=self.max_tails.max(1)) as usize;

        let mut attempts = 0;
        while tails.len() < wanted && attempts < wanted * 4 {
            attempts += 1;
            let Some(&start) = border.choose(rng) else {
                break;
            };
            let outward = outward_dirs(rect, start);
            let Some(&dir) = outward.choose(rng) else {
                continue;
            };
            let len = rng.gen_range(1..=2);

            for n in 1..=len {
                let c = start.step(dir, n);
                if tails.len() >= wanted || !self.cell_ok(c) || tails.contains(&c) {
                    break;
                }
                tails.push(c);
            }
        }

        if tails.is_empty() {
            // First legal outward neighbour in border order
            if let Some(c) = border.iter().find_map(|&b| {
                outward_dirs(rect, b)
                    .into_iter()
                    .map(|d| b.step(d, 1))
                    .find(|&c| self.cell_ok(c))
            }) {
                tails.push(c);
            }
        }
        tails
    }

    /// Free cells outside clearance and every zone, chosen at random
    pub fn scatter<R: Rng>(&self, count: usize, rng: &mut R) -> Vec<Decoration> {
        let free: Vec<GridCoord> = self
            .grid
            .free_cells(self.clearance)
            .into_iter()
            .filter(|c| !self.zones.iter().any(|z| z.contains(*c)))
            .collect();
        free.choose_multiple(rng, count)
            .map(|&cell| Decoration {
                cell,
                variant: rng.gen_range(0..4),
            })
            .collect()
    }
}

/// Directions leading out of `rect` from one of its border cells
fn outward_dirs(rect: &GridRect, c: GridCoord) -> Vec<Direction> {
    Direction::ALL
        .into_iter()
        .filter(|&d| !rect.contains(c.step(d, 1)))
        .collect()
}

/// Movement multiplier at a cell: the slowest zone covering it, else 1.0
pub fn movement_factor(zones: &[TerrainZone], c: GridCoord) -> f32 {
    zones
        .iter()
        .filter(|z| z.contains(c))
        .map(|z| z.slow_factor)
        .fold(1.0, f32::min)
}
