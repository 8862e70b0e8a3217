//! Edge-entrance and door geometry
//!
//! Turns a map's door descriptors into the concrete cells that must stay open
//! along each edge and the clearance zone that obstacles may never enter.
//! Malformed anchors are clamped onto the nearest legal position and logged;
//! they never fail the map.

use std::collections::{BTreeMap, BTreeSet};

use hashbrown::HashSet;
use log::warn;

use super::registry::DoorRegistry;
use super::types::{DoorDescriptor, DoorType, MapDescriptor, MapId};
use crate::grid::{Direction, GridCoord};
use crate::options::GenOptions;

/// A door after clamping and half-width reconciliation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDoor {
    pub id: String,
    pub door_type: DoorType,
    /// Anchor after clamping onto its legal position
    pub anchor: GridCoord,
    /// Effective half-width
    pub half_width: u32,
    /// Direction pointing into the map
    pub inward: Direction,
    /// Boundary cells this door opens, possibly empty
    pub opening: Vec<GridCoord>,
}

impl ResolvedDoor {
    /// First cell inward of the anchor
    pub fn inward_cell(&self) -> GridCoord {
        self.anchor.step(self.inward, 1)
    }
}

/// Resolved door geometry of one map
#[derive(Debug, Clone, Default)]
pub struct DoorLayout {
    pub map_id: MapId,
    pub width: i32,
    pub height: i32,
    pub doors: Vec<ResolvedDoor>,
    /// Open positions along each edge (x for north/south, y for east/west)
    pub open: BTreeMap<Direction, BTreeSet<i32>>,
    /// Cells obstacles may never occupy
    pub clearance: HashSet<GridCoord>,
}

impl DoorLayout {
    /// Open boundary cells as coordinates
    pub fn open_cells(&self) -> BTreeSet<GridCoord> {
        self.open
            .iter()
            .flat_map(|(&edge, positions)| {
                positions
                    .iter()
                    .map(move |&p| edge_cell(edge, p, self.width, self.height))
            })
            .collect()
    }

    pub fn clearance_sorted(&self) -> BTreeSet<GridCoord> {
        self.clearance.iter().copied().collect()
    }

    pub fn is_blocked(&self, c: GridCoord) -> bool {
        self.clearance.contains(&c)
    }
}

/// Clamp `v` into `[lo, hi]`; an empty span collapses to `lo`.
pub(crate) fn clamp_span(v: i32, lo: i32, hi: i32) -> i32 {
    if hi < lo { lo } else { v.clamp(lo, hi) }
}

/// Cell at position `pos` along `edge`
fn edge_cell(edge: Direction, pos: i32, width: i32, height: i32) -> GridCoord {
    match edge {
        Direction::North => GridCoord::new(pos, 0),
        Direction::South => GridCoord::new(pos, height - 1),
        Direction::West => GridCoord::new(0, pos),
        Direction::East => GridCoord::new(width - 1, pos),
    }
}

/// Position of `c` along `edge`
fn along(edge: Direction, c: GridCoord) -> i32 {
    if edge.is_horizontal() { c.y } else { c.x }
}

fn edge_len(edge: Direction, width: i32, height: i32) -> i32 {
    if edge.is_horizontal() { height } else { width }
}

/// The legal position of a door anchor on a `width` x `height` map.
///
/// Edge doors are moved onto their edge, away from the corners; building
/// doors are kept inside the map. Returns whether the anchor moved.
pub(crate) fn clamp_anchor(door: &DoorDescriptor, width: i32, height: i32) -> (GridCoord, bool) {
    let a = door.anchor;
    let clamped = match door.door_type.edge() {
        Some(edge) => {
            let pos = clamp_span(along(edge, a), 1, edge_len(edge, width, height) - 2);
            edge_cell(edge, pos, width, height)
        }
        None => GridCoord::new(
            clamp_span(a.x, 0, width - 1),
            clamp_span(a.y, 0, height - 1),
        ),
    };
    (clamped, clamped != a)
}

/// Map edge closest to `c`. Ties prefer south, then north, west, east.
fn nearest_edge(c: GridCoord, width: i32, height: i32) -> Direction {
    let candidates = [
        (height - 1 - c.y, Direction::South),
        (c.y, Direction::North),
        (c.x, Direction::West),
        (width - 1 - c.x, Direction::East),
    ];
    let mut best = candidates[0];
    for cand in &candidates[1..] {
        if cand.0 < best.0 {
            best = *cand;
        }
    }
    best.1
}

/// Direction pointing into the map from a door
pub(crate) fn inward_direction(door_type: DoorType, anchor: GridCoord, width: i32, height: i32) -> Direction {
    match door_type {
        DoorType::EdgeNorth => Direction::South,
        DoorType::EdgeSouth => Direction::North,
        DoorType::EdgeEast => Direction::West,
        DoorType::EdgeWest => Direction::East,
        DoorType::BuildingExit => nearest_edge(anchor, width, height).opposite(),
        // Facades face the street below them
        DoorType::BuildingEntrance => Direction::South,
    }
}

/// Resolves door geometry against the registry
pub struct EdgeEntranceResolver<'a> {
    registry: &'a DoorRegistry,
    options: &'a GenOptions,
}

impl<'a> EdgeEntranceResolver<'a> {
    pub fn new(registry: &'a DoorRegistry, options: &'a GenOptions) -> Self {
        Self { registry, options }
    }

    /// Resolve a registered map; `None` if the id is unknown.
    pub fn resolve(&self, map_id: &MapId) -> Option<DoorLayout> {
        self.registry.get(map_id).map(|map| self.resolve_map(map))
    }

    /// Resolve a descriptor directly
    pub fn resolve_map(&self, map: &MapDescriptor) -> DoorLayout {
        let (width, height) = map.cell_dims();
        let mut layout = DoorLayout {
            map_id: map.id.clone(),
            width,
            height,
            ..Default::default()
        };

        for door in &map.doors {
            let resolved = self.resolve_door(map, door, width, height);

            if !resolved.opening.is_empty() {
                let edge = match door.door_type.edge() {
                    Some(edge) => edge,
                    None => nearest_edge(resolved.anchor, width, height),
                };
                let open = layout.open.entry(edge).or_default();
                for &c in &resolved.opening {
                    open.insert(along(edge, c));
                }
            }

            self.add_clearance(&mut layout, &resolved);
            layout.doors.push(resolved);
        }

        layout
    }

    fn resolve_door(&self, map: &MapDescriptor, door: &DoorDescriptor, width: i32, height: i32) -> ResolvedDoor {
        let (anchor, moved) = clamp_anchor(door, width, height);
        if moved {
            warn!(
                "door {} on {} anchored at {} is off its legal position, clamped to {}",
                door.id, map.id, door.anchor, anchor
            );
        }

        let inward = inward_direction(door.door_type, anchor, width, height);
        let half_width = self.effective_half_width(map, door);

        let opening = match door.door_type.edge() {
            Some(edge) => self.span(edge, anchor, half_width, width, height),
            None if on_boundary(anchor, width, height) => {
                let edge = nearest_edge(anchor, width, height);
                self.span(edge, anchor, half_width, width, height)
            }
            None => Vec::new(),
        };

        ResolvedDoor {
            id: door.id.clone(),
            door_type: door.door_type,
            anchor,
            half_width,
            inward,
            opening,
        }
    }

    /// Cells `anchor ± half_width` along `edge`, kept off the corners
    fn span(&self, edge: Direction, anchor: GridCoord, half_width: u32, width: i32, height: i32) -> Vec<GridCoord> {
        let len = edge_len(edge, width, height);
        let center = along(edge, anchor);
        let hw = half_width as i32;
        let lo = clamp_span(center - hw, 1, len - 2);
        let hi = clamp_span(center + hw, 1, len - 2);
        (lo..=hi).map(|p| edge_cell(edge, p, width, height)).collect()
    }

    fn add_clearance(&self, layout: &mut DoorLayout, door: &ResolvedDoor) {
        let depth = self.options.clearance_depth;
        let (w, h) = (layout.width, layout.height);
        let in_bounds = |c: GridCoord| c.x >= 0 && c.y >= 0 && c.x < w && c.y < h;

        if door.door_type.is_edge() {
            for &cell in &door.opening {
                for n in 0..=depth {
                    let c = cell.step(door.inward, n);
                    if in_bounds(c) {
                        layout.clearance.insert(c);
                    }
                }
            }
            return;
        }

        // Building doors reserve a three-wide band regardless of half-width
        let lateral = if door.inward.is_horizontal() {
            Direction::South
        } else {
            Direction::East
        };
        for n in 0..=depth {
            let row = door.anchor.step(door.inward, n);
            for side in -1..=1 {
                let c = row.step(lateral, side);
                if in_bounds(c) {
                    layout.clearance.insert(c);
                }
            }
        }
        for &cell in &door.opening {
            layout.clearance.insert(cell);
        }
    }

    /// `max(own, linked)`, each side floored at its own map kind's minimum.
    ///
    /// Building doors only use their own configured width.
    pub fn effective_half_width(&self, map: &MapDescriptor, door: &DoorDescriptor) -> u32 {
        let own = door
            .half_width
            .unwrap_or(0)
            .max(self.options.min_half_width(map.kind));
        if !door.door_type.is_edge() {
            return own;
        }

        let Some(link) = &door.link else {
            return own;
        };
        let linked = match self.registry.linked_door(&map.id, &door.id) {
            Some((target, partner)) => partner
                .half_width
                .unwrap_or(0)
                .max(self.options.min_half_width(target.kind)),
            None => {
                warn!(
                    "door {} on {} links to missing {}/{}",
                    door.id, map.id, link.target_map, link.target_door
                );
                0
            }
        };
        own.max(linked)
    }
}

fn on_boundary(c: GridCoord, width: i32, height: i32) -> bool {
    c.x == 0 || c.y == 0 || c.x == width - 1 || c.y == height - 1
}
