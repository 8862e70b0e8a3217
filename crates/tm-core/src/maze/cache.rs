//! Per-world layout cache
//!
//! One wall list per map id, kept for the whole session and handed to the
//! save system on request. Cached layouts are replayed instead of being
//! generated again.

use std::collections::BTreeMap;

use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};

use crate::door::MapId;
use crate::grid::{GridCoord, GridModel};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutCache {
    layouts: HashMap<MapId, Vec<GridCoord>>,
}

impl LayoutCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, map: &MapId) -> Option<&[GridCoord]> {
        self.layouts.get(map).map(Vec::as_slice)
    }

    pub fn contains(&self, map: &MapId) -> bool {
        self.layouts.contains_key(map)
    }

    pub fn insert(&mut self, map: MapId, walls: Vec<GridCoord>) {
        self.layouts.insert(map, walls);
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }

    /// Copy of every cached layout in map id order
    pub fn snapshot(&self) -> BTreeMap<MapId, Vec<GridCoord>> {
        self.layouts
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Replace the cache contents with previously saved layouts
    pub fn restore(&mut self, layouts: impl IntoIterator<Item = (MapId, Vec<GridCoord>)>) {
        self.layouts = layouts.into_iter().collect();
    }

    /// Replay a cached layout onto `grid`.
    ///
    /// Cells inside `clearance` are dropped for good and the cache is
    /// overwritten with what is left. Cells currently occupied by something
    /// else are skipped for this visit only. Returns the cells actually
    /// placed, or `None` if nothing is cached for `map`.
    pub fn replay(
        &mut self,
        map: &MapId,
        clearance: &HashSet<GridCoord>,
        grid: &mut GridModel,
    ) -> Option<Vec<GridCoord>> {
        let cached = self.layouts.get_mut(map)?;
        let before = cached.len();
        cached.retain(|c| !clearance.contains(c));
        if cached.len() != before {
            log::debug!(
                "replay of {}: dropped {} walls now inside door clearance",
                map,
                before - cached.len()
            );
        }

        let placed = cached
            .iter()
            .copied()
            .filter(|c| grid.is_available(c.x, c.y))
            .collect::<Vec<_>>();
        for c in &placed {
            grid.occupy(c.x, c.y);
        }
        Some(placed)
    }
}
