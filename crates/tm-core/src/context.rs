//! World generation context
//!
//! Everything one world needs to lay out its maps: the seed, the options,
//! the door registry, the occupancy grid of the map currently entered, the
//! per-session layout cache and the current map's terrain zones. The context
//! is owned by the caller and every mutating call takes `&mut self`.

use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use thiserror::Error;

use crate::door::{DoorLayout, DoorRegistry, EdgeEntranceResolver, MapId};
use crate::grid::{GridCoord, GridModel};
use crate::maze::{BiomeHint, LayoutCache, MazeGenerator, MazeLayout, Styler};
use crate::options::GenOptions;
use crate::terrain::{self, Decoration, TerrainKind, TerrainZone, TerrainZonePlacer, ZoneShape};

/// Generation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenError {
    #[error("unknown map: {0}")]
    UnknownMap(MapId),
}

pub struct WorldGenContext {
    world_seed: u32,
    options: GenOptions,
    registry: DoorRegistry,
    grid: GridModel,
    current_map: Option<MapId>,
    doors: DoorLayout,
    cache: LayoutCache,
    /// Walls placed during the current visit and whether they came from the cache
    visit_walls: Option<(Vec<GridCoord>, bool)>,
    zones: Vec<TerrainZone>,
}

impl WorldGenContext {
    pub fn new(world_seed: u32, registry: DoorRegistry) -> Self {
        Self::with_options(world_seed, registry, GenOptions::default())
    }

    pub fn with_options(world_seed: u32, registry: DoorRegistry, options: GenOptions) -> Self {
        Self {
            world_seed,
            options,
            registry,
            grid: GridModel::default(),
            current_map: None,
            doors: DoorLayout::default(),
            cache: LayoutCache::new(),
            visit_walls: None,
            zones: Vec::new(),
        }
    }

    pub fn world_seed(&self) -> u32 {
        self.world_seed
    }

    pub fn options(&self) -> &GenOptions {
        &self.options
    }

    pub fn registry(&self) -> &DoorRegistry {
        &self.registry
    }

    /// Mutable registry access, e.g. to move a door between visits
    pub fn registry_mut(&mut self) -> &mut DoorRegistry {
        &mut self.registry
    }

    pub fn grid(&self) -> &GridModel {
        &self.grid
    }

    pub fn current_map(&self) -> Option<&MapId> {
        self.current_map.as_ref()
    }

    /// Resolved doors of the current map
    pub fn door_layout(&self) -> &DoorLayout {
        &self.doors
    }

    /// Reset the grid to bare dimensions, leaving no map entered.
    pub fn initialize_grid(&mut self, map_px: (u32, u32), cell_size: u32) {
        self.grid.initialize(map_px, cell_size);
        self.current_map = None;
        self.doors = DoorLayout::default();
        self.visit_walls = None;
        self.zones.clear();
    }

    pub fn is_cell_available(&self, x: i32, y: i32) -> bool {
        self.grid.is_available(x, y)
    }

    pub fn occupy_cell(&mut self, x: i32, y: i32) -> bool {
        self.grid.occupy(x, y)
    }

    pub fn grid_to_world(&self, x: i32, y: i32) -> (f32, f32) {
        self.grid.grid_to_world(x, y)
    }

    pub fn world_to_grid(&self, px: f32, py: f32) -> (i32, i32) {
        self.grid.world_to_grid(px, py)
    }

    fn resolve(&self, map_id: &MapId) -> Result<DoorLayout, GenError> {
        EdgeEntranceResolver::new(&self.registry, &self.options)
            .resolve(map_id)
            .ok_or_else(|| GenError::UnknownMap(map_id.clone()))
    }

    /// Start a visit: fresh grid sized from the descriptor, doors resolved,
    /// building door cells inside the map occupied.
    pub fn enter_map(&mut self, map_id: &MapId) -> Result<(), GenError> {
        let map = self
            .registry
            .get(map_id)
            .ok_or_else(|| GenError::UnknownMap(map_id.clone()))?;
        let px = map.px_dims();
        let cell_size = map.cell_size;
        let doors = self.resolve(map_id)?;

        self.initialize_grid(px, cell_size);
        for door in doors.doors.iter().filter(|d| d.door_type.is_building()) {
            self.grid.occupy(door.anchor.x, door.anchor.y);
        }
        log::debug!(
            "entered {} ({}x{} cells, {} doors)",
            map_id,
            self.grid.width(),
            self.grid.height(),
            doors.doors.len()
        );
        self.doors = doors;
        self.current_map = Some(map_id.clone());
        Ok(())
    }

    /// Obstacle layout for `map_id`, entering the map first if needed.
    ///
    /// The first visit in a session generates and caches the layout; later
    /// visits replay the cached cells. Calling this twice during one visit
    /// returns the walls already placed.
    pub fn generate_maze(&mut self, map_id: &MapId, biome: BiomeHint) -> Result<MazeLayout, GenError> {
        if self.current_map.as_ref() != Some(map_id) {
            self.enter_map(map_id)?;
        }
        let styler = Styler::new(self.world_seed, map_id, biome);

        if let Some((walls, replayed)) = &self.visit_walls {
            return Ok(MazeLayout::styled(map_id.clone(), walls, &styler, *replayed));
        }

        let (walls, replayed) = match self.cache.replay(map_id, &self.doors.clearance, &mut self.grid) {
            Some(walls) => (walls, true),
            None => {
                let walls = MazeGenerator::new(self.world_seed, &self.options)
                    .generate(&mut self.grid, &self.doors);
                self.cache.insert(map_id.clone(), walls.clone());
                (walls, false)
            }
        };

        let layout = MazeLayout::styled(map_id.clone(), &walls, &styler, replayed);
        self.visit_walls = Some((walls, replayed));
        Ok(layout)
    }

    /// Open boundary cells of a map's doors and edge-entrances
    pub fn open_edge_cells(&self, map_id: &MapId) -> Result<BTreeSet<GridCoord>, GenError> {
        Ok(self.resolve(map_id)?.open_cells())
    }

    /// Cells of a map where obstacles may never go
    pub fn door_clearance_cells(&self, map_id: &MapId) -> Result<BTreeSet<GridCoord>, GenError> {
        Ok(self.resolve(map_id)?.clearance_sorted())
    }

    /// Place a terrain zone on the current map.
    ///
    /// Returns `None` and changes nothing if the zone does not fit.
    pub fn place_terrain_zone<R: Rng>(
        &mut self,
        shape: &ZoneShape,
        kind: TerrainKind,
        slow_factor: f32,
        rng: &mut R,
    ) -> Option<TerrainZone> {
        let zone = TerrainZonePlacer::new(&self.grid, &self.doors.clearance, &self.zones, self.options.max_tails)
            .place(shape, kind, slow_factor, rng)?;
        self.zones.push(zone.clone());
        Some(zone)
    }

    pub fn terrain_zones(&self) -> &[TerrainZone] {
        &self.zones
    }

    /// Movement multiplier at a cell of the current map
    pub fn movement_factor(&self, x: i32, y: i32) -> f32 {
        terrain::movement_factor(&self.zones, GridCoord::new(x, y))
    }

    /// Pick up to `count` free cells of the current map for decoration
    pub fn scatter_decorations<R: Rng>(&self, count: usize, rng: &mut R) -> Vec<Decoration> {
        TerrainZonePlacer::new(&self.grid, &self.doors.clearance, &self.zones, self.options.max_tails)
            .scatter(count, rng)
    }

    /// Every cached wall list, for the save system
    pub fn cached_layouts(&self) -> BTreeMap<MapId, Vec<GridCoord>> {
        self.cache.snapshot()
    }

    /// Replace the layout cache with saved wall lists
    pub fn restore_layouts(&mut self, layouts: BTreeMap<MapId, Vec<GridCoord>>) {
        self.cache.restore(layouts);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::door::{DoorDescriptor, DoorType, MapDescriptor, MapKind};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn world() -> DoorRegistry {
        let town = MapDescriptor::with_cells("town", MapKind::Overworld, 24, 18, 16)
            .with_door(
                DoorDescriptor::new("shop", DoorType::BuildingEntrance, GridCoord::new(8, 6))
                    .linked_to("shop", "out"),
            )
            .with_door(DoorDescriptor::new("n", DoorType::EdgeNorth, GridCoord::new(12, 0)));
        let shop = MapDescriptor::with_cells("shop", MapKind::Building, 12, 10, 16).with_door(
            DoorDescriptor::new("out", DoorType::BuildingExit, GridCoord::new(6, 8)).linked_to("town", "shop"),
        );
        DoorRegistry::from_maps([town, shop])
    }

    #[test]
    fn test_unknown_map() {
        let mut ctx = WorldGenContext::new(1, world());
        let id = MapId::from("nowhere");
        assert_eq!(
            ctx.generate_maze(&id, BiomeHint::Meadow),
            Err(GenError::UnknownMap(id.clone()))
        );
        assert!(ctx.open_edge_cells(&id).is_err());
        assert!(ctx.current_map().is_none());
    }

    #[test]
    fn test_enter_map_occupies_building_doors() {
        let mut ctx = WorldGenContext::new(1, world());
        ctx.enter_map(&MapId::from("town")).unwrap();
        assert_eq!(ctx.grid().width(), 24);
        assert!(!ctx.is_cell_available(8, 6));
        assert_eq!(ctx.grid().occupied_count(), 1);
    }

    #[test]
    fn test_second_call_in_same_visit_returns_same_walls() {
        let mut ctx = WorldGenContext::new(5, world());
        let id = MapId::from("town");
        let first = ctx.generate_maze(&id, BiomeHint::Meadow).unwrap();
        let second = ctx.generate_maze(&id, BiomeHint::Meadow).unwrap();
        assert!(!first.replayed);
        assert!(!second.replayed);
        assert_eq!(first.cells, second.cells);
    }

    #[test]
    fn test_revisit_replays_cache() {
        let mut ctx = WorldGenContext::new(5, world());
        let town = MapId::from("town");
        let first = ctx.generate_maze(&town, BiomeHint::Meadow).unwrap();
        ctx.generate_maze(&MapId::from("shop"), BiomeHint::Interior).unwrap();
        let again = ctx.generate_maze(&town, BiomeHint::Meadow).unwrap();
        assert!(again.replayed);
        assert_eq!(first.cells, again.cells);
        assert_eq!(ctx.cached_layouts().len(), 2);
        // Still a replay when asked again during the same visit
        assert!(ctx.generate_maze(&town, BiomeHint::Meadow).unwrap().replayed);
    }

    #[test]
    fn test_walls_avoid_door_clearance() {
        let mut ctx = WorldGenContext::new(8, world());
        let town = MapId::from("town");
        let layout = ctx.generate_maze(&town, BiomeHint::Forest).unwrap();
        let clearance = ctx.door_clearance_cells(&town).unwrap();
        assert!(layout.cells.iter().all(|c| !clearance.contains(&c.cell)));
        assert!(clearance.contains(&GridCoord::new(8, 8)));
        assert_eq!(ctx.open_edge_cells(&town).unwrap().len(), 3);
    }

    #[test]
    fn test_terrain_zone_on_current_map() {
        let mut ctx = WorldGenContext::new(3, world());
        ctx.enter_map(&MapId::from("town")).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let shape = ZoneShape::Rect(crate::grid::GridRect::new(15, 10, 17, 12));
        let zone = ctx
            .place_terrain_zone(&shape, TerrainKind::Marsh, 0.5, &mut rng)
            .unwrap();
        assert_eq!(zone.len(), 9);
        assert_eq!(ctx.movement_factor(16, 11), 0.5);
        assert_eq!(ctx.movement_factor(3, 3), 1.0);
        assert!(ctx.is_cell_available(16, 11));
        // Same cells again overlap the first zone
        assert!(ctx.place_terrain_zone(&shape, TerrainKind::Marsh, 0.5, &mut rng).is_none());

        let decos = ctx.scatter_decorations(5, &mut rng);
        assert_eq!(decos.len(), 5);
        assert!(decos.iter().all(|d| !zone.contains(d.cell)));
    }

    #[test]
    fn test_restore_layouts_replays_saved_walls() {
        let mut ctx = WorldGenContext::new(2, world());
        let town = MapId::from("town");
        let walls = vec![GridCoord::new(4, 4), GridCoord::new(5, 4)];
        ctx.restore_layouts(BTreeMap::from([(town.clone(), walls.clone())]));
        let layout = ctx.generate_maze(&town, BiomeHint::Meadow).unwrap();
        assert!(layout.replayed);
        assert_eq!(layout.coords(), walls);
    }
}
