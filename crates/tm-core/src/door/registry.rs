//! Door registry
//!
//! Holds every map's static descriptor so doors can be followed across map
//! boundaries. Links are not required to be consistent; [`DoorRegistry::validate`]
//! reports problems without refusing to load.

use hashbrown::HashMap;
use thiserror::Error;

use super::resolver::{clamp_anchor, inward_direction};
use super::types::{DoorDescriptor, MapDescriptor, MapId};
use crate::grid::{GridCoord, GridRect};

/// A problem found in static door data. None of these are fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryIssue {
    #[error("door {door} on {map} links to unknown map {target_map}")]
    DanglingMap {
        map: MapId,
        door: String,
        target_map: MapId,
    },

    #[error("door {door} on {map} links to unknown door {target_door} on {target_map}")]
    DanglingDoor {
        map: MapId,
        door: String,
        target_map: MapId,
        target_door: String,
    },

    #[error("door {door} on {map} links to {target_map}/{target_door}, which does not link back")]
    OneWayLink {
        map: MapId,
        door: String,
        target_map: MapId,
        target_door: String,
    },

    #[error("door {door} on {map} is a {door_type} but its partner is a {partner_type}")]
    MismatchedPair {
        map: MapId,
        door: String,
        door_type: String,
        partner_type: String,
    },

    #[error("map {map} has more than one door called {door}")]
    DuplicateDoor { map: MapId, door: String },
}

/// Static per-map door definitions
#[derive(Debug, Clone, Default)]
pub struct DoorRegistry {
    maps: HashMap<MapId, MapDescriptor>,
}

impl DoorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_maps(maps: impl IntoIterator<Item = MapDescriptor>) -> Self {
        let mut registry = Self::new();
        for map in maps {
            registry.insert(map);
        }
        registry
    }

    /// Add or replace a map. Returns the previous descriptor, if any.
    pub fn insert(&mut self, map: MapDescriptor) -> Option<MapDescriptor> {
        self.maps.insert(map.id.clone(), map)
    }

    pub fn get(&self, map: &MapId) -> Option<&MapDescriptor> {
        self.maps.get(map)
    }

    pub fn get_mut(&mut self, map: &MapId) -> Option<&mut MapDescriptor> {
        self.maps.get_mut(map)
    }

    pub fn contains(&self, map: &MapId) -> bool {
        self.maps.contains_key(map)
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    /// Map ids in sorted order
    pub fn map_ids(&self) -> Vec<&MapId> {
        let mut ids: Vec<_> = self.maps.keys().collect();
        ids.sort();
        ids
    }

    pub fn door(&self, map: &MapId, door: &str) -> Option<&DoorDescriptor> {
        self.maps.get(map)?.door(door)
    }

    /// The map and door on the far side of a door's link
    pub fn linked_door(&self, map: &MapId, door: &str) -> Option<(&MapDescriptor, &DoorDescriptor)> {
        let link = self.door(map, door)?.link.as_ref()?;
        let target = self.maps.get(&link.target_map)?;
        let target_door = target.door(&link.target_door)?;
        Some((target, target_door))
    }

    /// Interior cell a traveller steps onto when arriving through `door`
    pub fn arrival_cell(&self, map: &MapId, door: &str) -> Option<GridCoord> {
        let desc = self.maps.get(map)?;
        let door = desc.door(door)?;
        let (width, height) = desc.cell_dims();
        let interior = GridRect::new(1, 1, width - 2, height - 2);
        if !interior.is_valid() {
            return None;
        }
        let (anchor, _) = clamp_anchor(door, width, height);
        let inward = inward_direction(door.door_type, anchor, width, height);
        Some(interior.clamp(anchor.step(inward, 1)))
    }

    /// Check every link, in sorted map order.
    pub fn validate(&self) -> Vec<RegistryIssue> {
        let mut issues = Vec::new();

        for id in self.map_ids() {
            let map = &self.maps[id];

            let mut seen: Vec<&str> = Vec::new();
            for door in &map.doors {
                if seen.contains(&door.id.as_str()) {
                    issues.push(RegistryIssue::DuplicateDoor {
                        map: id.clone(),
                        door: door.id.clone(),
                    });
                }
                seen.push(&door.id);

                let Some(link) = &door.link else {
                    continue;
                };
                let Some(target) = self.maps.get(&link.target_map) else {
                    issues.push(RegistryIssue::DanglingMap {
                        map: id.clone(),
                        door: door.id.clone(),
                        target_map: link.target_map.clone(),
                    });
                    continue;
                };
                let Some(partner) = target.door(&link.target_door) else {
                    issues.push(RegistryIssue::DanglingDoor {
                        map: id.clone(),
                        door: door.id.clone(),
                        target_map: link.target_map.clone(),
                        target_door: link.target_door.clone(),
                    });
                    continue;
                };

                let links_back = partner
                    .link
                    .as_ref()
                    .is_some_and(|back| back.target_map == *id && back.target_door == door.id);
                if !links_back {
                    issues.push(RegistryIssue::OneWayLink {
                        map: id.clone(),
                        door: door.id.clone(),
                        target_map: link.target_map.clone(),
                        target_door: link.target_door.clone(),
                    });
                }

                if partner.door_type != door.door_type.counterpart() {
                    issues.push(RegistryIssue::MismatchedPair {
                        map: id.clone(),
                        door: door.id.clone(),
                        door_type: door.door_type.to_string(),
                        partner_type: partner.door_type.to_string(),
                    });
                }
            }
        }

        issues
    }
}
