//! Map and door descriptors
//!
//! Static per-map data, usually loaded from JSON alongside the rest of the
//! world definition.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::consts::DEFAULT_CELL_SIZE;
use crate::grid::{Direction, GridCoord};

/// Identifier of a map tile
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MapId(pub String);

impl MapId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MapId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl core::fmt::Display for MapId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Map kind; decides the minimum edge opening width
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MapKind {
    #[default]
    Overworld,
    /// Building or shop interior
    #[serde(alias = "shop")]
    #[strum(to_string = "building", serialize = "shop")]
    Building,
}

/// Door type
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DoorType {
    EdgeNorth,
    EdgeSouth,
    EdgeEast,
    EdgeWest,
    /// Door in a building facade, placed on the overworld
    BuildingEntrance,
    /// Way out of a building interior
    BuildingExit,
}

impl DoorType {
    /// The map edge an edge-entrance sits on
    pub const fn edge(self) -> Option<Direction> {
        match self {
            DoorType::EdgeNorth => Some(Direction::North),
            DoorType::EdgeSouth => Some(Direction::South),
            DoorType::EdgeEast => Some(Direction::East),
            DoorType::EdgeWest => Some(Direction::West),
            DoorType::BuildingEntrance | DoorType::BuildingExit => None,
        }
    }

    pub const fn is_edge(self) -> bool {
        self.edge().is_some()
    }

    pub const fn is_building(self) -> bool {
        matches!(self, DoorType::BuildingEntrance | DoorType::BuildingExit)
    }

    /// The door type expected on the far side of a link
    pub const fn counterpart(self) -> DoorType {
        match self {
            DoorType::EdgeNorth => DoorType::EdgeSouth,
            DoorType::EdgeSouth => DoorType::EdgeNorth,
            DoorType::EdgeEast => DoorType::EdgeWest,
            DoorType::EdgeWest => DoorType::EdgeEast,
            DoorType::BuildingEntrance => DoorType::BuildingExit,
            DoorType::BuildingExit => DoorType::BuildingEntrance,
        }
    }
}

/// Where a door leads
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DoorLink {
    pub target_map: MapId,
    pub target_door: String,
}

/// A door or edge-entrance on a map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoorDescriptor {
    pub id: String,
    #[serde(rename = "type")]
    pub door_type: DoorType,
    /// Door cell; for edge doors, the center of the opening
    pub anchor: GridCoord,
    /// Cells open on either side of the anchor
    #[serde(default)]
    pub half_width: Option<u32>,
    #[serde(default)]
    pub link: Option<DoorLink>,
}

impl DoorDescriptor {
    pub fn new(id: impl Into<String>, door_type: DoorType, anchor: GridCoord) -> Self {
        Self {
            id: id.into(),
            door_type,
            anchor,
            half_width: None,
            link: None,
        }
    }

    pub fn with_half_width(mut self, half_width: u32) -> Self {
        self.half_width = Some(half_width);
        self
    }

    pub fn linked_to(mut self, target_map: impl Into<String>, target_door: impl Into<String>) -> Self {
        self.link = Some(DoorLink {
            target_map: MapId::new(target_map),
            target_door: target_door.into(),
        });
        self
    }
}

fn default_cell_size() -> u32 {
    DEFAULT_CELL_SIZE
}

/// Static description of one map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapDescriptor {
    pub id: MapId,
    pub width_px: u32,
    pub height_px: u32,
    #[serde(default = "default_cell_size")]
    pub cell_size: u32,
    #[serde(default)]
    pub kind: MapKind,
    #[serde(default)]
    pub doors: Vec<DoorDescriptor>,
}

impl MapDescriptor {
    /// Descriptor sized in cells rather than pixels
    pub fn with_cells(id: impl Into<String>, kind: MapKind, width: u32, height: u32, cell_size: u32) -> Self {
        Self {
            id: MapId::new(id),
            width_px: width * cell_size,
            height_px: height * cell_size,
            cell_size,
            kind,
            doors: Vec::new(),
        }
    }

    pub fn with_door(mut self, door: DoorDescriptor) -> Self {
        self.doors.push(door);
        self
    }

    /// Pixel dimensions as a pair
    pub fn px_dims(&self) -> (u32, u32) {
        (self.width_px, self.height_px)
    }

    /// Dimensions in cells
    pub fn cell_dims(&self) -> (i32, i32) {
        let cs = self.cell_size.max(1);
        ((self.width_px / cs) as i32, (self.height_px / cs) as i32)
    }

    pub fn door(&self, id: &str) -> Option<&DoorDescriptor> {
        self.doors.iter().find(|d| d.id == id)
    }
}
