//! tm-core: Map tile layout generation
//!
//! Lays out the walkable structure of each map tile in a 2D world: the
//! occupancy grid, door and edge-entrance geometry, carved corridors with
//! shape-based obstacles, and walkable terrain zones on top.
//!
//! Layouts are deterministic per (world seed, map id). Nothing here renders
//! anything; obstacles and zones come back as plain coordinate records.

pub mod door;
pub mod grid;
pub mod maze;
pub mod options;
pub mod terrain;

mod consts;
mod context;

pub use consts::*;
pub use context::{GenError, WorldGenContext};
pub use door::{DoorRegistry, MapDescriptor, MapId, MapKind};
pub use grid::{GridCoord, GridModel};
pub use maze::{BiomeHint, MazeLayout};
pub use options::GenOptions;
