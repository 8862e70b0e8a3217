//! Doors and edge-entrances
//!
//! Static descriptors, the cross-map registry and the geometry resolver that
//! decides which boundary cells stay open and which cells stay clear.

mod registry;
mod resolver;
mod types;

pub use registry::{DoorRegistry, RegistryIssue};
pub use resolver::{DoorLayout, EdgeEntranceResolver, ResolvedDoor};
pub use types::{DoorDescriptor, DoorLink, DoorType, MapDescriptor, MapId, MapKind};
