//! Map sets for the previewer: a JSON file or the built-in demo world.

use std::path::Path;

use anyhow::Context;
use tm_core::door::{DoorDescriptor, DoorType, MapDescriptor, MapKind};
use tm_core::{DoorRegistry, GridCoord};

/// Load a JSON array of map descriptors
pub fn load_maps(path: &Path) -> anyhow::Result<DoorRegistry> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    parse_maps(&text).with_context(|| format!("parsing {}", path.display()))
}

pub fn parse_maps(text: &str) -> anyhow::Result<DoorRegistry> {
    let maps: Vec<MapDescriptor> = serde_json::from_str(text)?;
    anyhow::ensure!(!maps.is_empty(), "no maps defined");

    let mut registry = DoorRegistry::new();
    for map in maps {
        let id = map.id.clone();
        anyhow::ensure!(registry.insert(map).is_none(), "map {id} defined twice");
    }
    Ok(registry)
}

/// Three linked maps: two overworld fields and an inn on the first one
pub fn demo_registry() -> DoorRegistry {
    let meadow = MapDescriptor::with_cells("meadow", MapKind::Overworld, 40, 24, 16)
        .with_door(
            DoorDescriptor::new("east", DoorType::EdgeEast, GridCoord::new(39, 11))
                .with_half_width(2)
                .linked_to("forest", "west"),
        )
        .with_door(DoorDescriptor::new("south", DoorType::EdgeSouth, GridCoord::new(12, 23)))
        .with_door(
            DoorDescriptor::new("inn_door", DoorType::BuildingEntrance, GridCoord::new(9, 6))
                .linked_to("inn", "exit"),
        );
    let forest = MapDescriptor::with_cells("forest", MapKind::Overworld, 40, 24, 16).with_door(
        DoorDescriptor::new("west", DoorType::EdgeWest, GridCoord::new(0, 11)).linked_to("meadow", "east"),
    );
    let inn = MapDescriptor::with_cells("inn", MapKind::Building, 16, 12, 16).with_door(
        DoorDescriptor::new("exit", DoorType::BuildingExit, GridCoord::new(8, 11)).linked_to("meadow", "inn_door"),
    );
    DoorRegistry::from_maps([meadow, forest, inn])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_registry_is_consistent() {
        let registry = demo_registry();
        assert_eq!(registry.len(), 3);
        assert!(registry.validate().is_empty(), "{:?}", registry.validate());
    }

    #[test]
    fn test_parse_maps() {
        let text = r#"[
            { "id": "a", "width_px": 320, "height_px": 160,
              "doors": [ { "id": "n", "type": "edge_north", "anchor": { "x": 10, "y": 0 } } ] },
            { "id": "b", "width_px": 160, "height_px": 160, "kind": "shop" }
        ]"#;
        let registry = parse_maps(text).unwrap();
        assert_eq!(registry.len(), 2);
        let a = registry.get(&"a".into()).unwrap();
        assert_eq!(a.cell_dims(), (20, 10));
        assert_eq!(a.doors.len(), 1);
        assert_eq!(registry.get(&"b".into()).unwrap().kind, MapKind::Building);
    }

    #[test]
    fn test_parse_rejects_duplicates_and_empty() {
        assert!(parse_maps("[]").is_err());
        let dup = r#"[{ "id": "a", "width_px": 160, "height_px": 160 },
                      { "id": "a", "width_px": 160, "height_px": 160 }]"#;
        assert!(parse_maps(dup).is_err());
    }
}
