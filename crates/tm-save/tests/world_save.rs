//! Saving and restoring worlds on disk.

use std::path::PathBuf;

use tm_core::door::{DoorDescriptor, DoorType, MapDescriptor, MapKind};
use tm_core::{BiomeHint, DoorRegistry, GenOptions, GridCoord, MapId, WorldGenContext};
use tm_save::{SaveError, SaveHeader, WorldSave, list_saves_in, load_header, load_world, save_world};

fn registry() -> DoorRegistry {
    let meadow = MapDescriptor::with_cells("meadow", MapKind::Overworld, 24, 18, 16).with_door(
        DoorDescriptor::new("e", DoorType::EdgeEast, GridCoord::new(23, 9)).linked_to("marsh", "w"),
    );
    let marsh = MapDescriptor::with_cells("marsh", MapKind::Overworld, 24, 18, 16).with_door(
        DoorDescriptor::new("w", DoorType::EdgeWest, GridCoord::new(0, 9)).linked_to("meadow", "e"),
    );
    DoorRegistry::from_maps([meadow, marsh])
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("tilemaze_test_{}_{}.json", name, std::process::id()))
}

#[test]
fn test_save_and_load() {
    let path = temp_path("roundtrip");
    let meadow = MapId::from("meadow");

    let mut ctx = WorldGenContext::new(1234, registry());
    let first = ctx.generate_maze(&meadow, BiomeHint::Meadow).unwrap();
    ctx.generate_maze(&MapId::from("marsh"), BiomeHint::Forest).unwrap();
    save_world(&ctx, &path).unwrap();
    assert!(tm_save::save_exists(&path));

    let save = load_world(&path).unwrap();
    assert_eq!(save.world_seed, 1234);
    assert_eq!(save.header.maps, 2);
    assert_eq!(save.layouts[&meadow], first.coords());

    let mut restored = save.into_context(registry(), GenOptions::default());
    let again = restored.generate_maze(&meadow, BiomeHint::Meadow).unwrap();
    assert!(again.replayed);
    assert_eq!(again.cells, first.cells);

    tm_save::delete_save(&path).unwrap();
    assert!(!tm_save::save_exists(&path));
}

#[test]
fn test_header_only_load() {
    let path = temp_path("header");
    let ctx = WorldGenContext::new(7, registry());
    save_world(&ctx, &path).unwrap();

    let header = load_header(&path).unwrap();
    assert_eq!(header.world_seed, 7);
    assert_eq!(header.maps, 0);

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_rejects_foreign_and_future_files() {
    let path = temp_path("foreign");
    let mut save = WorldSave::from_context(&WorldGenContext::new(3, registry()));

    save.header.magic = "NOPE".to_string();
    std::fs::write(&path, serde_json::to_string(&save).unwrap()).unwrap();
    assert!(matches!(load_world(&path), Err(SaveError::InvalidHeader)));

    save.header = SaveHeader::new(3, 0);
    save.header.version = tm_save::SAVE_VERSION + 1;
    std::fs::write(&path, serde_json::to_string(&save).unwrap()).unwrap();
    assert!(matches!(load_world(&path), Err(SaveError::IncompatibleVersion { .. })));

    std::fs::write(&path, "{ not json").unwrap();
    assert!(matches!(load_world(&path), Err(SaveError::Serialization(_))));

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_list_saves_in_directory() {
    let dir = std::env::temp_dir().join(format!("tilemaze_test_saves_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    save_world(&WorldGenContext::new(1, registry()), dir.join("one.json")).unwrap();
    save_world(&WorldGenContext::new(2, registry()), dir.join("two.json")).unwrap();
    std::fs::write(dir.join("junk.json"), "[]").unwrap();
    std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

    let saves = list_saves_in(&dir).unwrap();
    let mut seeds: Vec<_> = saves.iter().map(|(_, h)| h.world_seed).collect();
    seeds.sort_unstable();
    assert_eq!(seeds, vec![1, 2]);

    std::fs::remove_dir_all(&dir).ok();
    assert!(list_saves_in(&dir).unwrap().is_empty());
}
