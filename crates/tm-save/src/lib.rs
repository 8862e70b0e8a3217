//! tm-save: Save/restore for generated worlds
//!
//! A world is fully described by its seed and the wall lists cached for the
//! maps visited so far. Everything else regenerates from the seed.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tm_core::{DoorRegistry, GenOptions, GridCoord, MapId, WorldGenContext};

/// Current save file format version
pub const SAVE_VERSION: u32 = 1;

/// Save/restore errors
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Save file not found")]
    NotFound,

    #[error("Save file corrupted")]
    Corrupted,

    #[error("Incompatible save version: expected {expected}, found {found}")]
    IncompatibleVersion { expected: u32, found: u32 },

    #[error("Invalid save file header")]
    InvalidHeader,
}

/// Save file header for versioning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveHeader {
    /// Magic identifier
    pub magic: String,
    /// Save format version
    pub version: u32,
    pub world_seed: u32,
    /// Number of maps with a cached layout
    #[serde(default)]
    pub maps: usize,
    /// Seconds since the Unix epoch
    pub timestamp: u64,
}

impl SaveHeader {
    const MAGIC: &'static str = "TMZS";

    pub fn new(world_seed: u32, maps: usize) -> Self {
        Self {
            magic: Self::MAGIC.to_string(),
            version: SAVE_VERSION,
            world_seed,
            maps,
            timestamp: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        }
    }

    pub fn validate(&self) -> Result<(), SaveError> {
        if self.magic != Self::MAGIC {
            return Err(SaveError::InvalidHeader);
        }
        if self.version != SAVE_VERSION {
            return Err(SaveError::IncompatibleVersion {
                expected: SAVE_VERSION,
                found: self.version,
            });
        }
        Ok(())
    }
}

/// Complete save file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSave {
    pub header: SaveHeader,
    pub world_seed: u32,
    /// Wall cells per map, in placement order
    #[serde(default)]
    pub layouts: BTreeMap<MapId, Vec<GridCoord>>,
}

impl WorldSave {
    /// Snapshot the seed and layout cache of a running world
    pub fn from_context(ctx: &WorldGenContext) -> Self {
        let layouts = ctx.cached_layouts();
        Self {
            header: SaveHeader::new(ctx.world_seed(), layouts.len()),
            world_seed: ctx.world_seed(),
            layouts,
        }
    }

    /// Rebuild a world from this save. Maps saved here replay their walls on
    /// the next visit, the rest generate fresh from the seed.
    pub fn into_context(self, registry: DoorRegistry, options: GenOptions) -> WorldGenContext {
        for id in self.layouts.keys().filter(|id| !registry.contains(id)) {
            log::warn!("save holds a layout for unknown map {id}");
        }
        let mut ctx = WorldGenContext::with_options(self.world_seed, registry, options);
        ctx.restore_layouts(self.layouts);
        ctx
    }

    fn validate(&self) -> Result<(), SaveError> {
        self.header.validate()?;
        if self.header.world_seed != self.world_seed {
            return Err(SaveError::Corrupted);
        }
        Ok(())
    }
}

/// Header-only view, so listing saves skips the layouts
#[derive(Deserialize)]
struct HeaderOnly {
    header: SaveHeader,
}

/// Save a world's seed and layout cache to a file
pub fn save_world(ctx: &WorldGenContext, path: impl AsRef<Path>) -> Result<(), SaveError> {
    let save = WorldSave::from_context(ctx);
    let file = File::create(path.as_ref())?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &save)?;
    log::debug!(
        "saved seed {} with {} layouts to {}",
        save.world_seed,
        save.layouts.len(),
        path.as_ref().display()
    );
    Ok(())
}

/// Load a world save from a file
pub fn load_world(path: impl AsRef<Path>) -> Result<WorldSave, SaveError> {
    let file = File::open(path).map_err(|_| SaveError::NotFound)?;
    let reader = BufReader::new(file);
    let save: WorldSave = serde_json::from_reader(reader)?;

    save.validate()?;
    Ok(save)
}

/// Load only the header from a save file
pub fn load_header(path: impl AsRef<Path>) -> Result<SaveHeader, SaveError> {
    let file = File::open(path).map_err(|_| SaveError::NotFound)?;
    let reader = BufReader::new(file);
    let HeaderOnly { header } = serde_json::from_reader(reader)?;
    header.validate()?;
    Ok(header)
}

/// Check if a save file exists
pub fn save_exists(path: impl AsRef<Path>) -> bool {
    path.as_ref().exists()
}

/// Delete a save file
pub fn delete_save(path: impl AsRef<Path>) -> Result<(), SaveError> {
    std::fs::remove_file(path)?;
    Ok(())
}

fn saves_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("tilemaze");
    path.push("saves");
    path
}

/// Get the default save path for a world name
pub fn default_save_path(world_name: &str) -> PathBuf {
    let mut path = saves_dir();
    std::fs::create_dir_all(&path).ok();
    path.push(format!("{}.json", world_name));
    path
}

/// List saves in `dir`, newest first. Unreadable files are skipped.
pub fn list_saves_in(dir: impl AsRef<Path>) -> Result<Vec<(PathBuf, SaveHeader)>, SaveError> {
    let dir = dir.as_ref();
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut saves = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|e| e == "json") {
            match load_header(&path) {
                Ok(header) => saves.push((path, header)),
                Err(e) => log::debug!("skipping {}: {e}", path.display()),
            }
        }
    }

    saves.sort_by(|a, b| b.1.timestamp.cmp(&a.1.timestamp).then_with(|| a.0.cmp(&b.0)));
    Ok(saves)
}

/// List all save files in the default save directory
pub fn list_saves() -> Result<Vec<(PathBuf, SaveHeader)>, SaveError> {
    list_saves_in(saves_dir())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_validation() {
        let header = SaveHeader::new(42, 0);
        assert!(header.validate().is_ok());

        let mut bad_header = header.clone();
        bad_header.magic = "XXXX".to_string();
        assert!(matches!(bad_header.validate(), Err(SaveError::InvalidHeader)));

        let mut old_header = header;
        old_header.version = 999;
        assert!(matches!(
            old_header.validate(),
            Err(SaveError::IncompatibleVersion { expected: 1, found: 999 })
        ));
    }

    #[test]
    fn test_seed_mismatch_is_corruption() {
        let mut save = WorldSave {
            header: SaveHeader::new(1, 0),
            world_seed: 1,
            layouts: BTreeMap::new(),
        };
        assert!(save.validate().is_ok());
        save.world_seed = 2;
        assert!(matches!(save.validate(), Err(SaveError::Corrupted)));
    }

    #[test]
    fn test_load_nonexistent() {
        let result = load_world("/nonexistent/path/world.json");
        assert!(matches!(result, Err(SaveError::NotFound)));
    }

    #[test]
    fn test_default_save_path_name() {
        let path = default_save_path("overworld");
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("overworld.json"));
    }
}
