//! Per-cell obstacle style
//!
//! Style is purely visual. It is derived from one base draw of the
//! `maze_style` stream mixed with the cell coordinates, so a replayed layout
//! looks exactly like the first visit no matter how the wall list was
//! filtered in between.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use tm_rng::{RngStream, hash_cell};

use crate::consts::NS_MAZE_STYLE;
use crate::door::MapId;
use crate::grid::GridCoord;

/// Biome of the map being generated; selects the obstacle palette
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BiomeHint {
    #[default]
    Meadow,
    Forest,
    Desert,
    Cave,
    /// Building and shop interiors
    Interior,
}

/// What a renderer should draw for a wall cell
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ObstacleKind {
    Boulder,
    Bush,
    Hedge,
    Tree,
    Stump,
    Cactus,
    Dune,
    Stalagmite,
    Rubble,
    Crate,
    Barrel,
    Shelf,
}

impl BiomeHint {
    pub const fn palette(self) -> &'static [ObstacleKind] {
        use ObstacleKind::*;
        match self {
            BiomeHint::Meadow => &[Bush, Hedge, Boulder],
            BiomeHint::Forest => &[Tree, Tree, Stump, Bush],
            BiomeHint::Desert => &[Cactus, Dune, Boulder],
            BiomeHint::Cave => &[Stalagmite, Rubble, Boulder],
            BiomeHint::Interior => &[Crate, Barrel, Shelf],
        }
    }
}

/// Visual tag attached to every wall cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StyleHint {
    pub obstacle: ObstacleKind,
    /// Sprite variant within the obstacle kind, 0..4
    pub variant: u8,
}

impl StyleHint {
    fn from_hash(biome: BiomeHint, h: u32) -> Self {
        let palette = biome.palette();
        Self {
            obstacle: palette[(h as usize) % palette.len()],
            variant: ((h >> 16) & 0x3) as u8,
        }
    }
}

/// Styles cells of one map from a single base draw
#[derive(Debug, Clone, Copy)]
pub struct Styler {
    base: u32,
    biome: BiomeHint,
}

impl Styler {
    pub fn new(world_seed: u32, map_id: &MapId, biome: BiomeHint) -> Self {
        let base = RngStream::stream_for(world_seed, NS_MAZE_STYLE, map_id.as_str()).next_u32();
        Self { base, biome }
    }

    pub fn style(&self, c: GridCoord) -> StyleHint {
        StyleHint::from_hash(self.biome, hash_cell(self.base, c.x, c.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_styles_come_from_biome_palette() {
        let id = MapId::from("cave-3");
        for biome in BiomeHint::iter() {
            let styler = Styler::new(7, &id, biome);
            for x in 0..10 {
                let s = styler.style(GridCoord::new(x, 4));
                assert!(biome.palette().contains(&s.obstacle));
                assert!(s.variant < 4);
            }
        }
    }

    #[test]
    fn test_style_is_stable_per_cell() {
        let id = MapId::from("meadow");
        let a = Styler::new(42, &id, BiomeHint::Meadow);
        let b = Styler::new(42, &id, BiomeHint::Meadow);
        let c = GridCoord::new(6, 9);
        assert_eq!(a.style(c), b.style(c));
    }

    #[test]
    fn test_biome_names() {
        assert_eq!(BiomeHint::Interior.to_string(), "interior");
        assert_eq!("desert".parse::<BiomeHint>().unwrap(), BiomeHint::Desert);
    }
}
