//! tilemaze: preview generated map tiles in the terminal
//!
//! Generates the obstacle layout of one map (or every map) of a world and
//! prints it as ASCII. Legend: `#` boundary, `.` floor, `o` obstacle,
//! `+` opening or door, `~` marsh, `%` quicksand, `,` decoration.

mod maps;
mod render;

use std::path::PathBuf;

use clap::Parser;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use tm_core::grid::GridRect;
use tm_core::terrain::{TerrainKind, ZoneShape};
use tm_core::{BiomeHint, GenOptions, MapId, MapKind, WorldGenContext};

/// Tile maze previewer
#[derive(Parser, Debug)]
#[command(name = "tilemaze")]
#[command(author, version, about = "Preview generated map tiles as ASCII", long_about = None)]
struct Args {
    /// World seed
    #[arg(short = 's', long = "seed")]
    seed: Option<u32>,

    /// JSON file with an array of map descriptors (built-in demo world if absent)
    #[arg(short = 'm', long = "maps")]
    maps: Option<PathBuf>,

    /// Only render this map
    #[arg(long = "map")]
    map: Option<String>,

    /// Biome palette (meadow, forest, desert, cave, interior)
    #[arg(short = 'b', long = "biome")]
    biome: Option<BiomeHint>,

    /// Generation options file (OPTIONS=key:value lines)
    #[arg(short = 'o', long = "options")]
    options: Option<PathBuf>,

    /// Number of marsh/quicksand zones to try per map
    #[arg(short = 'z', long = "zones", default_value_t = 0)]
    zones: usize,

    /// Restore seed and layouts from a save file
    #[arg(long = "load")]
    load: Option<PathBuf>,

    /// Write seed and layouts to a save file when done
    #[arg(long = "save")]
    save: Option<PathBuf>,

    /// Verbose output
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

const DEFAULT_SEED: u32 = 1;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    use simplelog::LevelFilter;
    simplelog::TermLogger::init(
        if args.verbose { LevelFilter::Debug } else { LevelFilter::Info },
        simplelog::ConfigBuilder::new()
            .set_target_level(LevelFilter::Off)
            .set_location_level(LevelFilter::Off)
            .build(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;

    run(&args)
}

fn run(args: &Args) -> anyhow::Result<()> {
    let registry = match &args.maps {
        Some(path) => maps::load_maps(path)?,
        None => maps::demo_registry(),
    };
    for issue in registry.validate() {
        warn!("{issue}");
    }

    let options = match &args.options {
        Some(path) => GenOptions::load_from_file(path)?,
        None => GenOptions::default(),
    };

    let mut ctx = match &args.load {
        Some(path) => {
            let save = tm_save::load_world(path)?;
            if args.seed.is_some_and(|s| s != save.world_seed) {
                warn!("ignoring --seed, {} holds seed {}", path.display(), save.world_seed);
            }
            info!("loaded {} cached layouts from {}", save.layouts.len(), path.display());
            save.into_context(registry, options)
        }
        None => WorldGenContext::with_options(args.seed.unwrap_or(DEFAULT_SEED), registry, options),
    };

    let ids: Vec<MapId> = match &args.map {
        Some(id) => vec![MapId::new(id.as_str())],
        None => ctx.registry().map_ids().into_iter().cloned().collect(),
    };

    let mut rng = StdRng::seed_from_u64(u64::from(ctx.world_seed()));
    for id in &ids {
        let biome = args.biome.unwrap_or_else(|| match ctx.registry().get(id).map(|m| m.kind) {
            Some(MapKind::Building) => BiomeHint::Interior,
            _ => BiomeHint::Meadow,
        });
        let layout = ctx.generate_maze(id, biome)?;
        let zones = sprinkle_zones(&mut ctx, args.zones, &mut rng);
        info!(
            "{id}: {} obstacles{}, {zones} terrain zones",
            layout.len(),
            if layout.replayed { " (replayed)" } else { "" }
        );

        println!("{id} [{biome}]");
        print!("{}", render::render(&ctx, &layout));
        println!();
    }

    if let Some(path) = &args.save {
        tm_save::save_world(&ctx, path)?;
        info!("saved seed {} to {}", ctx.world_seed(), path.display());
    }
    Ok(())
}

/// Try to drop `count` organic marsh or quicksand zones on the current map.
/// Returns how many fit.
fn sprinkle_zones(ctx: &mut WorldGenContext, count: usize, rng: &mut StdRng) -> usize {
    let Some(interior) = ctx.grid().interior() else {
        return 0;
    };
    let mut placed = 0;
    for _ in 0..count {
        for _ in 0..8 {
            let w = rng.gen_range(2..=5i32).min(interior.width());
            let h = rng.gen_range(2..=3i32).min(interior.height());
            let x = rng.gen_range(interior.lx..=interior.hx - w + 1);
            let y = rng.gen_range(interior.ly..=interior.hy - h + 1);
            let (kind, slow) = if rng.gen_bool(0.5) {
                (TerrainKind::Marsh, 0.5)
            } else {
                (TerrainKind::Quicksand, 0.25)
            };
            let shape = ZoneShape::OrganicRect(GridRect::from_origin(x, y, w, h));
            if ctx.place_terrain_zone(&shape, kind, slow, rng).is_some() {
                placed += 1;
                break;
            }
        }
    }
    if placed < count {
        debug!("{} of {count} terrain zones did not fit", count - placed);
    }
    placed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from(["tilemaze", "--seed", "9", "--biome", "desert", "--map", "forest", "-v"])
            .unwrap();
        assert_eq!(args.seed, Some(9));
        assert_eq!(args.biome, Some(BiomeHint::Desert));
        assert_eq!(args.map.as_deref(), Some("forest"));
        assert!(args.verbose);
        assert!(Args::try_parse_from(["tilemaze", "--biome", "swamp"]).is_err());
    }

    #[test]
    fn test_zones_land_on_free_cells() {
        let mut ctx = WorldGenContext::new(4, maps::demo_registry());
        let meadow = MapId::from("meadow");
        let layout = ctx.generate_maze(&meadow, BiomeHint::Meadow).unwrap();
        let mut rng = StdRng::seed_from_u64(4);
        let placed = sprinkle_zones(&mut ctx, 3, &mut rng);
        assert_eq!(placed, ctx.terrain_zones().len());
        for zone in ctx.terrain_zones() {
            assert!(zone.cells.iter().all(|c| !layout.contains(*c)));
        }
    }

    #[test]
    fn test_run_writes_a_loadable_save() {
        let path = std::env::temp_dir().join(format!("tilemaze_cli_{}.json", std::process::id()));
        let args = Args::try_parse_from(["tilemaze", "--seed", "5", "--save", path.to_str().unwrap()]).unwrap();
        run(&args).unwrap();

        let save = tm_save::load_world(&path).unwrap();
        assert_eq!(save.world_seed, 5);
        assert_eq!(save.layouts.len(), 3);
        std::fs::remove_file(&path).ok();
    }
}
