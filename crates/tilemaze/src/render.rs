//! ASCII rendering of the current map

use tm_core::terrain::TerrainKind;
use tm_core::{GridCoord, MazeLayout, WorldGenContext};

pub const BOUNDARY: char = '#';
pub const FLOOR: char = '.';
pub const OBSTACLE: char = 'o';
pub const OPENING: char = '+';
pub const MARSH: char = '~';
pub const QUICKSAND: char = '%';
pub const DECORATIVE: char = ',';

fn terrain_glyph(kind: TerrainKind) -> char {
    match kind {
        TerrainKind::Marsh => MARSH,
        TerrainKind::Quicksand => QUICKSAND,
        TerrainKind::Decorative => DECORATIVE,
    }
}

/// Render the map `ctx` is currently on, one line per row
pub fn render(ctx: &WorldGenContext, layout: &MazeLayout) -> String {
    let grid = ctx.grid();
    let (w, h) = (grid.width().max(0) as usize, grid.height().max(0) as usize);
    let mut rows = vec![vec![FLOOR; w]; h];

    let mut put = |c: GridCoord, ch: char| {
        if grid.in_bounds(c) {
            rows[c.y as usize][c.x as usize] = ch;
        }
    };

    for c in grid.bounds().border() {
        put(c, BOUNDARY);
    }
    for zone in ctx.terrain_zones() {
        for &c in &zone.cells {
            put(c, terrain_glyph(zone.kind));
        }
    }
    for c in layout.coords() {
        put(c, OBSTACLE);
    }
    let doors = ctx.door_layout();
    for c in doors.open_cells() {
        put(c, OPENING);
    }
    for door in doors.doors.iter().filter(|d| d.door_type.is_building()) {
        put(door.anchor, OPENING);
    }

    let mut out = String::with_capacity((w + 1) * h);
    for row in rows {
        out.extend(row);
        out.push('\n');
    }
    out
}
