//! Generation constants
//!
//! Defaults for the tunables in [`crate::options::GenOptions`] plus the fixed
//! stream namespaces.

/// Minimum wall-cell target for a maze pass
pub const MIN_WALL_TARGET: usize = 24;

/// Fraction of interior area the maze pass aims to fill with walls
pub const WALL_DENSITY: f64 = 0.12;

/// Below this many placed walls the fallback cluster is stamped
pub const FALLBACK_FLOOR: usize = 8;

/// How many cells inward of an opening are kept clear
pub const CLEARANCE_DEPTH: i32 = 2;

/// Obstacles stay this many cells clear of the absolute map boundary
pub const SAFE_MARGIN: i32 = 2;

/// Placement attempts allowed per wall candidate
pub const ATTEMPT_FACTOR: usize = 2;

/// Interiors narrower or shorter than this are not carved at all
pub const MIN_INTERIOR: i32 = 5;

/// Edge half-width floor on overworld maps
pub const OVERWORLD_MIN_HALF_WIDTH: u32 = 1;

/// Edge half-width floor on building interiors
pub const BUILDING_MIN_HALF_WIDTH: u32 = 0;

/// Upper bound on organic tails attached to a terrain zone
pub const MAX_TAILS: u32 = 3;

/// How far from the center the fallback cluster may be anchored
pub const FALLBACK_SEARCH_RADIUS: i32 = 4;

/// Stream namespace for carving, shuffling and shape placement
pub const NS_MAZE: &str = "maze";

/// Stream namespace for per-cell obstacle style
pub const NS_MAZE_STYLE: &str = "maze_style";

/// Default cell size in world units
pub const DEFAULT_CELL_SIZE: u32 = 16;
