//! Occupancy grid
//!
//! Coordinates, rectangles and the per-map occupancy set.

mod coord;
mod model;
mod rect;

pub use coord::{Direction, GridCoord};
pub use model::GridModel;
pub use rect::GridRect;
