//! **delve-core**: the tile grid shared by cave generation and visibility.
//!
//! This crate provides geometry primitives, the [`Tile`] record with its
//! [`TileKind`] category, and the owning [`Grid`] arena with bounds-checked
//! access and coordinate-based neighbour links.

pub mod error;
pub mod geom;
pub mod grid;
pub mod tile;

pub use error::GridError;
pub use geom::{Direction, Point, Range};
pub use grid::{Grid, MIN_SIDE};
pub use tile::{Shade, Tile, TileKind};
