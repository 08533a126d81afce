//! Flood-fill algorithms for tile grids.
//!
//! - **Region fill** from a seed with persistent labels ([`FloodRange::fill`])
//! - **Full labelling** of every reachable component ([`FloodRange::label_all`])
//! - **Range-bounded BFS** distance maps ([`FloodRange::bfs_map`])
//!
//! All algorithms run through [`FloodRange`], which owns its scratch buffers.
//! Each algorithm phase keeps its own `FloodRange`, so labels from one phase
//! never leak into another.

mod bfs;
mod cc;
mod distance;
mod flood;
mod neighbors;
mod traits;

pub use cc::Region;
pub use distance::{chebyshev, manhattan};
pub use flood::{FloodRange, PathNode, UNREACHABLE};
pub use neighbors::{Cardinal, Moore};
pub use traits::Neighborhood;
