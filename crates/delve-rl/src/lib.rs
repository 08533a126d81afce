//! Cave dungeons and fog of war on a [`delve_core::Grid`].
//!
//! - [`mapgen`]: cellular-automata caves, topology cleanup, connectivity
//!   resolution (pruning or teleporters), liquid and grass.
//! - [`vision`]: per-move visibility with ray casting, range limiting and
//!   reveal post-processing.

pub mod mapgen;
pub mod vision;

pub use mapgen::{Dungeon, DungeonGen, GenConfig, GenError, GenEvent, TeleporterLink};
pub use vision::{MIN_VIEW_RADIUS, Vision};
