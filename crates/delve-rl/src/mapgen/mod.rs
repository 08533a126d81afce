//! Dungeon generation.
//!
//! [`DungeonGen::generate`] runs the full pipeline:
//!
//! 1. cellular-automata caves ([`CaveGen`]) and [`cleanup`],
//! 2. connectivity: prune to the largest cave, or link caves with
//!    teleporters ([`Resolver`]), regenerating from scratch while the map is
//!    too small,
//! 3. water ([`LiquidGen`]) and grass ([`GrassGen`]),
//! 4. optional edge smoothing,
//! 5. spawn and exit placement, edge marking and neighbour links.

pub mod cave;
pub mod cleanup;
pub mod config;
pub mod connect;
pub mod grass;
pub mod liquid;

use std::fmt;

use delve_core::{Grid, GridError, Point, TileKind};
use rand::{Rng, RngExt};

pub use cave::CaveGen;
pub use config::{GenConfig, GrassConfig, LiquidConfig};
pub use connect::{Resolution, Resolver, TeleporterLink, reachable_with_teleporters};
pub use grass::GrassGen;
pub use liquid::LiquidGen;

/// Errors from dungeon generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenError {
    Grid(GridError),
    /// An isolated water tile had no wall separating it from other water.
    DividerWallMissing { at: Point },
}

impl fmt::Display for GenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grid(e) => write!(f, "grid error: {e}"),
            Self::DividerWallMissing { at } => {
                write!(f, "no divider wall found for isolated water at {at}")
            }
        }
    }
}

impl std::error::Error for GenError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Grid(e) => Some(e),
            Self::DividerWallMissing { .. } => None,
        }
    }
}

impl From<GridError> for GenError {
    fn from(e: GridError) -> Self {
        Self::Grid(e)
    }
}

/// Something noteworthy that happened during generation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GenEvent {
    /// Attempt `attempt` was thrown away.
    Regenerated { attempt: u32, open_fraction: f64 },
    /// No attempt met the open-tile threshold; the last one was kept.
    ThresholdRelaxed { attempts: u32 },
    RegionPruned { size: usize },
    TeleporterPlaced(TeleporterLink),
    /// Too little floor was left, so the map was replaced by a sealed
    /// two-tile pocket starting at `at`.
    SpawnCarved { at: Point },
}

/// A finished level.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dungeon {
    pub grid: Grid,
    pub spawn: Point,
    pub exit: Point,
    /// Walls closed in on all four sides.
    pub edges: Vec<Point>,
    pub teleporters: Vec<TeleporterLink>,
    /// Attempts used, the kept one included.
    pub attempts: u32,
    pub events: Vec<GenEvent>,
}

/// Dungeon generator driven by a [`GenConfig`] and a caller-owned RNG.
pub struct DungeonGen<'a, R: Rng> {
    cfg: GenConfig,
    rng: &'a mut R,
}

impl<'a, R: Rng> DungeonGen<'a, R> {
    /// Create a generator. `cfg` is sanitized first.
    pub fn new(cfg: &GenConfig, rng: &'a mut R) -> Self {
        Self {
            cfg: cfg.sanitized(),
            rng,
        }
    }

    /// The sanitized configuration in use.
    pub fn config(&self) -> &GenConfig {
        &self.cfg
    }

    /// Generate one level.
    pub fn generate(&mut self) -> Result<Dungeon, GenError> {
        let mut events = Vec::new();
        let (mut grid, mut teleporters, attempts) = self.connected_caves(&mut events);

        if self.cfg.liquid.enabled {
            LiquidGen::new(&mut grid, self.rng).run(&self.cfg.liquid)?;
        }
        if self.cfg.grass.enabled {
            GrassGen::new(&mut grid, self.rng).grow(&self.cfg.grass);
        }
        if self.cfg.edge_smoothing {
            let removed = cleanup::smooth_map_edges(&mut grid);
            log::debug!("smoothing removed {removed} walls");
        }

        if grid.open_points().len() < 2 {
            let at = carve_pocket(&mut grid);
            log::warn!("not enough floor left, carved a pocket at {at}");
            teleporters.clear();
            events.push(GenEvent::SpawnCarved { at });
        }
        let (spawn, exit) = self.place_spawn_and_exit(&mut grid)?;

        let edges = cleanup::set_up_edges(&mut grid);
        grid.recompute_neighbor_links();
        log::debug!(
            "dungeon ready after {attempts} attempt(s): spawn {spawn}, exit {exit}, {} links",
            teleporters.len()
        );

        Ok(Dungeon {
            grid,
            spawn,
            exit,
            edges,
            teleporters,
            attempts,
            events,
        })
    }

    /// Carve, clean and resolve connectivity, retrying while the result is
    /// too small. The last attempt is always kept.
    fn connected_caves(&mut self, events: &mut Vec<GenEvent>) -> (Grid, Vec<TeleporterLink>, u32) {
        let cfg = &self.cfg;
        let mut attempt = 0;
        loop {
            attempt += 1;
            let mut grid = Grid::new(cfg.rows, cfg.cols);
            let mut cave = CaveGen::new(&mut grid, self.rng);
            cave.seed(cfg.alive_chance);
            cave.simulate(cfg.death_limit, cfg.birth_limit, cfg.simulations);
            cleanup::clean(&mut grid);

            let mut resolver = Resolver::new(&mut grid, self.rng);
            let res = if cfg.allow_disconnected {
                resolver.link_regions()
            } else {
                resolver.keep_largest()
            };

            let open_fraction = grid.open_fraction();
            log::debug!("attempt {attempt}: {:.1}% open", open_fraction * 100.0);
            let enough = if cfg.allow_disconnected {
                grid.open_points().len() >= 2
            } else {
                open_fraction >= cfg.min_open_fraction
            };

            if !enough && attempt < cfg.max_attempts {
                events.push(GenEvent::Regenerated {
                    attempt,
                    open_fraction,
                });
                continue;
            }
            if !enough && !cfg.allow_disconnected {
                log::warn!(
                    "open fraction {open_fraction:.3} below {} after {attempt} tries, kept",
                    cfg.min_open_fraction
                );
                events.push(GenEvent::ThresholdRelaxed { attempts: attempt });
            }
            events.extend(res.pruned.iter().map(|&size| GenEvent::RegionPruned { size }));
            events.extend(res.teleporters.iter().copied().map(GenEvent::TeleporterPlaced));
            return (grid, res.teleporters, attempt);
        }
    }

    /// Spawn on a random free floor, exit on another one.
    fn place_spawn_and_exit(&mut self, grid: &mut Grid) -> Result<(Point, Point), GenError> {
        let mut free = grid.open_points();
        let spawn = free.swap_remove(self.rng.random_range(0..free.len()));
        let exit = free[self.rng.random_range(0..free.len())];
        grid.tile_at_mut(spawn)?.occupied = true;
        grid.set_kind(exit, TileKind::Exit);
        grid.tile_at_mut(exit)?.occupied = true;
        Ok((spawn, exit))
    }
}

/// Generate a level with `cfg` and `rng`.
pub fn generate<R: Rng>(cfg: &GenConfig, rng: &mut R) -> Result<Dungeon, GenError> {
    DungeonGen::new(cfg, rng).generate()
}

/// Replace the map by two floor tiles near the centre, walled in, with void
/// everywhere else. Returns the left tile.
fn carve_pocket(grid: &mut Grid) -> Point {
    let at = Point::new(grid.cols() / 2 - 1, grid.rows() / 2);
    let pocket = [at, at.shift(1, 0)];
    grid.fill(TileKind::Void);
    for p in pocket {
        grid.set_kind(p, TileKind::Floor);
    }
    for p in pocket {
        for n in p.neighbors_8() {
            if grid.kind_at(n) == Some(TileKind::Void) {
                grid.set_kind(n, TileKind::Wall);
            }
        }
    }
    at
}
