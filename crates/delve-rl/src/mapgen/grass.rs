//! Grass patches along the shore.

use delve_core::{Grid, Point, TileKind};
use delve_fill::{Cardinal, FloodRange, Moore, Neighborhood};
use rand::{Rng, RngExt};

use super::config::GrassConfig;

/// Chance lost per ring, at least, as grass spreads from a root.
const MIN_DECAY: u32 = 10;

/// Grows grass from random roots near water.
pub struct GrassGen<'a, R: Rng> {
    grid: &'a mut Grid,
    rng: &'a mut R,
    flood: FloodRange,
}

impl<'a, R: Rng> GrassGen<'a, R> {
    pub fn new(grid: &'a mut Grid, rng: &'a mut R) -> Self {
        let flood = FloodRange::new(grid.bounds());
        Self { grid, rng, flood }
    }

    /// Pick roots and spread grass from them. Returns the number of grassy
    /// tiles.
    pub fn grow(&mut self, cfg: &GrassConfig) -> usize {
        let candidates = self.candidates(cfg.range);
        if candidates.is_empty() {
            return 0;
        }
        let roots: Vec<Point> = candidates
            .into_iter()
            .filter(|_| {
                let r: f64 = self.rng.random();
                r < cfg.root_chance
            })
            .collect();
        log::debug!("{} grass roots", roots.len());
        self.spread(&roots);
        self.grid.iter().filter(|t| t.grass).count()
    }

    /// Free floor tiles within `range` cardinal steps (over open tiles) of a
    /// free floor tile that touches water.
    pub fn candidates(&mut self, range: i32) -> Vec<Point> {
        let grid = &*self.grid;
        let shore: Vec<Point> = grid
            .iter()
            .filter(|t| t.open_for_placement())
            .map(|t| t.pos)
            .filter(|&p| grid.neighbors4(p).any(|n| grid.kind_at(n) == Some(TileKind::Water)))
            .collect();
        if shore.is_empty() {
            return Vec::new();
        }
        let nb = Cardinal::new(grid.bounds(), |p: Point| {
            grid.kind_at(p).is_some_and(TileKind::is_open)
        });
        self.flood
            .bfs_map(&nb, &shore, range)
            .iter()
            .map(|n| n.pos)
            .filter(|&p| grid.get(p).is_some_and(|t| t.open_for_placement()))
            .collect()
    }

    /// Spread from each root ring by ring. The spawn chance starts at 100
    /// and loses a random amount in `[10, chance]` per ring.
    pub fn spread(&mut self, roots: &[Point]) {
        let mut seen = vec![false; self.grid.len()];
        for &root in roots {
            if let Some(i) = self.grid.index(root) {
                seen[i] = true;
            }
            if let Some(t) = self.grid.get_mut(root) {
                t.grass = true;
            }
        }
        let ring = Moore::new(self.grid.bounds(), |_: Point| true);
        let mut around = Vec::with_capacity(8);
        for &root in roots {
            let mut frontier = vec![root];
            let mut chance: u32 = 100;
            while chance > 0 && !frontier.is_empty() {
                let mut next = Vec::new();
                for &f in &frontier {
                    around.clear();
                    ring.neighbors(f, &mut around);
                    for &n in &around {
                        let roll = self.rng.random_range(1..=100u32);
                        if roll > chance {
                            continue;
                        }
                        let Some(i) = self.grid.index(n) else {
                            continue;
                        };
                        if seen[i] || !self.grid.get(n).is_some_and(|t| t.open_for_placement()) {
                            continue;
                        }
                        seen[i] = true;
                        if let Some(t) = self.grid.get_mut(n) {
                            t.grass = true;
                        }
                        next.push(n);
                    }
                }
                frontier = next;
                chance = if chance > MIN_DECAY {
                    chance - self.rng.random_range(MIN_DECAY..=chance)
                } else {
                    0
                };
            }
        }
    }
}
