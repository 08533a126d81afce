//! Water from enclosed void pockets.
//!
//! Void pockets fully surrounded by rock become pools. Walls between a
//! pool and the cave are then broken so the water reaches the floor, and
//! the breaches may spread one step outward.

use delve_core::{Grid, Point, TileKind};
use delve_fill::{Cardinal, FloodRange, Region};
use rand::{Rng, RngExt};

use super::GenError;
use super::config::LiquidConfig;

/// Turns enclosed void into water and connects it to the cave.
pub struct LiquidGen<'a, R: Rng> {
    grid: &'a mut Grid,
    rng: &'a mut R,
    flood: FloodRange,
    /// Walls broken into water, in breaking order.
    edges: Vec<Point>,
}

impl<'a, R: Rng> LiquidGen<'a, R> {
    pub fn new(grid: &'a mut Grid, rng: &'a mut R) -> Self {
        let flood = FloodRange::new(grid.bounds());
        Self {
            grid,
            rng,
            flood,
            edges: Vec::new(),
        }
    }

    /// Run the whole liquid phase with `cfg`.
    pub fn run(&mut self, cfg: &LiquidConfig) -> Result<(), GenError> {
        let pools = self.carve_liquid();
        log::debug!("carved {} pools", pools.len());
        if pools.is_empty() {
            return Ok(());
        }
        self.breach_walls(&pools, cfg.ensure_fraction, cfg.extra_break_chance)?;
        self.drain_isolated_water();
        if let Some(chance) = cfg.expand_chance {
            self.expand_edges(chance);
        }
        Ok(())
    }

    /// Breach tiles so far.
    pub fn edges(&self) -> &[Point] {
        &self.edges
    }

    /// Partition void into 4-connected pockets and flood the enclosed ones.
    ///
    /// A pocket is enclosed if none of its tiles lies on the grid border and
    /// no tile touches void of another pocket, diagonals included. Returns
    /// the flooded pockets.
    pub fn carve_liquid(&mut self) -> Vec<Region> {
        let grid = &*self.grid;
        let nb = Cardinal::new(grid.bounds(), |p: Point| grid.kind_at(p) == Some(TileKind::Void));
        let seeds = grid.points().filter(|&p| grid.kind_at(p) == Some(TileKind::Void));
        let regions = self.flood.label_all(&nb, seeds);

        let pools: Vec<Region> = regions
            .into_iter()
            .filter(|r| self.is_enclosed(r))
            .collect();
        for pool in &pools {
            for &p in &pool.tiles {
                self.grid.set_kind(p, TileKind::Water);
            }
        }
        pools
    }

    fn is_enclosed(&self, region: &Region) -> bool {
        region.tiles.iter().all(|&p| {
            p.neighbors_8().into_iter().all(|n| match self.grid.kind_at(n) {
                None => false,
                Some(TileKind::Void) => self.flood.label_at(n) == Some(region.label),
                Some(_) => true,
            })
        })
    }

    /// Break walls between each pool and the floor.
    ///
    /// Candidates are the walls around a pool, off the grid border, with a
    /// free floor tile in a cardinal direction. `ensure_fraction` of them
    /// (at least one) always break; each remaining one breaks with
    /// `extra_chance`. Returns the number of tiles turned to water,
    /// dividers included.
    pub fn breach_walls(
        &mut self,
        pools: &[Region],
        ensure_fraction: f64,
        extra_chance: f64,
    ) -> Result<usize, GenError> {
        let before = self.edges.len();
        let mut claimed = vec![false; self.grid.len()];

        for pool in pools {
            let mut candidates = self.breach_candidates(pool, &mut claimed);
            if candidates.is_empty() {
                continue;
            }
            let ensured = ((candidates.len() as f64 * ensure_fraction) as usize).max(1);
            for _ in 0..ensured {
                if candidates.is_empty() {
                    break;
                }
                let wall = candidates.remove(self.rng.random_range(0..candidates.len()));
                self.break_wall(wall)?;
                candidates.retain(|&p| self.grid.kind_at(p) == Some(TileKind::Wall));
            }
            for wall in candidates {
                if self.grid.kind_at(wall) != Some(TileKind::Wall) {
                    continue;
                }
                let r: f64 = self.rng.random();
                if r < extra_chance {
                    self.break_wall(wall)?;
                }
            }
        }
        Ok(self.edges.len() - before)
    }

    fn breach_candidates(&self, pool: &Region, claimed: &mut [bool]) -> Vec<Point> {
        let mut out = Vec::new();
        for &p in &pool.tiles {
            for n in p.neighbors_8() {
                let Some(t) = self.grid.get(n) else {
                    continue;
                };
                if t.kind != TileKind::Wall || t.is_map_edge {
                    continue;
                }
                let Some(i) = self.grid.index(n) else {
                    continue;
                };
                if claimed[i] {
                    continue;
                }
                let touches_floor = self
                    .grid
                    .neighbors4(n)
                    .any(|q| self.grid.get(q).is_some_and(|t| t.open_for_placement()));
                if touches_floor {
                    claimed[i] = true;
                    out.push(n);
                }
            }
        }
        out
    }

    /// Turn a wall into a breach and connect it to the pool if it only
    /// touches water diagonally.
    fn break_wall(&mut self, wall: Point) -> Result<(), GenError> {
        self.flood_tile(wall);
        self.fix_isolated_water(wall)
    }

    fn flood_tile(&mut self, p: Point) {
        self.grid.set_kind(p, TileKind::Water);
        self.edges.push(p);
        // Water never borders the void.
        for n in p.neighbors_8() {
            if self.grid.kind_at(n) == Some(TileKind::Void) {
                self.grid.set_kind(n, TileKind::Wall);
            }
        }
    }

    /// If the water tile at `p` has no water in a cardinal direction, break
    /// the divider: a cardinal wall neighbour that itself touches other
    /// water cardinally.
    pub fn fix_isolated_water(&mut self, p: Point) -> Result<(), GenError> {
        if self.has_cardinal_water(p, None) {
            return Ok(());
        }
        let divider = self.grid.neighbors4(p).find(|&n| {
            self.grid
                .get(n)
                .is_some_and(|t| t.kind == TileKind::Wall && !t.is_map_edge)
                && self.has_cardinal_water(n, Some(p))
        });
        match divider {
            Some(d) => {
                log::trace!("breaking divider {d} for {p}");
                self.flood_tile(d);
                Ok(())
            }
            None => {
                log::error!("no divider wall next to isolated water at {p}");
                Err(GenError::DividerWallMissing { at: p })
            }
        }
    }

    fn has_cardinal_water(&self, p: Point, except: Option<Point>) -> bool {
        self.grid
            .neighbors4(p)
            .any(|n| Some(n) != except && self.grid.kind_at(n) == Some(TileKind::Water))
    }

    /// Drain every water tile left without a cardinal water neighbour.
    ///
    /// Only single-tile pools that no breach reached end up here. A drained
    /// tile becomes void again when everything around it is closed, and a
    /// wall otherwise.
    pub fn drain_isolated_water(&mut self) -> usize {
        let isolated: Vec<Point> = self
            .grid
            .iter()
            .filter(|t| t.kind == TileKind::Water)
            .map(|t| t.pos)
            .filter(|&p| !self.has_cardinal_water(p, None))
            .collect();
        for &p in &isolated {
            log::debug!("draining isolated water at {p}");
            let sealed = p.neighbors_8().into_iter().all(|n| self.grid.closed_or_outside(n));
            let kind = if sealed { TileKind::Void } else { TileKind::Wall };
            self.grid.set_kind(p, kind);
        }
        isolated.len()
    }

    /// Spread each breach, with probability `chance`, into the neighbouring
    /// floor tiles that touch exactly one water tile.
    ///
    /// A floor tile is only flooded when the open tiles around it stay
    /// connected without it. Returns the number of flooded tiles.
    pub fn expand_edges(&mut self, chance: f64) -> usize {
        let mut flooded = 0;
        for i in 0..self.edges.len() {
            let edge = self.edges[i];
            let r: f64 = self.rng.random();
            if r >= chance {
                continue;
            }
            let floors: Vec<Point> = self
                .grid
                .neighbors4(edge)
                .filter(|&n| self.grid.get(n).is_some_and(|t| t.open_for_placement()))
                .collect();
            for f in floors {
                let water = self
                    .grid
                    .neighbors4(f)
                    .filter(|&n| self.grid.kind_at(n) == Some(TileKind::Water))
                    .count();
                if water == 1 && self.floods_safely(f) {
                    self.grid.set_kind(f, TileKind::Water);
                    flooded += 1;
                }
            }
        }
        flooded
    }

    /// Whether the open cardinal neighbours of `p` lie in one unbroken run
    /// of open tiles around it.
    fn floods_safely(&self, p: Point) -> bool {
        let ring = p.neighbors_8();
        let open = ring.map(|n| self.grid.kind_at(n).is_some_and(TileKind::is_open));
        // Cardinal directions sit at the even ring slots.
        let cardinals: Vec<usize> = (0..8).step_by(2).filter(|&i| open[i]).collect();
        let Some(&first) = cardinals.first() else {
            return false;
        };
        if cardinals.len() == 1 {
            return true;
        }
        if open.iter().all(|&o| o) {
            return true;
        }
        // Walk the run containing `first` both ways and check it covers
        // every open cardinal.
        let mut in_run = [false; 8];
        in_run[first] = true;
        for step in [1, 7] {
            let mut i = (first + step) % 8;
            while open[i] && !in_run[i] {
                in_run[i] = true;
                i = (i + step) % 8;
            }
        }
        cardinals.iter().all(|&c| in_run[c])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const MOAT: &str = "\
#########
#.......#
#.#####.#
#.#   #.#
#.#####.#
#.......#
#########";

    fn has_cardinal_water(g: &Grid, p: Point) -> bool {
        g.neighbors4(p).any(|n| g.kind_at(n) == Some(TileKind::Water))
    }

    #[test]
    fn enclosed_void_becomes_water() {
        let mut grid = Grid::from_ascii(MOAT).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let pools = LiquidGen::new(&mut grid, &mut rng).carve_liquid();
        assert_eq!(pools.len(), 1);
        assert_eq!(pools[0].len(), 3);
        let t = grid.get(Point::new(4, 3)).unwrap();
        assert_eq!(t.kind, TileKind::Water);
        assert!(t.occupied && !t.walkable);
    }

    #[test]
    fn border_and_diagonal_pockets_stay_void() {
        let map = "\
#######
#.#####
#.## ##
#.# ###
#.#####
  #####
#######";
        let mut grid = Grid::from_ascii(map).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let pools = LiquidGen::new(&mut grid, &mut rng).carve_liquid();
        assert!(pools.is_empty());
        assert_eq!(grid.count_kind(TileKind::Water), 0);
    }

    #[test]
    fn breach_connects_pool_to_floor() {
        for seed in 0..10 {
            let mut grid = Grid::from_ascii(MOAT).unwrap();
            let mut rng = StdRng::seed_from_u64(seed);
            let mut liquid = LiquidGen::new(&mut grid, &mut rng);
            let pools = liquid.carve_liquid();
            let broken = liquid.breach_walls(&pools, 0.25, 0.0).unwrap();
            // 12 candidates: 3 always break, plus any dividers.
            assert!(broken >= 3);
            assert_eq!(grid.count_kind(TileKind::Water), 3 + broken);
            for t in grid.iter().filter(|t| t.kind == TileKind::Water) {
                assert!(has_cardinal_water(&grid, t.pos));
            }
            assert_eq!(grid.count_kind(TileKind::Floor), 20);
        }
    }

    #[test]
    fn divider_joins_diagonal_breach() {
        let map = "\
######
#~#~.#
#....#
######";
        let mut grid = Grid::from_ascii(map).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let mut liquid = LiquidGen::new(&mut grid, &mut rng);
        liquid.fix_isolated_water(Point::new(1, 1)).unwrap();
        assert_eq!(liquid.edges(), &[Point::new(2, 1)]);
        assert_eq!(grid.kind_at(Point::new(2, 1)), Some(TileKind::Water));
    }

    #[test]
    fn missing_divider_is_an_error() {
        let map = "\
#####
#...#
#.~.#
#...#
#####";
        let mut grid = Grid::from_ascii(map).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let err = LiquidGen::new(&mut grid, &mut rng)
            .fix_isolated_water(Point::new(2, 2))
            .unwrap_err();
        assert_eq!(err, GenError::DividerWallMissing { at: Point::new(2, 2) });
    }

    #[test]
    fn drain_walls_up_lone_water() {
        let map = "\
#####
#.~~#
#.#~#
#.###
#####";
        let mut grid = Grid::from_ascii(map).unwrap();
        grid.set_kind(Point::new(1, 3), TileKind::Water);
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(LiquidGen::new(&mut grid, &mut rng).drain_isolated_water(), 1);
        // (1,2) is floor, so the drained tile walls it off.
        assert_eq!(grid.kind_at(Point::new(1, 3)), Some(TileKind::Wall));
        assert_eq!(grid.count_kind(TileKind::Water), 3);
    }

    #[test]
    fn drained_pocket_in_rock_goes_back_to_void() {
        let map = "\
#######
#.....#
#######
###~###
#######";
        let mut grid = Grid::from_ascii(map).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(LiquidGen::new(&mut grid, &mut rng).drain_isolated_water(), 1);
        assert_eq!(grid.kind_at(Point::new(3, 3)), Some(TileKind::Void));
    }

    #[test]
    fn expansion_keeps_chokepoints() {
        let map = "\
#######
##~####
#.....#
#######";
        let mut grid = Grid::from_ascii(map).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let mut liquid = LiquidGen::new(&mut grid, &mut rng);
        liquid.edges.push(Point::new(2, 1));
        assert_eq!(liquid.expand_edges(1.0), 0);
        assert_eq!(grid.kind_at(Point::new(2, 2)), Some(TileKind::Floor));
    }

    #[test]
    fn expansion_floods_safe_floor() {
        let map = "\
#######
##~####
#.....#
#.....#
#######";
        let mut grid = Grid::from_ascii(map).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let mut liquid = LiquidGen::new(&mut grid, &mut rng);
        liquid.edges.push(Point::new(2, 1));
        assert_eq!(liquid.expand_edges(1.0), 1);
        assert_eq!(grid.kind_at(Point::new(2, 2)), Some(TileKind::Water));
    }

    #[test]
    fn expansion_disabled_by_zero_chance() {
        let map = "\
#######
##~####
#.....#
#.....#
#######";
        let mut grid = Grid::from_ascii(map).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let mut liquid = LiquidGen::new(&mut grid, &mut rng);
        liquid.edges.push(Point::new(2, 1));
        assert_eq!(liquid.expand_edges(0.0), 0);
    }
}
