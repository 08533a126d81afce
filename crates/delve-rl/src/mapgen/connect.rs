//! Connected-region analysis and disconnected-cave resolution.
//!
//! Regions are 4-connected sets of open tiles (floor, teleporter, exit).
//! Seeds are drawn at random from the tiles no fill has reached yet.

use delve_core::{Grid, Point, TileKind};
use delve_fill::{Cardinal, FloodRange, Region};
use rand::{Rng, RngExt};

use super::cleanup;

/// A two-way teleporter pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TeleporterLink {
    /// End placed in the newly found region.
    pub entry: Point,
    /// End placed in a region resolved earlier.
    pub exit: Point,
}

/// What a resolve pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Sizes of the regions removed from the map.
    pub pruned: Vec<usize>,
    pub teleporters: Vec<TeleporterLink>,
}

/// Partitions a grid into regions and removes or links the disconnected
/// ones.
pub struct Resolver<'a, R: Rng> {
    grid: &'a mut Grid,
    rng: &'a mut R,
    flood: FloodRange,
}

impl<'a, R: Rng> Resolver<'a, R> {
    pub fn new(grid: &'a mut Grid, rng: &'a mut R) -> Self {
        let flood = FloodRange::new(grid.bounds());
        Self { grid, rng, flood }
    }

    /// Fill regions from random unlabelled open tiles until every open tile
    /// belongs to one.
    pub fn regions(&mut self) -> Vec<Region> {
        self.flood.reset_labels();
        let mut unlabelled: Vec<Point> = self.open_tiles();
        let mut regions = Vec::new();
        while let Some(region) = self.fill_random(&mut unlabelled) {
            regions.push(region);
        }
        regions
    }

    /// Keep only the largest region.
    ///
    /// Every other region becomes void, then edges are re-fixed and
    /// floating walls removed. Re-fixing edges can cut the survivor in two,
    /// so the analysis repeats until at most one region is left.
    pub fn keep_largest(&mut self) -> Resolution {
        let mut res = Resolution::default();
        loop {
            let regions = self.regions();
            if regions.len() <= 1 {
                return res;
            }
            let keep = regions
                .iter()
                .enumerate()
                .max_by(|(ia, a), (ib, b)| a.len().cmp(&b.len()).then(ib.cmp(ia)))
                .map_or(0, |(i, _)| i);
            for (i, region) in regions.iter().enumerate() {
                if i == keep {
                    continue;
                }
                for &p in &region.tiles {
                    self.grid.set_kind(p, TileKind::Void);
                }
                log::debug!("pruned region of {} tiles", region.len());
                res.pruned.push(region.len());
            }
            cleanup::fix_edges(self.grid);
            cleanup::remove_floating_walls(self.grid);
        }
    }

    /// Link every region to an earlier one with a teleporter pair.
    ///
    /// The first region is filled from a random open tile. Each later
    /// region gets a teleporter on its seed tile; the partner goes on a
    /// random free floor of a random earlier region. A region with no
    /// earlier region to link to is walled up instead.
    pub fn link_regions(&mut self) -> Resolution {
        let mut res = Resolution::default();
        self.flood.reset_labels();
        let mut unlabelled: Vec<Point> = self.open_tiles();
        let mut resolved: Vec<Region> = Vec::new();

        while let Some(region) = self.fill_random(&mut unlabelled) {
            if resolved.is_empty() {
                resolved.push(region);
                continue;
            }
            let Some(entry) = region.seed() else {
                continue;
            };
            match self.pick_partner(&resolved) {
                Some(exit) => {
                    self.place_pair(entry, exit);
                    let link = TeleporterLink { entry, exit };
                    log::debug!("teleporter {} <-> {}", link.entry, link.exit);
                    res.teleporters.push(link);
                    resolved.push(region);
                }
                None => {
                    for &p in &region.tiles {
                        self.grid.set_kind(p, TileKind::Wall);
                    }
                    log::debug!("pruned unlinkable region of {} tiles", region.len());
                    res.pruned.push(region.len());
                }
            }
        }
        if !res.pruned.is_empty() {
            cleanup::remove_floating_walls(self.grid);
        }
        res
    }

    fn open_tiles(&self) -> Vec<Point> {
        self.grid
            .iter()
            .filter(|t| t.kind.is_open())
            .map(|t| t.pos)
            .collect()
    }

    /// Fill from a random point of `unlabelled`, then drop every point the
    /// fill reached.
    fn fill_random(&mut self, unlabelled: &mut Vec<Point>) -> Option<Region> {
        if unlabelled.is_empty() {
            return None;
        }
        let seed = unlabelled[self.rng.random_range(0..unlabelled.len())];
        let grid = &*self.grid;
        let nb = Cardinal::new(grid.bounds(), |p| grid.kind_at(p).is_some_and(TileKind::is_open));
        let region = self.flood.fill(&nb, seed)?;
        let flood = &self.flood;
        unlabelled.retain(|&p| !flood.is_labelled(p));
        Some(region)
    }

    /// A random free floor in a random resolved region that still has one.
    fn pick_partner(&mut self, resolved: &[Region]) -> Option<Point> {
        let hosts: Vec<&Region> = resolved
            .iter()
            .filter(|r| r.tiles.iter().any(|&p| self.is_free(p)))
            .collect();
        if hosts.is_empty() {
            return None;
        }
        let host = hosts[self.rng.random_range(0..hosts.len())];
        let free: Vec<Point> = host.tiles.iter().copied().filter(|&p| self.is_free(p)).collect();
        Some(free[self.rng.random_range(0..free.len())])
    }

    fn is_free(&self, p: Point) -> bool {
        self.grid.get(p).is_some_and(|t| t.open_for_placement())
    }

    fn place_pair(&mut self, a: Point, b: Point) {
        for (p, partner) in [(a, b), (b, a)] {
            self.grid.set_kind(p, TileKind::Teleporter);
            if let Some(t) = self.grid.get_mut(p) {
                t.partner = Some(partner);
                t.occupied = true;
            }
        }
    }
}

/// Whether every open tile can be reached from `start` by walking between
/// cardinal open neighbours and jumping between teleporter partners.
pub fn reachable_with_teleporters(grid: &Grid, start: Point) -> bool {
    if !grid.kind_at(start).is_some_and(TileKind::is_open) {
        return false;
    }
    let mut seen = vec![false; grid.len()];
    let mut stack = vec![start];
    if let Some(i) = grid.index(start) {
        seen[i] = true;
    }
    while let Some(p) = stack.pop() {
        let jump = grid.get(p).and_then(|t| t.partner);
        for n in grid.neighbors4(p).chain(jump) {
            if !grid.kind_at(n).is_some_and(TileKind::is_open) {
                continue;
            }
            if let Some(i) = grid.index(n) {
                if !seen[i] {
                    seen[i] = true;
                    stack.push(n);
                }
            }
        }
    }
    grid.iter()
        .filter(|t| t.kind.is_open())
        .all(|t| grid.index(t.pos).is_some_and(|i| seen[i]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const TWO_ROOMS: &str = "\
#########
#...#...#
#...#...#
#...#...#
#########";

    #[test]
    fn regions_partition_open_tiles() {
        let mut grid = Grid::from_ascii(TWO_ROOMS).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let regions = Resolver::new(&mut grid, &mut rng).regions();
        assert_eq!(regions.len(), 2);
        assert!(regions.iter().all(|r| r.len() == 9));
    }

    #[test]
    fn two_rooms_get_one_teleporter_pair() {
        for seed in 0..8 {
            let mut grid = Grid::from_ascii(TWO_ROOMS).unwrap();
            let mut rng = StdRng::seed_from_u64(seed);
            let res = Resolver::new(&mut grid, &mut rng).link_regions();
            assert_eq!(res.teleporters.len(), 1);
            assert!(res.pruned.is_empty());
            let TeleporterLink { entry, exit } = res.teleporters[0];
            assert_ne!(entry.x < 4, exit.x < 4);
            for (p, q) in [(entry, exit), (exit, entry)] {
                let t = grid.get(p).unwrap();
                assert_eq!(t.kind, TileKind::Teleporter);
                assert_eq!(t.partner, Some(q));
                assert!(t.walkable && t.occupied);
            }
            assert_eq!(grid.count_kind(TileKind::Teleporter), 2);
            assert!(reachable_with_teleporters(&grid, Point::new(1, 1)));
        }
    }

    #[test]
    fn single_tile_host_cannot_take_a_partner() {
        // The 1-tile room can never host the partner of a later room once
        // it is itself a teleporter, but some room always can.
        let map = "\
#########
#.#.#...#
#########
#########";
        for seed in 0..16 {
            let mut grid = Grid::from_ascii(map).unwrap();
            let mut rng = StdRng::seed_from_u64(seed);
            let res = Resolver::new(&mut grid, &mut rng).link_regions();
            assert_eq!(res.teleporters.len() + res.pruned.len(), 2);
            let start = grid.iter().find(|t| t.kind.is_open()).unwrap().pos;
            assert!(reachable_with_teleporters(&grid, start));
        }
    }

    #[test]
    fn keep_largest_prunes_the_rest() {
        let map = "\
##########
#..#.....#
#..#.....#
##########";
        let mut grid = Grid::from_ascii(map).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let res = Resolver::new(&mut grid, &mut rng).keep_largest();
        assert_eq!(res.pruned, vec![4]);
        assert_eq!(grid.count_kind(TileKind::Floor), 10);
        assert_eq!(grid.kind_at(Point::new(1, 1)), Some(TileKind::Void));
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(Resolver::new(&mut grid, &mut rng).regions().len(), 1);
    }
}
