//! Cellular-automata cave carving.

use delve_core::{Grid, Point, TileKind};
use rand::{Rng, RngExt};

/// Seeds a grid with random walls and evolves it into caves.
pub struct CaveGen<'a, R: Rng> {
    grid: &'a mut Grid,
    rng: &'a mut R,
}

impl<'a, R: Rng> CaveGen<'a, R> {
    pub fn new(grid: &'a mut Grid, rng: &'a mut R) -> Self {
        Self { grid, rng }
    }

    /// Make each cell a wall with probability `alive_chance`, floor
    /// otherwise.
    pub fn seed(&mut self, alive_chance: f64) {
        for p in self.grid.points() {
            let r: f64 = self.rng.random();
            let kind = if r < alive_chance {
                TileKind::Wall
            } else {
                TileKind::Floor
            };
            self.grid.set_kind(p, kind);
        }
    }

    /// Run `iterations` rounds of the birth/death rule.
    ///
    /// Each round reads from a snapshot of the previous round. Out-of-bounds
    /// neighbours count as walls.
    pub fn simulate(&mut self, death_limit: u8, birth_limit: u8, iterations: u32) {
        let mut snapshot: Vec<TileKind> = Vec::with_capacity(self.grid.len());
        for _ in 0..iterations {
            snapshot.clear();
            snapshot.extend(self.grid.iter().map(|t| t.kind));

            for p in self.grid.points() {
                let walls = wall_count(self.grid, &snapshot, p);
                let Some(i) = self.grid.index(p) else {
                    continue;
                };
                match snapshot[i] {
                    TileKind::Wall if walls < death_limit => self.grid.set_kind(p, TileKind::Floor),
                    TileKind::Floor if walls > birth_limit => self.grid.set_kind(p, TileKind::Wall),
                    _ => {}
                }
            }
        }
    }
}

/// Moore wall count of `p` in `snapshot`.
fn wall_count(grid: &Grid, snapshot: &[TileKind], p: Point) -> u8 {
    p.neighbors_8()
        .into_iter()
        .filter(|&n| match grid.index(n) {
            Some(i) => snapshot[i] == TileKind::Wall,
            None => true,
        })
        .count() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn seed_extremes() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut grid = Grid::new(8, 8);
        CaveGen::new(&mut grid, &mut rng).seed(0.0);
        assert_eq!(grid.count_kind(TileKind::Floor), 64);
        CaveGen::new(&mut grid, &mut rng).seed(1.0);
        assert_eq!(grid.count_kind(TileKind::Wall), 64);
    }

    #[test]
    fn simulate_uses_snapshot() {
        // A lone wall dies (0 wall neighbours < 3). Its floor neighbours see
        // one wall in the snapshot, not zero, but stay floor either way. The
        // corners of the grid see 5 outside walls and become walls.
        let mut grid = Grid::from_ascii(
            "\
.....
.....
..#..
.....
.....",
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        CaveGen::new(&mut grid, &mut rng).simulate(3, 4, 1);
        assert_eq!(
            grid.to_ascii(),
            "\
#...#
.....
.....
.....
#...#
"
        );
    }

    #[test]
    fn zero_iterations_is_identity() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut grid = Grid::new(10, 10);
        CaveGen::new(&mut grid, &mut rng).seed(0.45);
        let before = grid.clone();
        CaveGen::new(&mut grid, &mut rng).simulate(3, 4, 0);
        assert_eq!(grid, before);
    }

    #[test]
    fn same_seed_same_cave() {
        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut grid = Grid::new(20, 30);
            let mut cave = CaveGen::new(&mut grid, &mut rng);
            cave.seed(0.4);
            cave.simulate(3, 4, 5);
            grid.to_ascii()
        };
        assert_eq!(run(42), run(42));
    }
}
