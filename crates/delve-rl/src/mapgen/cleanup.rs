//! Topology cleanup passes.
//!
//! Every pass scans the grid in row-major order and returns the number of
//! tiles it changed. "Closed" means wall or void; cells outside the grid
//! count as closed.

use delve_core::{Grid, Point, TileKind};

/// Run the standard cleanup sequence: single-tile pockets, then leaking
/// edges, then floating walls.
pub fn clean(grid: &mut Grid) -> usize {
    remove_unreachable_single_tiles(grid) + fix_edges(grid) + remove_floating_walls(grid)
}

/// Turn floor tiles boxed in on all four sides into void.
pub fn remove_unreachable_single_tiles(grid: &mut Grid) -> usize {
    let targets: Vec<Point> = grid
        .iter()
        .filter(|t| t.kind == TileKind::Floor)
        .map(|t| t.pos)
        .filter(|&p| cardinally_enclosed(grid, p))
        .collect();
    for &p in &targets {
        grid.set_kind(p, TileKind::Void);
    }
    targets.len()
}

/// Wall off every open or water tile that touches void (or the outside of
/// the grid) in any of its eight directions.
pub fn fix_edges(grid: &mut Grid) -> usize {
    let targets: Vec<Point> = grid
        .iter()
        .filter(|t| !t.kind.is_closed())
        .map(|t| t.pos)
        .filter(|&p| p.neighbors_8().into_iter().any(|n| grid.void_or_outside(n)))
        .collect();
    for &p in &targets {
        grid.set_kind(p, TileKind::Wall);
    }
    targets.len()
}

/// Turn walls surrounded by closed tiles in all eight directions into void.
pub fn remove_floating_walls(grid: &mut Grid) -> usize {
    let targets: Vec<Point> = grid
        .iter()
        .filter(|t| t.kind == TileKind::Wall)
        .map(|t| t.pos)
        .filter(|&p| p.neighbors_8().into_iter().all(|n| grid.closed_or_outside(n)))
        .collect();
    for &p in &targets {
        grid.set_kind(p, TileKind::Void);
    }
    targets.len()
}

/// Repeatedly remove walls that are closed in on all four cardinal sides
/// until a pass removes nothing.
///
/// This thins wall bands down to the single layer facing the cave. A wall
/// removed here may leave void diagonally next to a floor tile.
pub fn smooth_map_edges(grid: &mut Grid) -> usize {
    let mut total = 0;
    loop {
        let mut removed = 0;
        for p in grid.points() {
            if grid.kind_at(p) == Some(TileKind::Wall) && cardinally_enclosed(grid, p) {
                grid.set_kind(p, TileKind::Void);
                removed += 1;
            }
        }
        if removed == 0 {
            return total;
        }
        total += removed;
    }
}

/// Flag the walls closed in on all four cardinal sides as edges and return
/// them. The flag is cleared everywhere else.
pub fn set_up_edges(grid: &mut Grid) -> Vec<Point> {
    let edges: Vec<Point> = grid
        .iter()
        .filter(|t| t.kind == TileKind::Wall)
        .map(|t| t.pos)
        .filter(|&p| cardinally_enclosed(grid, p))
        .collect();
    for p in grid.points() {
        if let Some(t) = grid.get_mut(p) {
            t.is_edge = false;
        }
    }
    for &p in &edges {
        if let Some(t) = grid.get_mut(p) {
            t.is_edge = true;
        }
    }
    edges
}

fn cardinally_enclosed(grid: &Grid, p: Point) -> bool {
    p.neighbors_4().into_iter().all(|n| grid.closed_or_outside(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(s: &str) -> Grid {
        Grid::from_ascii(s).unwrap()
    }

    #[test]
    fn open_grid_gets_a_wall_ring() {
        let mut g = Grid::new(10, 10);
        assert_eq!(fix_edges(&mut g), 36);
        for t in &g {
            assert_eq!(t.kind == TileKind::Wall, t.is_map_edge);
        }
        assert_eq!(remove_floating_walls(&mut g), 0);
    }

    #[test]
    fn single_pockets_become_void() {
        let mut g = map(
            "\
#####
#.#.#
###.#
#####",
        );
        assert_eq!(remove_unreachable_single_tiles(&mut g), 1);
        assert_eq!(g.kind_at(Point::new(1, 1)), Some(TileKind::Void));
        assert_eq!(g.kind_at(Point::new(3, 1)), Some(TileKind::Floor));
    }

    #[test]
    fn fix_edges_walls_diagonal_contact() {
        let mut g = map(
            "\
#####
#...#
#.. #
#####",
        );
        fix_edges(&mut g);
        // Everything within one step of the void at (3,2) is walled.
        assert_eq!(
            g.to_ascii(),
            "\
#####
#.###
#.# #
#####
"
        );
    }

    #[test]
    fn solid_rock_floats_away() {
        let mut g = Grid::new(6, 6);
        g.fill(TileKind::Wall);
        assert_eq!(remove_floating_walls(&mut g), 36);
        assert_eq!(g.count_kind(TileKind::Void), 36);
    }

    #[test]
    fn walls_next_to_floor_stay() {
        let mut g = map(
            "\
######
#....#
#....#
######",
        );
        assert_eq!(remove_floating_walls(&mut g), 0);
    }

    #[test]
    fn smoothing_removes_enclosed_corners() {
        let mut g = map(
            "\
######
#....#
#....#
######",
        );
        let edges = set_up_edges(&mut g);
        assert_eq!(edges.len(), 4);
        assert!(g.get(Point::new(0, 0)).is_some_and(|t| t.is_edge));
        assert!(!g.get(Point::new(1, 0)).is_some_and(|t| t.is_edge));

        assert_eq!(smooth_map_edges(&mut g), 4);
        assert_eq!(g.kind_at(Point::new(5, 3)), Some(TileKind::Void));
        assert!(set_up_edges(&mut g).is_empty());
        assert!(!g.get(Point::new(0, 0)).is_some_and(|t| t.is_edge));
    }

    #[test]
    fn clean_keeps_no_leak_and_no_floating() {
        let mut g = map(
            "\
########
#......#
#.####.#
#.#  #.#
#.####.#
#......#
########",
        );
        g.set_kind(Point::new(3, 3), TileKind::Floor);
        clean(&mut g);
        for p in g.points() {
            let k = g.kind_at(p);
            if k.is_some_and(|k| !k.is_closed()) {
                assert!(p.neighbors_8().iter().all(|&n| !g.void_or_outside(n)));
            }
            if k == Some(TileKind::Wall) {
                assert!(!p.neighbors_8().iter().all(|&n| g.closed_or_outside(n)));
            }
        }
        assert_eq!(g.kind_at(Point::new(3, 3)), Some(TileKind::Void));
    }
}
