//! Property tests over random seeds and map shapes.

use delve_core::{Grid, Point, TileKind};
use delve_rl::mapgen::{GenConfig, generate, reachable_with_teleporters};
use delve_rl::{MIN_VIEW_RADIUS, Vision};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn config(rows: i32, cols: i32, alive: f64, allow_disconnected: bool) -> GenConfig {
    GenConfig {
        rows,
        cols,
        alive_chance: alive,
        allow_disconnected,
        ..GenConfig::default()
    }
}

// ============================================================
// Generation
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_any_seed_generates_a_playable_level(
        seed in any::<u64>(),
        rows in 8i32..30,
        cols in 8i32..40,
        alive in 0.3f64..0.55,
        allow in any::<bool>(),
    ) {
        let cfg = config(rows, cols, alive, allow);
        let mut rng = StdRng::seed_from_u64(seed);
        let d = generate(&cfg, &mut rng).unwrap();
        let grid = &d.grid;

        prop_assert_eq!(grid.rows(), rows);
        prop_assert_eq!(grid.cols(), cols);
        prop_assert!(d.attempts >= 1 && d.attempts <= cfg.max_attempts);
        prop_assert_ne!(d.spawn, d.exit);
        prop_assert_eq!(grid.kind_at(d.exit), Some(TileKind::Exit));
        prop_assert!(reachable_with_teleporters(grid, d.spawn), "exit unreachable for seed={seed}");
        if !allow {
            prop_assert_eq!(grid.count_kind(TileKind::Teleporter), 0);
        }

        for t in grid.iter().filter(|t| !t.kind.is_closed()) {
            let leak = t.pos.neighbors_8().into_iter().any(|n| grid.void_or_outside(n));
            prop_assert!(!leak, "{:?} at {} touches void", t.kind, t.pos);
        }
        for t in grid.iter().filter(|t| t.kind == TileKind::Water) {
            prop_assert!(grid.neighbors4(t.pos).any(|n| grid.kind_at(n) == Some(TileKind::Water)));
        }
        for t in grid.iter().filter(|t| t.kind == TileKind::Teleporter) {
            let partner = t.partner.unwrap();
            prop_assert_eq!(grid.get(partner).unwrap().partner, Some(t.pos));
        }
    }

    #[test]
    fn prop_generation_is_deterministic(seed in any::<u64>(), allow in any::<bool>()) {
        let cfg = config(20, 30, 0.45, allow);
        let a = generate(&cfg, &mut StdRng::seed_from_u64(seed)).unwrap();
        let b = generate(&cfg, &mut StdRng::seed_from_u64(seed)).unwrap();
        prop_assert_eq!(a.grid.to_ascii(), b.grid.to_ascii());
        prop_assert_eq!(a.events, b.events);
    }
}

// ============================================================
// Vision
// ============================================================

fn open_room(rows: i32, cols: i32) -> Grid {
    let mut grid = Grid::new(rows, cols);
    for p in grid.points() {
        if grid.bounds().on_border(p) {
            grid.set_kind(p, TileKind::Wall);
        }
    }
    grid
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_visible_tiles_stay_in_range(
        seed in any::<u64>(),
        radius in -2i32..10,
        pick in any::<prop::sample::Index>(),
    ) {
        let cfg = config(20, 30, 0.45, false);
        let d = generate(&cfg, &mut StdRng::seed_from_u64(seed)).unwrap();
        let mut grid = d.grid;
        let open: Vec<Point> = grid.iter().filter(|t| t.kind.is_open()).map(|t| t.pos).collect();
        let observer = open[pick.index(open.len())];

        let mut vision = Vision::new(grid.bounds());
        let seen = vision.update(&mut grid, observer, radius).unwrap().to_vec();
        let r = radius.max(MIN_VIEW_RADIUS);
        prop_assert!(seen.contains(&observer));
        for &p in &seen {
            let dist = (p.x - observer.x).abs() + (p.y - observer.y).abs();
            prop_assert!(dist <= r, "{p} at distance {dist} with radius {r}");
            prop_assert!(grid.get(p).unwrap().visible);
        }
        prop_assert_eq!(grid.iter().filter(|t| t.visible).count(), seen.len());
    }

    #[test]
    fn prop_solid_ring_hides_the_outside(x in 3i32..8, y in 3i32..8, radius in 3i32..8) {
        // A wall ring at distance 1 around the observer, floor beyond.
        let mut grid = Grid::new(12, 12);
        let o = Point::new(x, y);
        for n in o.neighbors_8() {
            grid.set_kind(n, TileKind::Wall);
        }
        let mut vision = Vision::new(grid.bounds());
        let seen = vision.update(&mut grid, o, radius).unwrap();
        for p in seen {
            prop_assert!((p.x - x).abs() <= 1 && (p.y - y).abs() <= 1, "{p} seen through walls");
        }
    }

    #[test]
    fn prop_small_radius_sees_whole_diamond(
        x in 2i32..10,
        y in 2i32..8,
        radius in 1i32..3,
    ) {
        let mut grid = open_room(10, 12);
        let o = Point::new(x, y);
        let mut vision = Vision::new(grid.bounds());
        vision.update(&mut grid, o, radius).unwrap();
        for p in grid.points() {
            let dist = (p.x - x).abs() + (p.y - y).abs();
            if dist <= radius {
                prop_assert!(vision.visible(p), "{p} hidden at distance {dist}");
            }
        }
    }

    #[test]
    fn prop_open_room_sees_diamond_minus_trims(radius in 3i32..8, half in 8i32..13) {
        // Observer centred in a square room, walls farther than the radius.
        let side = 2 * half + 1;
        let mut grid = open_room(side, side);
        let o = Point::new(half, half);
        let mut vision = Vision::new(grid.bounds());
        vision.update(&mut grid, o, radius).unwrap();

        let mut trimmed = vec![
            o.shift(radius, 0),
            o.shift(-radius, 0),
            o.shift(0, radius),
            o.shift(0, -radius),
        ];
        for dx in -1..=1 {
            trimmed.push(o.shift(dx, radius - 1));
            trimmed.push(o.shift(dx, 1 - radius));
        }
        for &p in &trimmed {
            prop_assert!(!vision.visible(p), "{p} should be trimmed at radius {radius}");
        }
        for p in grid.points() {
            let dist = (p.x - o.x).abs() + (p.y - o.y).abs();
            if dist <= radius && !trimmed.contains(&p) {
                prop_assert!(vision.visible(p), "{p} hidden at distance {dist}");
            } else if dist > radius {
                prop_assert!(!vision.visible(p), "{p} seen at distance {dist}");
            }
        }
    }
}
