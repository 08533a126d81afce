//! Fog of war.
//!
//! [`Vision::update`] recomputes the visible set for one observer from a
//! clean state:
//!
//! 1. **Cast**: a Bresenham ray from the observer to every border tile of
//!    the grid. Each ray marks tiles until it hits a sight blocker (which
//!    is marked too). A diagonal step between two closed corner tiles ends
//!    the ray.
//! 2. **Limit**: tiles more than `radius` cardinal steps away are dropped.
//! 3. **Circularize**: for `radius >= 3` the diamond is trimmed at its
//!    four tips and next to the north and south tips.
//! 4. **Reveal**: visible open tiles reveal the walls facing the observer's
//!    side of them.
//! 5. **Edge propagation**: edge walls next to a visible wall are revealed.
//!
//! Finally the grid's `visible` flags are set and `visited` accumulates.

use delve_core::{Grid, GridError, Point, Range, TileKind};
use delve_fill::{Cardinal, FloodRange};

/// Smallest usable view radius; lower values are clamped up.
pub const MIN_VIEW_RADIUS: i32 = 1;

/// Errors of [`Vision::update`].
pub type VisionError = GridError;

/// Visibility computation with reusable buffers.
pub struct Vision {
    bounds: Range,
    /// Range limiting.
    flood: FloodRange,
    /// Tiles allowed after limiting and circularizing.
    mask: Vec<bool>,
    /// Tiles seen in the current update.
    lit: Vec<bool>,
    /// Cached list of visible points from the last update, row-major.
    visible: Vec<Point>,
    ray: Vec<Point>,
    pending: Vec<Point>,
}

impl Vision {
    /// Create a new `Vision` for grids covering `bounds`.
    pub fn new(bounds: Range) -> Self {
        let len = bounds.len();
        Self {
            bounds,
            flood: FloodRange::new(bounds),
            mask: vec![false; len],
            lit: vec![false; len],
            visible: Vec::new(),
            ray: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Recompute what `observer` sees within `radius` cardinal steps and
    /// write it to the grid's `visible`/`visited` flags.
    ///
    /// `radius` is clamped to `MIN_VIEW_RADIUS..=rows + cols`. The diamond
    /// is only trimmed into a rounder shape from radius 3 up; smaller radii
    /// see the full diamond.
    ///
    /// Returns the visible points in row-major order.
    pub fn update(
        &mut self,
        grid: &mut Grid,
        observer: Point,
        radius: i32,
    ) -> Result<&[Point], VisionError> {
        grid.tile_at(observer)?;
        if grid.bounds() != self.bounds {
            *self = Self::new(grid.bounds());
        }
        let radius = radius.clamp(MIN_VIEW_RADIUS, grid.rows() + grid.cols());

        // Reset.
        grid.reset_visibility();
        self.lit.fill(false);
        self.visible.clear();

        self.cast(grid, observer);
        self.limit(observer, radius);
        if radius >= 3 {
            self.circularize(observer, radius);
        }
        for (lit, &allowed) in self.lit.iter_mut().zip(&self.mask) {
            *lit &= allowed;
        }
        self.reveal(grid, observer);
        self.propagate_edges(grid);

        // Finalize.
        for p in self.bounds {
            if !self.is_lit(p) {
                continue;
            }
            if let Some(t) = grid.get_mut(p) {
                t.visible = true;
                t.visited = true;
            }
            self.visible.push(p);
        }
        Ok(&self.visible)
    }

    /// Whether `p` was visible in the last update.
    pub fn visible(&self, p: Point) -> bool {
        self.is_lit(p)
    }

    /// Visible points from the last update, row-major.
    pub fn iter_visible(&self) -> impl Iterator<Item = Point> + '_ {
        self.visible.iter().copied()
    }

    fn idx(&self, p: Point) -> Option<usize> {
        self.bounds.offset_of(p)
    }

    fn is_lit(&self, p: Point) -> bool {
        self.idx(p).is_some_and(|i| self.lit[i])
    }

    fn in_mask(&self, p: Point) -> bool {
        self.idx(p).is_some_and(|i| self.mask[i])
    }

    fn light(&mut self, p: Point) {
        if let Some(i) = self.idx(p) {
            self.lit[i] = true;
        }
    }

    fn cast(&mut self, grid: &Grid, observer: Point) {
        self.light(observer);
        let mut ray = std::mem::take(&mut self.ray);
        for target in self.bounds.border() {
            bresenham(observer, target, &mut ray);
            for w in ray.windows(2) {
                let (prev, p) = (w[0], w[1]);
                let Some(kind) = grid.kind_at(p) else {
                    break;
                };
                let blocks = kind.blocks_sight();
                let (dx, dy) = (p.x - prev.x, p.y - prev.y);
                if dx != 0 && dy != 0 && !blocks {
                    // Squeezing between two closed corners.
                    let c1 = Point::new(prev.x + dx, prev.y);
                    let c2 = Point::new(prev.x, prev.y + dy);
                    if grid.closed_or_outside(c1) && grid.closed_or_outside(c2) {
                        break;
                    }
                }
                self.light(p);
                if blocks {
                    break;
                }
            }
        }
        self.ray = ray;
    }

    fn limit(&mut self, observer: Point, radius: i32) {
        self.mask.fill(false);
        let nb = Cardinal::new(self.bounds, |_: Point| true);
        let bounds = self.bounds;
        for n in self.flood.bfs_map(&nb, &[observer], radius) {
            if let Some(i) = bounds.offset_of(n.pos) {
                self.mask[i] = true;
            }
        }
    }

    fn circularize(&mut self, o: Point, radius: i32) {
        let mut trimmed = vec![
            o.shift(radius, 0),
            o.shift(-radius, 0),
            o.shift(0, radius),
            o.shift(0, -radius),
        ];
        // Tiles are taller than wide: the vertical reach is trimmed further.
        for dy in [radius - 1, 1 - radius] {
            trimmed.extend((-1..=1).map(|dx| o.shift(dx, dy)));
        }
        for p in trimmed {
            if let Some(i) = self.idx(p) {
                self.mask[i] = false;
            }
        }
    }

    fn reveal(&mut self, grid: &Grid, o: Point) {
        self.pending.clear();
        for p in self.bounds {
            if !self.is_lit(p) || grid.kind_at(p).is_none_or(TileKind::is_closed) {
                continue;
            }
            let (sx, sy) = ((p.x - o.x).signum(), (p.y - o.y).signum());
            let cardinal = p.neighbors_4();
            let diagonal = [p.shift(sx, 0), p.shift(0, sy)];
            let facing: &[Point] = if sx == 0 || sy == 0 {
                &cardinal
            } else {
                &diagonal
            };
            for &n in facing {
                if grid.kind_at(n) == Some(TileKind::Wall) && self.in_mask(n) {
                    self.pending.push(n);
                }
            }
        }
        let pending = std::mem::take(&mut self.pending);
        for &p in &pending {
            self.light(p);
        }
        self.pending = pending;
    }

    fn propagate_edges(&mut self, grid: &Grid) {
        self.pending.clear();
        for t in grid.iter() {
            let hidden_edge = t.is_edge && t.kind == TileKind::Wall && !self.is_lit(t.pos);
            if !hidden_edge || !self.in_mask(t.pos) {
                continue;
            }
            let near_lit_wall = grid
                .neighbors4(t.pos)
                .any(|n| self.is_lit(n) && grid.kind_at(n) == Some(TileKind::Wall));
            if near_lit_wall {
                self.pending.push(t.pos);
            }
        }
        let pending = std::mem::take(&mut self.pending);
        for &p in &pending {
            self.light(p);
        }
        self.pending = pending;
    }
}

/// Rasterize the line from `from` to `to`, both included, into `buf`.
pub fn bresenham(from: Point, to: Point, buf: &mut Vec<Point>) {
    buf.clear();
    let dx = (to.x - from.x).abs();
    let dy = -(to.y - from.y).abs();
    let sx = if from.x < to.x { 1 } else { -1 };
    let sy = if from.y < to.y { 1 } else { -1 };
    let mut err = dx + dy;
    let mut p = from;
    loop {
        buf.push(p);
        if p == to {
            return;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            p.x += sx;
        }
        if e2 <= dx {
            err += dx;
            p.y += sy;
        }
    }
}
