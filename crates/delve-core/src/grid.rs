//! The [`Grid`] type: a fixed-size rows×cols arena of [`Tile`]s.
//!
//! Tiles are stored row-major in a single `Vec` and addressed by [`Point`].
//! Neighbour relations are computed from coordinates; the per-tile
//! [`links`](Tile::links) are a cached copy refreshed by
//! [`recompute_neighbor_links`](Grid::recompute_neighbor_links).

use crate::error::GridError;
use crate::geom::{Direction, Point, Range, RangeIter};
use crate::tile::{Tile, TileKind};

/// Smallest allowed number of rows or columns.
pub const MIN_SIDE: i32 = 4;

/// A rows×cols grid of tiles.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Grid {
    rows: i32,
    cols: i32,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Create a grid of floor tiles. Each side is clamped up to
    /// [`MIN_SIDE`].
    pub fn new(rows: i32, cols: i32) -> Self {
        let rows = rows.max(MIN_SIDE);
        let cols = cols.max(MIN_SIDE);
        let bounds = Range::new(0, 0, cols, rows);
        let tiles = bounds
            .iter()
            .map(|p| {
                let mut t = Tile::new(p);
                t.is_map_edge = bounds.on_border(p);
                t
            })
            .collect();
        let mut grid = Self { rows, cols, tiles };
        grid.recompute_neighbor_links();
        grid
    }

    /// Parse an ASCII map using [`TileKind::glyph`] characters, one line per
    /// row.
    pub fn from_ascii(s: &str) -> Result<Self, GridError> {
        let lines: Vec<&str> = s.lines().collect();
        let expected = lines.first().map_or(0, |l| l.chars().count());
        let rows = lines.len() as i32;
        let cols = expected as i32;
        if rows < MIN_SIDE || cols < MIN_SIDE {
            return Err(GridError::TooSmall { rows, cols });
        }
        let mut grid = Self::new(rows, cols);
        for (y, line) in lines.iter().enumerate() {
            let found = line.chars().count();
            if found != expected {
                return Err(GridError::InconsistentSize {
                    line: y,
                    expected,
                    found,
                });
            }
            for (x, ch) in line.chars().enumerate() {
                let pos = Point::new(x as i32, y as i32);
                let kind = TileKind::from_glyph(ch).ok_or(GridError::InvalidGlyph { ch, pos })?;
                grid.set_kind(pos, kind);
            }
        }
        Ok(grid)
    }

    /// Render the categories back to the ASCII map format.
    pub fn to_ascii(&self) -> String {
        let mut s = String::with_capacity(self.tiles.len() + self.rows as usize);
        for row in self.tiles.chunks(self.cols as usize) {
            s.extend(row.iter().map(|t| t.kind.glyph()));
            s.push('\n');
        }
        s
    }

    #[inline]
    pub fn rows(&self) -> i32 {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> i32 {
        self.cols
    }

    /// The bounding range: x in `0..cols`, y in `0..rows`.
    #[inline]
    pub fn bounds(&self) -> Range {
        Range::new(0, 0, self.cols, self.rows)
    }

    /// Total number of tiles.
    #[inline]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        self.bounds().contains(p)
    }

    /// Row-major index of `p`, or `None` outside the grid.
    #[inline]
    pub fn index(&self, p: Point) -> Option<usize> {
        self.bounds().offset_of(p)
    }

    /// Get the tile at `p`, or `None` if out of bounds.
    #[inline]
    pub fn get(&self, p: Point) -> Option<&Tile> {
        self.index(p).map(|i| &self.tiles[i])
    }

    /// Mutable variant of [`get`](Self::get).
    #[inline]
    pub fn get_mut(&mut self, p: Point) -> Option<&mut Tile> {
        self.index(p).map(|i| &mut self.tiles[i])
    }

    /// Bounds-checked tile access.
    pub fn tile_at(&self, p: Point) -> Result<&Tile, GridError> {
        let bounds = self.bounds();
        self.get(p).ok_or(GridError::OutOfRange { pos: p, bounds })
    }

    /// Bounds-checked mutable tile access.
    pub fn tile_at_mut(&mut self, p: Point) -> Result<&mut Tile, GridError> {
        let bounds = self.bounds();
        self.get_mut(p).ok_or(GridError::OutOfRange { pos: p, bounds })
    }

    /// Category at `p`, or `None` if out of bounds.
    #[inline]
    pub fn kind_at(&self, p: Point) -> Option<TileKind> {
        self.get(p).map(|t| t.kind)
    }

    /// Whether `p` is outside the grid or holds a wall or void tile.
    #[inline]
    pub fn closed_or_outside(&self, p: Point) -> bool {
        self.kind_at(p).is_none_or(TileKind::is_closed)
    }

    /// Whether `p` is a void tile or outside the grid.
    #[inline]
    pub fn void_or_outside(&self, p: Point) -> bool {
        self.kind_at(p).is_none_or(|k| k == TileKind::Void)
    }

    /// Reclassify the tile at `p`, resetting `walkable`/`occupied` to the
    /// defaults of the new category. Does nothing if out of bounds.
    pub fn set_kind(&mut self, p: Point, kind: TileKind) {
        let Some(t) = self.get_mut(p) else {
            return;
        };
        t.kind = kind;
        t.walkable = kind.walkable();
        t.occupied = matches!(kind, TileKind::Water);
        if kind != TileKind::Floor {
            t.grass = false;
        }
        if kind != TileKind::Teleporter {
            t.partner = None;
        }
    }

    /// Set every tile to `kind`.
    pub fn fill(&mut self, kind: TileKind) {
        for p in self.bounds() {
            self.set_kind(p, kind);
        }
    }

    /// In-bounds cardinal neighbours of `p`.
    pub fn neighbors4(&self, p: Point) -> impl Iterator<Item = Point> + '_ {
        p.neighbors_4().into_iter().filter(|&n| self.contains(n))
    }

    /// In-bounds Moore neighbours of `p`.
    pub fn neighbors8(&self, p: Point) -> impl Iterator<Item = Point> + '_ {
        p.neighbors_8().into_iter().filter(|&n| self.contains(n))
    }

    /// Rewire every tile's four cardinal links. Directions leading out of
    /// the grid get no link.
    pub fn recompute_neighbor_links(&mut self) {
        let bounds = self.bounds();
        for t in &mut self.tiles {
            for d in Direction::ALL {
                let n = t.pos.step(d);
                t.links[d.index()] = bounds.contains(n).then_some(n);
            }
        }
    }

    /// Whether every link is mirrored by the opposite link of its target.
    pub fn links_consistent(&self) -> bool {
        self.tiles.iter().all(|t| {
            Direction::ALL.into_iter().all(|d| match t.link(d) {
                Some(n) => self
                    .get(n)
                    .is_some_and(|o| o.link(d.opposite()) == Some(t.pos)),
                None => !self.contains(t.pos.step(d)),
            })
        })
    }

    /// Number of tiles of the given category.
    pub fn count_kind(&self, kind: TileKind) -> usize {
        self.tiles.iter().filter(|t| t.kind == kind).count()
    }

    /// Fraction of tiles that are open cave (floor, teleporter, exit).
    pub fn open_fraction(&self) -> f64 {
        let open = self.tiles.iter().filter(|t| t.kind.is_open()).count();
        open as f64 / self.tiles.len() as f64
    }

    /// Unoccupied floor tiles, row-major.
    pub fn open_points(&self) -> Vec<Point> {
        self.tiles
            .iter()
            .filter(|t| t.open_for_placement())
            .map(|t| t.pos)
            .collect()
    }

    /// Row-major iterator over all points.
    #[inline]
    pub fn points(&self) -> RangeIter {
        self.bounds().iter()
    }

    /// Row-major iterator over all tiles.
    pub fn iter(&self) -> std::slice::Iter<'_, Tile> {
        self.tiles.iter()
    }

    /// Clear the `visible` flag of every tile. `visited` is kept.
    pub fn reset_visibility(&mut self) {
        for t in &mut self.tiles {
            t.visible = false;
        }
    }
}

impl<'a> IntoIterator for &'a Grid {
    type Item = &'a Tile;
    type IntoIter = std::slice::Iter<'a, Tile>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
