//! Geometry primitives: [`Point`], [`Direction`] and [`Range`].
//!
//! X grows right and Y grows down, so north is `y - 1`.

use std::fmt;

/// A tile coordinate.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// Moore ring offsets, clockwise from north. Cardinals sit at even slots.
const RING: [(i32, i32); 8] = [
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];

impl Point {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The point `dx` columns and `dy` rows away.
    #[inline]
    pub const fn shift(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// The neighbour one step away in direction `d`.
    #[inline]
    pub const fn step(self, d: Direction) -> Self {
        let (dx, dy) = d.offset();
        self.shift(dx, dy)
    }

    /// North, east, south and west neighbours, in [`Direction::ALL`] order.
    #[inline]
    pub fn neighbors_4(self) -> [Point; 4] {
        Direction::ALL.map(|d| self.step(d))
    }

    /// The Moore ring around the point, clockwise from north.
    #[inline]
    pub fn neighbors_8(self) -> [Point; 8] {
        RING.map(|(dx, dy)| self.shift(dx, dy))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A cardinal direction. The discriminant is the tile link slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    North = 0,
    East = 1,
    South = 2,
    West = 3,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Self::North, Self::East, Self::South, Self::West];

    #[inline]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }

    #[inline]
    pub const fn opposite(self) -> Self {
        Self::ALL[(self as usize + 2) % 4]
    }

    /// Slot in a tile's `links` array.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// A rectangle of points with `min` included and `max` excluded.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Range {
    pub min: Point,
    pub max: Point,
}

impl Range {
    /// The range spanned by two corners, in either order.
    #[inline]
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self {
            min: Point::new(x0.min(x1), y0.min(y1)),
            max: Point::new(x0.max(x1), y0.max(y1)),
        }
    }

    #[inline]
    pub fn width(self) -> i32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(self) -> i32 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn len(self) -> usize {
        (self.width().max(0) as usize) * (self.height().max(0) as usize)
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn contains(self, p: Point) -> bool {
        (self.min.x..self.max.x).contains(&p.x) && (self.min.y..self.max.y).contains(&p.y)
    }

    /// Row-major offset of `p`, if inside.
    #[inline]
    pub fn offset_of(self, p: Point) -> Option<usize> {
        self.contains(p)
            .then(|| ((p.y - self.min.y) * self.width() + (p.x - self.min.x)) as usize)
    }

    /// Whether `p` is inside and on the outermost ring.
    #[inline]
    pub fn on_border(self, p: Point) -> bool {
        self.contains(p)
            && (p.x == self.min.x
                || p.y == self.min.y
                || p.x == self.max.x - 1
                || p.y == self.max.y - 1)
    }

    /// Points of the outermost ring, row-major, each listed once.
    pub fn border(self) -> Vec<Point> {
        self.iter().filter(|&p| self.on_border(p)).collect()
    }

    /// Every point, row-major.
    #[inline]
    pub fn iter(self) -> RangeIter {
        RangeIter {
            range: self,
            next: 0,
        }
    }
}

impl IntoIterator for Range {
    type Item = Point;
    type IntoIter = RangeIter;

    #[inline]
    fn into_iter(self) -> RangeIter {
        self.iter()
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.min, self.max)
    }
}

/// Row-major iterator over a [`Range`].
#[derive(Clone, Debug)]
pub struct RangeIter {
    range: Range,
    next: usize,
}

impl Iterator for RangeIter {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        if self.next >= self.range.len() {
            return None;
        }
        let w = self.range.width() as usize;
        let p = self
            .range
            .min
            .shift((self.next % w) as i32, (self.next / w) as i32);
        self.next += 1;
        Some(p)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.range.len().saturating_sub(self.next);
        (left, Some(left))
    }
}

impl ExactSizeIterator for RangeIter {}
