use delve_core::{Point, Range};

use crate::traits::Neighborhood;

/// 4-directional (von Neumann) neighbourhood inside `bounds`, keeping only
/// points for which `keep` returns `true`.
pub struct Cardinal<F> {
    bounds: Range,
    keep: F,
}

impl<F: Fn(Point) -> bool> Cardinal<F> {
    pub fn new(bounds: Range, keep: F) -> Self {
        Self { bounds, keep }
    }
}

impl<F: Fn(Point) -> bool> Neighborhood for Cardinal<F> {
    fn neighbors(&self, p: Point, buf: &mut Vec<Point>) {
        for n in p.neighbors_4() {
            if self.bounds.contains(n) && (self.keep)(n) {
                buf.push(n);
            }
        }
    }
}

/// 8-directional (Moore) neighbourhood inside `bounds`, keeping only points
/// for which `keep` returns `true`.
pub struct Moore<F> {
    bounds: Range,
    keep: F,
}

impl<F: Fn(Point) -> bool> Moore<F> {
    pub fn new(bounds: Range, keep: F) -> Self {
        Self { bounds, keep }
    }
}

impl<F: Fn(Point) -> bool> Neighborhood for Moore<F> {
    fn neighbors(&self, p: Point, buf: &mut Vec<Point>) {
        for n in p.neighbors_8() {
            if self.bounds.contains(n) && (self.keep)(n) {
                buf.push(n);
            }
        }
    }
}
