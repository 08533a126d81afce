use delve_core::Point;

/// Number of cardinal steps between `a` and `b` on an open grid.
#[inline]
pub fn manhattan(a: Point, b: Point) -> i32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

/// Number of king moves between `a` and `b` on an open grid.
#[inline]
pub fn chebyshev(a: Point, b: Point) -> i32 {
    (a.x - b.x).abs().max((a.y - b.y).abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symmetric() {
        let a = Point::new(1, 1);
        let b = Point::new(4, -1);
        assert_eq!(manhattan(a, b), 5);
        assert_eq!(manhattan(b, a), 5);
        assert_eq!(manhattan(a, a), 0);
    }

    #[test]
    fn chebyshev_counts_diagonal_steps_once() {
        let o = Point::new(0, 0);
        assert_eq!(chebyshev(o, Point::new(3, -3)), 3);
        assert_eq!(chebyshev(o, Point::new(-1, 4)), 4);
        assert_eq!(chebyshev(Point::new(2, 5), Point::new(2, 5)), 0);
        for n in o.neighbors_8() {
            assert_eq!(chebyshev(o, n), 1);
        }
    }
}
