use delve_core::Point;

/// Neighbour enumeration driving every fill.
pub trait Neighborhood {
    /// Append the neighbours of `p` reachable in one step into `buf`.
    /// The caller clears `buf` before calling.
    fn neighbors(&self, p: Point, buf: &mut Vec<Point>);
}
