use delve_core::Point;

use crate::FloodRange;
use crate::flood::{PathNode, UNREACHABLE};
use crate::traits::Neighborhood;

impl FloodRange {
    /// Breadth-first step counts from every point of `sources`, going no
    /// further than `max_dist` steps.
    ///
    /// Returns the reached cells in visiting order, sources first. Sources
    /// outside the range are ignored.
    pub fn bfs_map<N: Neighborhood>(
        &mut self,
        nb: &N,
        sources: &[Point],
        max_dist: i32,
    ) -> &[PathNode] {
        self.dist.fill(UNREACHABLE);
        self.reached.clear();
        self.queue.clear();

        for &src in sources {
            let Some(i) = self.idx(src) else {
                continue;
            };
            if self.dist[i] == 0 {
                continue;
            }
            self.dist[i] = 0;
            self.queue.push_back(src);
            self.reached.push(PathNode { pos: src, cost: 0 });
        }

        let mut nbuf = std::mem::take(&mut self.nbuf);
        while let Some(p) = self.queue.pop_front() {
            let cost = self.bfs_at(p) + 1;
            if cost > max_dist {
                continue;
            }
            nbuf.clear();
            nb.neighbors(p, &mut nbuf);
            for &n in &nbuf {
                match self.idx(n) {
                    Some(i) if self.dist[i] == UNREACHABLE => {
                        self.dist[i] = cost;
                        self.queue.push_back(n);
                        self.reached.push(PathNode { pos: n, cost });
                    }
                    _ => {}
                }
            }
        }
        self.nbuf = nbuf;

        &self.reached
    }

    /// Step count of `p` in the last [`bfs_map`](Self::bfs_map), or
    /// [`UNREACHABLE`].
    pub fn bfs_at(&self, p: Point) -> i32 {
        self.idx(p).map_or(UNREACHABLE, |i| self.dist[i])
    }
}

#[cfg(test)]
mod tests {
    use delve_core::{Point, Range};

    use crate::{Cardinal, FloodRange, UNREACHABLE, manhattan};

    #[test]
    fn bounded_bfs_is_a_diamond() {
        let bounds = Range::new(0, 0, 11, 11);
        let mut fr = FloodRange::new(bounds);
        let src = Point::new(5, 5);
        let nodes = fr.bfs_map(&Cardinal::new(bounds, |_| true), &[src], 3);
        assert_eq!(nodes.len(), 25);
        assert_eq!(nodes[0].pos, src);
        for p in bounds {
            let d = manhattan(p, src);
            let want = if d <= 3 { d } else { UNREACHABLE };
            assert_eq!(fr.bfs_at(p), want, "at {p}");
        }
    }

    #[test]
    fn bfs_respects_barrier() {
        let bounds = Range::new(0, 0, 5, 1);
        let mut fr = FloodRange::new(bounds);
        let wall = Point::new(2, 0);
        let nb = Cardinal::new(bounds, |p| p != wall);
        fr.bfs_map(&nb, &[Point::new(0, 0)], 10);
        assert_eq!(fr.bfs_at(Point::new(1, 0)), 1);
        assert_eq!(fr.bfs_at(wall), UNREACHABLE);
        assert_eq!(fr.bfs_at(Point::new(4, 0)), UNREACHABLE);
    }

    #[test]
    fn duplicate_sources_count_once() {
        let bounds = Range::new(0, 0, 4, 4);
        let mut fr = FloodRange::new(bounds);
        let src = Point::new(1, 1);
        let nodes = fr.bfs_map(&Cardinal::new(bounds, |_| true), &[src, src], 0);
        assert_eq!(nodes.len(), 1);
    }
}
