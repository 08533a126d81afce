use std::collections::VecDeque;

use delve_core::{Point, Range};

/// A cell reached by [`FloodRange::bfs_map`] and its step count from the
/// nearest source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathNode {
    pub pos: Point,
    pub cost: i32,
}

/// Step count of cells the last BFS did not reach.
pub const UNREACHABLE: i32 = i32::MAX;

/// Reusable flood-fill state over one grid rectangle.
///
/// Holds the BFS distance map, the region labels and the work lists, so
/// repeated fills allocate nothing once warmed up. BFS maps are rebuilt on
/// every call. Region labels accumulate across [`fill`](Self::fill) calls
/// until [`reset_labels`](Self::reset_labels).
pub struct FloodRange {
    pub(crate) bounds: Range,
    pub(crate) dist: Vec<i32>,
    pub(crate) reached: Vec<PathNode>,
    pub(crate) queue: VecDeque<Point>,
    pub(crate) labels: Vec<Option<usize>>,
    pub(crate) stack: Vec<Point>,
    pub(crate) next_label: usize,
    pub(crate) nbuf: Vec<Point>,
}

impl FloodRange {
    pub fn new(bounds: Range) -> Self {
        let len = bounds.len();
        Self {
            bounds,
            dist: vec![UNREACHABLE; len],
            reached: Vec::new(),
            queue: VecDeque::new(),
            labels: vec![None; len],
            stack: Vec::new(),
            next_label: 0,
            nbuf: Vec::with_capacity(8),
        }
    }

    #[inline]
    pub fn bounds(&self) -> Range {
        self.bounds
    }

    #[inline]
    pub(crate) fn idx(&self, p: Point) -> Option<usize> {
        self.bounds.offset_of(p)
    }
}


#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn pathnode_from_json() {
        let node: PathNode = serde_json::from_str(r#"{"pos":{"x":3,"y":7},"cost":2}"#).unwrap();
        assert_eq!(
            node,
            PathNode {
                pos: Point::new(3, 7),
                cost: 2
            }
        );
    }
}
