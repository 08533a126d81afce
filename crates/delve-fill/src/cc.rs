//! Region labelling: flood fills that partition a grid into connected
//! components.

use delve_core::Point;

use crate::FloodRange;
use crate::traits::Neighborhood;

/// The cells reached by one flood fill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    /// Label shared by every cell of the region.
    pub label: usize,
    /// Cells in visiting order; the seed comes first.
    pub tiles: Vec<Point>,
}

impl Region {
    #[inline]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    #[inline]
    pub fn seed(&self) -> Option<Point> {
        self.tiles.first().copied()
    }
}

impl FloodRange {
    /// Forget every label. Call this on entry to each independent
    /// partitioning pass.
    pub fn reset_labels(&mut self) {
        self.labels.fill(None);
        self.next_label = 0;
    }

    /// Flood-fill from `seed` with a fresh label and return the region.
    ///
    /// The seed is always part of the region; other cells join when reached
    /// through `nb`. Cells labelled by an earlier fill are never crossed.
    /// Returns `None` if the seed is outside the range or already labelled.
    pub fn fill<N: Neighborhood>(&mut self, nb: &N, seed: Point) -> Option<Region> {
        let i = self.idx(seed)?;
        if self.labels[i].is_some() {
            return None;
        }
        let label = self.next_label;
        self.next_label += 1;
        self.labels[i] = Some(label);

        let mut tiles = vec![seed];
        let mut nbuf = std::mem::take(&mut self.nbuf);
        self.stack.clear();
        self.stack.push(seed);
        while let Some(p) = self.stack.pop() {
            nbuf.clear();
            nb.neighbors(p, &mut nbuf);
            for &n in &nbuf {
                let Some(j) = self.idx(n) else {
                    continue;
                };
                if self.labels[j].is_none() {
                    self.labels[j] = Some(label);
                    self.stack.push(n);
                    tiles.push(n);
                }
            }
        }
        self.nbuf = nbuf;

        Some(Region { label, tiles })
    }

    /// Reset labels, then fill from every not-yet-labelled seed in order.
    pub fn label_all<N: Neighborhood>(
        &mut self,
        nb: &N,
        seeds: impl IntoIterator<Item = Point>,
    ) -> Vec<Region> {
        self.reset_labels();
        seeds
            .into_iter()
            .filter_map(|p| self.fill(nb, p))
            .collect()
    }

    /// Label of `p` from the fills since the last reset.
    pub fn label_at(&self, p: Point) -> Option<usize> {
        self.labels[self.idx(p)?]
    }

    #[inline]
    pub fn is_labelled(&self, p: Point) -> bool {
        self.label_at(p).is_some()
    }
}
