//! Consumers of a partition walk.
//!
//! [`RegionPartitioner::partition`](crate::RegionPartitioner::partition)
//! hands each separating plane to a [`RegionVisitor`] as soon as it is
//! derived. Any `FnMut(RegionDescriptor)` closure is a visitor, so one-off
//! consumers need no type of their own.

use crate::RegionDescriptor;

/// Receives region descriptors as a partition walk produces them.
pub trait RegionVisitor {
    /// Called once per tree node. Order is unspecified.
    fn visit(&mut self, region: RegionDescriptor);
}

impl<F> RegionVisitor for F
where
    F: FnMut(RegionDescriptor),
{
    #[inline]
    fn visit(&mut self, region: RegionDescriptor) {
        self(region)
    }
}

/// Keeps every descriptor of a walk, along with the deepest level seen.
#[derive(Debug, Default)]
pub struct CollectingVisitor {
    regions: Vec<RegionDescriptor>,
    max_depth: Option<usize>,
}

impl CollectingVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves room for `nodes` descriptors, one per tree node.
    pub fn with_capacity(nodes: usize) -> Self {
        Self {
            regions: Vec::with_capacity(nodes),
            max_depth: None,
        }
    }

    #[inline]
    pub fn regions(&self) -> &[RegionDescriptor] {
        &self.regions
    }

    /// Depth of the deepest node visited, `None` before any visit.
    #[inline]
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    pub fn into_regions(self) -> Vec<RegionDescriptor> {
        self.regions
    }
}

impl RegionVisitor for CollectingVisitor {
    fn visit(&mut self, region: RegionDescriptor) {
        self.max_depth = self.max_depth.max(Some(region.depth()));
        self.regions.push(region);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Bounds, KdTree, Point, RegionPartitioner};

    fn diagonal_tree() -> KdTree {
        let points = (1..=7)
            .map(|i| Point::from([i as f32, i as f32, i as f32]))
            .collect();
        KdTree::build(points, 3).unwrap()
    }

    fn box_bounds() -> Bounds {
        Bounds::new(Point::from([0.0, 0.0, 0.0]), Point::from([8.0, 8.0, 8.0])).unwrap()
    }

    #[test]
    fn collector_starts_empty() {
        let visitor = CollectingVisitor::new();
        assert!(visitor.regions().is_empty());
        assert_eq!(visitor.max_depth(), None);
    }

    #[test]
    fn collector_keeps_one_region_per_node() {
        let tree = diagonal_tree();
        let partitioner = RegionPartitioner::new(&tree, box_bounds()).unwrap();
        let mut visitor = CollectingVisitor::with_capacity(tree.len());
        partitioner.partition(&mut visitor);

        // Seven points build a full tree of three levels.
        assert_eq!(visitor.max_depth(), Some(2));
        let mut ids: Vec<_> = visitor.into_regions().iter().map(|r| r.id()).collect();
        ids.sort();
        assert_eq!(ids, (0..7).collect::<Vec<_>>());
    }

    #[test]
    fn closures_are_visitors() {
        let tree = diagonal_tree();
        let partitioner = RegionPartitioner::new(&tree, box_bounds()).unwrap();

        let mut per_axis = [0usize; 3];
        partitioner.partition(&mut |region: RegionDescriptor| per_axis[region.axis()] += 1);
        assert_eq!(per_axis, [1, 2, 4]);
    }
}
