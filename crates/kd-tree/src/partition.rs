//! Axis-aligned region partitioning of a k-d tree for visualization.
//!
//! Every node of a k-d tree owns the box it inherited from its ancestors'
//! splits. The [`RegionPartitioner`] walks the tree and, for each node,
//! reports the separating plane clipped to that box as a
//! [`RegionDescriptor`]. Descriptors carry everything needed to draw the
//! plane, so consumers never touch the tree themselves.

use nalgebra::Point3;

use crate::{Bounds, KdNode, KdTree, PointId, RegionVisitor, Result};

/// Display color of a separating plane, as `0xRRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisColor(pub u32);

impl AxisColor {
    /// Red, green and blue components.
    pub fn rgb(self) -> [u8; 3] {
        let [_, r, g, b] = self.0.to_be_bytes();
        [r, g, b]
    }
}

/// Plane colors, indexed by `axis mod 3`.
pub const AXIS_PALETTE: [AxisColor; 3] = [
    AxisColor(0xe57373),
    AxisColor(0x81c784),
    AxisColor(0x64b5f6),
];

/// Returns the palette color for planes perpendicular to `axis`.
#[inline]
pub fn axis_color(axis: usize) -> AxisColor {
    AXIS_PALETTE[axis % AXIS_PALETTE.len()]
}

/// One separating plane, clipped to the region its node inherited.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionDescriptor {
    id: PointId,
    axis: usize,
    split_value: f32,
    depth: usize,
    bounds: Bounds,
    color: AxisColor,
}

impl RegionDescriptor {
    /// Id of the point whose node produced this plane.
    #[inline]
    pub fn id(&self) -> PointId {
        self.id
    }

    /// The axis the plane is perpendicular to.
    #[inline]
    pub fn axis(&self) -> usize {
        self.axis
    }

    /// The plane's coordinate on [`axis`](Self::axis).
    #[inline]
    pub fn split_value(&self) -> f32 {
        self.split_value
    }

    /// Tree depth of the node that produced this plane.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The region inherited by the node.
    #[inline]
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    #[inline]
    pub fn color(&self) -> AxisColor {
        self.color
    }

    /// The four corners of the clipped plane, for 3-dimensional regions.
    ///
    /// Corners run around the rectangle in order; `None` when the region
    /// is not 3-dimensional.
    pub fn quad(&self) -> Option<[Point3<f32>; 4]> {
        if self.bounds.dim() != 3 {
            return None;
        }
        let (min, max) = (self.bounds.min(), self.bounds.max());
        let u = (self.axis + 1) % 3;
        let v = (self.axis + 2) % 3;

        let corner = |cu: f32, cv: f32| {
            let mut c = [0.0; 3];
            c[self.axis] = self.split_value;
            c[u] = cu;
            c[v] = cv;
            Point3::new(c[0], c[1], c[2])
        };

        Some([
            corner(min[u], min[v]),
            corner(max[u], min[v]),
            corner(max[u], max[v]),
            corner(min[u], max[v]),
        ])
    }
}

/// Derives the separating planes of a k-d tree.
///
/// The walk uses an explicit LIFO work-list. Emission order is therefore
/// neither depth- nor breadth-first; each descriptor is self-contained.
#[derive(Debug)]
pub struct RegionPartitioner<'a> {
    tree: &'a KdTree,
    bounds: Bounds,
    regions: Vec<RegionDescriptor>,
}

struct Pending<'a> {
    node: &'a KdNode,
    bounds: Bounds,
    depth: usize,
}

impl<'a> RegionPartitioner<'a> {
    /// Creates a partitioner over `tree` within the global `bounds`.
    ///
    /// The bounds must have the tree's dimension.
    pub fn new(tree: &'a KdTree, bounds: Bounds) -> Result<Self> {
        bounds.min().check_dim(tree.dimensions())?;
        Ok(Self {
            tree,
            bounds,
            regions: Vec::new(),
        })
    }

    /// The global bounds the walk starts from.
    #[inline]
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Walks the tree and hands one descriptor per node to `visitor`.
    ///
    /// A node at depth `d` splits on axis `d mod k`. Its left child inherits
    /// the region with `max[axis]` clamped to the split value, its right
    /// child the region with `min[axis]` clamped.
    pub fn partition<V: RegionVisitor>(&self, visitor: &mut V) {
        let dim = self.tree.dimensions();
        let Some(root) = self.tree.nodes().first().copied() else {
            return;
        };

        let mut stack = vec![Pending {
            node: root,
            bounds: self.bounds.clone(),
            depth: 0,
        }];

        while let Some(Pending {
            node,
            bounds,
            depth,
        }) = stack.pop()
        {
            let axis = depth % dim;
            let split_value = node.split_value(axis);
            let (lower, upper) = bounds.split(axis, split_value);

            visitor.visit(RegionDescriptor {
                id: node.id(),
                axis,
                split_value,
                depth,
                bounds,
                color: axis_color(axis),
            });

            if let Some(left) = node.left() {
                stack.push(Pending {
                    node: left,
                    bounds: lower,
                    depth: depth + 1,
                });
            }
            if let Some(right) = node.right() {
                stack.push(Pending {
                    node: right,
                    bounds: upper,
                    depth: depth + 1,
                });
            }
        }
    }

    /// Recomputes the kept descriptor list and returns it.
    pub fn render(&mut self) -> &[RegionDescriptor] {
        let mut regions = Vec::with_capacity(self.tree.len());
        self.partition(&mut |region: RegionDescriptor| regions.push(region));
        self.regions = regions;
        log::debug!("partitioned {} regions", self.regions.len());
        &self.regions
    }

    /// The descriptors from the last [`render`](Self::render).
    #[inline]
    pub fn regions(&self) -> &[RegionDescriptor] {
        &self.regions
    }

    /// Drops all kept descriptors.
    pub fn clear(&mut self) {
        self.regions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CollectingVisitor, Point};

    fn cube_bounds() -> Bounds {
        Bounds::new(Point::from([0.0, 0.0, 0.0]), Point::from([10.0, 10.0, 10.0])).unwrap()
    }

    #[test]
    fn empty_tree_emits_nothing() {
        let tree = KdTree::build(vec![], 3).unwrap();
        let mut partitioner = RegionPartitioner::new(&tree, cube_bounds()).unwrap();
        assert!(partitioner.render().is_empty());
    }

    #[test]
    fn rejects_bounds_of_other_dimension() {
        let tree = KdTree::new(2).unwrap();
        assert!(RegionPartitioner::new(&tree, cube_bounds()).is_err());
    }

    #[test]
    fn root_plane_spans_global_bounds() {
        let tree = KdTree::build(vec![Point::from([4.0, 5.0, 6.0])], 3).unwrap();
        let mut partitioner = RegionPartitioner::new(&tree, cube_bounds()).unwrap();
        let regions = partitioner.render();

        assert_eq!(regions.len(), 1);
        let root = &regions[0];
        assert_eq!(root.axis(), 0);
        assert_eq!(root.split_value(), 4.0);
        assert_eq!(root.bounds(), &cube_bounds());
        assert_eq!(root.color(), AxisColor(0xe57373));
    }

    #[test]
    fn children_clamp_parent_bounds() {
        let points = vec![
            Point::from([5.0, 2.0, 0.0]),
            Point::from([2.0, 7.0, 0.0]),
            Point::from([8.0, 3.0, 0.0]),
        ];
        let tree = KdTree::build(points, 3).unwrap();
        let partitioner = RegionPartitioner::new(&tree, cube_bounds()).unwrap();
        let mut visitor = CollectingVisitor::new();
        partitioner.partition(&mut visitor);
        let regions = visitor.into_regions();
        assert_eq!(regions.len(), 3);

        let left = regions.iter().find(|r| r.split_value() == 7.0).unwrap();
        assert_eq!(left.axis(), 1);
        assert_eq!(left.depth(), 1);
        assert_eq!(left.bounds().max()[0], 5.0);
        assert_eq!(left.bounds().min()[0], 0.0);
        assert_eq!(left.color(), AxisColor(0x81c784));

        let right = regions.iter().find(|r| r.split_value() == 3.0).unwrap();
        assert_eq!(right.bounds().min()[0], 5.0);
        assert_eq!(right.bounds().max()[0], 10.0);
    }

    #[test]
    fn axis_cycles_with_tree_dimension() {
        let mut tree = KdTree::new(2).unwrap();
        for c in [[5.0, 5.0], [2.0, 5.0], [2.0, 1.0]] {
            tree.insert(Point::from(c)).unwrap();
        }
        let bounds = Bounds::new(Point::from([0.0, 0.0]), Point::from([10.0, 10.0])).unwrap();
        let mut partitioner = RegionPartitioner::new(&tree, bounds).unwrap();

        let mut axes: Vec<(usize, usize)> =
            partitioner.render().iter().map(|r| (r.depth(), r.axis())).collect();
        axes.sort();
        assert_eq!(axes, vec![(0, 0), (1, 1), (2, 0)]);
        assert!(partitioner.regions().iter().all(|r| r.quad().is_none()));

        partitioner.clear();
        assert!(partitioner.regions().is_empty());
    }

    #[test]
    fn quad_lies_on_split_plane() {
        let tree = KdTree::build(vec![Point::from([4.0, 5.0, 6.0])], 3).unwrap();
        let mut partitioner = RegionPartitioner::new(&tree, cube_bounds()).unwrap();
        let quad = partitioner.render()[0].quad().unwrap();

        assert!(quad.iter().all(|c| c.x == 4.0));
        assert_eq!(quad[0], Point3::new(4.0, 0.0, 0.0));
        assert_eq!(quad[2], Point3::new(4.0, 10.0, 10.0));
    }

    #[test]
    fn palette_components() {
        assert_eq!(axis_color(2).rgb(), [0x64, 0xb5, 0xf6]);
        assert_eq!(axis_color(3), axis_color(0));
    }
}
