//! Point-set suppliers.

use crate::{Bounds, Point};

/// Something that can hand the index a point set, such as the vertex
/// positions of a model.
///
/// Points are expected to share one dimension; no deduplication happens.
pub trait PointSource {
    /// The points, in a stable order. Their position becomes their id.
    fn points(&self) -> Vec<Point>;

    /// A box enclosing every point.
    ///
    /// Defaults to the tightest box around [`points`](Self::points).
    fn bounds(&self) -> Option<Bounds> {
        Bounds::enclosing(&self.points())
    }
}

impl PointSource for [Point] {
    fn points(&self) -> Vec<Point> {
        self.to_vec()
    }

    fn bounds(&self) -> Option<Bounds> {
        Bounds::enclosing(self)
    }
}

impl PointSource for Vec<Point> {
    fn points(&self) -> Vec<Point> {
        self.clone()
    }

    fn bounds(&self) -> Option<Bounds> {
        Bounds::enclosing(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KdTree;

    struct Flat(Vec<f32>);

    impl PointSource for Flat {
        fn points(&self) -> Vec<Point> {
            self.0.chunks_exact(3).map(Point::from_slice).collect()
        }
    }

    #[test]
    fn default_bounds_enclose_points() {
        let source = Flat(vec![0.0, 0.0, 0.0, 2.0, -1.0, 3.0]);
        let bounds = source.bounds().unwrap();
        assert_eq!(bounds.min(), &Point::from([0.0, -1.0, 0.0]));
        assert_eq!(bounds.max(), &Point::from([2.0, 0.0, 3.0]));
    }

    #[test]
    fn tree_from_source() {
        let source = Flat(vec![0.0, 0.0, 0.0, 2.0, -1.0, 3.0, 1.0, 1.0, 1.0]);
        let tree = KdTree::from_source(&source, 3).unwrap();
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.find_point_index(&Point::from([1.0, 1.0, 1.0])), Some(2));
    }

    #[test]
    fn empty_source_has_no_bounds() {
        let source: Vec<Point> = Vec::new();
        assert!(source.bounds().is_none());
    }
}
