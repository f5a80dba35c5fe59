//! k-d tree container, construction and queries.

use std::cmp::Ordering;

use crate::node::Side;
use crate::search::CandidateList;
use crate::{
    ExplorationPolicy, KdNode, KdTreeError, Neighbor, Point, PointId, PointSource, Result,
    SearchOptions,
};

/// A k-d tree over points of a fixed dimension.
///
/// Level `d` of the tree splits on axis `d mod k`. The tree keeps the
/// flattened list of every point it has been given, in id order, next to
/// the node structure; [`PointId`]s index into that list.
///
/// # Construction
///
/// [`KdTree::build`] produces a balanced tree by median splits:
///
/// ```
/// use kd_tree::{KdTree, Point};
///
/// let points = vec![Point::from([0.0, 0.0, 0.0]), Point::from([1.0, 0.0, 0.0])];
/// let tree = KdTree::build(points, 3).unwrap();
/// assert_eq!(tree.len(), 2);
/// ```
///
/// [`KdTree::insert`] grows an existing tree one point at a time without
/// rebalancing, so the two paths can produce different shapes for the same
/// point set.
///
/// # Queries
///
/// ```
/// use kd_tree::{KdTree, Point, SearchOptions};
///
/// let points = vec![Point::from([0.0, 0.0]), Point::from([3.0, 4.0])];
/// let tree = KdTree::build(points, 2).unwrap();
/// let found = tree
///     .k_nearest(&Point::from([2.5, 4.0]), 1, SearchOptions::default())
///     .unwrap();
/// assert_eq!(found[0].id, 1);
/// ```
#[derive(Debug, Clone)]
pub struct KdTree {
    root: Option<Box<KdNode>>,
    dim: usize,
    points: Vec<Point>,
}

impl KdTree {
    /// Creates an empty tree for points with `dim` coordinates.
    pub fn new(dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(KdTreeError::InvalidDimension);
        }
        Ok(Self {
            root: None,
            dim,
            points: Vec::new(),
        })
    }

    /// Builds a balanced tree from `points`.
    ///
    /// Each level sorts its points (stably) on the level's axis and takes
    /// the element at `n / 2` as the subtree root. Equal coordinates keep
    /// their input order, so the result is deterministic for a given input.
    ///
    /// Returns an empty tree if the input is empty.
    pub fn build(points: Vec<Point>, dim: usize) -> Result<Self> {
        let mut tree = Self::new(dim)?;
        for p in &points {
            p.check_dim(dim)?;
        }

        let ids: Vec<PointId> = (0..points.len()).collect();
        tree.root = build_node(&points, ids, 0, dim).map(Box::new);
        tree.points = points;

        if log::log_enabled!(log::Level::Debug) {
            log::debug!(
                "built k-d tree: {} points, {} dimensions, depth {}",
                tree.len(),
                dim,
                tree.depth()
            );
        }

        Ok(tree)
    }

    /// Builds a balanced tree from the points a [`PointSource`] supplies.
    pub fn from_source<S: PointSource + ?Sized>(source: &S, dim: usize) -> Result<Self> {
        Self::build(source.points(), dim)
    }

    /// Inserts a single point and returns its id.
    ///
    /// Walks down from the root, going left when the point's coordinate on
    /// the level's axis is strictly smaller than the node's and right
    /// otherwise, and attaches a new leaf at the first empty slot.
    pub fn insert(&mut self, point: Point) -> Result<PointId> {
        point.check_dim(self.dim)?;

        let id = self.points.len();
        let mut slot = &mut self.root;
        let mut depth = 0;
        while let Some(node) = slot {
            let side = Side::of(&point, node, depth % self.dim);
            slot = node.child_slot_mut(side);
            depth += 1;
        }
        *slot = Some(Box::new(KdNode::new(id, point.clone())));
        self.points.push(point);

        log::trace!("inserted point {id} at depth {depth}");
        Ok(id)
    }

    /// Number of coordinates per point.
    #[inline]
    pub fn dimensions(&self) -> usize {
        self.dim
    }

    /// Returns `true` if the tree contains no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of points in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns the maximum depth of the tree (0 for an empty tree).
    pub fn depth(&self) -> usize {
        self.root().map_or(0, KdNode::depth)
    }

    /// Returns a reference to the root node, if any.
    #[inline]
    pub fn root(&self) -> Option<&KdNode> {
        self.root.as_deref()
    }

    /// Every point the tree was built from or given, in id order.
    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Looks up a point by id.
    #[inline]
    pub fn point(&self, id: PointId) -> Option<&Point> {
        self.points.get(id)
    }

    /// Finds the id of the first point whose coordinates exactly equal `point`.
    ///
    /// This is a linear scan of the point list, meant for occasional
    /// lookups rather than the query path.
    pub fn find_point_index(&self, point: &Point) -> Option<PointId> {
        self.points.iter().position(|p| p == point)
    }

    /// Returns all nodes in pre-order (node, left subtree, right subtree).
    ///
    /// The first element, if any, is the root.
    pub fn nodes(&self) -> Vec<&KdNode> {
        let mut result = Vec::with_capacity(self.len());
        let mut stack: Vec<&KdNode> = self.root().into_iter().collect();
        while let Some(node) = stack.pop() {
            result.push(node);
            stack.extend(node.right());
            stack.extend(node.left());
        }
        result
    }

    /// Finds the `k` points closest to `query` by Euclidean distance.
    ///
    /// Results are sorted by distance; points at the same distance are
    /// ordered by id. Fewer than `k` results are returned when the tree
    /// holds fewer points, and none when it is empty.
    ///
    /// The root is taken as the first candidate before anything else is
    /// explored. Each node then visits the subtree on the query's side of
    /// the split, considers its own point, and finally visits the other
    /// subtree if the [`ExplorationPolicy`] allows it.
    pub fn k_nearest(
        &self,
        query: &Point,
        k: usize,
        options: SearchOptions,
    ) -> Result<Vec<Neighbor>> {
        query.check_dim(self.dim)?;

        let Some(root) = self.root() else {
            return Ok(Vec::new());
        };
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut candidates = CandidateList::new(k);
        candidates.offer(root.id(), root.point(), query.distance(root.point()));

        let mut visited = 0usize;
        let mut stack = vec![Step::Descend(root, 0)];
        while let Some(step) = stack.pop() {
            match step {
                Step::Descend(node, depth) => {
                    let near = Side::of(query, node, depth % self.dim);
                    stack.push(Step::Settle(node, depth));
                    if let Some(child) = node.child(near) {
                        stack.push(Step::Descend(child, depth + 1));
                    }
                }
                Step::Settle(node, depth) => {
                    visited += 1;
                    let axis = depth % self.dim;
                    candidates.offer(node.id(), node.point(), query.distance(node.point()));

                    let far = Side::of(query, node, axis).opposite();
                    let Some(child) = node.child(far) else {
                        continue;
                    };
                    let explore = match options.exploration {
                        ExplorationPolicy::Exhaustive => true,
                        ExplorationPolicy::Pruned => {
                            !candidates.is_full()
                                || (node.split_value(axis) - query[axis]).abs()
                                    <= candidates.worst_distance()
                        }
                    };
                    if explore {
                        stack.push(Step::Descend(child, depth + 1));
                    }
                }
            }
        }

        let neighbors = candidates.into_neighbors();
        log::trace!(
            "k_nearest(k={k}): visited {visited} of {} nodes, found {}",
            self.len(),
            neighbors.len()
        );
        Ok(neighbors)
    }

    /// Finds the single point closest to `query`.
    pub fn nearest(&self, query: &Point, options: SearchOptions) -> Result<Option<Neighbor>> {
        Ok(self.k_nearest(query, 1, options)?.into_iter().next())
    }
}

/// Work-list entry for the nearest-neighbor walk.
enum Step<'a> {
    /// Visit the near subtree of this node, then settle it.
    Descend(&'a KdNode, usize),
    /// Consider the node's own point, then maybe visit its far subtree.
    Settle(&'a KdNode, usize),
}

/// Builds the subtree for the points with the given ids.
///
/// Balanced construction keeps the recursion depth at `log2(n)`.
fn build_node(points: &[Point], mut ids: Vec<PointId>, depth: usize, dim: usize) -> Option<KdNode> {
    if ids.is_empty() {
        return None;
    }

    let axis = depth % dim;
    // TODO: select_nth_unstable_by would make this O(n log n) overall, but the
    // median would then no longer follow input order on ties.
    ids.sort_by(|&a, &b| {
        points[a][axis]
            .partial_cmp(&points[b][axis])
            .unwrap_or(Ordering::Equal)
    });

    let median = ids.len() / 2;
    let right_ids = ids.split_off(median + 1);
    let id = ids.pop()?;

    let mut node = KdNode::new(id, points[id].clone());
    node.set_left(build_node(points, ids, depth + 1, dim));
    node.set_right(build_node(points, right_ids, depth + 1, dim));

    Some(node)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(coords: &[[f32; 3]]) -> Vec<Point> {
        coords.iter().map(|c| Point::from(*c)).collect()
    }

    fn ids(neighbors: &[Neighbor]) -> Vec<PointId> {
        neighbors.iter().map(|n| n.id).collect()
    }

    fn unit_points() -> Vec<Point> {
        pts(&[
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [5.0, 5.0, 5.0],
        ])
    }

    #[test]
    fn new_rejects_zero_dimensions() {
        assert_eq!(KdTree::new(0).unwrap_err(), KdTreeError::InvalidDimension);
    }

    #[test]
    fn empty_tree() {
        let tree = KdTree::new(3).unwrap();
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.depth(), 0);
        assert!(tree.nodes().is_empty());
    }

    #[test]
    fn build_empty() {
        let tree = KdTree::build(vec![], 3).unwrap();
        assert!(tree.is_empty());
        let found = tree
            .k_nearest(&Point::from([0.0, 0.0, 0.0]), 4, SearchOptions::default())
            .unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn build_rejects_mixed_dimensions() {
        let points = vec![Point::from([0.0, 0.0, 0.0]), Point::from([1.0, 0.0])];
        assert_eq!(
            KdTree::build(points, 3).unwrap_err(),
            KdTreeError::DimensionMismatch {
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn build_picks_median_root() {
        let tree = KdTree::build(pts(&[[3.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]]), 3).unwrap();
        let root = tree.root().unwrap();
        assert_eq!(root.point()[0], 2.0);
        assert_eq!(root.left().unwrap().point()[0], 1.0);
        assert_eq!(root.right().unwrap().point()[0], 3.0);
        assert_eq!(tree.depth(), 2);
    }

    #[test]
    fn build_ties_follow_input_order() {
        // All x equal: the stable sort keeps input order, so id 1 is the median.
        let tree = KdTree::build(pts(&[[1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [1.0, 2.0, 0.0]]), 3).unwrap();
        let order: Vec<PointId> = tree.nodes().iter().map(|n| n.id()).collect();
        assert_eq!(order, vec![1, 0, 2]);
    }

    #[test]
    fn build_is_balanced() {
        let points: Vec<Point> = (0..100)
            .map(|i| Point::from([i as f32, (i * 7 % 13) as f32, (i * 3 % 11) as f32]))
            .collect();
        let tree = KdTree::build(points, 3).unwrap();
        assert_eq!(tree.len(), 100);
        assert_eq!(tree.nodes().len(), 100);
        // ceil(log2(101)) = 7
        assert_eq!(tree.depth(), 7);
    }

    #[test]
    fn nodes_are_preorder() {
        let mut tree = KdTree::new(2).unwrap();
        for c in [[5.0, 5.0], [2.0, 5.0], [8.0, 5.0], [2.0, 1.0], [9.0, 9.0]] {
            tree.insert(Point::from(c)).unwrap();
        }
        // 5,5 -> left 2,5 (which splits on y: 2,1 goes left), right 8,5 (9,9 right).
        let order: Vec<PointId> = tree.nodes().iter().map(|n| n.id()).collect();
        assert_eq!(order, vec![0, 1, 3, 2, 4]);
    }

    #[test]
    fn insert_uses_strict_less_than() {
        let mut tree = KdTree::new(3).unwrap();
        assert_eq!(tree.insert(Point::from([1.0, 0.0, 0.0])).unwrap(), 0);
        assert_eq!(tree.insert(Point::from([1.0, 5.0, 0.0])).unwrap(), 1);
        assert_eq!(tree.insert(Point::from([0.5, 0.0, 0.0])).unwrap(), 2);

        let root = tree.root().unwrap();
        assert_eq!(root.right().map(KdNode::id), Some(1));
        assert_eq!(root.left().map(KdNode::id), Some(2));
    }

    #[test]
    fn insert_rejects_wrong_dimension() {
        let mut tree = KdTree::new(3).unwrap();
        assert!(tree.insert(Point::from([1.0, 2.0])).is_err());
        assert!(tree.is_empty());
        assert!(tree.points().is_empty());
    }

    #[test]
    fn insert_then_query_finds_itself() {
        let mut tree = KdTree::build(unit_points(), 3).unwrap();
        let p = Point::from([0.25, 0.5, 2.0]);
        let id = tree.insert(p.clone()).unwrap();

        let found = tree.nearest(&p, SearchOptions::default()).unwrap().unwrap();
        assert_eq!(found.id, id);
        assert_eq!(found.point, p);
        assert_eq!(found.distance, 0.0);
    }

    #[test]
    fn unit_points_scenario() {
        let tree = KdTree::build(unit_points(), 3).unwrap();
        let query = Point::from([0.0, 0.0, 0.0]);

        for options in [SearchOptions::exhaustive(), SearchOptions::pruned()] {
            let found = tree.k_nearest(&query, 2, options).unwrap();
            assert_eq!(found.len(), 2);
            assert_eq!(found[0].point, query);
            assert_eq!(found[0].distance, 0.0);
            // Three unit points tie at distance 1; the lowest id wins.
            assert_eq!(found[1].id, 1);
            assert_eq!(found[1].distance, 1.0);
        }
    }

    #[test]
    fn k_larger_than_tree_returns_everything_sorted() {
        let tree = KdTree::build(unit_points(), 3).unwrap();
        let found = tree
            .k_nearest(&Point::from([0.0, 0.0, 0.0]), 50, SearchOptions::exhaustive())
            .unwrap();
        assert_eq!(ids(&found), vec![0, 1, 2, 3, 4]);
        assert!(found.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[test]
    fn k_zero_returns_nothing() {
        let tree = KdTree::build(unit_points(), 3).unwrap();
        let found = tree
            .k_nearest(&Point::from([0.0, 0.0, 0.0]), 0, SearchOptions::default())
            .unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn query_dimension_is_checked() {
        let tree = KdTree::build(unit_points(), 3).unwrap();
        let err = tree
            .k_nearest(&Point::from([0.0, 0.0]), 1, SearchOptions::default())
            .unwrap_err();
        assert_eq!(
            err,
            KdTreeError::DimensionMismatch {
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn root_is_a_candidate() {
        // The root (median on x) is the only point and must be returned.
        let tree = KdTree::build(pts(&[[7.0, 7.0, 7.0]]), 3).unwrap();
        let found = tree
            .k_nearest(&Point::from([-100.0, 0.0, 0.0]), 3, SearchOptions::pruned())
            .unwrap();
        assert_eq!(ids(&found), vec![0]);
    }

    #[test]
    fn duplicates_are_distinct_points() {
        let tree = KdTree::build(pts(&[[1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [2.0, 2.0, 2.0]]), 3).unwrap();
        let found = tree
            .k_nearest(&Point::from([1.0, 1.0, 1.0]), 2, SearchOptions::default())
            .unwrap();
        assert_eq!(ids(&found), vec![0, 1]);
    }

    #[test]
    fn find_point_index_exact_match() {
        let tree = KdTree::build(unit_points(), 3).unwrap();
        assert_eq!(tree.find_point_index(&Point::from([0.0, 0.0, 1.0])), Some(3));
        assert_eq!(tree.find_point_index(&Point::from([0.0, 0.0, 1.0001])), None);
    }

    #[test]
    fn deep_insert_chain_does_not_overflow() {
        let mut tree = KdTree::new(1).unwrap();
        for i in 0..20_000 {
            tree.insert(Point::from([i as f32])).unwrap();
        }
        assert_eq!(tree.depth(), 20_000);

        let found = tree
            .k_nearest(&Point::from([19_999.0]), 2, SearchOptions::exhaustive())
            .unwrap();
        assert_eq!(ids(&found), vec![19_999, 19_998]);
        assert_eq!(tree.nodes().len(), 20_000);
    }

    #[test]
    fn deep_insert_chain_clones_and_formats() {
        let mut tree = KdTree::new(1).unwrap();
        for i in 0..20_000 {
            tree.insert(Point::from([i as f32])).unwrap();
        }

        let copy = tree.clone();
        drop(tree);
        assert_eq!(copy.depth(), 20_000);
        let order: Vec<PointId> = copy.nodes().iter().map(|n| n.id()).collect();
        assert_eq!(order, (0..20_000).collect::<Vec<_>>());
        let found = copy
            .nearest(&Point::from([12_345.2]), SearchOptions::pruned())
            .unwrap()
            .unwrap();
        assert_eq!(found.id, 12_345);

        let text = format!("{copy:?}");
        assert!(text.starts_with("KdTree"));
        assert!(text.contains("right: Some(1)"));
    }
}
