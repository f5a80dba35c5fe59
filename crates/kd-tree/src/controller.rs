//! Single owner of the index lifecycle.
//!
//! The controller holds the current tree, the global bounds, the derived
//! separating planes and the highlighted query result. It is the only
//! place any of them change: a rebuild constructs a complete new tree
//! before replacing the old one, so queries never see a partial tree or
//! nodes from a previous point set.

use crate::{
    Bounds, CollectingVisitor, ExplorationPolicy, KdTree, Neighbor, Point, PointId, PointSource, RegionDescriptor,
    RegionPartitioner, Result, SearchOptions, ViewerConfig,
};

/// Owns a [`KdTree`] and everything derived from it.
#[derive(Debug)]
pub struct IndexController {
    config: ViewerConfig,
    tree: KdTree,
    bounds: Option<Bounds>,
    regions: Vec<RegionDescriptor>,
    highlighted: Vec<Neighbor>,
    last_query: Point,
}

impl IndexController {
    /// Creates a controller with an empty index.
    pub fn new(config: ViewerConfig) -> Result<Self> {
        let tree = KdTree::new(config.dimensions)?;
        config.query_point.check_dim(config.dimensions)?;
        Ok(Self {
            last_query: config.query_point.clone(),
            config,
            tree,
            bounds: None,
            regions: Vec::new(),
            highlighted: Vec::new(),
        })
    }

    /// The active configuration.
    #[inline]
    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// The current index.
    #[inline]
    pub fn tree(&self) -> &KdTree {
        &self.tree
    }

    /// The global bounds the partition starts from.
    #[inline]
    pub fn bounds(&self) -> Option<&Bounds> {
        self.bounds.as_ref()
    }

    /// The current separating planes. Empty while the partition is hidden.
    #[inline]
    pub fn regions(&self) -> &[RegionDescriptor] {
        &self.regions
    }

    /// The highlighted subset from the last highlighting query.
    #[inline]
    pub fn highlighted(&self) -> &[Neighbor] {
        &self.highlighted
    }

    /// The point the last query was made from.
    #[inline]
    pub fn last_query(&self) -> &Point {
        &self.last_query
    }

    /// Replaces the index with one built from `points`.
    ///
    /// `bounds` defaults to the tightest box around the points; a supplied
    /// box is grown to enclose every point. The prior
    /// highlight and planes are discarded; planes are re-derived when the
    /// partition is shown.
    pub fn rebuild(&mut self, points: Vec<Point>, bounds: Option<Bounds>) -> Result<()> {
        let tree = KdTree::build(points, self.config.dimensions)?;
        let bounds = match bounds {
            Some(mut b) => {
                b.min().check_dim(self.config.dimensions)?;
                // Planes of points outside the box would leave their parent region.
                for point in tree.points() {
                    b.include(point);
                }
                Some(b)
            }
            None => Bounds::enclosing(tree.points()),
        };

        self.tree = tree;
        self.bounds = bounds;
        self.highlighted.clear();
        self.regions.clear();
        if self.config.show_partition {
            self.refresh_regions()?;
        }

        log::info!(
            "rebuilt index: {} points, depth {}, {} regions",
            self.tree.len(),
            self.tree.depth(),
            self.regions.len()
        );
        Ok(())
    }

    /// Rebuilds from a [`PointSource`], using its bounds.
    pub fn rebuild_from<S: PointSource + ?Sized>(&mut self, source: &S) -> Result<()> {
        self.rebuild(source.points(), source.bounds())
    }

    /// Inserts one point into the current index without rebalancing.
    ///
    /// The bounds grow to contain the point so that the partition still
    /// covers every stored point.
    pub fn insert(&mut self, point: Point) -> Result<PointId> {
        let id = self.tree.insert(point.clone())?;
        match &mut self.bounds {
            Some(bounds) => bounds.include(&point),
            bounds @ None => *bounds = Bounds::enclosing([&point]),
        }
        if self.config.show_partition {
            self.refresh_regions()?;
        }
        Ok(id)
    }

    /// Finds the `k` nearest points to `point`.
    ///
    /// With highlighting enabled the previous highlight is cleared and the
    /// result becomes the new highlighted subset.
    pub fn query(&mut self, point: Point, k: usize) -> Result<Vec<Neighbor>> {
        let options = SearchOptions {
            exploration: self.config.exploration,
        };
        let found = match self.tree.k_nearest(&point, k, options) {
            Ok(found) => found,
            Err(err) => {
                log::warn!("rejected query {point:?}: {err}");
                return Err(err);
            }
        };

        self.last_query = point;
        self.config.neighbor_count = k;
        if self.config.highlight {
            self.clear_highlight();
            self.highlighted = found.clone();
        }
        Ok(found)
    }

    /// Re-runs the last query with a new neighbor count.
    pub fn set_neighbor_count(&mut self, k: usize) -> Result<Vec<Neighbor>> {
        self.query(self.last_query.clone(), k)
    }

    /// Shows or hides the separating planes.
    pub fn set_show_partition(&mut self, show: bool) -> Result<()> {
        self.config.show_partition = show;
        if show {
            self.refresh_regions()
        } else {
            self.regions.clear();
            Ok(())
        }
    }

    /// Switches the exploration policy used by later queries.
    pub fn set_exploration(&mut self, exploration: ExplorationPolicy) {
        self.config.exploration = exploration;
    }

    /// Empties the highlighted subset.
    pub fn clear_highlight(&mut self) {
        self.highlighted.clear();
    }

    fn refresh_regions(&mut self) -> Result<()> {
        let Some(bounds) = &self.bounds else {
            self.regions.clear();
            return Ok(());
        };
        let mut visitor = CollectingVisitor::with_capacity(self.tree.len());
        RegionPartitioner::new(&self.tree, bounds.clone())?.partition(&mut visitor);
        self.regions = visitor.into_regions();
        Ok(())
    }
}
