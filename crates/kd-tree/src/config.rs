//! Viewer configuration.

use crate::{ExplorationPolicy, Point};

/// Smallest neighbor count the viewer offers.
pub const MIN_NEIGHBORS: usize = 1;
/// Largest neighbor count the viewer offers.
pub const MAX_NEIGHBORS: usize = 10;

/// Settings that drive an [`IndexController`](crate::IndexController).
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    /// Coordinates per point, shared by the index and the partitioner.
    pub dimensions: usize,
    /// Number of neighbors a query asks for.
    pub neighbor_count: usize,
    /// Whether separating planes are derived and kept.
    pub show_partition: bool,
    /// Whether query results replace the highlighted subset.
    pub highlight: bool,
    pub exploration: ExplorationPolicy,
    /// Query point used until the first explicit query.
    pub query_point: Point,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            dimensions: 3,
            neighbor_count: 3,
            show_partition: true,
            highlight: true,
            exploration: ExplorationPolicy::default(),
            query_point: Point::origin(3),
        }
    }
}

impl ViewerConfig {
    /// Sets the dimension and resets the default query point to that
    /// dimension's origin.
    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = dimensions;
        self.query_point = Point::origin(dimensions);
        self
    }

    /// Sets the neighbor count, clamped to the viewer's range.
    pub fn with_neighbor_count(mut self, count: usize) -> Self {
        self.neighbor_count = count.clamp(MIN_NEIGHBORS, MAX_NEIGHBORS);
        self
    }

    pub fn with_partition(mut self, show: bool) -> Self {
        self.show_partition = show;
        self
    }

    pub fn with_highlight(mut self, highlight: bool) -> Self {
        self.highlight = highlight;
        self
    }

    pub fn with_exploration(mut self, exploration: ExplorationPolicy) -> Self {
        self.exploration = exploration;
        self
    }

    pub fn with_query_point(mut self, point: Point) -> Self {
        self.query_point = point;
        self
    }
}
