//! k-d tree for point clouds.
//!
//! This crate indexes the vertices of a model in a k-d tree, answers
//! k-nearest-neighbor queries against it, and derives the tree's recursive
//! axis-aligned partition as a list of separating planes for display.
//!
//! # Example
//!
//! ```
//! use kd_tree::{Bounds, CollectingVisitor, KdTree, Point, RegionPartitioner, SearchOptions};
//!
//! let points: Vec<Point> = vec![
//!     Point::from([0.0, 0.0, 0.0]),
//!     Point::from([1.0, 0.0, 0.0]),
//!     Point::from([5.0, 5.0, 5.0]),
//! ];
//! let bounds = Bounds::enclosing(&points).unwrap();
//! let tree = KdTree::build(points, 3).unwrap();
//!
//! // Two closest points to the origin
//! let found = tree
//!     .k_nearest(&Point::from([0.0, 0.0, 0.0]), 2, SearchOptions::default())
//!     .unwrap();
//! assert_eq!(found[0].distance, 0.0);
//!
//! // One separating plane per node
//! let partitioner = RegionPartitioner::new(&tree, bounds).unwrap();
//! let mut visitor = CollectingVisitor::new();
//! partitioner.partition(&mut visitor);
//! assert_eq!(visitor.regions().len(), 3);
//! ```
//!
//! # Architecture
//!
//! - [`KdTree`]: the index, holding the root node and the point list
//! - [`KdNode`]: one stored point and its two subtrees
//! - [`RegionPartitioner`]: derives [`RegionDescriptor`]s from a tree
//! - [`RegionVisitor`]: receives descriptors during a partition walk
//! - [`IndexController`]: single owner of rebuild, query and regions

mod config;
mod controller;
mod error;
mod node;
mod partition;
mod point;
mod search;
mod source;
mod tree;
mod visitor;

pub use config::{ViewerConfig, MAX_NEIGHBORS, MIN_NEIGHBORS};
pub use controller::IndexController;
pub use error::{KdTreeError, Result};
pub use node::{KdNode, Side};
pub use partition::{axis_color, AxisColor, RegionDescriptor, RegionPartitioner, AXIS_PALETTE};
pub use point::{Bounds, Point, PointId};
pub use search::{ExplorationPolicy, Neighbor, SearchOptions};
pub use source::PointSource;
pub use tree::KdTree;
pub use visitor::{CollectingVisitor, RegionVisitor};
