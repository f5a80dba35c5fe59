//! k-d tree node implementation.

use std::fmt;

use crate::{Point, PointId};

/// A node in the k-d tree.
///
/// Each node stores exactly one point together with its [`PointId`]. At
/// depth `d` the node splits its subtree on axis `d mod k`: points reached
/// through `left` lie on the low side of `point[axis]`, points reached
/// through `right` on the high side.
///
/// Children are exclusively owned and there is no parent link; the tree
/// is only ever walked top-down.
pub struct KdNode {
    id: PointId,
    point: Point,
    left: Option<Box<KdNode>>,
    right: Option<Box<KdNode>>,
}

impl KdNode {
    /// Creates a leaf node.
    pub fn new(id: PointId, point: Point) -> Self {
        Self {
            id,
            point,
            left: None,
            right: None,
        }
    }

    /// The identifier of the stored point.
    #[inline]
    pub fn id(&self) -> PointId {
        self.id
    }

    /// The stored point.
    #[inline]
    pub fn point(&self) -> &Point {
        &self.point
    }

    /// The stored point's coordinate on `axis`.
    #[inline]
    pub fn split_value(&self, axis: usize) -> f32 {
        self.point[axis]
    }

    /// Returns a reference to the left (low side) subtree.
    #[inline]
    pub fn left(&self) -> Option<&KdNode> {
        self.left.as_deref()
    }

    /// Returns a reference to the right (high side) subtree.
    #[inline]
    pub fn right(&self) -> Option<&KdNode> {
        self.right.as_deref()
    }

    #[inline]
    pub(crate) fn set_left(&mut self, node: Option<KdNode>) {
        self.left = node.map(Box::new);
    }

    #[inline]
    pub(crate) fn set_right(&mut self, node: Option<KdNode>) {
        self.right = node.map(Box::new);
    }

    /// The child slot on the given side, for insertion.
    #[inline]
    pub(crate) fn child_slot_mut(&mut self, side: Side) -> &mut Option<Box<KdNode>> {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    /// The child on the given side.
    #[inline]
    pub fn child(&self, side: Side) -> Option<&KdNode> {
        match side {
            Side::Left => self.left(),
            Side::Right => self.right(),
        }
    }

    /// Checks if this node has any children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// Returns the number of points in this subtree.
    pub fn len(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.left());
            stack.extend(node.right());
        }
        count
    }

    /// Returns the depth of this subtree (1 for a leaf node).
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1)];
        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(node.left().map(|n| (n, depth + 1)));
            stack.extend(node.right().map(|n| (n, depth + 1)));
        }
        deepest
    }
}

// Copies in pre-order, then links each copy into its parent from the back,
// so every child is complete before it is moved into place.
impl Clone for KdNode {
    fn clone(&self) -> Self {
        let mut copies = vec![KdNode::new(self.id, self.point.clone())];
        let mut links: Vec<(usize, Side)> = Vec::new();
        let mut stack: Vec<(&KdNode, usize)> = vec![(self, 0)];
        while let Some((node, index)) = stack.pop() {
            for side in [Side::Right, Side::Left] {
                if let Some(child) = node.child(side) {
                    links.push((index, side));
                    stack.push((child, copies.len()));
                    copies.push(KdNode::new(child.id, child.point.clone()));
                }
            }
        }

        while let Some((parent, side)) = links.pop() {
            let Some(node) = copies.pop() else {
                break;
            };
            *copies[parent].child_slot_mut(side) = Some(Box::new(node));
        }
        copies.swap_remove(0)
    }
}

// Shows the children by id only; a derived impl would recurse per level.
impl fmt::Debug for KdNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KdNode")
            .field("id", &self.id)
            .field("point", &self.point)
            .field("left", &self.left().map(KdNode::id))
            .field("right", &self.right().map(KdNode::id))
            .finish()
    }
}

// Children are released from a work-list so that dropping a deep
// insert-grown chain does not recurse once per level.
impl Drop for KdNode {
    fn drop(&mut self) {
        let mut stack: Vec<Box<KdNode>> = self.left.take().into_iter().collect();
        stack.extend(self.right.take());
        while let Some(mut node) = stack.pop() {
            stack.extend(node.left.take());
            stack.extend(node.right.take());
        }
    }
}

/// Which child of a node a point belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// The branch a point descends into at a node splitting on `axis`.
    ///
    /// Strictly smaller coordinates go left, everything else goes right.
    #[inline]
    pub fn of(point: &Point, node: &KdNode, axis: usize) -> Self {
        if point[axis] < node.split_value(axis) {
            Side::Left
        } else {
            Side::Right
        }
    }

    /// The other side.
    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}
