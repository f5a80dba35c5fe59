//! Nearest-neighbor search options and the bounded candidate list.

use std::cmp::Ordering;

use crate::{Point, PointId};

/// How the search decides whether to visit the far side of a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExplorationPolicy {
    /// Skip the far subtree when the splitting plane is farther away than
    /// the worst kept candidate and the candidate list is full.
    #[default]
    Pruned,
    /// Always visit both subtrees. Equivalent to a brute-force scan that
    /// happens to walk the tree.
    Exhaustive,
}

/// Options for [`KdTree::k_nearest`](crate::KdTree::k_nearest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchOptions {
    pub exploration: ExplorationPolicy,
}

impl SearchOptions {
    /// Options that visit every node.
    pub fn exhaustive() -> Self {
        Self {
            exploration: ExplorationPolicy::Exhaustive,
        }
    }

    /// Options that prune subtrees which cannot improve the result.
    pub fn pruned() -> Self {
        Self {
            exploration: ExplorationPolicy::Pruned,
        }
    }
}

/// One search result.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub id: PointId,
    pub point: Point,
    pub distance: f32,
}

#[derive(Debug, Clone, Copy)]
struct Candidate<'a> {
    id: PointId,
    point: &'a Point,
    distance: f32,
}

/// Orders by distance, then by id so that equidistant points resolve to
/// the one that came first in the source point set.
fn rank(a: &Candidate<'_>, b: &Candidate<'_>) -> Ordering {
    a.distance
        .total_cmp(&b.distance)
        .then_with(|| a.id.cmp(&b.id))
}

/// The best `capacity` candidates seen so far, sorted ascending.
#[derive(Debug)]
pub(crate) struct CandidateList<'a> {
    capacity: usize,
    entries: Vec<Candidate<'a>>,
}

impl<'a> CandidateList<'a> {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Vec::with_capacity(capacity + 1),
        }
    }

    #[inline]
    pub(crate) fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Distance of the last kept candidate, or infinity while empty.
    #[inline]
    pub(crate) fn worst_distance(&self) -> f32 {
        self.entries.last().map_or(f32::INFINITY, |c| c.distance)
    }

    #[inline]
    fn contains(&self, id: PointId) -> bool {
        self.entries.iter().any(|c| c.id == id)
    }

    /// Offers a point to the list.
    ///
    /// Points already present are ignored. While the list has room every
    /// point is kept; once full, a point is kept only if it ranks strictly
    /// ahead of the current worst, which is then dropped.
    pub(crate) fn offer(&mut self, id: PointId, point: &'a Point, distance: f32) {
        if self.capacity == 0 || self.contains(id) {
            return;
        }

        let candidate = Candidate {
            id,
            point,
            distance,
        };

        if self.is_full() {
            match self.entries.last() {
                Some(worst) if rank(&candidate, worst) == Ordering::Less => {}
                _ => return,
            }
        }

        self.entries.push(candidate);
        self.entries.sort_by(rank);
        self.entries.truncate(self.capacity);
    }

    pub(crate) fn into_neighbors(self) -> Vec<Neighbor> {
        self.entries
            .into_iter()
            .map(|c| Neighbor {
                id: c.id,
                point: c.point.clone(),
                distance: c.distance,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_pruned() {
        assert_eq!(SearchOptions::default(), SearchOptions::pruned());
        assert_ne!(SearchOptions::exhaustive(), SearchOptions::pruned());
    }

    #[test]
    fn keeps_best_in_order() {
        let points: Vec<Point> = (0..5).map(|i| Point::from([i as f32])).collect();
        let mut list = CandidateList::new(2);

        list.offer(0, &points[0], 4.0);
        list.offer(1, &points[1], 1.0);
        assert!(list.is_full());
        assert_eq!(list.worst_distance(), 4.0);

        list.offer(2, &points[2], 2.0);
        list.offer(3, &points[3], 9.0);

        let ids: Vec<PointId> = list.into_neighbors().iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn ignores_duplicates_and_equal_worst() {
        let points: Vec<Point> = (0..3).map(|i| Point::from([i as f32])).collect();
        let mut list = CandidateList::new(2);

        list.offer(1, &points[1], 1.0);
        list.offer(1, &points[1], 1.0);
        list.offer(2, &points[2], 3.0);
        // Same distance as the worst but a larger id: not admitted.
        list.offer(5, &points[0], 3.0);
        // Same distance with a smaller id ranks ahead.
        list.offer(0, &points[0], 3.0);

        let ids: Vec<PointId> = list.into_neighbors().iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![1, 0]);
    }

    #[test]
    fn zero_capacity_keeps_nothing() {
        let p = Point::from([0.0]);
        let mut list = CandidateList::new(0);
        list.offer(0, &p, 0.0);
        assert!(list.into_neighbors().is_empty());
    }
}
