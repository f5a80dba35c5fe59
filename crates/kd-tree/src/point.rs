//! Point and bounding-box representation for the k-d tree.

use std::fmt;
use std::ops::Index;

use nalgebra::{DVector, Point3};

use crate::{KdTreeError, Result};

/// Stable identifier of a point: its position in the index's point list.
pub type PointId = usize;

/// A point with a fixed number of real coordinates.
///
/// Equality is exact per-coordinate floating-point equality. The tree
/// itself never relies on it for identity; it carries a [`PointId`]
/// alongside every stored point instead.
#[derive(Clone, PartialEq)]
pub struct Point(DVector<f32>);

impl Point {
    /// Creates a point from its coordinates.
    pub fn new(coords: Vec<f32>) -> Self {
        Self(DVector::from_vec(coords))
    }

    /// Creates a point from a coordinate slice.
    pub fn from_slice(coords: &[f32]) -> Self {
        Self(DVector::from_column_slice(coords))
    }

    /// The origin in `dim` dimensions.
    pub fn origin(dim: usize) -> Self {
        Self(DVector::zeros(dim))
    }

    /// Number of coordinates.
    #[inline]
    pub fn dim(&self) -> usize {
        self.0.len()
    }

    /// Returns the coordinate on `axis`.
    ///
    /// # Panics
    /// Panics if `axis >= self.dim()`.
    #[inline]
    pub fn coord(&self, axis: usize) -> f32 {
        self.0[axis]
    }

    /// Overwrites the coordinate on `axis`.
    #[inline]
    pub fn set_coord(&mut self, axis: usize, value: f32) {
        self.0[axis] = value;
    }

    /// Returns the coordinates as a slice.
    #[inline]
    pub fn coords(&self) -> &[f32] {
        self.0.as_slice()
    }

    /// Euclidean distance to another point of the same dimension.
    #[inline]
    pub fn distance(&self, other: &Point) -> f32 {
        (&self.0 - &other.0).norm()
    }

    /// Returns the first three coordinates as a 3D point, if there are at least three.
    pub fn to_point3(&self) -> Option<Point3<f32>> {
        match self.coords() {
            [x, y, z, ..] => Some(Point3::new(*x, *y, *z)),
            _ => None,
        }
    }

    /// Errors unless this point has exactly `dim` coordinates.
    pub(crate) fn check_dim(&self, dim: usize) -> Result<()> {
        if self.dim() == dim {
            Ok(())
        } else {
            Err(KdTreeError::DimensionMismatch {
                expected: dim,
                found: self.dim(),
            })
        }
    }
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.coords()).finish()
    }
}

impl Index<usize> for Point {
    type Output = f32;

    fn index(&self, axis: usize) -> &f32 {
        &self.0[axis]
    }
}

impl From<Vec<f32>> for Point {
    fn from(coords: Vec<f32>) -> Self {
        Self::new(coords)
    }
}

impl<const N: usize> From<[f32; N]> for Point {
    fn from(coords: [f32; N]) -> Self {
        Self::from_slice(&coords)
    }
}

impl From<Point3<f32>> for Point {
    fn from(p: Point3<f32>) -> Self {
        Self::from_slice(p.coords.as_slice())
    }
}

/// An axis-aligned box given by its minimum and maximum corners.
#[derive(Debug, Clone, PartialEq)]
pub struct Bounds {
    min: Point,
    max: Point,
}

impl Bounds {
    /// Creates bounds from two corners.
    ///
    /// Fails if the corners differ in dimension or if `min` exceeds `max`
    /// on any axis.
    pub fn new(min: Point, max: Point) -> Result<Self> {
        max.check_dim(min.dim())?;
        if let Some(axis) = (0..min.dim()).find(|&a| min[a] > max[a]) {
            return Err(KdTreeError::InvertedBounds { axis });
        }
        Ok(Self { min, max })
    }

    /// Computes the tightest bounds enclosing every point.
    ///
    /// Returns `None` for an empty point set. Points are assumed to share
    /// the dimension of the first one; extra coordinates are ignored.
    pub fn enclosing<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Self {
            min: first.clone(),
            max: first.clone(),
        };
        for p in iter {
            bounds.include(p);
        }
        Some(bounds)
    }

    /// The minimum corner.
    #[inline]
    pub fn min(&self) -> &Point {
        &self.min
    }

    /// The maximum corner.
    #[inline]
    pub fn max(&self) -> &Point {
        &self.max
    }

    /// Number of dimensions.
    #[inline]
    pub fn dim(&self) -> usize {
        self.min.dim()
    }

    /// The center of the box.
    pub fn center(&self) -> Point {
        Point((&self.min.0 + &self.max.0) * 0.5)
    }

    /// Returns `true` if `point` lies inside the box or on its boundary.
    pub fn contains(&self, point: &Point) -> bool {
        point.dim() == self.dim()
            && (0..self.dim()).all(|a| self.min[a] <= point[a] && point[a] <= self.max[a])
    }

    /// Product of the side lengths.
    pub fn volume(&self) -> f32 {
        (0..self.dim()).map(|a| self.max[a] - self.min[a]).product()
    }

    /// Grows the box just enough to contain `point`.
    pub fn include(&mut self, point: &Point) {
        for axis in 0..self.dim().min(point.dim()) {
            self.min.set_coord(axis, self.min[axis].min(point[axis]));
            self.max.set_coord(axis, self.max[axis].max(point[axis]));
        }
    }

    /// Splits the box at `value` on `axis` into the lower and upper halves.
    ///
    /// The lower half keeps `min` and has `max[axis] = value`, the upper half
    /// keeps `max` and has `min[axis] = value`. The halves share the plane
    /// `axis = value` and nothing else.
    pub fn split(&self, axis: usize, value: f32) -> (Bounds, Bounds) {
        let mut lower_max = self.max.clone();
        lower_max.set_coord(axis, value);
        let mut upper_min = self.min.clone();
        upper_min.set_coord(axis, value);
        (
            Bounds {
                min: self.min.clone(),
                max: lower_max,
            },
            Bounds {
                min: upper_min,
                max: self.max.clone(),
            },
        )
    }
}
