//! Procedural point-cloud models for the viewer.

use std::f32::consts::TAU;

use kd_tree::{Point, PointSource};

/// The shapes the viewer can show.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    Cube,
    Sphere,
    Torus,
}

impl Shape {
    pub const ALL: [Shape; 3] = [Shape::Cube, Shape::Sphere, Shape::Torus];

    pub fn name(self) -> &'static str {
        match self {
            Shape::Cube => "Cube",
            Shape::Sphere => "Sphere",
            Shape::Torus => "Torus",
        }
    }
}

/// A shape at a given scale, supplying its vertex positions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Model {
    pub shape: Shape,
    pub scale: f32,
}

impl Model {
    pub fn new(shape: Shape) -> Self {
        Self { shape, scale: 1.0 }
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }
}

impl PointSource for Model {
    fn points(&self) -> Vec<Point> {
        let raw = match self.shape {
            Shape::Cube => cube_vertices(6),
            Shape::Sphere => sphere_vertices(12, 24),
            Shape::Torus => torus_vertices(0.7, 0.3, 32, 12),
        };
        raw.into_iter()
            .map(|[x, y, z]| Point::from([x * self.scale, y * self.scale, z * self.scale]))
            .collect()
    }
}

/// Lattice points on the six faces of the cube `[-1, 1]^3`.
///
/// Edge and corner points appear once per face that touches them, the way
/// a mesh stores vertices per face.
fn cube_vertices(steps: usize) -> Vec<[f32; 3]> {
    let coord = |i: usize| -1.0 + 2.0 * i as f32 / steps as f32;
    let mut out = Vec::with_capacity(6 * (steps + 1) * (steps + 1));
    for axis in 0..3 {
        for side in [-1.0, 1.0] {
            for i in 0..=steps {
                for j in 0..=steps {
                    let mut v = [0.0; 3];
                    v[axis] = side;
                    v[(axis + 1) % 3] = coord(i);
                    v[(axis + 2) % 3] = coord(j);
                    out.push(v);
                }
            }
        }
    }
    out
}

/// UV-sphere vertices of radius 1, poles included once.
fn sphere_vertices(rings: usize, segments: usize) -> Vec<[f32; 3]> {
    let mut out = vec![[0.0, 1.0, 0.0]];
    for ring in 1..rings {
        let (sin_t, cos_t) = (std::f32::consts::PI * ring as f32 / rings as f32).sin_cos();
        for seg in 0..segments {
            let (sin_p, cos_p) = (TAU * seg as f32 / segments as f32).sin_cos();
            out.push([sin_t * cos_p, cos_t, sin_t * sin_p]);
        }
    }
    out.push([0.0, -1.0, 0.0]);
    out
}

/// Torus vertices around the y axis.
fn torus_vertices(major: f32, minor: f32, segments: usize, sides: usize) -> Vec<[f32; 3]> {
    let mut out = Vec::with_capacity(segments * sides);
    for seg in 0..segments {
        let (sin_u, cos_u) = (TAU * seg as f32 / segments as f32).sin_cos();
        for side in 0..sides {
            let (sin_v, cos_v) = (TAU * side as f32 / sides as f32).sin_cos();
            let r = major + minor * cos_v;
            out.push([r * cos_u, minor * sin_v, r * sin_u]);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_counts() {
        assert_eq!(Model::new(Shape::Cube).points().len(), 6 * 7 * 7);
        assert_eq!(Model::new(Shape::Sphere).points().len(), 2 + 11 * 24);
        assert_eq!(Model::new(Shape::Torus).points().len(), 32 * 12);
    }

    #[test]
    fn scale_applies_to_bounds() {
        let bounds = Model::new(Shape::Cube).with_scale(2.0).bounds().unwrap();
        assert_eq!(bounds.min(), &Point::from([-2.0, -2.0, -2.0]));
        assert_eq!(bounds.max(), &Point::from([2.0, 2.0, 2.0]));
    }

    #[test]
    fn sphere_points_are_on_unit_sphere() {
        let origin = Point::origin(3);
        for p in Model::new(Shape::Sphere).points() {
            assert!((p.distance(&origin) - 1.0).abs() < 1e-5);
        }
    }
}
