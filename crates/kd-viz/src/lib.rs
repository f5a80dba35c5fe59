//! Shared visualization utilities for the k-d tree viewer.

use kd_tree::{AxisColor, Bounds, Neighbor, Point, RegionDescriptor};
use macroquad::models::{draw_mesh, Mesh, Vertex};
use macroquad::prelude::*;

pub mod model;
pub mod navigator;
pub use model::Model;
pub use navigator::TreeNavigator;

/// Opacity of separating planes.
pub const PLANE_ALPHA: f32 = 0.3;

/// Color of ordinary points.
pub const POINT_COLOR: Color = WHITE;
/// Color of highlighted points.
pub const HIGHLIGHT_COLOR: Color = Color::new(1.0, 1.0, 0.5, 1.0);
/// Color of the query marker.
pub const QUERY_COLOR: Color = Color::new(1.0, 0.3, 0.3, 1.0);

/// Point sprite sizes, as a fraction of the model's extent.
const POINT_SIZE: f32 = 0.01;
const POINT_SIZE_IDLE: f32 = 0.02;
const HIGHLIGHT_SIZE: f32 = 0.025;

/// Converts a palette entry into a translucent macroquad color.
pub fn plane_color(color: AxisColor) -> Color {
    let [r, g, b] = color.rgb();
    Color::from_rgba(r, g, b, (PLANE_ALPHA * 255.0) as u8)
}

fn vec3_of(point: &Point) -> Option<Vec3> {
    point.to_point3().map(|p| vec3(p.x, p.y, p.z))
}

/// Draws one separating plane as a two-sided translucent quad.
///
/// Regions that are not 3-dimensional are skipped.
pub fn draw_region(region: &RegionDescriptor) {
    let Some(corners) = region.quad() else {
        return;
    };
    let color = plane_color(region.color());

    let vertices: Vec<Vertex> = corners
        .iter()
        .map(|p| Vertex::new2(vec3(p.x, p.y, p.z), vec2(0.0, 0.0), color))
        .collect();

    // Both windings so the plane shows from either side.
    let indices: Vec<u16> = vec![0, 1, 2, 0, 2, 3, 0, 2, 1, 0, 3, 2];

    draw_mesh(&Mesh {
        vertices,
        indices,
        texture: None,
    });

    for i in 0..4 {
        let a = corners[i];
        let b = corners[(i + 1) % 4];
        draw_line_3d(vec3(a.x, a.y, a.z), vec3(b.x, b.y, b.z), color);
    }
}

/// Draws every region in the list.
pub fn draw_regions<'a>(regions: impl IntoIterator<Item = &'a RegionDescriptor>) {
    for region in regions {
        draw_region(region);
    }
}

/// Draws the point cloud, emphasizing the highlighted subset.
///
/// `extent` is the size of the model, used to scale the point markers.
/// Points render larger while nothing is highlighted.
pub fn draw_points(points: &[Point], highlighted: &[Neighbor], extent: f32) {
    let mut is_highlighted = vec![false; points.len()];
    for n in highlighted {
        if let Some(flag) = is_highlighted.get_mut(n.id) {
            *flag = true;
        }
    }

    let plain = extent
        * if highlighted.is_empty() {
            POINT_SIZE_IDLE
        } else {
            POINT_SIZE
        };
    let emphasized = HIGHLIGHT_SIZE * extent;

    for (point, &lit) in points.iter().zip(&is_highlighted) {
        let Some(center) = vec3_of(point) else {
            continue;
        };
        if lit {
            draw_cube(center, Vec3::splat(emphasized), None, HIGHLIGHT_COLOR);
        } else {
            draw_cube(center, Vec3::splat(plain), None, POINT_COLOR);
        }
    }
}

/// Draws a small marker at the query point.
pub fn draw_query(query: &Point, extent: f32) {
    if let Some(center) = vec3_of(query) {
        draw_cube_wires(center, Vec3::splat(HIGHLIGHT_SIZE * extent * 1.5), QUERY_COLOR);
    }
}

/// Radians turned per frame while an arrow key is held.
const ORBIT_STEP: f32 = 0.02;
/// Arrow keys and the (yaw, pitch) direction each one turns.
const ORBIT_KEYS: [(KeyCode, f32, f32); 4] = [
    (KeyCode::Left, 1.0, 0.0),
    (KeyCode::Right, -1.0, 0.0),
    (KeyCode::Up, 0.0, 1.0),
    (KeyCode::Down, 0.0, -1.0),
];
/// Camera distance as a multiple of the framed box's half-diagonal.
const FRAME_MARGIN: f32 = 2.5;

/// Orbit camera around a model's bounding box.
///
/// Zoom is multiplicative so one wheel notch feels the same at every
/// model scale.
pub struct OrbitCamera {
    target: Vec3,
    distance: f32,
    yaw: f32,
    pitch: f32,
    /// Fraction of the distance covered by one wheel notch.
    zoom_step: f32,
    min_distance: f32,
    max_distance: f32,
}

impl OrbitCamera {
    /// Creates a camera looking at the origin.
    pub fn new(distance: f32, yaw: f32, pitch: f32) -> Self {
        Self {
            target: Vec3::ZERO,
            distance,
            yaw,
            pitch,
            zoom_step: 0.1,
            min_distance: 0.1,
            max_distance: 100.0,
        }
    }

    /// Sets the per-notch zoom fraction and the distance limits.
    pub fn with_zoom(mut self, step: f32, min: f32, max: f32) -> Self {
        self.zoom_step = step;
        self.min_distance = min;
        self.max_distance = max;
        self
    }

    /// Centers on `bounds` and backs off until the whole box is in view.
    ///
    /// Boxes that are not 3-dimensional leave the camera unchanged.
    pub fn frame(&mut self, bounds: &Bounds) {
        let Some(center) = vec3_of(&bounds.center()) else {
            return;
        };
        let radius = bounds.min().distance(bounds.max()) / 2.0;
        self.target = center;
        self.distance = (radius * FRAME_MARGIN).clamp(self.min_distance, self.max_distance);
    }

    #[inline]
    pub fn target(&self) -> Vec3 {
        self.target
    }

    #[inline]
    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Applies mouse drag, wheel zoom and arrow-key rotation.
    pub fn update(&mut self) {
        if is_mouse_button_down(MouseButton::Left) {
            let delta = mouse_delta_position();
            self.yaw -= delta.x * 2.0;
            self.pitch -= delta.y * 2.0;
        }
        for (key, yaw, pitch) in ORBIT_KEYS {
            if is_key_down(key) {
                self.yaw += yaw * ORBIT_STEP;
                self.pitch += pitch * ORBIT_STEP;
            }
        }
        self.pitch = self.pitch.clamp(-1.5, 1.5);

        let scroll = mouse_wheel().1;
        if scroll != 0.0 {
            self.distance = (self.distance * (1.0 - scroll.signum() * self.zoom_step))
                .clamp(self.min_distance, self.max_distance);
        }
    }

    pub fn position(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        self.target + self.distance * vec3(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw)
    }

    pub fn to_camera3d(&self) -> Camera3D {
        Camera3D {
            position: self.position(),
            up: Vec3::Y,
            target: self.target,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plane_color_is_translucent_palette_entry() {
        let c = plane_color(AxisColor(0xff0000));
        assert_eq!(c.r, 1.0);
        assert_eq!(c.g, 0.0);
        assert!((c.a - PLANE_ALPHA).abs() < 0.01);
    }

    #[test]
    fn camera_orbits_origin() {
        let camera = OrbitCamera::new(5.0, 0.0, 0.0);
        assert!((camera.position() - vec3(0.0, 0.0, 5.0)).length() < 1e-5);
    }

    #[test]
    fn frame_centers_on_bounds() {
        let bounds =
            Bounds::new(Point::from([1.0, 1.0, 1.0]), Point::from([3.0, 3.0, 3.0])).unwrap();
        let mut camera = OrbitCamera::new(5.0, 0.0, 0.0).with_zoom(0.1, 0.5, 50.0);
        camera.frame(&bounds);

        assert_eq!(camera.target(), vec3(2.0, 2.0, 2.0));
        assert!((camera.distance() - 3.0f32.sqrt() * FRAME_MARGIN).abs() < 1e-4);
        assert!(((camera.position() - camera.target()).length() - camera.distance()).abs() < 1e-4);
    }

    #[test]
    fn frame_respects_distance_limits() {
        let tiny =
            Bounds::new(Point::from([0.0, 0.0, 0.0]), Point::from([0.01, 0.0, 0.0])).unwrap();
        let mut camera = OrbitCamera::new(5.0, 0.0, 0.0).with_zoom(0.1, 0.5, 50.0);
        camera.frame(&tiny);
        assert_eq!(camera.distance(), 0.5);

        let flat = Bounds::new(Point::from([0.0, 0.0]), Point::from([9.0, 9.0])).unwrap();
        camera.frame(&flat);
        assert_eq!(camera.distance(), 0.5);
    }
}
