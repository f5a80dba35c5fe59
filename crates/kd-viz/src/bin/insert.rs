use kd_tree::{IndexController, Point, ViewerConfig};
use kd_viz::{draw_points, draw_query, OrbitCamera, TreeNavigator};
use macroquad::prelude::*;
use nalgebra::{Point3, Vector3};
use ::rand::rngs::StdRng;
use ::rand::{Rng, SeedableRng};

const WORLD_SIZE: f32 = 4.0;
const MAX_POINTS: usize = 400;
/// Frames between automatic insertions.
const INSERT_INTERVAL: u32 = 6;

/// Random point inside a spherical shell, so the unbalanced tree grows
/// around a hollow center.
fn random_shell_point(rng: &mut StdRng) -> Point {
    let dir = Vector3::<f32>::new(
        rng.random_range(-1.0..1.0),
        rng.random_range(-1.0..1.0),
        rng.random_range(-1.0..1.0),
    );
    let dir = dir
        .try_normalize(1e-3)
        .unwrap_or_else(|| Vector3::new(1.0, 0.0, 0.0));
    let radius = rng.random_range(0.6f32..1.0) * WORLD_SIZE / 2.0;
    Point::from(Point3::from(dir * radius))
}

#[macroquad::main("k-d Tree Insertion")]
async fn main() {
    env_logger::init();

    let mut controller = match IndexController::new(ViewerConfig::default()) {
        Ok(c) => c,
        Err(err) => {
            log::error!("invalid viewer configuration: {err}");
            return;
        }
    };
    let mut rng = StdRng::seed_from_u64(42);
    let mut camera = OrbitCamera::new(8.0, 0.0, 0.3).with_zoom(0.1, 1.0, 30.0);
    let mut navigator = TreeNavigator::new();
    let mut paused = false;
    let mut frame = 0u32;

    loop {
        camera.update();
        navigator.update(controller.tree());

        if is_key_pressed(KeyCode::Space) {
            paused = !paused;
        }
        if is_key_pressed(KeyCode::R) {
            if let Err(err) = controller.rebuild(controller.tree().points().to_vec(), None) {
                log::error!("rebalance failed: {err}");
            }
            navigator.go_root();
            if let Some(bounds) = controller.bounds() {
                camera.frame(bounds);
            }
        }

        frame = frame.wrapping_add(1);
        let due = !paused && frame % INSERT_INTERVAL == 0;
        if (due || is_key_pressed(KeyCode::N)) && controller.tree().len() < MAX_POINTS {
            let point = random_shell_point(&mut rng);
            let k = controller.config().neighbor_count;
            if let Err(err) = controller.insert(point) {
                log::error!("insert failed: {err}");
            } else if let Err(err) = controller.set_neighbor_count(k) {
                log::warn!("query after insert failed: {err}");
            }
        }

        clear_background(BLACK);
        set_camera(&camera.to_camera3d());

        draw_points(controller.tree().points(), controller.highlighted(), WORLD_SIZE);
        draw_query(controller.last_query(), WORLD_SIZE);
        navigator.render(controller.tree(), controller.regions());

        set_default_camera();
        let tree = controller.tree();
        draw_text(
            &format!(
                "k-d tree: {} points, depth {}{}",
                tree.len(),
                tree.depth(),
                if paused { " (paused)" } else { "" }
            ),
            10.0,
            25.0,
            20.0,
            WHITE,
        );
        navigator.draw_ui(tree, 50.0);
        draw_text(
            "Space pause | N insert one | R rebalance",
            10.0,
            135.0,
            16.0,
            DARKGRAY,
        );

        next_frame().await
    }
}
