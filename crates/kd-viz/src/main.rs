use kd_tree::{
    ExplorationPolicy, IndexController, Point, Result, ViewerConfig, MAX_NEIGHBORS,
    MIN_NEIGHBORS,
};
use kd_viz::model::Shape;
use kd_viz::{draw_points, draw_query, Model, OrbitCamera, TreeNavigator};
use macroquad::prelude::*;

const MIN_SCALE: f32 = 0.1;
const MAX_SCALE: f32 = 10.0;

/// Viewer state that is not owned by the index controller.
struct Settings {
    shape: Shape,
    scale: f32,
    query: [f32; 3],
}

impl Settings {
    fn model(&self) -> Model {
        Model::new(self.shape).with_scale(self.scale)
    }

    fn query_point(&self) -> Point {
        Point::from(self.query)
    }

    /// Size of the model, used to scale markers and query steps.
    fn extent(&self) -> f32 {
        2.0 * self.scale
    }
}

/// Reloads the model: rebuilds the index, re-runs the query, resets the
/// navigator and frames the new bounds.
fn reload(
    controller: &mut IndexController,
    settings: &Settings,
    navigator: &mut TreeNavigator,
    camera: &mut OrbitCamera,
) -> Result<()> {
    controller.rebuild_from(&settings.model())?;
    let k = controller.config().neighbor_count;
    controller.query(settings.query_point(), k)?;
    navigator.go_root();
    if let Some(bounds) = controller.bounds() {
        camera.frame(bounds);
    }
    Ok(())
}

/// Applies keyboard settings. Returns an error only if the index rejects
/// an operation.
fn handle_input(
    controller: &mut IndexController,
    settings: &mut Settings,
    navigator: &mut TreeNavigator,
    camera: &mut OrbitCamera,
) -> Result<()> {
    let shape_keys = [KeyCode::Key1, KeyCode::Key2, KeyCode::Key3];
    for (key, shape) in shape_keys.into_iter().zip(Shape::ALL) {
        if is_key_pressed(key) && settings.shape != shape {
            settings.shape = shape;
            reload(controller, settings, navigator, camera)?;
        }
    }

    let scale_step = if is_key_pressed(KeyCode::Period) {
        0.1
    } else if is_key_pressed(KeyCode::Comma) {
        -0.1
    } else {
        0.0
    };
    if scale_step != 0.0 {
        settings.scale = (settings.scale + scale_step).clamp(MIN_SCALE, MAX_SCALE);
        reload(controller, settings, navigator, camera)?;
    }

    let k = controller.config().neighbor_count;
    if is_key_pressed(KeyCode::Equal) && k < MAX_NEIGHBORS {
        controller.set_neighbor_count(k + 1)?;
    }
    if is_key_pressed(KeyCode::Minus) && k > MIN_NEIGHBORS {
        controller.set_neighbor_count(k - 1)?;
    }

    if is_key_pressed(KeyCode::G) {
        let show = !controller.config().show_partition;
        controller.set_show_partition(show)?;
    }

    if is_key_pressed(KeyCode::E) {
        let next = match controller.config().exploration {
            ExplorationPolicy::Pruned => ExplorationPolicy::Exhaustive,
            ExplorationPolicy::Exhaustive => ExplorationPolicy::Pruned,
        };
        controller.set_exploration(next);
    }

    let step = 0.05 * settings.extent();
    let moves = [
        (KeyCode::A, 0, -step),
        (KeyCode::D, 0, step),
        (KeyCode::Q, 1, step),
        (KeyCode::Z, 1, -step),
        (KeyCode::W, 2, -step),
        (KeyCode::S, 2, step),
    ];
    let mut moved = false;
    for (key, axis, delta) in moves {
        if is_key_pressed(key) {
            settings.query[axis] += delta;
            moved = true;
        }
    }
    if is_key_pressed(KeyCode::O) {
        settings.query = [0.0; 3];
        moved = true;
    }
    if moved {
        controller.query(settings.query_point(), controller.config().neighbor_count)?;
    }

    navigator.update(controller.tree());
    Ok(())
}

fn draw_overlay(controller: &IndexController, settings: &Settings, navigator: &TreeNavigator) {
    let config = controller.config();
    let tree = controller.tree();

    draw_text(
        &format!(
            "kd-tree: {} ({} points, depth {}, scale {:.1})",
            settings.shape.name(),
            tree.len(),
            tree.depth(),
            settings.scale
        ),
        10.0,
        25.0,
        20.0,
        WHITE,
    );
    draw_text(
        &format!(
            "k = {} | query ({:.2}, {:.2}, {:.2}) | {:?} search | planes {}",
            config.neighbor_count,
            settings.query[0],
            settings.query[1],
            settings.query[2],
            config.exploration,
            if config.show_partition { "on" } else { "off" }
        ),
        10.0,
        45.0,
        18.0,
        GRAY,
    );

    if let Some(nearest) = controller.highlighted().first() {
        draw_text(
            &format!("nearest: #{} at {:.3}", nearest.id, nearest.distance),
            10.0,
            65.0,
            18.0,
            YELLOW,
        );
    }

    navigator.draw_ui(tree, 90.0);

    draw_text(
        "1/2/3 model | ,/. scale | -/= k | G planes | E search | WASDQZ move query | O origin",
        10.0,
        175.0,
        16.0,
        DARKGRAY,
    );
    draw_text(&format!("FPS: {}", get_fps()), 10.0, 195.0, 16.0, DARKGRAY);
}

#[macroquad::main("k-d Tree Viewer")]
async fn main() {
    env_logger::init();

    let config = ViewerConfig::default();
    let mut settings = Settings {
        shape: Shape::Cube,
        scale: 1.0,
        query: [0.0; 3],
    };
    let mut controller = match IndexController::new(config) {
        Ok(c) => c,
        Err(err) => {
            log::error!("invalid viewer configuration: {err}");
            return;
        }
    };
    let mut navigator = TreeNavigator::new();
    let mut camera = OrbitCamera::new(5.0, 0.4, 0.4).with_zoom(0.1, 0.1, 60.0);

    if let Err(err) = reload(&mut controller, &settings, &mut navigator, &mut camera) {
        log::error!("failed to load {}: {err}", settings.shape.name());
        return;
    }
    log::info!(
        "loaded {} with {} points",
        settings.shape.name(),
        controller.tree().len()
    );

    loop {
        camera.update();
        let handled = handle_input(&mut controller, &mut settings, &mut navigator, &mut camera);
        if let Err(err) = handled {
            log::warn!("ignored input: {err}");
        }

        clear_background(BLACK);
        set_camera(&camera.to_camera3d());

        draw_points(
            controller.tree().points(),
            controller.highlighted(),
            settings.extent(),
        );
        draw_query(controller.last_query(), settings.extent());
        navigator.render(controller.tree(), controller.regions());

        set_default_camera();
        draw_overlay(&controller, &settings, &navigator);

        next_frame().await
    }
}
