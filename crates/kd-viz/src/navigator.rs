//! k-d tree navigation for exploring the partition one subtree at a time.

use std::collections::HashSet;

use kd_tree::{KdNode, KdTree, PointId, RegionDescriptor, Side};
use macroquad::prelude::*;

use crate::{draw_region, draw_regions};

/// Interactive navigator that narrows the drawn planes to a subtree.
#[derive(Default)]
pub struct TreeNavigator {
    path: Vec<Side>,
}

impl TreeNavigator {
    /// Creates a new navigator starting at the root.
    pub fn new() -> Self {
        Self::default()
    }

    /// Steps into the child on `side`. Returns true if that child exists.
    pub fn descend(&mut self, tree: &KdTree, side: Side) -> bool {
        let has_child = self
            .current_node(tree)
            .is_some_and(|node| node.child(side).is_some());
        if has_child {
            self.path.push(side);
        }
        has_child
    }

    /// Navigates to the parent node. Returns true if not already at root.
    pub fn go_parent(&mut self) -> bool {
        self.path.pop().is_some()
    }

    /// Returns to the root node.
    pub fn go_root(&mut self) {
        self.path.clear();
    }

    /// Handles keyboard input: `[`/`]` for the left/right child, Backspace
    /// for the parent, Home for the root. Returns true if the path changed.
    pub fn update(&mut self, tree: &KdTree) -> bool {
        let mut changed = false;

        if is_key_pressed(KeyCode::LeftBracket) {
            changed |= self.descend(tree, Side::Left);
        }
        if is_key_pressed(KeyCode::RightBracket) {
            changed |= self.descend(tree, Side::Right);
        }
        if is_key_pressed(KeyCode::Backspace) {
            changed |= self.go_parent();
        }
        if is_key_pressed(KeyCode::Home) && !self.path.is_empty() {
            self.go_root();
            changed = true;
        }

        changed
    }

    /// Returns the current node, or `None` if the tree is empty or the path
    /// no longer fits it (after a rebuild).
    pub fn current_node<'a>(&self, tree: &'a KdTree) -> Option<&'a KdNode> {
        let mut current = tree.root()?;
        for &side in &self.path {
            current = current.child(side)?;
        }
        Some(current)
    }

    /// Ids of all points in the current subtree.
    pub fn subtree_ids(&self, tree: &KdTree) -> HashSet<PointId> {
        let mut ids = HashSet::new();
        let mut stack: Vec<&KdNode> = self.current_node(tree).into_iter().collect();
        while let Some(node) = stack.pop() {
            ids.insert(node.id());
            stack.extend(node.left());
            stack.extend(node.right());
        }
        ids
    }

    /// Draws only the planes belonging to the current subtree.
    pub fn render(&self, tree: &KdTree, regions: &[RegionDescriptor]) {
        if self.path.is_empty() {
            draw_regions(regions);
            return;
        }
        let ids = self.subtree_ids(tree);
        regions
            .iter()
            .filter(|r| ids.contains(&r.id()))
            .for_each(draw_region);
    }

    /// Draws the navigation UI overlay.
    pub fn draw_ui(&self, tree: &KdTree, y_offset: f32) {
        let (subtree_points, has_left, has_right, is_leaf) = match self.current_node(tree) {
            Some(node) => (
                node.len(),
                node.left().is_some(),
                node.right().is_some(),
                node.is_leaf(),
            ),
            None => (0, false, false, true),
        };

        let path_str = if self.path.is_empty() {
            "root".to_string()
        } else {
            self.path
                .iter()
                .map(|side| match side {
                    Side::Left => "L",
                    Side::Right => "R",
                })
                .collect::<Vec<_>>()
                .join(" -> ")
        };

        draw_text(
            &format!("Subtree: {} points", subtree_points),
            10.0,
            y_offset,
            18.0,
            WHITE,
        );
        draw_text(
            &format!("Path: {} (depth {})", path_str, self.path.len()),
            10.0,
            y_offset + 20.0,
            18.0,
            YELLOW,
        );
        draw_text(
            &format!(
                "Children: {}{}{}",
                if has_left { "[ left " } else { "" },
                if has_right { "] right " } else { "" },
                if is_leaf { "(leaf)" } else { "" }
            ),
            10.0,
            y_offset + 40.0,
            18.0,
            if is_leaf { ORANGE } else { GREEN },
        );
        draw_text("Backspace parent | Home root", 10.0, y_offset + 60.0, 16.0, DARKGRAY);
    }
}
