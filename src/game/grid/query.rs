use bevy::prelude::*;

use super::node::Node;
use super::Grid;

/// Points sampled on each cell for the circle test, in half-cell units:
/// the four edge midpoints, then the four corners.
const CELL_SAMPLES: [Vec2; 8] = [
    Vec2::new(1.0, 0.0),
    Vec2::new(-1.0, 0.0),
    Vec2::new(0.0, 1.0),
    Vec2::new(0.0, -1.0),
    Vec2::new(1.0, 1.0),
    Vec2::new(1.0, -1.0),
    Vec2::new(-1.0, 1.0),
    Vec2::new(-1.0, -1.0),
];

impl Grid {
    /// Node whose cell contains `point` (XZ plane), or `None` outside the grid.
    pub fn get_node_at_point(&self, point: Vec3) -> Option<&Node> {
        let local = (point - self.offset) / self.node_size;
        if !local.is_finite() {
            return None;
        }
        self.get_node_at(local.x.floor() as i32, local.z.floor() as i32)
    }

    /// Nodes whose cell touches a circle of `radius` around `center` (XZ plane).
    ///
    /// Approximate: a cell counts when one of its eight sample points (edge
    /// midpoints and corners) lies strictly inside the circle. A circle smaller
    /// than a cell and centred inside it touches no sample and returns nothing.
    pub fn get_nodes_in_circle(&self, center: Vec3, radius: f32) -> Vec<&Node> {
        if radius.is_nan() || radius <= 0.0 {
            return Vec::new();
        }

        let half = self.node_size * 0.5;
        let reach = radius + half;
        let sqr_radius = radius * radius;
        let center = Vec2::new(center.x, center.z);

        self.enumerate_all_nodes()
            .filter(|node| {
                let pos = Vec2::new(node.position().x, node.position().z);
                // Bounding box rejection
                if (pos.x - center.x).abs() > reach || (pos.y - center.y).abs() > reach {
                    return false;
                }
                CELL_SAMPLES
                    .iter()
                    .any(|sample| (pos + *sample * half).distance_squared(center) < sqr_radius)
            })
            .collect()
    }

    /// Flow direction of the node under `point`, for movement agents.
    pub fn direction_at_point(&self, point: Vec3) -> Option<Vec3> {
        self.get_node_at_point(point).map(Node::direction)
    }
}
