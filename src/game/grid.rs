//! Tile grid with a live flow field toward a single target.
//!
//! This module is organized into:
//! - **node**: the per-cell record and coordinate helpers
//! - **query**: world-point and radius lookups
//! - **selection**: transient UI selection
//! - **occupancy**: the feasibility gate and occupancy commits
//! - **events**: messages exchanged with the rest of the game
//! - **systems**: startup and per-tick systems driving the grid

use bevy::prelude::*;

use crate::game::config::{load_grid_config, FeasibilityCachePolicy, GridConfig};
use crate::game::error::{GridError, GridResult};
use crate::game::flow_field::FlowFieldPathfinding;
use crate::profile_log;

pub mod node;
pub mod events;
pub mod systems;
mod query;
mod selection;
mod occupancy;


pub use node::{GridCoord, Node, OccupationFeasibility, UNREACHABLE};
pub use events::{FlowFieldUpdated, PlacementOutcome, PlacementRequest, ReleaseRequest};

use node::{in_bounds, index_of};

/// The level grid: a fixed `width × height` arena of [`Node`]s plus the flow
/// field toward `target`.
///
/// Nodes are stored column-major (`i` outer, `j` inner) and addressed by
/// [`GridCoord`]; `next_node` links are coordinates, never references.
///
/// # Occupancy protocol
///
/// ```rust,ignore
/// if grid.can_occupy(coord) {
///     grid.try_occupy_node(coord, true);
/// }
/// ```
///
/// `can_occupy` never changes the field. `try_occupy_node` commits without
/// checking and recomputes the whole field.
///
/// # Invariant
///
/// As long as every commit is gated by `can_occupy` (with the default
/// [`FeasibilityCachePolicy::InvalidateOnCommit`]), following `next_node` from
/// the start always reaches the target.
#[derive(Resource, Clone, Debug)]
pub struct Grid {
    nodes: Vec<Node>,
    width: i32,
    height: i32,
    node_size: f32,
    offset: Vec3,
    start: GridCoord,
    target: GridCoord,
    selected: Option<GridCoord>,
    pathfinding: FlowFieldPathfinding,
    cache_policy: FeasibilityCachePolicy,
    revision: u64,
}

impl Grid {
    /// Allocate every node, then run the first field pass.
    ///
    /// Node `(i, j)` sits at `offset + (i + 0.5, 0, j + 0.5) * node_size`.
    pub fn new(
        width: i32,
        height: i32,
        offset: Vec3,
        node_size: f32,
        start: GridCoord,
        target: GridCoord,
    ) -> GridResult<Self> {
        let Some(node_count) = width
            .checked_mul(height)
            .filter(|_| width > 0 && height > 0)
        else {
            return Err(GridError::InvalidDimensions { width, height });
        };
        if !node_size.is_finite() || node_size <= 0.0 {
            return Err(GridError::InvalidNodeSize(node_size));
        }
        if !in_bounds(start, width, height) {
            return Err(GridError::StartOutOfBounds { coord: start, width, height });
        }
        if !in_bounds(target, width, height) {
            return Err(GridError::TargetOutOfBounds { coord: target, width, height });
        }

        let mut nodes = Vec::with_capacity(node_count as usize);
        for i in 0..width {
            for j in 0..height {
                let position = offset + Vec3::new(i as f32 + 0.5, 0.0, j as f32 + 0.5) * node_size;
                nodes.push(Node::new(IVec2::new(i, j), position));
            }
        }

        let mut grid = Self {
            nodes,
            width,
            height,
            node_size,
            offset,
            start,
            target,
            selected: None,
            pathfinding: FlowFieldPathfinding::new(width, height, target, start),
            cache_policy: FeasibilityCachePolicy::default(),
            revision: 0,
        };
        grid.update_pathfinding();

        info!(
            "Grid created: {}x{} nodes of size {}, start {} -> target {}",
            width, height, node_size, start, target
        );
        Ok(grid)
    }

    pub fn from_config(config: &GridConfig) -> GridResult<Self> {
        Ok(Self::new(
            config.width,
            config.height,
            config.offset,
            config.node_size,
            config.start,
            config.target,
        )?
        .with_cache_policy(config.cache_policy))
    }

    pub fn with_cache_policy(mut self, policy: FeasibilityCachePolicy) -> Self {
        self.cache_policy = policy;
        self
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn node_size(&self) -> f32 {
        self.node_size
    }

    pub fn offset(&self) -> Vec3 {
        self.offset
    }

    pub fn cache_policy(&self) -> FeasibilityCachePolicy {
        self.cache_policy
    }

    pub fn start_coordinate(&self) -> GridCoord {
        self.start
    }

    pub fn target_coordinate(&self) -> GridCoord {
        self.target
    }

    /// Number of completed field passes. Bumps on every recomputation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn start_node(&self) -> &Node {
        &self.nodes[index_of(self.start, self.height)]
    }

    pub fn target_node(&self) -> &Node {
        &self.nodes[index_of(self.target, self.height)]
    }

    /// `None` when out of bounds; callers treat that as "no neighbour".
    pub fn get_node(&self, coord: GridCoord) -> Option<&Node> {
        self.index(coord).map(|idx| &self.nodes[idx])
    }

    pub fn get_node_at(&self, i: i32, j: i32) -> Option<&Node> {
        self.get_node(IVec2::new(i, j))
    }

    /// World-space centre of a coordinate, whether or not it is in bounds.
    pub fn node_position(&self, coord: GridCoord) -> Vec3 {
        self.offset + Vec3::new(coord.x as f32 + 0.5, 0.0, coord.y as f32 + 0.5) * self.node_size
    }

    /// Every node, `i` outer and `j` inner.
    pub fn enumerate_all_nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.iter()
    }

    /// Recompute cost, next node and direction for every node from scratch.
    pub fn update_pathfinding(&mut self) {
        self.pathfinding.update_field(&mut self.nodes);
        self.revision += 1;
        profile_log!(self.revision, "Flow field revision {} ({} occupied)", self.revision, self.occupied_count());
    }

    /// Coordinates visited by following `next_node` from `from`, ending at the target.
    ///
    /// Empty when `from` is out of bounds or cannot reach the target.
    pub fn trace_path(&self, from: GridCoord) -> Vec<GridCoord> {
        let mut path = Vec::new();
        let Some(mut idx) = self.index(from) else {
            return path;
        };

        for _ in 0..=self.nodes.len() {
            let node = &self.nodes[idx];
            path.push(node.coord());
            if node.coord() == self.target {
                return path;
            }
            match node.next_node().and_then(|next| self.index(next)) {
                Some(next_idx) => idx = next_idx,
                None => break,
            }
        }

        path.clear();
        path
    }

    pub(crate) fn index(&self, coord: GridCoord) -> Option<usize> {
        in_bounds(coord, self.width, self.height).then(|| index_of(coord, self.height))
    }
}

// System sets for ordering occupancy changes within a tick
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum GridSet {
    Release,
    Placement,
}

/// Builds the [`Grid`] resource at startup and services occupancy messages
/// every fixed tick.
pub struct GridPlugin;

impl Plugin for GridPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<PlacementRequest>();
        app.add_message::<ReleaseRequest>();
        app.add_message::<PlacementOutcome>();
        app.add_message::<FlowFieldUpdated>();

        app.configure_sets(FixedUpdate, (GridSet::Release, GridSet::Placement).chain());

        app.add_systems(Startup, (load_grid_config, systems::spawn_grid).chain());
        app.add_systems(FixedUpdate, (
            systems::process_release_requests.in_set(GridSet::Release),
            systems::process_placement_requests.in_set(GridSet::Placement),
        ));
    }
}
