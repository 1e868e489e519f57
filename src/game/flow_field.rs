use bevy::prelude::*;
use fixedbitset::FixedBitSet;
use flowgrid_macros::profile;
use std::collections::VecDeque;

use crate::game::grid::node::{in_bounds, index_of, GridCoord, Node, NEIGHBOR_OFFSETS, UNREACHABLE};

/// Breadth-first flow field toward a single target.
///
/// Every pass starts from scratch: all costs go to [`UNREACHABLE`], the target
/// is seeded at zero, and a FIFO wavefront spreads outward over 4-connected,
/// unoccupied neighbours with unit edge cost. A neighbour that improves gets
/// `next_node` pointing back at the cell that relaxed it, so following
/// `next_node` from any reachable cell walks a shortest path to the target.
///
/// # Determinism
///
/// Neighbours are always visited left, right, down, up (see
/// [`NEIGHBOR_OFFSETS`]) and the frontier is FIFO, so identical occupancy
/// always produces an identical field.
///
/// # Performance
///
/// - **Pass:** O(width × height)
/// - **Feasibility trial:** one pass in scratch buffers plus a walk bounded by
///   the node count; the live field is never touched
#[derive(Clone, Debug)]
pub struct FlowFieldPathfinding {
    width: i32,
    height: i32,
    target: GridCoord,
    start: GridCoord,
}

/// Costs and next pointers produced by one wavefront, indexed like the node arena.
struct Wavefront {
    costs: Vec<u32>,
    next: Vec<Option<GridCoord>>,
}

impl FlowFieldPathfinding {
    pub fn new(width: i32, height: i32, target: GridCoord, start: GridCoord) -> Self {
        Self { width, height, target, start }
    }

    pub fn target(&self) -> GridCoord {
        self.target
    }

    pub fn start(&self) -> GridCoord {
        self.start
    }

    /// Recompute `best_cost`, `next_node` and `direction` for every node.
    ///
    /// `nodes` must be the column-major arena of a `width × height` grid.
    #[profile(4)]
    pub fn update_field(&self, nodes: &mut [Node]) {
        let occupancy = occupancy_bitmap(nodes);
        let wave = self.propagate(&occupancy);

        for (idx, node) in nodes.iter_mut().enumerate() {
            node.best_cost = wave.costs[idx];
            node.next_node = wave.next[idx];
            node.direction = match node.next_node {
                Some(next) => {
                    let step = next - node.coord();
                    Vec3::new(step.x as f32, 0.0, step.y as f32)
                }
                None => Vec3::ZERO,
            };
        }

        trace!(
            "Flow field updated: start cost {}",
            wave.costs[index_of(self.start, self.height)]
        );
    }

    /// Would the start still reach the target under `occupancy`?
    ///
    /// Runs the same wavefront as [`update_field`](Self::update_field) in
    /// scratch buffers, then walks the would-be `next_node` chain from the
    /// start. The walk fails on an occupied node, on a missing next pointer, or
    /// if it takes more steps than there are nodes.
    pub fn trial_reaches_target(&self, occupancy: &FixedBitSet) -> bool {
        let wave = self.propagate(occupancy);
        let max_steps = wave.costs.len();

        let mut current = self.start;
        for _ in 0..=max_steps {
            if current == self.target {
                return true;
            }
            let idx = index_of(current, self.height);
            if occupancy.contains(idx) {
                return false;
            }
            match wave.next[idx] {
                Some(next) => current = next,
                None => return false,
            }
        }

        warn!("Feasibility walk exceeded {} steps without reaching target", max_steps);
        false
    }

    fn propagate(&self, occupancy: &FixedBitSet) -> Wavefront {
        let size = self.width as usize * self.height as usize;
        let mut costs = vec![UNREACHABLE; size];
        let mut next = vec![None; size];

        let target_idx = index_of(self.target, self.height);
        costs[target_idx] = 0;

        let mut queue = VecDeque::with_capacity(size);
        queue.push_back(self.target);

        while let Some(current) = queue.pop_front() {
            let current_cost = costs[index_of(current, self.height)];

            for offset in NEIGHBOR_OFFSETS {
                let neighbor = current + offset;
                if !in_bounds(neighbor, self.width, self.height) {
                    continue;
                }

                let n_idx = index_of(neighbor, self.height);
                if occupancy.contains(n_idx) {
                    continue; // Obstacle
                }

                let new_cost = current_cost + 1;
                if new_cost < costs[n_idx] {
                    costs[n_idx] = new_cost;
                    next[n_idx] = Some(current);
                    queue.push_back(neighbor);
                }
            }
        }

        Wavefront { costs, next }
    }
}

/// One bit per node, set when the node is occupied.
pub(crate) fn occupancy_bitmap(nodes: &[Node]) -> FixedBitSet {
    let mut bits = FixedBitSet::with_capacity(nodes.len());
    for (idx, node) in nodes.iter().enumerate() {
        if node.is_occupied() {
            bits.insert(idx);
        }
    }
    bits
}
