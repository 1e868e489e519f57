use bevy::prelude::*;

use super::node::{GridCoord, OccupationFeasibility};
use super::Grid;
use crate::game::config::FeasibilityCachePolicy;
use crate::game::flow_field::occupancy_bitmap;

impl Grid {
    /// May `coord` be occupied without cutting the start off from the target?
    ///
    /// The first answer for a node is cached on the node and returned as-is
    /// until the cache is reset (see [`FeasibilityCachePolicy`]). Out-of-bounds
    /// coordinates, the start, the target and already occupied nodes are never
    /// occupiable. The live field is not modified.
    pub fn can_occupy(&mut self, coord: GridCoord) -> bool {
        let Some(idx) = self.index(coord) else {
            return false;
        };

        if self.nodes[idx].is_occupied {
            return false;
        }

        match self.nodes[idx].feasibility {
            OccupationFeasibility::CanOccupy => return true,
            OccupationFeasibility::CannotOccupy => return false,
            OccupationFeasibility::Unknown => {}
        }

        let feasible = if coord == self.start || coord == self.target {
            false
        } else {
            let mut occupancy = occupancy_bitmap(&self.nodes);
            occupancy.insert(idx);
            self.pathfinding.trial_reaches_target(&occupancy)
        };

        self.nodes[idx].feasibility = if feasible {
            OccupationFeasibility::CanOccupy
        } else {
            OccupationFeasibility::CannotOccupy
        };
        debug!("Feasibility of {}: {:?}", coord, self.nodes[idx].feasibility);

        feasible
    }

    /// Commit occupancy and recompute the field.
    ///
    /// `occupy = true` marks the node occupied without consulting
    /// [`can_occupy`](Self::can_occupy); gate it first. `occupy = false` only
    /// recomputes, it does not free the node (use [`release_node`](Self::release_node)).
    /// Returns `false`, doing nothing, when `coord` is out of bounds.
    pub fn try_occupy_node(&mut self, coord: GridCoord, occupy: bool) -> bool {
        let Some(idx) = self.index(coord) else {
            return false;
        };

        if occupy && !self.nodes[idx].is_occupied {
            self.nodes[idx].is_occupied = true;
            self.on_occupancy_committed();
            debug!("Occupied {}", coord);
        }

        self.update_pathfinding();
        true
    }

    /// Free an occupied node and recompute the field.
    ///
    /// Returns `false` when `coord` is out of bounds or not occupied.
    pub fn release_node(&mut self, coord: GridCoord) -> bool {
        let Some(idx) = self.index(coord) else {
            return false;
        };
        if !self.nodes[idx].is_occupied {
            return false;
        }

        self.nodes[idx].is_occupied = false;
        self.on_occupancy_committed();
        self.update_pathfinding();
        debug!("Released {}", coord);
        true
    }

    /// Reset every cached verdict to `Unknown`.
    pub fn invalidate_feasibility(&mut self) {
        for node in &mut self.nodes {
            node.feasibility = OccupationFeasibility::Unknown;
        }
    }

    pub fn occupied_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_occupied).count()
    }

    fn on_occupancy_committed(&mut self) {
        match self.cache_policy {
            FeasibilityCachePolicy::InvalidateOnCommit => self.invalidate_feasibility(),
            FeasibilityCachePolicy::Sticky => {}
        }
    }
}
