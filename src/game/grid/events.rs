//! Messages exchanged between the grid and the rest of the game.
//!
//! Collaborators write requests; the grid systems answer with outcomes and
//! announce every new field revision.

use bevy::prelude::*;
use super::node::GridCoord;

/// Ask to place an obstacle on a tile. Gated by the feasibility check.
#[derive(Event, Message, Debug, Clone)]
pub struct PlacementRequest {
    pub coord: GridCoord,
}

/// Ask to remove the obstacle on a tile.
#[derive(Event, Message, Debug, Clone)]
pub struct ReleaseRequest {
    pub coord: GridCoord,
}

/// Answer to a [`PlacementRequest`]
#[derive(Event, Message, Debug, Clone, PartialEq, Eq)]
pub struct PlacementOutcome {
    pub coord: GridCoord,
    pub accepted: bool,
}

/// The flow field was recomputed after an occupancy commit.
#[derive(Event, Message, Debug, Clone, PartialEq, Eq)]
pub struct FlowFieldUpdated {
    pub revision: u64,
}
