use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Integer grid coordinate. Signed so out-of-bounds probes stay representable.
pub type GridCoord = IVec2;

/// Cost of a node the wavefront never reached.
pub const UNREACHABLE: u32 = u32::MAX;

/// Memoized answer to "may this node be occupied?".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OccupationFeasibility {
    #[default]
    Unknown,
    CanOccupy,
    CannotOccupy,
}

/// A single grid cell.
///
/// `best_cost`, `next_node` and `direction` are written only by a field pass;
/// `is_occupied` and the cached verdict are written only by the owning grid.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    coord: GridCoord,
    position: Vec3,
    pub(crate) is_occupied: bool,
    pub(crate) feasibility: OccupationFeasibility,
    pub(crate) best_cost: u32,
    pub(crate) next_node: Option<GridCoord>,
    pub(crate) direction: Vec3,
}

impl Node {
    pub(crate) fn new(coord: GridCoord, position: Vec3) -> Self {
        Self {
            coord,
            position,
            is_occupied: false,
            feasibility: OccupationFeasibility::Unknown,
            best_cost: UNREACHABLE,
            next_node: None,
            direction: Vec3::ZERO,
        }
    }

    pub fn coord(&self) -> GridCoord {
        self.coord
    }

    /// World-space centre of the cell.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn is_occupied(&self) -> bool {
        self.is_occupied
    }

    pub fn feasibility(&self) -> OccupationFeasibility {
        self.feasibility
    }

    /// Edge count to the target, or [`UNREACHABLE`].
    pub fn best_cost(&self) -> u32 {
        self.best_cost
    }

    pub fn is_reachable(&self) -> bool {
        self.best_cost != UNREACHABLE
    }

    /// Neighbour to step to next. `None` on the target and on unreachable nodes.
    pub fn next_node(&self) -> Option<GridCoord> {
        self.next_node
    }

    /// Unit vector (XZ plane) toward `next_node`, zero when there is none.
    pub fn direction(&self) -> Vec3 {
        self.direction
    }
}

/// The four neighbour offsets in the order the wavefront visits them.
pub const NEIGHBOR_OFFSETS: [IVec2; 4] = [
    IVec2::new(-1, 0), // Left
    IVec2::new(1, 0),  // Right
    IVec2::new(0, -1), // Down
    IVec2::new(0, 1),  // Up
];

/// Column-major index (`i` outer) of an in-bounds coordinate.
#[inline]
pub(crate) fn index_of(coord: GridCoord, height: i32) -> usize {
    (coord.x * height + coord.y) as usize
}

#[inline]
pub(crate) fn in_bounds(coord: GridCoord, width: i32, height: i32) -> bool {
    coord.x >= 0 && coord.x < width && coord.y >= 0 && coord.y < height
}
