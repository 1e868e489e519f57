use super::node::{GridCoord, Node};
use super::Grid;

// At most one node is selected. Selection never affects pathfinding.
impl Grid {
    /// Select the node at `coord`; an out-of-bounds coordinate clears the selection.
    pub fn select_coordinate(&mut self, coord: GridCoord) {
        self.selected = self.index(coord).map(|_| coord);
    }

    pub fn unselect_node(&mut self) {
        self.selected = None;
    }

    pub fn has_selected_node(&self) -> bool {
        self.selected.is_some()
    }

    pub fn get_selected_node(&self) -> Option<&Node> {
        self.selected.and_then(|coord| self.get_node(coord))
    }
}
