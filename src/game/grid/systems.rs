use bevy::prelude::*;
use flowgrid_macros::profile;

use super::events::{FlowFieldUpdated, PlacementOutcome, PlacementRequest, ReleaseRequest};
use super::Grid;
use crate::game::config::GridConfig;

/// Build the [`Grid`] resource from the loaded config.
///
/// An invalid config is a setup mistake: the error is returned so the app
/// stops instead of running without a grid.
pub fn spawn_grid(mut commands: Commands, config: Res<GridConfig>) -> Result {
    let grid = Grid::from_config(&config)?;
    commands.insert_resource(grid);
    Ok(())
}

/// Gate every placement request through the feasibility check and commit the
/// accepted ones.
#[profile]
pub fn process_placement_requests(
    mut grid: ResMut<Grid>,
    mut requests: MessageReader<PlacementRequest>,
    mut outcomes: MessageWriter<PlacementOutcome>,
    mut updates: MessageWriter<FlowFieldUpdated>,
) {
    for request in requests.read() {
        let accepted = grid.can_occupy(request.coord);
        if accepted {
            grid.try_occupy_node(request.coord, true);
            updates.write(FlowFieldUpdated { revision: grid.revision() });
        } else {
            debug!("Rejected placement at {}", request.coord);
        }

        outcomes.write(PlacementOutcome { coord: request.coord, accepted });
    }
}

pub fn process_release_requests(
    mut grid: ResMut<Grid>,
    mut requests: MessageReader<ReleaseRequest>,
    mut updates: MessageWriter<FlowFieldUpdated>,
) {
    for request in requests.read() {
        if grid.release_node(request.coord) {
            updates.write(FlowFieldUpdated { revision: grid.revision() });
        }
    }
}
