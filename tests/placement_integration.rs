use bevy::ecs::message::Messages;
use bevy::prelude::*;
use flowgrid::game::config::{FeasibilityCachePolicy, GridConfig};
use flowgrid::game::grid::{FlowFieldUpdated, Grid, PlacementOutcome, PlacementRequest, ReleaseRequest};
use flowgrid::game::FlowGridPlugin;
use std::path::PathBuf;

/// Build an app around a caller-provided config and run Startup
fn setup_app(config: GridConfig) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.insert_resource(config);
    app.add_plugins(FlowGridPlugin {
        config_path: PathBuf::from("does/not/matter.ron"),
    });

    // Initialize (runs Startup systems)
    app.update();
    app
}

fn corridor_config() -> GridConfig {
    GridConfig {
        width: 3,
        height: 2,
        offset: Vec3::ZERO,
        node_size: 1.0,
        start: IVec2::new(0, 0),
        target: IVec2::new(2, 0),
        cache_policy: FeasibilityCachePolicy::InvalidateOnCommit,
    }
}

fn run_tick(app: &mut App) {
    app.world_mut().run_schedule(FixedUpdate);
}

fn drain_outcomes(app: &mut App) -> Vec<PlacementOutcome> {
    app.world_mut().resource_mut::<Messages<PlacementOutcome>>().drain().collect()
}

fn drain_updates(app: &mut App) -> Vec<FlowFieldUpdated> {
    app.world_mut().resource_mut::<Messages<FlowFieldUpdated>>().drain().collect()
}

#[test]
fn test_startup_builds_grid_from_config() {
    let app = setup_app(corridor_config());

    let grid = app.world().resource::<Grid>();
    assert_eq!(grid.width(), 3);
    assert_eq!(grid.height(), 2);
    assert_eq!(grid.start_node().best_cost(), 2);
}

#[test]
fn test_placements_are_gated_in_order() {
    let mut app = setup_app(corridor_config());

    // Second request would close the last lane once the first one lands
    app.world_mut().write_message(PlacementRequest { coord: IVec2::new(1, 1) });
    app.world_mut().write_message(PlacementRequest { coord: IVec2::new(1, 0) });
    run_tick(&mut app);

    assert_eq!(
        drain_outcomes(&mut app),
        vec![
            PlacementOutcome { coord: IVec2::new(1, 1), accepted: true },
            PlacementOutcome { coord: IVec2::new(1, 0), accepted: false },
        ]
    );

    let grid = app.world().resource::<Grid>();
    assert!(grid.get_node_at(1, 1).unwrap().is_occupied());
    assert!(!grid.get_node_at(1, 0).unwrap().is_occupied());
    assert_eq!(grid.trace_path(IVec2::new(0, 0)).len(), 3);
    let revision = grid.revision();

    let updates = drain_updates(&mut app);
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].revision, revision);
}

#[test]
fn test_sticky_policy_rejects_second_tower_on_same_tile() {
    let mut app = setup_app(GridConfig {
        cache_policy: FeasibilityCachePolicy::Sticky,
        ..corridor_config()
    });

    app.world_mut().write_message(PlacementRequest { coord: IVec2::new(1, 1) });
    run_tick(&mut app);
    app.world_mut().write_message(PlacementRequest { coord: IVec2::new(1, 1) });
    run_tick(&mut app);

    assert_eq!(
        drain_outcomes(&mut app),
        vec![
            PlacementOutcome { coord: IVec2::new(1, 1), accepted: true },
            PlacementOutcome { coord: IVec2::new(1, 1), accepted: false },
        ]
    );
    assert_eq!(drain_updates(&mut app).len(), 1);
    assert_eq!(app.world().resource::<Grid>().occupied_count(), 1);
}

#[test]
fn test_release_frees_tile_before_placements() {
    let mut app = setup_app(corridor_config());

    app.world_mut().write_message(PlacementRequest { coord: IVec2::new(1, 1) });
    run_tick(&mut app);
    drain_outcomes(&mut app);

    // Same tick: release the upper lane, then block the lower one
    app.world_mut().write_message(ReleaseRequest { coord: IVec2::new(1, 1) });
    app.world_mut().write_message(PlacementRequest { coord: IVec2::new(1, 0) });
    run_tick(&mut app);

    assert_eq!(
        drain_outcomes(&mut app),
        vec![PlacementOutcome { coord: IVec2::new(1, 0), accepted: true }]
    );
    let grid = app.world().resource::<Grid>();
    assert_eq!(grid.occupied_count(), 1);
    assert_eq!(grid.start_node().best_cost(), 4);
}

#[test]
fn test_out_of_bounds_request_is_rejected() {
    let mut app = setup_app(corridor_config());
    let revision = app.world().resource::<Grid>().revision();

    app.world_mut().write_message(PlacementRequest { coord: IVec2::new(10, 0) });
    app.world_mut().write_message(ReleaseRequest { coord: IVec2::new(-1, 0) });
    run_tick(&mut app);

    assert_eq!(
        drain_outcomes(&mut app),
        vec![PlacementOutcome { coord: IVec2::new(10, 0), accepted: false }]
    );
    assert!(drain_updates(&mut app).is_empty());
    assert_eq!(app.world().resource::<Grid>().revision(), revision);
}

#[test]
fn test_random_requests_keep_target_reachable() {
    let config = GridConfig {
        width: 12,
        height: 9,
        start: IVec2::new(0, 4),
        target: IVec2::new(11, 4),
        ..Default::default()
    };
    let mut app = setup_app(config);
    let mut rng = fastrand::Rng::with_seed(1234);

    for _ in 0..60 {
        for _ in 0..3 {
            let coord = IVec2::new(rng.i32(0..12), rng.i32(0..9));
            app.world_mut().write_message(PlacementRequest { coord });
        }
        run_tick(&mut app);

        let grid = app.world().resource::<Grid>();
        let path = grid.trace_path(grid.start_coordinate());
        assert_eq!(path.last(), Some(&grid.target_coordinate()));
    }

    let accepted = drain_outcomes(&mut app).iter().filter(|o| o.accepted).count();
    assert_eq!(app.world().resource::<Grid>().occupied_count(), accepted);
}

#[test]
fn test_config_file_is_loaded_when_no_resource_given() {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(FlowGridPlugin {
        config_path: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/grid_config.ron"),
    });
    app.update();

    let grid = app.world().resource::<Grid>();
    assert_eq!(grid.width(), 16);
    assert_eq!(grid.target_coordinate(), IVec2::new(15, 15));
}

#[test]
fn test_missing_config_file_falls_back_to_default() {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(FlowGridPlugin {
        config_path: PathBuf::from("no/such/grid_config.ron"),
    });
    app.update();

    assert_eq!(*app.world().resource::<GridConfig>(), GridConfig::default());
    assert!(app.world().get_resource::<Grid>().is_some());
}

#[test]
#[should_panic]
fn test_invalid_config_fails_startup() {
    setup_app(GridConfig {
        width: 4,
        height: 4,
        target: IVec2::new(9, 9),
        ..Default::default()
    });
}
