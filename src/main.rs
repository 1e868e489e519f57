use bevy::prelude::*;

use flowgrid::game::grid::{Grid, GridSet, PlacementOutcome, PlacementRequest};
use flowgrid::game::FlowGridPlugin;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Fixed ticks the demo runs before exiting.
const DEMO_TICKS: u32 = 120;

const LOG_DIR: &str = "logs";
const LOG_PREFIX: &str = "flowgrid_";
const KEPT_RUNS: usize = 25;

/// Route tracing to stdout and to a per-run file under [`LOG_DIR`].
///
/// `RUST_LOG` overrides the default filter. Returns the log file path.
fn init_logging() -> PathBuf {
    let dir = Path::new(LOG_DIR);
    if let Err(e) = fs::create_dir_all(dir) {
        eprintln!("Cannot create {}: {}", dir.display(), e);
    }
    prune_old_runs(dir, KEPT_RUNS - 1);

    let file_name = format!("{LOG_PREFIX}{}.log", chrono::Local::now().format("%Y%m%d_%H%M%S"));
    let appender = RollingFileAppender::new(Rotation::NEVER, dir, &file_name);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("bevy_ecs=warn,flowgrid=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(appender).with_ansi(false))
        .with(fmt::layer().with_writer(std::io::stdout).with_target(false))
        .init();

    dir.join(file_name)
}

/// Delete all but the newest `keep` run logs. Timestamped names sort
/// chronologically, so no metadata lookup is needed.
fn prune_old_runs(dir: &Path, keep: usize) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    let mut runs: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension().is_some_and(|ext| ext == "log")
                && path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.starts_with(LOG_PREFIX))
        })
        .collect();
    runs.sort();

    let stale = runs.len().saturating_sub(keep);
    for path in runs.drain(..stale) {
        if let Err(e) = fs::remove_file(&path) {
            eprintln!("Cannot remove old log {}: {}", path.display(), e);
        }
    }
}

#[derive(Resource)]
struct DemoState {
    rng: StdRng,
    ticks: u32,
    accepted: usize,
    rejected: usize,
}

impl Default for DemoState {
    fn default() -> Self {
        Self {
            rng: StdRng::seed_from_u64(7),
            ticks: 0,
            accepted: 0,
            rejected: 0,
        }
    }
}

/// Propose one random tower per tick, like a player clicking around the map.
fn propose_random_tower(
    mut state: ResMut<DemoState>,
    grid: Res<Grid>,
    mut requests: MessageWriter<PlacementRequest>,
) {
    let x = state.rng.random_range(0..grid.width());
    let y = state.rng.random_range(0..grid.height());
    requests.write(PlacementRequest { coord: IVec2::new(x, y) });
}

fn tally_outcomes(
    mut state: ResMut<DemoState>,
    grid: Res<Grid>,
    mut outcomes: MessageReader<PlacementOutcome>,
    mut exit: MessageWriter<AppExit>,
) {
    for outcome in outcomes.read() {
        if outcome.accepted {
            state.accepted += 1;
        } else {
            state.rejected += 1;
        }
    }

    state.ticks += 1;
    if state.ticks < DEMO_TICKS {
        return;
    }

    let path = grid.trace_path(grid.start_coordinate());
    info!(
        "Demo finished: {} towers placed, {} rejected, start->target path {} steps (cost {})",
        state.accepted,
        state.rejected,
        path.len().saturating_sub(1),
        grid.start_node().best_cost()
    );
    exit.write(AppExit::Success);
}

fn main() {
    let log_file = init_logging();

    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║  Flowgrid demo - Logging to file                         ║");
    println!("╠══════════════════════════════════════════════════════════╣");
    println!("║  Log file: {:<45} ║", log_file.display());
    println!("╚══════════════════════════════════════════════════════════╝");

    App::new()
        .add_plugins(MinimalPlugins)
        .add_plugins(FlowGridPlugin::default())
        .init_resource::<DemoState>()
        .add_systems(FixedUpdate, (
            propose_random_tower.before(GridSet::Release),
            tally_outcomes.after(GridSet::Placement),
        ))
        .run();
}
