use bevy::prelude::*;
use std::path::PathBuf;

pub mod config;
pub mod error;
pub mod flow_field;
pub mod grid;

use config::{GridConfigPlugin, DEFAULT_GRID_CONFIG_PATH};
use grid::GridPlugin;

/// Everything needed to run a level grid inside an `App`.
///
/// Reads the grid description from `config_path` unless a
/// [`GridConfig`](config::GridConfig) resource is inserted first.
pub struct FlowGridPlugin {
    pub config_path: PathBuf,
}

impl Default for FlowGridPlugin {
    fn default() -> Self {
        Self { config_path: PathBuf::from(DEFAULT_GRID_CONFIG_PATH) }
    }
}

impl Plugin for FlowGridPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            GridConfigPlugin { path: self.config_path.clone() },
            GridPlugin,
        ));
    }
}
