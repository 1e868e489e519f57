use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::game::error::{GridError, GridResult};

/// Default location of the grid description, relative to the working directory.
pub const DEFAULT_GRID_CONFIG_PATH: &str = "assets/grid_config.ron";

/// When cached placement verdicts are thrown away.
///
/// A verdict describes the grid as it was when it was computed. `Sticky` keeps
/// it forever, so a tile judged placeable can later be placed even after other
/// towers turned it into the last connector. `InvalidateOnCommit` resets every
/// verdict whenever occupancy actually changes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeasibilityCachePolicy {
    #[default]
    InvalidateOnCommit,
    Sticky,
}

/// Shape of the level grid. Loaded once at startup; the grid is never resized.
#[derive(Resource, Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct GridConfig {
    pub width: i32,
    pub height: i32,
    /// World position of the grid's (0, 0) corner
    pub offset: Vec3,
    pub node_size: f32,
    pub start: IVec2,
    pub target: IVec2,
    pub cache_policy: FeasibilityCachePolicy,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 16,
            height: 16,
            offset: Vec3::ZERO,
            node_size: 1.0,
            start: IVec2::new(0, 0),
            target: IVec2::new(15, 15),
            cache_policy: FeasibilityCachePolicy::InvalidateOnCommit,
        }
    }
}

impl GridConfig {
    pub fn from_ron_str(contents: &str) -> GridResult<Self> {
        Ok(ron::from_str::<GridConfig>(contents)?)
    }

    pub fn load(path: impl AsRef<Path>) -> GridResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| GridError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&contents)
    }
}

/// Where [`load_grid_config`] looks for the RON file.
#[derive(Resource, Clone, Debug)]
pub struct GridConfigPath(pub PathBuf);

pub struct GridConfigPlugin {
    pub path: PathBuf,
}

impl Default for GridConfigPlugin {
    fn default() -> Self {
        Self { path: PathBuf::from(DEFAULT_GRID_CONFIG_PATH) }
    }
}

impl Plugin for GridConfigPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(GridConfigPath(self.path.clone()));
    }
}

/// Load the grid config synchronously at startup.
///
/// A `GridConfig` inserted by the caller before startup wins over the file.
/// A missing or malformed file falls back to the default config.
pub fn load_grid_config(
    mut commands: Commands,
    path: Res<GridConfigPath>,
    existing: Option<Res<GridConfig>>,
) {
    if existing.is_some() {
        debug!("GridConfig already present, skipping {}", path.0.display());
        return;
    }

    match GridConfig::load(&path.0) {
        Ok(config) => {
            info!("Loaded grid config from {}", path.0.display());
            commands.insert_resource(config);
        }
        Err(e) => {
            error!("{}", e);
            error!("Using default GridConfig");
            commands.insert_resource(GridConfig::default());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = GridConfig::from_ron_str(
            "(
                width: 5,
                height: 3,
                offset: (10.0, 0.0, -2.0),
                node_size: 2.0,
                start: (0, 1),
                target: (4, 2),
                cache_policy: Sticky,
            )",
        )
        .unwrap();

        assert_eq!(config.width, 5);
        assert_eq!(config.height, 3);
        assert_eq!(config.offset, Vec3::new(10.0, 0.0, -2.0));
        assert_eq!(config.node_size, 2.0);
        assert_eq!(config.start, IVec2::new(0, 1));
        assert_eq!(config.target, IVec2::new(4, 2));
        assert_eq!(config.cache_policy, FeasibilityCachePolicy::Sticky);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = GridConfig::from_ron_str("(width: 8)").unwrap();
        assert_eq!(config.width, 8);
        assert_eq!(config.height, GridConfig::default().height);
        assert_eq!(config.cache_policy, FeasibilityCachePolicy::InvalidateOnCommit);
    }

    #[test]
    fn test_malformed_config_is_parse_error() {
        let err = GridConfig::from_ron_str("(width: \"wide\")").unwrap_err();
        assert!(matches!(err, GridError::ConfigParse(_)));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = GridConfig::load("does/not/exist.ron").unwrap_err();
        assert!(matches!(err, GridError::ConfigRead { .. }));
    }
}
