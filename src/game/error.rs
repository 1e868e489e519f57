use bevy::prelude::*;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building a [`Grid`](crate::game::grid::Grid) or loading its config.
///
/// Lookups and placement checks never produce these: an absent node is `None`
/// and an infeasible placement is `false`. Everything here is a configuration
/// mistake that should stop the caller before a grid exists.
#[derive(Error, Debug)]
pub enum GridError {
    #[error("Grid dimensions must be positive and addressable, got {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },

    #[error("Node size must be a positive finite number, got {0}")]
    InvalidNodeSize(f32),

    #[error("Start coordinate {coord} lies outside the {width}x{height} grid")]
    StartOutOfBounds { coord: IVec2, width: i32, height: i32 },

    #[error("Target coordinate {coord} lies outside the {width}x{height} grid")]
    TargetOutOfBounds { coord: IVec2, width: i32, height: i32 },

    #[error("Failed to read grid config at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse grid config: {0}")]
    ConfigParse(#[from] ron::error::SpannedError),
}

pub type GridResult<T> = Result<T, GridError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_error_display() {
        let err = GridError::InvalidDimensions { width: 0, height: 3 };
        assert_eq!(err.to_string(), "Grid dimensions must be positive and addressable, got 0x3");

        let err = GridError::TargetOutOfBounds {
            coord: IVec2::new(5, 1),
            width: 3,
            height: 1,
        };
        assert!(err.to_string().contains("outside the 3x1 grid"));
    }
}
