pub mod game;

// ============================================================================
// Profiling Macros
// ============================================================================

/// Log a message every 100 field revisions when the `perf_stats` feature is enabled.
///
/// When the feature is disabled this expands to nothing and the arguments
/// are not evaluated.
///
/// # Example
/// ```ignore
/// profile_log!(grid.revision(), "{} nodes occupied", grid.occupied_count());
/// ```
#[macro_export]
#[cfg(feature = "perf_stats")]
macro_rules! profile_log {
    ($revision:expr, $($arg:tt)*) => {
        if $revision % 100 == 0 {
            bevy::prelude::info!($($arg)*);
        }
    };
}

#[macro_export]
#[cfg(not(feature = "perf_stats"))]
macro_rules! profile_log {
    ($revision:expr, $($arg:tt)*) => {};
}
