//! Global tuning constants shared across the simulation.

/// World grid dimensions in cells.
pub const GRID_WIDTH: usize = 128;
pub const GRID_HEIGHT: usize = 128;

/// Fixed simulation step, in milliseconds of simulated time.
pub const TICK_MS: f32 = 100.0;

/// Traffic lights hold each phase for this long.
pub const LIGHT_CYCLE_MS: f32 = 30_000.0;

/// Cached paths are trusted for this long before recomputation.
pub const PATH_CACHE_TTL_MS: f64 = 30_000.0;
