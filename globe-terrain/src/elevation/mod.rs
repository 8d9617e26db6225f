//! Tiled elevation models
//!
//! An [`ElevationModel`] combines a [`LevelSet`](crate::level::LevelSet), a
//! tile cache and a provider into a non-blocking elevation source.
//!
//! # Sampling conventions
//!
//! | `pixel_is_point` | grid queries use                                   |
//! |------------------|----------------------------------------------------|
//! | `true`           | nearest sample of the chosen level or an ancestor  |
//! | `false`          | bilinear over a level-wide pixel grid, falling back to coarser levels |
//!
//! # Configuration
//!
//! ```ignore
//! use globe_terrain::elevation::ElevationModelConfig;
//!
//! let config = ElevationModelConfig::from_ini_file("globe-terrain.ini")?;
//! let earth = ElevationModelConfig::earth().with_max_concurrent_retrievals(4);
//! ```

mod config;
mod model;
mod sampling;

pub use config::{
    default_data_dir, ElevationModelConfig, DEFAULT_DISPLAY_NAME, EARTH_LEVEL_ZERO_DELTA,
    EARTH_MAX_ELEVATION, EARTH_MIN_ELEVATION, EARTH_NUM_LEVELS, EARTH_TILE_SIZE,
    ELEVATION_SECTION,
};
pub use model::ElevationModel;
