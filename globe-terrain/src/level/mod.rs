//! Multi-resolution level hierarchy
//!
//! A [`LevelSet`] divides a coverage sector into a quad-tree of tiles. Level 0
//! uses the configured level-zero tile delta; every following level halves the
//! delta on both axes, so each tile has four children.
//!
//! Tile rows and columns are counted from the coverage sector's south-west
//! corner:
//!
//! ```text
//!   row 1 │ (1,0) │ (1,1) │ ...
//!   row 0 │ (0,0) │ (0,1) │ ...
//!         └───────┴───────┴──── min latitude
//!         min longitude
//! ```

mod key;

pub use key::TileKey;

use std::ops::RangeInclusive;

use crate::coord::{Location, Sector};
use crate::error::ConfigError;

/// One resolution step of the pyramid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Level {
    /// Zero-based level number; 0 is the coarsest.
    pub level_number: usize,
    /// Angular size of one tile in degrees.
    pub tile_delta: Location,
    /// Tile width in pixels.
    pub tile_width: u32,
    /// Tile height in pixels.
    pub tile_height: u32,
    /// Degrees of latitude covered by one pixel.
    pub texel_size: f64,
}

impl Level {
    pub fn is_first(&self) -> bool {
        self.level_number == 0
    }
}

/// The full set of levels over one coverage sector.
#[derive(Debug, Clone)]
pub struct LevelSet {
    coverage: Sector,
    levels: Vec<Level>,
}

impl LevelSet {
    /// Creates a level hierarchy.
    ///
    /// # Arguments
    ///
    /// * `coverage` - Sector the hierarchy covers
    /// * `level_zero_delta` - Tile size at level 0, in degrees latitude/longitude
    /// * `num_levels` - Number of levels, at least 1
    /// * `tile_width` - Tile width in pixels, at least 1
    /// * `tile_height` - Tile height in pixels, at least 1
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if any delta is not a positive finite number or
    /// any count is zero.
    pub fn new(
        coverage: Sector,
        level_zero_delta: Location,
        num_levels: usize,
        tile_width: u32,
        tile_height: u32,
    ) -> Result<Self, ConfigError> {
        check_positive("level_zero_delta.latitude", level_zero_delta.latitude)?;
        check_positive("level_zero_delta.longitude", level_zero_delta.longitude)?;
        check_positive("num_levels", num_levels as f64)?;
        check_positive("tile_width", tile_width as f64)?;
        check_positive("tile_height", tile_height as f64)?;

        let levels = (0..num_levels)
            .map(|n| {
                let divisor = 2f64.powi(n as i32);
                let tile_delta = Location::new(
                    level_zero_delta.latitude / divisor,
                    level_zero_delta.longitude / divisor,
                );
                Level {
                    level_number: n,
                    tile_delta,
                    tile_width,
                    tile_height,
                    texel_size: tile_delta.latitude / tile_height as f64,
                }
            })
            .collect();

        Ok(Self { coverage, levels })
    }

    pub fn coverage(&self) -> &Sector {
        &self.coverage
    }

    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// Returns the level with the given number, if it exists.
    pub fn level(&self, level_number: usize) -> Option<&Level> {
        self.levels.get(level_number)
    }

    pub fn first_level(&self) -> &Level {
        &self.levels[0]
    }

    pub fn last_level(&self) -> &Level {
        &self.levels[self.levels.len() - 1]
    }

    /// Selects the coarsest level whose texel size satisfies a resolution.
    ///
    /// Coarser levels need fewer tiles, so the first level (from level 0
    /// upward) with `texel_size <= target_resolution` wins. When no level is
    /// fine enough the last level is returned.
    ///
    /// # Arguments
    ///
    /// * `target_resolution` - Desired texel size in degrees
    pub fn level_for_texel_size(&self, target_resolution: f64) -> &Level {
        self.levels
            .iter()
            .find(|level| level.texel_size <= target_resolution)
            .unwrap_or_else(|| self.last_level())
    }

    /// Index of the last tile row at a level.
    pub fn last_row(&self, level: &Level) -> u32 {
        last_index(self.coverage.delta_latitude(), level.tile_delta.latitude)
    }

    /// Index of the last tile column at a level.
    pub fn last_column(&self, level: &Level) -> u32 {
        last_index(self.coverage.delta_longitude(), level.tile_delta.longitude)
    }

    /// Number of tiles needed to cover the whole coverage sector at a level.
    pub fn tile_count(&self, level: &Level) -> u64 {
        (self.last_row(level) as u64 + 1) * (self.last_column(level) as u64 + 1)
    }

    /// Row containing a latitude, clamped to the level's rows.
    pub fn compute_row(&self, level: &Level, latitude: f64) -> u32 {
        let offset = (latitude - self.coverage.min_latitude()) / level.tile_delta.latitude;
        clamp_index(offset.floor(), self.last_row(level))
    }

    /// Column containing a longitude, clamped to the level's columns.
    pub fn compute_column(&self, level: &Level, longitude: f64) -> u32 {
        let offset = (longitude - self.coverage.min_longitude()) / level.tile_delta.longitude;
        clamp_index(offset.floor(), self.last_column(level))
    }

    /// Key of the tile containing a location.
    ///
    /// Locations on the coverage sector's northern or eastern edge map into
    /// the last row or column.
    pub fn tile_key_for_location(&self, level: &Level, latitude: f64, longitude: f64) -> TileKey {
        TileKey::new(
            level.level_number,
            self.compute_row(level, latitude),
            self.compute_column(level, longitude),
        )
    }

    /// Row and column ranges of the tiles overlapping a sector.
    ///
    /// Tiles that merely touch the sector's northern or eastern edge are
    /// excluded. Returns `None` if the sector lies outside the coverage.
    pub fn tile_range(
        &self,
        level: &Level,
        sector: &Sector,
    ) -> Option<(RangeInclusive<u32>, RangeInclusive<u32>)> {
        let area = sector.intersection(&self.coverage)?;

        let first_row = self.compute_row(level, area.min_latitude());
        let first_col = self.compute_column(level, area.min_longitude());

        let row_end = (area.max_latitude() - self.coverage.min_latitude()) / level.tile_delta.latitude;
        let col_end =
            (area.max_longitude() - self.coverage.min_longitude()) / level.tile_delta.longitude;
        let last_row = clamp_index(row_end.ceil() - 1.0, self.last_row(level)).max(first_row);
        let last_col = clamp_index(col_end.ceil() - 1.0, self.last_column(level)).max(first_col);

        Some((first_row..=last_row, first_col..=last_col))
    }

    /// All tile keys at a level overlapping a sector, in row-major order.
    pub fn tiles_in_sector(&self, level: &Level, sector: &Sector) -> Vec<TileKey> {
        let Some((rows, columns)) = self.tile_range(level, sector) else {
            return Vec::new();
        };
        rows.flat_map(|row| {
            columns
                .clone()
                .map(move |column| TileKey::new(level.level_number, row, column))
        })
        .collect()
    }

    /// Geographic bounds of a tile.
    ///
    /// Tiles in the last row or column may extend past the coverage sector
    /// when it is not an exact multiple of the tile delta.
    pub fn tile_sector(&self, key: &TileKey) -> Option<Sector> {
        let level = self.level(key.level)?;
        let min_lat =
            self.coverage.min_latitude() + key.row as f64 * level.tile_delta.latitude;
        let min_lon =
            self.coverage.min_longitude() + key.column as f64 * level.tile_delta.longitude;
        Some(Sector::new_unchecked(
            min_lat,
            min_lat + level.tile_delta.latitude,
            min_lon,
            min_lon + level.tile_delta.longitude,
        ))
    }
}

fn check_positive(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive {
            field: field.to_string(),
            value,
        })
    }
}

fn last_index(extent: f64, delta: f64) -> u32 {
    ((extent / delta).ceil() - 1.0).max(0.0) as u32
}

fn clamp_index(index: f64, last: u32) -> u32 {
    index.clamp(0.0, last as f64) as u32
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn texel_size_strictly_decreases(
            delta in 0.1f64..90.0,
            num_levels in 1usize..16,
            tile_height in 1u32..1024,
        ) {
            let levels = LevelSet::new(
                Sector::FULL_SPHERE,
                Location::new(delta, delta),
                num_levels,
                256,
                tile_height,
            ).unwrap();
            for pair in levels.levels().windows(2) {
                prop_assert!(pair[1].texel_size < pair[0].texel_size);
            }
        }

        #[test]
        fn selected_level_is_coarsest_satisfying(target in 1e-6f64..1.0) {
            let levels = LevelSet::new(
                Sector::FULL_SPHERE,
                Location::new(45.0, 45.0),
                12,
                256,
                256,
            ).unwrap();
            let chosen = levels.level_for_texel_size(target);
            if chosen.texel_size <= target && !chosen.is_first() {
                let coarser = levels.level(chosen.level_number - 1).unwrap();
                prop_assert!(coarser.texel_size > target);
            }
            if chosen.texel_size > target {
                prop_assert_eq!(chosen.level_number, levels.last_level().level_number);
            }
        }
    }
}
