//! Area-pixel sampling across tile boundaries.
//!
//! All tiles of one level form a single global pixel grid anchored at the
//! coverage sector's south-west corner. Sampling in that grid lets bilinear
//! interpolation reach into neighbouring tiles instead of clamping at every
//! tile edge.
//!
//! ```text
//!   j (from north)
//!   0 ┌─────────┬─────────┐  grid top = coverage min lat + rows * delta lat
//!     │ (1, 0)  │ (1, 1)  │
//!     ├─────────┼─────────┤
//!     │ (0, 0)  │ (0, 1)  │
//!   H └─────────┴─────────┘  coverage min lat
//!     i = 0               W
//! ```

use crate::level::{Level, LevelSet, TileKey};
use crate::retrieval::TileCache;

/// Global pixel grid of one level.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LevelPixelGrid {
    level_number: usize,
    tile_width: i64,
    tile_height: i64,
    width: i64,
    height: i64,
    min_longitude: f64,
    span_longitude: f64,
    max_latitude: f64,
    span_latitude: f64,
    wraps: bool,
}

impl LevelPixelGrid {
    pub(crate) fn new(levels: &LevelSet, level: &Level) -> Self {
        let rows = levels.last_row(level) as i64 + 1;
        let columns = levels.last_column(level) as i64 + 1;
        let coverage = levels.coverage();
        let span_latitude = rows as f64 * level.tile_delta.latitude;
        let span_longitude = columns as f64 * level.tile_delta.longitude;

        Self {
            level_number: level.level_number,
            tile_width: level.tile_width as i64,
            tile_height: level.tile_height as i64,
            width: columns * level.tile_width as i64,
            height: rows * level.tile_height as i64,
            min_longitude: coverage.min_longitude(),
            span_longitude,
            max_latitude: coverage.min_latitude() + span_latitude,
            span_latitude,
            wraps: coverage.delta_longitude() >= 360.0,
        }
    }

    /// Bilinear sample at a location.
    ///
    /// # Errors
    ///
    /// Returns the keys of the tiles that hold contributing pixels but are
    /// not cached.
    pub(crate) fn sample(
        &self,
        cache: &TileCache,
        latitude: f64,
        longitude: f64,
    ) -> Result<f64, Vec<TileKey>> {
        let u = self.width as f64 * (longitude - self.min_longitude) / self.span_longitude - 0.5;
        let v = self.height as f64 * (self.max_latitude - latitude) / self.span_latitude - 0.5;

        let i0 = u.floor();
        let j0 = v.floor();
        let a = u - i0;
        let b = v - j0;

        let i1 = self.column(i0 as i64 + 1);
        let i0 = self.column(i0 as i64);
        let j1 = self.row(j0 as i64 + 1);
        let j0 = self.row(j0 as i64);

        let mut values = [0.0; 4];
        let mut missing = Vec::new();
        for (value, (i, j)) in values.iter_mut().zip([(i0, j0), (i1, j0), (i0, j1), (i1, j1)]) {
            match self.pixel(cache, i, j) {
                Ok(pixel) => *value = pixel,
                Err(key) if !missing.contains(&key) => missing.push(key),
                Err(_) => {}
            }
        }
        if !missing.is_empty() {
            return Err(missing);
        }

        let [p00, p10, p01, p11] = values;
        Ok((1.0 - a) * (1.0 - b) * p00 + a * (1.0 - b) * p10 + (1.0 - a) * b * p01 + a * b * p11)
    }

    fn column(&self, i: i64) -> i64 {
        if self.wraps {
            i.rem_euclid(self.width)
        } else {
            i.clamp(0, self.width - 1)
        }
    }

    fn row(&self, j: i64) -> i64 {
        j.clamp(0, self.height - 1)
    }

    /// Key of the tile holding global pixel `(i, j)` and the pixel within it.
    pub(crate) fn locate(&self, i: i64, j: i64) -> (TileKey, i64, i64) {
        let from_south = self.height - 1 - j;
        let key = TileKey::new(
            self.level_number,
            (from_south / self.tile_height) as u32,
            (i / self.tile_width) as u32,
        );
        let x = i % self.tile_width;
        let y = self.tile_height - 1 - from_south % self.tile_height;
        (key, x, y)
    }

    fn pixel(&self, cache: &TileCache, i: i64, j: i64) -> Result<f64, TileKey> {
        let (key, x, y) = self.locate(i, j);
        match cache.get(&key) {
            Some(raster) if raster.has_data() => Ok(raster.pixel(x, y) as f64),
            _ => Err(key),
        }
    }
}
