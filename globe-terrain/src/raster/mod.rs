//! Elevation rasters
//!
//! An [`ElevationRaster`] is the decoded content of one tile: a row-major grid
//! of signed 16-bit samples covering a sector, with row 0 along the sector's
//! northern edge.
//!
//! Two sampling conventions are supported:
//!
//! - **Area pixels** ([`ElevationRaster::elevation_at_location`]): each sample
//!   is the average over its cell, so sample centers sit half a pixel inside
//!   the sector edges and values are bilinearly interpolated.
//! - **Point pixels** ([`ElevationRaster::nearest_elevation_at_location`]):
//!   samples are exact values at evenly spaced points whose first and last
//!   samples lie on the sector edges; the nearest sample is returned.
//!
//! A sample value of `0` means either sea level or no data. The two are not
//! distinguished.

mod decode;

pub use decode::{decode_samples, RasterError, RasterFormat};

use std::sync::OnceLock;

use crate::coord::{grid_steps, Sector};
use crate::error::{validate_buffer, validate_grid, ArgumentError};

/// Decoded elevation samples for one tile.
#[derive(Debug)]
pub struct ElevationRaster {
    image_path: String,
    sector: Sector,
    width: u32,
    height: u32,
    data: Option<Vec<i16>>,
    extremes: OnceLock<[f64; 2]>,
}

impl ElevationRaster {
    /// Creates a raster with no samples.
    ///
    /// # Arguments
    ///
    /// * `image_path` - Cache path identifying the tile image
    /// * `sector` - Geographic bounds of the raster
    /// * `width` - Width in pixels
    /// * `height` - Height in pixels
    ///
    /// # Errors
    ///
    /// Returns `ArgumentError` if the path is empty or a dimension is zero.
    pub fn new(
        image_path: impl Into<String>,
        sector: Sector,
        width: u32,
        height: u32,
    ) -> Result<Self, ArgumentError> {
        let image_path = image_path.into();
        if image_path.is_empty() {
            return Err(ArgumentError::EmptyImagePath);
        }
        if width == 0 || height == 0 {
            return Err(ArgumentError::ZeroDimension { width, height });
        }

        Ok(Self {
            image_path,
            sector,
            width,
            height,
            data: None,
            extremes: OnceLock::new(),
        })
    }

    /// Installs the backing samples, consuming and returning the raster.
    pub fn with_data(mut self, data: Vec<i16>) -> Result<Self, ArgumentError> {
        self.set_data(data)?;
        Ok(self)
    }

    /// Replaces the backing samples and forgets any memoized extremes.
    pub fn set_data(&mut self, data: Vec<i16>) -> Result<(), ArgumentError> {
        if data.len() != self.size() {
            return Err(ArgumentError::DataSizeMismatch {
                expected: self.size(),
                actual: data.len(),
            });
        }
        self.data = Some(data);
        self.extremes = OnceLock::new();
        Ok(())
    }

    pub fn image_path(&self) -> &str {
        &self.image_path
    }

    pub fn sector(&self) -> &Sector {
        &self.sector
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of samples, `width * height`.
    pub fn size(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    /// Sample at pixel `(x, y)`; 0 outside the raster or without data.
    pub fn pixel(&self, x: i64, y: i64) -> i16 {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return 0;
        }
        match &self.data {
            Some(data) => data[y as usize * self.width as usize + x as usize],
            None => 0,
        }
    }

    /// Area-pixel elevation at a location, bilinearly interpolated.
    ///
    /// Locations beyond the outermost sample centers take the edge value.
    /// Returns 0 when the raster has no data.
    pub fn elevation_at_location(&self, latitude: f64, longitude: f64) -> f64 {
        match &self.data {
            Some(data) => self.bilinear(data, latitude, longitude),
            None => 0.0,
        }
    }

    /// Point-pixel elevation at a location: the value of the nearest sample.
    ///
    /// Returns 0 when the raster has no data.
    pub fn nearest_elevation_at_location(&self, latitude: f64, longitude: f64) -> f64 {
        if self.data.is_none() {
            return 0.0;
        }
        let fx = fraction(longitude - self.sector.min_longitude(), self.sector.delta_longitude());
        let fy = fraction(self.sector.max_latitude() - latitude, self.sector.delta_latitude());
        let x = ((self.width - 1) as f64 * fx).round() as i64;
        let y = ((self.height - 1) as f64 * fy).round() as i64;
        self.pixel(x, y) as f64
    }

    /// Fills a grid of area-pixel elevations over a sector.
    ///
    /// Rows start at the sector's minimum latitude and advance northward;
    /// columns advance eastward. The last row and column fall exactly on the
    /// sector's northern and eastern edges. Cells whose location lies outside
    /// this raster's sector, and every cell when the raster has no data, are
    /// left unchanged so several rasters can be layered into one result.
    ///
    /// # Errors
    ///
    /// Returns `ArgumentError` if either count is zero or `result` holds
    /// fewer than `num_lat * num_lon` values.
    pub fn elevations_for_grid(
        &self,
        sector: &Sector,
        num_lat: usize,
        num_lon: usize,
        result: &mut [f64],
    ) -> Result<(), ArgumentError> {
        let cells = validate_grid(num_lat, num_lon)?;
        validate_buffer("result", result.len(), cells)?;

        let Some(data) = &self.data else {
            return Ok(());
        };

        let longitudes: Vec<f64> =
            grid_steps(sector.min_longitude(), sector.max_longitude(), num_lon).collect();
        let mut index = 0;
        for lat in grid_steps(sector.min_latitude(), sector.max_latitude(), num_lat) {
            for &lon in &longitudes {
                if self.sector.contains_location(lat, lon) {
                    result[index] = self.bilinear(data, lat, lon);
                }
                index += 1;
            }
        }
        Ok(())
    }

    /// The memoized `[min, max]` sample values, or `[0, 0]` if not yet scanned.
    ///
    /// Always describes the whole raster regardless of any query sector.
    pub fn min_and_max_elevations_for_sector(&self) -> [f64; 2] {
        self.extremes.get().copied().unwrap_or([0.0, 0.0])
    }

    /// Scans every sample once and memoizes the extremes.
    ///
    /// Returns `[0, 0]` without memoizing when the raster has no data.
    pub fn find_min_and_max_elevation(&self) -> [f64; 2] {
        let Some(data) = &self.data else {
            return [0.0, 0.0];
        };
        *self.extremes.get_or_init(|| {
            let (min, max) = data
                .iter()
                .fold((i16::MAX, i16::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));
            [min as f64, max as f64]
        })
    }

    fn bilinear(&self, data: &[i16], latitude: f64, longitude: f64) -> f64 {
        let width = self.width as usize;
        let w = self.width as f64;
        let h = self.height as f64;

        let fx = fraction(longitude - self.sector.min_longitude(), self.sector.delta_longitude());
        let fy = fraction(self.sector.max_latitude() - latitude, self.sector.delta_latitude());
        let x = (w * fx - 0.5).clamp(0.0, w - 1.0);
        let y = (h * fy - 0.5).clamp(0.0, h - 1.0);

        let x0 = x.floor() as usize;
        let y0 = y.floor() as usize;
        let x1 = (x0 + 1).min(width - 1);
        let y1 = (y0 + 1).min(self.height as usize - 1);
        let xf = x - x0 as f64;
        let yf = y - y0 as f64;

        let sample = |xi: usize, yi: usize| data[yi * width + xi] as f64;

        (1.0 - xf) * (1.0 - yf) * sample(x0, y0)
            + xf * (1.0 - yf) * sample(x1, y0)
            + (1.0 - xf) * yf * sample(x0, y1)
            + xf * yf * sample(x1, y1)
    }
}

/// Position of `offset` within `extent` as a fraction; 0 for an empty extent.
fn fraction(offset: f64, extent: f64) -> f64 {
    if extent > 0.0 {
        offset / extent
    } else {
        0.0
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn pixel_outside_bounds_is_zero(
            width in 1u32..64,
            height in 1u32..64,
            x in -200i64..200,
            y in -200i64..200,
        ) {
            let size = (width * height) as usize;
            let raster = ElevationRaster::new("p", Sector::FULL_SPHERE, width, height)
                .unwrap()
                .with_data(vec![7; size])
                .unwrap();
            let inside = x >= 0 && y >= 0 && x < width as i64 && y < height as i64;
            prop_assert_eq!(raster.pixel(x, y), if inside { 7 } else { 0 });
        }

        #[test]
        fn interpolated_value_within_extremes(lat in 36.0f64..=38.0, lon in 14.0f64..=16.0) {
            let sector = Sector::new(36.0, 38.0, 14.0, 16.0).unwrap();
            let raster = ElevationRaster::new("p", sector, 4, 4)
                .unwrap()
                .with_data((0..16).map(|v| v * 3 - 10).collect())
                .unwrap();
            let value = raster.elevation_at_location(lat, lon);
            let [min, max] = raster.find_min_and_max_elevation();
            prop_assert!(value >= min - 1e-9 && value <= max + 1e-9);
        }
    }
}
