//! The tiled elevation model.

use std::collections::BTreeSet;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tracing::{debug, info};

use super::config::ElevationModelConfig;
use super::sampling::LevelPixelGrid;
use crate::coord::{grid_steps, Sector};
use crate::error::{validate_buffer, validate_grid, ArgumentError, ConfigError};
use crate::id::IdAllocator;
use crate::level::{Level, LevelSet, TileKey};
use crate::provider::{ElevationProvider, TileRequest};
use crate::raster::ElevationRaster;
use crate::retrieval::{RetrievalStatsSnapshot, TileRetriever};

/// Multi-resolution elevations over a coverage sector.
///
/// Queries answer immediately from whatever tiles are cached and request
/// missing tiles in the background. Callers that redraw on change should
/// watch [`ElevationModel::state_key`], which changes whenever a tile lands.
#[derive(Debug)]
pub struct ElevationModel {
    id: u64,
    config: ElevationModelConfig,
    levels: LevelSet,
    retriever: TileRetriever,
    current_tiles: Mutex<Vec<TileKey>>,
}

impl ElevationModel {
    /// Creates an elevation model.
    ///
    /// # Arguments
    ///
    /// * `ids` - Allocator for the model's identifier
    /// * `config` - Pyramid and retrieval settings
    /// * `provider` - Source of encoded tiles
    /// * `handle` - Runtime that runs background retrievals
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration fails validation.
    pub fn new(
        ids: &IdAllocator,
        config: ElevationModelConfig,
        provider: Arc<dyn ElevationProvider>,
        handle: Handle,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let levels = LevelSet::new(
            config.coverage_sector,
            config.level_zero_delta,
            config.num_levels,
            config.tile_width,
            config.tile_height,
        )?;
        let retriever = TileRetriever::new(
            provider,
            handle,
            config.max_concurrent_retrievals,
            [config.min_elevation, config.max_elevation],
        );
        let id = ids.next_id();

        info!(
            id,
            name = %config.display_name,
            coverage = %config.coverage_sector,
            levels = config.num_levels,
            provider = retriever.provider_name(),
            "Elevation model created"
        );

        Ok(Self {
            id,
            config,
            levels,
            retriever,
            current_tiles: Mutex::new(Vec::new()),
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn config(&self) -> &ElevationModelConfig {
        &self.config
    }

    pub fn display_name(&self) -> &str {
        &self.config.display_name
    }

    pub fn coverage_sector(&self) -> &Sector {
        self.levels.coverage()
    }

    pub fn levels(&self) -> &LevelSet {
        &self.levels
    }

    pub fn pixel_is_point(&self) -> bool {
        self.config.pixel_is_point
    }

    /// Counter advanced each time a tile finishes loading.
    pub fn timestamp(&self) -> u64 {
        self.retriever.timestamp()
    }

    /// Lowest elevation seen so far, including the configured bound.
    pub fn min_elevation(&self) -> f64 {
        self.retriever.bounds()[0]
    }

    /// Highest elevation seen so far, including the configured bound.
    pub fn max_elevation(&self) -> f64 {
        self.retriever.bounds()[1]
    }

    /// Cache key describing the model's current content.
    pub fn state_key(&self) -> String {
        format!("elevationModel {} timestamp {} ", self.id, self.timestamp())
    }

    /// Tiles chosen by the most recent [`ElevationModel::assemble_tiles`].
    pub fn current_tiles(&self) -> Vec<TileKey> {
        self.current_tiles.lock().clone()
    }

    pub fn cached_tile_count(&self) -> usize {
        self.retriever.cache().len()
    }

    pub fn stats(&self) -> RetrievalStatsSnapshot {
        self.retriever.stats()
    }

    /// Waits for every background retrieval, including ones started meanwhile.
    pub async fn wait_for_retrievals(&self) {
        self.retriever.wait_for_retrievals().await
    }

    /// Elevation at a location from the finest level.
    ///
    /// Returns 0 outside the coverage sector. When the finest tile is not
    /// cached it is requested and the nearest cached ancestor answers instead,
    /// or 0 if none is cached.
    pub fn elevation_at_location(&self, latitude: f64, longitude: f64) -> f64 {
        if !self.levels.coverage().contains_location(latitude, longitude) {
            return 0.0;
        }

        let key = self
            .levels
            .tile_key_for_location(self.levels.last_level(), latitude, longitude);
        if let Some(raster) = self.retriever.cache().get(&key) {
            return self.sample(&raster, latitude, longitude);
        }

        self.request_tile(&key);
        key.ancestors()
            .find_map(|ancestor| self.retriever.cache().get(&ancestor))
            .map(|raster| self.sample(&raster, latitude, longitude))
            .unwrap_or(0.0)
    }

    /// Fills a grid of elevations over a sector.
    ///
    /// The grid is row-major with rows from the sector's minimum latitude
    /// northward and columns west to east; the last row and column sit on the
    /// sector's northern and eastern edges. Cells with no loaded data or
    /// outside the coverage sector are 0.
    ///
    /// # Arguments
    ///
    /// * `sector` - Sector spanned by the grid
    /// * `num_lat` - Number of grid rows
    /// * `num_lon` - Number of grid columns
    /// * `target_resolution` - Desired texel size in degrees
    /// * `result` - Output, at least `num_lat * num_lon` values
    ///
    /// # Errors
    ///
    /// Returns `ArgumentError` if a count is zero or `result` is too short.
    pub fn elevations_for_grid(
        &self,
        sector: &Sector,
        num_lat: usize,
        num_lon: usize,
        target_resolution: f64,
        result: &mut [f64],
    ) -> Result<(), ArgumentError> {
        let cells = validate_grid(num_lat, num_lon)?;
        validate_buffer("result", result.len(), cells)?;
        result[..cells].fill(0.0);

        let level = *self.levels.level_for_texel_size(target_resolution);
        self.assemble_tiles(level.level_number, sector, true);

        if self.config.pixel_is_point {
            self.point_elevations_for_grid(sector, num_lat, num_lon, &level, result);
        } else {
            if !level.is_first() {
                self.request_tiles(self.levels.first_level(), sector);
            }
            self.area_elevations_for_grid(sector, num_lat, num_lon, &level, result);
        }
        Ok(())
    }

    /// `[min, max]` elevations over the tiles covering a sector.
    ///
    /// Picks the level whose tiles are about the size of the sector. Missing
    /// tiles are requested and contribute `[0, 0]`; `[0, 0]` is returned when
    /// the sector lies outside the coverage.
    pub fn min_and_max_elevations_for_sector(&self, sector: &Sector) -> [f64; 2] {
        let level = self
            .levels
            .level_for_texel_size(sector.delta_latitude() / self.config.tile_height as f64);
        let keys = self.assemble_tiles(level.level_number, sector, true);
        if keys.is_empty() {
            return [0.0, 0.0];
        }

        keys.iter()
            .map(|key| {
                self.retriever
                    .cache()
                    .get(key)
                    .map(|raster| raster.min_and_max_elevations_for_sector())
                    .unwrap_or([0.0, 0.0])
            })
            .fold([f64::MAX, f64::MIN], |[lo, hi], [min, max]| {
                [lo.min(min), hi.max(max)]
            })
    }

    /// Selects every tile at a level overlapping a sector.
    ///
    /// Replaces the current tile set. With `retrieve`, tiles that are not
    /// cached are requested.
    ///
    /// # Returns
    ///
    /// The selected keys in row-major order; empty when the level does not
    /// exist or the sector misses the coverage.
    pub fn assemble_tiles(&self, level_number: usize, sector: &Sector, retrieve: bool) -> Vec<TileKey> {
        let keys = match self.levels.level(level_number) {
            Some(level) => self.levels.tiles_in_sector(level, sector),
            None => Vec::new(),
        };
        if retrieve {
            keys.iter().for_each(|key| self.request_tile(key));
        }
        debug!(model = self.id, level = level_number, tiles = keys.len(), "Assembled tiles");

        *self.current_tiles.lock() = keys.clone();
        keys
    }

    /// Provider request for a tile, or `None` if its level does not exist.
    pub fn tile_request(&self, key: &TileKey) -> Option<TileRequest> {
        let sector = self.levels.tile_sector(key)?;
        Some(TileRequest {
            key: *key,
            sector,
            image_path: key.image_path(
                &self.config.cache_path,
                self.config.retrieval_format.extension(),
            ),
            format: self.config.retrieval_format,
            width: self.config.tile_width,
            height: self.config.tile_height,
        })
    }

    fn request_tile(&self, key: &TileKey) {
        if self.retriever.cache().contains(key) {
            return;
        }
        if let Some(request) = self.tile_request(key) {
            let _ = self.retriever.request(request);
        }
    }

    fn request_tiles(&self, level: &Level, sector: &Sector) {
        for key in self.levels.tiles_in_sector(level, sector) {
            self.request_tile(&key);
        }
    }

    fn sample(&self, raster: &ElevationRaster, latitude: f64, longitude: f64) -> f64 {
        if self.config.pixel_is_point {
            raster.nearest_elevation_at_location(latitude, longitude)
        } else {
            raster.elevation_at_location(latitude, longitude)
        }
    }

    fn point_elevations_for_grid(
        &self,
        sector: &Sector,
        num_lat: usize,
        num_lon: usize,
        level: &Level,
        result: &mut [f64],
    ) {
        let coverage = self.levels.coverage();
        let cache = self.retriever.cache();
        let longitudes: Vec<f64> =
            grid_steps(sector.min_longitude(), sector.max_longitude(), num_lon).collect();

        let cells = grid_steps(sector.min_latitude(), sector.max_latitude(), num_lat)
            .flat_map(|lat| longitudes.iter().map(move |&lon| (lat, lon)));
        for ((lat, lon), value) in cells.zip(result.iter_mut()) {
            if !coverage.contains_location(lat, lon) {
                continue;
            }
            let key = self.levels.tile_key_for_location(level, lat, lon);
            if let Some(raster) = cache.get_or_ancestor(&key) {
                *value = raster.nearest_elevation_at_location(lat, lon);
            }
        }
    }

    fn area_elevations_for_grid(
        &self,
        sector: &Sector,
        num_lat: usize,
        num_lon: usize,
        level: &Level,
        result: &mut [f64],
    ) {
        let coverage = self.levels.coverage();
        let cache = self.retriever.cache();
        let grids: Vec<LevelPixelGrid> = self.levels.levels()[..=level.level_number]
            .iter()
            .rev()
            .map(|l| LevelPixelGrid::new(&self.levels, l))
            .collect();
        let longitudes: Vec<f64> =
            grid_steps(sector.min_longitude(), sector.max_longitude(), num_lon).collect();

        // Pixels on a tile seam may come from tiles outside the sector.
        let mut missing = BTreeSet::new();
        let fallback = grids.len() - 1;

        let cells = grid_steps(sector.min_latitude(), sector.max_latitude(), num_lat)
            .flat_map(|lat| longitudes.iter().map(move |&lon| (lat, lon)));
        for ((lat, lon), value) in cells.zip(result.iter_mut()) {
            if !coverage.contains_location(lat, lon) {
                continue;
            }
            for (index, grid) in grids.iter().enumerate() {
                match grid.sample(cache, lat, lon) {
                    Ok(elevation) => {
                        *value = elevation;
                        break;
                    }
                    Err(keys) if index == 0 || index == fallback => missing.extend(keys),
                    Err(_) => {}
                }
            }
        }

        if !missing.is_empty() {
            debug!(count = missing.len(), "Requesting tiles bordering grid cells");
        }
        for key in &missing {
            self.request_tile(key);
        }
    }
}
