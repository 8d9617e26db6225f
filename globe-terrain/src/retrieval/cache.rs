//! Decoded tile cache.

use std::sync::Arc;

use dashmap::DashMap;

use crate::level::TileKey;
use crate::raster::ElevationRaster;

/// Concurrent map from tile key to decoded raster.
///
/// Entries are shared as `Arc` so queries can keep sampling a raster while
/// retrievals insert other tiles. Nothing is evicted.
#[derive(Debug, Default)]
pub struct TileCache {
    tiles: DashMap<TileKey, Arc<ElevationRaster>>,
}

impl TileCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached raster for a key.
    pub fn get(&self, key: &TileKey) -> Option<Arc<ElevationRaster>> {
        self.tiles.get(key).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, key: &TileKey) -> bool {
        self.tiles.contains_key(key)
    }

    /// Stores a raster, returning the one it replaced.
    pub fn insert(&self, key: TileKey, raster: Arc<ElevationRaster>) -> Option<Arc<ElevationRaster>> {
        self.tiles.insert(key, raster)
    }

    /// First cached raster among a key and its ancestors, finest first.
    pub fn get_or_ancestor(&self, key: &TileKey) -> Option<Arc<ElevationRaster>> {
        std::iter::once(*key)
            .chain(key.ancestors())
            .find_map(|k| self.get(&k))
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn clear(&self) {
        self.tiles.clear();
    }
}
