//! Integration tests for the elevation model and globe.
//!
//! These tests drive the public API end to end:
//! - query → background retrieval → cache → second query
//! - grid cells blended across tile seams
//! - request deduplication and failure absorption
//! - timestamp, state key and elevation bound updates
//! - tiles read from disk through the file provider
//!
//! Run with: `cargo test --test elevation_model_integration`

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::future::BoxFuture;
use futures::FutureExt;
use tempfile::TempDir;
use tokio::runtime::Handle;

use globe_terrain::coord::{Location, Sector};
use globe_terrain::elevation::{ElevationModel, ElevationModelConfig};
use globe_terrain::globe::Globe;
use globe_terrain::id::IdAllocator;
use globe_terrain::level::TileKey;
use globe_terrain::provider::{ElevationProvider, FileProvider, ProviderError, TileRequest};
use globe_terrain::raster::RasterFormat;
use globe_terrain::DVec3;

// ============================================================================
// Helper Functions
// ============================================================================

/// Serves tiles filled with `level * 100 + row * 10 + column`.
#[derive(Default)]
struct TileIdProvider {
    calls: AtomicUsize,
    fail_next: AtomicBool,
}

impl TileIdProvider {
    fn failing_once() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_next: AtomicBool::new(true),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ElevationProvider for TileIdProvider {
    fn retrieve<'a>(
        &'a self,
        request: &'a TileRequest,
    ) -> BoxFuture<'a, Result<Bytes, ProviderError>> {
        async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            if self.fail_next.swap(false, Ordering::SeqCst) {
                return Err(ProviderError::HttpError("503 Service Unavailable".to_string()));
            }
            Ok(Bytes::from(tile_bytes(request.key, request.width * request.height)))
        }
        .boxed()
    }

    fn name(&self) -> &str {
        "tile-id"
    }
}

fn tile_value(key: TileKey) -> i16 {
    (key.level * 100) as i16 + (key.row * 10 + key.column) as i16
}

fn tile_bytes(key: TileKey, pixels: u32) -> Vec<u8> {
    let value = tile_value(key);
    (0..pixels).flat_map(|_| value.to_le_bytes()).collect()
}

/// Two degrees around Etna, two levels of 4x4 tiles.
fn etna_config() -> ElevationModelConfig {
    ElevationModelConfig::new(
        Sector::new(36.0, 38.0, 14.0, 16.0).unwrap(),
        Location::new(2.0, 2.0),
        2,
        RasterFormat::Bil16,
        "etna",
        4,
        4,
    )
}

fn model_with(provider: Arc<dyn ElevationProvider>, config: ElevationModelConfig) -> ElevationModel {
    ElevationModel::new(&IdAllocator::new(), config, provider, Handle::current()).unwrap()
}

// ============================================================================
// Integration Tests
// ============================================================================

/// Repeated queries for a missing tile share one provider request.
#[tokio::test]
async fn test_concurrent_queries_share_one_retrieval() {
    let provider = Arc::new(TileIdProvider::default());
    let model = model_with(provider.clone(), etna_config());

    assert_eq!(model.elevation_at_location(37.5, 15.5), 0.0);
    assert_eq!(model.elevation_at_location(37.5, 15.5), 0.0);

    let stats = model.stats();
    assert_eq!(stats.issued, 1);
    assert_eq!(stats.deduplicated, 1);

    model.wait_for_retrievals().await;
    assert_eq!(provider.calls(), 1);
    assert_eq!(model.cached_tile_count(), 1);
    assert_eq!(model.elevation_at_location(37.5, 15.5), 111.0);

    // Cached tiles are never fetched again.
    assert_eq!(model.elevation_at_location(37.9, 15.9), 111.0);
    assert_eq!(model.stats().issued, 1);
    assert_eq!(provider.calls(), 1);
}

/// A grid query returns zeros first, then the loaded values.
#[tokio::test]
async fn test_grid_query_fills_after_retrieval() {
    let provider = Arc::new(TileIdProvider::default());
    let model = model_with(provider.clone(), etna_config().with_pixel_is_point(false));
    let sector = Sector::new(36.25, 37.75, 14.25, 15.75).unwrap();
    let mut result = [f64::NAN; 4];

    model
        .elevations_for_grid(&sector, 2, 2, 0.001, &mut result)
        .unwrap();
    assert_eq!(result, [0.0; 4]);

    // Four level-1 tiles plus the level-0 fallback tile.
    assert_eq!(model.stats().issued, 5);

    model.wait_for_retrievals().await;
    model
        .elevations_for_grid(&sector, 2, 2, 0.001, &mut result)
        .unwrap();
    assert_eq!(result, [100.0, 101.0, 110.0, 111.0]);
    assert_eq!(provider.calls(), 5);
}

/// Cells on interior tile seams blend pixels from the tiles on both sides.
#[tokio::test]
async fn test_grid_blends_across_tile_seams() {
    let provider = Arc::new(TileIdProvider::default());
    let model = model_with(provider.clone(), etna_config().with_pixel_is_point(false));
    let sector = Sector::new(36.0, 37.0, 14.0, 15.0).unwrap();
    let mut result = [f64::NAN; 9];

    model
        .elevations_for_grid(&sector, 3, 3, 0.001, &mut result)
        .unwrap();
    assert_eq!(result, [0.0; 9]);

    // The sector's tile, its level-0 parent, and the three level-1 tiles
    // across its north and east seams.
    assert_eq!(model.stats().issued, 5);

    model.wait_for_retrievals().await;
    model
        .elevations_for_grid(&sector, 3, 3, 0.001, &mut result)
        .unwrap();
    assert_eq!(
        result,
        [100.0, 100.0, 100.5, 100.0, 100.0, 100.5, 105.0, 105.0, 105.5]
    );
    assert_eq!(provider.calls(), 5);
    assert_eq!(model.cached_tile_count(), 5);
}

/// Loading tiles bumps the timestamp, changes the state key and widens bounds.
#[tokio::test]
async fn test_globe_state_tracks_retrievals() {
    let provider = Arc::new(TileIdProvider::default());
    let ids = IdAllocator::new();
    let model = ElevationModel::new(&ids, etna_config(), provider, Handle::current()).unwrap();
    let globe = Globe::new(&ids, model, None);

    let before = globe.state_key();
    assert_eq!(globe.elevation_timestamp(), 0);
    assert!(before.contains("timestamp 0 "));

    let sector = Sector::new(37.2, 37.8, 15.2, 15.8).unwrap();
    assert_eq!(globe.min_and_max_elevations_for_sector(&sector), [0.0, 0.0]);

    globe.elevation_model().wait_for_retrievals().await;
    assert_eq!(globe.elevation_timestamp(), 1);
    assert_ne!(globe.state_key(), before);
    assert_eq!(globe.min_and_max_elevations_for_sector(&sector), [111.0, 111.0]);
    assert_eq!(globe.min_elevation(), 0.0);
    assert_eq!(globe.max_elevation(), 111.0);
}

/// A failed retrieval leaves no trace except the counter; the next query retries.
#[tokio::test]
async fn test_failed_retrieval_is_retried() {
    let provider = Arc::new(TileIdProvider::failing_once());
    let model = model_with(provider.clone(), etna_config());

    assert_eq!(model.elevation_at_location(36.5, 14.5), 0.0);
    model.wait_for_retrievals().await;
    assert_eq!(model.stats().failed, 1);
    assert_eq!(model.timestamp(), 0);
    assert_eq!(model.cached_tile_count(), 0);

    assert_eq!(model.elevation_at_location(36.5, 14.5), 0.0);
    model.wait_for_retrievals().await;
    assert_eq!(provider.calls(), 2);
    assert_eq!(model.timestamp(), 1);
    assert_eq!(model.elevation_at_location(36.5, 14.5), 100.0);
}

/// Tiles on disk are found through the cache layout.
#[tokio::test]
async fn test_file_provider_serves_cached_layout() {
    let dir = TempDir::new().unwrap();
    let model = model_with(Arc::new(FileProvider::new(dir.path())), etna_config());

    let key = TileKey::new(1, 0, 1);
    let request = model.tile_request(&key).unwrap();
    let path = FileProvider::new(dir.path()).path_for(&request);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, tile_bytes(key, 16)).unwrap();

    assert_eq!(model.elevation_at_location(36.5, 15.5), 0.0);
    model.wait_for_retrievals().await;
    assert_eq!(model.elevation_at_location(36.5, 15.5), 101.0);
    assert_eq!(model.stats().completed, 1);
}

/// Grid elevations feed straight into the globe's point grid.
#[tokio::test]
async fn test_grid_points_include_loaded_elevations() {
    let ids = IdAllocator::new();
    let model = ElevationModel::new(
        &ids,
        etna_config(),
        Arc::new(TileIdProvider::default()),
        Handle::current(),
    )
    .unwrap();
    let globe = Globe::new(&ids, model, None);
    let sector = Sector::new(37.25, 37.75, 15.25, 15.75).unwrap();

    let mut elevations = [0.0; 4];
    globe
        .elevations_for_grid(&sector, 2, 2, 0.001, &mut elevations)
        .unwrap();
    globe.elevation_model().wait_for_retrievals().await;
    globe
        .elevations_for_grid(&sector, 2, 2, 0.001, &mut elevations)
        .unwrap();
    assert_eq!(elevations, [111.0; 4]);

    let mut points = [DVec3::ZERO; 4];
    globe
        .compute_points_for_grid(&sector, 2, 2, &elevations, DVec3::ZERO, &mut points)
        .unwrap();

    for (point, (lat, lon)) in points
        .iter()
        .zip([(37.25, 15.25), (37.25, 15.75), (37.75, 15.25), (37.75, 15.75)])
    {
        let expected = globe.compute_point_from_position(lat, lon, 111.0);
        assert!((*point - expected).length() < 1e-6);
    }
}
