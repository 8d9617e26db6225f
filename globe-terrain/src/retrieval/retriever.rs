//! Background tile retrieval with request coalescing.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{self, BoxFuture, Shared};
use futures::FutureExt;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use super::cache::TileCache;
use super::stats::{RetrievalStats, RetrievalStatsSnapshot};
use super::RetrievalError;
use crate::level::TileKey;
use crate::provider::{ElevationProvider, TileRequest};
use crate::raster::{decode_samples, ElevationRaster};

/// Default number of provider requests allowed at once.
pub const DEFAULT_MAX_CONCURRENT_RETRIEVALS: usize = 8;

/// A retrieval that may still be running.
///
/// Resolves to the decoded raster, or `None` if the retrieval failed.
/// Clones resolve together.
pub type PendingTile = Shared<BoxFuture<'static, Option<Arc<ElevationRaster>>>>;

struct RetrieverState {
    provider: Arc<dyn ElevationProvider>,
    cache: TileCache,
    in_flight: DashMap<TileKey, PendingTile>,
    timestamp: AtomicU64,
    bounds: Mutex<[f64; 2]>,
    stats: RetrievalStats,
    permits: Semaphore,
}

/// Fetches, decodes and caches tiles on a Tokio runtime.
///
/// Each tile key has at most one retrieval in flight; later requests for the
/// same key share the pending result. Provider calls are bounded by a
/// semaphore. Every completed retrieval advances [`TileRetriever::timestamp`]
/// and widens the running elevation bounds.
#[derive(Clone)]
pub struct TileRetriever {
    state: Arc<RetrieverState>,
    handle: Handle,
}

impl TileRetriever {
    /// Creates a retriever.
    ///
    /// # Arguments
    ///
    /// * `provider` - Source of encoded tiles
    /// * `handle` - Runtime that runs retrievals
    /// * `max_concurrent` - Provider calls allowed at once; 0 is treated as 1
    /// * `initial_bounds` - Starting `[min, max]` elevation bounds
    pub fn new(
        provider: Arc<dyn ElevationProvider>,
        handle: Handle,
        max_concurrent: usize,
        initial_bounds: [f64; 2],
    ) -> Self {
        Self {
            state: Arc::new(RetrieverState {
                provider,
                cache: TileCache::new(),
                in_flight: DashMap::new(),
                timestamp: AtomicU64::new(0),
                bounds: Mutex::new(initial_bounds),
                stats: RetrievalStats::new(),
                permits: Semaphore::new(max_concurrent.max(1)),
            }),
            handle,
        }
    }

    /// Starts retrieving a tile unless it is cached or already in flight.
    ///
    /// Never blocks. The returned future may be dropped; the retrieval keeps
    /// running on the runtime.
    pub fn request(&self, request: TileRequest) -> PendingTile {
        if let Some(raster) = self.state.cache.get(&request.key) {
            return ready(Some(raster));
        }

        match self.state.in_flight.entry(request.key) {
            Entry::Occupied(entry) => {
                self.state.stats.record_deduplicated();
                entry.get().clone()
            }
            Entry::Vacant(entry) => {
                // The tile may have landed between the cache check and the entry lock.
                if let Some(raster) = self.state.cache.get(&request.key) {
                    return ready(Some(raster));
                }

                let state = Arc::clone(&self.state);
                let pending = async move { state.retrieve(request).await }.boxed().shared();
                entry.insert(pending.clone());
                self.state.stats.record_issued();

                self.handle.spawn(pending.clone());
                pending
            }
        }
    }

    /// Waits until no retrieval is in flight, including ones started while waiting.
    pub async fn wait_for_retrievals(&self) {
        loop {
            let pending: Vec<PendingTile> = self
                .state
                .in_flight
                .iter()
                .map(|entry| entry.value().clone())
                .collect();
            if pending.is_empty() {
                return;
            }
            future::join_all(pending).await;
        }
    }

    pub fn cache(&self) -> &TileCache {
        &self.state.cache
    }

    pub fn is_in_flight(&self, key: &TileKey) -> bool {
        self.state.in_flight.contains_key(key)
    }

    pub fn in_flight_count(&self) -> usize {
        self.state.in_flight.len()
    }

    /// Counter advanced once per completed retrieval.
    pub fn timestamp(&self) -> u64 {
        self.state.timestamp.load(Ordering::Acquire)
    }

    /// Running `[min, max]` elevation bounds over the initial bounds and every loaded tile.
    pub fn bounds(&self) -> [f64; 2] {
        *self.state.bounds.lock()
    }

    pub fn stats(&self) -> RetrievalStatsSnapshot {
        self.state.stats.snapshot()
    }

    pub fn provider_name(&self) -> &str {
        self.state.provider.name()
    }
}

impl std::fmt::Debug for TileRetriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TileRetriever")
            .field("provider", &self.state.provider.name())
            .field("cached", &self.state.cache.len())
            .field("in_flight", &self.state.in_flight.len())
            .field("timestamp", &self.timestamp())
            .finish()
    }
}

impl RetrieverState {
    async fn retrieve(self: Arc<Self>, request: TileRequest) -> Option<Arc<ElevationRaster>> {
        let key = request.key;
        // A panicking provider must still clear its in-flight entry.
        let fetched = AssertUnwindSafe(self.fetch(&request))
            .catch_unwind()
            .await
            .unwrap_or(Err(RetrievalError::Panicked));
        let outcome = match fetched {
            Ok(raster) => {
                let raster = Arc::new(raster);
                let [min, max] = raster.min_and_max_elevations_for_sector();
                {
                    let mut bounds = self.bounds.lock();
                    bounds[0] = bounds[0].min(min);
                    bounds[1] = bounds[1].max(max);
                }
                self.cache.insert(key, Arc::clone(&raster));
                self.stats.record_completed();
                debug!(
                    provider = self.provider.name(),
                    tile = %key,
                    min_elevation = min,
                    max_elevation = max,
                    "Elevation tile loaded"
                );
                Some(raster)
            }
            Err(e) => {
                self.stats.record_failed();
                warn!(provider = self.provider.name(), tile = %key, error = %e, "Elevation tile retrieval failed");
                None
            }
        };

        self.in_flight.remove(&key);
        if outcome.is_some() {
            self.timestamp.fetch_add(1, Ordering::AcqRel);
        }
        outcome
    }

    async fn fetch(&self, request: &TileRequest) -> Result<ElevationRaster, RetrievalError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| RetrievalError::Closed)?;

        let bytes = self.provider.retrieve(request).await?;
        let samples = decode_samples(request.format, &bytes, request.width, request.height)?;
        let raster = ElevationRaster::new(
            request.image_path.clone(),
            request.sector,
            request.width,
            request.height,
        )?
        .with_data(samples)?;
        raster.find_min_and_max_elevation();
        Ok(raster)
    }
}

fn ready(raster: Option<Arc<ElevationRaster>>) -> PendingTile {
    future::ready(raster).boxed().shared()
}
