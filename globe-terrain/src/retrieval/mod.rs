//! Tile retrieval and caching
//!
//! Queries on an elevation model never wait for the network. When a query
//! needs a tile that is not cached, the model hands a [`TileRequest`] to the
//! [`TileRetriever`], which fetches it in the background:
//!
//! ```text
//! request(key) ──► cached? ──yes──► ready
//!                    │ no
//!                    ▼
//!              in flight? ──yes──► join pending retrieval
//!                    │ no
//!                    ▼
//!        spawn: permit ─► provider ─► decode ─► cache ─► timestamp += 1
//! ```
//!
//! Failures are logged and counted but never surface to query callers; the
//! tile simply stays missing and may be requested again.
//!
//! [`TileRequest`]: crate::provider::TileRequest

mod cache;
mod retriever;
mod stats;

pub use cache::TileCache;
pub use retriever::{PendingTile, TileRetriever, DEFAULT_MAX_CONCURRENT_RETRIEVALS};
pub use stats::{RetrievalStats, RetrievalStatsSnapshot};

use thiserror::Error;

use crate::error::ArgumentError;
use crate::provider::ProviderError;
use crate::raster::RasterError;

/// Why a single tile retrieval failed.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// The provider could not deliver the payload.
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The payload could not be decoded.
    #[error("Decode error: {0}")]
    Decode(#[from] RasterError),

    /// The decoded samples do not fit the tile.
    #[error("Invalid tile: {0}")]
    InvalidTile(#[from] ArgumentError),

    /// The provider panicked while serving the request.
    #[error("Provider panicked")]
    Panicked,

    /// The retriever shut down before the request got a slot.
    #[error("Retrieval queue closed")]
    Closed,
}
