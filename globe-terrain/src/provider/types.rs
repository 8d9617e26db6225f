//! Core types for elevation tile providers.

use bytes::Bytes;
use futures::future::BoxFuture;
use thiserror::Error;

use crate::coord::Sector;
use crate::level::TileKey;
use crate::raster::RasterFormat;

/// Errors that can occur while retrieving a tile.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// The HTTP request failed or returned a non-success status.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// The tile does not exist at the source.
    #[error("Tile not found: {0}")]
    NotFound(String),

    /// Reading a local tile failed.
    #[error("I/O error: {0}")]
    Io(String),

    /// The provider is misconfigured.
    #[error("Invalid provider configuration: {0}")]
    InvalidConfiguration(String),
}

/// Everything a provider needs to fetch one tile.
#[derive(Debug, Clone, PartialEq)]
pub struct TileRequest {
    /// Pyramid address of the tile.
    pub key: TileKey,
    /// Geographic bounds of the tile.
    pub sector: Sector,
    /// Cache-relative image path, `<prefix>/<level>/<row>/<row>_<col>.<ext>`.
    pub image_path: String,
    /// Encoding to request.
    pub format: RasterFormat,
    /// Tile width in pixels.
    pub width: u32,
    /// Tile height in pixels.
    pub height: u32,
}

/// Source of raw elevation tile payloads.
///
/// Providers return the encoded bytes; decoding into samples happens in the
/// retrieval layer so every source shares one decoder. The trait returns boxed
/// futures so models can hold providers as `Arc<dyn ElevationProvider>`.
pub trait ElevationProvider: Send + Sync {
    /// Fetches the encoded payload for one tile.
    fn retrieve<'a>(&'a self, request: &'a TileRequest) -> BoxFuture<'a, Result<Bytes, ProviderError>>;

    /// Short name used in log output.
    fn name(&self) -> &str;
}
