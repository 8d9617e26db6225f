//! Elevation tile provider abstraction
//!
//! This module provides the [`ElevationProvider`] trait and its
//! implementations for fetching raw tile payloads from remote services
//! (WMS, level/row/column servers) or a local directory.
//!
//! # Factory Pattern
//!
//! For centralized provider creation, use the [`ProviderFactory`]:
//!
//! ```ignore
//! use globe_terrain::provider::{AsyncReqwestClient, ProviderConfig, ProviderFactory};
//!
//! let http_client = AsyncReqwestClient::new()?;
//! let factory = ProviderFactory::new(http_client);
//! let provider = factory.create(&ProviderConfig::earth_wms());
//! ```

mod factory;
mod file;
mod http;
mod remote;
mod types;
mod url;

pub use factory::{ProviderConfig, ProviderFactory, PROVIDER_SECTION};
pub use file::FileProvider;
pub use http::{AsyncHttpClient, AsyncReqwestClient};
pub use remote::RemoteProvider;
pub use types::{ElevationProvider, ProviderError, TileRequest};
pub use url::{
    LevelRowColumnUrlBuilder, UrlBuilder, WmsUrlBuilder, EARTH_WMS_ADDRESS, EARTH_WMS_LAYERS,
};

#[cfg(test)]
pub use http::tests::MockAsyncHttpClient;
