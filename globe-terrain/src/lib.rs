//! Globe Terrain - Tiled elevation cache and ellipsoidal geodesy
//!
//! This library answers "what is the ground elevation here?" for a 3D globe
//! renderer. Elevations come from a multi-resolution tile pyramid that is
//! fetched on demand, and the [`globe::Globe`] type layers WGS84 geodesy
//! (geographic/Cartesian conversion, ray intersection, surface normals and
//! frustum tests) on top of it.
//!
//! # Architecture
//!
//! ```text
//! renderer / picker
//!        │
//!        ▼
//!      Globe ──────────────► Projection (WGS84, equirectangular)
//!        │
//!        ▼
//!  ElevationModel ─► LevelSet ─► TileKey
//!        │
//!        ▼
//!  TileRetriever ─► ElevationProvider (WMS, REST, file) ─► ElevationRaster
//! ```
//!
//! Queries never block. A query that touches a tile which is not cached yet
//! issues a background retrieval and answers with the best data available,
//! falling back to `0` where nothing is loaded.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use globe_terrain::elevation::{ElevationModel, ElevationModelConfig};
//! use globe_terrain::globe::Globe;
//! use globe_terrain::id::IdAllocator;
//! use globe_terrain::provider::{AsyncReqwestClient, ProviderConfig, ProviderFactory};
//!
//! let ids = IdAllocator::new();
//! let factory = ProviderFactory::new(AsyncReqwestClient::new()?);
//! let provider = factory.create(&ProviderConfig::earth_wms());
//! let model = ElevationModel::new(&ids, ElevationModelConfig::earth(), provider, handle)?;
//! let globe = Globe::new(&ids, model, None);
//!
//! let point = globe.compute_point_from_position(37.0, 15.0, 1000.0);
//! let height = globe.elevation_at_location(37.0, 15.0);
//! ```

pub mod coord;
pub mod elevation;
pub mod error;
pub mod geometry;
pub mod globe;
pub mod id;
pub mod level;
pub mod logging;
pub mod projection;
pub mod provider;
pub mod raster;
pub mod retrieval;

pub use error::{ArgumentError, ConfigError};
pub use glam::DVec3;
