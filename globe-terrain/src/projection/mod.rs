//! Geographic projections
//!
//! A [`Projection`] maps geographic coordinates onto Cartesian model
//! coordinates and back. The globe owns exactly one projection and hands it
//! the reference [`Ellipsoid`] on every call.
//!
//! # Coordinate frame
//!
//! 3D projections use a right-handed frame in which:
//! - the Y axis is the polar axis, pointing north
//! - the Z axis passes through latitude 0, longitude 0
//! - the X axis passes through latitude 0, longitude 90°E
//!
//! 2D projections lay the map out in the XY plane with altitude along Z.
//!
//! # Offsets
//!
//! Every conversion takes an offset vector that translates the model origin.
//! Continuous 2D globes use it to draw repeated copies side by side.

mod equirectangular;
mod wgs84;

pub use equirectangular::ProjectionEquirectangular;
pub use wgs84::ProjectionWgs84;

use glam::DVec3;

use crate::coord::{Position, Sector};
use crate::globe::Ellipsoid;

/// Conversion between geographic and Cartesian coordinates.
pub trait Projection: Send + Sync + std::fmt::Debug {
    /// Human-readable projection name.
    fn display_name(&self) -> &str;

    /// Returns true for flat projections.
    fn is_2d(&self) -> bool;

    /// Returns true if the projection wraps seamlessly in longitude.
    fn continuous(&self) -> bool;

    /// Geographic extent the projection can represent.
    fn projection_limits(&self) -> Sector;

    /// Fingerprint used to detect projection changes.
    fn state_key(&self) -> String {
        format!("projection {} ", self.display_name().to_lowercase())
    }

    /// Converts a geographic position to a Cartesian point.
    fn geographic_to_cartesian(
        &self,
        ellipsoid: &Ellipsoid,
        latitude: f64,
        longitude: f64,
        altitude: f64,
        offset: DVec3,
    ) -> DVec3;

    /// Converts a regular grid of positions to Cartesian points.
    ///
    /// Rows run from the sector's minimum latitude to its maximum latitude and
    /// columns from west to east; the last row and column land exactly on the
    /// sector edges. Each point is expressed relative to `reference_point`.
    /// `elevations` and `result` must both hold `num_lat * num_lon` entries;
    /// callers validate this.
    #[allow(clippy::too_many_arguments)]
    fn geographic_to_cartesian_grid(
        &self,
        ellipsoid: &Ellipsoid,
        sector: &Sector,
        num_lat: usize,
        num_lon: usize,
        elevations: &[f64],
        reference_point: DVec3,
        offset: DVec3,
        result: &mut [DVec3],
    );

    /// Converts a Cartesian point to a geographic position.
    fn cartesian_to_geographic(&self, ellipsoid: &Ellipsoid, point: DVec3, offset: DVec3)
        -> Position;

    /// Unit surface normal at a location.
    fn surface_normal_at_location(&self, ellipsoid: &Ellipsoid, latitude: f64, longitude: f64)
        -> DVec3;

    /// Unit surface normal at a Cartesian point.
    fn surface_normal_at_point(&self, ellipsoid: &Ellipsoid, point: DVec3) -> DVec3;

    /// Unit vector tangent to the surface and pointing north at a location.
    fn north_tangent_at_location(&self, ellipsoid: &Ellipsoid, latitude: f64, longitude: f64)
        -> DVec3;

    /// Unit vector tangent to the surface and pointing north at a Cartesian point.
    fn north_tangent_at_point(&self, ellipsoid: &Ellipsoid, point: DVec3, offset: DVec3) -> DVec3;
}
