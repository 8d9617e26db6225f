//! Globe geometry
//!
//! A [`Globe`] pairs one [`ElevationModel`] with one [`Projection`] over the
//! WGS84 [`Ellipsoid`]. It is the entry point renderers and pickers use for
//! coordinate conversion, surface normals, ray intersection, visibility tests
//! and elevation queries.
//!
//! # State key
//!
//! [`Globe::state_key`] changes whenever anything that affects rendered
//! geometry changes: newly loaded elevation tiles, the offset, or the
//! projection. Renderers use it to invalidate cached tessellations.

mod ellipsoid;

pub use ellipsoid::{
    Ellipsoid, WGS84_ECCENTRICITY_SQUARED, WGS84_EQUATORIAL_RADIUS, WGS84_POLAR_RADIUS,
};

use std::f64::consts::PI;

use glam::DVec3;
use tracing::debug;

use crate::coord::{normalize_longitude, Position, Sector};
use crate::elevation::ElevationModel;
use crate::error::{validate_buffer, validate_grid, ArgumentError};
use crate::geometry::{Frustum, Line};
use crate::id::IdAllocator;
use crate::projection::{Projection, ProjectionWgs84};

/// A planet: ellipsoid, projection and terrain.
#[derive(Debug)]
pub struct Globe {
    id: u64,
    elevation_model: ElevationModel,
    projection: Box<dyn Projection>,
    ellipsoid: Ellipsoid,
    offset: f64,
    offset_vector: DVec3,
}

impl Globe {
    /// Creates a globe.
    ///
    /// # Arguments
    ///
    /// * `ids` - Allocator for the globe's identifier
    /// * `elevation_model` - Terrain source, owned by the globe
    /// * `projection` - Projection to use; WGS84 when `None`
    pub fn new(
        ids: &IdAllocator,
        elevation_model: ElevationModel,
        projection: Option<Box<dyn Projection>>,
    ) -> Self {
        let projection = projection.unwrap_or_else(|| Box::new(ProjectionWgs84::new()));
        let id = ids.next_id();
        debug!(
            id,
            projection = projection.display_name(),
            elevation_model = elevation_model.id(),
            "Globe created"
        );

        Self {
            id,
            elevation_model,
            projection,
            ellipsoid: Ellipsoid::WGS84,
            offset: 0.0,
            offset_vector: DVec3::ZERO,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Key identifying the globe's current geometry.
    ///
    /// `"globe <id> elevationModel <id> timestamp <ts> offset <offset> projection <name> "`
    pub fn state_key(&self) -> String {
        format!(
            "globe {} {}offset {} {}",
            self.id,
            self.elevation_model.state_key(),
            self.offset,
            self.projection.state_key()
        )
    }

    // Projection

    pub fn projection(&self) -> &dyn Projection {
        self.projection.as_ref()
    }

    pub fn set_projection(&mut self, projection: Box<dyn Projection>) {
        debug!(globe = self.id, projection = projection.display_name(), "Projection changed");
        self.projection = projection;
    }

    pub fn is_2d(&self) -> bool {
        self.projection.is_2d()
    }

    /// Whether the projection repeats horizontally.
    pub fn continuous(&self) -> bool {
        self.projection.continuous()
    }

    pub fn projection_limits(&self) -> Sector {
        self.projection.projection_limits()
    }

    // Ellipsoid

    pub fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }

    pub fn equatorial_radius(&self) -> f64 {
        self.ellipsoid.equatorial_radius
    }

    pub fn polar_radius(&self) -> f64 {
        self.ellipsoid.polar_radius
    }

    pub fn eccentricity_squared(&self) -> f64 {
        self.ellipsoid.eccentricity_squared
    }

    /// Distance from the center to the surface at a location.
    ///
    /// Depends on latitude only.
    pub fn radius_at(&self, latitude: f64, _longitude: f64) -> f64 {
        self.ellipsoid.radius_at(latitude)
    }

    // Offset

    /// Number of globe widths the model is shifted along X.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Shifts the model by whole globe widths, `offset * 2 * PI * a` along X.
    pub fn set_offset(&mut self, offset: f64) {
        self.offset = offset;
        self.offset_vector = DVec3::new(offset * 2.0 * PI * self.ellipsoid.equatorial_radius, 0.0, 0.0);
    }

    pub fn offset_vector(&self) -> DVec3 {
        self.offset_vector
    }

    // Conversions

    /// Model coordinates of a geographic position.
    pub fn compute_point_from_position(&self, latitude: f64, longitude: f64, altitude: f64) -> DVec3 {
        self.projection.geographic_to_cartesian(
            &self.ellipsoid,
            latitude,
            longitude,
            altitude,
            self.offset_vector,
        )
    }

    /// Model coordinates of a location on the ellipsoid surface.
    pub fn compute_point_from_location(&self, latitude: f64, longitude: f64) -> DVec3 {
        self.compute_point_from_position(latitude, longitude, 0.0)
    }

    /// Model coordinates for a grid of positions, relative to a reference point.
    ///
    /// The grid layout matches [`ElevationModel::elevations_for_grid`]: rows
    /// from the sector's minimum latitude northward, columns west to east.
    ///
    /// # Errors
    ///
    /// Returns `ArgumentError` if a count is zero or either slice holds fewer
    /// than `num_lat * num_lon` values.
    pub fn compute_points_for_grid(
        &self,
        sector: &Sector,
        num_lat: usize,
        num_lon: usize,
        elevations: &[f64],
        reference_point: DVec3,
        result: &mut [DVec3],
    ) -> Result<(), ArgumentError> {
        let cells = validate_grid(num_lat, num_lon)?;
        validate_buffer("elevations", elevations.len(), cells)?;
        validate_buffer("result", result.len(), cells)?;

        self.projection.geographic_to_cartesian_grid(
            &self.ellipsoid,
            sector,
            num_lat,
            num_lon,
            elevations,
            reference_point,
            self.offset_vector,
            result,
        );
        Ok(())
    }

    /// Geographic position of a point in model coordinates.
    ///
    /// Continuous projections wrap the longitude into `[-180, 180)`.
    pub fn compute_position_from_point(&self, x: f64, y: f64, z: f64) -> Position {
        let mut position = self.projection.cartesian_to_geographic(
            &self.ellipsoid,
            DVec3::new(x, y, z),
            self.offset_vector,
        );
        if self.projection.continuous() {
            position.longitude = normalize_longitude(position.longitude);
        }
        position
    }

    // Normals and tangents

    /// Unit surface normal at a location.
    pub fn surface_normal_at_location(&self, latitude: f64, longitude: f64) -> DVec3 {
        if self.is_2d() {
            return DVec3::Z;
        }
        self.projection
            .surface_normal_at_location(&self.ellipsoid, latitude, longitude)
    }

    /// Unit surface normal below a point in model coordinates.
    pub fn surface_normal_at_point(&self, point: DVec3) -> DVec3 {
        if self.is_2d() {
            return DVec3::Z;
        }
        self.projection
            .surface_normal_at_point(&self.ellipsoid, point - self.offset_vector)
    }

    /// Unit vector tangent to the surface and pointing north at a location.
    pub fn north_tangent_at_location(&self, latitude: f64, longitude: f64) -> DVec3 {
        self.projection
            .north_tangent_at_location(&self.ellipsoid, latitude, longitude)
    }

    /// Unit north tangent below a point in model coordinates.
    pub fn north_tangent_at_point(&self, point: DVec3) -> DVec3 {
        self.projection
            .north_tangent_at_point(&self.ellipsoid, point, self.offset_vector)
    }

    // Visibility and picking

    /// Whether any part of the globe may be inside a frustum.
    ///
    /// 3D globes test their bounding sphere. 2D globes test the box spanned
    /// by the projection limits between the model's minimum and maximum
    /// elevations.
    pub fn intersects_frustum(&self, frustum: &Frustum) -> bool {
        if self.is_2d() {
            let limits = self.projection_limits();
            let min_elevation = self.elevation_model.min_elevation();
            let max_elevation = self.elevation_model.max_elevation();

            let mut corners = [DVec3::ZERO; 8];
            let positions = [limits.min_latitude(), limits.max_latitude()]
                .into_iter()
                .flat_map(|lat| {
                    [limits.min_longitude(), limits.max_longitude()]
                        .into_iter()
                        .map(move |lon| (lat, lon))
                })
                .flat_map(|(lat, lon)| [min_elevation, max_elevation].map(|alt| (lat, lon, alt)));
            for (corner, (lat, lon, alt)) in corners.iter_mut().zip(positions) {
                *corner = self.compute_point_from_position(lat, lon, alt);
            }
            frustum.intersects_points(&corners)
        } else {
            frustum.intersects_sphere(self.offset_vector, self.ellipsoid.bounding_radius())
        }
    }

    /// First intersection of a line with the globe surface.
    ///
    /// 2D globes intersect the `z = 0` plane; 3D globes intersect the
    /// ellipsoid. Only intersections in front of the line origin count.
    pub fn intersects_line(&self, line: &Line) -> Option<DVec3> {
        if self.is_2d() {
            intersect_plane_z0(line)
        } else {
            self.intersect_ellipsoid(line)
        }
    }

    fn intersect_ellipsoid(&self, line: &Line) -> Option<DVec3> {
        let v = line.direction;
        let s = line.origin - self.offset_vector;

        // Scale Y so the ellipsoid becomes a sphere of the equatorial radius.
        let m = self.ellipsoid.equatorial_radius / self.ellipsoid.polar_radius;
        let m2 = m * m;
        let r2 = self.ellipsoid.equatorial_radius * self.ellipsoid.equatorial_radius;

        let a = v.x * v.x + m2 * v.y * v.y + v.z * v.z;
        let b = 2.0 * (s.x * v.x + m2 * s.y * v.y + s.z * v.z);
        let c = s.x * s.x + m2 * s.y * s.y + s.z * s.z - r2;
        let discriminant = b * b - 4.0 * a * c;
        if a == 0.0 || discriminant < 0.0 {
            return None;
        }

        let root = discriminant.sqrt();
        [(-b - root) / (2.0 * a), (-b + root) / (2.0 * a)]
            .into_iter()
            .find(|&t| t > 0.0)
            .map(|t| line.point_at(t))
    }

    // Elevations

    pub fn elevation_model(&self) -> &ElevationModel {
        &self.elevation_model
    }

    pub fn elevation_timestamp(&self) -> u64 {
        self.elevation_model.timestamp()
    }

    pub fn min_elevation(&self) -> f64 {
        self.elevation_model.min_elevation()
    }

    pub fn max_elevation(&self) -> f64 {
        self.elevation_model.max_elevation()
    }

    pub fn elevation_at_location(&self, latitude: f64, longitude: f64) -> f64 {
        self.elevation_model.elevation_at_location(latitude, longitude)
    }

    pub fn min_and_max_elevations_for_sector(&self, sector: &Sector) -> [f64; 2] {
        self.elevation_model.min_and_max_elevations_for_sector(sector)
    }

    /// See [`ElevationModel::elevations_for_grid`].
    pub fn elevations_for_grid(
        &self,
        sector: &Sector,
        num_lat: usize,
        num_lon: usize,
        target_resolution: f64,
        result: &mut [f64],
    ) -> Result<(), ArgumentError> {
        self.elevation_model
            .elevations_for_grid(sector, num_lat, num_lon, target_resolution, result)
    }
}

fn intersect_plane_z0(line: &Line) -> Option<DVec3> {
    let vz = line.direction.z;
    let sz = line.origin.z;

    if vz == 0.0 {
        // Parallel: coincident lines touch the plane at their origin.
        return (sz == 0.0).then_some(line.origin);
    }

    let t = -sz / vz;
    (t >= 0.0).then(|| line.point_at(t))
}
