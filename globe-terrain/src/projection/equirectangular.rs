//! Flat plate carrée projection.

use glam::DVec3;

use super::Projection;
use crate::coord::{grid_steps, Position, Sector};
use crate::globe::Ellipsoid;

/// 2D projection that maps degrees linearly onto the XY plane.
///
/// One degree spans the same arc length on both axes, measured along the
/// equator. Altitude becomes the Z coordinate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectionEquirectangular;

impl ProjectionEquirectangular {
    pub fn new() -> Self {
        Self
    }
}

impl Projection for ProjectionEquirectangular {
    fn display_name(&self) -> &str {
        "Equirectangular"
    }

    fn is_2d(&self) -> bool {
        true
    }

    fn continuous(&self) -> bool {
        true
    }

    fn projection_limits(&self) -> Sector {
        Sector::FULL_SPHERE
    }

    fn geographic_to_cartesian(
        &self,
        ellipsoid: &Ellipsoid,
        latitude: f64,
        longitude: f64,
        altitude: f64,
        offset: DVec3,
    ) -> DVec3 {
        let a = ellipsoid.equatorial_radius;
        DVec3::new(
            a * longitude.to_radians(),
            a * latitude.to_radians(),
            altitude,
        ) + offset
    }

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
    ) {
        let a = ellipsoid.equatorial_radius;
        let origin = offset - reference_point;
        let xs: Vec<f64> = grid_steps(sector.min_longitude(), sector.max_longitude(), num_lon)
            .map(|lon| a * lon.to_radians())
            .collect();

        let mut index = 0;
        for lat in grid_steps(sector.min_latitude(), sector.max_latitude(), num_lat) {
            let y = a * lat.to_radians();
            for &x in &xs {
                result[index] = DVec3::new(x, y, elevations[index]) + origin;
                index += 1;
            }
        }
    }

    fn cartesian_to_geographic(
        &self,
        ellipsoid: &Ellipsoid,
        point: DVec3,
        offset: DVec3,
    ) -> Position {
        let a = ellipsoid.equatorial_radius;
        let local = point - offset;
        Position::new(
            (local.y / a).to_degrees(),
            (local.x / a).to_degrees(),
            local.z,
        )
    }

    fn surface_normal_at_location(&self, _: &Ellipsoid, _: f64, _: f64) -> DVec3 {
        DVec3::Z
    }

    fn surface_normal_at_point(&self, _: &Ellipsoid, _: DVec3) -> DVec3 {
        DVec3::Z
    }

    fn north_tangent_at_location(&self, _: &Ellipsoid, _: f64, _: f64) -> DVec3 {
        DVec3::Y
    }

    fn north_tangent_at_point(&self, _: &Ellipsoid, _: DVec3, _: DVec3) -> DVec3 {
        DVec3::Y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_and_inverse() {
        let p = ProjectionEquirectangular;
        let e = Ellipsoid::WGS84;
        let point = p.geographic_to_cartesian(&e, 45.0, 90.0, 12.0, DVec3::ZERO);
        let quarter = e.equatorial_radius * std::f64::consts::FRAC_PI_2;
        assert!((point.x - quarter).abs() < 1e-6);
        assert!((point.y - quarter / 2.0).abs() < 1e-6);
        assert_eq!(point.z, 12.0);

        let position = p.cartesian_to_geographic(&e, point, DVec3::ZERO);
        assert!((position.latitude - 45.0).abs() < 1e-9);
        assert!((position.longitude - 90.0).abs() < 1e-9);
        assert_eq!(position.altitude, 12.0);
    }

    #[test]
    fn test_offset_shifts_x() {
        let p = ProjectionEquirectangular;
        let e = Ellipsoid::WGS84;
        let offset = DVec3::new(1000.0, 0.0, 0.0);
        let point = p.geographic_to_cartesian(&e, 0.0, 0.0, 0.0, offset);
        assert_eq!(point, offset);
        assert_eq!(p.cartesian_to_geographic(&e, point, offset).longitude, 0.0);
    }

    #[test]
    fn test_grid_puts_elevation_on_z() {
        let p = ProjectionEquirectangular;
        let e = Ellipsoid::WGS84;
        let sector = Sector::new(0.0, 1.0, 0.0, 1.0).unwrap();
        let elevations = [1.0, 2.0, 3.0, 4.0];
        let mut result = [DVec3::ZERO; 4];
        p.geographic_to_cartesian_grid(
            &e,
            &sector,
            2,
            2,
            &elevations,
            DVec3::ZERO,
            DVec3::ZERO,
            &mut result,
        );
        assert_eq!(result.map(|v| v.z), [1.0, 2.0, 3.0, 4.0]);
        assert_eq!(result[0].y, 0.0);
        assert!(result[3].y > 0.0);
    }

    #[test]
    fn test_normals_are_constant() {
        let p = ProjectionEquirectangular;
        let e = Ellipsoid::WGS84;
        assert_eq!(p.surface_normal_at_location(&e, 10.0, 20.0), DVec3::Z);
        assert_eq!(p.north_tangent_at_point(&e, DVec3::ONE, DVec3::ZERO), DVec3::Y);
    }
}
