//! WGS84 ellipsoidal projection.
//!
//! The inverse conversion uses Vermeille's closed-form solution (Journal of
//! Geodesy, 2004), which needs no iteration and stays accurate from the
//! center of the earth out to orbital distances.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_6, SQRT_2};

use glam::DVec3;

use super::Projection;
use crate::coord::{grid_steps, Position, Sector};
use crate::globe::Ellipsoid;

/// 3D projection onto the reference ellipsoid.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectionWgs84;

impl ProjectionWgs84 {
    pub fn new() -> Self {
        Self
    }
}

impl Projection for ProjectionWgs84 {
    fn display_name(&self) -> &str {
        "WGS84"
    }

    fn is_2d(&self) -> bool {
        false
    }

    fn continuous(&self) -> bool {
        false
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
        let (sin_lat, cos_lat) = latitude.to_radians().sin_cos();
        let (sin_lon, cos_lon) = longitude.to_radians().sin_cos();
        let rpm = ellipsoid.prime_vertical_radius(sin_lat);
        let e2 = ellipsoid.eccentricity_squared;

        DVec3::new(
            (rpm + altitude) * cos_lat * sin_lon,
            (rpm * (1.0 - e2) + altitude) * sin_lat,
            (rpm + altitude) * cos_lat * cos_lon,
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
        let e2 = ellipsoid.eccentricity_squared;
        let origin = offset - reference_point;

        // Longitude terms repeat on every row.
        let lon_terms: Vec<(f64, f64)> =
            grid_steps(sector.min_longitude(), sector.max_longitude(), num_lon)
                .map(|lon| lon.to_radians().sin_cos())
                .collect();

        let mut index = 0;
        for lat in grid_steps(sector.min_latitude(), sector.max_latitude(), num_lat) {
            let (sin_lat, cos_lat) = lat.to_radians().sin_cos();
            let rpm = ellipsoid.prime_vertical_radius(sin_lat);

            for &(sin_lon, cos_lon) in &lon_terms {
                let elevation = elevations[index];
                result[index] = DVec3::new(
                    (rpm + elevation) * cos_lat * sin_lon,
                    (rpm * (1.0 - e2) + elevation) * sin_lat,
                    (rpm + elevation) * cos_lat * cos_lon,
                ) + origin;
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
        let local = point - offset;

        // Vermeille's frame puts the polar axis on Z.
        let x = local.z;
        let y = local.x;
        let z = local.y;

        let xx_p_yy = x * x + y * y;
        let sqrt_xx_p_yy = xx_p_yy.sqrt();
        let a = ellipsoid.equatorial_radius;
        let ra2 = 1.0 / (a * a);
        let e2 = ellipsoid.eccentricity_squared;
        let e4 = e2 * e2;

        let p = xx_p_yy * ra2;
        let q = z * z * (1.0 - e2) * ra2;
        let r = (p + q - e4) / 6.0;
        let evolute_border_test = 8.0 * r * r * r + e4 * p * q;

        let (phi, h) = if evolute_border_test > 0.0 || q != 0.0 {
            let u = if evolute_border_test > 0.0 {
                // Outside the evolute.
                let rad1 = evolute_border_test.sqrt();
                let rad2 = (e4 * p * q).sqrt();
                if evolute_border_test > 10.0 * e2 {
                    let rad3 = ((rad1 + rad2) * (rad1 + rad2)).cbrt();
                    r + 0.5 * rad3 + 2.0 * r * r / rad3
                } else {
                    r + 0.5 * ((rad1 + rad2) * (rad1 + rad2)).cbrt()
                        + 0.5 * ((rad1 - rad2) * (rad1 - rad2)).cbrt()
                }
            } else {
                // Inside the evolute, off the singular disc.
                let rad1 = (-evolute_border_test).sqrt();
                let rad2 = (-8.0 * r * r * r).sqrt();
                let rad3 = (e4 * p * q).sqrt();
                let atan = 2.0 * rad3.atan2(rad1 + rad2) / 3.0;
                -4.0 * r * atan.sin() * (FRAC_PI_6 + atan).cos()
            };

            let v = (u * u + e4 * q).sqrt();
            let w = e2 * (u + v - q) / (2.0 * v);
            let k = (u + v) / ((w * w + u + v).sqrt() + w);
            let d = k * sqrt_xx_p_yy / (k + e2);
            let sqrt_dd_p_zz = (d * d + z * z).sqrt();

            let h = (k + e2 - 1.0) * sqrt_dd_p_zz / k;
            let phi = 2.0 * z.atan2(sqrt_dd_p_zz + d);
            (phi, h)
        } else {
            // Singular disc in the equatorial plane.
            let rad1 = (1.0 - e2).sqrt();
            let rad2 = (e2 - p).sqrt();
            let e = e2.sqrt();

            let h = -a * rad1 * rad2 / e;
            let phi = 2.0 * (e4 - p).sqrt().atan2(e * rad2 + rad1 * p.sqrt());
            (phi, h)
        };

        let lambda = if (SQRT_2 - 1.0) * y < sqrt_xx_p_yy + x {
            // -135° < lambda < 135°
            2.0 * y.atan2(sqrt_xx_p_yy + x)
        } else if sqrt_xx_p_yy + y < (SQRT_2 + 1.0) * x {
            // -225° < lambda < 45°
            -FRAC_PI_2 + 2.0 * x.atan2(sqrt_xx_p_yy - y)
        } else {
            // -45° < lambda < 225°
            FRAC_PI_2 - 2.0 * x.atan2(sqrt_xx_p_yy + y)
        };

        Position::new(phi.to_degrees(), lambda.to_degrees(), h)
    }

    fn surface_normal_at_location(
        &self,
        _ellipsoid: &Ellipsoid,
        latitude: f64,
        longitude: f64,
    ) -> DVec3 {
        let (sin_lat, cos_lat) = latitude.to_radians().sin_cos();
        let (sin_lon, cos_lon) = longitude.to_radians().sin_cos();
        DVec3::new(cos_lat * sin_lon, sin_lat, cos_lat * cos_lon).normalize()
    }

    fn surface_normal_at_point(&self, ellipsoid: &Ellipsoid, point: DVec3) -> DVec3 {
        let a2 = ellipsoid.equatorial_radius * ellipsoid.equatorial_radius;
        let b2 = ellipsoid.polar_radius * ellipsoid.polar_radius;
        DVec3::new(point.x / a2, point.y / b2, point.z / a2).normalize()
    }

    fn north_tangent_at_location(
        &self,
        _ellipsoid: &Ellipsoid,
        latitude: f64,
        longitude: f64,
    ) -> DVec3 {
        let (sin_lat, cos_lat) = latitude.to_radians().sin_cos();
        let (sin_lon, cos_lon) = longitude.to_radians().sin_cos();
        DVec3::new(-sin_lat * sin_lon, cos_lat, -sin_lat * cos_lon).normalize()
    }

    fn north_tangent_at_point(&self, ellipsoid: &Ellipsoid, point: DVec3, offset: DVec3) -> DVec3 {
        let position = self.cartesian_to_geographic(ellipsoid, point, offset);
        self.north_tangent_at_location(ellipsoid, position.latitude, position.longitude)
    }
}
