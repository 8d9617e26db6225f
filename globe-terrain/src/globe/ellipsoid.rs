//! Reference ellipsoid parameters.

/// WGS84 equatorial radius in meters.
pub const WGS84_EQUATORIAL_RADIUS: f64 = 6_378_137.0;

/// WGS84 polar radius in meters.
pub const WGS84_POLAR_RADIUS: f64 = 6_356_752.3;

/// WGS84 first eccentricity squared.
pub const WGS84_ECCENTRICITY_SQUARED: f64 = 0.006_694_379_990_13;

/// An oblate ellipsoid of revolution about the Cartesian Y axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    pub equatorial_radius: f64,
    pub polar_radius: f64,
    pub eccentricity_squared: f64,
}

impl Ellipsoid {
    /// The WGS84 ellipsoid.
    pub const WGS84: Ellipsoid = Ellipsoid {
        equatorial_radius: WGS84_EQUATORIAL_RADIUS,
        polar_radius: WGS84_POLAR_RADIUS,
        eccentricity_squared: WGS84_ECCENTRICITY_SQUARED,
    };

    /// Radius of the largest sphere centered on the ellipsoid that it fits in.
    pub fn bounding_radius(&self) -> f64 {
        self.equatorial_radius.max(self.polar_radius)
    }

    /// Prime vertical radius of curvature at a latitude.
    #[inline]
    pub fn prime_vertical_radius(&self, sin_lat: f64) -> f64 {
        self.equatorial_radius / (1.0 - self.eccentricity_squared * sin_lat * sin_lat).sqrt()
    }

    /// Distance from the center to the surface at a latitude in degrees.
    ///
    /// Equals the equatorial radius at the equator and the polar radius at
    /// either pole.
    pub fn radius_at(&self, latitude: f64) -> f64 {
        let sin_lat = latitude.to_radians().sin();
        let e2 = self.eccentricity_squared;
        let rpm = self.prime_vertical_radius(sin_lat);
        rpm * (1.0 + (e2 * e2 - 2.0 * e2) * sin_lat * sin_lat).sqrt()
    }
}

impl Default for Ellipsoid {
    fn default() -> Self {
        Self::WGS84
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radius_at_equator() {
        assert_eq!(Ellipsoid::WGS84.radius_at(0.0), 6_378_137.0);
    }

    #[test]
    fn test_radius_at_poles() {
        let north = Ellipsoid::WGS84.radius_at(90.0);
        let south = Ellipsoid::WGS84.radius_at(-90.0);
        assert!((north - 6_356_752.31).abs() < 0.01);
        assert!((south - 6_356_752.31).abs() < 0.01);
    }

    #[test]
    fn test_radius_at_greenwich_latitude() {
        let radius = Ellipsoid::WGS84.radius_at(51.47);
        assert!((radius - 6_365_092.99).abs() < 0.01);
    }

    #[test]
    fn test_bounding_radius_is_equatorial() {
        assert_eq!(Ellipsoid::WGS84.bounding_radius(), WGS84_EQUATORIAL_RADIUS);
    }
}
