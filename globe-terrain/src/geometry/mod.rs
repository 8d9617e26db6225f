//! Geometric primitives used by globe intersection tests.
//!
//! All vectors are Cartesian model coordinates in meters.

mod frustum;

pub use frustum::Frustum;

use glam::DVec3;

/// A ray described by an origin and a direction.
///
/// The direction need not be normalized; [`Line::point_at`] scales it by the
/// parameter as given.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub origin: DVec3,
    pub direction: DVec3,
}

impl Line {
    pub fn new(origin: DVec3, direction: DVec3) -> Self {
        Self { origin, direction }
    }

    /// Returns `origin + direction * t`.
    #[inline]
    pub fn point_at(&self, t: f64) -> DVec3 {
        self.origin + self.direction * t
    }
}

/// A plane in Hessian normal form: points `p` with `normal · p + distance = 0`.
///
/// The positive half-space is the side the normal points into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: DVec3,
    pub distance: f64,
}

impl Plane {
    pub fn new(normal: DVec3, distance: f64) -> Self {
        Self { normal, distance }
    }

    /// Signed distance from the plane to a point; negative behind the plane.
    #[inline]
    pub fn distance_to_point(&self, point: DVec3) -> f64 {
        self.normal.dot(point) + self.distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_at_scales_direction() {
        let line = Line::new(DVec3::new(2.0, 3.0, -1.0), DVec3::new(2.0, 3.0, 1.0));
        assert_eq!(line.point_at(1.0), DVec3::new(4.0, 6.0, 0.0));
        assert_eq!(line.point_at(0.0), line.origin);
    }

    #[test]
    fn test_plane_signed_distance() {
        let plane = Plane::new(DVec3::Z, -5.0);
        assert_eq!(plane.distance_to_point(DVec3::new(0.0, 0.0, 8.0)), 3.0);
        assert_eq!(plane.distance_to_point(DVec3::new(1.0, 1.0, 2.0)), -3.0);
    }
}
