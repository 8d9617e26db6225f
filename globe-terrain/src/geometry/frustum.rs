use glam::DVec3;

use super::Plane;

/// A view frustum bounded by six inward-facing planes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    pub left: Plane,
    pub right: Plane,
    pub bottom: Plane,
    pub top: Plane,
    pub near: Plane,
    pub far: Plane,
}

impl Frustum {
    pub fn new(
        left: Plane,
        right: Plane,
        bottom: Plane,
        top: Plane,
        near: Plane,
        far: Plane,
    ) -> Self {
        Self {
            left,
            right,
            bottom,
            top,
            near,
            far,
        }
    }

    /// Axis-aligned box frustum spanning `min..=max` on every axis.
    ///
    /// Useful for orthographic views and for tests.
    pub fn from_box(min: DVec3, max: DVec3) -> Self {
        Self {
            left: Plane::new(DVec3::X, -min.x),
            right: Plane::new(DVec3::NEG_X, max.x),
            bottom: Plane::new(DVec3::Y, -min.y),
            top: Plane::new(DVec3::NEG_Y, max.y),
            near: Plane::new(DVec3::Z, -min.z),
            far: Plane::new(DVec3::NEG_Z, max.z),
        }
    }

    /// The six planes in near, far, left, right, top, bottom order.
    pub fn planes(&self) -> [&Plane; 6] {
        [
            &self.near,
            &self.far,
            &self.left,
            &self.right,
            &self.top,
            &self.bottom,
        ]
    }

    /// Returns true if the sphere is not wholly outside any plane.
    pub fn intersects_sphere(&self, center: DVec3, radius: f64) -> bool {
        self.planes()
            .iter()
            .all(|plane| plane.distance_to_point(center) >= -radius)
    }

    /// Returns true unless every point lies behind a single plane.
    pub fn intersects_points(&self, points: &[DVec3]) -> bool {
        !self.planes().iter().any(|plane| {
            points
                .iter()
                .all(|point| plane.distance_to_point(*point) < 0.0)
        })
    }
}
