//! Geographic value types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum valid latitude in degrees.
pub const MIN_LAT: f64 = -90.0;

/// Maximum valid latitude in degrees.
pub const MAX_LAT: f64 = 90.0;

/// Minimum valid longitude in degrees.
pub const MIN_LON: f64 = -180.0;

/// Maximum valid longitude in degrees.
pub const MAX_LON: f64 = 180.0;

/// Errors produced when building geographic values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordError {
    /// A sector bound was NaN or infinite.
    #[error("Sector bounds must be finite")]
    NonFiniteBounds,

    /// The minimum latitude exceeds the maximum latitude.
    #[error("Sector minimum latitude {min} exceeds maximum {max}")]
    InvertedLatitude { min: f64, max: f64 },

    /// The minimum longitude exceeds the maximum longitude.
    #[error("Sector minimum longitude {min} exceeds maximum {max}")]
    InvertedLongitude { min: f64, max: f64 },
}

/// A geographic location in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A geographic location with an altitude in meters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

impl Position {
    pub const fn new(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
        }
    }

    /// Drops the altitude.
    pub fn location(&self) -> Location {
        Location::new(self.latitude, self.longitude)
    }
}

/// A geographic bounding box in degrees.
///
/// The minimum is always less than or equal to the maximum on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    min_latitude: f64,
    max_latitude: f64,
    min_longitude: f64,
    max_longitude: f64,
}

impl Sector {
    /// The entire globe.
    pub const FULL_SPHERE: Sector = Sector {
        min_latitude: MIN_LAT,
        max_latitude: MAX_LAT,
        min_longitude: MIN_LON,
        max_longitude: MAX_LON,
    };

    /// Creates a sector, validating that each minimum does not exceed its maximum.
    ///
    /// # Arguments
    ///
    /// * `min_latitude` - Southern edge in degrees
    /// * `max_latitude` - Northern edge in degrees
    /// * `min_longitude` - Western edge in degrees
    /// * `max_longitude` - Eastern edge in degrees
    pub fn new(
        min_latitude: f64,
        max_latitude: f64,
        min_longitude: f64,
        max_longitude: f64,
    ) -> Result<Self, CoordError> {
        let bounds = [min_latitude, max_latitude, min_longitude, max_longitude];
        if bounds.iter().any(|v| !v.is_finite()) {
            return Err(CoordError::NonFiniteBounds);
        }
        if min_latitude > max_latitude {
            return Err(CoordError::InvertedLatitude {
                min: min_latitude,
                max: max_latitude,
            });
        }
        if min_longitude > max_longitude {
            return Err(CoordError::InvertedLongitude {
                min: min_longitude,
                max: max_longitude,
            });
        }

        Ok(Self {
            min_latitude,
            max_latitude,
            min_longitude,
            max_longitude,
        })
    }

    /// Builds a sector from bounds the caller already knows are ordered.
    pub(crate) const fn new_unchecked(
        min_latitude: f64,
        max_latitude: f64,
        min_longitude: f64,
        max_longitude: f64,
    ) -> Self {
        Self {
            min_latitude,
            max_latitude,
            min_longitude,
            max_longitude,
        }
    }

    pub fn min_latitude(&self) -> f64 {
        self.min_latitude
    }

    pub fn max_latitude(&self) -> f64 {
        self.max_latitude
    }

    pub fn min_longitude(&self) -> f64 {
        self.min_longitude
    }

    pub fn max_longitude(&self) -> f64 {
        self.max_longitude
    }

    /// Angular height of the sector in degrees.
    pub fn delta_latitude(&self) -> f64 {
        self.max_latitude - self.min_latitude
    }

    /// Angular width of the sector in degrees.
    pub fn delta_longitude(&self) -> f64 {
        self.max_longitude - self.min_longitude
    }

    /// Returns the sector's center.
    pub fn centroid(&self) -> Location {
        Location::new(
            0.5 * (self.min_latitude + self.max_latitude),
            0.5 * (self.min_longitude + self.max_longitude),
        )
    }

    /// Returns true if the location lies inside the sector or on its edges.
    pub fn contains_location(&self, latitude: f64, longitude: f64) -> bool {
        latitude >= self.min_latitude
            && latitude <= self.max_latitude
            && longitude >= self.min_longitude
            && longitude <= self.max_longitude
    }

    /// Returns true if the two sectors overlap or share an edge.
    pub fn intersects(&self, other: &Sector) -> bool {
        self.min_longitude <= other.max_longitude
            && self.max_longitude >= other.min_longitude
            && self.min_latitude <= other.max_latitude
            && self.max_latitude >= other.min_latitude
    }

    /// Returns the overlapping region, or `None` when the sectors are disjoint.
    pub fn intersection(&self, other: &Sector) -> Option<Sector> {
        if !self.intersects(other) {
            return None;
        }
        Some(Sector {
            min_latitude: self.min_latitude.max(other.min_latitude),
            max_latitude: self.max_latitude.min(other.max_latitude),
            min_longitude: self.min_longitude.max(other.min_longitude),
            max_longitude: self.max_longitude.min(other.max_longitude),
        })
    }
}

impl Default for Sector {
    fn default() -> Self {
        Self::FULL_SPHERE
    }
}

impl std::fmt::Display for Sector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({}, {}) - ({}, {})",
            self.min_latitude, self.min_longitude, self.max_latitude, self.max_longitude
        )
    }
}
