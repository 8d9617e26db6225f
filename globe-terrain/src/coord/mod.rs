//! Geographic coordinate types
//!
//! Provides the [`Location`], [`Position`] and [`Sector`] value types shared by
//! the level hierarchy, the rasters and the globe, plus longitude wrapping for
//! continuous projections.

mod types;

pub use types::{CoordError, Location, Position, Sector, MAX_LAT, MAX_LON, MIN_LAT, MIN_LON};

/// Wraps a longitude into the half-open range `[-180, 180)`.
///
/// # Arguments
///
/// * `longitude` - Longitude in degrees, any finite value
///
/// # Returns
///
/// The equivalent longitude in `[-180, 180)`.
#[inline]
pub fn normalize_longitude(longitude: f64) -> f64 {
    (longitude - MIN_LON).rem_euclid(360.0) + MIN_LON
}

/// Yields the grid's latitudes or longitudes, pinning the last one to `max`.
pub(crate) fn grid_steps(min: f64, max: f64, count: usize) -> impl Iterator<Item = f64> {
    let delta = (max - min) / if count > 1 { (count - 1) as f64 } else { 1.0 };
    (0..count).map(move |i| if i + 1 == count { max } else { min + delta * i as f64 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_steps_pins_last_value() {
        let steps: Vec<f64> = grid_steps(0.0, 1.0, 4).collect();
        assert_eq!(steps.len(), 4);
        assert_eq!(steps[0], 0.0);
        assert_eq!(steps[3], 1.0);
        assert!((steps[1] - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_grid_steps_single_value_is_max() {
        let steps: Vec<f64> = grid_steps(10.0, 20.0, 1).collect();
        assert_eq!(steps, vec![20.0]);
    }

    #[test]
    fn test_normalize_longitude_wraps_east() {
        assert_eq!(normalize_longitude(200.0), -160.0);
    }

    #[test]
    fn test_normalize_longitude_wraps_west() {
        assert_eq!(normalize_longitude(-190.0), 170.0);
    }

    #[test]
    fn test_normalize_longitude_antimeridian_is_west() {
        assert_eq!(normalize_longitude(180.0), -180.0);
        assert_eq!(normalize_longitude(-180.0), -180.0);
    }

    #[test]
    fn test_normalize_longitude_identity_in_range() {
        assert_eq!(normalize_longitude(15.5), 15.5);
    }

    #[test]
    fn test_sector_rejects_inverted_latitude() {
        let result = Sector::new(10.0, 5.0, 0.0, 1.0);
        assert!(matches!(result, Err(CoordError::InvertedLatitude { .. })));
    }

    #[test]
    fn test_sector_rejects_inverted_longitude() {
        let result = Sector::new(0.0, 1.0, 20.0, 10.0);
        assert!(matches!(result, Err(CoordError::InvertedLongitude { .. })));
    }

    #[test]
    fn test_sector_rejects_nan() {
        assert_eq!(
            Sector::new(f64::NAN, 1.0, 0.0, 1.0),
            Err(CoordError::NonFiniteBounds)
        );
    }

    #[test]
    fn test_sector_deltas_and_centroid() {
        let sector = Sector::new(36.0, 38.0, 14.0, 16.0).unwrap();
        assert_eq!(sector.delta_latitude(), 2.0);
        assert_eq!(sector.delta_longitude(), 2.0);
        assert_eq!(sector.centroid(), Location::new(37.0, 15.0));
    }

    #[test]
    fn test_sector_contains_edges() {
        let sector = Sector::new(36.0, 38.0, 14.0, 16.0).unwrap();
        assert!(sector.contains_location(36.0, 14.0));
        assert!(sector.contains_location(38.0, 16.0));
        assert!(!sector.contains_location(38.1, 15.0));
    }

    #[test]
    fn test_sector_intersection() {
        let a = Sector::new(0.0, 10.0, 0.0, 10.0).unwrap();
        let b = Sector::new(5.0, 20.0, -5.0, 7.0).unwrap();
        let overlap = a.intersection(&b).unwrap();
        assert_eq!(overlap, Sector::new(5.0, 10.0, 0.0, 7.0).unwrap());
    }

    #[test]
    fn test_sector_disjoint_intersection_is_none() {
        let a = Sector::new(0.0, 10.0, 0.0, 10.0).unwrap();
        let b = Sector::new(20.0, 30.0, 0.0, 10.0).unwrap();
        assert!(a.intersection(&b).is_none());
    }

    #[test]
    fn test_full_sphere_bounds() {
        let sphere = Sector::FULL_SPHERE;
        assert_eq!(sphere.delta_latitude(), 180.0);
        assert_eq!(sphere.delta_longitude(), 360.0);
    }

    #[test]
    fn test_sector_serializes_to_json() {
        let sector = Sector::new(1.0, 2.0, 3.0, 4.0).unwrap();
        let json = serde_json::to_string(&sector).unwrap();
        assert!(json.contains("\"min_latitude\":1.0"));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn normalized_longitude_is_in_range(lon in -10_000.0f64..10_000.0) {
            let wrapped = normalize_longitude(lon);
            prop_assert!((-180.0..180.0).contains(&wrapped));
            let turns = (lon - wrapped) / 360.0;
            prop_assert!((turns - turns.round()).abs() < 1e-9);
        }
    }
}
