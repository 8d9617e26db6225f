//! Geodesy CLI commands.
//!
//! These commands only touch the globe's projection and ellipsoid; no
//! elevation tiles are requested.

use clap::{Args, Subcommand};
use globe_terrain::elevation::{default_data_dir, ElevationModelConfig};
use globe_terrain::geometry::Line;
use globe_terrain::globe::Globe;
use globe_terrain::provider::ProviderConfig;
use globe_terrain::DVec3;
use serde_json::{json, Value};

use super::common::{build_globe, parse_vector, ProjectionType, DEFAULT_TIMEOUT_SECS};
use crate::error::CliError;

/// Projection and offset shared by every geodesy subcommand.
#[derive(Debug, Clone, Args)]
pub struct ViewArgs {
    /// Projection used for conversions
    #[arg(long, value_enum, default_value_t = ProjectionType::Wgs84)]
    pub projection: ProjectionType,

    /// Horizontal globe offset, in globe widths (2D only)
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub offset: f64,
}

/// Geodesy subcommands.
#[derive(Debug, Subcommand)]
pub enum GeodesyAction {
    /// Cartesian point of a geographic position
    Point {
        /// Latitude in degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        /// Longitude in degrees
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        /// Altitude in meters
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        altitude: f64,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Geographic position of a Cartesian point given as x,y,z
    Position {
        #[arg(long, value_parser = parse_vector, allow_hyphen_values = true)]
        point: DVec3,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Radius, surface normal and north tangent at a location
    Surface {
        /// Latitude in degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        /// Longitude in degrees
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        lon: f64,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// First intersection of a ray with the globe surface
    Intersect {
        /// Ray origin as x,y,z
        #[arg(long, value_parser = parse_vector, allow_hyphen_values = true)]
        origin: DVec3,
        /// Ray direction as x,y,z
        #[arg(long, value_parser = parse_vector, allow_hyphen_values = true)]
        direction: DVec3,
        #[command(flatten)]
        view: ViewArgs,
    },
}

/// Run a geodesy subcommand.
pub fn run(action: GeodesyAction) -> Result<(), CliError> {
    let output = evaluate(action)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn evaluate(action: GeodesyAction) -> Result<Value, CliError> {
    let output = match action {
        GeodesyAction::Point {
            lat,
            lon,
            altitude,
            view,
        } => {
            let globe = open_globe(&view)?;
            json!({
                "projection": globe.projection().display_name(),
                "point": globe.compute_point_from_position(lat, lon, altitude),
            })
        }
        GeodesyAction::Position { point, view } => {
            let globe = open_globe(&view)?;
            json!({
                "projection": globe.projection().display_name(),
                "position": globe.compute_position_from_point(point.x, point.y, point.z),
            })
        }
        GeodesyAction::Surface { lat, lon, view } => {
            let globe = open_globe(&view)?;
            json!({
                "projection": globe.projection().display_name(),
                "radius": globe.radius_at(lat, lon),
                "normal": globe.surface_normal_at_location(lat, lon),
                "north_tangent": globe.north_tangent_at_location(lat, lon),
            })
        }
        GeodesyAction::Intersect {
            origin,
            direction,
            view,
        } => {
            let globe = open_globe(&view)?;
            let hit = globe.intersects_line(&Line::new(origin, direction));
            let position = hit.map(|p| globe.compute_position_from_point(p.x, p.y, p.z));
            json!({
                "projection": globe.projection().display_name(),
                "intersection": hit,
                "position": position,
            })
        }
    };
    Ok(output)
}

/// A globe whose elevation model is never queried.
fn open_globe(view: &ViewArgs) -> Result<Globe, CliError> {
    let mut globe = build_globe(
        ElevationModelConfig::earth(),
        &ProviderConfig::file(default_data_dir()),
        DEFAULT_TIMEOUT_SECS,
        view.projection,
    )?;
    globe.set_offset(view.offset);
    Ok(globe)
}

#[cfg(test)]
mod tests {
    use super::*;
    use globe_terrain::globe::WGS84_EQUATORIAL_RADIUS;

    fn view(projection: ProjectionType) -> ViewArgs {
        ViewArgs {
            projection,
            offset: 0.0,
        }
    }

    #[tokio::test]
    async fn test_point_on_equator() {
        let output = evaluate(GeodesyAction::Point {
            lat: 0.0,
            lon: 0.0,
            altitude: 0.0,
            view: view(ProjectionType::Wgs84),
        })
        .unwrap();

        let point = output["point"].as_array().unwrap();
        assert!(point[0].as_f64().unwrap().abs() < 1e-6);
        assert!(point[1].as_f64().unwrap().abs() < 1e-6);
        assert!((point[2].as_f64().unwrap() - WGS84_EQUATORIAL_RADIUS).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_intersect_miss_is_null() {
        let output = evaluate(GeodesyAction::Intersect {
            origin: DVec3::new(0.0, 0.0, 2.0 * WGS84_EQUATORIAL_RADIUS),
            direction: DVec3::Z,
            view: view(ProjectionType::Wgs84),
        })
        .unwrap();
        assert!(output["intersection"].is_null());
        assert!(output["position"].is_null());
    }

    #[tokio::test]
    async fn test_intersect_flat_map() {
        let output = evaluate(GeodesyAction::Intersect {
            origin: DVec3::new(1000.0, 2000.0, 500.0),
            direction: DVec3::new(0.0, 0.0, -1.0),
            view: view(ProjectionType::Equirectangular),
        })
        .unwrap();
        let hit = output["intersection"].as_array().unwrap();
        assert_eq!(hit[0].as_f64(), Some(1000.0));
        assert_eq!(hit[1].as_f64(), Some(2000.0));
        assert_eq!(hit[2].as_f64(), Some(0.0));
    }
}
