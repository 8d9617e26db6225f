//! Elevation query CLI commands.
//!
//! Each query runs once to trigger tile retrievals, waits for them to
//! settle, and runs again so the answer reflects the loaded tiles. With
//! `--no-wait` the first answer is printed as-is.

use clap::Subcommand;
use globe_terrain::coord::Sector;
use globe_terrain::globe::Globe;
use serde_json::{json, Value};
use tracing::info;

use super::common::{build_globe, parse_sector, ModelArgs, ProjectionType};
use crate::error::CliError;

/// Elevation subcommands.
#[derive(Debug, Subcommand)]
pub enum ElevationAction {
    /// Elevation at a single location
    At {
        /// Latitude in degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        /// Longitude in degrees
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        #[command(flatten)]
        model: ModelArgs,
    },
    /// Elevations for a regular grid over a sector, rows south to north
    Grid {
        /// Sector as min_lat,max_lat,min_lon,max_lon
        #[arg(long, value_parser = parse_sector, allow_hyphen_values = true)]
        sector: Sector,
        /// Number of grid rows
        #[arg(long, default_value_t = 5)]
        num_lat: usize,
        /// Number of grid columns
        #[arg(long, default_value_t = 5)]
        num_lon: usize,
        /// Target texel size in degrees [default: grid spacing]
        #[arg(long)]
        resolution: Option<f64>,
        #[command(flatten)]
        model: ModelArgs,
    },
    /// Minimum and maximum elevation over a sector
    Extremes {
        /// Sector as min_lat,max_lat,min_lon,max_lon
        #[arg(long, value_parser = parse_sector, allow_hyphen_values = true)]
        sector: Sector,
        #[command(flatten)]
        model: ModelArgs,
    },
}

/// Run an elevation subcommand.
pub async fn run(action: ElevationAction) -> Result<(), CliError> {
    let output = match action {
        ElevationAction::At { lat, lon, model } => {
            let globe = open_globe(&model)?;
            let elevation = query(&globe, &model, |g| Ok(g.elevation_at_location(lat, lon))).await?;
            json!({
                "latitude": lat,
                "longitude": lon,
                "elevation": elevation,
                "timestamp": globe.elevation_timestamp(),
                "stats": globe.elevation_model().stats(),
            })
        }
        ElevationAction::Grid {
            sector,
            num_lat,
            num_lon,
            resolution,
            model,
        } => {
            let globe = open_globe(&model)?;
            let resolution = resolution.unwrap_or_else(|| grid_spacing(&sector, num_lat));
            let elevations = query(&globe, &model, |g| {
                let mut result = vec![0.0; num_lat * num_lon];
                g.elevations_for_grid(&sector, num_lat, num_lon, resolution, &mut result)?;
                Ok(result)
            })
            .await?;
            let rows: Vec<&[f64]> = elevations.chunks(num_lon).collect();
            json!({
                "sector": sector,
                "num_lat": num_lat,
                "num_lon": num_lon,
                "resolution": resolution,
                "rows": rows,
                "timestamp": globe.elevation_timestamp(),
                "stats": globe.elevation_model().stats(),
            })
        }
        ElevationAction::Extremes { sector, model } => {
            let globe = open_globe(&model)?;
            let [min, max] =
                query(&globe, &model, |g| Ok(g.min_and_max_elevations_for_sector(&sector))).await?;
            json!({
                "sector": sector,
                "min": min,
                "max": max,
                "timestamp": globe.elevation_timestamp(),
                "stats": globe.elevation_model().stats(),
            })
        }
    };

    print_json(&output)
}

fn open_globe(model: &ModelArgs) -> Result<Globe, CliError> {
    let (model_config, provider_config) = model.resolve()?;
    info!(
        model = %model_config.display_name,
        provider = provider_config.name(),
        "Opening elevation model"
    );
    build_globe(model_config, &provider_config, model.timeout, ProjectionType::default())
}

/// Run a query, wait for the tiles it requested, then run it again.
async fn query<T>(
    globe: &Globe,
    model: &ModelArgs,
    f: impl Fn(&Globe) -> Result<T, CliError>,
) -> Result<T, CliError> {
    let first = f(globe)?;
    if model.no_wait {
        return Ok(first);
    }
    globe.elevation_model().wait_for_retrievals().await;
    f(globe)
}

fn grid_spacing(sector: &Sector, num_lat: usize) -> f64 {
    sector.delta_latitude() / num_lat.saturating_sub(1).max(1) as f64
}

fn print_json(value: &Value) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use globe_terrain::elevation::ElevationModelConfig;
    use globe_terrain::provider::ProviderConfig;
    use tempfile::TempDir;

    #[test]
    fn test_grid_spacing() {
        let sector = Sector::new(10.0, 20.0, 0.0, 10.0).unwrap();
        assert_eq!(grid_spacing(&sector, 11), 1.0);
        assert_eq!(grid_spacing(&sector, 1), 10.0);
        assert_eq!(grid_spacing(&sector, 0), 10.0);
    }

    #[tokio::test]
    async fn test_query_with_missing_tiles_returns_zero() {
        let dir = TempDir::new().unwrap();
        let globe = build_globe(
            ElevationModelConfig::earth(),
            &ProviderConfig::file(dir.path()),
            5,
            ProjectionType::Wgs84,
        )
        .unwrap();
        let model = ModelArgs {
            config: None,
            provider: None,
            server: None,
            data_path: String::new(),
            data_dir: None,
            timeout: 5,
            max_concurrent: None,
            no_wait: false,
        };

        let elevation = query(&globe, &model, |g| Ok(g.elevation_at_location(46.5, 7.9)))
            .await
            .unwrap();
        assert_eq!(elevation, 0.0);

        globe.elevation_model().wait_for_retrievals().await;
        let stats = globe.elevation_model().stats();
        assert!(stats.issued >= 1);
        assert_eq!(stats.completed, 0);
        assert_eq!(stats.failed, stats.issued);
    }
}
