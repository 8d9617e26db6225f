//! Common types and utilities shared across CLI commands.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use globe_terrain::coord::Sector;
use globe_terrain::elevation::{default_data_dir, ElevationModel, ElevationModelConfig};
use globe_terrain::globe::Globe;
use globe_terrain::id::IdAllocator;
use globe_terrain::projection::{Projection, ProjectionEquirectangular, ProjectionWgs84};
use globe_terrain::provider::{AsyncReqwestClient, ProviderConfig, ProviderFactory};
use globe_terrain::DVec3;
use tokio::runtime::Handle;

use crate::error::CliError;

/// Default HTTP timeout for tile requests, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Elevation provider selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum ProviderType {
    /// NASA WorldWind Earth elevation WMS (no API key required)
    Wms,
    /// Static level/row/column tile server (requires --server)
    Rest,
    /// Local directory laid out like the tile cache
    File,
}

impl ProviderType {
    /// Convert to a ProviderConfig, requiring a server address for REST.
    pub fn to_config(
        self,
        server: Option<&str>,
        data_path: &str,
        data_dir: Option<&PathBuf>,
    ) -> Result<ProviderConfig, CliError> {
        match self {
            ProviderType::Wms => Ok(ProviderConfig::earth_wms()),
            ProviderType::Rest => {
                let server = server.ok_or_else(|| {
                    CliError::Config(
                        "REST provider requires a server address. \
                         Set server_address in [provider] or use --server"
                            .to_string(),
                    )
                })?;
                Ok(ProviderConfig::rest(server, data_path))
            }
            ProviderType::File => Ok(ProviderConfig::file(
                data_dir.cloned().unwrap_or_else(default_data_dir),
            )),
        }
    }
}

/// Projection selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Default)]
pub enum ProjectionType {
    /// Ellipsoidal 3D globe
    #[default]
    Wgs84,
    /// Flat plate carree map
    Equirectangular,
}

impl ProjectionType {
    pub fn build(self) -> Box<dyn Projection> {
        match self {
            ProjectionType::Wgs84 => Box::new(ProjectionWgs84::new()),
            ProjectionType::Equirectangular => Box::new(ProjectionEquirectangular::new()),
        }
    }
}

/// Arguments describing where elevations come from.
#[derive(Debug, Clone, Args)]
pub struct ModelArgs {
    /// INI file with an [elevation] section and an optional [provider] section
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Elevation provider; overrides the config file
    #[arg(long, value_enum)]
    pub provider: Option<ProviderType>,

    /// Server address for the REST provider
    #[arg(long)]
    pub server: Option<String>,

    /// Path on the REST server that holds the tiles
    #[arg(long, default_value = "")]
    pub data_path: String,

    /// Tile root for the file provider [default: user cache directory]
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// HTTP timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Maximum concurrent tile requests
    #[arg(long)]
    pub max_concurrent: Option<usize>,

    /// Answer from cached tiles only, without waiting for retrievals
    #[arg(long)]
    pub no_wait: bool,
}

impl ModelArgs {
    /// Resolve model and provider settings.
    ///
    /// The config file replaces the Earth defaults; CLI flags take precedence
    /// over both.
    pub fn resolve(&self) -> Result<(ElevationModelConfig, ProviderConfig), CliError> {
        let (mut model_config, file_provider) = match &self.config {
            Some(path) => (
                ElevationModelConfig::from_ini_file(path)?,
                ProviderConfig::from_ini_file(path)?,
            ),
            None => (ElevationModelConfig::earth(), None),
        };

        if let Some(max) = self.max_concurrent {
            model_config = model_config.with_max_concurrent_retrievals(max);
        }

        let provider_config = match self.provider {
            Some(provider) => provider.to_config(
                self.server.as_deref(),
                &self.data_path,
                self.data_dir.as_ref(),
            )?,
            None => file_provider.unwrap_or_default(),
        };

        Ok((model_config, provider_config))
    }
}

/// Build a globe backed by the configured elevation model.
///
/// Must be called from within the Tokio runtime.
pub fn build_globe(
    model_config: ElevationModelConfig,
    provider_config: &ProviderConfig,
    timeout_secs: u64,
    projection: ProjectionType,
) -> Result<Globe, CliError> {
    let handle = Handle::try_current().map_err(|e| CliError::Config(e.to_string()))?;
    let client = AsyncReqwestClient::with_timeout(timeout_secs)?;
    let provider = ProviderFactory::new(client).create(provider_config);

    let ids = IdAllocator::new();
    let model = ElevationModel::new(&ids, model_config, provider, handle)?;
    Ok(Globe::new(&ids, model, Some(projection.build())))
}

/// Parse a sector given as `min_lat,max_lat,min_lon,max_lon`.
pub fn parse_sector(s: &str) -> Result<Sector, String> {
    let values = parse_numbers(s, 4)?;
    Sector::new(values[0], values[1], values[2], values[3]).map_err(|e| e.to_string())
}

/// Parse a vector given as `x,y,z`.
pub fn parse_vector(s: &str) -> Result<DVec3, String> {
    let values = parse_numbers(s, 3)?;
    Ok(DVec3::new(values[0], values[1], values[2]))
}

fn parse_numbers(s: &str, count: usize) -> Result<Vec<f64>, String> {
    let values = s
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .map_err(|_| format!("'{}' is not a number", part.trim()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if values.len() != count {
        return Err(format!(
            "expected {} comma-separated values, got {}",
            count,
            values.len()
        ));
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn args() -> ModelArgs {
        ModelArgs {
            config: None,
            provider: None,
            server: None,
            data_path: String::new(),
            data_dir: None,
            timeout: DEFAULT_TIMEOUT_SECS,
            max_concurrent: None,
            no_wait: false,
        }
    }

    #[test]
    fn test_parse_sector() {
        let sector = parse_sector("-10, 10,20,40").unwrap();
        assert_eq!(sector.min_latitude(), -10.0);
        assert_eq!(sector.max_longitude(), 40.0);

        assert!(parse_sector("1,2,3").is_err());
        assert!(parse_sector("10,-10,0,1").is_err());
        assert!(parse_sector("a,b,c,d").is_err());
    }

    #[test]
    fn test_parse_vector() {
        assert_eq!(parse_vector("1,-2,3.5").unwrap(), DVec3::new(1.0, -2.0, 3.5));
        assert!(parse_vector("1,2").is_err());
    }

    #[test]
    fn test_rest_requires_server() {
        let result = ProviderType::Rest.to_config(None, "", None);
        assert!(matches!(result, Err(CliError::Config(_))));

        let config = ProviderType::Rest
            .to_config(Some("https://tiles.example.com"), "elev", None)
            .unwrap();
        assert_eq!(config, ProviderConfig::rest("https://tiles.example.com", "elev"));
    }

    #[test]
    fn test_file_provider_uses_data_dir() {
        let dir = PathBuf::from("/srv/tiles");
        let config = ProviderType::File.to_config(None, "", Some(&dir)).unwrap();
        assert_eq!(config, ProviderConfig::file("/srv/tiles"));

        let config = ProviderType::File.to_config(None, "", None).unwrap();
        assert_eq!(config, ProviderConfig::file(default_data_dir()));
    }

    #[test]
    fn test_resolve_defaults_to_earth_wms() {
        let (model, provider) = args().resolve().unwrap();
        assert_eq!(model, ElevationModelConfig::earth());
        assert_eq!(provider, ProviderConfig::earth_wms());
    }

    #[test]
    fn test_resolve_cli_overrides_config_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[elevation]\npreset = earth\nnum_levels = 4\n\n[provider]\ntype = file\nroot = /srv/tiles"
        )
        .unwrap();

        let mut args = args();
        args.config = Some(file.path().to_path_buf());
        let (model, provider) = args.resolve().unwrap();
        assert_eq!(model.num_levels, 4);
        assert_eq!(provider, ProviderConfig::file("/srv/tiles"));

        args.provider = Some(ProviderType::Wms);
        args.max_concurrent = Some(2);
        let (model, provider) = args.resolve().unwrap();
        assert_eq!(model.max_concurrent_retrievals, 2);
        assert_eq!(provider, ProviderConfig::earth_wms());
    }

    #[tokio::test]
    async fn test_build_globe() {
        let globe = build_globe(
            ElevationModelConfig::earth(),
            &ProviderConfig::file("/nonexistent"),
            5,
            ProjectionType::Equirectangular,
        )
        .unwrap();
        assert!(globe.is_2d());
        assert_eq!(globe.elevation_model().display_name(), "Earth Elevation Model");
    }
}
