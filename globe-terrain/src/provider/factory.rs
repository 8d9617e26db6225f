//! Provider configuration and construction.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ini::Ini;

use super::file::FileProvider;
use super::http::AsyncHttpClient;
use super::remote::RemoteProvider;
use super::types::ElevationProvider;
use super::url::{LevelRowColumnUrlBuilder, WmsUrlBuilder, EARTH_WMS_ADDRESS, EARTH_WMS_LAYERS};
use crate::error::ConfigError;

/// INI section holding provider settings.
pub const PROVIDER_SECTION: &str = "provider";

/// Which tile source to use and how to reach it.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderConfig {
    /// OGC WMS `GetMap` service.
    Wms {
        service_address: String,
        layers: String,
        styles: String,
        version: String,
    },
    /// Static server using the level/row/column layout.
    Rest {
        server_address: String,
        path_to_data: String,
    },
    /// Local directory using the cache layout.
    File { root: PathBuf },
}

impl ProviderConfig {
    /// The NASA WorldWind Earth elevation WMS.
    pub fn earth_wms() -> Self {
        ProviderConfig::Wms {
            service_address: EARTH_WMS_ADDRESS.to_string(),
            layers: EARTH_WMS_LAYERS.to_string(),
            styles: String::new(),
            version: "1.3.0".to_string(),
        }
    }

    pub fn rest(server_address: impl Into<String>, path_to_data: impl Into<String>) -> Self {
        ProviderConfig::Rest {
            server_address: server_address.into(),
            path_to_data: path_to_data.into(),
        }
    }

    pub fn file(root: impl Into<PathBuf>) -> Self {
        ProviderConfig::File { root: root.into() }
    }

    /// Short provider type name.
    pub fn name(&self) -> &'static str {
        match self {
            ProviderConfig::Wms { .. } => "wms",
            ProviderConfig::Rest { .. } => "rest",
            ProviderConfig::File { .. } => "file",
        }
    }

    /// Reads the `[provider]` section of an INI file.
    pub fn from_ini_file(path: impl AsRef<Path>) -> Result<Option<Self>, ConfigError> {
        let ini = Ini::load_from_file(path.as_ref())?;
        Self::from_ini(&ini)
    }

    /// Reads the `[provider]` section of an INI document.
    ///
    /// ```ini
    /// [provider]
    /// type = rest
    /// server_address = https://tiles.example.com
    /// path_to_data = earth/elevation
    /// ```
    ///
    /// Returns `Ok(None)` when the section is absent.
    pub fn from_ini(ini: &Ini) -> Result<Option<Self>, ConfigError> {
        let Some(section) = ini.section(Some(PROVIDER_SECTION)) else {
            return Ok(None);
        };
        let required = |key: &str| {
            section
                .get(key)
                .map(str::to_string)
                .ok_or_else(|| ConfigError::MissingField(format!("{}.{}", PROVIDER_SECTION, key)))
        };

        let provider_type = required("type")?;
        let config = match provider_type.to_ascii_lowercase().as_str() {
            "wms" => ProviderConfig::Wms {
                service_address: section
                    .get("service_address")
                    .unwrap_or(EARTH_WMS_ADDRESS)
                    .to_string(),
                layers: section.get("layers").unwrap_or(EARTH_WMS_LAYERS).to_string(),
                styles: section.get("styles").unwrap_or_default().to_string(),
                version: section.get("version").unwrap_or("1.3.0").to_string(),
            },
            "rest" => ProviderConfig::Rest {
                server_address: required("server_address")?,
                path_to_data: section.get("path_to_data").unwrap_or_default().to_string(),
            },
            "file" => ProviderConfig::File {
                root: PathBuf::from(required("root")?),
            },
            _ => {
                return Err(ConfigError::InvalidValue {
                    field: format!("{}.type", PROVIDER_SECTION),
                    value: provider_type,
                })
            }
        };
        Ok(Some(config))
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::earth_wms()
    }
}

/// Builds providers from configuration, sharing one HTTP client.
pub struct ProviderFactory<C: AsyncHttpClient + Clone + 'static> {
    http_client: C,
}

impl<C: AsyncHttpClient + Clone + 'static> ProviderFactory<C> {
    pub fn new(http_client: C) -> Self {
        Self { http_client }
    }

    /// Creates the provider described by `config`.
    pub fn create(&self, config: &ProviderConfig) -> Arc<dyn ElevationProvider> {
        match config {
            ProviderConfig::Wms {
                service_address,
                layers,
                styles,
                version,
            } => Arc::new(RemoteProvider::new(
                "wms",
                self.http_client.clone(),
                WmsUrlBuilder::new(service_address.clone(), layers.clone())
                    .with_styles(styles.clone())
                    .with_version(version.clone()),
            )),
            ProviderConfig::Rest {
                server_address,
                path_to_data,
            } => Arc::new(RemoteProvider::new(
                "rest",
                self.http_client.clone(),
                LevelRowColumnUrlBuilder::new(server_address.clone(), path_to_data.clone()),
            )),
            ProviderConfig::File { root } => Arc::new(FileProvider::new(root.clone())),
        }
    }
}
