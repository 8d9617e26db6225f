//! Tile URL construction for remote elevation services.
//!
//! # WMS
//!
//! `{service}?service=WMS&request=GetMap&version={v}&transparent=TRUE&layers={l}&styles={s}&format={mime}&width={w}&height={h}&crs=EPSG:4326&bbox={minLat},{minLon},{maxLat},{maxLon}`
//!
//! WMS 1.3.0 with EPSG:4326 orders the bounding box latitude first. Earlier
//! versions use `srs=` and longitude-first boxes.
//!
//! # Level/row/column
//!
//! `{server}/{path}/{level}/{row}/{row}_{column}.{ext}`
//!
//! The layout mirrors the local cache, so a static file server exposing a
//! populated cache directory works as a source.

use super::types::TileRequest;

/// NASA WorldWind elevation WMS endpoint.
pub const EARTH_WMS_ADDRESS: &str = "https://worldwind26.arc.nasa.gov/elev";

/// Layers combined by the Earth elevation WMS.
pub const EARTH_WMS_LAYERS: &str = "GEBCO,aster_v2,USGS-NED";

/// Coordinate reference system for geographic WMS requests.
const WMS_CRS: &str = "EPSG:4326";

/// Builds the URL for one tile.
pub trait UrlBuilder: Send + Sync {
    fn url_for_tile(&self, request: &TileRequest) -> String;
}

/// URL builder for OGC Web Map Service `GetMap` requests.
#[derive(Debug, Clone, PartialEq)]
pub struct WmsUrlBuilder {
    service_address: String,
    layer_names: String,
    style_names: String,
    wms_version: String,
    transparent: bool,
}

impl WmsUrlBuilder {
    /// Creates a WMS 1.3.0 builder with no styles.
    ///
    /// # Arguments
    ///
    /// * `service_address` - Base URL of the WMS service
    /// * `layer_names` - Comma-separated layer list
    pub fn new(service_address: impl Into<String>, layer_names: impl Into<String>) -> Self {
        Self {
            service_address: service_address.into(),
            layer_names: layer_names.into(),
            style_names: String::new(),
            wms_version: "1.3.0".to_string(),
            transparent: true,
        }
    }

    /// Set the comma-separated style list.
    pub fn with_styles(mut self, style_names: impl Into<String>) -> Self {
        self.style_names = style_names.into();
        self
    }

    /// Set the WMS protocol version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.wms_version = version.into();
        self
    }

    /// Set the `transparent` request flag.
    pub fn with_transparent(mut self, transparent: bool) -> Self {
        self.transparent = transparent;
        self
    }

    fn is_wms_1_3_0_or_greater(&self) -> bool {
        let mut parts = self.wms_version.split('.').map(|p| p.parse::<u32>().unwrap_or(0));
        let major = parts.next().unwrap_or(0);
        let minor = parts.next().unwrap_or(0);
        (major, minor) >= (1, 3)
    }

    /// Appends `?` or `&` so parameters can follow the service address.
    fn base_address(&self) -> String {
        let mut address = self.service_address.clone();
        match address.find('?') {
            None => address.push('?'),
            Some(index) if index != address.len() - 1 && !address.ends_with('&') => {
                address.push('&')
            }
            Some(_) => {}
        }
        address
    }
}

impl UrlBuilder for WmsUrlBuilder {
    fn url_for_tile(&self, request: &TileRequest) -> String {
        let mut url = self.base_address();
        if !url.to_ascii_lowercase().contains("service=wms") {
            url.push_str("service=WMS&");
        }

        let sector = &request.sector;
        let (crs_param, bbox) = if self.is_wms_1_3_0_or_greater() {
            (
                "crs",
                format!(
                    "{},{},{},{}",
                    sector.min_latitude(),
                    sector.min_longitude(),
                    sector.max_latitude(),
                    sector.max_longitude()
                ),
            )
        } else {
            (
                "srs",
                format!(
                    "{},{},{},{}",
                    sector.min_longitude(),
                    sector.min_latitude(),
                    sector.max_longitude(),
                    sector.max_latitude()
                ),
            )
        };

        url.push_str(&format!(
            "request=GetMap&version={}&transparent={}&layers={}&styles={}&format={}&width={}&height={}&{}={}&bbox={}",
            self.wms_version,
            if self.transparent { "TRUE" } else { "FALSE" },
            self.layer_names,
            self.style_names,
            request.format.mime_type(),
            request.width,
            request.height,
            crs_param,
            WMS_CRS,
            bbox
        ));

        url.replace(' ', "%20")
    }
}

/// URL builder for servers laid out as `level/row/row_column.ext`.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelRowColumnUrlBuilder {
    server_address: String,
    path_to_data: String,
}

impl LevelRowColumnUrlBuilder {
    /// Creates a builder.
    ///
    /// # Arguments
    ///
    /// * `server_address` - Base URL of the server
    /// * `path_to_data` - Path below the server root; may be empty
    pub fn new(server_address: impl Into<String>, path_to_data: impl Into<String>) -> Self {
        Self {
            server_address: server_address.into(),
            path_to_data: path_to_data.into(),
        }
    }
}

impl UrlBuilder for LevelRowColumnUrlBuilder {
    fn url_for_tile(&self, request: &TileRequest) -> String {
        let mut url = self.server_address.trim_end_matches('/').to_string();
        let path = self.path_to_data.trim_matches('/');
        if !path.is_empty() {
            url.push('/');
            url.push_str(path);
        }

        let key = &request.key;
        url.push_str(&format!(
            "/{}/{}/{}_{}.{}",
            key.level,
            key.row,
            key.row,
            key.column,
            request.format.extension()
        ));
        url
    }
}
