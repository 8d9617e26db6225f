//! Elevation model configuration.
//!
//! Configuration can be built in code, taken from a preset, or loaded from
//! the `[elevation]` section of an INI file:
//!
//! ```ini
//! [elevation]
//! coverage_sector = -90,90,-180,180
//! level_zero_delta = 45,45
//! num_levels = 12
//! format = application/bil16
//! cache_path = EarthElevations256
//! tile_width = 256
//! tile_height = 256
//! display_name = Earth Elevation Model
//! pixel_is_point = false
//! min_elevation = -11000
//! max_elevation = 8850
//! ```
//!
//! With `preset = earth` every other key becomes optional and overrides the
//! Earth preset.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use ini::{Ini, Properties};

use crate::coord::{Location, Sector};
use crate::error::ConfigError;
use crate::raster::RasterFormat;
use crate::retrieval::DEFAULT_MAX_CONCURRENT_RETRIEVALS;

/// INI section holding elevation model settings.
pub const ELEVATION_SECTION: &str = "elevation";

/// Display name used when none is configured.
pub const DEFAULT_DISPLAY_NAME: &str = "Elevations";

/// Earth elevation pyramid: 45 degree level-zero tiles.
pub const EARTH_LEVEL_ZERO_DELTA: f64 = 45.0;

/// Earth elevation pyramid depth.
pub const EARTH_NUM_LEVELS: usize = 12;

/// Earth elevation tile size in pixels.
pub const EARTH_TILE_SIZE: u32 = 256;

/// Lowest Earth elevation in meters (Challenger Deep, rounded).
pub const EARTH_MIN_ELEVATION: f64 = -11_000.0;

/// Highest Earth elevation in meters (Everest, rounded).
pub const EARTH_MAX_ELEVATION: f64 = 8_850.0;

/// Immutable description of an elevation model.
#[derive(Debug, Clone, PartialEq)]
pub struct ElevationModelConfig {
    /// Sector the model has data for.
    pub coverage_sector: Sector,
    /// Tile size at level 0, in degrees.
    pub level_zero_delta: Location,
    /// Number of pyramid levels.
    pub num_levels: usize,
    /// Encoding requested from the provider.
    pub retrieval_format: RasterFormat,
    /// Prefix of every tile image path.
    pub cache_path: String,
    /// Tile width in pixels.
    pub tile_width: u32,
    /// Tile height in pixels.
    pub tile_height: u32,
    /// Human-readable name.
    pub display_name: String,
    /// Whether samples are point values (true) or cell averages (false).
    pub pixel_is_point: bool,
    /// Initial lower elevation bound in meters.
    pub min_elevation: f64,
    /// Initial upper elevation bound in meters.
    pub max_elevation: f64,
    /// Provider requests allowed at once.
    pub max_concurrent_retrievals: usize,
}

impl ElevationModelConfig {
    /// Creates a configuration with default optional settings.
    ///
    /// # Arguments
    ///
    /// * `coverage_sector` - Sector the model covers
    /// * `level_zero_delta` - Level-zero tile size in degrees
    /// * `num_levels` - Number of levels
    /// * `retrieval_format` - Tile encoding
    /// * `cache_path` - Tile image path prefix
    /// * `tile_width` - Tile width in pixels
    /// * `tile_height` - Tile height in pixels
    pub fn new(
        coverage_sector: Sector,
        level_zero_delta: Location,
        num_levels: usize,
        retrieval_format: RasterFormat,
        cache_path: impl Into<String>,
        tile_width: u32,
        tile_height: u32,
    ) -> Self {
        Self {
            coverage_sector,
            level_zero_delta,
            num_levels,
            retrieval_format,
            cache_path: cache_path.into(),
            tile_width,
            tile_height,
            display_name: DEFAULT_DISPLAY_NAME.to_string(),
            pixel_is_point: true,
            min_elevation: 0.0,
            max_elevation: 0.0,
            max_concurrent_retrievals: DEFAULT_MAX_CONCURRENT_RETRIEVALS,
        }
    }

    /// The global Earth elevation model served by the NASA WMS.
    pub fn earth() -> Self {
        Self::new(
            Sector::FULL_SPHERE,
            Location::new(EARTH_LEVEL_ZERO_DELTA, EARTH_LEVEL_ZERO_DELTA),
            EARTH_NUM_LEVELS,
            RasterFormat::Bil16,
            "EarthElevations256",
            EARTH_TILE_SIZE,
            EARTH_TILE_SIZE,
        )
        .with_display_name("Earth Elevation Model")
        .with_pixel_is_point(false)
        .with_elevation_bounds(EARTH_MIN_ELEVATION, EARTH_MAX_ELEVATION)
    }

    /// The Earth pyramid served from a level/row/column REST server.
    pub fn earth_rest(display_name: impl Into<String>) -> Self {
        Self::earth().with_display_name(display_name)
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn with_pixel_is_point(mut self, pixel_is_point: bool) -> Self {
        self.pixel_is_point = pixel_is_point;
        self
    }

    /// Set the initial `[min, max]` elevation bounds.
    pub fn with_elevation_bounds(mut self, min_elevation: f64, max_elevation: f64) -> Self {
        self.min_elevation = min_elevation;
        self.max_elevation = max_elevation;
        self
    }

    pub fn with_max_concurrent_retrievals(mut self, max: usize) -> Self {
        self.max_concurrent_retrievals = max;
        self
    }

    /// Checks every required value.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the cache path is empty, a count or tile
    /// dimension is zero, or a level-zero delta is not a positive number.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_path.trim().is_empty() {
            return Err(ConfigError::MissingField("cache_path".to_string()));
        }
        positive("level_zero_delta.latitude", self.level_zero_delta.latitude)?;
        positive("level_zero_delta.longitude", self.level_zero_delta.longitude)?;
        positive("num_levels", self.num_levels as f64)?;
        positive("tile_width", self.tile_width as f64)?;
        positive("tile_height", self.tile_height as f64)?;
        if !(self.min_elevation.is_finite() && self.max_elevation.is_finite()) {
            return Err(ConfigError::InvalidValue {
                field: "min_elevation/max_elevation".to_string(),
                value: format!("{}/{}", self.min_elevation, self.max_elevation),
            });
        }
        Ok(())
    }

    /// Loads the `[elevation]` section of an INI file.
    pub fn from_ini_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_file(path.as_ref())?;
        Self::from_ini(&ini)
    }

    /// Parses the `[elevation]` section of INI text.
    pub fn from_ini_str(text: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::from_ini(&ini)
    }

    /// Reads the `[elevation]` section of a parsed INI document.
    pub fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let section = ini
            .section(Some(ELEVATION_SECTION))
            .ok_or_else(|| ConfigError::MissingField(format!("[{}]", ELEVATION_SECTION)))?;

        let mut config = match section.get("preset") {
            Some(preset) if preset.eq_ignore_ascii_case("earth") => {
                let mut config = Self::earth();
                apply_pyramid_overrides(section, &mut config)?;
                config
            }
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    field: field("preset"),
                    value: other.to_string(),
                })
            }
            None => Self::new(
                parse_sector(required(section, "coverage_sector")?)?,
                parse_location("level_zero_delta", required(section, "level_zero_delta")?)?,
                parse_value("num_levels", required(section, "num_levels")?)?,
                parse_format(required(section, "format")?)?,
                required(section, "cache_path")?,
                parse_value("tile_width", required(section, "tile_width")?)?,
                parse_value("tile_height", required(section, "tile_height")?)?,
            ),
        };

        if let Some(name) = section.get("display_name") {
            config.display_name = name.to_string();
        }
        if let Some(value) = section.get("pixel_is_point") {
            config.pixel_is_point = parse_value("pixel_is_point", value)?;
        }
        if let Some(value) = section.get("min_elevation") {
            config.min_elevation = parse_value("min_elevation", value)?;
        }
        if let Some(value) = section.get("max_elevation") {
            config.max_elevation = parse_value("max_elevation", value)?;
        }
        if let Some(value) = section.get("max_concurrent_retrievals") {
            config.max_concurrent_retrievals = parse_value("max_concurrent_retrievals", value)?;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Default directory for locally stored tiles.
pub fn default_data_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("globe-terrain")
}

fn apply_pyramid_overrides(
    section: &Properties,
    config: &mut ElevationModelConfig,
) -> Result<(), ConfigError> {
    if let Some(value) = section.get("coverage_sector") {
        config.coverage_sector = parse_sector(value)?;
    }
    if let Some(value) = section.get("level_zero_delta") {
        config.level_zero_delta = parse_location("level_zero_delta", value)?;
    }
    if let Some(value) = section.get("num_levels") {
        config.num_levels = parse_value("num_levels", value)?;
    }
    if let Some(value) = section.get("format") {
        config.retrieval_format = parse_format(value)?;
    }
    if let Some(value) = section.get("cache_path") {
        config.cache_path = value.to_string();
    }
    if let Some(value) = section.get("tile_width") {
        config.tile_width = parse_value("tile_width", value)?;
    }
    if let Some(value) = section.get("tile_height") {
        config.tile_height = parse_value("tile_height", value)?;
    }
    Ok(())
}

fn field(key: &str) -> String {
    format!("{}.{}", ELEVATION_SECTION, key)
}

fn required<'a>(section: &'a Properties, key: &str) -> Result<&'a str, ConfigError> {
    section
        .get(key)
        .ok_or_else(|| ConfigError::MissingField(field(key)))
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        field: field(key),
        value: value.to_string(),
    })
}

fn parse_list(key: &str, value: &str, expected: usize) -> Result<Vec<f64>, ConfigError> {
    let values = value
        .split(',')
        .map(|part| parse_value::<f64>(key, part))
        .collect::<Result<Vec<_>, _>>()?;
    if values.len() != expected {
        return Err(ConfigError::InvalidValue {
            field: field(key),
            value: value.to_string(),
        });
    }
    Ok(values)
}

fn parse_sector(value: &str) -> Result<Sector, ConfigError> {
    let v = parse_list("coverage_sector", value, 4)?;
    Ok(Sector::new(v[0], v[1], v[2], v[3])?)
}

fn parse_location(key: &str, value: &str) -> Result<Location, ConfigError> {
    let v = parse_list(key, value, 2)?;
    Ok(Location::new(v[0], v[1]))
}

fn parse_format(value: &str) -> Result<RasterFormat, ConfigError> {
    RasterFormat::from_mime(value.trim())
        .ok_or_else(|| ConfigError::UnsupportedFormat(value.to_string()))
}

fn positive(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive {
            field: field.to_string(),
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn basic() -> ElevationModelConfig {
        ElevationModelConfig::new(
            Sector::new(36.0, 38.0, 14.0, 16.0).unwrap(),
            Location::new(1.0, 1.0),
            13,
            RasterFormat::Bil16,
            "path",
            256,
            256,
        )
    }

    #[test]
    fn test_defaults() {
        let config = basic();
        assert_eq!(config.display_name, "Elevations");
        assert!(config.pixel_is_point);
        assert_eq!(config.min_elevation, 0.0);
        assert_eq!(config.max_elevation, 0.0);
        assert_eq!(config.max_concurrent_retrievals, DEFAULT_MAX_CONCURRENT_RETRIEVALS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_earth_preset() {
        let config = ElevationModelConfig::earth();
        assert_eq!(config.coverage_sector, Sector::FULL_SPHERE);
        assert_eq!(config.level_zero_delta, Location::new(45.0, 45.0));
        assert_eq!(config.num_levels, 12);
        assert_eq!(config.retrieval_format, RasterFormat::Bil16);
        assert_eq!(config.cache_path, "EarthElevations256");
        assert_eq!((config.tile_width, config.tile_height), (256, 256));
        assert_eq!(config.display_name, "Earth Elevation Model");
        assert!(!config.pixel_is_point);
        assert_eq!(config.min_elevation, -11000.0);
        assert_eq!(config.max_elevation, 8850.0);
    }

    #[test]
    fn test_earth_rest_preset() {
        let config = ElevationModelConfig::earth_rest("Local Elevations");
        assert_eq!(config.display_name, "Local Elevations");
        assert_eq!(config.num_levels, 12);
        assert_eq!(config.max_elevation, 8850.0);
    }

    #[test]
    fn test_validate_rejects_missing_values() {
        let mut config = basic();
        config.cache_path = String::new();
        assert!(matches!(config.validate(), Err(ConfigError::MissingField(_))));

        let mut config = basic();
        config.num_levels = 0;
        assert!(matches!(config.validate(), Err(ConfigError::NonPositive { .. })));

        let mut config = basic();
        config.tile_width = 0;
        assert!(matches!(config.validate(), Err(ConfigError::NonPositive { .. })));

        let mut config = basic();
        config.tile_height = 0;
        assert!(matches!(config.validate(), Err(ConfigError::NonPositive { .. })));

        let mut config = basic();
        config.level_zero_delta = Location::new(f64::NAN, 1.0);
        assert!(matches!(config.validate(), Err(ConfigError::NonPositive { .. })));
    }

    #[test]
    fn test_from_ini_str() {
        let config = ElevationModelConfig::from_ini_str(
            "[elevation]\n\
             coverage_sector = 36,38,14,16\n\
             level_zero_delta = 1,1\n\
             num_levels = 13\n\
             format = application/bil16\n\
             cache_path = path\n\
             tile_width = 256\n\
             tile_height = 256\n\
             display_name = Sicily\n\
             pixel_is_point = false\n",
        )
        .unwrap();

        let expected = basic().with_display_name("Sicily").with_pixel_is_point(false);
        assert_eq!(config, expected);
    }

    #[test]
    fn test_from_ini_preset_overrides() {
        let config = ElevationModelConfig::from_ini_str(
            "[elevation]\npreset = earth\nnum_levels = 5\nformat = image/png\n",
        )
        .unwrap();
        assert_eq!(config.num_levels, 5);
        assert_eq!(config.retrieval_format, RasterFormat::Png);
        assert_eq!(config.cache_path, "EarthElevations256");
    }

    #[test]
    fn test_from_ini_missing_key() {
        let err = ElevationModelConfig::from_ini_str("[elevation]\nnum_levels = 3\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(f) if f == "elevation.coverage_sector"));
    }

    #[test]
    fn test_from_ini_bad_values() {
        let err = ElevationModelConfig::from_ini_str("[elevation]\npreset = earth\nnum_levels = many\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let err = ElevationModelConfig::from_ini_str("[elevation]\npreset = earth\nformat = image/jpeg\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));

        let err = ElevationModelConfig::from_ini_str(
            "[elevation]\npreset = earth\ncoverage_sector = 10,0,0,10\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSector(_)));
    }

    #[test]
    fn test_from_ini_missing_section() {
        let err = ElevationModelConfig::from_ini_str("[provider]\ntype = wms\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(_)));
    }

    #[test]
    fn test_from_ini_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[elevation]\npreset = earth\ndisplay_name = From File").unwrap();

        let config = ElevationModelConfig::from_ini_file(file.path()).unwrap();
        assert_eq!(config.display_name, "From File");
    }

    #[test]
    fn test_from_ini_file_missing() {
        let err = ElevationModelConfig::from_ini_file("/nonexistent/globe-terrain.ini").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_default_data_dir() {
        assert!(default_data_dir().ends_with("globe-terrain"));
    }
}
