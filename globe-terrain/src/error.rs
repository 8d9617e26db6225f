//! Error types shared by the elevation and geometry entry points.
//!
//! Two families of failure exist:
//!
//! - [`ConfigError`]: malformed configuration. Construction aborts.
//! - [`ArgumentError`]: a query or constructor was called with arguments that
//!   violate its contract (non-positive counts, undersized output buffers).
//!
//! Remote retrieval failures never reach query callers; see
//! [`crate::retrieval::RetrievalError`].

use thiserror::Error;

use crate::coord::CoordError;

/// Errors raised while building a level set or elevation model.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required configuration value was not supplied.
    #[error("Missing configuration value: {0}")]
    MissingField(String),

    /// A numeric value that must be positive was zero, negative or not finite.
    #[error("Configuration value '{field}' must be positive, got {value}")]
    NonPositive { field: String, value: f64 },

    /// A value could not be parsed.
    #[error("Invalid value for '{field}': {value}")]
    InvalidValue { field: String, value: String },

    /// The retrieval format is not one of the supported raster formats.
    #[error("Unsupported retrieval format: {0}")]
    UnsupportedFormat(String),

    /// The coverage sector is malformed.
    #[error("Invalid coverage sector: {0}")]
    InvalidSector(#[from] CoordError),

    /// The configuration file could not be read.
    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid INI.
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

impl From<ini::Error> for ConfigError {
    fn from(error: ini::Error) -> Self {
        match error {
            ini::Error::Io(io) => ConfigError::Io(io),
            ini::Error::Parse(parse) => ConfigError::Parse(parse.to_string()),
        }
    }
}

/// Errors raised when a query's argument contract is violated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArgumentError {
    /// A sample count was less than one.
    #[error("{name} must be at least 1, got {value}")]
    NonPositiveCount { name: &'static str, value: usize },

    /// An input or output buffer holds fewer entries than the grid needs.
    #[error("{name} buffer too small: need {required} entries, got {actual}")]
    BufferTooSmall {
        name: &'static str,
        required: usize,
        actual: usize,
    },

    /// A raster was constructed without an image path.
    #[error("Image path must not be empty")]
    EmptyImagePath,

    /// A raster was constructed with a zero width or height.
    #[error("Raster dimensions must be non-zero, got {width}x{height}")]
    ZeroDimension { width: u32, height: u32 },

    /// The sample buffer does not match the raster dimensions.
    #[error("Sample buffer holds {actual} values, raster needs {expected}")]
    DataSizeMismatch { expected: usize, actual: usize },
}

/// Validates the shape of a `num_lat` x `num_lon` grid request.
///
/// Returns the number of grid cells on success.
pub(crate) fn validate_grid(num_lat: usize, num_lon: usize) -> Result<usize, ArgumentError> {
    if num_lat < 1 {
        return Err(ArgumentError::NonPositiveCount {
            name: "num_lat",
            value: num_lat,
        });
    }
    if num_lon < 1 {
        return Err(ArgumentError::NonPositiveCount {
            name: "num_lon",
            value: num_lon,
        });
    }
    Ok(num_lat * num_lon)
}

/// Ensures a buffer has room for `required` entries.
pub(crate) fn validate_buffer(
    name: &'static str,
    actual: usize,
    required: usize,
) -> Result<(), ArgumentError> {
    if actual < required {
        return Err(ArgumentError::BufferTooSmall {
            name,
            required,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_grid_returns_cell_count() {
        assert_eq!(validate_grid(3, 4), Ok(12));
    }

    #[test]
    fn test_validate_grid_rejects_zero_rows() {
        assert!(matches!(
            validate_grid(0, 4),
            Err(ArgumentError::NonPositiveCount {
                name: "num_lat",
                ..
            })
        ));
    }

    #[test]
    fn test_validate_grid_rejects_zero_columns() {
        assert!(matches!(
            validate_grid(2, 0),
            Err(ArgumentError::NonPositiveCount {
                name: "num_lon",
                ..
            })
        ));
    }

    #[test]
    fn test_validate_buffer_too_small() {
        let err = validate_buffer("result", 3, 4).unwrap_err();
        assert_eq!(err.to_string(), "result buffer too small: need 4 entries, got 3");
    }
}
