//! Decoding of retrieved tile payloads into elevation samples.
//!
//! Supported encodings:
//!
//! | MIME type           | Layout                                      |
//! |---------------------|---------------------------------------------|
//! | `application/bil16` | raw little-endian `i16`, row 0 = north      |
//! | `image/png`         | 16-bit grayscale, samples stored as `i16`   |
//! | `image/tiff`        | 16-bit grayscale, samples stored as `i16`   |

use std::fmt;
use std::io::Cursor;

use image::{GenericImageView, ImageFormat, ImageReader};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while decoding a tile payload.
#[derive(Debug, Error)]
pub enum RasterError {
    /// The payload length does not match the tile dimensions.
    #[error("Payload holds {actual} bytes, expected {expected}")]
    SizeMismatch { expected: usize, actual: usize },

    /// The decoded image has the wrong dimensions.
    #[error("Image is {actual_width}x{actual_height}, expected {width}x{height}")]
    DimensionMismatch {
        width: u32,
        height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    /// The image decoder rejected the payload.
    #[error("Image decode failed: {0}")]
    Image(#[from] image::ImageError),
}

/// Encoding used by an elevation tile source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RasterFormat {
    /// Band-interleaved 16-bit signed samples.
    Bil16,
    /// 16-bit grayscale PNG.
    Png,
    /// 16-bit grayscale TIFF.
    Tiff,
}

impl RasterFormat {
    /// Parses a MIME type.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "application/bil16" | "application/bil" => Some(RasterFormat::Bil16),
            "image/png" => Some(RasterFormat::Png),
            "image/tiff" | "image/tif" => Some(RasterFormat::Tiff),
            _ => None,
        }
    }

    /// MIME type sent to tile servers.
    pub fn mime_type(&self) -> &'static str {
        match self {
            RasterFormat::Bil16 => "application/bil16",
            RasterFormat::Png => "image/png",
            RasterFormat::Tiff => "image/tiff",
        }
    }

    /// File extension used in cache paths.
    pub fn extension(&self) -> &'static str {
        match self {
            RasterFormat::Bil16 => "bil",
            RasterFormat::Png => "png",
            RasterFormat::Tiff => "tif",
        }
    }
}

impl fmt::Display for RasterFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_type())
    }
}

/// Decodes a payload into `width * height` samples, row 0 northernmost.
///
/// # Arguments
///
/// * `format` - Encoding of `bytes`
/// * `bytes` - Raw payload as retrieved
/// * `width` - Expected tile width in pixels
/// * `height` - Expected tile height in pixels
pub fn decode_samples(
    format: RasterFormat,
    bytes: &[u8],
    width: u32,
    height: u32,
) -> Result<Vec<i16>, RasterError> {
    match format {
        RasterFormat::Bil16 => decode_bil16(bytes, width, height),
        RasterFormat::Png => decode_image(ImageFormat::Png, bytes, width, height),
        RasterFormat::Tiff => decode_image(ImageFormat::Tiff, bytes, width, height),
    }
}

fn decode_bil16(bytes: &[u8], width: u32, height: u32) -> Result<Vec<i16>, RasterError> {
    let expected = width as usize * height as usize * 2;
    if bytes.len() != expected {
        return Err(RasterError::SizeMismatch {
            expected,
            actual: bytes.len(),
        });
    }

    Ok(bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect())
}

fn decode_image(
    format: ImageFormat,
    bytes: &[u8],
    width: u32,
    height: u32,
) -> Result<Vec<i16>, RasterError> {
    let image = ImageReader::with_format(Cursor::new(bytes), format).decode()?;
    if image.width() != width || image.height() != height {
        return Err(RasterError::DimensionMismatch {
            width,
            height,
            actual_width: image.width(),
            actual_height: image.height(),
        });
    }

    // Elevation images carry signed samples in unsigned 16-bit channels.
    Ok(image
        .into_luma16()
        .into_raw()
        .into_iter()
        .map(|sample| sample as i16)
        .collect())
}
