//! Raster encoding: PNG for composites, PNG or JPEG for cropped stills.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::ImageEncoder;
use serde::{Deserialize, Serialize};

use crate::types::{PipelineError, RgbaImage};

/// Encoding used for a still image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StillFormat {
    /// Lossless, keeps alpha. Byte-identical output for identical input.
    #[default]
    Png,
    /// Lossy, drops alpha.
    Jpeg {
        /// Encoder quality, 1-100.
        quality: u8,
    },
}

impl StillFormat {
    /// JPEG quality used when none is specified.
    pub const DEFAULT_JPEG_QUALITY: u8 = 92;

    /// MIME type of the encoded bytes.
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg { .. } => "image/jpeg",
        }
    }

    /// Conventional file extension, without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg { .. } => "jpg",
        }
    }
}

/// Encode an RGBA raster as PNG.
///
/// # Errors
///
/// Returns [`PipelineError::Encode`] if the encoder fails.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, PipelineError> {
    let mut png_bytes = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
    encoder
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgba8,
        )
        .map_err(|e| PipelineError::Encode(e.to_string()))?;
    Ok(png_bytes)
}

/// Encode an RGBA raster in the requested format.
///
/// JPEG has no alpha channel; pixels are flattened to RGB by dropping
/// alpha, as a canvas JPEG export does.
///
/// # Errors
///
/// Returns [`PipelineError::Encode`] if the encoder fails, or
/// [`PipelineError::InvalidConfig`] for a JPEG quality outside 1-100.
pub fn encode(image: &RgbaImage, format: StillFormat) -> Result<Vec<u8>, PipelineError> {
    match format {
        StillFormat::Png => encode_png(image),
        StillFormat::Jpeg { quality } => {
            if !(1..=100).contains(&quality) {
                return Err(PipelineError::InvalidConfig(format!(
                    "JPEG quality must be 1-100, got {quality}"
                )));
            }
            let rgb = image::DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            let mut jpeg_bytes = Vec::new();
            let encoder =
                image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg_bytes, quality);
            encoder
                .write_image(
                    rgb.as_raw(),
                    rgb.width(),
                    rgb.height(),
                    image::ExtendedColorType::Rgb8,
                )
                .map_err(|e| PipelineError::Encode(e.to_string()))?;
            Ok(jpeg_bytes)
        }
    }
}

/// Wrap encoded bytes in a base64 `data:` URI.
#[must_use]
pub fn to_data_uri(bytes: &[u8], mime_type: &str) -> String {
    format!("data:{mime_type};base64,{}", STANDARD.encode(bytes))
}
