//! Image decoding into shareable RGBA handles.
//!
//! Accepts raw image bytes (PNG, JPEG) or a base64 `data:` URI and
//! produces an [`ImageHandle`]: decoded RGBA pixels plus the natural
//! dimensions. This is the first step for every uploaded file.

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::types::{Dimensions, PipelineError, RgbaImage};

/// Decoded pixel data plus natural dimensions.
///
/// Immutable once created. Cloning shares the pixel buffer.
#[derive(Debug, Clone)]
pub struct ImageHandle {
    pixels: Arc<RgbaImage>,
}

impl ImageHandle {
    /// Wrap an already decoded raster.
    #[must_use]
    pub fn new(pixels: RgbaImage) -> Self {
        Self {
            pixels: Arc::new(pixels),
        }
    }

    /// Natural width and height of the image.
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::of(&self.pixels)
    }

    /// The decoded RGBA pixels.
    #[must_use]
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Returns `true` if both handles share the same pixel buffer.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
    }
}

impl From<RgbaImage> for ImageHandle {
    fn from(pixels: RgbaImage) -> Self {
        Self::new(pixels)
    }
}

/// Decode raw image bytes into an [`ImageHandle`].
///
/// Supports whatever formats the `image` crate is built with (PNG and
/// JPEG in this workspace). The pixels are converted to 8-bit RGBA.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is
/// unrecognized or the data is corrupt.
pub fn decode(bytes: &[u8]) -> Result<ImageHandle, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let img = image::load_from_memory(bytes)?;
    let handle = ImageHandle::new(img.to_rgba8());
    log::debug!(
        "decoded {} bytes into a {} image",
        bytes.len(),
        handle.dimensions()
    );
    Ok(handle)
}

/// Extract the binary payload of a base64 `data:` URI
/// (e.g. `data:image/png;base64,...`), ready for [`decode`].
///
/// # Errors
///
/// Returns [`PipelineError::InvalidDataUri`] if the URI is not a base64
/// `data:` URI or the payload is not valid base64.
pub fn data_uri_payload(uri: &str) -> Result<Vec<u8>, PipelineError> {
    let rest = uri
        .trim()
        .strip_prefix("data:")
        .ok_or_else(|| PipelineError::InvalidDataUri("missing 'data:' prefix".into()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| PipelineError::InvalidDataUri("missing ',' separator".into()))?;
    if !header.ends_with(";base64") {
        return Err(PipelineError::InvalidDataUri(format!(
            "only base64 payloads are supported, got header {header:?}"
        )));
    }
    STANDARD
        .decode(payload)
        .map_err(|e| PipelineError::InvalidDataUri(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Helper: encode an RGBA image as a PNG byte buffer.
    fn png_bytes(img: &RgbaImage) -> Vec<u8> {
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgba8,
        )
        .unwrap();
        buf
    }

    #[test]
    fn empty_input_returns_error() {
        let result = decode(&[]);
        assert!(matches!(result, Err(PipelineError::EmptyInput)));
    }

    #[test]
    fn corrupt_bytes_returns_image_decode_error() {
        let result = decode(&[0xFF, 0xFE, 0x00, 0x01]);
        assert!(matches!(result, Err(PipelineError::ImageDecode(_))));
    }

    #[test]
    fn valid_png_keeps_pixels_and_dimensions() {
        let img = RgbaImage::from_fn(17, 31, |x, y| {
            #[allow(clippy::cast_possible_truncation)]
            image::Rgba([x as u8, y as u8, 7, 200])
        });
        let handle = decode(&png_bytes(&img)).unwrap();
        assert_eq!(handle.dimensions(), Dimensions::new(17, 31));
        assert_eq!(handle.pixels().as_raw(), img.as_raw());
    }

    #[test]
    fn clones_share_pixels() {
        let handle = ImageHandle::new(RgbaImage::new(2, 2));
        let copy = handle.clone();
        assert!(handle.ptr_eq(&copy));
        assert!(!handle.ptr_eq(&ImageHandle::new(RgbaImage::new(2, 2))));
    }

    #[test]
    fn data_uri_decodes() {
        let img = RgbaImage::from_pixel(3, 2, image::Rgba([1, 2, 3, 255]));
        let uri = format!("data:image/png;base64,{}", STANDARD.encode(png_bytes(&img)));
        let handle = decode(&data_uri_payload(&uri).unwrap()).unwrap();
        assert_eq!(handle.dimensions(), Dimensions::new(3, 2));
        assert_eq!(handle.pixels().get_pixel(2, 1).0, [1, 2, 3, 255]);
    }

    #[test]
    fn malformed_data_uris_are_rejected() {
        for uri in [
            "image/png;base64,AAAA",
            "data:image/png;base64",
            "data:image/svg+xml,<svg/>",
            "data:image/png;base64,!!!not base64!!!",
        ] {
            assert!(
                matches!(data_uri_payload(uri), Err(PipelineError::InvalidDataUri(_))),
                "{uri:?} should be rejected",
            );
        }
    }

    #[test]
    fn empty_data_uri_payload_is_empty_input() {
        let payload = data_uri_payload("data:image/png;base64,").unwrap();
        assert!(matches!(decode(&payload), Err(PipelineError::EmptyInput)));
    }
}
