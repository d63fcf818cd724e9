//! Crop selection geometry and the cropped-image producer.
//!
//! The interactive crop window (pan, zoom, pointer handling) lives in
//! the UI. It describes its state as a [`CropView`]; this module turns
//! that into a pixel-space [`CropRect`] with the requested aspect ratio
//! and extracts the region from the source image.

use serde::{Deserialize, Serialize};

use crate::decode::ImageHandle;
use crate::encode::{self, StillFormat};
use crate::types::{CropRect, Dimensions, PipelineError, RgbaImage};

/// State of the crop window over a source image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropView {
    /// Magnification; 1.0 shows the largest window that fits the image.
    /// Clamped to `[1.0, MAX_ZOOM]`.
    pub zoom: f64,
    /// Horizontal centre of the window as a fraction of image width.
    pub center_x: f64,
    /// Vertical centre of the window as a fraction of image height.
    pub center_y: f64,
}

impl CropView {
    /// Largest supported zoom factor.
    pub const MAX_ZOOM: f64 = 3.0;

    /// Zoom clamped to the supported range; NaN is treated as 1.
    #[must_use]
    pub fn clamped_zoom(self) -> f64 {
        if self.zoom.is_nan() {
            1.0
        } else {
            self.zoom.clamp(1.0, Self::MAX_ZOOM)
        }
    }
}

impl Default for CropView {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            center_x: 0.5,
            center_y: 0.5,
        }
    }
}

/// Compute the crop rectangle for a crop window.
///
/// The window is the largest `aspect`-shaped rectangle that fits inside
/// the image, shrunk by the zoom factor, centred on the requested point
/// and then shifted so it stays fully inside the image.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyImage`] for a zero-sized image and
/// [`PipelineError::InvalidConfig`] if `aspect` is not a positive finite
/// number.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn crop_rect_for_view(
    image: Dimensions,
    aspect: f64,
    view: CropView,
) -> Result<CropRect, PipelineError> {
    if image.is_empty() {
        return Err(PipelineError::EmptyImage);
    }
    if !aspect.is_finite() || aspect <= 0.0 {
        return Err(PipelineError::InvalidConfig(format!(
            "crop aspect ratio must be positive, got {aspect}"
        )));
    }

    let img_w = f64::from(image.width);
    let img_h = f64::from(image.height);

    // Largest window with the target aspect ratio at zoom 1.
    let (fit_w, fit_h) = if img_w / img_h > aspect {
        (img_h * aspect, img_h)
    } else {
        (img_w, img_w / aspect)
    };

    let zoom = view.clamped_zoom();
    let width = (fit_w / zoom).round().clamp(1.0, img_w) as u32;
    let height = (fit_h / zoom).round().clamp(1.0, img_h) as u32;

    let place = |center: f64, extent: u32, limit: u32| -> u32 {
        let center = if center.is_nan() {
            0.5
        } else {
            center.clamp(0.0, 1.0)
        };
        let max_origin = f64::from(limit - extent);
        let origin = center.mul_add(f64::from(limit), -f64::from(extent) / 2.0);
        origin.round().clamp(0.0, max_origin) as u32
    };

    let rect = CropRect::new(
        place(view.center_x, width, image.width),
        place(view.center_y, height, image.height),
        width,
        height,
    );
    log::debug!("crop window over {image} at zoom {zoom:.2}: {rect}");
    Ok(rect)
}

/// The crop used when the user never adjusts the window: centred, 1× zoom.
///
/// # Errors
///
/// Same as [`crop_rect_for_view`].
pub fn default_crop(image: Dimensions, aspect: f64) -> Result<CropRect, PipelineError> {
    crop_rect_for_view(image, aspect, CropView::default())
}

/// How to pick the crop for a source when no crop window is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CropChoice {
    /// [`default_crop`] at the canvas aspect ratio.
    #[default]
    Centered,
    /// The whole image, stretched to the canvas when composited.
    Full,
    /// An explicit rectangle.
    Rect(CropRect),
}

impl CropChoice {
    /// Resolve to a concrete rectangle for an image of size `image`.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`default_crop`] for [`CropChoice::Centered`],
    /// and [`PipelineError::InvalidCrop`] for a rectangle outside the image.
    pub fn resolve(self, image: Dimensions, aspect: f64) -> Result<CropRect, PipelineError> {
        match self {
            Self::Centered => default_crop(image, aspect),
            Self::Full if image.is_empty() => Err(PipelineError::EmptyImage),
            Self::Full => Ok(CropRect::full(image)),
            Self::Rect(rect) => rect.validate(image),
        }
    }
}

/// Extract `rect` from the source image at its original scale.
///
/// The output is exactly `rect.width × rect.height` pixels.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidCrop`] if the rectangle is empty or
/// does not fit inside the image.
pub fn produce(source: &ImageHandle, rect: CropRect) -> Result<RgbaImage, PipelineError> {
    let rect = rect.validate(source.dimensions())?;
    Ok(
        image::imageops::crop_imm(source.pixels(), rect.x, rect.y, rect.width, rect.height)
            .to_image(),
    )
}

/// Extract `rect` and encode the still.
///
/// # Errors
///
/// Returns the errors of [`produce`] and [`encode::encode`].
pub fn produce_encoded(
    source: &ImageHandle,
    rect: CropRect,
    format: StillFormat,
) -> Result<Vec<u8>, PipelineError> {
    let still = produce(source, rect)?;
    encode::encode(&still, format)
}
