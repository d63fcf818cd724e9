//! Shared types for the blendcrop pipeline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::blend::BlendMode;

/// Re-export `RgbaImage` so downstream crates can hold decoded and
/// composited rasters without depending on `image` directly.
pub use image::RgbaImage;

/// Filename offered for the composite download.
pub const DOWNLOAD_FILENAME: &str = "blended-image.png";

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Create new dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Dimensions of an in-memory raster.
    #[must_use]
    pub fn of(image: &RgbaImage) -> Self {
        Self::new(image.width(), image.height())
    }

    /// Returns `true` if either axis is zero.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Output and intermediate raster size.
///
/// Both axes are non-zero. The UI offers the fixed [`PRESETS`](Self::PRESETS);
/// the CLI additionally accepts any `WxH` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Dimensions", into = "Dimensions")]
pub struct CanvasSize {
    width: u32,
    height: u32,
}

impl CanvasSize {
    /// 1080×1080, the initial selection.
    pub const DEFAULT: Self = Self {
        width: 1080,
        height: 1080,
    };

    /// The enumerated sizes offered by the UI, in display order.
    pub const PRESETS: [Self; 6] = [
        Self::DEFAULT,
        Self {
            width: 1080,
            height: 1350,
        },
        Self {
            width: 720,
            height: 720,
        },
        Self {
            width: 1280,
            height: 720,
        },
        Self {
            width: 1080,
            height: 1920,
        },
        Self {
            width: 1152,
            height: 600,
        },
    ];

    /// Largest accepted width or height.
    pub const MAX_DIMENSION: u32 = 8192;

    /// Create a canvas size.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidCanvasSize`] if either axis is zero
    /// or larger than [`MAX_DIMENSION`](Self::MAX_DIMENSION).
    pub fn new(width: u32, height: u32) -> Result<Self, PipelineError> {
        if width == 0 || height == 0 {
            return Err(PipelineError::InvalidCanvasSize(format!(
                "{width}x{height}: both axes must be positive"
            )));
        }
        if width > Self::MAX_DIMENSION || height > Self::MAX_DIMENSION {
            return Err(PipelineError::InvalidCanvasSize(format!(
                "{width}x{height}: axes are limited to {}",
                Self::MAX_DIMENSION
            )));
        }
        Ok(Self { width, height })
    }

    /// Canvas width in pixels.
    #[must_use]
    pub const fn width(self) -> u32 {
        self.width
    }

    /// Canvas height in pixels.
    #[must_use]
    pub const fn height(self) -> u32 {
        self.height
    }

    /// Width divided by height; the aspect ratio the crop window uses.
    #[must_use]
    pub fn aspect_ratio(self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }

    /// The canvas size as plain [`Dimensions`].
    #[must_use]
    pub const fn dimensions(self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for CanvasSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for CanvasSize {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PipelineError::InvalidCanvasSize(format!("expected WxH, got {s:?}"));
        let (w, h) = s
            .trim()
            .split_once(['x', 'X', '×'])
            .ok_or_else(invalid)?;
        let width = w.trim().parse::<u32>().map_err(|_| invalid())?;
        let height = h.trim().parse::<u32>().map_err(|_| invalid())?;
        Self::new(width, height)
    }
}

impl TryFrom<Dimensions> for CanvasSize {
    type Error = PipelineError;

    fn try_from(d: Dimensions) -> Result<Self, Self::Error> {
        Self::new(d.width, d.height)
    }
}

impl From<CanvasSize> for Dimensions {
    fn from(size: CanvasSize) -> Self {
        size.dimensions()
    }
}

/// A rectangular region of a source image, in source-pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CropRect {
    /// Left edge (pixels from the left of the source).
    pub x: u32,
    /// Top edge (pixels from the top of the source).
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl CropRect {
    /// Create a crop rectangle. Not validated until used against an image.
    #[must_use]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The rectangle covering an entire image.
    #[must_use]
    pub const fn full(dimensions: Dimensions) -> Self {
        Self::new(0, 0, dimensions.width, dimensions.height)
    }

    /// Size of the region.
    #[must_use]
    pub const fn dimensions(self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    /// Check that the rectangle is non-empty and lies within `bounds`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidCrop`] otherwise.
    pub fn validate(self, bounds: Dimensions) -> Result<Self, PipelineError> {
        let fits_x = self
            .x
            .checked_add(self.width)
            .is_some_and(|right| right <= bounds.width);
        let fits_y = self
            .y
            .checked_add(self.height)
            .is_some_and(|bottom| bottom <= bounds.height);
        if self.width == 0 || self.height == 0 || !fits_x || !fits_y {
            return Err(PipelineError::InvalidCrop {
                crop: self,
                bounds,
            });
        }
        Ok(self)
    }
}

impl fmt::Display for CropRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

impl FromStr for CropRect {
    type Err = PipelineError;

    /// Parse `"X,Y,W,H"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let [x, y, w, h] = parts.as_slice() else {
            return Err(PipelineError::InvalidConfig(format!(
                "crop must be 'X,Y,W,H', got {s:?}"
            )));
        };
        let parse = |field: &str, v: &str| {
            v.parse::<u32>().map_err(|e| {
                PipelineError::InvalidConfig(format!("invalid crop {field} {v:?}: {e}"))
            })
        };
        Ok(Self::new(
            parse("x", x)?,
            parse("y", y)?,
            parse("width", w)?,
            parse("height", h)?,
        ))
    }
}

/// Opacity of the top layer, in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub struct Opacity(f32);

impl Opacity {
    /// Fully opaque; the initial selection.
    pub const OPAQUE: Self = Self(1.0);

    /// Fully transparent: the top layer contributes nothing.
    pub const TRANSPARENT: Self = Self(0.0);

    /// Create an opacity value.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidOpacity`] for NaN or values
    /// outside `[0, 1]`.
    pub fn new(value: f32) -> Result<Self, PipelineError> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(PipelineError::InvalidOpacity(value))
        }
    }

    /// The raw value.
    #[must_use]
    pub const fn get(self) -> f32 {
        self.0
    }

    /// Returns `true` when the top layer would be invisible.
    #[must_use]
    pub fn is_transparent(self) -> bool {
        self.0 <= 0.0
    }
}

impl Default for Opacity {
    fn default() -> Self {
        Self::OPAQUE
    }
}

impl fmt::Display for Opacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl TryFrom<f32> for Opacity {
    type Error = PipelineError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Opacity> for f32 {
    fn from(opacity: Opacity) -> Self {
        opacity.0
    }
}

/// The user-selectable compositing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BlendParams {
    /// Output raster size; both layers are stretched to it.
    pub canvas_size: CanvasSize,
    /// How the top layer combines with the bottom layer.
    pub blend_mode: BlendMode,
    /// Opacity applied to the top layer only.
    pub opacity: Opacity,
}

/// An encoded composite, ready for preview and download.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeOutput {
    /// PNG-encoded composite.
    pub png: Vec<u8>,
    /// Pixel size of the composite (equals the canvas size).
    pub dimensions: Dimensions,
    /// Parameters the composite was rendered with.
    pub params: BlendParams,
}

/// Errors that can occur during decoding, cropping, compositing, or
/// encoding.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// The selected file is not an accepted image type.
    #[error("not a supported image file: {0}")]
    InvalidFileType(String),

    /// A data URI could not be parsed.
    #[error("invalid data URI: {0}")]
    InvalidDataUri(String),

    /// The crop rectangle is empty or extends past the image.
    #[error("crop {crop} does not fit inside a {bounds} image")]
    InvalidCrop {
        /// The rejected rectangle.
        crop: CropRect,
        /// Dimensions of the image it was applied to.
        bounds: Dimensions,
    },

    /// The canvas size is zero or malformed.
    #[error("invalid canvas size: {0}")]
    InvalidCanvasSize(String),

    /// The opacity is NaN or outside `[0, 1]`.
    #[error("opacity must be between 0 and 1, got {0}")]
    InvalidOpacity(f32),

    /// The blend mode name is not one of the supported canvas operations.
    #[error("unknown blend mode: {0:?}")]
    UnknownBlendMode(String),

    /// Some other parameter is invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A source raster has zero width or height.
    #[error("source image has no pixels")]
    EmptyImage,

    /// The offscreen raster could not be allocated.
    #[error("could not allocate a {width}x{height} raster")]
    RasterAlloc {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// Encoding the output image failed.
    #[error("failed to encode image: {0}")]
    Encode(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // --- Dimensions tests ---

    #[test]
    fn dimensions_display() {
        assert_eq!(Dimensions::new(640, 480).to_string(), "640x480");
    }

    #[test]
    fn dimensions_is_empty() {
        assert!(Dimensions::new(0, 10).is_empty());
        assert!(Dimensions::new(10, 0).is_empty());
        assert!(!Dimensions::new(1, 1).is_empty());
    }

    // --- CanvasSize tests ---

    #[test]
    fn canvas_presets_match_offered_sizes() {
        let labels: Vec<String> = CanvasSize::PRESETS.iter().map(ToString::to_string).collect();
        assert_eq!(
            labels,
            [
                "1080x1080",
                "1080x1350",
                "720x720",
                "1280x720",
                "1080x1920",
                "1152x600"
            ],
        );
        assert_eq!(CanvasSize::default(), CanvasSize::PRESETS[0]);
    }

    #[test]
    fn canvas_size_parses_wxh() {
        let size: CanvasSize = "1280x720".parse().unwrap();
        assert_eq!(size.width(), 1280);
        assert_eq!(size.height(), 720);

        let size: CanvasSize = " 300 X 200 ".parse().unwrap();
        assert_eq!(size.dimensions(), Dimensions::new(300, 200));
    }

    #[test]
    fn canvas_size_rejects_zero_and_garbage() {
        assert!(matches!(
            "0x100".parse::<CanvasSize>(),
            Err(PipelineError::InvalidCanvasSize(_))
        ));
        assert!(matches!(
            "100".parse::<CanvasSize>(),
            Err(PipelineError::InvalidCanvasSize(_))
        ));
        assert!(matches!(
            "axb".parse::<CanvasSize>(),
            Err(PipelineError::InvalidCanvasSize(_))
        ));
    }

    #[test]
    fn canvas_size_caps_each_axis() {
        assert!(CanvasSize::new(CanvasSize::MAX_DIMENSION, CanvasSize::MAX_DIMENSION).is_ok());
        assert!(matches!(
            "100000x100000".parse::<CanvasSize>(),
            Err(PipelineError::InvalidCanvasSize(_))
        ));
        assert!(CanvasSize::new(8193, 10).is_err());
        assert!(CanvasSize::new(10, 8193).is_err());
        assert!(CanvasSize::PRESETS.iter().all(|p| {
            p.width() <= CanvasSize::MAX_DIMENSION && p.height() <= CanvasSize::MAX_DIMENSION
        }));
        let from_json: Result<CanvasSize, _> =
            serde_json::from_str(r#"{"width":20000,"height":5}"#);
        assert!(from_json.is_err());
    }

    #[test]
    fn canvas_aspect_ratio() {
        let size = CanvasSize::new(1280, 720).unwrap();
        assert!((size.aspect_ratio() - 16.0 / 9.0).abs() < 1e-12);
    }

    #[test]
    fn canvas_size_serde_rejects_zero() {
        let result: Result<CanvasSize, _> = serde_json::from_str(r#"{"width":0,"height":5}"#);
        assert!(result.is_err());
        let size: CanvasSize = serde_json::from_str(r#"{"width":720,"height":720}"#).unwrap();
        assert_eq!(size, CanvasSize::PRESETS[2]);
    }

    // --- CropRect tests ---

    #[test]
    fn crop_inside_bounds_is_valid() {
        let bounds = Dimensions::new(100, 50);
        assert!(CropRect::new(0, 0, 100, 50).validate(bounds).is_ok());
        assert!(CropRect::new(10, 5, 20, 20).validate(bounds).is_ok());
    }

    #[test]
    fn crop_outside_bounds_is_rejected() {
        let bounds = Dimensions::new(100, 50);
        for crop in [
            CropRect::new(0, 0, 0, 10),
            CropRect::new(0, 0, 10, 0),
            CropRect::new(91, 0, 10, 10),
            CropRect::new(0, 41, 10, 10),
            CropRect::new(u32::MAX, 0, 2, 2),
        ] {
            assert!(
                matches!(crop.validate(bounds), Err(PipelineError::InvalidCrop { .. })),
                "{crop} should be rejected",
            );
        }
    }

    #[test]
    fn crop_parses_comma_list() {
        let crop: CropRect = "1, 2,30,40".parse().unwrap();
        assert_eq!(crop, CropRect::new(1, 2, 30, 40));
        assert!("1,2,3".parse::<CropRect>().is_err());
        assert!("1,2,3,-4".parse::<CropRect>().is_err());
    }

    // --- Opacity tests ---

    #[test]
    fn opacity_range_is_enforced() {
        assert!(Opacity::new(0.0).is_ok());
        assert!(Opacity::new(1.0).is_ok());
        assert!(Opacity::new(0.35).is_ok());
        assert!(matches!(
            Opacity::new(1.01),
            Err(PipelineError::InvalidOpacity(_))
        ));
        assert!(Opacity::new(-0.1).is_err());
        assert!(Opacity::new(f32::NAN).is_err());
    }

    #[test]
    fn opacity_default_is_opaque() {
        assert_eq!(Opacity::default(), Opacity::OPAQUE);
        assert!(Opacity::TRANSPARENT.is_transparent());
        assert!(!Opacity::OPAQUE.is_transparent());
    }

    // --- BlendParams tests ---

    #[test]
    fn blend_params_serde_round_trip() {
        let params = BlendParams {
            canvas_size: CanvasSize::new(1280, 720).unwrap(),
            blend_mode: BlendMode::ColorDodge,
            opacity: Opacity::new(0.5).unwrap(),
        };
        let json = serde_json::to_string(&params).unwrap();
        assert!(json.contains("\"color-dodge\""), "json was {json}");
        let deserialized: BlendParams = serde_json::from_str(&json).unwrap();
        assert_eq!(params, deserialized);
    }

    #[test]
    fn blend_params_serde_rejects_out_of_range_opacity() {
        let json = r#"{"canvas_size":{"width":720,"height":720},"blend_mode":"screen","opacity":2.0}"#;
        assert!(serde_json::from_str::<BlendParams>(json).is_err());
    }

    // --- PipelineError tests ---

    #[test]
    fn error_empty_input_display() {
        let err = PipelineError::EmptyInput;
        assert_eq!(err.to_string(), "input image data is empty");
    }

    #[test]
    fn error_invalid_crop_display() {
        let err = PipelineError::InvalidCrop {
            crop: CropRect::new(5, 6, 10, 20),
            bounds: Dimensions::new(8, 8),
        };
        assert_eq!(
            err.to_string(),
            "crop 10x20+5+6 does not fit inside a 8x8 image"
        );
    }

    #[test]
    fn error_unknown_blend_mode_display() {
        let err = PipelineError::UnknownBlendMode("plasma".to_string());
        assert_eq!(err.to_string(), "unknown blend mode: \"plasma\"");
    }
}
