//! blendcrop-pipeline: Pure crop and compositing pipeline (sans-IO).
//!
//! Takes two source images through:
//! decode -> crop -> stretch to canvas -> blend -> PNG encode.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! byte slices and returns structured data. All browser/filesystem
//! interaction lives in `blendcrop-io` and the binaries.

pub mod blend;
pub mod composite;
pub mod crop;
pub mod decode;
pub mod encode;
pub mod intake;
pub mod session;
pub mod types;

pub use blend::BlendMode;
pub use composite::{composite, composite_png};
pub use crop::{CropChoice, CropView};
pub use decode::ImageHandle;
pub use encode::StillFormat;
pub use session::{CompositeRequest, PublishOutcome, Session, SessionState, Slot};
pub use types::{
    BlendParams, CanvasSize, CompositeOutput, CropRect, DOWNLOAD_FILENAME, Dimensions, Opacity,
    PipelineError, RgbaImage,
};

/// One decoded and cropped input layer.
#[derive(Debug, Clone)]
pub struct Layer {
    /// The decoded source.
    pub source: ImageHandle,
    /// Region that was extracted.
    pub crop: CropRect,
    /// The cropped still, at source scale.
    pub still: RgbaImage,
}

impl Layer {
    /// Crop an already decoded source.
    ///
    /// `aspect` is used only by [`CropChoice::Centered`].
    ///
    /// # Errors
    ///
    /// Returns the errors of [`CropChoice::resolve`].
    pub fn new(
        source: ImageHandle,
        choice: CropChoice,
        aspect: f64,
    ) -> Result<Self, PipelineError> {
        let crop = choice.resolve(source.dimensions(), aspect)?;
        let still = crop::produce(&source, crop)?;
        Ok(Self {
            source,
            crop,
            still,
        })
    }

    /// Encode the cropped still.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`crop::produce_encoded`].
    pub fn encode_still(&self, format: StillFormat) -> Result<Vec<u8>, PipelineError> {
        crop::produce_encoded(&self.source, self.crop, format)
    }
}

/// Decode `bytes` and crop the result.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] or [`PipelineError::ImageDecode`]
/// if the bytes cannot be decoded, otherwise the errors of [`Layer::new`].
pub fn prepare_layer(
    bytes: &[u8],
    choice: CropChoice,
    aspect: f64,
) -> Result<Layer, PipelineError> {
    Layer::new(decode::decode(bytes)?, choice, aspect)
}

/// Both prepared layers and their composite.
#[derive(Debug, Clone)]
pub struct Blended {
    /// Bottom layer (A).
    pub a: Layer,
    /// Top layer (B).
    pub b: Layer,
    /// The encoded composite.
    pub output: CompositeOutput,
}

/// Decode and crop A, then B, then composite B over A.
///
/// A is fully prepared before B is decoded, and the canvas size is
/// fixed from `params` before either is drawn.
///
/// # Errors
///
/// Returns the first error from [`prepare_layer`] (A before B) or from
/// [`composite_png`].
pub fn blend_sources(
    a_bytes: &[u8],
    a_crop: CropChoice,
    b_bytes: &[u8],
    b_crop: CropChoice,
    params: &BlendParams,
) -> Result<Blended, PipelineError> {
    let aspect = params.canvas_size.aspect_ratio();
    let a = prepare_layer(a_bytes, a_crop, aspect)?;
    let b = prepare_layer(b_bytes, b_crop, aspect)?;
    let output = composite_png(&a.still, &b.still, *params)?;
    Ok(Blended { a, b, output })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        encode::encode_png(&RgbaImage::from_pixel(width, height, image::Rgba(rgba))).unwrap()
    }

    #[test]
    fn prepare_layer_reports_source_and_crop() {
        let layer = prepare_layer(&png(200, 100, [9, 9, 9, 255]), CropChoice::Centered, 1.0)
            .unwrap();
        assert_eq!(layer.source.dimensions(), Dimensions::new(200, 100));
        assert_eq!(layer.crop, CropRect::new(50, 0, 100, 100));
        assert_eq!(Dimensions::of(&layer.still), Dimensions::new(100, 100));
    }

    #[test]
    fn blend_sources_produces_canvas_sized_png() {
        let params = BlendParams {
            canvas_size: CanvasSize::new(48, 27).unwrap(),
            ..BlendParams::default()
        };
        let out = blend_sources(
            &png(64, 64, [255, 0, 0, 255]),
            CropChoice::Centered,
            &png(30, 90, [0, 0, 255, 255]),
            CropChoice::Centered,
            &params,
        )
        .unwrap()
        .output;
        assert_eq!(out.dimensions, Dimensions::new(48, 27));
        let decoded = decode::decode(&out.png).unwrap();
        assert_eq!(decoded.dimensions(), out.dimensions);
    }

    #[test]
    fn blend_sources_fails_on_a_before_b() {
        let params = BlendParams::default();
        let result = blend_sources(b"", CropChoice::Full, b"also bad", CropChoice::Full, &params);
        assert!(matches!(result, Err(PipelineError::EmptyInput)));

        let a = png(4, 4, [0; 4]);
        let result = blend_sources(&a, CropChoice::Full, b"", CropChoice::Full, &params);
        assert!(matches!(result, Err(PipelineError::EmptyInput)));
    }

    #[test]
    fn explicit_crops_are_validated() {
        let result = blend_sources(
            &png(10, 10, [0, 0, 0, 255]),
            CropChoice::Rect(CropRect::new(5, 5, 10, 10)),
            &png(10, 10, [0, 0, 0, 255]),
            CropChoice::Full,
            &BlendParams::default(),
        );
        assert!(matches!(result, Err(PipelineError::InvalidCrop { .. })));
    }

    #[test]
    fn blend_sources_keeps_both_layers() {
        let params = BlendParams {
            canvas_size: CanvasSize::new(20, 10).unwrap(),
            ..BlendParams::default()
        };
        let blended = blend_sources(
            &png(40, 40, [255, 0, 0, 255]),
            CropChoice::Full,
            &png(30, 30, [0, 255, 0, 255]),
            CropChoice::Rect(CropRect::new(2, 3, 8, 4)),
            &params,
        )
        .unwrap();
        assert_eq!(blended.a.crop, CropRect::new(0, 0, 40, 40));
        assert_eq!(blended.b.crop, CropRect::new(2, 3, 8, 4));
        assert_eq!(blended.output.dimensions, Dimensions::new(20, 10));

        let jpeg = blended
            .b
            .encode_still(StillFormat::Jpeg {
                quality: StillFormat::DEFAULT_JPEG_QUALITY,
            })
            .unwrap();
        assert_eq!(
            decode::decode(&jpeg).unwrap().dimensions(),
            Dimensions::new(8, 4)
        );
    }
}
