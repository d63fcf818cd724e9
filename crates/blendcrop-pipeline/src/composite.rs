//! Two-layer compositor.
//!
//! Draws the bottom layer, then the top layer with the selected blend
//! mode and opacity, onto a single raster sized to the canvas. Both
//! layers are stretched to fill the canvas; no aspect correction is
//! applied. Rasterisation is done by `tiny-skia`, whose blend stages
//! implement the same formulas as the canvas `globalCompositeOperation`.

use tiny_skia::{ColorU8, FilterQuality, Pixmap, PixmapPaint, Transform};

use crate::blend::BlendMode;
use crate::encode;
use crate::types::{
    BlendParams, CanvasSize, CompositeOutput, Dimensions, Opacity, PipelineError, RgbaImage,
};

/// Convert a straight-alpha raster into a premultiplied pixmap.
fn to_pixmap(image: &RgbaImage) -> Result<Pixmap, PipelineError> {
    let dims = Dimensions::of(image);
    if dims.is_empty() {
        return Err(PipelineError::EmptyImage);
    }
    let mut pixmap = Pixmap::new(dims.width, dims.height).ok_or(PipelineError::RasterAlloc {
        width: dims.width,
        height: dims.height,
    })?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Ok(pixmap)
}

/// Convert a premultiplied pixmap back into a straight-alpha raster.
fn from_pixmap(pixmap: &Pixmap) -> RgbaImage {
    let mut image = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in image.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        dst.0 = [c.red(), c.green(), c.blue(), c.alpha()];
    }
    image
}

/// Allocate a cleared canvas raster.
fn canvas_pixmap(canvas: CanvasSize) -> Result<Pixmap, PipelineError> {
    let mut pixmap =
        Pixmap::new(canvas.width(), canvas.height()).ok_or(PipelineError::RasterAlloc {
            width: canvas.width(),
            height: canvas.height(),
        })?;
    pixmap.fill(tiny_skia::Color::TRANSPARENT);
    Ok(pixmap)
}

/// Draw `layer` stretched over the whole canvas.
#[allow(clippy::cast_precision_loss)]
fn draw_stretched(canvas: &mut Pixmap, layer: &Pixmap, blend_mode: BlendMode, opacity: Opacity) {
    let same_size = layer.width() == canvas.width() && layer.height() == canvas.height();
    let paint = PixmapPaint {
        opacity: opacity.get(),
        blend_mode: blend_mode.to_skia(),
        quality: if same_size {
            FilterQuality::Nearest
        } else {
            FilterQuality::Bilinear
        },
    };
    let transform = Transform::from_scale(
        canvas.width() as f32 / layer.width() as f32,
        canvas.height() as f32 / layer.height() as f32,
    );
    canvas.draw_pixmap(0, 0, layer.as_ref(), &paint, transform, None);
}

/// Composite `b` over `a` on a `canvas`-sized raster.
///
/// `a` is drawn with plain source-over at full opacity; `b` is drawn
/// with `mode` at `opacity`. At zero opacity `b` is not drawn at all,
/// so the result equals `a` stretched for every mode. Neither input is
/// modified.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyImage`] if either source has no pixels
/// and [`PipelineError::RasterAlloc`] if a raster cannot be allocated.
pub fn composite(
    a: &RgbaImage,
    b: &RgbaImage,
    canvas: CanvasSize,
    mode: BlendMode,
    opacity: Opacity,
) -> Result<RgbaImage, PipelineError> {
    let bottom = to_pixmap(a)?;
    let top = to_pixmap(b)?;
    let mut target = canvas_pixmap(canvas)?;

    draw_stretched(&mut target, &bottom, BlendMode::SourceOver, Opacity::OPAQUE);
    if !opacity.is_transparent() {
        draw_stretched(&mut target, &top, mode, opacity);
    }

    log::debug!(
        "composited {} under {} onto {canvas} ({mode}, opacity {opacity})",
        Dimensions::of(a),
        Dimensions::of(b),
    );
    Ok(from_pixmap(&target))
}

/// Composite and encode the result as PNG.
///
/// # Errors
///
/// Returns the errors of [`composite`] and [`PipelineError::Encode`].
pub fn composite_png(
    a: &RgbaImage,
    b: &RgbaImage,
    params: BlendParams,
) -> Result<CompositeOutput, PipelineError> {
    let raster = composite(a, b, params.canvas_size, params.blend_mode, params.opacity)?;
    let png = encode::encode_png(&raster)?;
    Ok(CompositeOutput {
        png,
        dimensions: Dimensions::of(&raster),
        params,
    })
}
