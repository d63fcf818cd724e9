//! blendcrop-cli: headless crop-and-blend compositor.
//!
//! Crops two images and composites the top one over the bottom one with
//! the same pipeline the web app uses, writing the result as a PNG.
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin blendcrop-cli -- [OPTIONS] <BOTTOM> <TOP>
//! ```

#![allow(clippy::print_stdout)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use blendcrop_pipeline::{
    BlendMode, BlendParams, CanvasSize, CropChoice, CropRect, DOWNLOAD_FILENAME, Dimensions, Layer,
    Opacity, StillFormat, decode,
};
use clap::{Parser, ValueEnum};
use serde::Serialize;

/// Crop two images and blend them into one PNG.
///
/// Without an explicit crop, each input is cropped to the centre of the
/// image at the canvas aspect ratio. Both crops are then stretched to
/// the canvas size and the top layer is blended over the bottom one.
#[derive(Parser)]
#[command(name = "blendcrop-cli", version)]
struct Cli {
    /// Bottom layer (image A): a PNG or JPEG file, or a text file holding
    /// a base64 `data:` URI.
    #[arg(required_unless_present = "list_modes")]
    bottom: Option<PathBuf>,

    /// Top layer (image B), in the same forms as the bottom layer.
    #[arg(required_unless_present = "list_modes")]
    top: Option<PathBuf>,

    /// Canvas size as WxH.
    #[arg(long, value_name = "WxH", default_value_t = CanvasSize::DEFAULT)]
    size: CanvasSize,

    /// Blend mode (a canvas composite operation name, or "normal").
    #[arg(long, value_name = "NAME", default_value_t = BlendMode::default())]
    mode: BlendMode,

    /// Opacity of the top layer (0.0-1.0).
    #[arg(long, default_value_t = Opacity::OPAQUE.get())]
    opacity: f32,

    /// Crop rectangle for the bottom layer, in source pixels.
    #[arg(long, value_name = "X,Y,W,H", conflicts_with = "fit_a")]
    crop_a: Option<CropRect>,

    /// Use the whole bottom image instead of a centred crop.
    #[arg(long)]
    fit_a: bool,

    /// Crop rectangle for the top layer, in source pixels.
    #[arg(long, value_name = "X,Y,W,H", conflicts_with = "fit_b")]
    crop_b: Option<CropRect>,

    /// Use the whole top image instead of a centred crop.
    #[arg(long)]
    fit_b: bool,

    /// Output PNG path.
    #[arg(short, long, default_value = DOWNLOAD_FILENAME)]
    output: PathBuf,

    /// Also write each cropped still next to the output, as
    /// `<output stem>-a.<ext>` and `<output stem>-b.<ext>`.
    #[arg(long, value_enum, value_name = "FORMAT")]
    save_crops: Option<CropFormat>,

    /// JPEG quality for `--save-crops jpeg` (1-100).
    #[arg(
        long,
        default_value_t = StillFormat::DEFAULT_JPEG_QUALITY,
        value_parser = clap::value_parser!(u8).range(1..=100)
    )]
    jpeg_quality: u8,

    /// Print a JSON summary of the run to stdout.
    #[arg(long)]
    json: bool,

    /// List the supported blend modes and exit.
    #[arg(long)]
    list_modes: bool,

    /// Full blend parameters as a JSON string.
    ///
    /// When provided, --size, --mode and --opacity are ignored.
    /// The JSON must be a valid `BlendParams` serialization.
    #[arg(long)]
    params_json: Option<String>,
}

/// Encoding for `--save-crops`.
#[derive(Clone, Copy, ValueEnum)]
enum CropFormat {
    /// Lossless PNG.
    Png,
    /// JPEG at `--jpeg-quality`.
    Jpeg,
}

impl CropFormat {
    const fn still_format(self, jpeg_quality: u8) -> StillFormat {
        match self {
            Self::Png => StillFormat::Png,
            Self::Jpeg => StillFormat::Jpeg {
                quality: jpeg_quality,
            },
        }
    }
}

/// Build blend parameters from the CLI arguments.
fn params_from_cli(cli: &Cli) -> Result<BlendParams, String> {
    if let Some(ref json) = cli.params_json {
        return serde_json::from_str(json).map_err(|e| format!("Invalid --params-json: {e}"));
    }

    let opacity = Opacity::new(cli.opacity).map_err(|e| format!("Invalid --opacity: {e}"))?;
    Ok(BlendParams {
        canvas_size: cli.size,
        blend_mode: cli.mode,
        opacity,
    })
}

fn crop_choice(rect: Option<CropRect>, fit: bool) -> CropChoice {
    match rect {
        Some(rect) => CropChoice::Rect(rect),
        None if fit => CropChoice::Full,
        None => CropChoice::Centered,
    }
}

#[derive(Debug, Serialize)]
struct LayerSummary {
    input: PathBuf,
    source: Dimensions,
    crop: CropRect,
    #[serde(skip_serializing_if = "Option::is_none")]
    saved: Option<PathBuf>,
}

/// What `--json` prints.
#[derive(Debug, Serialize)]
struct RunSummary {
    params: BlendParams,
    bottom: LayerSummary,
    top: LayerSummary,
    output: PathBuf,
    dimensions: Dimensions,
    bytes: usize,
}

/// Read an input file, unwrapping it if it holds a `data:` URI.
fn read_input(path: &Path) -> Result<Vec<u8>, String> {
    let bytes =
        std::fs::read(path).map_err(|e| format!("Error reading {}: {e}", path.display()))?;
    log::info!("{}: {} bytes", path.display(), bytes.len());

    if !bytes.starts_with(b"data:") {
        return Ok(bytes);
    }
    let uri = std::str::from_utf8(&bytes)
        .map_err(|e| format!("{}: data URI is not UTF-8: {e}", path.display()))?;
    decode::data_uri_payload(uri).map_err(|e| format!("{}: {e}", path.display()))
}

/// `<output stem>-<suffix>.<ext>`, next to the output.
fn crop_path(output: &Path, suffix: &str, format: StillFormat) -> PathBuf {
    let stem = output
        .file_stem()
        .map_or_else(|| "blended-image".into(), |s| s.to_string_lossy());
    output.with_file_name(format!("{stem}-{suffix}.{}", format.extension()))
}

fn summarize(
    input: &Path,
    layer: &Layer,
    suffix: &str,
    output: &Path,
    save: Option<StillFormat>,
) -> Result<LayerSummary, String> {
    log::debug!(
        "{}: {} source, crop {}",
        input.display(),
        layer.source.dimensions(),
        layer.crop
    );
    let saved = match save {
        Some(format) => {
            let path = crop_path(output, suffix, format);
            let bytes = layer
                .encode_still(format)
                .map_err(|e| format!("Encoding crop of {} failed: {e}", input.display()))?;
            std::fs::write(&path, &bytes)
                .map_err(|e| format!("Error writing {}: {e}", path.display()))?;
            log::info!("Wrote crop {} ({} bytes)", path.display(), bytes.len());
            Some(path)
        }
        None => None,
    };
    Ok(LayerSummary {
        input: input.to_path_buf(),
        source: layer.source.dimensions(),
        crop: layer.crop,
        saved,
    })
}

fn run(cli: &Cli, bottom: &Path, top: &Path) -> Result<RunSummary, String> {
    let params = params_from_cli(cli)?;
    log::info!(
        "canvas {}, mode {}, opacity {}",
        params.canvas_size,
        params.blend_mode,
        params.opacity
    );

    let a_bytes = read_input(bottom)?;
    let b_bytes = read_input(top)?;
    let blended = blendcrop_pipeline::blend_sources(
        &a_bytes,
        crop_choice(cli.crop_a, cli.fit_a),
        &b_bytes,
        crop_choice(cli.crop_b, cli.fit_b),
        &params,
    )
    .map_err(|e| format!("Blending failed: {e}"))?;

    let output = &blended.output;
    std::fs::write(&cli.output, &output.png)
        .map_err(|e| format!("Error writing {}: {e}", cli.output.display()))?;
    log::info!(
        "Wrote {} ({}, {} bytes)",
        cli.output.display(),
        output.dimensions,
        output.png.len()
    );

    let save = cli
        .save_crops
        .map(|format| format.still_format(cli.jpeg_quality));
    Ok(RunSummary {
        params,
        bottom: summarize(bottom, &blended.a, "a", &cli.output, save)?,
        top: summarize(top, &blended.b, "b", &cli.output, save)?,
        output: cli.output.clone(),
        dimensions: output.dimensions,
        bytes: output.png.len(),
    })
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if cli.list_modes {
        for mode in BlendMode::ALL {
            println!("{:<12} {}", mode.as_str(), mode.label());
        }
        return ExitCode::SUCCESS;
    }

    let (Some(bottom), Some(top)) = (cli.bottom.as_deref(), cli.top.as_deref()) else {
        log::error!("Both a bottom and a top image are required");
        return ExitCode::FAILURE;
    };

    let summary = match run(&cli, bottom, top) {
        Ok(summary) => summary,
        Err(msg) => {
            log::error!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    if cli.json {
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                log::error!("Error serializing summary: {e}");
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}
