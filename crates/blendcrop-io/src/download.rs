//! Saving the composite to the user's download folder.
//!
//! The encoded bytes are wrapped in an object URL (see [`raster`]) and
//! handed to a detached `<a download>` element that is clicked once.
//! Browser-only (`wasm32-unknown-unknown`).

use blendcrop_pipeline::{CompositeOutput, DOWNLOAD_FILENAME, StillFormat};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlAnchorElement};

use crate::raster::{self, RasterError};

/// Why a download could not be started.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// The object URL for the bytes could not be created.
    #[error(transparent)]
    Blob(#[from] RasterError),

    /// The page has no usable document to attach the link to.
    #[error("no document available: {0}")]
    NoDocument(&'static str),

    /// Creating or clicking the link failed.
    #[error("download link failed: {0}")]
    Link(String),
}

impl From<JsValue> for DownloadError {
    fn from(value: JsValue) -> Self {
        Self::Link(format!("{value:?}"))
    }
}

fn document() -> Result<Document, DownloadError> {
    web_sys::window()
        .ok_or(DownloadError::NoDocument("no global window"))?
        .document()
        .ok_or(DownloadError::NoDocument("window has no document"))
}

/// Offer `data` to the user as a file named `filename`.
///
/// The object URL is revoked as soon as the click has been dispatched;
/// browsers have already captured the Blob by then.
///
/// # Errors
///
/// Returns [`DownloadError`] when the Blob, the link element, or the
/// document body is unavailable.
pub fn trigger_download(data: &[u8], filename: &str, mime_type: &str) -> Result<(), DownloadError> {
    let document = document()?;
    let body = document
        .body()
        .ok_or(DownloadError::NoDocument("document has no body"))?;

    let anchor = document
        .create_element("a")?
        .dyn_into::<HtmlAnchorElement>()
        .map_err(|el| DownloadError::Link(format!("<a> is not an anchor: {el:?}")))?;

    let url = raster::bytes_to_blob_url(data, mime_type)?;
    anchor.set_href(&url);
    anchor.set_download(filename);

    let clicked = body.append_child(&anchor).map(|_| anchor.click());
    let _ = body.remove_child(&anchor);
    raster::revoke_blob_url(&url);

    Ok(clicked?)
}

/// Save a composite as `blended-image.png`.
///
/// # Errors
///
/// Same as [`trigger_download`].
pub fn download_composite(output: &CompositeOutput) -> Result<(), DownloadError> {
    trigger_download(
        &output.png,
        DOWNLOAD_FILENAME,
        StillFormat::Png.mime_type(),
    )
}
