//! One input layer: upload, crop window, and the finalized still.

use blendcrop_pipeline::encode::{self, StillFormat};
use blendcrop_pipeline::intake::AcceptedUpload;
use blendcrop_pipeline::{
    CropChoice, CropRect, Dimensions, ImageHandle, Layer, PipelineError, RgbaImage, Slot, decode,
};
use dioxus::prelude::*;

use super::crop_editor::CropEditor;
use super::upload::FileUpload;
use crate::raster;

/// Encoding of the finalized-still thumbnail.
const THUMBNAIL_FORMAT: StillFormat = StillFormat::Jpeg {
    quality: StillFormat::DEFAULT_JPEG_QUALITY,
};

/// Props for the [`ImageSlot`] component.
#[derive(Props, Clone, PartialEq)]
pub struct ImageSlotProps {
    /// Which layer this panel feeds.
    slot: Slot,
    /// Aspect ratio of the crop window (the canvas aspect ratio).
    aspect: f64,
    /// Called with the cropped still when the user confirms a crop.
    on_finalize: EventHandler<(Slot, RgbaImage)>,
    /// Called when an upload is rejected at intake.
    on_reject: EventHandler<PipelineError>,
}

/// An uploaded source and the Blob URL it is displayed through.
#[derive(Clone)]
struct LoadedSource {
    handle: ImageHandle,
    url: String,
}

/// Crop the loaded source and close it.
///
/// Returns the cropped layer and the source's Blob URL, which the caller
/// revokes. On error the source stays loaded so the crop can be retried.
fn take_crop(
    source: &mut Option<LoadedSource>,
    rect: CropRect,
    aspect: f64,
) -> Result<Option<(Layer, String)>, PipelineError> {
    let Some(loaded) = source.take() else {
        return Ok(None);
    };
    match Layer::new(loaded.handle.clone(), CropChoice::Rect(rect), aspect) {
        Ok(layer) => Ok(Some((layer, loaded.url))),
        Err(e) => {
            *source = Some(loaded);
            Err(e)
        }
    }
}

/// Upload zone, crop editor and finalized-still thumbnail for one layer.
///
/// Confirming a crop closes the editor; uploading again reopens it.
#[component]
pub fn ImageSlot(props: ImageSlotProps) -> Element {
    let slot = props.slot;
    let mut source = use_signal(|| Option::<LoadedSource>::None);
    let mut still = use_signal(|| Option::<(String, Dimensions)>::None);
    let mut error = use_signal(|| Option::<String>::None);

    use_drop(move || {
        if let Some(ref loaded) = *source.peek() {
            raster::revoke_blob_url(&loaded.url);
        }
    });

    let mut close_source = move || {
        if let Some(old) = source.take() {
            raster::revoke_blob_url(&old.url);
        }
    };

    let on_upload = move |upload: AcceptedUpload| {
        let name = &upload.name;
        let handle = match decode::decode(&upload.bytes) {
            Ok(handle) => handle,
            Err(e) => {
                error.set(Some(format!("Could not read {name}: {e}")));
                return;
            }
        };
        match raster::bytes_to_blob_url(&upload.bytes, upload.mime_type()) {
            Ok(url) => {
                close_source();
                error.set(None);
                source.set(Some(LoadedSource { handle, url }));
            }
            Err(e) => error.set(Some(format!("Could not display {name}: {e}"))),
        }
    };

    let on_finalize = props.on_finalize;
    let aspect = props.aspect;
    let on_crop = move |rect: CropRect| {
        let taken = take_crop(&mut source.write(), rect, aspect);
        let (layer, url) = match taken {
            Ok(Some(taken)) => taken,
            Ok(None) => return,
            Err(e) => {
                error.set(Some(format!("Crop failed: {e}")));
                return;
            }
        };
        raster::revoke_blob_url(&url);
        match layer.encode_still(THUMBNAIL_FORMAT) {
            Ok(bytes) => {
                let uri = encode::to_data_uri(&bytes, THUMBNAIL_FORMAT.mime_type());
                still.set(Some((uri, rect.dimensions())));
            }
            Err(e) => {
                web_sys::console::warn_1(&format!("thumbnail failed: {e}").into());
                still.set(None);
            }
        }
        on_finalize.call((slot, layer.still));
    };

    let id = match slot {
        Slot::A => "slot-a",
        Slot::B => "slot-b",
    };
    let role = match slot {
        Slot::A => "Bottom layer",
        Slot::B => "Top layer",
    };

    rsx! {
        div { class: "flex-1 bg-[var(--surface)] rounded p-4 space-y-3",
            div {
                h3 { class: "text-lg font-semibold text-[var(--text-heading)]", "{slot}" }
                p { class: "text-xs text-[var(--text-secondary)]", "{role}" }
            }

            FileUpload {
                id: id.to_string(),
                on_upload: on_upload,
                on_reject: props.on_reject,
            }

            if let Some(ref err) = error() {
                p { class: "text-[var(--text-error)] text-sm", "{err}" }
            }

            if let Some(loaded) = source() {
                CropEditor {
                    key: "{loaded.url}",
                    id: id.to_string(),
                    source: loaded.handle.clone(),
                    source_url: loaded.url.clone(),
                    aspect: props.aspect,
                    on_crop: on_crop,
                }
            }

            if let Some((ref url, dims)) = still() {
                div { class: "space-y-1",
                    p { class: "text-sm text-[var(--text-secondary)]", "Cropped {dims}" }
                    img {
                        src: "{url}",
                        class: "w-24 h-auto rounded border border-[var(--border)]",
                        alt: "{slot} cropped",
                    }
                }
            }
        }
    }
}
