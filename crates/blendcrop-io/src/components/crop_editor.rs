//! Crop window over an uploaded source image.
//!
//! Pointer gestures are out of scope; the window is driven by zoom and
//! pan sliders and drawn as an outlined overlay on the source preview.

use blendcrop_pipeline::crop::{self, CropView};
use blendcrop_pipeline::{CropRect, Dimensions, ImageHandle};
use dioxus::prelude::*;

use super::controls::render_slider;

/// Props for the [`CropEditor`] component.
#[derive(Props, Clone)]
pub struct CropEditorProps {
    /// Element id prefix for the sliders.
    id: String,
    /// Decoded source image.
    source: ImageHandle,
    /// Blob URL of the source for display.
    source_url: String,
    /// Width / height of the crop window (the canvas aspect ratio).
    aspect: f64,
    /// Called with the selected rectangle when the user confirms.
    on_crop: EventHandler<CropRect>,
}

impl PartialEq for CropEditorProps {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.source.ptr_eq(&other.source)
            && self.source_url == other.source_url
            && self.aspect.to_bits() == other.aspect.to_bits()
            && self.on_crop == other.on_crop
    }
}

/// Overlay position as CSS percentages of the source image.
fn overlay_style(rect: CropRect, image: Dimensions) -> String {
    let pct = |v: u32, of: u32| f64::from(v) * 100.0 / f64::from(of);
    format!(
        "left: {:.3}%; top: {:.3}%; width: {:.3}%; height: {:.3}%;",
        pct(rect.x, image.width),
        pct(rect.y, image.height),
        pct(rect.width, image.width),
        pct(rect.height, image.height),
    )
}

/// Source preview with a crop window, zoom/pan sliders and a Crop button.
#[component]
pub fn CropEditor(props: CropEditorProps) -> Element {
    let mut view = use_signal(CropView::default);
    let mut error = use_signal(|| Option::<String>::None);

    let dims = props.source.dimensions();
    let current = view();
    let rect = crop::crop_rect_for_view(dims, props.aspect, current);

    let on_confirm = {
        let on_crop = props.on_crop;
        let selected = rect.as_ref().copied().map_err(ToString::to_string);
        move |_| match &selected {
            Ok(rect) => {
                error.set(None);
                on_crop.call(*rect);
            }
            Err(e) => error.set(Some(format!("Crop failed: {e}"))),
        }
    };

    let overlay = match rect {
        Ok(rect) => {
            let style = overlay_style(rect, dims);
            rsx! {
                div {
                    class: "absolute border-2 border-white pointer-events-none",
                    style: "{style} box-shadow: 0 0 0 9999px rgba(0, 0, 0, 0.5);",
                }
            }
        }
        Err(e) => rsx! {
            p { class: "absolute inset-x-0 bottom-0 text-[var(--text-error)] text-sm",
                "{e}"
            }
        },
    };

    let zoom_id = format!("{}-zoom", props.id);
    let pan_x_id = format!("{}-pan-x", props.id);
    let pan_y_id = format!("{}-pan-y", props.id);

    rsx! {
        div { class: "space-y-3",
            div { class: "relative overflow-hidden rounded bg-[var(--preview-bg)]",
                img {
                    src: "{props.source_url}",
                    class: "block w-full h-auto select-none",
                    alt: "Source image",
                    draggable: "false",
                }
                {overlay}
            }

            {render_slider(
                &zoom_id,
                "Zoom",
                current.zoom,
                1.0,
                CropView::MAX_ZOOM,
                0.01,
                2,
                move |v: f64| view.write().zoom = v,
            )}
            {render_slider(
                &pan_x_id,
                "Horizontal",
                current.center_x,
                0.0,
                1.0,
                0.01,
                2,
                move |v: f64| view.write().center_x = v,
            )}
            {render_slider(
                &pan_y_id,
                "Vertical",
                current.center_y,
                0.0,
                1.0,
                0.01,
                2,
                move |v: f64| view.write().center_y = v,
            )}

            if let Some(ref err) = error() {
                p { class: "text-[var(--text-error)] text-sm", "{err}" }
            }

            button {
                class: "px-4 py-2 bg-[var(--btn-primary)] hover:bg-[var(--btn-primary-hover)] rounded text-white font-medium transition-colors cursor-pointer",
                onclick: on_confirm,
                "Crop"
            }
        }
    }
}
