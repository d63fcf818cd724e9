//! Composite preview.

use std::rc::Rc;

use blendcrop_pipeline::{CompositeOutput, SessionState, StillFormat};
use dioxus::prelude::*;

use crate::raster;

/// Props for the [`Preview`] component.
#[derive(Props, Clone)]
pub struct PreviewProps {
    /// Latest published composite, if any.
    result: Option<Rc<CompositeOutput>>,
    /// Session state, used for the placeholder text.
    state: SessionState,
    /// Whether a composite is being rendered.
    processing: bool,
}

impl PartialEq for PreviewProps {
    fn eq(&self, other: &Self) -> bool {
        let results_eq = match (&self.result, &other.result) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        results_eq && self.state == other.state && self.processing == other.processing
    }
}

/// Shows the latest composite as an `<img>` backed by a Blob URL.
///
/// While a newer composite renders, the previous one stays visible and
/// a progress note is shown above it.
#[component]
pub fn Preview(props: PreviewProps) -> Element {
    // Track the current blob URL so it is revoked on re-render and on
    // unmount even if the image never fires onload.
    let mut prev_blob_url: Signal<Option<String>> = use_signal(|| None);
    use_drop(move || {
        if let Some(ref url) = *prev_blob_url.peek() {
            raster::revoke_blob_url(url);
        }
    });

    let status = if props.processing {
        rsx! {
            p { class: "text-[var(--text-secondary)] text-sm animate-pulse", "Processing..." }
        }
    } else {
        rsx! {}
    };

    let Some(ref output) = props.result else {
        let placeholder = match props.state {
            SessionState::Empty => "Upload and crop two images to get started",
            SessionState::AwaitingSecondImage => "Crop the second image to see the blend",
            SessionState::Ready => "Rendering...",
        };
        return rsx! {
            div { class: "flex-1 flex items-center justify-center min-h-64",
                p { class: "text-[var(--text-placeholder)] text-lg", "{placeholder}" }
            }
        };
    };

    if let Some(ref prev) = prev_blob_url.take() {
        raster::revoke_blob_url(prev);
    }

    let dims = output.dimensions;
    let mode = output.params.blend_mode.label();
    let opacity = output.params.opacity;

    match raster::bytes_to_blob_url(&output.png, StillFormat::Png.mime_type()) {
        Ok(url) => {
            prev_blob_url.set(Some(url.clone()));
            rsx! {
                div { class: "space-y-2",
                    {status}
                    img {
                        src: "{url}",
                        class: "w-full h-auto max-h-[70vh] bg-[var(--preview-bg)] rounded object-contain",
                        alt: "Blended image preview",
                    }
                    p { class: "text-xs text-[var(--text-secondary)]",
                        "{dims} · {mode} · opacity {opacity}"
                    }
                }
            }
        }
        Err(e) => rsx! {
            p { class: "text-[var(--text-error)] text-sm", "Failed to show preview: {e}" }
        },
    }
}
