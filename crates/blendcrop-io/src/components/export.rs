//! Download button for the latest composite.

use std::rc::Rc;

use blendcrop_pipeline::{CompositeOutput, DOWNLOAD_FILENAME};
use dioxus::prelude::*;

use crate::download;

/// Props for the [`ExportPanel`] component.
#[derive(Props, Clone)]
pub struct ExportPanelProps {
    /// The composite to export. `None` disables the button.
    result: Option<Rc<CompositeOutput>>,
}

impl PartialEq for ExportPanelProps {
    fn eq(&self, other: &Self) -> bool {
        match (&self.result, &other.result) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn human_size(bytes: usize) -> String {
    let kib = bytes as f64 / 1024.0;
    if kib < 1024.0 {
        format!("{kib:.0} KB")
    } else {
        format!("{:.1} MB", kib / 1024.0)
    }
}

/// Saves the composite as `blended-image.png`.
///
/// A failed download is reported next to the button until a new
/// composite replaces the one that failed.
#[component]
pub fn ExportPanel(props: ExportPanelProps) -> Element {
    let mut failure = use_signal(|| Option::<(Rc<CompositeOutput>, String)>::None);

    let error = failure.read().as_ref().and_then(|(failed, msg)| {
        props
            .result
            .as_ref()
            .is_some_and(|current| Rc::ptr_eq(current, failed))
            .then(|| msg.clone())
    });

    let label = props.result.as_ref().map_or_else(
        || "Download PNG".to_string(),
        |res| format!("Download PNG ({})", human_size(res.png.len())),
    );

    let on_click = {
        let result = props.result.clone();
        move |_| {
            let Some(ref res) = result else {
                return;
            };
            match download::download_composite(res) {
                Ok(()) => failure.set(None),
                Err(e) => failure.set(Some((Rc::clone(res), format!("Download failed: {e}")))),
            }
        }
    };

    let button_class = if props.result.is_some() {
        "px-4 py-2 bg-[var(--btn-primary)] hover:bg-[var(--btn-primary-hover)] rounded text-white font-medium transition-colors cursor-pointer"
    } else {
        "px-4 py-2 bg-[var(--btn-disabled)] rounded text-[var(--text-disabled)] cursor-not-allowed"
    };

    rsx! {
        div { class: "space-y-3",
            h3 { class: "text-lg font-semibold text-[var(--text-heading)]", "Export" }

            if let Some(err) = error {
                p { class: "text-[var(--text-error)] text-sm", "{err}" }
            }

            button {
                class: button_class,
                disabled: props.result.is_none(),
                title: DOWNLOAD_FILENAME,
                onclick: on_click,
                "{label}"
            }
        }
    }
}
