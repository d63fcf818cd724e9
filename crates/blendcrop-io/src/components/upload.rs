//! File upload component with drag-and-drop and file picker.

use blendcrop_pipeline::PipelineError;
use blendcrop_pipeline::intake::{self, AcceptedUpload};
use dioxus::html::{FileData, HasFileData};
use dioxus::prelude::*;

/// Props for the [`FileUpload`] component.
#[derive(Props, Clone, PartialEq)]
pub struct FileUploadProps {
    /// Element id prefix; keeps the two upload zones' inputs distinct.
    id: String,
    /// Called once the file passes the intake check.
    on_upload: EventHandler<AcceptedUpload>,
    /// Called when a file is rejected at intake.
    on_reject: EventHandler<PipelineError>,
}

/// A drag-and-drop zone with a file picker button.
///
/// Accepts PNG and JPEG images. A file whose name or content is not an
/// accepted image shows a warning and never reaches `on_upload`.
#[component]
pub fn FileUpload(props: FileUploadProps) -> Element {
    let mut dragging = use_signal(|| false);
    let mut filename = use_signal(|| Option::<String>::None);
    let mut error = use_signal(|| Option::<String>::None);

    // Shared by the file-picker and drag-and-drop paths.
    let process_files = move |files: Vec<FileData>| async move {
        let Some(file) = files.first() else {
            return;
        };
        let name = file.name();
        if !intake::has_allowed_extension(&name) {
            error.set(Some(format!("Unsupported file type: {name}")));
            props.on_reject.call(PipelineError::InvalidFileType(name));
            return;
        }
        let bytes = match file.read_bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(e) => {
                error.set(Some(format!("Failed to read file: {e}")));
                return;
            }
        };
        match intake::accept(name, bytes) {
            Ok(upload) => {
                filename.set(Some(upload.name.clone()));
                error.set(None);
                props.on_upload.call(upload);
            }
            Err(e) => {
                error.set(Some(format!("{e}")));
                props.on_reject.call(e);
            }
        }
    };

    let handle_files = move |evt: FormEvent| async move {
        process_files(evt.files()).await;
    };

    let handle_drop = move |evt: DragEvent| async move {
        evt.prevent_default();
        dragging.set(false);
        process_files(evt.files()).await;
    };

    let border_class = if dragging() {
        "border-[var(--border-accent)] bg-[var(--surface-active)]"
    } else {
        "border-[var(--border-muted)] bg-[var(--surface)]"
    };
    let input_id = format!("{}-file", props.id);

    rsx! {
        div {
            class: "border-2 border-dashed rounded-lg p-4 text-center transition-colors {border_class}",
            ondragover: move |evt| {
                evt.prevent_default();
                dragging.set(true);
            },
            ondragleave: move |_| {
                dragging.set(false);
            },
            ondrop: handle_drop,

            if let Some(ref name) = filename() {
                p { class: "text-[var(--text-success)] mb-2",
                    "Loaded: {name}"
                }
            }

            if let Some(ref err) = error() {
                p { class: "text-[var(--text-error)] mb-2",
                    "{err}"
                }
            }

            p { class: "text-[var(--text-secondary)] mb-3",
                "Drop an image here or "
            }

            label {
                r#for: "{input_id}",
                class: "inline-block px-4 py-2 bg-[var(--btn-primary)] hover:bg-[var(--btn-primary-hover)] rounded cursor-pointer text-white font-medium transition-colors",
                input {
                    id: "{input_id}",
                    r#type: "file",
                    accept: intake::ACCEPT_ATTRIBUTE,
                    class: "hidden",
                    onchange: handle_files,
                }
                "Choose File"
            }

            p { class: "text-[var(--muted)] text-sm mt-2",
                "PNG, JPEG"
            }
        }
    }
}
