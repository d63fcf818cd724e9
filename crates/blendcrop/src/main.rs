use std::rc::Rc;

use blendcrop_io::{BlendControls, ExportPanel, ImageSlot, Preview};
use blendcrop_pipeline::{
    BlendMode, CanvasSize, CompositeOutput, CompositeRequest, Opacity, PipelineError,
    PublishOutcome, RgbaImage, Session, Slot,
};
use dioxus::prelude::*;

fn main() {
    dioxus::launch(app);
}

/// Root application component.
///
/// Owns the editing [`Session`] in a signal and wires together the two
/// image slots, the blend controls, the preview, and the export panel.
#[allow(clippy::too_many_lines)]
fn app() -> Element {
    // --- Application state ---
    let mut session = use_signal(Session::new);
    let mut pending = use_signal(|| Option::<CompositeRequest>::None);
    let mut result = use_signal(|| Option::<Rc<CompositeOutput>>::None);
    let mut processing = use_signal(|| false);
    let mut error = use_signal(|| Option::<String>::None);

    // Every session call that returns a request schedules a composite.
    let mut schedule = move |request: Option<CompositeRequest>| {
        if let Some(request) = request {
            pending.set(Some(request));
        }
    };

    // --- Composite effect ---
    // Re-runs whenever a new request is scheduled. Spawns an async task
    // so the "Processing..." indicator renders before the synchronous
    // compositor blocks the thread.
    use_effect(move || {
        let Some(request) = pending() else {
            return;
        };

        processing.set(true);
        error.set(None);

        spawn(async move {
            // Yield to the browser event loop so it can paint the
            // "Processing..." state before compositing.
            gloo_timers::future::TimeoutFuture::new(0).await;

            let outcome = request.run();

            // Only the latest request may publish; a stale result is
            // dropped and the newer task owns the processing flag.
            let published = session.write().publish(request.generation, outcome);
            match published {
                PublishOutcome::Published => {
                    let latest = session.peek().result().cloned().map(Rc::new);
                    result.set(latest);
                    processing.set(false);
                }
                PublishOutcome::Stale => {}
                PublishOutcome::Failed(e) => {
                    // Keep the previous composite visible.
                    error.set(Some(format!("Blend failed: {e}")));
                    processing.set(false);
                }
            }
        });
    });

    // --- Slot handlers ---
    let on_finalize = move |(slot, still): (Slot, RgbaImage)| {
        let request = session.write().finalize(slot, still);
        schedule(request);
    };

    let on_reject = move |err: PipelineError| {
        session.peek().reject_upload(&err);
    };

    // --- Parameter handlers ---
    let on_canvas_size = move |size: CanvasSize| {
        let request = session.write().set_canvas_size(size);
        schedule(request);
    };

    let on_blend_mode = move |mode: BlendMode| {
        let request = session.write().set_blend_mode(mode);
        schedule(request);
    };

    let on_opacity = move |opacity: Opacity| {
        let request = session.write().set_opacity(opacity);
        schedule(request);
    };

    let params = session.read().params();
    let state = session.read().state();
    let aspect = params.canvas_size.aspect_ratio();

    // --- Layout ---
    rsx! {
        // Tailwind CSS utilities, compiled by build.rs via npx @tailwindcss/cli.
        style { dangerous_inner_html: include_str!(env!("TAILWIND_CSS_PATH")) }

        // Theme variables, copied from assets/theme.css by build.rs.
        style { dangerous_inner_html: include_str!(env!("THEME_CSS_PATH")) }

        div { class: "min-h-screen bg-(--bg) text-(--text) flex flex-col",
            // Header
            header { class: "px-6 py-4 border-b border-(--border)",
                h1 { class: "text-2xl font-semibold", "blendcrop" }
                p { class: "text-(--muted) text-sm",
                    "Crop two images and blend them into one"
                }
            }

            // Main content area
            div { class: "flex-1 flex flex-col lg:flex-row gap-6 p-6",
                // Left column: the two layers
                div { class: "flex-1 flex flex-col md:flex-row gap-4",
                    for slot in Slot::ALL {
                        ImageSlot {
                            key: "{slot}",
                            slot: slot,
                            aspect: aspect,
                            on_finalize: on_finalize,
                            on_reject: on_reject,
                        }
                    }
                }

                // Right column: controls, preview, export
                div { class: "lg:w-[28rem] flex-shrink-0 flex flex-col gap-4",
                    div { class: "bg-[var(--surface)] rounded p-4",
                        h3 { class: "text-sm font-semibold text-[var(--text-heading)] mb-2",
                            "Blend"
                        }
                        BlendControls {
                            params: params,
                            on_canvas_size: on_canvas_size,
                            on_blend_mode: on_blend_mode,
                            on_opacity: on_opacity,
                        }
                    }

                    Preview {
                        result: result(),
                        state: state,
                        processing: processing(),
                    }

                    // Error display
                    if let Some(ref err) = error() {
                        div { class: "bg-(--error-bg) border border-(--error-border) rounded p-3",
                            p { class: "text-(--text-error) text-sm", "{err}" }
                        }
                    }

                    ExportPanel {
                        result: result(),
                    }
                }
            }
        }
    }
}
