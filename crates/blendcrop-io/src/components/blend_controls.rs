//! Canvas size, blend mode, and opacity controls.

use blendcrop_pipeline::{BlendMode, BlendParams, CanvasSize, Opacity};
use dioxus::prelude::*;

use super::controls::{render_select, render_slider};

/// Props for the [`BlendControls`] component.
#[derive(Props, Clone, PartialEq)]
pub struct BlendControlsProps {
    /// Current parameters (read-only).
    params: BlendParams,
    /// Fired when a canvas size preset is picked.
    on_canvas_size: EventHandler<CanvasSize>,
    /// Fired when a blend mode is picked.
    on_blend_mode: EventHandler<BlendMode>,
    /// Fired when the opacity slider moves.
    on_opacity: EventHandler<Opacity>,
}

/// Parameter controls for the composite.
///
/// Only enumerated values can be emitted: canvas sizes come from
/// [`CanvasSize::PRESETS`] and blend modes from [`BlendMode::ALL`], so
/// malformed option values from the DOM are logged and ignored.
#[component]
pub fn BlendControls(props: BlendControlsProps) -> Element {
    let params = props.params;
    let on_canvas_size = props.on_canvas_size;
    let on_blend_mode = props.on_blend_mode;
    let on_opacity = props.on_opacity;

    let size_options: Vec<(String, String)> = CanvasSize::PRESETS
        .iter()
        .map(|size| (size.to_string(), size.to_string()))
        .collect();
    let mode_options: Vec<(String, String)> = BlendMode::ALL
        .iter()
        .map(|mode| (mode.as_str().to_string(), mode.label().to_string()))
        .collect();

    rsx! {
        div { class: "space-y-3",
            {render_select(
                "canvas_size",
                "Canvas Size",
                &size_options,
                &params.canvas_size.to_string(),
                move |v: String| match v.parse::<CanvasSize>() {
                    Ok(size) => on_canvas_size.call(size),
                    Err(e) => web_sys::console::warn_1(&format!("{e}").into()),
                },
            )}
            {render_select(
                "blend_mode",
                "Blend Mode",
                &mode_options,
                params.blend_mode.as_str(),
                move |v: String| match v.parse::<BlendMode>() {
                    Ok(mode) => on_blend_mode.call(mode),
                    Err(e) => web_sys::console::warn_1(&format!("{e}").into()),
                },
            )}
            {render_slider(
                "opacity",
                "Opacity",
                f64::from(params.opacity.get()),
                0.0,
                1.0,
                0.01,
                2,
                move |v: f64| {
                    #[allow(clippy::cast_possible_truncation)]
                    let v = v.clamp(0.0, 1.0) as f32;
                    match Opacity::new(v) {
                        Ok(opacity) => on_opacity.call(opacity),
                        Err(e) => web_sys::console::warn_1(&format!("{e}").into()),
                    }
                },
            )}
        }
    }
}
