//! Shared form controls: labelled range sliders and selects.

use dioxus::prelude::*;

/// Render a labelled range slider with its current value.
///
/// Values that fail to parse are reported to the console and dropped.
#[allow(clippy::too_many_arguments)]
pub fn render_slider(
    id: &str,
    label: &str,
    value: f64,
    min: f64,
    max: f64,
    step: f64,
    decimals: usize,
    mut on_input: impl FnMut(f64) + 'static,
) -> Element {
    let display = format!("{value:.decimals$}");
    let id = id.to_string();
    let label = label.to_string();

    rsx! {
        div { class: "flex flex-col gap-1",
            div { class: "flex justify-between text-sm",
                label { r#for: "{id}",
                    class: "text-[var(--text-heading)] font-medium",
                    "{label}"
                }
                span { class: "text-[var(--text-secondary)] tabular-nums",
                    "{display}"
                }
            }
            input {
                r#type: "range",
                id: "{id}",
                min: "{min}",
                max: "{max}",
                step: "{step}",
                value: "{value}",
                class: "w-full accent-[var(--btn-primary)]",
                oninput: move |e| {
                    match e.value().parse::<f64>() {
                        Ok(v) => on_input(v),
                        Err(err) => {
                            web_sys::console::warn_1(
                                &format!("slider parse failure: {err:?} from {:?}", e.value())
                                    .into(),
                            );
                        }
                    }
                },
            }
        }
    }
}

/// Render a labelled select dropdown.
///
/// `options` are `(value, display)` pairs.
pub fn render_select(
    id: &str,
    label: &str,
    options: &[(String, String)],
    selected: &str,
    mut on_change: impl FnMut(String) + 'static,
) -> Element {
    let id = id.to_string();
    let label = label.to_string();
    let options = options.to_vec();
    let selected = selected.to_string();

    rsx! {
        div { class: "flex flex-col gap-1",
            label { r#for: "{id}",
                class: "text-sm text-[var(--text-heading)] font-medium",
                "{label}"
            }
            select {
                id: "{id}",
                class: "px-2 py-1 rounded border border-[var(--border)] bg-[var(--surface)]
                        text-[var(--text)] text-sm",
                value: "{selected}",
                onchange: move |e| {
                    on_change(e.value());
                },

                for (value, display) in options.iter() {
                    option {
                        value: "{value}",
                        selected: value == &selected,
                        "{display}"
                    }
                }
            }
        }
    }
}
