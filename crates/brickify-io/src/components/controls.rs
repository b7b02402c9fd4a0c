//! Shared form-control helpers.

use dioxus::prelude::*;

/// Render a labeled range slider.
///
/// `on_input` receives the parsed value; unparsable input is logged to
/// the console and dropped.
#[allow(clippy::too_many_arguments)]
pub(super) fn render_slider(
    id: &str,
    label: &str,
    value: f64,
    min: f64,
    max: f64,
    step: f64,
    decimals: usize,
    disabled: bool,
    on_input: impl Fn(f64) + 'static,
) -> Element {
    let display = format!("{value:.decimals$}");
    let id = id.to_string();
    let label = label.to_string();

    rsx! {
        div { class: "field",
            div { class: "field-row",
                label { r#for: "{id}", class: "field-label", "{label}" }
                span { class: "field-value", "{display}" }
            }
            input {
                r#type: "range",
                id: "{id}",
                min: "{min}",
                max: "{max}",
                step: "{step}",
                value: "{value}",
                disabled,
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
