//! Sidebar: panel size, panel grid and zoom.

use brickify_pipeline::{Framing, LayoutParameters, PanelSize};
use dioxus::prelude::*;

use super::controls::render_slider;

/// Props for the [`LayoutControls`] component.
#[derive(Props, Clone, PartialEq)]
pub struct LayoutControlsProps {
    /// Current grid.
    layout: LayoutParameters,
    /// Current framing; `None` hides the zoom slider.
    framing: Option<Framing>,
    /// Fired with every accepted grid change.
    on_layout: EventHandler<LayoutParameters>,
    /// Fired when the zoom slider moves.
    on_framing: EventHandler<Framing>,
    /// Lock every control.
    #[props(default)]
    disabled: bool,
}

/// Parse a panel count typed into a number field.
fn parse_count(raw: &str) -> Option<u32> {
    raw.trim().parse().ok()
}

/// Panel size radio, panel counts and the zoom slider.
///
/// Grid changes that [`LayoutParameters`] rejects (zero panels, more
/// than [`LayoutParameters::MAX_TOTAL_PANELS`]) are shown inline and not
/// forwarded.
#[component]
pub fn LayoutControls(props: LayoutControlsProps) -> Element {
    let mut error = use_signal(|| Option::<String>::None);
    let layout = props.layout;
    let on_layout = props.on_layout;
    let on_framing = props.on_framing;
    let disabled = props.disabled;

    let mut set_panels = move |wide: Option<u32>, high: Option<u32>| {
        let (Some(wide), Some(high)) = (wide, high) else {
            error.set(Some("Enter a whole number of panels.".into()));
            return;
        };
        match layout.with_panels(wide, high) {
            Ok(next) => {
                error.set(None);
                on_layout.call(next);
            }
            Err(e) => error.set(Some(e.to_string())),
        }
    };

    let max = LayoutParameters::MAX_TOTAL_PANELS;
    let wide = layout.panels_wide();
    let high = layout.panels_high();

    rsx! {
        div { class: "layout-controls",
            fieldset { class: "field", disabled,
                legend { class: "field-label", "Panel size" }
                for size in PanelSize::ALL {
                    label { key: "{size}", class: "radio",
                        input {
                            r#type: "radio",
                            name: "panel-size",
                            value: "{size}",
                            checked: layout.panel_size() == size,
                            onchange: move |_| on_layout.call(layout.with_panel_size(size)),
                        }
                        "{size} x {size} studs"
                    }
                }
            }

            div { class: "field",
                label { r#for: "panels-wide", class: "field-label", "Panels wide" }
                input {
                    r#type: "number",
                    id: "panels-wide",
                    min: "1",
                    max: "{max}",
                    value: "{wide}",
                    disabled,
                    onchange: move |e| set_panels(parse_count(&e.value()), Some(high)),
                }
            }
            div { class: "field",
                label { r#for: "panels-high", class: "field-label", "Panels high" }
                input {
                    r#type: "number",
                    id: "panels-high",
                    min: "1",
                    max: "{max}",
                    value: "{high}",
                    disabled,
                    onchange: move |e| set_panels(Some(wide), parse_count(&e.value())),
                }
            }
            if let Some(ref err) = error() {
                p { class: "text-error", "{err}" }
            }

            if let Some(framing) = props.framing {
                {render_slider(
                    "zoom", "Zoom", framing.zoom, Framing::MIN_ZOOM, Framing::MAX_ZOOM,
                    Framing::ZOOM_STEP, 1, disabled,
                    move |v| on_framing.call(framing.with_zoom(v)),
                )}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_parse_with_whitespace() {
        assert_eq!(parse_count(" 4 "), Some(4));
        assert_eq!(parse_count("0"), Some(0));
    }

    #[test]
    fn non_numbers_are_rejected() {
        assert_eq!(parse_count(""), None);
        assert_eq!(parse_count("-1"), None);
        assert_eq!(parse_count("2.5"), None);
    }
}
