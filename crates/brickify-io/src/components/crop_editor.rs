//! Crop editor: the picked photo with the crop frame drawn over it.
//!
//! The frame always has the aspect ratio of the panel layout. Its size
//! follows the zoom slider in the sidebar; clicking the photo or moving
//! the position sliders moves its centre.

use std::rc::Rc;
use std::sync::Arc;

use brickify_pipeline::{CropSelection, Framing, SourceImage};
use dioxus::prelude::*;

use super::controls::render_slider;
use crate::raster::BlobUrl;

/// Props for the [`CropEditor`] component.
///
/// The parent re-keys the editor whenever a new photo is picked so the
/// object URL is created once per photo.
#[derive(Props, Clone)]
pub struct CropEditorProps {
    /// The picked photo.
    source: Arc<SourceImage>,
    /// Effective selection, normalised or in display pixels.
    selection: CropSelection,
    /// Current zoom and focus.
    framing: Framing,
    /// Fired when the focus point moves.
    on_framing: EventHandler<Framing>,
    /// Freeze the frame while a submission runs.
    #[props(default)]
    disabled: bool,
}

impl PartialEq for CropEditorProps {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.source, &other.source)
            && self.selection == other.selection
            && self.framing == other.framing
            && self.on_framing == other.on_framing
            && self.disabled == other.disabled
    }
}

/// CSS `left/top/width/height` percentages of the frame.
fn frame_style(selection: &CropSelection) -> String {
    let CropSelection { rect, display } = *selection;
    let pct = |v: f64, total: f64| {
        if total > 0.0 { (v / total * 100.0).clamp(0.0, 100.0) } else { 0.0 }
    };
    format!(
        "left: {:.3}%; top: {:.3}%; width: {:.3}%; height: {:.3}%;",
        pct(rect.x, display.width),
        pct(rect.y, display.height),
        pct(rect.width, display.width),
        pct(rect.height, display.height),
    )
}

/// The photo with a movable crop frame and position sliders.
#[component]
pub fn CropEditor(props: CropEditorProps) -> Element {
    let url = use_hook(|| {
        let source = &props.source;
        match BlobUrl::new(source.bytes(), source.format().output_format().mime_type()) {
            Ok(url) => Some(Rc::new(url)),
            Err(e) => {
                log::warn!("could not show {}: {e}", source.file_name());
                None
            }
        }
    });
    let mut surface = use_signal(|| Option::<Rc<MountedData>>::None);

    let framing = props.framing;
    let on_framing = props.on_framing;
    let disabled = props.disabled;
    let style = frame_style(&props.selection);
    let caption = format!("{} ({})", props.source.file_name(), props.source.dimensions());
    let alt = props.source.file_name().to_owned();

    let handle_click = move |evt: MouseEvent| {
        if disabled {
            return;
        }
        let point = evt.element_coordinates();
        let Some(mounted) = surface() else {
            return;
        };
        spawn(async move {
            match mounted.get_client_rect().await {
                Ok(rect) if rect.size.width > 0.0 && rect.size.height > 0.0 => {
                    on_framing.call(framing.with_center(
                        point.x / rect.size.width,
                        point.y / rect.size.height,
                    ));
                }
                Ok(_) => {}
                Err(e) => log::debug!("crop surface size unavailable: {e:?}"),
            }
        });
    };

    rsx! {
        div { class: "crop-editor",
            div {
                class: if disabled { "crop-surface frozen" } else { "crop-surface" },
                onmounted: move |evt| surface.set(Some(evt.data())),
                onclick: handle_click,
                if let Some(ref url) = url {
                    img {
                        src: url.as_str().to_owned(),
                        alt: "{alt}",
                        draggable: "false",
                    }
                } else {
                    p { class: "text-error", "This image cannot be displayed." }
                }
                div { class: "crop-frame", style: "{style}" }
            }
            p { class: "text-muted", "{caption}" }
            div { class: "crop-sliders",
                {render_slider(
                    "center-x", "Horizontal position", framing.center_x, 0.0, 1.0, 0.01, 2,
                    disabled,
                    move |v| on_framing.call(framing.with_center(v, framing.center_y)),
                )}
                {render_slider(
                    "center-y", "Vertical position", framing.center_y, 0.0, 1.0, 0.01, 2,
                    disabled,
                    move |v| on_framing.call(framing.with_center(framing.center_x, v)),
                )}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use brickify_pipeline::{DisplayRect, DisplaySize};

    use super::*;

    #[test]
    fn normalised_selection_maps_to_percentages() {
        let style = frame_style(&CropSelection::normalized(0.125, 0.0, 0.75, 1.0));
        assert_eq!(
            style,
            "left: 12.500%; top: 0.000%; width: 75.000%; height: 100.000%;"
        );
    }

    #[test]
    fn display_pixel_selection_maps_to_percentages() {
        let selection = CropSelection::new(
            DisplayRect::new(100.0, 75.0, 200.0, 150.0),
            DisplaySize::new(400.0, 300.0),
        );
        assert_eq!(
            frame_style(&selection),
            "left: 25.000%; top: 25.000%; width: 50.000%; height: 50.000%;"
        );
    }

    #[test]
    fn zero_display_draws_nothing() {
        let selection = CropSelection::new(
            DisplayRect::new(1.0, 1.0, 1.0, 1.0),
            DisplaySize::new(0.0, 0.0),
        );
        assert_eq!(
            frame_style(&selection),
            "left: 0.000%; top: 0.000%; width: 0.000%; height: 0.000%;"
        );
    }
}
