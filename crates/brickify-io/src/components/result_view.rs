//! The finished mosaic with its dialogs, download and print.

use std::rc::Rc;
use std::sync::Arc;

use brickify_export::{MOSAIC_FILE_NAME, PIECES_FILE_NAME, Renderer, data_url, to_csv};
use brickify_pipeline::MosaicResult;
use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::{
    LdBookOpen, LdDownload, LdImage, LdPrinter, LdTable, LdZoomIn, LdZoomOut,
};

use super::PieceTableView;
use crate::download;
use crate::print::BrowserPrinter;

/// Initial width of the mosaic preview in CSS pixels.
const DEFAULT_WIDTH: u32 = 400;
/// Width change per zoom click.
const WIDTH_STEP: u32 = 50;
/// Narrowest preview.
const MIN_WIDTH: u32 = 100;
/// Widest preview.
const MAX_WIDTH: u32 = 2000;

const fn zoom_in(width: u32) -> u32 {
    let next = width.saturating_add(WIDTH_STEP);
    if next > MAX_WIDTH { MAX_WIDTH } else { next }
}

const fn zoom_out(width: u32) -> u32 {
    let next = width.saturating_sub(WIDTH_STEP);
    if next < MIN_WIDTH { MIN_WIDTH } else { next }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dialog {
    Mosaic,
    Pieces,
    Instructions,
}

/// Props for the [`ResultView`] component.
///
/// The parent re-keys the view per result so the `data:` URLs are
/// encoded once.
#[derive(Props, Clone)]
pub struct ResultViewProps {
    /// The computed mosaic.
    result: Arc<MosaicResult>,
}

impl PartialEq for ResultViewProps {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.result, &other.result)
    }
}

/// Mosaic preview with zoom, detail dialogs, download and print.
#[component]
#[allow(clippy::too_many_lines)]
pub fn ResultView(props: ResultViewProps) -> Element {
    let urls = use_hook(|| {
        Rc::new((
            data_url(&props.result.mosaic),
            data_url(&props.result.instructions),
        ))
    });
    let mut width = use_signal(|| DEFAULT_WIDTH);
    let mut dialog = use_signal(|| Option::<Dialog>::None);
    let mut action_error = use_signal(|| Option::<String>::None);

    let download_mosaic = {
        let result = Arc::clone(&props.result);
        move |_| {
            match download::trigger_download(result.mosaic.bytes(), MOSAIC_FILE_NAME, "image/png") {
                Ok(()) => action_error.set(None),
                Err(e) => action_error.set(Some(format!("Download failed: {e}"))),
            }
        }
    };

    let download_pieces = {
        let result = Arc::clone(&props.result);
        move |_| {
            let csv = to_csv(&result.pieces);
            match download::trigger_download(csv.as_bytes(), PIECES_FILE_NAME, "text/csv") {
                Ok(()) => action_error.set(None),
                Err(e) => action_error.set(Some(format!("Download failed: {e}"))),
            }
        }
    };

    let print = {
        let result = Arc::clone(&props.result);
        move |_| match BrowserPrinter::default().render_printable(&result) {
            Ok(_) => action_error.set(None),
            Err(e) => {
                log::warn!("print failed: {e}");
                action_error.set(Some(format!("Printing failed: {e}")));
            }
        }
    };

    let mosaic_url = urls.0.clone();
    let instructions_url = urls.1.clone();
    let dims = props.result.mosaic.dimensions();
    let total = props.result.total_pieces();
    let current = width();
    let pieces = props.result.pieces.clone();

    rsx! {
        div { class: "result-view",
            div { class: "toolbar",
                button {
                    class: "btn",
                    title: "Zoom out",
                    disabled: current <= MIN_WIDTH,
                    onclick: move |_| width.set(zoom_out(width())),
                    Icon { width: 16, height: 16, icon: LdZoomOut }
                }
                span { class: "field-value", "{current}px" }
                button {
                    class: "btn",
                    title: "Zoom in",
                    disabled: current >= MAX_WIDTH,
                    onclick: move |_| width.set(zoom_in(width())),
                    Icon { width: 16, height: 16, icon: LdZoomIn }
                }
                button {
                    class: "btn",
                    onclick: move |_| dialog.set(Some(Dialog::Mosaic)),
                    Icon { width: 16, height: 16, icon: LdImage }
                    " Full size"
                }
                button {
                    class: "btn",
                    onclick: move |_| dialog.set(Some(Dialog::Pieces)),
                    Icon { width: 16, height: 16, icon: LdTable }
                    " Pieces ({total})"
                }
                button {
                    class: "btn",
                    onclick: move |_| dialog.set(Some(Dialog::Instructions)),
                    Icon { width: 16, height: 16, icon: LdBookOpen }
                    " Instructions"
                }
                button { class: "btn btn-primary", onclick: download_mosaic,
                    Icon { width: 16, height: 16, icon: LdDownload }
                    " Download"
                }
                button { class: "btn", onclick: download_pieces, "Pieces CSV" }
                button { class: "btn", onclick: print,
                    Icon { width: 16, height: 16, icon: LdPrinter }
                    " Print"
                }
            }

            if let Some(ref err) = action_error() {
                p { class: "text-error", "{err}" }
            }

            div { class: "mosaic-scroll",
                img {
                    class: "mosaic",
                    src: "{mosaic_url}",
                    alt: "LEGO mosaic",
                    style: "width: {current}px;",
                }
            }
            p { class: "text-muted", "{dims} studs, {total} pieces" }

            if let Some(open) = dialog() {
                div {
                    class: "dialog-backdrop",
                    onclick: move |_| dialog.set(None),
                    div {
                        class: "dialog",
                        role: "dialog",
                        onclick: move |evt| evt.stop_propagation(),
                        button {
                            class: "btn dialog-close",
                            onclick: move |_| dialog.set(None),
                            "Close"
                        }
                        match open {
                            Dialog::Mosaic => rsx! {
                                img { class: "mosaic full", src: "{mosaic_url}", alt: "LEGO mosaic" }
                            },
                            Dialog::Pieces => rsx! {
                                PieceTableView { pieces: pieces.clone() }
                            },
                            Dialog::Instructions => rsx! {
                                img { class: "instructions", src: "{instructions_url}", alt: "Building instructions" }
                            },
                        }
                    }
                }
            }
        }
    }
}
