//! Printing through a popup window.
//!
//! The printable page is built by [`HtmlRenderer`]; this module only
//! hosts it. The popup is opened, the page written into it with
//! `document.write`, and the browser's print dialog raised.

use brickify_export::{HtmlRenderer, Renderer};
use brickify_pipeline::MosaicResult;
use wasm_bindgen::{JsCast, JsValue};

/// Errors that can occur while opening the print window.
#[derive(Debug, thiserror::Error)]
pub enum PrintError {
    /// The browser refused to open a window, usually a popup blocker.
    #[error("the print window could not be opened")]
    Blocked,

    /// A browser API call returned an error.
    #[error("browser API error: {0}")]
    JsError(String),
}

impl From<JsValue> for PrintError {
    fn from(value: JsValue) -> Self {
        Self::JsError(format!("{value:?}"))
    }
}

/// Renders into a new browser window and prints it.
#[derive(Debug, Clone, Default)]
pub struct BrowserPrinter {
    /// Produces the page written into the window.
    pub page: HtmlRenderer,
}

impl Renderer for BrowserPrinter {
    type Handle = web_sys::Window;
    type Error = PrintError;

    fn render_printable(&self, result: &MosaicResult) -> Result<web_sys::Window, PrintError> {
        let Ok(document) = self.page.render_printable(result);

        let window = web_sys::window().ok_or_else(|| PrintError::JsError("no global window".into()))?;
        let popup = window
            .open_with_url_and_target_and_features("", "_blank", "width=800,height=600")?
            .ok_or(PrintError::Blocked)?;
        let target: web_sys::HtmlDocument = popup
            .document()
            .ok_or_else(|| PrintError::JsError("print window has no document".into()))?
            .dyn_into()
            .map_err(|e| PrintError::JsError(format!("print window document is not HTML: {e:?}")))?;

        target.open()?;
        let parts = js_sys::Array::of1(&JsValue::from_str(&document.html));
        target.write(&parts)?;
        target.close()?;

        log::info!("printing {} pieces", result.total_pieces());
        popup.print()?;
        Ok(popup)
    }
}
