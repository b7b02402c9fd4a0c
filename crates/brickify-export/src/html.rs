//! Printable HTML document.
//!
//! [`HtmlRenderer`] builds a self-contained page: the mosaic embedded as
//! a `data:` URL, the piece table with a total row, and print CSS. The
//! page optionally carries the instructions diagram on its own sheet.
//!
//! This is a pure function with no I/O -- it returns a `String`.

use std::convert::Infallible;
use std::fmt::Write;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use brickify_pipeline::{MosaicResult, RenderedImage};

/// Turns a mosaic result into something the platform can print.
pub trait Renderer {
    /// What the renderer produces, e.g. an HTML document or an open
    /// print window.
    type Handle;
    /// Failure while producing the handle.
    type Error;

    /// Produce a printable view of `result`.
    ///
    /// # Errors
    ///
    /// Implementation-defined.
    fn render_printable(&self, result: &MosaicResult) -> Result<Self::Handle, Self::Error>;
}

/// A finished HTML page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintDocument {
    /// The page title, also used for the print window.
    pub title: String,
    /// Complete HTML source.
    pub html: String,
}

/// Text and options for the printable page.
#[derive(Debug, Clone)]
pub struct HtmlRenderer {
    /// `<title>` of the page.
    pub title: String,
    /// Heading above the mosaic.
    pub heading: String,
    /// Caption of the piece table.
    pub caption: String,
    /// Append the instructions diagram on a separate page.
    pub include_instructions: bool,
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self {
            title: "LEGO Mosaic Printing".into(),
            heading: "LEGO Creator - Mosaic Printing".into(),
            caption: "Pieces needed to build the image".into(),
            include_instructions: true,
        }
    }
}

impl Renderer for HtmlRenderer {
    type Handle = PrintDocument;
    type Error = Infallible;

    fn render_printable(&self, result: &MosaicResult) -> Result<PrintDocument, Infallible> {
        Ok(PrintDocument {
            title: self.title.clone(),
            html: self.to_html(result),
        })
    }
}

const PRINT_CSS: &str = "\
body { font-family: Arial, sans-serif; }
.print-header { text-align: center; margin-bottom: 20px; }
.print-image { text-align: center; margin-bottom: 20px; }
.print-image img { width: 100%; max-height: 600px; object-fit: contain; image-rendering: pixelated; }
.print-table table { width: 100%; margin-bottom: 20px; border-collapse: collapse; }
.print-table th, .print-table td { border: 1px solid #ddd; padding: 8px; }
.print-table th { background-color: #f2f2f2; }
.print-table caption { font-weight: bold; margin-bottom: 10px; }
.print-table .total td { font-weight: bold; }
.print-instructions { text-align: center; margin-bottom: 20px; }
.print-instructions img { max-width: 100%; height: auto; }
@media print {
  .print-instructions { page-break-before: always; }
}
";

impl HtmlRenderer {
    /// Build the page source.
    #[must_use]
    pub fn to_html(&self, result: &MosaicResult) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "<!DOCTYPE html>");
        let _ = writeln!(out, "<html>");
        let _ = writeln!(out, "<head>");
        let _ = writeln!(out, r#"<meta charset="utf-8">"#);
        let _ = writeln!(out, "<title>{}</title>", html_escape(&self.title));
        let _ = writeln!(out, "<style>\n{PRINT_CSS}</style>");
        let _ = writeln!(out, "</head>");
        let _ = writeln!(out, "<body>");

        let _ = writeln!(
            out,
            r#"<div class="print-header"><h1>{}</h1></div>"#,
            html_escape(&self.heading)
        );
        let _ = writeln!(
            out,
            r#"<div class="print-image"><img src="{}" alt="LEGO Mosaic"></div>"#,
            data_url(&result.mosaic)
        );

        let _ = writeln!(out, r#"<div class="print-table">"#);
        let _ = writeln!(out, "<table>");
        let _ = writeln!(out, "<caption>{}</caption>", html_escape(&self.caption));
        let _ = writeln!(out, "<thead><tr><th>Color</th><th>1 x 1</th></tr></thead>");
        let _ = writeln!(out, "<tbody>");
        for entry in result.pieces.entries() {
            let _ = writeln!(
                out,
                "<tr><td>{}</td><td>{}</td></tr>",
                html_escape(&entry.label),
                entry.count
            );
        }
        let _ = writeln!(
            out,
            r#"<tr class="total"><td>Total</td><td>{}</td></tr>"#,
            result.total_pieces()
        );
        let _ = writeln!(out, "</tbody>");
        let _ = writeln!(out, "</table>");
        let _ = writeln!(out, "</div>");

        if self.include_instructions {
            let _ = writeln!(
                out,
                r#"<div class="print-instructions"><img src="{}" alt="Instructions"></div>"#,
                data_url(&result.instructions)
            );
        }

        let _ = writeln!(out, "</body>");
        let _ = writeln!(out, "</html>");
        out
    }
}

/// `data:` URL for an encoded raster.
#[must_use]
pub fn data_url(image: &RenderedImage) -> String {
    let mime = sniff::mime_type(image.bytes()).unwrap_or("application/octet-stream");
    format!("data:{mime};base64,{}", STANDARD.encode(image.bytes()))
}

/// MIME type from magic bytes.
mod sniff {
    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";
    const JPEG_MAGIC: &[u8] = b"\xFF\xD8\xFF";

    pub(super) fn mime_type(bytes: &[u8]) -> Option<&'static str> {
        if bytes.starts_with(PNG_MAGIC) {
            Some("image/png")
        } else if bytes.starts_with(JPEG_MAGIC) {
            Some("image/jpeg")
        } else {
            None
        }
    }
}

/// Escape the characters that matter in HTML text and attributes.
fn html_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
