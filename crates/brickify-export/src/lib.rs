//! brickify-export: Pure print and piece-list serializers (sans-IO)
//!
//! Turns a [`MosaicResult`](brickify_pipeline::MosaicResult) into things
//! the user takes away: a printable HTML page and a CSV piece list. The
//! browser side (opening a print window, triggering a download) lives
//! in `brickify-io`.

pub mod csv;
pub mod html;

pub use csv::to_csv;
pub use html::{HtmlRenderer, PrintDocument, Renderer, data_url};

/// File name offered when downloading the mosaic.
pub const MOSAIC_FILE_NAME: &str = "lego-mosaic.png";

/// File name for the instructions diagram.
pub const INSTRUCTIONS_FILE_NAME: &str = "instructions.png";

/// File name for the CSV piece list.
pub const PIECES_FILE_NAME: &str = "pieces.csv";

/// File name for the printable page when saved to disk.
pub const PRINT_FILE_NAME: &str = "print.html";
