//! brickify-io: Browser I/O and Dioxus component library.
//!
//! Handles file uploads, Blob downloads and object URLs, the print
//! window, console logging, the auth provider probe and a
//! `setTimeout`-backed timer, and provides the UI components of the
//! brickify web application.

pub mod auth;
pub mod components;
pub mod console_log;
pub mod download;
pub mod print;
pub mod raster;
pub mod timer;

pub use components::{
    AccessNotice, CropEditor, FileUpload, LayoutControls, Notice, NoticeKind, Notification,
    PieceTableView, ResultView,
};
pub use print::BrowserPrinter;
pub use timer::BrowserTimer;
