//! brickify-pipeline: Pure capture -> crop -> submit pipeline (sans-IO).
//!
//! Holds everything about a mosaic editing session that can be
//! expressed without touching the network or the browser:
//!
//! - decoding the uploaded photo into a [`SourceImage`]
//! - turning a display-space crop selection into a [`CropRegion`] in
//!   source pixels and cutting that region out ([`crop::crop`])
//! - the panel [`LayoutParameters`] sent to the mosaic service
//! - the [`MosaicResult`] and its [`PieceTable`]
//! - the [`Session`] state machine that sequences all of the above
//!
//! The blob store and mosaic service adapters live in
//! `brickify-service`; browser interaction lives in `brickify-io`.

pub mod access;
pub mod crop;
pub mod error;
pub mod framing;
pub mod layout;
pub mod pieces;
pub mod session;
pub mod types;

pub use access::{Access, CurrentUser};
pub use crop::{CropSelection, DisplayRect, DisplaySize, crop};
pub use error::{
    ComputeError, CropError, DecodeError, LayoutError, SessionError, SubmitError, UploadError,
};
pub use framing::Framing;
pub use layout::{LayoutParameters, PanelSize};
pub use pieces::{MosaicResult, PieceTable, PieceTableEntry};
pub use session::{Completion, Phase, Session, SubmitJob, SubmitTicket};
pub use types::{
    CropRegion, CroppedImage, Dimensions, OutputFormat, RenderedImage, SourceFormat, SourceImage,
};
