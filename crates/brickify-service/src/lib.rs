//! brickify-service: adapters for the two remote collaborators.
//!
//! - [`BlobStore`] stores the cropped image and returns a public URL;
//!   [`FirebaseStorage`] talks to the Firebase Storage REST API.
//! - [`MosaicService`] turns that URL and a layout into a
//!   [`MosaicResult`](brickify_pipeline::MosaicResult);
//!   [`HttpMosaicService`] speaks the mosaic server's query-string
//!   contract (see [`wire`]).
//! - [`run_submission`] sequences crop, upload and compute for one
//!   [`SubmitJob`](brickify_pipeline::SubmitJob) and bounds the compute
//!   call with a [`Timer`].
//! - [`SessionDriver`] owns a [`Session`](brickify_pipeline::Session)
//!   and the collaborators for headless use.
//!
//! Traits use `async fn` without `Send` bounds: everything runs on one
//! thread, the browser's or a current-thread runtime's.

pub mod compute;
pub mod config;
pub mod store;
pub mod submit;
pub mod wire;

pub use compute::{HttpMosaicService, MosaicRequest, MosaicService};
pub use config::{ConfigError, ServiceConfig};
pub use store::{BlobStore, FirebaseStorage};
pub use submit::{SessionDriver, Timer, run_submission};
