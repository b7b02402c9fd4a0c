//! Error taxonomy for the brickify pipeline.
//!
//! Each layer has its own enum. [`SubmitError`] gathers the three
//! failures that can end a submission so the session can surface them
//! uniformly and fall back to editing.

/// The uploaded file could not be turned into a [`SourceImage`](crate::SourceImage).
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The file was empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// Extension or content is not PNG/JPEG.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// The bytes could not be decoded.
    #[error("failed to decode image: {0}")]
    Image(#[from] image::ImageError),
}

/// Cropping could not produce an image.
#[derive(Debug, thiserror::Error)]
pub enum CropError {
    /// The region has no pixels left after scaling and clamping.
    #[error("crop region is empty after clamping to the image bounds")]
    EmptyRegion,

    /// The display size used for the selection is zero, negative or not finite.
    #[error("invalid display size {width}x{height}")]
    InvalidDisplay {
        /// Display width.
        width: f64,
        /// Display height.
        height: f64,
    },

    /// The selection rectangle contains a non-finite coordinate.
    #[error("crop selection has non-finite coordinates")]
    InvalidSelection,

    /// Encoding the cropped pixels failed.
    #[error("failed to encode cropped image: {0}")]
    Encode(#[source] image::ImageError),
}

/// Panel layout parameters are out of range.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LayoutError {
    /// Panel counts must be at least one.
    #[error("panel counts must be positive (got {wide}x{high})")]
    ZeroPanels {
        /// Panels across.
        wide: u32,
        /// Panels down.
        high: u32,
    },

    /// Too many panels in total.
    #[error("{total} panels requested, at most {max} are supported")]
    TooManyPanels {
        /// Requested total.
        total: u32,
        /// Upper bound.
        max: u32,
    },

    /// Only 32- and 50-stud panels exist.
    #[error("unsupported panel size {0} (expected 32 or 50)")]
    UnsupportedPanelSize(u32),
}

/// A session transition was requested in a state that forbids it.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No image has been selected yet.
    #[error("no image selected")]
    NoImage,

    /// A submission is already running for this session.
    #[error("a submission is already in progress")]
    SubmissionInFlight,

    /// The result is on screen; edits need undo or a new file first.
    #[error("the result is frozen; undo or pick a new file to edit again")]
    ResultFrozen,

    /// The current selection does not resolve to a usable region.
    #[error(transparent)]
    Crop(#[from] CropError),

    /// Layout parameters were rejected.
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// The blob store rejected or failed an upload.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// The request never produced a response.
    #[error("upload transport error: {0}")]
    Transport(String),

    /// The store answered with a non-success status.
    #[error("upload failed with HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// The store answered, but not with something we understand.
    #[error("unexpected upload response: {0}")]
    InvalidResponse(String),
}

/// The mosaic service failed or answered with an unusable payload.
#[derive(Debug, thiserror::Error)]
pub enum ComputeError {
    /// The request never produced a response.
    #[error("compute transport error: {0}")]
    Transport(String),

    /// Non-2xx response.
    #[error("mosaic service returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// No answer within the configured ceiling.
    #[error("mosaic service did not answer within {seconds}s")]
    Timeout {
        /// The ceiling that was hit.
        seconds: u64,
    },

    /// A required field is absent from the response.
    #[error("mosaic response is missing `{0}`")]
    MissingField(&'static str),

    /// The body is not the expected JSON shape.
    #[error("malformed mosaic response: {0}")]
    InvalidPayload(String),

    /// A base64 image field did not decode to a raster.
    #[error("`{field}` is not a valid image: {reason}")]
    InvalidImage {
        /// Name of the offending field.
        field: &'static str,
        /// What went wrong.
        reason: String,
    },
}

/// Any failure of the crop -> upload -> compute sequence.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// Cropping failed.
    #[error(transparent)]
    Crop(#[from] CropError),

    /// Uploading the cropped image failed.
    #[error(transparent)]
    Upload(#[from] UploadError),

    /// The mosaic service failed.
    #[error(transparent)]
    Compute(#[from] ComputeError),
}

impl SubmitError {
    /// Short message for a transient notification.
    #[must_use]
    pub const fn notification(&self) -> &'static str {
        match self {
            Self::Crop(_) => "Could not crop the image.",
            Self::Upload(_) => "Uploading the image failed. Please try again.",
            Self::Compute(ComputeError::Timeout { .. }) => {
                "The mosaic service took too long to answer. Please try again."
            }
            Self::Compute(_) => "Building the mosaic failed. Please try again.",
        }
    }
}
