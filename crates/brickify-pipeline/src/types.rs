//! Shared types for the brickify pipeline.

use std::fmt;
use std::io::Cursor;

use image::ImageDecoder;
use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

/// Re-export `RgbaImage` so downstream crates can reference decoded
/// pixels without depending on `image` directly.
pub use image::RgbaImage;

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Create new dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Format tag of an uploaded photo, taken from its file extension.
///
/// The tag is forwarded verbatim to the mosaic service as `image_ext`,
/// so `jpg` and `jpeg` are kept apart even though they decode the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// `.png`
    Png,
    /// `.jpg`
    Jpg,
    /// `.jpeg`
    Jpeg,
}

impl SourceFormat {
    /// Extensions accepted by the file picker, in display order.
    pub const EXTENSIONS: [&'static str; 3] = ["png", "jpg", "jpeg"];

    /// Parse a bare extension (no dot), ignoring ASCII case.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        if ext.eq_ignore_ascii_case("png") {
            Some(Self::Png)
        } else if ext.eq_ignore_ascii_case("jpg") {
            Some(Self::Jpg)
        } else if ext.eq_ignore_ascii_case("jpeg") {
            Some(Self::Jpeg)
        } else {
            None
        }
    }

    /// Parse the extension of a file name such as `photo.JPG`.
    #[must_use]
    pub fn from_file_name(name: &str) -> Option<Self> {
        name.rsplit_once('.')
            .and_then(|(_, ext)| Self::from_extension(ext))
    }

    /// The lowercase extension string.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpg => "jpg",
            Self::Jpeg => "jpeg",
        }
    }

    /// Encoding used when re-encoding a crop of an image with this tag.
    #[must_use]
    pub const fn output_format(self) -> OutputFormat {
        match self {
            Self::Png => OutputFormat::Png,
            Self::Jpg | Self::Jpeg => OutputFormat::Jpeg,
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Encodings the crop step can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Lossless PNG with alpha.
    Png,
    /// Baseline JPEG; alpha is dropped.
    Jpeg,
}

impl OutputFormat {
    /// MIME type for upload headers and Blob construction.
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }
}

/// A decoded photo plus the bytes and name it was loaded from.
///
/// Replaced wholesale whenever a new file is picked; never mutated.
#[derive(Debug, Clone)]
pub struct SourceImage {
    file_name: String,
    format: SourceFormat,
    bytes: Vec<u8>,
    pixels: RgbaImage,
}

impl SourceImage {
    /// Decode an uploaded file.
    ///
    /// The format tag comes from the file extension; the bytes are
    /// sniffed independently and must be PNG or JPEG. EXIF orientation
    /// is applied, so the pixels are upright the way a browser shows them.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::EmptyInput`] for empty bytes,
    /// [`DecodeError::UnsupportedFormat`] when either the extension or
    /// the sniffed content is not PNG/JPEG, and
    /// [`DecodeError::Image`] when decoding fails.
    pub fn decode(bytes: Vec<u8>, file_name: impl Into<String>) -> Result<Self, DecodeError> {
        let file_name = file_name.into();
        if bytes.is_empty() {
            return Err(DecodeError::EmptyInput);
        }

        let format = SourceFormat::from_file_name(&file_name)
            .ok_or_else(|| DecodeError::UnsupportedFormat(file_name.clone()))?;

        let sniffed = image::guess_format(&bytes)?;
        if !matches!(sniffed, image::ImageFormat::Png | image::ImageFormat::Jpeg) {
            return Err(DecodeError::UnsupportedFormat(format!("{sniffed:?}")));
        }

        let mut decoder =
            image::ImageReader::with_format(Cursor::new(&bytes), sniffed).into_decoder()?;
        let orientation = decoder.orientation()?;
        let mut decoded = image::DynamicImage::from_decoder(decoder)?;
        decoded.apply_orientation(orientation);
        let pixels = decoded.to_rgba8();
        log::debug!(
            "decoded {file_name}: {}x{} ({} bytes, {orientation:?})",
            pixels.width(),
            pixels.height(),
            bytes.len()
        );

        Ok(Self {
            file_name,
            format,
            bytes,
            pixels,
        })
    }

    /// The file name the image was picked under.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Format tag derived from the file extension.
    #[must_use]
    pub const fn format(&self) -> SourceFormat {
        self.format
    }

    /// The original encoded bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Decoded pixels at natural resolution.
    #[must_use]
    pub const fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Natural dimensions of the decoded image.
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.pixels.width(), self.pixels.height())
    }
}

/// A rectangle in source-image pixel coordinates.
///
/// Values produced by [`CropSelection::resolve`](crate::CropSelection::resolve)
/// always lie inside the source bounds and are non-empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CropRegion {
    /// Left edge in pixels.
    pub x: u32,
    /// Top edge in pixels.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl CropRegion {
    /// Create a region.
    #[must_use]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The whole of an image with the given dimensions.
    #[must_use]
    pub const fn full(dimensions: Dimensions) -> Self {
        Self::new(0, 0, dimensions.width, dimensions.height)
    }

    /// Output dimensions of this region.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    /// Shrink the region so it fits inside `bounds`.
    ///
    /// Returns `None` when nothing of the region is left.
    #[must_use]
    pub fn clamp_to(self, bounds: Dimensions) -> Option<Self> {
        let x = self.x.min(bounds.width);
        let y = self.y.min(bounds.height);
        let right = self.x.saturating_add(self.width).min(bounds.width);
        let bottom = self.y.saturating_add(self.height).min(bounds.height);
        let width = right.saturating_sub(x);
        let height = bottom.saturating_sub(y);
        (width > 0 && height > 0).then_some(Self::new(x, y, width, height))
    }
}

impl fmt::Display for CropRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{}+{}+{}",
            self.width, self.height, self.x, self.y
        )
    }
}

/// Result of the crop step: the encoded bytes handed to the blob store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CroppedImage {
    /// The region that was actually cut out (after clamping).
    pub region: CropRegion,
    /// Encoding of `bytes`.
    pub format: OutputFormat,
    /// Encoded image bytes.
    pub bytes: Vec<u8>,
}

impl CroppedImage {
    /// Pixel dimensions of the encoded image.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.region.dimensions()
    }
}

/// An encoded raster received from the mosaic service.
///
/// Only the header is inspected on construction, which is enough to
/// reject garbage without paying for a full decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    bytes: Vec<u8>,
    dimensions: Dimensions,
}

impl RenderedImage {
    /// Validate encoded bytes and read their dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::EmptyInput`] for empty input and
    /// [`DecodeError::Image`] when the format is not recognised or the
    /// header cannot be read.
    pub fn from_encoded(bytes: Vec<u8>) -> Result<Self, DecodeError> {
        if bytes.is_empty() {
            return Err(DecodeError::EmptyInput);
        }
        let (width, height) = image::ImageReader::new(Cursor::new(&bytes))
            .with_guessed_format()
            .map_err(image::ImageError::IoError)?
            .into_dimensions()?;
        Ok(Self {
            bytes,
            dimensions: Dimensions::new(width, height),
        })
    }

    /// Encoded bytes (PNG in practice).
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Pixel dimensions read from the header.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.dimensions
    }
}
