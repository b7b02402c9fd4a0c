//! Crop selection and the geometry transform.
//!
//! The editor reports the selection in the coordinate space of the
//! image *as displayed*, which is usually scaled. [`CropSelection::resolve`]
//! maps it back to natural pixels; [`crop`] then copies those pixels
//! 1:1 into a new image and encodes it.

use std::io::Cursor;

use image::{ImageEncoder, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::error::CropError;
use crate::types::{CropRegion, CroppedImage, Dimensions, OutputFormat, SourceImage};

/// JPEG quality for cropped uploads.
const JPEG_QUALITY: u8 = 92;

/// Size of the image as rendered on screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplaySize {
    /// Rendered width.
    pub width: f64,
    /// Rendered height.
    pub height: f64,
}

impl DisplaySize {
    /// Create a display size.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// The unit square; selections against it are fractions of the image.
    pub const UNIT: Self = Self::new(1.0, 1.0);
}

/// A rectangle in display coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayRect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl DisplayRect {
    /// Create a rectangle.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }
}

/// What the user selected, expressed relative to what they saw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropSelection {
    /// Selected rectangle in display coordinates.
    pub rect: DisplayRect,
    /// Size the image was displayed at when the selection was made.
    pub display: DisplaySize,
}

impl CropSelection {
    /// A selection made against an image displayed at `display`.
    #[must_use]
    pub const fn new(rect: DisplayRect, display: DisplaySize) -> Self {
        Self { rect, display }
    }

    /// A selection in fractions of the image (`0.0..=1.0` on both axes).
    #[must_use]
    pub const fn normalized(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(DisplayRect::new(x, y, width, height), DisplaySize::UNIT)
    }

    /// The whole image.
    #[must_use]
    pub const fn full() -> Self {
        Self::normalized(0.0, 0.0, 1.0, 1.0)
    }

    /// Map the selection into natural pixel coordinates.
    ///
    /// Each axis is scaled by `natural / display`. Edges are rounded to
    /// the nearest pixel and clamped to the image, so a rounding
    /// overshoot at the far edge shrinks the region instead of failing.
    ///
    /// # Errors
    ///
    /// Returns [`CropError::InvalidDisplay`] for a degenerate display
    /// size, [`CropError::InvalidSelection`] for non-finite coordinates
    /// and [`CropError::EmptyRegion`] when nothing is left after clamping.
    pub fn resolve(&self, natural: Dimensions) -> Result<CropRegion, CropError> {
        let DisplaySize { width, height } = self.display;
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(CropError::InvalidDisplay { width, height });
        }
        if !self.rect.is_finite() {
            return Err(CropError::InvalidSelection);
        }

        let sx = f64::from(natural.width) / width;
        let sy = f64::from(natural.height) / height;

        let left = snap(self.rect.x * sx, natural.width);
        let right = snap((self.rect.x + self.rect.width) * sx, natural.width);
        let top = snap(self.rect.y * sy, natural.height);
        let bottom = snap((self.rect.y + self.rect.height) * sy, natural.height);

        let (left, right) = (left.min(right), left.max(right));
        let (top, bottom) = (top.min(bottom), top.max(bottom));

        if right == left || bottom == top {
            return Err(CropError::EmptyRegion);
        }
        Ok(CropRegion::new(left, top, right - left, bottom - top))
    }
}

impl Default for CropSelection {
    fn default() -> Self {
        Self::full()
    }
}

/// Round a scaled edge to the nearest pixel inside `[0, limit]`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn snap(value: f64, limit: u32) -> u32 {
    // Clamped to [0, limit] first, so the cast is lossless.
    value.round().clamp(0.0, f64::from(limit)) as u32
}

/// Copy `region` out of `source` without resampling.
///
/// The region is clamped to the source bounds first.
///
/// # Errors
///
/// Returns [`CropError::EmptyRegion`] if the clamped region is empty.
pub fn crop_pixels(source: &RgbaImage, region: CropRegion) -> Result<(CropRegion, RgbaImage), CropError> {
    let bounds = Dimensions::new(source.width(), source.height());
    let region = region.clamp_to(bounds).ok_or(CropError::EmptyRegion)?;
    let pixels =
        image::imageops::crop_imm(source, region.x, region.y, region.width, region.height)
            .to_image();
    Ok((region, pixels))
}

/// Cut `region` out of `source` and encode it as `format`.
///
/// The output is exactly `region.width x region.height` after clamping.
/// `source` is left untouched, so repeated calls yield identical bytes.
///
/// # Errors
///
/// Returns [`CropError::EmptyRegion`] if nothing is left after clamping
/// and [`CropError::Encode`] if the encoder fails.
pub fn crop(
    source: &SourceImage,
    region: CropRegion,
    format: OutputFormat,
) -> Result<CroppedImage, CropError> {
    let (region, pixels) = crop_pixels(source.pixels(), region)?;
    let bytes = encode(&pixels, format)?;
    log::debug!(
        "cropped {} to {region} as {} ({} bytes)",
        source.file_name(),
        format.mime_type(),
        bytes.len()
    );
    Ok(CroppedImage {
        region,
        format,
        bytes,
    })
}

fn encode(pixels: &RgbaImage, format: OutputFormat) -> Result<Vec<u8>, CropError> {
    let mut bytes = Vec::new();
    match format {
        OutputFormat::Png => {
            image::codecs::png::PngEncoder::new(&mut bytes)
                .write_image(
                    pixels.as_raw(),
                    pixels.width(),
                    pixels.height(),
                    image::ExtendedColorType::Rgba8,
                )
                .map_err(CropError::Encode)?;
        }
        OutputFormat::Jpeg => {
            let rgb = image::DynamicImage::ImageRgba8(pixels.clone()).to_rgb8();
            image::codecs::jpeg::JpegEncoder::new_with_quality(Cursor::new(&mut bytes), JPEG_QUALITY)
                .write_image(
                    rgb.as_raw(),
                    rgb.width(),
                    rgb.height(),
                    image::ExtendedColorType::Rgb8,
                )
                .map_err(CropError::Encode)?;
        }
    }
    Ok(bytes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{RenderedImage, SourceImage};

    /// Test card where each pixel encodes its own coordinates.
    #[allow(clippy::cast_possible_truncation)]
    fn test_card(width: u32, height: u32) -> SourceImage {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            image::Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255])
        });
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        SourceImage::decode(buf, "card.png").unwrap()
    }

    #[test]
    fn display_selection_scales_to_natural_pixels() {
        let selection = CropSelection::new(
            DisplayRect::new(100.0, 75.0, 200.0, 150.0),
            DisplaySize::new(400.0, 300.0),
        );
        let region = selection.resolve(Dimensions::new(800, 600)).unwrap();
        assert_eq!(region, CropRegion::new(200, 150, 400, 300));
    }

    #[test]
    fn crop_output_matches_region_size() {
        let source = test_card(800, 600);
        let region = CropRegion::new(200, 150, 400, 300);
        let cropped = crop(&source, region, OutputFormat::Png).unwrap();
        let rendered = RenderedImage::from_encoded(cropped.bytes).unwrap();
        assert_eq!(rendered.dimensions(), Dimensions::new(400, 300));
    }

    #[test]
    fn crop_copies_pixels_one_to_one() {
        let source = test_card(64, 48);
        let (_, pixels) = crop_pixels(source.pixels(), CropRegion::new(10, 5, 20, 10)).unwrap();
        assert_eq!(pixels.get_pixel(0, 0), source.pixels().get_pixel(10, 5));
        assert_eq!(pixels.get_pixel(19, 9), source.pixels().get_pixel(29, 14));
    }

    #[test]
    fn crop_is_repeatable() {
        let source = test_card(120, 90);
        let region = CropRegion::new(7, 3, 50, 40);
        let a = crop(&source, region, OutputFormat::Png).unwrap();
        let b = crop(&source, region, OutputFormat::Png).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn far_edge_overshoot_is_clamped() {
        let selection = CropSelection::new(
            DisplayRect::new(200.0, 150.0, 200.4, 150.4),
            DisplaySize::new(400.0, 300.0),
        );
        let region = selection.resolve(Dimensions::new(800, 600)).unwrap();
        assert_eq!(region, CropRegion::new(400, 300, 400, 300));
        assert!(region.x + region.width <= 800);
        assert!(region.y + region.height <= 600);
    }

    #[test]
    fn oversized_region_never_exceeds_source() {
        let source = test_card(40, 30);
        let cropped = crop(&source, CropRegion::new(30, 20, 100, 100), OutputFormat::Png).unwrap();
        assert_eq!(cropped.region, CropRegion::new(30, 20, 10, 10));
    }

    #[test]
    fn collapsed_selection_is_rejected() {
        let selection = CropSelection::normalized(0.5, 0.5, 0.0001, 0.5);
        let err = selection.resolve(Dimensions::new(100, 100)).unwrap_err();
        assert!(matches!(err, CropError::EmptyRegion));
    }

    #[test]
    fn zero_display_is_rejected() {
        let selection = CropSelection::new(
            DisplayRect::new(0.0, 0.0, 1.0, 1.0),
            DisplaySize::new(0.0, 300.0),
        );
        assert!(matches!(
            selection.resolve(Dimensions::new(10, 10)),
            Err(CropError::InvalidDisplay { .. })
        ));
    }

    #[test]
    fn nan_selection_is_rejected() {
        let selection = CropSelection::normalized(f64::NAN, 0.0, 1.0, 1.0);
        assert!(matches!(
            selection.resolve(Dimensions::new(10, 10)),
            Err(CropError::InvalidSelection)
        ));
    }

    #[test]
    fn jpeg_output_decodes_at_region_size() {
        let source = test_card(64, 64);
        let cropped = crop(&source, CropRegion::new(0, 0, 32, 16), OutputFormat::Jpeg).unwrap();
        assert_eq!(cropped.format, OutputFormat::Jpeg);
        let rendered = RenderedImage::from_encoded(cropped.bytes).unwrap();
        assert_eq!(rendered.dimensions(), Dimensions::new(32, 16));
    }

    #[test]
    fn full_selection_covers_image() {
        let region = CropSelection::full().resolve(Dimensions::new(321, 123)).unwrap();
        assert_eq!(region, CropRegion::new(0, 0, 321, 123));
    }
}
