//! Zoom-and-pan framing of the source image.
//!
//! The editor does not let the user drag a free rectangle. Instead the
//! crop window always has the aspect ratio of the panel layout; the
//! user zooms in and moves its centre. [`Framing::selection`] turns that
//! into a normalized [`CropSelection`].

use serde::{Deserialize, Serialize};

use crate::crop::CropSelection;
use crate::types::Dimensions;

/// Zoom level and focus point of the crop window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Framing {
    /// Zoom factor in `[MIN_ZOOM, MAX_ZOOM]`; 1 shows the largest window.
    pub zoom: f64,
    /// Horizontal focus as a fraction of the image width.
    pub center_x: f64,
    /// Vertical focus as a fraction of the image height.
    pub center_y: f64,
}

impl Framing {
    /// Smallest zoom: the crop window is as large as the image allows.
    pub const MIN_ZOOM: f64 = 1.0;
    /// Largest zoom.
    pub const MAX_ZOOM: f64 = 3.0;
    /// Slider increment.
    pub const ZOOM_STEP: f64 = 0.1;

    /// Build a framing, clamping every field into range.
    #[must_use]
    pub fn new(zoom: f64, center_x: f64, center_y: f64) -> Self {
        Self {
            zoom: clamp_or(zoom, Self::MIN_ZOOM, Self::MAX_ZOOM, Self::MIN_ZOOM),
            center_x: clamp_or(center_x, 0.0, 1.0, 0.5),
            center_y: clamp_or(center_y, 0.0, 1.0, 0.5),
        }
    }

    /// Same focus, different zoom.
    #[must_use]
    pub fn with_zoom(self, zoom: f64) -> Self {
        Self::new(zoom, self.center_x, self.center_y)
    }

    /// Same zoom, different focus.
    #[must_use]
    pub fn with_center(self, center_x: f64, center_y: f64) -> Self {
        Self::new(self.zoom, center_x, center_y)
    }

    /// Normalized selection for an image of `natural` size and a crop
    /// window of `aspect` (width / height).
    ///
    /// The window is the largest `aspect` rectangle that fits the image,
    /// shrunk by the zoom factor, centred on the focus point and then
    /// pushed back inside the image if it sticks out.
    #[must_use]
    pub fn selection(&self, natural: Dimensions, aspect: f64) -> CropSelection {
        let zoom = clamp_or(self.zoom, Self::MIN_ZOOM, Self::MAX_ZOOM, Self::MIN_ZOOM);
        let image_w = f64::from(natural.width.max(1));
        let image_h = f64::from(natural.height.max(1));
        let aspect = if aspect.is_finite() && aspect > 0.0 {
            aspect
        } else {
            image_w / image_h
        };

        let (base_w, base_h) = if image_w / image_h > aspect {
            (image_h * aspect, image_h)
        } else {
            (image_w, image_w / aspect)
        };

        let width = (base_w / zoom / image_w).min(1.0);
        let height = (base_h / zoom / image_h).min(1.0);
        let x = (self.center_x - width / 2.0).clamp(0.0, 1.0 - width);
        let y = (self.center_y - height / 2.0).clamp(0.0, 1.0 - height);

        CropSelection::normalized(x, y, width, height)
    }
}

impl Default for Framing {
    fn default() -> Self {
        Self {
            zoom: Self::MIN_ZOOM,
            center_x: 0.5,
            center_y: 0.5,
        }
    }
}

fn clamp_or(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}
