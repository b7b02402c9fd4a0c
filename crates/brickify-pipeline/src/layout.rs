//! Panel layout: how many baseplates, and how big each one is.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::types::Dimensions;

/// Studs per panel edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum PanelSize {
    /// 32 x 32 studs.
    #[default]
    Studs32,
    /// 50 x 50 studs.
    Studs50,
}

impl PanelSize {
    /// Every size, in display order.
    pub const ALL: [Self; 2] = [Self::Studs32, Self::Studs50];

    /// Studs along one edge.
    #[must_use]
    pub const fn studs(self) -> u32 {
        match self {
            Self::Studs32 => 32,
            Self::Studs50 => 50,
        }
    }
}

impl TryFrom<u32> for PanelSize {
    type Error = LayoutError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            32 => Ok(Self::Studs32),
            50 => Ok(Self::Studs50),
            other => Err(LayoutError::UnsupportedPanelSize(other)),
        }
    }
}

impl From<PanelSize> for u32 {
    fn from(size: PanelSize) -> Self {
        size.studs()
    }
}

impl fmt::Display for PanelSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.studs())
    }
}

/// Panel grid sent to the mosaic service.
///
/// Fields are private so the counts can only be set through
/// [`LayoutParameters::new`], which enforces the bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLayout", into = "RawLayout")]
pub struct LayoutParameters {
    panels_wide: u32,
    panels_high: u32,
    panel_size: PanelSize,
}

impl LayoutParameters {
    /// Upper bound on `panels_wide * panels_high`.
    pub const MAX_TOTAL_PANELS: u32 = 36;

    /// Validate and build a layout.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::ZeroPanels`] if either count is zero and
    /// [`LayoutError::TooManyPanels`] above [`Self::MAX_TOTAL_PANELS`].
    pub fn new(panels_wide: u32, panels_high: u32, panel_size: PanelSize) -> Result<Self, LayoutError> {
        if panels_wide == 0 || panels_high == 0 {
            return Err(LayoutError::ZeroPanels {
                wide: panels_wide,
                high: panels_high,
            });
        }
        let total = panels_wide.saturating_mul(panels_high);
        if total > Self::MAX_TOTAL_PANELS {
            return Err(LayoutError::TooManyPanels {
                total,
                max: Self::MAX_TOTAL_PANELS,
            });
        }
        Ok(Self {
            panels_wide,
            panels_high,
            panel_size,
        })
    }

    /// Panels across.
    #[must_use]
    pub const fn panels_wide(&self) -> u32 {
        self.panels_wide
    }

    /// Panels down.
    #[must_use]
    pub const fn panels_high(&self) -> u32 {
        self.panels_high
    }

    /// Studs per panel edge.
    #[must_use]
    pub const fn panel_size(&self) -> PanelSize {
        self.panel_size
    }

    /// `panels_wide * panels_high`. Never stored.
    #[must_use]
    pub const fn total_panels(&self) -> u32 {
        self.panels_wide * self.panels_high
    }

    /// Width over height of the crop window.
    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.panels_wide) / f64::from(self.panels_high)
    }

    /// The `aspect_ratio` query value, e.g. `2/3`.
    #[must_use]
    pub fn aspect_ratio_param(&self) -> String {
        format!("{}/{}", self.panels_wide, self.panels_high)
    }

    /// Size of the finished mosaic in studs.
    #[must_use]
    pub const fn stud_dimensions(&self) -> Dimensions {
        let studs = self.panel_size.studs();
        Dimensions::new(studs * self.panels_wide, studs * self.panels_high)
    }

    /// Same panel size, different counts.
    ///
    /// # Errors
    ///
    /// See [`Self::new`].
    pub fn with_panels(self, panels_wide: u32, panels_high: u32) -> Result<Self, LayoutError> {
        Self::new(panels_wide, panels_high, self.panel_size)
    }

    /// Same counts, different panel size.
    #[must_use]
    pub const fn with_panel_size(self, panel_size: PanelSize) -> Self {
        Self { panel_size, ..self }
    }
}

impl Default for LayoutParameters {
    fn default() -> Self {
        Self {
            panels_wide: 1,
            panels_high: 1,
            panel_size: PanelSize::default(),
        }
    }
}

impl fmt::Display for LayoutParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} panels of {} studs",
            self.panels_wide, self.panels_high, self.panel_size
        )
    }
}

#[derive(Serialize, Deserialize)]
struct RawLayout {
    panels_wide: u32,
    panels_high: u32,
    panel_size: PanelSize,
}

impl TryFrom<RawLayout> for LayoutParameters {
    type Error = LayoutError;

    fn try_from(raw: RawLayout) -> Result<Self, Self::Error> {
        Self::new(raw.panels_wide, raw.panels_high, raw.panel_size)
    }
}

impl From<LayoutParameters> for RawLayout {
    fn from(layout: LayoutParameters) -> Self {
        Self {
            panels_wide: layout.panels_wide,
            panels_high: layout.panels_high,
            panel_size: layout.panel_size,
        }
    }
}
