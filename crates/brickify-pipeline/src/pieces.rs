//! The mosaic service's answer: two rasters and a bill of materials.

use serde::{Deserialize, Serialize};

use crate::types::RenderedImage;

/// One colour in the bill of materials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceTableEntry {
    /// The service's internal colour key. Not shown to the user.
    pub color_id: String,
    /// Human-readable brick colour name.
    pub label: String,
    /// Number of 1 x 1 pieces in this colour.
    pub count: u64,
}

/// Piece counts per colour, in the order the service listed them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceTable {
    entries: Vec<PieceTableEntry>,
}

impl PieceTable {
    /// Wrap entries as received.
    #[must_use]
    pub const fn new(entries: Vec<PieceTableEntry>) -> Self {
        Self { entries }
    }

    /// Entries in service order.
    #[must_use]
    pub fn entries(&self) -> &[PieceTableEntry] {
        &self.entries
    }

    /// Number of colours.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when the service reported no colours at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts, computed on every call.
    #[must_use]
    pub fn total_pieces(&self) -> u64 {
        self.entries
            .iter()
            .fold(0_u64, |acc, e| acc.saturating_add(e.count))
    }
}

impl FromIterator<PieceTableEntry> for PieceTable {
    fn from_iter<I: IntoIterator<Item = PieceTableEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// A complete, validated answer from the mosaic service.
///
/// Built all at once by the compute adapter; never patched afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MosaicResult {
    /// The rendered mosaic.
    pub mosaic: RenderedImage,
    /// Build instructions diagram.
    pub instructions: RenderedImage,
    /// Bill of materials.
    pub pieces: PieceTable,
}

impl MosaicResult {
    /// Shorthand for `self.pieces.total_pieces()`.
    #[must_use]
    pub fn total_pieces(&self) -> u64 {
        self.pieces.total_pieces()
    }
}
