//! The editing session as a single state value.
//!
//! ```text
//!            select_file            begin_submit
//!   Empty ───────────────▶ Editing ─────────────▶ Submitting
//!     ▲                     ▲  ▲                     │
//!     │ undo (any state)    │  └──── failure ────────┤
//!     │                     │ select_file            │ success
//!     └─────────────────────┴──────────────────── Result
//! ```
//!
//! Submission is split into [`Session::begin_submit`] and
//! [`Session::complete_submit`] so that the async crop/upload/compute
//! work can run outside the state value. Every transition that
//! discards the current draft bumps a generation counter; a completion
//! carrying an older [`SubmitTicket`] is ignored.

use std::mem;
use std::sync::Arc;

use crate::crop::CropSelection;
use crate::error::{CropError, SessionError, SubmitError};
use crate::framing::Framing;
use crate::layout::LayoutParameters;
use crate::pieces::MosaicResult;
use crate::types::{CropRegion, OutputFormat, SourceImage};

/// Which screen the view should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No image picked.
    Empty,
    /// Image picked; crop and layout are editable.
    Editing,
    /// Waiting for upload and compute.
    Submitting,
    /// Mosaic on screen.
    Result,
}

/// User input collected for one image.
#[derive(Debug, Clone)]
struct Draft {
    source: Arc<SourceImage>,
    framing: Framing,
    /// An explicit selection overrides the framing until the framing or
    /// the layout aspect changes again.
    selection: Option<CropSelection>,
    layout: LayoutParameters,
}

impl Draft {
    fn new(source: SourceImage) -> Self {
        Self {
            source: Arc::new(source),
            framing: Framing::default(),
            selection: None,
            layout: LayoutParameters::default(),
        }
    }

    fn crop_selection(&self) -> CropSelection {
        self.selection.unwrap_or_else(|| {
            self.framing
                .selection(self.source.dimensions(), self.layout.aspect_ratio())
        })
    }

    fn crop_region(&self) -> Result<CropRegion, CropError> {
        self.crop_selection().resolve(self.source.dimensions())
    }
}

#[derive(Debug, Clone, Default)]
enum State {
    #[default]
    Empty,
    Editing(Draft),
    Submitting(Draft),
    Result(Draft, Arc<MosaicResult>),
}

/// Identifies one submission; see [`Session::complete_submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubmitTicket(u64);

/// Snapshot of everything the submission needs, taken at
/// [`Session::begin_submit`] time.
#[derive(Debug, Clone)]
pub struct SubmitJob {
    /// Hand back to [`Session::complete_submit`].
    pub ticket: SubmitTicket,
    /// The picked image.
    pub source: Arc<SourceImage>,
    /// Region to crop, in source pixels.
    pub region: CropRegion,
    /// Panel layout to request.
    pub layout: LayoutParameters,
}

impl SubmitJob {
    /// Encoding for the cropped upload, following the source format.
    #[must_use]
    pub fn output_format(&self) -> OutputFormat {
        self.source.format().output_format()
    }

    /// Object name for the upload.
    #[must_use]
    pub fn upload_name(&self) -> &str {
        self.source.file_name()
    }
}

/// What happened when a submission outcome was delivered.
#[derive(Debug)]
pub enum Completion {
    /// The session now shows the result.
    Finished {
        /// Sum of all piece counts in the new result.
        total_pieces: u64,
    },
    /// The session is back in editing; show this error.
    Failed(SubmitError),
    /// The session moved on (undo or new file); the outcome was dropped.
    Stale,
}

/// One editing session for one browser tab.
#[derive(Debug, Clone, Default)]
pub struct Session {
    state: State,
    generation: u64,
}

impl Session {
    /// A session with no image.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        match self.state {
            State::Empty => Phase::Empty,
            State::Editing(_) => Phase::Editing,
            State::Submitting(_) => Phase::Submitting,
            State::Result(..) => Phase::Result,
        }
    }

    const fn draft(&self) -> Option<&Draft> {
        match &self.state {
            State::Empty => None,
            State::Editing(d) | State::Submitting(d) | State::Result(d, _) => Some(d),
        }
    }

    fn editable_draft(&mut self) -> Result<&mut Draft, SessionError> {
        match &mut self.state {
            State::Editing(d) => Ok(d),
            State::Empty => Err(SessionError::NoImage),
            State::Submitting(_) => Err(SessionError::SubmissionInFlight),
            State::Result(..) => Err(SessionError::ResultFrozen),
        }
    }

    /// Start over with a new image.
    ///
    /// Discards any crop, layout and result.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::SubmissionInFlight`] while submitting.
    pub fn select_file(&mut self, source: SourceImage) -> Result<(), SessionError> {
        if matches!(self.state, State::Submitting(_)) {
            return Err(SessionError::SubmissionInFlight);
        }
        log::info!(
            "editing {} ({})",
            source.file_name(),
            source.dimensions()
        );
        self.generation += 1;
        self.state = State::Editing(Draft::new(source));
        Ok(())
    }

    /// Back to [`Phase::Empty`], from any state.
    ///
    /// A submission still in flight will be reported as
    /// [`Completion::Stale`] when it lands.
    pub fn undo(&mut self) {
        if !matches!(self.state, State::Empty) {
            log::info!("session reset from {:?}", self.phase());
        }
        self.generation += 1;
        self.state = State::Empty;
    }

    /// Replace zoom and focus. Clears any explicit selection.
    ///
    /// # Errors
    ///
    /// Returns an error unless the session is [`Phase::Editing`].
    pub fn set_framing(&mut self, framing: Framing) -> Result<(), SessionError> {
        let draft = self.editable_draft()?;
        draft.framing = framing;
        draft.selection = None;
        Ok(())
    }

    /// Use an explicit selection instead of the framing.
    ///
    /// # Errors
    ///
    /// Returns an error unless the session is [`Phase::Editing`].
    pub fn set_crop_selection(&mut self, selection: CropSelection) -> Result<(), SessionError> {
        self.editable_draft()?.selection = Some(selection);
        Ok(())
    }

    /// Replace the panel layout.
    ///
    /// An explicit selection is dropped when the aspect ratio changes,
    /// since it no longer matches the panel grid.
    ///
    /// # Errors
    ///
    /// Returns an error unless the session is [`Phase::Editing`].
    pub fn set_layout(&mut self, layout: LayoutParameters) -> Result<(), SessionError> {
        let draft = self.editable_draft()?;
        if draft.layout.aspect_ratio_param() != layout.aspect_ratio_param() {
            draft.selection = None;
        }
        draft.layout = layout;
        Ok(())
    }

    /// Change the panel counts, keeping the panel size.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Layout`] for out-of-range counts, or a
    /// state error unless the session is [`Phase::Editing`].
    pub fn set_panels(&mut self, panels_wide: u32, panels_high: u32) -> Result<(), SessionError> {
        let layout = self
            .editable_draft()?
            .layout
            .with_panels(panels_wide, panels_high)?;
        self.set_layout(layout)
    }

    /// Enter [`Phase::Submitting`] and return the work to do.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::SubmissionInFlight`] if a submission is
    /// already running, [`SessionError::Crop`] if the current selection
    /// does not resolve, and the usual state errors otherwise. The
    /// session is unchanged on error.
    pub fn begin_submit(&mut self) -> Result<SubmitJob, SessionError> {
        let region = self.editable_draft()?.crop_region()?;
        let draft = match mem::take(&mut self.state) {
            State::Editing(draft) => draft,
            other => {
                self.state = other;
                return Err(SessionError::SubmissionInFlight);
            }
        };
        let source = Arc::clone(&draft.source);
        let layout = draft.layout;
        self.state = State::Submitting(draft);
        self.generation += 1;

        log::info!(
            "submitting {} cropped to {region}, {layout}",
            source.file_name()
        );
        Ok(SubmitJob {
            ticket: SubmitTicket(self.generation),
            source,
            region,
            layout,
        })
    }

    /// Deliver the outcome of the submission identified by `ticket`.
    ///
    /// Success moves to [`Phase::Result`]; failure returns to
    /// [`Phase::Editing`] with the image, selection and layout intact.
    pub fn complete_submit(
        &mut self,
        ticket: SubmitTicket,
        outcome: Result<MosaicResult, SubmitError>,
    ) -> Completion {
        if ticket.0 != self.generation || !matches!(self.state, State::Submitting(_)) {
            log::debug!("dropping stale submission outcome {}", ticket.0);
            return Completion::Stale;
        }

        let State::Submitting(draft) = mem::take(&mut self.state) else {
            return Completion::Stale;
        };
        match outcome {
            Ok(result) => {
                let total_pieces = result.total_pieces();
                log::info!(
                    "mosaic ready: {} colours, {total_pieces} pieces",
                    result.pieces.len()
                );
                self.state = State::Result(draft, Arc::new(result));
                Completion::Finished { total_pieces }
            }
            Err(err) => {
                log::warn!("submission failed: {err}");
                self.state = State::Editing(draft);
                Completion::Failed(err)
            }
        }
    }

    /// The picked image.
    #[must_use]
    pub fn source(&self) -> Option<Arc<SourceImage>> {
        self.draft().map(|d| Arc::clone(&d.source))
    }

    /// Current zoom and focus.
    #[must_use]
    pub fn framing(&self) -> Option<Framing> {
        self.draft().map(|d| d.framing)
    }

    /// Current layout; the defaults when no image is picked.
    #[must_use]
    pub fn layout(&self) -> LayoutParameters {
        self.draft().map(|d| d.layout).unwrap_or_default()
    }

    /// The effective selection: explicit if set, otherwise from framing.
    #[must_use]
    pub fn crop_selection(&self) -> Option<CropSelection> {
        self.draft().map(Draft::crop_selection)
    }

    /// Crop region in source pixels, resolved afresh on every call.
    #[must_use]
    pub fn crop_region(&self) -> Option<CropRegion> {
        self.draft().and_then(|d| d.crop_region().ok())
    }

    /// The mosaic, once in [`Phase::Result`].
    #[must_use]
    pub fn result(&self) -> Option<Arc<MosaicResult>> {
        match &self.state {
            State::Result(_, result) => Some(Arc::clone(result)),
            _ => None,
        }
    }

    /// Sum of piece counts of the current result.
    #[must_use]
    pub fn total_pieces(&self) -> Option<u64> {
        match &self.state {
            State::Result(_, result) => Some(result.total_pieces()),
            _ => None,
        }
    }

    /// `true` when [`Session::begin_submit`] would succeed.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        match &self.state {
            State::Editing(d) => d.crop_region().is_ok(),
            _ => false,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::error::{ComputeError, UploadError};
    use crate::layout::PanelSize;
    use crate::pieces::{PieceTable, PieceTableEntry};
    use crate::types::{Dimensions, RenderedImage};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 10, 10, 255]));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    fn source() -> SourceImage {
        SourceImage::decode(png(80, 60), "photo.png").unwrap()
    }

    fn result(counts: &[u64]) -> MosaicResult {
        MosaicResult {
            mosaic: RenderedImage::from_encoded(png(4, 4)).unwrap(),
            instructions: RenderedImage::from_encoded(png(8, 8)).unwrap(),
            pieces: counts
                .iter()
                .enumerate()
                .map(|(i, &count)| PieceTableEntry {
                    color_id: i.to_string(),
                    label: format!("Colour {i}"),
                    count,
                })
                .collect::<PieceTable>(),
        }
    }

    fn editing() -> Session {
        let mut session = Session::new();
        session.select_file(source()).unwrap();
        session
    }

    #[test]
    fn starts_empty_with_defaults() {
        let session = Session::new();
        assert_eq!(session.phase(), Phase::Empty);
        assert!(session.source().is_none());
        assert_eq!(session.layout(), LayoutParameters::default());
        assert!(!session.can_submit());
    }

    #[test]
    fn select_file_enters_editing() {
        let session = editing();
        assert_eq!(session.phase(), Phase::Editing);
        assert_eq!(session.framing(), Some(Framing::default()));
        // Square window on an 80x60 image.
        assert_eq!(session.crop_region(), Some(CropRegion::new(10, 0, 60, 60)));
        assert!(session.can_submit());
    }

    #[test]
    fn crop_region_follows_layout_aspect() {
        let mut session = editing();
        session.set_panels(2, 1).unwrap();
        assert_eq!(session.crop_region(), Some(CropRegion::new(0, 10, 80, 40)));
    }

    #[test]
    fn explicit_selection_overrides_framing() {
        let mut session = editing();
        session
            .set_crop_selection(CropSelection::normalized(0.0, 0.0, 0.5, 0.5))
            .unwrap();
        assert_eq!(session.crop_region(), Some(CropRegion::new(0, 0, 40, 30)));

        session.set_framing(Framing::default()).unwrap();
        assert_eq!(session.crop_region(), Some(CropRegion::new(10, 0, 60, 60)));
    }

    #[test]
    fn successful_submit_shows_result() {
        let mut session = editing();
        let job = session.begin_submit().unwrap();
        assert_eq!(session.phase(), Phase::Submitting);
        assert_eq!(job.region, CropRegion::new(10, 0, 60, 60));

        let done = session.complete_submit(job.ticket, Ok(result(&[3, 4, 5])));
        assert!(matches!(done, Completion::Finished { total_pieces: 12 }));
        assert_eq!(session.phase(), Phase::Result);
        assert_eq!(session.total_pieces(), Some(12));
    }

    #[test]
    fn second_begin_is_rejected_while_submitting() {
        let mut session = editing();
        let _job = session.begin_submit().unwrap();
        assert!(matches!(
            session.begin_submit(),
            Err(SessionError::SubmissionInFlight)
        ));
    }

    #[test]
    fn failure_returns_to_editing_with_input_intact() {
        let mut session = editing();
        session.set_panels(2, 3).unwrap();
        session
            .set_framing(Framing::default().with_zoom(1.5))
            .unwrap();
        let before = session.crop_region();
        let job = session.begin_submit().unwrap();

        let err = SubmitError::from(ComputeError::Status {
            status: 500,
            body: String::new(),
        });
        let done = session.complete_submit(job.ticket, Err(err));
        assert!(matches!(
            done,
            Completion::Failed(SubmitError::Compute(ComputeError::Status { status: 500, .. }))
        ));
        assert_eq!(session.phase(), Phase::Editing);
        assert_eq!(session.crop_region(), before);
        assert_eq!(session.layout().total_panels(), 6);
        assert_eq!(session.source().unwrap().file_name(), "photo.png");
        assert!(session.result().is_none());
    }

    #[test]
    fn upload_failure_also_reverts() {
        let mut session = editing();
        let job = session.begin_submit().unwrap();
        let err = SubmitError::from(UploadError::Transport("offline".into()));
        assert!(matches!(
            session.complete_submit(job.ticket, Err(err)),
            Completion::Failed(SubmitError::Upload(_))
        ));
        assert!(session.can_submit());
    }

    #[test]
    fn result_is_frozen() {
        let mut session = editing();
        let job = session.begin_submit().unwrap();
        session.complete_submit(job.ticket, Ok(result(&[1])));

        assert!(matches!(
            session.set_panels(2, 2),
            Err(SessionError::ResultFrozen)
        ));
        assert!(matches!(
            session.set_framing(Framing::default()),
            Err(SessionError::ResultFrozen)
        ));
        assert!(matches!(
            session.begin_submit(),
            Err(SessionError::ResultFrozen)
        ));
    }

    #[test]
    fn undo_clears_everything_from_every_state() {
        // Editing
        let mut session = editing();
        session.set_panels(3, 3).unwrap();
        session.undo();
        assert_eq!(session.phase(), Phase::Empty);
        assert!(session.source().is_none());
        assert!(session.crop_region().is_none());
        assert_eq!(session.layout(), LayoutParameters::default());

        // Submitting
        let mut session = editing();
        let _job = session.begin_submit().unwrap();
        session.undo();
        assert_eq!(session.phase(), Phase::Empty);

        // Result
        let mut session = editing();
        let job = session.begin_submit().unwrap();
        session.complete_submit(job.ticket, Ok(result(&[1, 2])));
        session.undo();
        assert_eq!(session.phase(), Phase::Empty);
        assert!(session.result().is_none());
        assert!(session.total_pieces().is_none());
    }

    #[test]
    fn outcome_after_undo_is_stale() {
        let mut session = editing();
        let job = session.begin_submit().unwrap();
        session.undo();
        session.select_file(source()).unwrap();

        let done = session.complete_submit(job.ticket, Ok(result(&[9])));
        assert!(matches!(done, Completion::Stale));
        assert_eq!(session.phase(), Phase::Editing);
        assert!(session.result().is_none());
    }

    #[test]
    fn select_file_is_rejected_while_submitting() {
        let mut session = editing();
        let _job = session.begin_submit().unwrap();
        assert!(matches!(
            session.select_file(source()),
            Err(SessionError::SubmissionInFlight)
        ));
    }

    #[test]
    fn new_file_from_result_discards_result() {
        let mut session = editing();
        session.set_panels(2, 2).unwrap();
        let job = session.begin_submit().unwrap();
        session.complete_submit(job.ticket, Ok(result(&[1])));

        session.select_file(source()).unwrap();
        assert_eq!(session.phase(), Phase::Editing);
        assert!(session.result().is_none());
        assert_eq!(session.layout(), LayoutParameters::default());
    }

    #[test]
    fn edits_need_an_image() {
        let mut session = Session::new();
        assert!(matches!(
            session.set_panels(2, 2),
            Err(SessionError::NoImage)
        ));
        assert!(matches!(session.begin_submit(), Err(SessionError::NoImage)));
    }

    #[test]
    fn out_of_range_panels_leave_layout_alone() {
        let mut session = editing();
        assert!(matches!(
            session.set_panels(7, 7),
            Err(SessionError::Layout(_))
        ));
        assert_eq!(session.layout(), LayoutParameters::default());
    }

    #[test]
    fn job_carries_layout_and_format() {
        let mut session = editing();
        session
            .set_layout(LayoutParameters::new(2, 3, PanelSize::Studs32).unwrap())
            .unwrap();
        let job = session.begin_submit().unwrap();
        assert_eq!(job.layout.total_panels(), 6);
        assert_eq!(job.output_format(), OutputFormat::Png);
        assert_eq!(job.upload_name(), "photo.png");
        assert_eq!(
            session.source().unwrap().dimensions(),
            Dimensions::new(80, 60)
        );
    }
}
