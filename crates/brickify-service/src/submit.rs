//! Running a submission: crop, upload, compute.
//!
//! The three steps run strictly in sequence since compute needs the
//! uploaded URL. Only compute is bounded by a timeout; the remote
//! mosaic job has no latency guarantee at all.

use std::cell::{Ref, RefCell};
use std::future::Future;
use std::pin::pin;
use std::time::Duration;

use brickify_pipeline::{
    Completion, ComputeError, MosaicResult, Session, SessionError, SubmitError, SubmitJob, crop,
};
use futures_util::future::{Either, select};

use crate::compute::{MosaicRequest, MosaicService};
use crate::store::BlobStore;

/// Something that can wait.
///
/// The browser uses `setTimeout`, native code a tokio sleep.
#[allow(async_fn_in_trait)]
pub trait Timer {
    /// Complete after `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Crop, upload and compute one job.
///
/// # Errors
///
/// Returns the first failing step's error. Upload failures stop the
/// sequence before compute is called.
pub async fn run_submission<S, M, T>(
    job: &SubmitJob,
    store: &S,
    service: &M,
    timer: &T,
    timeout: Duration,
) -> Result<MosaicResult, SubmitError>
where
    S: BlobStore,
    M: MosaicService,
    T: Timer,
{
    let cropped = crop(&job.source, job.region, job.output_format())?;
    let image_url = store
        .store(cropped.bytes, job.upload_name(), cropped.format.mime_type())
        .await?;

    let request = MosaicRequest::new(job.layout, job.source.format());
    let result = with_timeout(service.compute(&image_url, &request), timer, timeout).await?;
    Ok(result)
}

async fn with_timeout<F, T>(
    compute: F,
    timer: &T,
    timeout: Duration,
) -> Result<MosaicResult, ComputeError>
where
    F: Future<Output = Result<MosaicResult, ComputeError>>,
    T: Timer,
{
    let compute = pin!(compute);
    let expiry = pin!(timer.sleep(timeout));
    match select(compute, expiry).await {
        Either::Left((outcome, _)) => outcome,
        Either::Right(((), _)) => {
            log::warn!("mosaic service timed out after {}s", timeout.as_secs());
            Err(ComputeError::Timeout {
                seconds: timeout.as_secs(),
            })
        }
    }
}

/// A [`Session`] bundled with its collaborators.
///
/// Interior mutability keeps [`SessionDriver::submit`] callable through
/// `&self`, so a second submit issued while the first is suspended hits
/// the session's re-entrancy guard instead of the borrow checker.
#[derive(Debug)]
pub struct SessionDriver<S, M, T> {
    session: RefCell<Session>,
    store: S,
    service: M,
    timer: T,
    timeout: Duration,
}

impl<S, M, T> SessionDriver<S, M, T>
where
    S: BlobStore,
    M: MosaicService,
    T: Timer,
{
    /// Driver with an empty session.
    pub fn new(store: S, service: M, timer: T, timeout: Duration) -> Self {
        Self {
            session: RefCell::new(Session::new()),
            store,
            service,
            timer,
            timeout,
        }
    }

    /// Read the session.
    pub fn session(&self) -> Ref<'_, Session> {
        self.session.borrow()
    }

    /// The blob store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// The mosaic service.
    pub const fn service(&self) -> &M {
        &self.service
    }

    /// Apply a synchronous edit (file selection, framing, layout, undo).
    pub fn update<R>(&self, edit: impl FnOnce(&mut Session) -> R) -> R {
        edit(&mut self.session.borrow_mut())
    }

    /// Submit the current draft and wait for the outcome.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] when the session refuses to start the
    /// submission. Failures of the submission itself come back as
    /// [`Completion::Failed`].
    pub async fn submit(&self) -> Result<Completion, SessionError> {
        let job = self.session.borrow_mut().begin_submit()?;
        let outcome =
            run_submission(&job, &self.store, &self.service, &self.timer, self.timeout).await;
        Ok(self.session.borrow_mut().complete_submit(job.ticket, outcome))
    }
}
