#![allow(clippy::unwrap_used)]

use std::cell::{Cell, RefCell};
use std::io::Cursor;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use brickify_pipeline::{
    Completion, ComputeError, LayoutParameters, MosaicResult, PanelSize, Phase, SessionError,
    SourceFormat, SourceImage, SubmitError, UploadError,
};
use brickify_service::wire::parse_response;
use brickify_service::{BlobStore, MosaicRequest, MosaicService, SessionDriver, Timer};
use url::Url;

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([9, 9, 9, 255]));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn mosaic(counts: &[u64]) -> MosaicResult {
    let pieces: Vec<String> = counts
        .iter()
        .enumerate()
        .map(|(i, c)| format!(r#""{i}":{{"LEGO Brick Color":"C{i}","1 x 1":{c}}}"#))
        .collect();
    let json = format!(
        r#"{{"mosaic_image_base64":"{0}","instructions_image_base64":"{0}","pieces_table":{{{1}}}}}"#,
        STANDARD.encode(png(4, 6)),
        pieces.join(",")
    );
    parse_response(json.as_bytes()).unwrap()
}

#[derive(Default)]
struct FakeStore {
    uploads: RefCell<Vec<(String, String, usize)>>,
    fail: bool,
}

impl BlobStore for FakeStore {
    async fn store(
        &self,
        bytes: Vec<u8>,
        name: &str,
        content_type: &str,
    ) -> Result<Url, UploadError> {
        tokio::task::yield_now().await;
        if self.fail {
            return Err(UploadError::Status {
                status: 403,
                body: "denied".into(),
            });
        }
        self.uploads
            .borrow_mut()
            .push((name.to_owned(), content_type.to_owned(), bytes.len()));
        Ok(Url::parse(&format!("https://blobs.test/images/{name}")).unwrap())
    }
}

enum Behaviour {
    Succeed(Vec<u64>),
    Fail500,
    Hang,
}

struct FakeService {
    behaviour: Behaviour,
    calls: RefCell<Vec<(Url, MosaicRequest)>>,
}

impl FakeService {
    const fn new(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl MosaicService for FakeService {
    async fn compute(
        &self,
        image_url: &Url,
        request: &MosaicRequest,
    ) -> Result<MosaicResult, ComputeError> {
        self.calls.borrow_mut().push((image_url.clone(), *request));
        tokio::task::yield_now().await;
        match &self.behaviour {
            Behaviour::Succeed(counts) => Ok(mosaic(counts)),
            Behaviour::Fail500 => Err(ComputeError::Status {
                status: 500,
                body: "Internal Server Error".into(),
            }),
            Behaviour::Hang => std::future::pending().await,
        }
    }
}

/// Never fires.
struct Patient;

impl Timer for Patient {
    async fn sleep(&self, _duration: Duration) {
        std::future::pending::<()>().await;
    }
}

/// Fires after a few polls and records what it was asked for.
#[derive(Default)]
struct Impatient {
    asked: Cell<Option<Duration>>,
}

impl Timer for Impatient {
    async fn sleep(&self, duration: Duration) {
        self.asked.set(Some(duration));
        tokio::task::yield_now().await;
    }
}

const TIMEOUT: Duration = Duration::from_secs(180);

fn driver<T: Timer>(
    store: FakeStore,
    behaviour: Behaviour,
    timer: T,
) -> SessionDriver<FakeStore, FakeService, T> {
    let driver = SessionDriver::new(store, FakeService::new(behaviour), timer, TIMEOUT);
    driver
        .update(|s| s.select_file(SourceImage::decode(png(80, 60), "photo.png").unwrap()))
        .unwrap();
    driver
}

#[tokio::test]
async fn successful_submission_shows_result() {
    let driver = driver(FakeStore::default(), Behaviour::Succeed(vec![10, 20, 12]), Patient);
    let done = driver.submit().await.unwrap();

    assert!(matches!(done, Completion::Finished { total_pieces: 42 }));
    assert_eq!(driver.session().phase(), Phase::Result);
    assert_eq!(driver.session().total_pieces(), Some(42));
}

#[tokio::test]
async fn cropped_image_is_uploaded_under_file_name() {
    let driver = driver(FakeStore::default(), Behaviour::Succeed(vec![1]), Patient);
    driver.submit().await.unwrap();

    let uploads = driver.store().uploads.borrow();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].0, "photo.png");
    assert_eq!(uploads[0].1, "image/png");
    assert!(uploads[0].2 > 0);
}

#[tokio::test]
async fn layout_reaches_the_service() {
    let driver = driver(FakeStore::default(), Behaviour::Succeed(vec![1]), Patient);
    driver
        .update(|s| s.set_layout(LayoutParameters::new(2, 3, PanelSize::Studs32).unwrap()))
        .unwrap();
    driver.submit().await.unwrap();

    let calls = driver.service().calls.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1.layout.total_panels(), 6);
    assert_eq!(calls[0].1.layout.aspect_ratio_param(), "2/3");
    assert_eq!(calls[0].0.as_str(), "https://blobs.test/images/photo.png");
}

#[tokio::test]
async fn double_submit_computes_once() {
    let driver = driver(FakeStore::default(), Behaviour::Succeed(vec![5]), Patient);
    let (first, second) = futures_util::future::join(driver.submit(), driver.submit()).await;

    assert!(matches!(first, Ok(Completion::Finished { total_pieces: 5 })));
    assert!(matches!(second, Err(SessionError::SubmissionInFlight)));
    assert_eq!(driver.service().calls.borrow().len(), 1);
    assert_eq!(driver.store().uploads.borrow().len(), 1);
    assert_eq!(driver.session().phase(), Phase::Result);
}

#[tokio::test]
async fn http_500_reverts_to_editing_and_keeps_source() {
    let driver = driver(FakeStore::default(), Behaviour::Fail500, Patient);
    driver.update(|s| s.set_panels(2, 2)).unwrap();
    let region_before = driver.session().crop_region();

    let done = driver.submit().await.unwrap();
    assert!(matches!(
        done,
        Completion::Failed(SubmitError::Compute(ComputeError::Status { status: 500, .. }))
    ));
    if let Completion::Failed(err) = &done {
        assert!(err.notification().contains("failed"));
    }

    let session = driver.session();
    assert_eq!(session.phase(), Phase::Editing);
    assert_eq!(session.source().unwrap().file_name(), "photo.png");
    assert_eq!(session.crop_region(), region_before);
    assert_eq!(session.layout().total_panels(), 4);
}

#[tokio::test]
async fn upload_failure_skips_compute() {
    let store = FakeStore {
        fail: true,
        ..FakeStore::default()
    };
    let driver = driver(store, Behaviour::Succeed(vec![1]), Patient);
    let done = driver.submit().await.unwrap();

    assert!(matches!(
        done,
        Completion::Failed(SubmitError::Upload(UploadError::Status { status: 403, .. }))
    ));
    assert!(driver.service().calls.borrow().is_empty());
    assert_eq!(driver.session().phase(), Phase::Editing);
}

#[tokio::test]
async fn hanging_service_times_out() {
    let driver = driver(FakeStore::default(), Behaviour::Hang, Impatient::default());
    let done = driver.submit().await.unwrap();

    assert!(matches!(
        done,
        Completion::Failed(SubmitError::Compute(ComputeError::Timeout { seconds: 180 }))
    ));
    assert_eq!(driver.session().phase(), Phase::Editing);
}

#[tokio::test]
async fn undo_during_submission_discards_outcome() {
    let driver = driver(FakeStore::default(), Behaviour::Succeed(vec![3]), Patient);
    let undo = async {
        tokio::task::yield_now().await;
        driver.update(brickify_pipeline::Session::undo);
    };
    let (done, ()) = futures_util::future::join(driver.submit(), undo).await;

    assert!(matches!(done, Ok(Completion::Stale)));
    assert_eq!(driver.session().phase(), Phase::Empty);
    assert!(driver.session().result().is_none());
}

mod direct {
    use brickify_pipeline::Session;
    use brickify_service::run_submission;

    use super::*;

    #[tokio::test]
    async fn run_submission_sends_crop_then_url() {
        let mut session = Session::new();
        session
            .select_file(SourceImage::decode(png(80, 60), "photo.png").unwrap())
            .unwrap();
        session.set_panels(2, 3).unwrap();
        let job = session.begin_submit().unwrap();

        let store = FakeStore::default();
        let service = FakeService::new(Behaviour::Succeed(vec![7]));
        let result = run_submission(&job, &store, &service, &Patient, TIMEOUT)
            .await
            .unwrap();
        assert_eq!(result.total_pieces(), 7);

        let uploads = store.uploads.borrow();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].0, "photo.png");
        assert_eq!(uploads[0].1, "image/png");

        let calls = service.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0.as_str(), "https://blobs.test/images/photo.png");
        assert_eq!(calls[0].1.layout.total_panels(), 6);
        assert_eq!(calls[0].1.format, SourceFormat::Png);
    }

    #[tokio::test]
    async fn timeout_uses_configured_duration() {
        let mut session = Session::new();
        session
            .select_file(SourceImage::decode(png(10, 10), "tiny.png").unwrap())
            .unwrap();
        let job = session.begin_submit().unwrap();

        let timer = Impatient::default();
        let service = FakeService::new(Behaviour::Hang);
        let err = run_submission(
            &job,
            &FakeStore::default(),
            &service,
            &timer,
            Duration::from_secs(5),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            SubmitError::Compute(ComputeError::Timeout { seconds: 5 })
        ));
        assert_eq!(timer.asked.get(), Some(Duration::from_secs(5)));
        assert_eq!(service.calls.borrow().len(), 1);
    }
}
