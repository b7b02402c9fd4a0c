use std::rc::Rc;
use std::time::Duration;

use brickify_io::auth::{self, Probe};
use brickify_io::{
    AccessNotice, BrowserTimer, CropEditor, FileUpload, LayoutControls, Notice, NoticeKind,
    Notification, ResultView, console_log,
};
use brickify_pipeline::{Access, Completion, Framing, LayoutParameters, Phase, Session, SourceImage};
use brickify_service::config::{ENV_COMPUTE_TIMEOUT, ENV_COMPUTE_URL, ENV_STORAGE_BUCKET};
use brickify_service::{ConfigError, FirebaseStorage, HttpMosaicService, ServiceConfig, run_submission};
use dioxus::prelude::*;

/// How often the auth provider is polled while its script loads.
const AUTH_POLL_MS: u32 = 200;
/// Give up on the auth provider after this many polls (10 s).
const AUTH_POLL_ATTEMPTS: u32 = 50;

fn main() {
    console_log::init(log::LevelFilter::Info);
    dioxus::launch(app);
}

/// `BRICKIFY_*` values captured when the wasm bundle was built.
fn build_time_override(key: &str) -> Option<String> {
    let value = match key {
        ENV_COMPUTE_URL => option_env!("BRICKIFY_COMPUTE_URL"),
        ENV_STORAGE_BUCKET => option_env!("BRICKIFY_STORAGE_BUCKET"),
        ENV_COMPUTE_TIMEOUT => option_env!("BRICKIFY_COMPUTE_TIMEOUT_SECS"),
        _ => None,
    };
    value.map(str::to_owned)
}

/// Remote collaborators of a submission.
struct Services {
    store: FirebaseStorage,
    compute: HttpMosaicService,
    timeout: Duration,
}

impl Services {
    fn from_build_env() -> Result<Self, ConfigError> {
        let mut config = ServiceConfig::default();
        config.apply_overrides(build_time_override)?;
        let client = reqwest::Client::new();
        Ok(Self {
            store: FirebaseStorage::from_config(client.clone(), &config)?,
            compute: HttpMosaicService::from_config(client, &config)?,
            timeout: config.compute_timeout(),
        })
    }
}

/// Root component: waits for the access check, then shows the tool.
fn app() -> Element {
    let mut access = use_signal(|| Option::<Access>::None);

    use_future(move || async move {
        for _ in 0..AUTH_POLL_ATTEMPTS {
            if let Probe::Ready(user) = auth::probe() {
                let outcome = Access::evaluate(user.as_ref());
                log::info!("access check: {outcome:?}");
                access.set(Some(outcome));
                return;
            }
            gloo_timers::future::TimeoutFuture::new(AUTH_POLL_MS).await;
        }
        log::warn!("auth provider did not load; treating visitor as signed out");
        access.set(Some(Access::SignedOut));
    });

    rsx! {
        style { dangerous_inner_html: include_str!("../assets/brickify.css") }

        match access() {
            None => rsx! {
                div { class: "card", p { class: "text-muted", "Checking sign-in..." } }
            },
            Some(Access::Granted) => rsx! { MosaicTool {} },
            Some(denied) => rsx! { AccessNotice { access: denied } },
        }
    }
}

/// The mosaic creator itself.
///
/// Holds the [`Session`] in a signal. Submissions run in a spawned task
/// and report back through [`Session::complete_submit`], which drops
/// outcomes the user has already moved past.
#[component]
#[allow(clippy::too_many_lines)]
fn MosaicTool() -> Element {
    // --- Application state ---
    let mut session = use_signal(Session::new);
    let services = use_hook(|| {
        Services::from_build_env().map(Rc::new).map_err(|e| {
            log::error!("service configuration rejected: {e}");
            e.to_string()
        })
    });
    let mut notice = use_signal(|| Option::<Notice>::None);
    let mut notice_count = use_signal(|| 0u64);
    // Bumped per picked image and per result to re-key the editor and
    // result view.
    let mut image_key = use_signal(|| 0u64);
    let mut result_key = use_signal(|| 0u64);

    let mut notify = move |kind: NoticeKind, message: String| {
        notice_count += 1;
        let id = *notice_count.peek();
        notice.set(Some(Notice { id, kind, message }));
    };

    // --- Handlers ---
    let on_upload = move |(bytes, name): (Vec<u8>, String)| match SourceImage::decode(bytes, name.as_str()) {
        Ok(source) => match session.write().select_file(source) {
            Ok(()) => image_key += 1,
            Err(e) => notify(NoticeKind::Error, e.to_string()),
        },
        Err(e) => {
            log::warn!("{name} rejected: {e}");
            notify(NoticeKind::Error, format!("Could not open {name}: {e}"));
        }
    };

    let on_framing = move |framing: Framing| {
        if let Err(e) = session.write().set_framing(framing) {
            log::debug!("framing ignored: {e}");
        }
    };

    let on_layout = move |layout: LayoutParameters| {
        if let Err(e) = session.write().set_layout(layout) {
            log::debug!("layout ignored: {e}");
        }
    };

    let on_submit = {
        let services = services.clone();
        move |_| {
            let services = match &services {
                Ok(services) => Rc::clone(services),
                Err(e) => {
                    notify(NoticeKind::Error, format!("Mosaic service is not configured: {e}"));
                    return;
                }
            };
            let job = match session.write().begin_submit() {
                Ok(job) => job,
                Err(e) => {
                    log::debug!("submit refused: {e}");
                    return;
                }
            };
            spawn(async move {
                // Let the progress indicator paint before cropping blocks
                // the thread.
                gloo_timers::future::TimeoutFuture::new(0).await;
                let outcome = run_submission(
                    &job,
                    &services.store,
                    &services.compute,
                    &BrowserTimer,
                    services.timeout,
                )
                .await;
                match session.write().complete_submit(job.ticket, outcome) {
                    Completion::Finished { total_pieces } => {
                        result_key += 1;
                        notify(
                            NoticeKind::Success,
                            format!("Your mosaic is ready: {total_pieces} pieces."),
                        );
                    }
                    Completion::Failed(err) => {
                        notify(NoticeKind::Error, err.notification().to_owned());
                    }
                    Completion::Stale => {}
                }
            });
        }
    };

    let on_undo = move |_| session.write().undo();

    // --- Snapshot for rendering ---
    let (phase, source, selection, framing, layout, can_submit, result) = {
        let s = session.read();
        (
            s.phase(),
            s.source(),
            s.crop_selection(),
            s.framing(),
            s.layout(),
            s.can_submit() && services.is_ok(),
            s.result(),
        )
    };
    let submitting = phase == Phase::Submitting;
    let editor_key = image_key();
    let view_key = result_key();
    let current_notice = notice().map(|n| (n.id, n));

    // --- Layout ---
    rsx! {
        div { class: "app",
            header { class: "app-header",
                h1 { "LEGO Mosaic Creator" }
                div { class: "toolbar",
                    button {
                        class: if can_submit { "btn btn-primary" } else { "btn btn-disabled" },
                        disabled: !can_submit,
                        onclick: on_submit,
                        "Preview"
                    }
                    button {
                        class: "btn",
                        disabled: phase == Phase::Empty,
                        onclick: on_undo,
                        "Undo"
                    }
                }
            }

            if let Err(ref e) = services {
                p { class: "card text-error", "Mosaic service is not configured: {e}" }
            }

            div { class: "app-body",
                aside { class: "sidebar",
                    LayoutControls {
                        layout,
                        framing,
                        on_layout,
                        on_framing,
                        disabled: phase != Phase::Editing,
                    }
                    FileUpload { on_upload, disabled: submitting }
                }

                main { class: "card main-card",
                    match (phase, source, selection, framing, result) {
                        (Phase::Result, _, _, _, Some(result)) => rsx! {
                            ResultView { key: "{view_key}", result }
                        },
                        (_, Some(source), Some(selection), Some(framing), _) => rsx! {
                            CropEditor {
                                key: "{editor_key}",
                                source,
                                selection,
                                framing,
                                on_framing,
                                disabled: submitting,
                            }
                            if submitting {
                                div { class: "progress",
                                    div { class: "progress-bar" }
                                    p { "Building mosaic..." }
                                }
                            }
                        },
                        _ => rsx! {
                            p { class: "empty-prompt",
                                "Choose an image to turn it into a LEGO mosaic."
                            }
                        },
                    }
                }
            }

            if let Some((notice_id, current)) = current_notice {
                Notification {
                    key: "{notice_id}",
                    notice: current,
                    on_dismiss: move |id: u64| {
                        if notice.peek().as_ref().is_some_and(|n| n.id == id) {
                            notice.set(None);
                        }
                    },
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_keys_have_no_override() {
        assert_eq!(build_time_override("BRICKIFY_SOMETHING_ELSE"), None);
    }
}
