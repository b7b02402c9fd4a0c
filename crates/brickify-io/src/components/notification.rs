//! Transient toast for submission outcomes.

use dioxus::prelude::*;

/// How long a toast stays up.
const DISMISS_AFTER_MS: u32 = 6000;

/// Tone of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Green.
    Success,
    /// Red.
    Error,
}

/// A message waiting to be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Distinguishes consecutive notices with the same text.
    pub id: u64,
    /// Tone.
    pub kind: NoticeKind,
    /// Text shown to the user.
    pub message: String,
}

/// Props for the [`Notification`] component.
#[derive(Props, Clone, PartialEq)]
pub struct NotificationProps {
    /// What to show.
    notice: Notice,
    /// Called with the notice id on close or timeout.
    on_dismiss: EventHandler<u64>,
}

/// A toast that closes itself after a few seconds.
///
/// The parent keys it by [`Notice::id`] so each notice gets its own
/// timer.
#[component]
pub fn Notification(props: NotificationProps) -> Element {
    let id = props.notice.id;
    let on_dismiss = props.on_dismiss;
    use_hook(move || {
        spawn(async move {
            gloo_timers::future::TimeoutFuture::new(DISMISS_AFTER_MS).await;
            on_dismiss.call(id);
        })
    });

    let class = match props.notice.kind {
        NoticeKind::Success => "toast toast-success",
        NoticeKind::Error => "toast toast-error",
    };

    let message = props.notice.message;

    rsx! {
        div { class, role: "status",
            span { "{message}" }
            button {
                class: "toast-close",
                aria_label: "Dismiss",
                onclick: move |_| on_dismiss.call(id),
                "×"
            }
        }
    }
}
