//! Shown instead of the tool when the visitor may not use it.

use brickify_pipeline::Access;
use dioxus::prelude::*;

/// Props for the [`AccessNotice`] component.
#[derive(Props, Clone, PartialEq)]
pub struct AccessNoticeProps {
    /// Outcome of the access check.
    access: Access,
}

/// Sign-in prompt or permission notice.
#[component]
pub fn AccessNotice(props: AccessNoticeProps) -> Element {
    let message = match props.access {
        Access::SignedOut => "Please sign in to use the mosaic creator.",
        Access::Denied => "You do not have permission to access this page.",
        Access::Granted => return rsx! {},
    };

    rsx! {
        div { class: "card access-notice",
            h2 { "Access restricted" }
            p { "{message}" }
        }
    }
}
