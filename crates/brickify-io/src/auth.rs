//! Reading the signed-in user from the auth provider's browser SDK.
//!
//! The provider script installs `window.Clerk`. Once it has loaded,
//! `Clerk.user` is either `null` or an object whose
//! `publicMetadata.admin` flag marks administrators.

use brickify_pipeline::CurrentUser;
use wasm_bindgen::JsValue;

/// What the auth provider currently reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// The SDK is missing or still initialising.
    Loading,
    /// The SDK has loaded; `None` means nobody is signed in.
    Ready(Option<CurrentUser>),
}

fn get(target: &JsValue, key: &str) -> Option<JsValue> {
    js_sys::Reflect::get(target, &JsValue::from_str(key))
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_null())
}

/// Inspect `window.Clerk`.
#[must_use]
pub fn probe() -> Probe {
    let Some(window) = web_sys::window() else {
        return Probe::Loading;
    };
    let Some(clerk) = get(&window, "Clerk") else {
        return Probe::Loading;
    };
    if get(&clerk, "loaded").and_then(|v| v.as_bool()) != Some(true) {
        return Probe::Loading;
    }
    let user = get(&clerk, "user").map(|user| CurrentUser {
        is_admin: get(&user, "publicMetadata")
            .and_then(|meta| get(&meta, "admin"))
            .and_then(|flag| flag.as_bool())
            .unwrap_or(false),
    });
    Probe::Ready(user)
}
