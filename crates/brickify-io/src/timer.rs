//! `setTimeout`-backed [`Timer`].

use std::time::Duration;

use brickify_service::Timer;

/// Sleeps on the browser event loop.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserTimer;

impl Timer for BrowserTimer {
    async fn sleep(&self, duration: Duration) {
        gloo_timers::future::sleep(duration).await;
    }
}
