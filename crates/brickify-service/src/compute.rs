//! Mosaic compute adapter.

use brickify_pipeline::{ComputeError, LayoutParameters, MosaicResult, SourceFormat};
use url::Url;

use crate::config::{ConfigError, ServiceConfig};
use crate::wire;

/// Longest error body kept in [`ComputeError::Status`] and
/// [`UploadError::Status`](brickify_pipeline::UploadError::Status).
const MAX_ERROR_BODY: usize = 512;

/// Parameters of one compute call besides the image URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MosaicRequest {
    /// Panel grid.
    pub layout: LayoutParameters,
    /// Format tag of the uploaded image, sent as `image_ext`.
    pub format: SourceFormat,
}

impl MosaicRequest {
    /// Bundle layout and format.
    #[must_use]
    pub const fn new(layout: LayoutParameters, format: SourceFormat) -> Self {
        Self { layout, format }
    }
}

/// The remote mosaic computation.
#[allow(async_fn_in_trait)]
pub trait MosaicService {
    /// Build a mosaic from the image at `image_url`.
    ///
    /// May take arbitrarily long; callers bound it with a timer.
    ///
    /// # Errors
    ///
    /// Any failure, including a malformed answer, is a [`ComputeError`].
    /// No partial result is ever returned.
    async fn compute(
        &self,
        image_url: &Url,
        request: &MosaicRequest,
    ) -> Result<MosaicResult, ComputeError>;
}

/// [`MosaicService`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpMosaicService {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpMosaicService {
    /// Service at `endpoint`.
    #[must_use]
    pub fn new(client: reqwest::Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    /// Service at the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] for a bad endpoint.
    pub fn from_config(client: reqwest::Client, config: &ServiceConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(client, config.compute_url()?))
    }

    /// The configured endpoint.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl MosaicService for HttpMosaicService {
    async fn compute(
        &self,
        image_url: &Url,
        request: &MosaicRequest,
    ) -> Result<MosaicResult, ComputeError> {
        let url = wire::request_url(&self.endpoint, image_url, request);
        log::info!(
            "requesting mosaic: {} ({})",
            request.layout,
            request.format
        );
        log::debug!("POST {url}");

        let response = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| ComputeError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::warn!("mosaic service answered {status}");
            return Err(ComputeError::Status {
                status: status.as_u16(),
                body: error_body(body),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ComputeError::Transport(e.to_string()))?;
        log::debug!("mosaic response: {} bytes", body.len());
        wire::parse_response(&body)
    }
}

/// An HTTP error body cut to [`MAX_ERROR_BODY`].
pub(crate) fn error_body(body: String) -> String {
    truncate(body, MAX_ERROR_BODY)
}

/// Cut `text` to at most `max` bytes on a character boundary.
fn truncate(mut text: String, max: usize) -> String {
    if text.len() > max {
        let mut end = max;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        text.truncate(end);
        text.push('…');
    }
    text
}
