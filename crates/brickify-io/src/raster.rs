//! Object URLs for encoded images.
//!
//! The crop editor shows the picked photo through a Blob URL rather
//! than a `data:` URL so multi-megabyte photos are not base64-inflated
//! into the DOM.

use wasm_bindgen::JsValue;
use web_sys::BlobPropertyBag;

/// Errors that can occur during Blob URL creation.
#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    /// A browser API call returned an error.
    #[error("browser API error: {0}")]
    JsError(String),
}

impl From<JsValue> for RasterError {
    fn from(value: JsValue) -> Self {
        Self::JsError(format!("{value:?}"))
    }
}

/// Wrap encoded bytes in a Blob and return its object URL.
///
/// The returned URL must be revoked via [`revoke_blob_url`] when no
/// longer needed to avoid memory leaks; [`BlobUrl`] does this on drop.
///
/// # Errors
///
/// Returns [`RasterError::JsError`] if Blob or URL creation fails.
pub fn bytes_to_blob_url(bytes: &[u8], mime_type: &str) -> Result<String, RasterError> {
    let uint8_array = js_sys::Uint8Array::from(bytes);
    let parts = js_sys::Array::new();
    parts.push(&uint8_array);

    let opts = BlobPropertyBag::new();
    opts.set_type(mime_type);
    let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &opts)?;

    Ok(web_sys::Url::create_object_url_with_blob(&blob)?)
}

/// Release an object URL. Failures are ignored.
pub fn revoke_blob_url(url: &str) {
    let _ = web_sys::Url::revoke_object_url(url);
}

/// An object URL that is revoked when dropped.
#[derive(Debug, PartialEq, Eq)]
pub struct BlobUrl(String);

impl BlobUrl {
    /// See [`bytes_to_blob_url`].
    ///
    /// # Errors
    ///
    /// Returns [`RasterError::JsError`] if Blob or URL creation fails.
    pub fn new(bytes: &[u8], mime_type: &str) -> Result<Self, RasterError> {
        bytes_to_blob_url(bytes, mime_type).map(Self)
    }

    /// The `blob:` URL.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Drop for BlobUrl {
    fn drop(&mut self) {
        revoke_blob_url(&self.0);
    }
}
