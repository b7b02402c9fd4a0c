//! Blob store adapter.
//!
//! [`FirebaseStorage`] uploads through the Firebase Storage REST API:
//!
//! ```text
//! POST {api}/b/{bucket}/o?uploadType=media&name={prefix}{file name}
//! Content-Type: image/png
//! <bytes>
//! ```
//!
//! and builds the public download URL from the returned
//! `downloadTokens`:
//!
//! ```text
//! {api}/b/{bucket}/o/{url-encoded object name}?alt=media&token={token}
//! ```
//!
//! Uploads are not idempotent. A second upload under the same name
//! replaces the first object.

use brickify_pipeline::UploadError;
use serde::Deserialize;
use url::Url;

use crate::compute::error_body;
use crate::config::{ConfigError, ServiceConfig};

/// Stores bytes and hands back a URL anyone can fetch.
#[allow(async_fn_in_trait)]
pub trait BlobStore {
    /// Store `bytes` under `name`.
    ///
    /// # Errors
    ///
    /// Any failure is an [`UploadError`]; callers must not go on to
    /// compute after one.
    async fn store(&self, bytes: Vec<u8>, name: &str, content_type: &str)
    -> Result<Url, UploadError>;
}

/// [`BlobStore`] backed by a Firebase Storage bucket.
#[derive(Debug, Clone)]
pub struct FirebaseStorage {
    client: reqwest::Client,
    api: Url,
    bucket: String,
    prefix: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectMetadata {
    name: String,
    download_tokens: Option<String>,
}

impl FirebaseStorage {
    /// Store configured from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingBucket`] if no bucket is set and
    /// [`ConfigError::InvalidUrl`] for a bad API URL.
    pub fn from_config(client: reqwest::Client, config: &ServiceConfig) -> Result<Self, ConfigError> {
        if config.storage_bucket.trim().is_empty() {
            return Err(ConfigError::MissingBucket);
        }
        Ok(Self {
            client,
            api: config.storage_api_url()?,
            bucket: config.storage_bucket.trim().to_owned(),
            prefix: config.upload_prefix.clone(),
        })
    }

    /// Full object name for a file name.
    #[must_use]
    pub fn object_name(&self, name: &str) -> String {
        format!("{}{name}", self.prefix)
    }

    fn objects_url(&self) -> Result<Url, UploadError> {
        let mut url = self.api.clone();
        url.path_segments_mut()
            .map_err(|()| UploadError::InvalidResponse(format!("{} cannot be a base URL", self.api)))?
            .pop_if_empty()
            .extend(["b", self.bucket.as_str(), "o"]);
        Ok(url)
    }

    /// Media upload URL for `object`.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::InvalidResponse`] if the API URL cannot
    /// carry a path.
    pub fn upload_url(&self, object: &str) -> Result<Url, UploadError> {
        let mut url = self.objects_url()?;
        url.query_pairs_mut()
            .append_pair("uploadType", "media")
            .append_pair("name", object);
        Ok(url)
    }

    /// Public download URL for `object` with access `token`.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::InvalidResponse`] if the API URL cannot
    /// carry a path.
    pub fn download_url(&self, object: &str, token: &str) -> Result<Url, UploadError> {
        let mut url = self.objects_url()?;
        url.path_segments_mut()
            .map_err(|()| UploadError::InvalidResponse("cannot-be-a-base URL".into()))?
            .push(object);
        url.query_pairs_mut()
            .append_pair("alt", "media")
            .append_pair("token", token);
        Ok(url)
    }
}

impl BlobStore for FirebaseStorage {
    async fn store(
        &self,
        bytes: Vec<u8>,
        name: &str,
        content_type: &str,
    ) -> Result<Url, UploadError> {
        let object = self.object_name(name);
        let url = self.upload_url(&object)?;
        log::info!("uploading {object} ({} bytes, {content_type})", bytes.len());

        let response = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| UploadError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| UploadError::Transport(e.to_string()))?;
        if !status.is_success() {
            log::warn!("upload of {object} failed with {status}");
            return Err(UploadError::Status {
                status: status.as_u16(),
                body: error_body(body),
            });
        }

        let metadata: ObjectMetadata = serde_json::from_str(&body)
            .map_err(|e| UploadError::InvalidResponse(e.to_string()))?;
        let token = metadata
            .download_tokens
            .as_deref()
            .and_then(|tokens| tokens.split(',').next())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| UploadError::InvalidResponse("no download token in response".into()))?;

        let download = self.download_url(&metadata.name, token)?;
        log::debug!("stored {} at {download}", metadata.name);
        Ok(download)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn storage() -> FirebaseStorage {
        let config = ServiceConfig {
            storage_bucket: "bricks.appspot.com".into(),
            ..ServiceConfig::default()
        };
        FirebaseStorage::from_config(reqwest::Client::new(), &config).unwrap()
    }

    #[test]
    fn upload_url_targets_bucket() {
        let url = storage().upload_url("images/cat 1.png").unwrap();
        assert_eq!(
            url.as_str(),
            "https://firebasestorage.googleapis.com/v0/b/bricks.appspot.com/o?uploadType=media&name=images%2Fcat+1.png"
        );
    }

    #[test]
    fn download_url_encodes_object_as_one_segment() {
        let url = storage().download_url("images/cat 1.png", "abc").unwrap();
        assert_eq!(
            url.as_str(),
            "https://firebasestorage.googleapis.com/v0/b/bricks.appspot.com/o/images%2Fcat%201.png?alt=media&token=abc"
        );
    }

    #[test]
    fn object_name_uses_prefix() {
        assert_eq!(storage().object_name("cat.png"), "images/cat.png");
    }

    #[test]
    fn bucket_is_required() {
        let err = FirebaseStorage::from_config(reqwest::Client::new(), &ServiceConfig::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingBucket));
    }
}
