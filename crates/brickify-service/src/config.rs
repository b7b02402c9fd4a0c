//! Service endpoints and limits.
//!
//! Loaded from TOML, then overridden by `BRICKIFY_*` variables. Every
//! field has a default, so an empty file is a valid configuration
//! (apart from the storage bucket, which is checked when the store is
//! built).

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

/// Overrides [`ServiceConfig::compute_endpoint`].
pub const ENV_COMPUTE_URL: &str = "BRICKIFY_COMPUTE_URL";
/// Overrides [`ServiceConfig::storage_bucket`].
pub const ENV_STORAGE_BUCKET: &str = "BRICKIFY_STORAGE_BUCKET";
/// Overrides [`ServiceConfig::compute_timeout_secs`].
pub const ENV_COMPUTE_TIMEOUT: &str = "BRICKIFY_COMPUTE_TIMEOUT_SECS";

/// Errors loading or validating a [`ServiceConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The TOML did not parse or had the wrong shape.
    #[error("invalid configuration file: {0}")]
    Toml(#[from] toml::de::Error),

    /// An endpoint is not a valid absolute URL.
    #[error("`{field}` is not a valid URL: {source}")]
    InvalidUrl {
        /// Offending field.
        field: &'static str,
        /// Parser error.
        #[source]
        source: url::ParseError,
    },

    /// An environment override could not be parsed.
    #[error("{key}={value:?} is not valid")]
    InvalidValue {
        /// Variable name.
        key: &'static str,
        /// Raw value.
        value: String,
    },

    /// Uploading needs a bucket name.
    #[error("no storage bucket configured (set `storage_bucket` or BRICKIFY_STORAGE_BUCKET)")]
    MissingBucket,

    /// A zero timeout would fail every submission.
    #[error("compute timeout must be at least one second")]
    ZeroTimeout,
}

/// Where the collaborators live and how long to wait for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// The mosaic server's upload endpoint.
    pub compute_endpoint: String,
    /// Base URL of the Firebase Storage REST API.
    pub storage_api: String,
    /// Firebase Storage bucket, e.g. `my-app.appspot.com`.
    pub storage_bucket: String,
    /// Object name prefix for uploads.
    pub upload_prefix: String,
    /// Ceiling for a single compute call.
    pub compute_timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            compute_endpoint: "http://127.0.0.1:8000/upload".into(),
            storage_api: "https://firebasestorage.googleapis.com/v0/".into(),
            storage_bucket: String::new(),
            upload_prefix: "images/".into(),
            compute_timeout_secs: 180,
        }
    }
}

impl ServiceConfig {
    /// Parse and validate a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] for malformed input and the
    /// validation errors of [`ServiceConfig::validate`].
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `BRICKIFY_*` overrides from `lookup`.
    ///
    /// `lookup` is usually `|key| std::env::var(key).ok()`; the web build
    /// passes values captured at compile time instead.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for an unparsable timeout
    /// and the validation errors of [`ServiceConfig::validate`].
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(url) = lookup(ENV_COMPUTE_URL) {
            self.compute_endpoint = url;
        }
        if let Some(bucket) = lookup(ENV_STORAGE_BUCKET) {
            self.storage_bucket = bucket;
        }
        if let Some(raw) = lookup(ENV_COMPUTE_TIMEOUT) {
            self.compute_timeout_secs =
                raw.trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue {
                        key: ENV_COMPUTE_TIMEOUT,
                        value: raw.clone(),
                    })?;
        }
        self.validate()
    }

    /// Check URLs and limits.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] or [`ConfigError::ZeroTimeout`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.compute_url()?;
        self.storage_api_url()?;
        if self.compute_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    /// Parsed [`Self::compute_endpoint`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`].
    pub fn compute_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.compute_endpoint).map_err(|source| ConfigError::InvalidUrl {
            field: "compute_endpoint",
            source,
        })
    }

    /// Parsed [`Self::storage_api`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`].
    pub fn storage_api_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.storage_api).map_err(|source| ConfigError::InvalidUrl {
            field: "storage_api",
            source,
        })
    }

    /// [`Self::compute_timeout_secs`] as a [`Duration`].
    #[must_use]
    pub const fn compute_timeout(&self) -> Duration {
        Duration::from_secs(self.compute_timeout_secs)
    }
}
