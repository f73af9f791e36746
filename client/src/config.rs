//! Client configuration loaded via OrthoConfig.

use std::time::Duration;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
const APP_DIR_NAME: &str = "chakula-poa";
const FALLBACK_CREDENTIALS_DIR: &str = ".chakula-poa";

/// Errors raised when configured values cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The API base URL did not parse.
    #[error("invalid API url {url:?}: {message}")]
    InvalidApiUrl {
        /// Configured value.
        url: String,
        /// Parser message.
        message: String,
    },
    /// The API base URL cannot carry paths, e.g. `mailto:`.
    #[error("API url {url:?} must be an http or https base url")]
    UnsupportedApiUrl {
        /// Configured value.
        url: String,
    },
}

/// Configuration values for the API client and CLI.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CHAKULA")]
pub struct ClientSettings {
    /// Base URL of the Chakula Poa backend.
    pub api_url: Option<String>,
    /// Directory holding the credential document.
    pub credentials_dir: Option<Utf8PathBuf>,
    /// Optional overall request timeout in seconds.
    pub request_timeout_secs: Option<u64>,
}

impl ClientSettings {
    /// Return the validated API base URL, falling back to the local default.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the configured URL is malformed or is
    /// not an http(s) URL.
    pub fn api_url(&self) -> Result<Url, ConfigError> {
        let raw = self.api_url.as_deref().unwrap_or(DEFAULT_API_URL);
        let url = Url::parse(raw).map_err(|err| ConfigError::InvalidApiUrl {
            url: raw.to_owned(),
            message: err.to_string(),
        })?;
        if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedApiUrl {
                url: raw.to_owned(),
            });
        }
        Ok(url)
    }

    /// Return the credential directory, falling back to the user config dir.
    pub fn credentials_dir(&self) -> Utf8PathBuf {
        self.credentials_dir
            .clone()
            .unwrap_or_else(default_credentials_dir)
    }

    /// Return the request timeout, if configured.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

fn default_credentials_dir() -> Utf8PathBuf {
    std::env::var("HOME")
        .ok()
        .filter(|home| !home.is_empty())
        .map_or_else(
            || Utf8PathBuf::from(FALLBACK_CREDENTIALS_DIR),
            |home| Utf8PathBuf::from(home).join(".config").join(APP_DIR_NAME),
        )
}
