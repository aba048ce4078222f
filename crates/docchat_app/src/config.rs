//! Start-up configuration.
//!
//! Read from a RON file when one is given or `./docchat.ron` exists. The base
//! address can be overridden by `DOCCHAT_BASE_URL` and then by `--base-url`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use docchat_engine::{ServiceSettings, DEFAULT_BASE_URL};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

pub const CONFIG_FILENAME: &str = "docchat.ron";
pub const BASE_URL_ENV: &str = "DOCCHAT_BASE_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("invalid base url {url:?}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("base url {0:?} must use http or https")]
    UnsupportedScheme(String),
    #[error("invalid log level {0:?}")]
    InvalidLogLevel(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: Option<u64>,
    pub max_response_bytes: u64,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout_secs: 10,
            request_timeout_secs: None,
            max_response_bytes: 1024 * 1024,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// An explicit path must exist; the implicit `./docchat.ron` is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let implicit = Path::new(CONFIG_FILENAME);
                if implicit.is_file() {
                    Self::from_file(implicit)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        self.log_level
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidLogLevel(self.log_level.clone()))
    }

    /// Resolves the base address (flag, then environment, then file) and
    /// builds the engine settings.
    pub fn service_settings(
        &self,
        cli_base_url: Option<&str>,
        env_base_url: Option<&str>,
    ) -> Result<ServiceSettings, ConfigError> {
        let raw = cli_base_url
            .or(env_base_url)
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(self.base_url.trim());
        let base_url = Url::parse(raw).map_err(|source| ConfigError::InvalidBaseUrl {
            url: raw.to_string(),
            source,
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme(raw.to_string()));
        }

        let mut settings = ServiceSettings::new(base_url);
        settings.connect_timeout = Duration::from_secs(self.connect_timeout_secs);
        settings.request_timeout = self.request_timeout_secs.map(Duration::from_secs);
        settings.max_response_bytes = self.max_response_bytes;
        Ok(settings)
    }
}
