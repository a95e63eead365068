use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::sync::MergePolicy;

use super::defaults::{
    clamp_freshness_ttl_ms, clamp_max_response_bytes, clamp_request_timeout_ms,
    clamp_retain_log_files, default_base_url, default_freshness_ttl_ms, default_log_level,
    default_max_response_bytes, default_request_timeout_ms, default_retain_log_files,
    default_true, millis,
};

/// Settings loaded from `config.toml`.
///
/// Config keys (TOML): `[api]` with `base_url`, `request_timeout_ms`,
/// `max_response_bytes`; `[sync]` with `freshness_ttl_ms`, `merge_policy`;
/// `[logging]` with `level`, `file`, `retain_files`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub sync: SyncSettings,
    #[serde(default)]
    pub logging: LogSettings,
}

impl DashboardConfig {
    pub(crate) fn normalized(mut self) -> Self {
        self.api.base_url = self.api.base_url.trim().trim_end_matches('/').to_string();
        if self.api.base_url.is_empty() {
            self.api.base_url = default_base_url();
        }
        self.api.request_timeout_ms = clamp_request_timeout_ms(self.api.request_timeout_ms);
        self.api.max_response_bytes = clamp_max_response_bytes(self.api.max_response_bytes);
        self.sync.freshness_ttl_ms = clamp_freshness_ttl_ms(self.sync.freshness_ttl_ms);
        self.logging.level = self.logging.level.trim().to_string();
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        self.logging.retain_files = clamp_retain_log_files(self.logging.retain_files);
        self
    }

    /// Apply environment overrides through `lookup` (usually `std::env::var`).
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_ENV).filter(|url| !url.trim().is_empty()) {
            self.api.base_url = url;
        }
    }
}

/// Environment variable that overrides `api.base_url`.
pub const API_URL_ENV: &str = "DASHSYNC_API_URL";

/// Backend connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Deadline applied to every individual request.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Largest response body accepted from any endpoint.
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_ms: default_request_timeout_ms(),
            max_response_bytes: default_max_response_bytes(),
        }
    }
}

impl ApiSettings {
    pub fn request_timeout(&self) -> Duration {
        millis(self.request_timeout_ms)
    }

    /// Parse `base_url`, rejecting anything that is not an absolute http(s) URL.
    pub fn parsed_base_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.base_url).map_err(|err| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason: err.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
            return Err(ConfigError::InvalidBaseUrl {
                url: self.base_url.clone(),
                reason: "expected an http or https URL".to_string(),
            });
        }
        Ok(url)
    }
}

/// Cache freshness and merge behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSettings {
    #[serde(default = "default_freshness_ttl_ms")]
    pub freshness_ttl_ms: u64,
    #[serde(default)]
    pub merge_policy: MergePolicy,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            freshness_ttl_ms: default_freshness_ttl_ms(),
            merge_policy: MergePolicy::default(),
        }
    }
}

impl SyncSettings {
    pub fn freshness_ttl(&self) -> Duration {
        millis(self.freshness_ttl_ms)
    }
}

/// Console and log-file output of the binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSettings {
    /// `tracing` filter directive such as `info` or `dashsync=debug,ureq=warn`.
    /// `RUST_LOG` replaces it when set.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Write a per-launch log file under the app root.
    #[serde(default = "default_true")]
    pub file: bool,
    /// Log files kept in the logs directory, counting the current one.
    #[serde(default = "default_retain_log_files")]
    pub retain_files: usize,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: true,
            retain_files: default_retain_log_files(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No suitable config directory available")]
    NoConfigDir,
    #[error("Unable to create config directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config at {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to serialize config to TOML at {path}: {source}")]
    SerializeToml {
        path: PathBuf,
        source: toml::ser::Error,
    },
    #[error("Invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
