//! Application configuration: built-in defaults, an optional RON file, then
//! command-line overrides, in that order.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::ValueEnum;
use engine_logging::{LogDestination, DEFAULT_LOG_FILE};
use mlexec_core::DEFAULT_BACKEND_ORIGIN;
use mlexec_engine::{EngineConfig, ExecuteSettings, MAX_PREVIEW_CONTENT};
use serde::{Deserialize, Serialize};

use crate::cli::Cli;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogSetting {
    #[default]
    Terminal,
    File,
    Both,
}

impl From<LogSetting> for LogDestination {
    fn from(setting: LogSetting) -> Self {
        match setting {
            LogSetting::Terminal => LogDestination::Terminal,
            LogSetting::File => LogDestination::File,
            LogSetting::Both => LogDestination::Both,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub origin: String,
    pub request_timeout_secs: Option<u64>,
    pub max_preview_bytes: usize,
    pub log: LogSetting,
    pub log_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_BACKEND_ORIGIN.to_string(),
            request_timeout_secs: None,
            max_preview_bytes: MAX_PREVIEW_CONTENT,
            log: LogSetting::Terminal,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid backend origin '{origin}': {reason}")]
    InvalidOrigin { origin: String, reason: String },
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&content).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    /// Resolves the effective configuration for one invocation.
    pub fn resolve(cli: &Cli) -> Result<Self, ConfigError> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_overrides(cli);
        config.validate()?;
        Ok(config)
    }

    pub fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(origin) = &cli.origin {
            self.origin = origin.clone();
        }
        if let Some(secs) = cli.timeout_secs {
            self.request_timeout_secs = Some(secs);
        }
        if let Some(log) = cli.log {
            self.log = log;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidOrigin {
            origin: self.origin.clone(),
            reason,
        };
        let parsed = url::Url::parse(&self.origin).map_err(|err| invalid(err.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {}", parsed.scheme())));
        }
        if parsed.host_str().is_none() {
            return Err(invalid("missing host".to_string()));
        }
        Ok(())
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            execute: ExecuteSettings {
                origin: self.origin.clone(),
                request_timeout: self.request_timeout_secs.map(Duration::from_secs),
            },
            max_preview_bytes: self.max_preview_bytes,
        }
    }
}
