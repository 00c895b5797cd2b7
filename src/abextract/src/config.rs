//! Configuration management for abextract
//!
//! Settings are layered: built-in defaults, then a TOML file, then CLI flags.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::batch::BatchOptions;
use crate::decoder::DecoderProfile;
use crate::error::ExtractError;
use crate::retry::RetryPolicy;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub batch_size: usize,
    pub jobs: usize,
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
    pub log_file: PathBuf,
    pub profile: DecoderProfile,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            batch_size: 5,
            jobs: 1,
            max_attempts: 3,
            retry_delay_ms: 1000,
            log_file: PathBuf::from("unity_extractor.log"),
            profile: DecoderProfile::default(),
        }
    }
}

impl Config {
    /// Default location of the config file, if the platform has one
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("abextract").join("config.toml"))
    }

    /// Load `path`, or the default config file if it exists, or defaults.
    ///
    /// An explicitly given path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ExtractError> {
        match path {
            Some(path) => Self::load_file(path),
            None => match Self::config_path() {
                Some(default_path) if default_path.exists() => Self::load_file(&default_path),
                _ => Ok(Config::default()),
            },
        }
    }

    fn load_file(path: &Path) -> Result<Self, ExtractError> {
        let contents = fs::read_to_string(path).map_err(|source| ExtractError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&contents).map_err(|source| ExtractError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ExtractError> {
        let positive = |name: &'static str, value: u64| {
            if value == 0 {
                Err(ExtractError::InvalidSetting {
                    name,
                    reason: "must be at least 1".to_string(),
                })
            } else {
                Ok(())
            }
        };
        positive("batch_size", self.batch_size as u64)?;
        positive("jobs", self.jobs as u64)?;
        positive("max_attempts", u64::from(self.max_attempts))?;
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.retry_delay_ms))
    }

    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            batch_size: self.batch_size,
            jobs: self.jobs,
            retry: self.retry_policy(),
        }
    }
}
